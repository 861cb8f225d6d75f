//! Annotation expression type-checking
//!
//! Expressions are checked against an expected type propagated from the
//! term's type at the top level, a record property's declared type, a
//! collection's element type, and both branches of an `If`. Malformed
//! literals attach a local error to their own node; nothing aborts the
//! model.

use crate::model::EdmModel;
use crate::primitives::PrimitiveTypeKind;
use crate::types::{EdmType, EdmTypeReference};
use edm_ast::{
    AnnotationDecl, EdmError, ErrorCode, Expression, ExpressionKind, Location, PropertyDecl,
    SchemaElementDecl,
};

impl EdmModel {
    /// Check an annotation's value against its term's declared type
    #[must_use]
    pub fn check_annotation_value(&self, decl: &AnnotationDecl) -> Vec<EdmError> {
        let expected = self
            .find_term(&decl.term)
            .map(|term| term.type_reference())
            .filter(|t| !t.is_bad());

        match &decl.value {
            Some(value) => self.check_expression(value, expected.as_ref()),
            None => Vec::new(),
        }
    }

    /// Check one expression node against an optional expected type
    #[must_use]
    pub fn check_expression(
        &self,
        expression: &Expression,
        expected: Option<&EdmTypeReference>,
    ) -> Vec<EdmError> {
        let location = expression.location;
        match &expression.kind {
            ExpressionKind::Integer(raw) => self.check_integer(raw, expected, location),
            ExpressionKind::String(_) => {
                self.check_constant_category(PrimitiveTypeKind::String, expected, location)
            }
            ExpressionKind::Boolean(raw) => {
                let mut errors = Vec::new();
                if raw != "true" && raw != "false" {
                    errors.push(invalid_literal(
                        ErrorCode::InvalidBoolean,
                        raw,
                        "boolean",
                        location,
                    ));
                }
                errors.extend(self.check_constant_category(
                    PrimitiveTypeKind::Boolean,
                    expected,
                    location,
                ));
                errors
            }
            ExpressionKind::Float(raw) => {
                let mut errors = Vec::new();
                if !is_valid_float(raw) {
                    errors.push(invalid_literal(
                        ErrorCode::InvalidFloatingPoint,
                        raw,
                        "floating point",
                        location,
                    ));
                }
                errors.extend(self.check_float_category(expected, location));
                errors
            }
            ExpressionKind::Decimal(raw) => {
                let mut errors = Vec::new();
                if !is_valid_decimal(raw) {
                    errors.push(invalid_literal(
                        ErrorCode::InvalidDecimal,
                        raw,
                        "decimal",
                        location,
                    ));
                }
                errors.extend(self.check_constant_category(
                    PrimitiveTypeKind::Decimal,
                    expected,
                    location,
                ));
                errors
            }
            ExpressionKind::Guid(raw) => {
                let mut errors = Vec::new();
                if !is_valid_guid(raw) {
                    errors.push(invalid_literal(ErrorCode::InvalidGuid, raw, "guid", location));
                }
                errors.extend(self.check_constant_category(
                    PrimitiveTypeKind::Guid,
                    expected,
                    location,
                ));
                errors
            }
            ExpressionKind::DateTimeOffset(raw) => {
                let mut errors = Vec::new();
                if chrono::DateTime::parse_from_rfc3339(raw).is_err() {
                    errors.push(invalid_literal(
                        ErrorCode::InvalidDateTimeOffset,
                        raw,
                        "date time offset",
                        location,
                    ));
                }
                errors.extend(self.check_constant_category(
                    PrimitiveTypeKind::DateTimeOffset,
                    expected,
                    location,
                ));
                errors
            }
            ExpressionKind::Duration(raw) => {
                let mut errors = Vec::new();
                if !is_valid_duration(raw) {
                    errors.push(invalid_literal(
                        ErrorCode::InvalidDuration,
                        raw,
                        "duration",
                        location,
                    ));
                }
                errors.extend(self.check_constant_category(
                    PrimitiveTypeKind::Duration,
                    expected,
                    location,
                ));
                errors
            }
            ExpressionKind::Binary(raw) => {
                let mut errors = Vec::new();
                if !is_valid_binary(raw) {
                    errors.push(invalid_literal(
                        ErrorCode::InvalidBinary,
                        raw,
                        "binary",
                        location,
                    ));
                }
                errors.extend(self.check_constant_category(
                    PrimitiveTypeKind::Binary,
                    expected,
                    location,
                ));
                errors
            }
            ExpressionKind::Null => match expected {
                Some(expected) if !expected.nullable => vec![EdmError::new(
                    ErrorCode::NullCannotBeAssertedToBeANonNullableType,
                    "A null value cannot be asserted to be of a non-nullable type.".to_string(),
                    location,
                )],
                _ => Vec::new(),
            },
            ExpressionKind::EnumMember(raw) => self.check_enum_member(raw, expected, location),
            ExpressionKind::Path(_) => Vec::new(),
            ExpressionKind::Record {
                type_name,
                properties,
            } => self.check_record(type_name.as_deref(), properties, expected, location),
            ExpressionKind::Collection(elements) => {
                self.check_collection(elements, expected, location)
            }
            ExpressionKind::If {
                test,
                if_true,
                if_false,
            } => {
                let boolean = EdmTypeReference::primitive(PrimitiveTypeKind::Boolean, true);
                let mut errors = self.check_expression(test, Some(&boolean));
                errors.extend(self.check_expression(if_true, expected));
                errors.extend(self.check_expression(if_false, expected));
                errors
            }
            ExpressionKind::IsType { type_name, operand }
            | ExpressionKind::Cast { type_name, operand } => {
                let mut errors = Vec::new();
                if self.find_type(type_name).is_none()
                    && PrimitiveTypeKind::from_qualified_name(
                        &self.resolve_qualified(type_name),
                    )
                    .is_none()
                {
                    errors.push(EdmError::new(
                        ErrorCode::BadUnresolvedType,
                        format!("The type '{type_name}' could not be found."),
                        location,
                    ));
                }
                errors.extend(self.check_expression(operand, None));
                errors
            }
            ExpressionKind::Apply {
                function,
                arguments,
            } => self.check_apply(function, arguments, location),
            ExpressionKind::LabeledElement { expression, .. } => {
                self.check_expression(expression, expected)
            }
            ExpressionKind::LabeledElementReference(_) => Vec::new(),
        }
    }

    fn check_integer(
        &self,
        raw: &str,
        expected: Option<&EdmTypeReference>,
        location: Location,
    ) -> Vec<EdmError> {
        let mut errors = Vec::new();
        match raw.parse::<i64>() {
            Ok(value) => {
                if let Some(kind) = expected.and_then(|e| self.primitive_kind_of(e)) {
                    if let Some((min, max)) = kind.integral_range() {
                        if value < min || value > max {
                            errors.push(EdmError::new(
                                ErrorCode::InvalidInteger,
                                format!(
                                    "The value '{raw}' is out of range for type '{}'.",
                                    kind.qualified_name()
                                ),
                                location,
                            ));
                        }
                    }
                }
            }
            Err(_) => {
                errors.push(invalid_literal(
                    ErrorCode::InvalidInteger,
                    raw,
                    "integer",
                    location,
                ));
            }
        }

        errors.extend(self.check_integer_category(expected, location));
        errors
    }

    /// Category check shared by most constants: the expected type must be
    /// the matching primitive (or a type definition over it)
    fn check_constant_category(
        &self,
        actual: PrimitiveTypeKind,
        expected: Option<&EdmTypeReference>,
        location: Location,
    ) -> Vec<EdmError> {
        let Some(expected) = expected else {
            return Vec::new();
        };
        if expected.is_bad() {
            return Vec::new();
        }
        match self.primitive_kind_of(expected) {
            Some(kind) if kind == actual => Vec::new(),
            _ => vec![category_mismatch(actual.qualified_name(), expected, location)],
        }
    }

    fn check_integer_category(
        &self,
        expected: Option<&EdmTypeReference>,
        location: Location,
    ) -> Vec<EdmError> {
        let Some(expected) = expected else {
            return Vec::new();
        };
        if expected.is_bad() {
            return Vec::new();
        }
        match self.primitive_kind_of(expected) {
            Some(kind) if kind.is_integral() => Vec::new(),
            _ => vec![category_mismatch("integer", expected, location)],
        }
    }

    fn check_float_category(
        &self,
        expected: Option<&EdmTypeReference>,
        location: Location,
    ) -> Vec<EdmError> {
        let Some(expected) = expected else {
            return Vec::new();
        };
        if expected.is_bad() {
            return Vec::new();
        }
        match self.primitive_kind_of(expected) {
            Some(kind) if kind.is_floating() => Vec::new(),
            _ => vec![category_mismatch("floating point", expected, location)],
        }
    }

    fn check_record(
        &self,
        asserted: Option<&str>,
        properties: &[edm_ast::PropertyConstructor],
        expected: Option<&EdmTypeReference>,
        location: Location,
    ) -> Vec<EdmError> {
        let mut errors = Vec::new();

        let record_type = match asserted {
            Some(name) => match self.find_schema_element(name) {
                Some(handle) if handle.structured_kind().is_some() => Some(handle),
                _ => {
                    errors.push(EdmError::new(
                        ErrorCode::BadUnresolvedType,
                        format!("The type '{name}' could not be found."),
                        location,
                    ));
                    None
                }
            },
            None => match expected {
                Some(expected) if expected.is_bad() => None,
                Some(expected) => match &expected.definition {
                    EdmType::Entity(name) | EdmType::Complex(name) => self.find_canonical(name),
                    _ => {
                        errors.push(EdmError::new(
                            ErrorCode::ExpressionNotValidForTheAssertedType,
                            format!(
                                "A record expression is not valid for the non-structured type '{}'.",
                                expected.definition
                            ),
                            location,
                        ));
                        None
                    }
                },
                None => None,
            },
        };

        let Some(record_type) = record_type else {
            for constructor in properties {
                errors.extend(self.check_expression(&constructor.value, None));
            }
            return errors;
        };

        let declared = record_type.all_properties();

        for constructor in properties {
            match declared.iter().find(|p| p.name() == constructor.name) {
                Some(property) => {
                    let type_ref = match property {
                        PropertyDecl::Structural(p) => &p.type_ref,
                        PropertyDecl::Navigation(p) => &p.type_ref,
                    };
                    let property_type = record_type.model.resolve_type_reference(type_ref);
                    let expected_ref = (!property_type.is_bad()).then_some(&property_type);
                    errors.extend(self.check_expression(&constructor.value, expected_ref));
                }
                None => {
                    errors.push(EdmError::new(
                        ErrorCode::RecordExpressionHasExtraProperties,
                        format!(
                            "The record expression has a property '{}' that is not declared on type '{}'.",
                            constructor.name,
                            record_type.full_name()
                        ),
                        constructor.location,
                    ));
                }
            }
        }

        // Only nullable (or collection-valued) structural properties may
        // be omitted.
        for property in &declared {
            let PropertyDecl::Structural(structural) = property else {
                continue;
            };
            if properties.iter().any(|c| c.name == structural.name) {
                continue;
            }
            if structural.type_ref.is_collection || structural.type_ref.nullable_or_default() {
                continue;
            }
            errors.push(EdmError::new(
                ErrorCode::RecordExpressionMissingRequiredProperty,
                format!(
                    "The record expression is missing the non-nullable property '{}' of type '{}'.",
                    structural.name,
                    record_type.full_name()
                ),
                location,
            ));
        }

        errors
    }

    fn check_collection(
        &self,
        elements: &[Expression],
        expected: Option<&EdmTypeReference>,
        location: Location,
    ) -> Vec<EdmError> {
        let mut errors = Vec::new();

        let element_type = match expected {
            Some(expected) if expected.is_bad() => None,
            Some(expected) => match expected.element_type() {
                Some(element) => Some(element),
                None => {
                    errors.push(EdmError::new(
                        ErrorCode::CollectionExpressionNotValidForNonCollectionType,
                        format!(
                            "A collection expression is not valid for the non-collection type '{}'.",
                            expected.definition
                        ),
                        location,
                    ));
                    None
                }
            },
            None => None,
        };

        for element in elements {
            errors.extend(self.check_expression(element, element_type));
        }
        errors
    }

    fn check_apply(
        &self,
        function: &str,
        arguments: &[Expression],
        location: Location,
    ) -> Vec<EdmError> {
        let overloads = self.find_operations(function);
        let mut matching = overloads.iter().filter_map(|h| {
            h.as_operation()
                .filter(|decl| decl.parameters.len() == arguments.len())
                .map(|decl| (*h, decl))
        });

        let mut errors = Vec::new();
        match (matching.next(), matching.next()) {
            (Some((overload, decl)), None) => {
                for (argument, parameter) in arguments.iter().zip(&decl.parameters) {
                    let parameter_type =
                        overload.model.resolve_type_reference(&parameter.type_ref);
                    let expected = (!parameter_type.is_bad()).then_some(&parameter_type);
                    errors.extend(self.check_expression(argument, expected));
                }
            }
            _ => {
                errors.push(EdmError::new(
                    ErrorCode::BadUnresolvedOperation,
                    format!(
                        "The operation '{function}' could not be resolved to exactly one overload."
                    ),
                    location,
                ));
                for argument in arguments {
                    errors.extend(self.check_expression(argument, None));
                }
            }
        }
        errors
    }

    /// Check a space-separated `Namespace.Enum/Member` token sequence.
    ///
    /// Any malformed, unresolved, or mixed token makes the whole
    /// expression bad; the raw text is preserved in the message.
    fn check_enum_member(
        &self,
        raw: &str,
        expected: Option<&EdmTypeReference>,
        location: Location,
    ) -> Vec<EdmError> {
        let expected_enum = expected.and_then(|e| match &e.definition {
            EdmType::Enum(name) => Some(name.clone()),
            _ => None,
        });
        if let Some(expected) = expected {
            if !expected.is_bad() && expected_enum.is_none() {
                return vec![category_mismatch("enum member", expected, location)];
            }
        }

        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.is_empty() {
            return vec![invalid_enum_path(raw, location)];
        }

        let mut seen_enum: Option<String> = None;
        for token in &tokens {
            let Some((type_part, member)) = token.rsplit_once('/') else {
                return vec![invalid_enum_path(raw, location)];
            };

            let canonical = self.resolve_qualified(type_part);
            let Some(handle) = self.find_canonical(&canonical) else {
                return vec![EdmError::new(
                    ErrorCode::BadUnresolvedEnumMember,
                    format!("The enum member '{token}' in '{raw}' could not be found."),
                    location,
                )];
            };
            let SchemaElementDecl::EnumType(_) = handle.decl() else {
                return vec![invalid_enum_path(raw, location)];
            };

            let resolved = handle.model.resolve_enum(handle.key);
            if resolved.member(member).is_none() {
                return vec![EdmError::new(
                    ErrorCode::BadUnresolvedEnumMember,
                    format!("The enum member '{token}' in '{raw}' could not be found."),
                    location,
                )];
            }

            let full = handle.full_name();
            if let Some(previous) = &seen_enum {
                if *previous != full {
                    return vec![invalid_enum_path(raw, location)];
                }
            } else {
                seen_enum = Some(full.clone());
            }

            if tokens.len() > 1 && !resolved.is_flags {
                return vec![invalid_enum_path(raw, location)];
            }

            if let Some(expected_enum) = &expected_enum {
                if *expected_enum != full {
                    return vec![invalid_enum_path(raw, location)];
                }
            }
        }

        Vec::new()
    }

    /// The primitive kind behind a reference, looking through type
    /// definitions
    pub(crate) fn primitive_kind_of(
        &self,
        reference: &EdmTypeReference,
    ) -> Option<PrimitiveTypeKind> {
        match &reference.definition {
            EdmType::Primitive(kind) => Some(*kind),
            EdmType::TypeDefinition(name) => {
                let handle = self.find_canonical(name)?;
                match handle.decl() {
                    SchemaElementDecl::TypeDefinition(decl) => PrimitiveTypeKind::from_qualified_name(
                        &handle.model.resolve_qualified(&decl.underlying_type),
                    ),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

fn invalid_literal(code: ErrorCode, raw: &str, kind: &str, location: Location) -> EdmError {
    EdmError::new(
        code,
        format!("The value '{raw}' is not a valid {kind}."),
        location,
    )
}

fn invalid_enum_path(raw: &str, location: Location) -> EdmError {
    EdmError::new(
        ErrorCode::InvalidEnumMemberPath,
        format!("The enum member path '{raw}' is invalid."),
        location,
    )
}

fn category_mismatch(actual: &str, expected: &EdmTypeReference, location: Location) -> EdmError {
    EdmError::new(
        ErrorCode::ExpressionNotValidForTheAssertedType,
        format!(
            "A {actual} expression cannot be asserted to be of type '{}'.",
            expected.definition
        ),
        location,
    )
}

fn is_valid_float(raw: &str) -> bool {
    matches!(raw, "INF" | "-INF" | "NaN") || raw.parse::<f64>().is_ok()
}

fn is_valid_decimal(raw: &str) -> bool {
    let raw = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    if raw.is_empty() {
        return false;
    }
    match raw.split_once('.') {
        None => raw.bytes().all(|b| b.is_ascii_digit()),
        Some((whole, fraction)) => {
            !fraction.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && fraction.bytes().all(|b| b.is_ascii_digit())
        }
    }
}

fn is_valid_binary(raw: &str) -> bool {
    !raw.is_empty() && raw.len() % 2 == 0 && raw.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_valid_guid(raw: &str) -> bool {
    let groups: Vec<&str> = raw.split('-').collect();
    let lengths = [8, 4, 4, 4, 12];
    groups.len() == lengths.len()
        && groups
            .iter()
            .zip(lengths)
            .all(|(g, len)| g.len() == len && g.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// ISO 8601 duration: `[-]P[nD][T[nH][nM][n[.n]S]]` with at least one
/// component
fn is_valid_duration(raw: &str) -> bool {
    let raw = raw.strip_prefix('-').unwrap_or(raw);
    let Some(mut rest) = raw.strip_prefix('P') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }

    let mut any = false;
    if let Some((digits, after)) = split_number(rest) {
        if let Some(after) = after.strip_prefix('D') {
            if digits.contains('.') {
                return false;
            }
            any = true;
            rest = after;
        }
    }

    if let Some(time) = rest.strip_prefix('T') {
        rest = time;
        if rest.is_empty() {
            return false;
        }
        for unit in ['H', 'M', 'S'] {
            if let Some((digits, after)) = split_number(rest) {
                if let Some(after) = after.strip_prefix(unit) {
                    if unit != 'S' && digits.contains('.') {
                        return false;
                    }
                    any = true;
                    rest = after;
                }
            }
        }
    }

    any && rest.is_empty()
}

/// Split a leading decimal number off `raw`; `None` when there is none
fn split_number(raw: &str) -> Option<(&str, &str)> {
    let end = raw
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(raw.len());
    if end == 0 {
        return None;
    }
    let (digits, rest) = raw.split_at(end);
    if digits.starts_with('.') || digits.ends_with('.') || digits.matches('.').count() > 1 {
        return None;
    }
    Some((digits, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use edm_ast::PropertyConstructor;

    fn string_term_model() -> EdmModel {
        let mut doc = schema("NS1");
        doc.elements.push(term("Caption", "Edm.String"));
        doc.elements.push(term("Count", "Edm.Int32"));
        doc.elements.push(term("Tiny", "Edm.Byte"));
        model_from(vec![doc])
    }

    fn check(model: &EdmModel, term_name: &str, value: Expression) -> Vec<EdmError> {
        model.check_annotation_value(&annotation(term_name, Some(value)))
    }

    #[test]
    fn test_string_against_string_term() {
        let model = string_term_model();
        assert!(check(&model, "NS1.Caption", string_expr("hello")).is_empty());
    }

    #[test]
    fn test_string_against_int_term_is_category_error() {
        let model = string_term_model();
        let errors = check(&model, "NS1.Count", string_expr("hello"));

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].code,
            ErrorCode::ExpressionNotValidForTheAssertedType
        );
    }

    #[test]
    fn test_malformed_integer_is_local_error() {
        let model = string_term_model();
        let errors = check(&model, "NS1.Count", int_expr("fortytwo"));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::InvalidInteger);
    }

    #[test]
    fn test_integer_out_of_range_for_byte() {
        let model = string_term_model();
        let errors = check(&model, "NS1.Tiny", int_expr("300"));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::InvalidInteger);
        assert!(errors[0].message.contains("out of range"));
    }

    #[test]
    fn test_null_against_non_nullable() {
        let mut doc = schema("NS1");
        let mut required = match term("Required", "Edm.String") {
            edm_ast::SchemaElementDecl::Term(t) => t,
            _ => unreachable!(),
        };
        required.type_ref.nullable = Some(false);
        doc.elements
            .push(edm_ast::SchemaElementDecl::Term(required));
        doc.elements.push(term("Optional", "Edm.String"));
        let model = model_from(vec![doc]);

        let errors = check(&model, "NS1.Required", expr(ExpressionKind::Null));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].code,
            ErrorCode::NullCannotBeAssertedToBeANonNullableType
        );

        assert!(check(&model, "NS1.Optional", expr(ExpressionKind::Null)).is_empty());
    }

    #[test]
    fn test_record_extra_and_missing_properties() {
        let mut doc = schema("NS1");
        let mut address = match complex_type("Address", None) {
            edm_ast::SchemaElementDecl::ComplexType(d) => d,
            _ => unreachable!(),
        };
        let mut city = match structural_property("City", "Edm.String") {
            PropertyDecl::Structural(p) => p,
            PropertyDecl::Navigation(_) => unreachable!(),
        };
        city.type_ref.nullable = Some(false);
        address.properties.push(PropertyDecl::Structural(city));
        address
            .properties
            .push(structural_property("Zip", "Edm.String"));
        doc.elements
            .push(edm_ast::SchemaElementDecl::ComplexType(address));
        doc.elements.push(term("Location", "NS1.Address"));
        let model = model_from(vec![doc]);

        // Extra property, and the non-nullable City is omitted.
        let record = expr(ExpressionKind::Record {
            type_name: None,
            properties: vec![PropertyConstructor {
                name: "Country".to_string(),
                value: string_expr("IT"),
                location: edm_ast::Location::new(4, 2),
            }],
        });
        let errors = check(&model, "NS1.Location", record);

        let codes: Vec<ErrorCode> = errors.iter().map(|e| e.code).collect();
        assert!(codes.contains(&ErrorCode::RecordExpressionHasExtraProperties));
        assert!(codes.contains(&ErrorCode::RecordExpressionMissingRequiredProperty));

        // Supplying City and omitting the nullable Zip is clean.
        let record = expr(ExpressionKind::Record {
            type_name: None,
            properties: vec![PropertyConstructor {
                name: "City".to_string(),
                value: string_expr("Rome"),
                location: edm_ast::Location::new(4, 2),
            }],
        });
        assert!(check(&model, "NS1.Location", record).is_empty());
    }

    #[test]
    fn test_collection_against_non_collection() {
        let model = string_term_model();
        let errors = check(
            &model,
            "NS1.Caption",
            expr(ExpressionKind::Collection(vec![string_expr("a")])),
        );

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].code,
            ErrorCode::CollectionExpressionNotValidForNonCollectionType
        );
    }

    #[test]
    fn test_collection_elements_checked_against_element_type() {
        let mut doc = schema("NS1");
        doc.elements.push(term("Tags", "Collection(Edm.String)"));
        let model = model_from(vec![doc]);

        let clean = check(
            &model,
            "NS1.Tags",
            expr(ExpressionKind::Collection(vec![
                string_expr("a"),
                string_expr("b"),
            ])),
        );
        assert!(clean.is_empty());

        let broken = check(
            &model,
            "NS1.Tags",
            expr(ExpressionKind::Collection(vec![int_expr("1")])),
        );
        assert_eq!(broken.len(), 1);
        assert_eq!(
            broken[0].code,
            ErrorCode::ExpressionNotValidForTheAssertedType
        );
    }

    #[test]
    fn test_if_checks_condition_and_both_branches() {
        let model = string_term_model();
        let errors = check(
            &model,
            "NS1.Caption",
            expr(ExpressionKind::If {
                test: Box::new(string_expr("not a bool")),
                if_true: Box::new(string_expr("yes")),
                if_false: Box::new(int_expr("0")),
            }),
        );

        // Condition category error plus the false branch category error.
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_apply_overload_resolution() {
        let mut doc = schema("NS1");
        doc.elements.push(operation("Concat", &["Edm.String"]));
        doc.elements
            .push(operation("Concat", &["Edm.String", "Edm.String"]));
        doc.elements.push(term("Caption", "Edm.String"));
        let model = model_from(vec![doc]);

        let clean = check(
            &model,
            "NS1.Caption",
            expr(ExpressionKind::Apply {
                function: "NS1.Concat".to_string(),
                arguments: vec![string_expr("a"), string_expr("b")],
            }),
        );
        assert!(clean.is_empty());

        let missing = check(
            &model,
            "NS1.Caption",
            expr(ExpressionKind::Apply {
                function: "NS1.Concat".to_string(),
                arguments: vec![string_expr("a"), string_expr("b"), string_expr("c")],
            }),
        );
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].code, ErrorCode::BadUnresolvedOperation);
    }

    #[test]
    fn test_enum_member_expression() {
        let mut doc = schema("NS1");
        doc.elements.push(enum_type(
            "Color",
            None,
            &[("Red", None), ("Green", None)],
        ));
        doc.elements.push(enum_type("Size", None, &[("Big", None)]));
        doc.elements.push(term("Paint", "NS1.Color"));
        let model = model_from(vec![doc]);

        let clean = check(
            &model,
            "NS1.Paint",
            expr(ExpressionKind::EnumMember("NS1.Color/Red".to_string())),
        );
        assert!(clean.is_empty());

        let mixed = check(
            &model,
            "NS1.Paint",
            expr(ExpressionKind::EnumMember(
                "NS1.Color/Red NS1.Size/Big".to_string(),
            )),
        );
        assert_eq!(mixed.len(), 1);
        assert_eq!(mixed[0].code, ErrorCode::InvalidEnumMemberPath);
        assert!(mixed[0].message.contains("NS1.Color/Red NS1.Size/Big"));

        let unknown = check(
            &model,
            "NS1.Paint",
            expr(ExpressionKind::EnumMember("NS1.Color/Blue".to_string())),
        );
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].code, ErrorCode::BadUnresolvedEnumMember);
    }

    #[test]
    fn test_duration_literals() {
        assert!(is_valid_duration("P1D"));
        assert!(is_valid_duration("PT12H30M5S"));
        assert!(is_valid_duration("-P1DT2H"));
        assert!(is_valid_duration("PT0.5S"));
        assert!(!is_valid_duration("P"));
        assert!(!is_valid_duration("PT"));
        assert!(!is_valid_duration("1D"));
        assert!(!is_valid_duration("P1.5D"));
    }

    #[test]
    fn test_decimal_and_guid_literals() {
        assert!(is_valid_decimal("3.14"));
        assert!(is_valid_decimal("-42"));
        assert!(!is_valid_decimal("3."));
        assert!(!is_valid_decimal(".5"));
        assert!(!is_valid_decimal("1.2.3"));

        assert!(is_valid_guid("21EC2020-3AEA-1069-A2DD-08002B30309D"));
        assert!(!is_valid_guid("21EC2020-3AEA-1069-A2DD"));
        assert!(!is_valid_guid("21EC2020-3AEA-1069-A2DD-08002B30309Z"));
    }
}
