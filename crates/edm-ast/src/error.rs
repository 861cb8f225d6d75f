//! EDM diagnostics
//!
//! `EdmError` is plain data, not a `std::error::Error`: diagnostics are
//! collected and returned, never thrown. The string rendering
//! `"<code> : <message> : (<line>, <column>)"` is part of the public
//! contract and must not change.

use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of EDM diagnostic codes.
///
/// The variant name is the wire code: `Display` renders it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Structural errors reported by the CSDL reader. These are the only
    // codes that flip `parse` to unsuccessful.
    /// The document is not well-formed XML.
    MalformedXml,
    /// A required attribute is missing from an element.
    MissingAttribute,
    /// An element is not valid at its position in the document.
    UnexpectedElement,
    /// An attribute is not valid on its element.
    UnexpectedAttribute,
    /// A qualified name or alias does not have the required shape.
    InvalidQualifiedName,
    /// A simple name contains characters outside the allowed set.
    InvalidName,
    /// A boolean attribute is neither `true` nor `false`.
    InvalidBoolean,
    /// An integer attribute failed to parse.
    InvalidInteger,
    /// A `MaxLength` facet is neither `max` nor a non-negative integer.
    InvalidMaxLength,
    /// A `Precision` facet failed to parse.
    InvalidPrecision,
    /// A `Scale` facet is neither `variable` nor an integer.
    InvalidScale,
    /// An `SRID` facet is neither `variable` nor a non-negative integer.
    InvalidSrid,
    /// An `OnDelete` action is not one of the defined actions.
    InvalidOnDeleteAction,

    // Literal errors attached to annotation expression nodes.
    /// A floating point literal failed culture-invariant parsing.
    InvalidFloatingPoint,
    /// A decimal literal failed culture-invariant parsing.
    InvalidDecimal,
    /// A GUID literal does not match the canonical form.
    InvalidGuid,
    /// A date-time-offset literal failed culture-invariant parsing.
    InvalidDateTimeOffset,
    /// A duration literal is not a valid ISO 8601 duration.
    InvalidDuration,
    /// A binary literal is not valid hex.
    InvalidBinary,
    /// An enum member path is malformed or names members of different enums.
    InvalidEnumMemberPath,

    // Unresolved references carried by Bad placeholders.
    /// A named type could not be found.
    BadUnresolvedType,
    /// A named term could not be found.
    BadUnresolvedTerm,
    /// A named operation could not be resolved to exactly one overload.
    BadUnresolvedOperation,
    /// An entity set or singleton segment could not be found.
    BadUnresolvedEntitySet,
    /// An operation parameter segment could not be found.
    BadUnresolvedParameter,
    /// A navigation property path segment could not be found.
    BadUnresolvedNavigationPropertyPath,
    /// A structural property could not be found.
    BadUnresolvedProperty,
    /// An enum member could not be found.
    BadUnresolvedEnumMember,
    /// An annotation target could not be resolved.
    BadUnresolvedTarget,
    /// An entity type participates in a base type cycle.
    BadCyclicEntity,
    /// A complex type participates in a base type cycle.
    BadCyclicComplex,

    // Validation findings.
    /// Two schema elements share a full name.
    AlreadyDefined,
    /// Two properties of one structured type share a name.
    PropertyNameAlreadyDefined,
    /// Two members of one enum type share a name.
    DuplicateEnumMemberName,
    /// Two parameters of one operation share a name.
    DuplicateParameterName,
    /// Two elements of one entity container share a name.
    DuplicateEntityContainerMemberName,
    /// The same term/qualifier pair is applied twice to one target.
    DuplicateAnnotation,
    /// An entity type with no base type declares no key.
    KeyMissingOnEntityType,
    /// A key property is nullable.
    KeyPropertyMustBeNonNullable,
    /// An open type derives from a closed base type.
    OpenTypeBaseTypeMustBeOpen,
    /// An enum member value does not fit the underlying type.
    EnumMemberValueOutOfRange,
    /// An enum underlying type is not an integral primitive.
    EnumMustHaveIntegerUnderlyingType,
    /// A type definition's underlying type is not primitive.
    UnderlyingTypeMustBePrimitive,
    /// A collection navigation property carries a `Nullable` attribute.
    NavigationPropertyWithCollectionTypeCannotHaveNullableAttribute,
    /// A navigation property type is not an entity or entity collection.
    NavigationPropertyTypeMustBeEntityOrCollectionOfEntity,
    /// Partner navigation properties disagree about their pairing.
    InconsistentNavigationPropertyPartner,
    /// A referential constraint names a property that does not exist.
    ReferentialConstraintPropertyNotFound,
    /// An entity set's declared type is not an entity type.
    EntitySetTypeMustBeEntityType,
    /// A bound operation declares no parameters.
    BoundOperationMustHaveParameters,
    /// A function declares no return type.
    FunctionMustHaveReturnType,
    /// An expression cannot be given the type asserted for it.
    ExpressionNotValidForTheAssertedType,
    /// A record supplies properties absent from its asserted type.
    RecordExpressionHasExtraProperties,
    /// A record omits a non-nullable property of its asserted type.
    RecordExpressionMissingRequiredProperty,
    /// A null expression is asserted to be of a non-nullable type.
    NullCannotBeAssertedToBeANonNullableType,
    /// A non-collection expression is asserted to be a collection type.
    CollectionExpressionNotValidForNonCollectionType,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A single EDM diagnostic with its source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdmError {
    /// Diagnostic code
    pub code: ErrorCode,

    /// Human-readable message
    pub message: String,

    /// Position in the source document
    pub location: Location,
}

impl EdmError {
    /// Create a new diagnostic
    pub fn new(code: ErrorCode, message: impl Into<String>, location: Location) -> Self {
        Self {
            code,
            message: message.into(),
            location,
        }
    }

    /// Whether this is a structural (parse-aborting) code
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::MalformedXml
                | ErrorCode::MissingAttribute
                | ErrorCode::UnexpectedElement
                | ErrorCode::UnexpectedAttribute
                | ErrorCode::InvalidQualifiedName
                | ErrorCode::InvalidBoolean
                | ErrorCode::InvalidInteger
                | ErrorCode::InvalidMaxLength
                | ErrorCode::InvalidPrecision
                | ErrorCode::InvalidScale
                | ErrorCode::InvalidSrid
                | ErrorCode::InvalidOnDeleteAction
        )
    }
}

impl fmt::Display for EdmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : {} : ({}, {})",
            self.code, self.message, self.location.line, self.location.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display_is_variant_name() {
        assert_eq!(ErrorCode::AlreadyDefined.to_string(), "AlreadyDefined");
        assert_eq!(
            ErrorCode::NavigationPropertyWithCollectionTypeCannotHaveNullableAttribute.to_string(),
            "NavigationPropertyWithCollectionTypeCannotHaveNullableAttribute"
        );
        assert_eq!(ErrorCode::BadCyclicEntity.to_string(), "BadCyclicEntity");
    }

    #[test]
    fn test_error_display_format() {
        let error = EdmError::new(
            ErrorCode::AlreadyDefined,
            "An element with the name 'NS.Person' is already defined.",
            Location::new(4, 6),
        );

        assert_eq!(
            error.to_string(),
            "AlreadyDefined : An element with the name 'NS.Person' is already defined. : (4, 6)"
        );
    }

    #[test]
    fn test_structural_classification() {
        let structural = EdmError::new(ErrorCode::MissingAttribute, "m", Location::new(1, 1));
        let semantic = EdmError::new(ErrorCode::BadUnresolvedType, "m", Location::new(1, 1));

        assert!(structural.is_structural());
        assert!(!semantic.is_structural());
    }

    #[test]
    fn test_error_serializes_to_json() {
        let error = EdmError::new(ErrorCode::BadCyclicComplex, "cyclic", Location::new(2, 3));
        let json = serde_json::to_string(&error).unwrap();

        assert!(json.contains("\"BadCyclicComplex\""));
        assert!(json.contains("\"line\":2"));
    }
}
