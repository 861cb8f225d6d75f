//! Validation rules
//!
//! Each rule is an independent unit scoped to one element kind. Rules
//! surface the same errors the model carries inline on its `Bad` values,
//! so the aggregate and inline views stay consistent.

use edm_ast::{
    ContainerElementDecl, EdmError, ErrorCode, NavigationPropertyDecl, OperationKind,
    PropertyDecl, SchemaElementDecl,
};
use edm_model::{EdmModel, EdmType, ElementHandle, ModelAnnotation};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Identifiers of the individual validation rules.
///
/// Rule sets are plain lists of these identifiers; supporting a new
/// specification version is a data change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    NamedElementMustHaveValidName,
    SchemaElementNameMustBeUnique,
    StructuredTypeBaseTypeMustBeResolvable,
    StructuredTypePropertyTypesMustBeResolvable,
    StructuredTypePropertyNamesMustBeUnique,
    OpenTypeBaseTypeMustBeOpen,
    EntityTypeKeyRequired,
    EntityTypeKeyPropertiesMustBeValid,
    NavigationPropertyCollectionMustNotHaveNullableAttribute,
    NavigationPropertyTypeMustBeEntity,
    NavigationPropertyPartnerMustBeConsistent,
    NavigationPropertyConstraintPropertiesMustExist,
    EnumTypeMembersMustBeValid,
    EnumTypeMemberNamesMustBeUnique,
    TypeDefinitionUnderlyingTypeMustBePrimitive,
    TermTypeMustBeResolvable,
    OperationTypesMustBeResolvable,
    OperationParameterNamesMustBeUnique,
    BoundOperationMustHaveParameters,
    FunctionMustHaveReturnType,
    EntityContainerMemberNamesMustBeUnique,
    EntitySetTypeMustBeEntityType,
    NavigationPropertyBindingsMustBeValid,
    OperationImportOperationMustBeResolvable,
    AnnotationTermMustBeResolvable,
    AnnotationTargetMustBeResolvable,
    AnnotationMustNotBeDuplicated,
    AnnotationValueMustMatchTermType,
}

/// The element kind a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    AnySchemaElement,
    StructuredType,
    EntityType,
    EnumType,
    TypeDefinition,
    Term,
    Operation,
    EntityContainer,
    Annotation,
}

impl RuleId {
    /// The scope this rule runs in
    #[must_use]
    pub fn scope(self) -> RuleScope {
        match self {
            Self::NamedElementMustHaveValidName | Self::SchemaElementNameMustBeUnique => {
                RuleScope::AnySchemaElement
            }
            Self::StructuredTypeBaseTypeMustBeResolvable
            | Self::StructuredTypePropertyTypesMustBeResolvable
            | Self::StructuredTypePropertyNamesMustBeUnique
            | Self::OpenTypeBaseTypeMustBeOpen
            | Self::NavigationPropertyCollectionMustNotHaveNullableAttribute
            | Self::NavigationPropertyTypeMustBeEntity
            | Self::NavigationPropertyPartnerMustBeConsistent
            | Self::NavigationPropertyConstraintPropertiesMustExist => RuleScope::StructuredType,
            Self::EntityTypeKeyRequired | Self::EntityTypeKeyPropertiesMustBeValid => {
                RuleScope::EntityType
            }
            Self::EnumTypeMembersMustBeValid | Self::EnumTypeMemberNamesMustBeUnique => {
                RuleScope::EnumType
            }
            Self::TypeDefinitionUnderlyingTypeMustBePrimitive => RuleScope::TypeDefinition,
            Self::TermTypeMustBeResolvable => RuleScope::Term,
            Self::OperationTypesMustBeResolvable
            | Self::OperationParameterNamesMustBeUnique
            | Self::BoundOperationMustHaveParameters
            | Self::FunctionMustHaveReturnType => RuleScope::Operation,
            Self::EntityContainerMemberNamesMustBeUnique
            | Self::EntitySetTypeMustBeEntityType
            | Self::NavigationPropertyBindingsMustBeValid
            | Self::OperationImportOperationMustBeResolvable => RuleScope::EntityContainer,
            Self::AnnotationTermMustBeResolvable
            | Self::AnnotationTargetMustBeResolvable
            | Self::AnnotationMustNotBeDuplicated
            | Self::AnnotationValueMustMatchTermType => RuleScope::Annotation,
        }
    }
}

impl RuleScope {
    /// Whether an element falls into this scope
    #[must_use]
    pub fn matches(self, element: &ElementHandle<'_>) -> bool {
        match self {
            Self::AnySchemaElement => true,
            Self::StructuredType => element.structured_kind().is_some(),
            Self::EntityType => element.as_entity().is_some(),
            Self::EnumType => matches!(element.decl(), SchemaElementDecl::EnumType(_)),
            Self::TypeDefinition => {
                matches!(element.decl(), SchemaElementDecl::TypeDefinition(_))
            }
            Self::Term => element.as_term().is_some(),
            Self::Operation => element.as_operation().is_some(),
            Self::EntityContainer => element.as_container().is_some(),
            Self::Annotation => false,
        }
    }
}

/// Per-run state shared between rules
pub struct RuleContext<'m> {
    pub model: &'m EdmModel,
    seen_names: HashMap<String, bool>,
    annotation_counts: HashMap<(String, String, Option<String>), usize>,
}

impl<'m> RuleContext<'m> {
    /// Fresh context for one validation run
    #[must_use]
    pub fn new(model: &'m EdmModel) -> Self {
        Self {
            model,
            seen_names: HashMap::new(),
            annotation_counts: HashMap::new(),
        }
    }

    /// Pre-compute duplicate groups before the annotation pass
    pub fn count_annotations(&mut self, annotations: &[ModelAnnotation<'_>]) {
        for annotation in annotations {
            *self
                .annotation_counts
                .entry(annotation_key(annotation))
                .or_insert(0) += 1;
        }
    }
}

fn annotation_key(annotation: &ModelAnnotation<'_>) -> (String, String, Option<String>) {
    (
        annotation.target.path(),
        annotation.term.clone(),
        annotation.qualifier.clone(),
    )
}

static SIMPLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid pattern"));

/// Run one element-scoped rule
#[must_use]
pub fn run_element_rule(
    rule: RuleId,
    ctx: &mut RuleContext<'_>,
    element: ElementHandle<'_>,
) -> Vec<EdmError> {
    match rule {
        RuleId::NamedElementMustHaveValidName => valid_name(element),
        RuleId::SchemaElementNameMustBeUnique => unique_name(ctx, element),
        RuleId::StructuredTypeBaseTypeMustBeResolvable => {
            element.base_outcome().error().cloned().into_iter().collect()
        }
        RuleId::StructuredTypePropertyTypesMustBeResolvable => property_types(element),
        RuleId::StructuredTypePropertyNamesMustBeUnique => unique_properties(element),
        RuleId::OpenTypeBaseTypeMustBeOpen => open_base(element),
        RuleId::EntityTypeKeyRequired => key_required(element),
        RuleId::EntityTypeKeyPropertiesMustBeValid => key_properties(element),
        RuleId::NavigationPropertyCollectionMustNotHaveNullableAttribute => {
            collection_nullable(element)
        }
        RuleId::NavigationPropertyTypeMustBeEntity => navigation_type(element),
        RuleId::NavigationPropertyPartnerMustBeConsistent => partner_consistency(element),
        RuleId::NavigationPropertyConstraintPropertiesMustExist => constraint_properties(element),
        RuleId::EnumTypeMembersMustBeValid => {
            element.model.resolve_enum(element.key).errors.clone()
        }
        RuleId::EnumTypeMemberNamesMustBeUnique => unique_enum_members(element),
        RuleId::TypeDefinitionUnderlyingTypeMustBePrimitive => type_definition_underlying(element),
        RuleId::TermTypeMustBeResolvable => term_type(element),
        RuleId::OperationTypesMustBeResolvable => operation_types(element),
        RuleId::OperationParameterNamesMustBeUnique => unique_parameters(element),
        RuleId::BoundOperationMustHaveParameters => bound_parameters(element),
        RuleId::FunctionMustHaveReturnType => function_return(element),
        RuleId::EntityContainerMemberNamesMustBeUnique => unique_container_members(element),
        RuleId::EntitySetTypeMustBeEntityType => entity_set_types(element),
        RuleId::NavigationPropertyBindingsMustBeValid => bindings(element),
        RuleId::OperationImportOperationMustBeResolvable => operation_imports(element),
        _ => Vec::new(),
    }
}

/// Run one annotation-scoped rule
#[must_use]
pub fn run_annotation_rule(
    rule: RuleId,
    ctx: &RuleContext<'_>,
    annotation: &ModelAnnotation<'_>,
) -> Vec<EdmError> {
    match rule {
        RuleId::AnnotationTermMustBeResolvable => {
            if ctx.model.find_term(&annotation.term).is_none() {
                vec![EdmError::new(
                    ErrorCode::BadUnresolvedTerm,
                    format!("The term '{}' could not be found.", annotation.decl.term),
                    annotation.location(),
                )]
            } else {
                Vec::new()
            }
        }
        RuleId::AnnotationTargetMustBeResolvable => {
            annotation.target.error().cloned().into_iter().collect()
        }
        RuleId::AnnotationMustNotBeDuplicated => {
            let count = ctx
                .annotation_counts
                .get(&annotation_key(annotation))
                .copied()
                .unwrap_or(0);
            if count > 1 {
                let qualifier = match &annotation.qualifier {
                    Some(q) => format!(" and qualifier '{q}'"),
                    None => String::new(),
                };
                vec![EdmError::new(
                    ErrorCode::DuplicateAnnotation,
                    format!(
                        "The annotation with term '{}'{qualifier} is applied more than once to the target '{}'.",
                        annotation.term,
                        annotation.target.path()
                    ),
                    annotation.location(),
                )]
            } else {
                Vec::new()
            }
        }
        RuleId::AnnotationValueMustMatchTermType => {
            ctx.model.check_annotation_value(annotation.decl)
        }
        _ => Vec::new(),
    }
}

fn valid_name(element: ElementHandle<'_>) -> Vec<EdmError> {
    let name = element.decl().name();
    if SIMPLE_NAME.is_match(name) {
        Vec::new()
    } else {
        vec![EdmError::new(
            ErrorCode::InvalidName,
            format!("The name '{name}' is not a valid simple name."),
            element.location(),
        )]
    }
}

fn unique_name(ctx: &mut RuleContext<'_>, element: ElementHandle<'_>) -> Vec<EdmError> {
    let full_name = element.full_name();
    let is_operation = element.as_operation().is_some();

    match ctx.seen_names.get(&full_name).copied() {
        // Operations sharing a name form an overload set, not a clash.
        Some(previous_is_operation) if previous_is_operation && is_operation => Vec::new(),
        Some(_) => vec![EdmError::new(
            ErrorCode::AlreadyDefined,
            format!("An element with the name '{full_name}' is already defined."),
            element.location(),
        )],
        None => {
            ctx.seen_names.insert(full_name, is_operation);
            Vec::new()
        }
    }
}

fn property_types(element: ElementHandle<'_>) -> Vec<EdmError> {
    let mut errors = Vec::new();
    for property in element.declared_properties() {
        let type_ref = match property {
            PropertyDecl::Structural(p) => &p.type_ref,
            PropertyDecl::Navigation(p) => &p.type_ref,
        };
        errors.extend(element.model.resolve_type_reference(type_ref).errors());
    }
    errors
}

fn unique_properties(element: ElementHandle<'_>) -> Vec<EdmError> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    for property in element.declared_properties() {
        if !seen.insert(property.name().to_string()) {
            errors.push(EdmError::new(
                ErrorCode::PropertyNameAlreadyDefined,
                format!(
                    "The property '{}' is already defined on type '{}'.",
                    property.name(),
                    element.full_name()
                ),
                property.location(),
            ));
        }
    }
    errors
}

fn open_base(element: ElementHandle<'_>) -> Vec<EdmError> {
    if !element.is_open() {
        return Vec::new();
    }
    match element.base_type() {
        Some(base) if !base.is_open() => vec![EdmError::new(
            ErrorCode::OpenTypeBaseTypeMustBeOpen,
            format!(
                "The open type '{}' has a base type '{}' that is not open.",
                element.full_name(),
                base.full_name()
            ),
            element.location(),
        )],
        _ => Vec::new(),
    }
}

fn key_required(element: ElementHandle<'_>) -> Vec<EdmError> {
    let Some(decl) = element.as_entity() else {
        return Vec::new();
    };
    let has_key = decl
        .key
        .as_ref()
        .is_some_and(|k| !k.property_refs.is_empty());
    if decl.base_type.is_none() && !has_key && !decl.is_abstract {
        vec![EdmError::new(
            ErrorCode::KeyMissingOnEntityType,
            format!("The entity type '{}' has no key defined.", element.full_name()),
            element.location(),
        )]
    } else {
        Vec::new()
    }
}

fn key_properties(element: ElementHandle<'_>) -> Vec<EdmError> {
    let Some(decl) = element.as_entity() else {
        return Vec::new();
    };
    let Some(key) = &decl.key else {
        return Vec::new();
    };

    let mut errors = Vec::new();
    for property_ref in &key.property_refs {
        match element.find_property(&property_ref.name) {
            Some(PropertyDecl::Structural(property)) => {
                if property.type_ref.nullable_or_default() {
                    errors.push(EdmError::new(
                        ErrorCode::KeyPropertyMustBeNonNullable,
                        format!(
                            "The key property '{}' of entity type '{}' must not be nullable.",
                            property_ref.name,
                            element.full_name()
                        ),
                        property_ref.location,
                    ));
                }
            }
            _ => {
                errors.push(EdmError::new(
                    ErrorCode::BadUnresolvedProperty,
                    format!(
                        "The key property '{}' could not be found on type '{}'.",
                        property_ref.name,
                        element.full_name()
                    ),
                    property_ref.location,
                ));
            }
        }
    }
    errors
}

fn navigation_properties<'m>(element: ElementHandle<'m>) -> Vec<&'m NavigationPropertyDecl> {
    element
        .declared_properties()
        .iter()
        .filter_map(|p| match p {
            PropertyDecl::Navigation(n) => Some(n),
            PropertyDecl::Structural(_) => None,
        })
        .collect()
}

fn collection_nullable(element: ElementHandle<'_>) -> Vec<EdmError> {
    navigation_properties(element)
        .into_iter()
        .filter(|p| p.type_ref.is_collection && p.type_ref.nullable.is_some())
        .map(|p| {
            EdmError::new(
                ErrorCode::NavigationPropertyWithCollectionTypeCannotHaveNullableAttribute,
                "The 'Nullable' attribute cannot be specified for a navigation property with collection type.",
                p.location,
            )
        })
        .collect()
}

fn navigation_type(element: ElementHandle<'_>) -> Vec<EdmError> {
    let mut errors = Vec::new();
    for property in navigation_properties(element) {
        let resolved = element.model.resolve_type_reference(&property.type_ref);
        if resolved.is_bad() {
            // Already surfaced by the property type rule.
            continue;
        }
        let target_is_entity = match &resolved.definition {
            EdmType::Entity(_) => true,
            EdmType::Collection(inner) => matches!(inner.definition, EdmType::Entity(_)),
            _ => false,
        };
        if !target_is_entity {
            errors.push(EdmError::new(
                ErrorCode::NavigationPropertyTypeMustBeEntityOrCollectionOfEntity,
                format!(
                    "The type of navigation property '{}' must be an entity type or a collection of entity type.",
                    property.name
                ),
                property.location,
            ));
        }
    }
    errors
}

/// Navigation target entity of a navigation property, when resolvable
fn navigation_target<'m>(
    element: ElementHandle<'m>,
    property: &NavigationPropertyDecl,
) -> Option<ElementHandle<'m>> {
    let resolved = element.model.resolve_type_reference(&property.type_ref);
    let name = match &resolved.definition {
        EdmType::Entity(name) => name.clone(),
        EdmType::Collection(inner) => match &inner.definition {
            EdmType::Entity(name) => name.clone(),
            _ => return None,
        },
        _ => return None,
    };
    element.model.find_schema_element(&name)
}

fn partner_consistency(element: ElementHandle<'_>) -> Vec<EdmError> {
    let mut errors = Vec::new();

    for property in navigation_properties(element) {
        let Some(partner_name) = &property.partner else {
            continue;
        };
        let Some(target) = navigation_target(element, property) else {
            continue;
        };

        let partner = target.find_property(partner_name).and_then(|p| match p {
            PropertyDecl::Navigation(n) => Some(n),
            PropertyDecl::Structural(_) => None,
        });

        let Some(partner) = partner else {
            errors.push(EdmError::new(
                ErrorCode::InconsistentNavigationPropertyPartner,
                format!(
                    "The partner '{partner_name}' of navigation property '{}' could not be found on type '{}'.",
                    property.name,
                    target.full_name()
                ),
                property.location,
            ));
            continue;
        };

        if let Some(back) = &partner.partner {
            if back != &property.name {
                errors.push(EdmError::new(
                    ErrorCode::InconsistentNavigationPropertyPartner,
                    format!(
                        "The navigation property '{}' and its partner '{partner_name}' do not reference each other.",
                        property.name
                    ),
                    property.location,
                ));
            }
        }

        // The dependent role belongs to the end declaring constraints;
        // both ends declaring them leaves the direction ambiguous.
        if !property.referential_constraints.is_empty()
            && !partner.referential_constraints.is_empty()
        {
            errors.push(EdmError::new(
                ErrorCode::InconsistentNavigationPropertyPartner,
                format!(
                    "The navigation property '{}' and its partner '{partner_name}' both declare referential constraints.",
                    property.name
                ),
                property.location,
            ));
        }
    }
    errors
}

fn constraint_properties(element: ElementHandle<'_>) -> Vec<EdmError> {
    let mut errors = Vec::new();

    for property in navigation_properties(element) {
        let target = navigation_target(element, property);
        for constraint in &property.referential_constraints {
            let dependent = element.find_property(&constraint.property);
            if !matches!(dependent, Some(PropertyDecl::Structural(_))) {
                errors.push(EdmError::new(
                    ErrorCode::ReferentialConstraintPropertyNotFound,
                    format!(
                        "The dependent property '{}' could not be found on type '{}'.",
                        constraint.property,
                        element.full_name()
                    ),
                    constraint.location,
                ));
            }
            if let Some(target) = target {
                let principal = target.find_property(&constraint.referenced_property);
                if !matches!(principal, Some(PropertyDecl::Structural(_))) {
                    errors.push(EdmError::new(
                        ErrorCode::ReferentialConstraintPropertyNotFound,
                        format!(
                            "The principal property '{}' could not be found on type '{}'.",
                            constraint.referenced_property,
                            target.full_name()
                        ),
                        constraint.location,
                    ));
                }
            }
        }
    }
    errors
}

fn unique_enum_members(element: ElementHandle<'_>) -> Vec<EdmError> {
    let SchemaElementDecl::EnumType(decl) = element.decl() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    for member in &decl.members {
        if !seen.insert(member.name.as_str()) {
            errors.push(EdmError::new(
                ErrorCode::DuplicateEnumMemberName,
                format!(
                    "The member '{}' is already defined on enum type '{}'.",
                    member.name,
                    element.full_name()
                ),
                member.location,
            ));
        }
    }
    errors
}

fn type_definition_underlying(element: ElementHandle<'_>) -> Vec<EdmError> {
    let SchemaElementDecl::TypeDefinition(decl) = element.decl() else {
        return Vec::new();
    };
    let canonical = element.model.resolve_qualified(&decl.underlying_type);
    if edm_model::PrimitiveTypeKind::from_qualified_name(&canonical).is_some() {
        Vec::new()
    } else {
        vec![EdmError::new(
            ErrorCode::UnderlyingTypeMustBePrimitive,
            format!(
                "The underlying type of '{}' must be a primitive type.",
                element.full_name()
            ),
            decl.location,
        )]
    }
}

fn term_type(element: ElementHandle<'_>) -> Vec<EdmError> {
    match element.as_term() {
        Some(decl) => element.model.resolve_type_reference(&decl.type_ref).errors(),
        None => Vec::new(),
    }
}

fn operation_types(element: ElementHandle<'_>) -> Vec<EdmError> {
    let Some(decl) = element.as_operation() else {
        return Vec::new();
    };
    let mut errors = Vec::new();
    for parameter in &decl.parameters {
        errors.extend(element.model.resolve_type_reference(&parameter.type_ref).errors());
    }
    if let Some(return_type) = &decl.return_type {
        errors.extend(
            element
                .model
                .resolve_type_reference(&return_type.type_ref)
                .errors(),
        );
    }
    errors
}

fn unique_parameters(element: ElementHandle<'_>) -> Vec<EdmError> {
    let Some(decl) = element.as_operation() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    for parameter in &decl.parameters {
        if !seen.insert(parameter.name.as_str()) {
            errors.push(EdmError::new(
                ErrorCode::DuplicateParameterName,
                format!(
                    "The parameter '{}' is already defined on operation '{}'.",
                    parameter.name,
                    element.full_name()
                ),
                parameter.location,
            ));
        }
    }
    errors
}

fn bound_parameters(element: ElementHandle<'_>) -> Vec<EdmError> {
    let Some(decl) = element.as_operation() else {
        return Vec::new();
    };
    if decl.is_bound && decl.parameters.is_empty() {
        vec![EdmError::new(
            ErrorCode::BoundOperationMustHaveParameters,
            format!(
                "The bound operation '{}' must have at least one parameter.",
                element.full_name()
            ),
            element.location(),
        )]
    } else {
        Vec::new()
    }
}

fn function_return(element: ElementHandle<'_>) -> Vec<EdmError> {
    let Some(decl) = element.as_operation() else {
        return Vec::new();
    };
    if decl.kind == OperationKind::Function && decl.return_type.is_none() {
        vec![EdmError::new(
            ErrorCode::FunctionMustHaveReturnType,
            format!(
                "The function '{}' must declare a return type.",
                element.full_name()
            ),
            element.location(),
        )]
    } else {
        Vec::new()
    }
}

fn unique_container_members(element: ElementHandle<'_>) -> Vec<EdmError> {
    let Some(decl) = element.as_container() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    for member in &decl.elements {
        if !seen.insert(member.name().to_string()) {
            errors.push(EdmError::new(
                ErrorCode::DuplicateEntityContainerMemberName,
                format!(
                    "The container element '{}' is already defined in '{}'.",
                    member.name(),
                    element.full_name()
                ),
                member.location(),
            ));
        }
    }
    errors
}

fn entity_set_types(element: ElementHandle<'_>) -> Vec<EdmError> {
    let Some(decl) = element.as_container() else {
        return Vec::new();
    };
    let mut errors = Vec::new();

    for member in &decl.elements {
        let (name, entity_type, location) = match member {
            ContainerElementDecl::EntitySet(set) => (&set.name, &set.entity_type, set.location),
            ContainerElementDecl::Singleton(singleton) => {
                (&singleton.name, &singleton.entity_type, singleton.location)
            }
            ContainerElementDecl::OperationImport(_) => continue,
        };

        match element.model.find_schema_element(entity_type) {
            None => errors.push(EdmError::new(
                ErrorCode::BadUnresolvedType,
                format!("The type '{entity_type}' could not be found."),
                location,
            )),
            Some(handle) if handle.as_entity().is_none() => errors.push(EdmError::new(
                ErrorCode::EntitySetTypeMustBeEntityType,
                format!("The declared type of '{name}' must be an entity type."),
                location,
            )),
            Some(_) => {}
        }
    }
    errors
}

fn bindings(element: ElementHandle<'_>) -> Vec<EdmError> {
    let Some(decl) = element.as_container() else {
        return Vec::new();
    };
    let mut errors = Vec::new();

    for member in &decl.elements {
        let (entity_type, bindings) = match member {
            ContainerElementDecl::EntitySet(set) => (&set.entity_type, &set.bindings),
            ContainerElementDecl::Singleton(singleton) => {
                (&singleton.entity_type, &singleton.bindings)
            }
            ContainerElementDecl::OperationImport(_) => continue,
        };
        let source_type = element
            .model
            .find_schema_element(entity_type)
            .filter(|h| h.as_entity().is_some());

        for binding in bindings {
            if let Some(source_type) = source_type {
                if !binding_path_resolves(element.model, source_type, &binding.path) {
                    errors.push(EdmError::new(
                        ErrorCode::BadUnresolvedNavigationPropertyPath,
                        format!(
                            "The navigation property binding path '{}' could not be resolved on type '{}'.",
                            binding.path,
                            source_type.full_name()
                        ),
                        binding.location,
                    ));
                }
            }
            if !binding_target_resolves(element, &binding.target) {
                errors.push(EdmError::new(
                    ErrorCode::BadUnresolvedEntitySet,
                    format!(
                        "The navigation property binding target '{}' could not be found.",
                        binding.target
                    ),
                    binding.location,
                ));
            }
        }
    }
    errors
}

/// Walk a binding path: cast segments narrow the current type, the final
/// segment must be a navigation property
fn binding_path_resolves(
    model: &EdmModel,
    source_type: ElementHandle<'_>,
    path: &str,
) -> bool {
    let segments: Vec<&str> = path.split('/').collect();
    let mut current = source_type;

    for (index, segment) in segments.iter().enumerate() {
        if segment.contains('.') {
            match model
                .find_schema_element(segment)
                .filter(|h| h.structured_kind().is_some())
                .filter(|h| h.is_or_derives_from(&current.full_name()))
            {
                Some(cast) => current = cast,
                None => return false,
            }
            continue;
        }

        match current.find_property(segment) {
            Some(PropertyDecl::Navigation(navigation)) => {
                if index + 1 == segments.len() {
                    return true;
                }
                // Intermediate navigation segment: keep walking on the
                // target type.
                let resolved = model.resolve_type_reference(&navigation.type_ref);
                let next = match &resolved.definition {
                    EdmType::Entity(name) => model.find_schema_element(name),
                    EdmType::Collection(inner) => match &inner.definition {
                        EdmType::Entity(name) => model.find_schema_element(name),
                        _ => None,
                    },
                    _ => None,
                };
                match next {
                    Some(next) => current = next,
                    None => return false,
                }
            }
            Some(PropertyDecl::Structural(property)) => {
                if index + 1 == segments.len() {
                    return false;
                }
                let resolved = model.resolve_type_reference(&property.type_ref);
                let next = match &resolved.definition {
                    EdmType::Complex(name) => model.find_schema_element(name),
                    _ => None,
                };
                match next {
                    Some(next) => current = next,
                    None => return false,
                }
            }
            None => return false,
        }
    }
    false
}

/// Binding targets name a container child, optionally container-qualified
fn binding_target_resolves(container: ElementHandle<'_>, target: &str) -> bool {
    match target.rsplit_once('/') {
        Some((container_name, child)) => container
            .model
            .find_entity_container(container_name)
            .and_then(|c| c.as_container())
            .is_some_and(|decl| decl.elements.iter().any(|e| e.name() == child)),
        None => container
            .as_container()
            .is_some_and(|decl| decl.elements.iter().any(|e| e.name() == target)),
    }
}

fn operation_imports(element: ElementHandle<'_>) -> Vec<EdmError> {
    let Some(decl) = element.as_container() else {
        return Vec::new();
    };
    let mut errors = Vec::new();

    for member in &decl.elements {
        let ContainerElementDecl::OperationImport(import) = member else {
            continue;
        };
        let matching = element
            .model
            .find_operations(&import.operation)
            .into_iter()
            .filter(|h| h.as_operation().is_some_and(|op| op.kind == import.kind))
            .count();
        if matching == 0 {
            errors.push(EdmError::new(
                ErrorCode::BadUnresolvedOperation,
                format!(
                    "The operation '{}' referenced by '{}' could not be found.",
                    import.operation, import.name
                ),
                import.location,
            ));
        }
    }
    errors
}
