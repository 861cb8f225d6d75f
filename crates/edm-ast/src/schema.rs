//! Schema documents and schema element declarations
#![allow(clippy::must_use_candidate)] // Constructor/accessor API intentionally omits pervasive #[must_use].

use crate::expression::{AnnotationDecl, AnnotationsBlock};
use crate::location::Location;
use crate::types::{FacetsDecl, TypeReferenceDecl};
use serde::{Deserialize, Serialize};

/// One parsed `<Schema>` document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Schema namespace
    pub namespace: String,

    /// Optional schema alias (simple, non-dotted name)
    pub alias: Option<String>,

    /// Top-level schema elements in declaration order
    pub elements: Vec<SchemaElementDecl>,

    /// Out-of-line `<Annotations>` blocks in declaration order
    pub out_of_line: Vec<AnnotationsBlock>,

    /// Position of the `<Schema>` element
    pub location: Location,
}

impl SchemaDocument {
    /// Create an empty schema document
    pub fn new(namespace: impl Into<String>, location: Location) -> Self {
        Self {
            namespace: namespace.into(),
            alias: None,
            elements: Vec::new(),
            out_of_line: Vec::new(),
            location,
        }
    }

    /// Compute the full name of a declared element
    pub fn full_name(&self, element: &SchemaElementDecl) -> String {
        format!("{}.{}", self.namespace, element.name())
    }
}

/// A namespace-qualified top-level construct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SchemaElementDecl {
    EntityType(EntityTypeDecl),
    ComplexType(ComplexTypeDecl),
    EnumType(EnumTypeDecl),
    TypeDefinition(TypeDefinitionDecl),
    Term(TermDecl),
    Operation(OperationDecl),
    EntityContainer(EntityContainerDecl),
}

impl SchemaElementDecl {
    /// Declared (unqualified) name
    pub fn name(&self) -> &str {
        match self {
            Self::EntityType(d) => &d.name,
            Self::ComplexType(d) => &d.name,
            Self::EnumType(d) => &d.name,
            Self::TypeDefinition(d) => &d.name,
            Self::Term(d) => &d.name,
            Self::Operation(d) => &d.name,
            Self::EntityContainer(d) => &d.name,
        }
    }

    /// Declaration position
    pub fn location(&self) -> Location {
        match self {
            Self::EntityType(d) => d.location,
            Self::ComplexType(d) => d.location,
            Self::EnumType(d) => d.location,
            Self::TypeDefinition(d) => d.location,
            Self::Term(d) => d.location,
            Self::Operation(d) => d.location,
            Self::EntityContainer(d) => d.location,
        }
    }

    /// Inline annotations on the declaration
    pub fn annotations(&self) -> &[AnnotationDecl] {
        match self {
            Self::EntityType(d) => &d.annotations,
            Self::ComplexType(d) => &d.annotations,
            Self::EnumType(d) => &d.annotations,
            Self::TypeDefinition(d) => &d.annotations,
            Self::Term(d) => &d.annotations,
            Self::Operation(d) => &d.annotations,
            Self::EntityContainer(d) => &d.annotations,
        }
    }
}

/// An `<EntityType>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTypeDecl {
    pub name: String,
    pub base_type: Option<String>,
    pub is_abstract: bool,
    pub is_open: bool,
    pub key: Option<KeyDecl>,
    /// Structural and navigation properties in declaration order
    pub properties: Vec<PropertyDecl>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// A `<Key>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDecl {
    pub property_refs: Vec<PropertyRefDecl>,
    pub location: Location,
}

/// A `<PropertyRef>` inside a key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRefDecl {
    pub name: String,
    pub alias: Option<String>,
    pub location: Location,
}

/// A `<ComplexType>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexTypeDecl {
    pub name: String,
    pub base_type: Option<String>,
    pub is_abstract: bool,
    pub is_open: bool,
    pub properties: Vec<PropertyDecl>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// A member of a structured type, keeping declaration order across kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PropertyDecl {
    Structural(StructuralPropertyDecl),
    Navigation(NavigationPropertyDecl),
}

impl PropertyDecl {
    /// Declared property name
    pub fn name(&self) -> &str {
        match self {
            Self::Structural(d) => &d.name,
            Self::Navigation(d) => &d.name,
        }
    }

    /// Declaration position
    pub fn location(&self) -> Location {
        match self {
            Self::Structural(d) => d.location,
            Self::Navigation(d) => d.location,
        }
    }
}

/// A `<Property>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralPropertyDecl {
    pub name: String,
    pub type_ref: TypeReferenceDecl,
    pub default_value: Option<String>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// A `<NavigationProperty>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationPropertyDecl {
    pub name: String,
    pub type_ref: TypeReferenceDecl,
    /// Path to the inverse navigation property on the target type
    pub partner: Option<String>,
    pub contains_target: bool,
    /// Dependent-to-principal property pairs in declaration order
    pub referential_constraints: Vec<ReferentialConstraintDecl>,
    pub on_delete: Option<OnDeleteDecl>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// A `<ReferentialConstraint>` pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferentialConstraintDecl {
    /// Dependent property on the declaring type
    pub property: String,
    /// Principal property on the target type
    pub referenced_property: String,
    pub location: Location,
}

/// An `<OnDelete>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnDeleteDecl {
    pub action: OnDeleteAction,
    pub location: Location,
}

/// Defined `OnDelete` actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnDeleteAction {
    Cascade,
    None,
    SetNull,
    SetDefault,
}

impl OnDeleteAction {
    /// Parse the attribute value
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "Cascade" => Some(Self::Cascade),
            "None" => Some(Self::None),
            "SetNull" => Some(Self::SetNull),
            "SetDefault" => Some(Self::SetDefault),
            _ => Option::None,
        }
    }

    /// Attribute rendering
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cascade => "Cascade",
            Self::None => "None",
            Self::SetNull => "SetNull",
            Self::SetDefault => "SetDefault",
        }
    }
}

/// An `<EnumType>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumTypeDecl {
    pub name: String,
    /// Underlying integral type name; `Edm.Int32` when absent
    pub underlying_type: Option<String>,
    pub is_flags: bool,
    pub members: Vec<EnumMemberDecl>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// A `<Member>` of an enum type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumMemberDecl {
    pub name: String,
    /// Explicit value; absent means previous member value plus one
    pub value: Option<i64>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// A `<TypeDefinition>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDefinitionDecl {
    pub name: String,
    pub underlying_type: String,
    pub facets: FacetsDecl,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// A `<Term>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermDecl {
    pub name: String,
    pub type_ref: TypeReferenceDecl,
    pub default_value: Option<String>,
    /// Whitespace-separated list of element kinds the term applies to
    pub applies_to: Option<String>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// Whether an operation is an action or a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Action,
    Function,
}

/// An `<Action>` or `<Function>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDecl {
    pub name: String,
    pub kind: OperationKind,
    pub is_bound: bool,
    /// Functions only
    pub is_composable: bool,
    pub entity_set_path: Option<String>,
    pub parameters: Vec<ParameterDecl>,
    pub return_type: Option<ReturnTypeDecl>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// A `<Parameter>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    pub type_ref: TypeReferenceDecl,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// A `<ReturnType>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnTypeDecl {
    pub type_ref: TypeReferenceDecl,
    pub location: Location,
}

/// An `<EntityContainer>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityContainerDecl {
    pub name: String,
    pub extends: Option<String>,
    pub elements: Vec<ContainerElementDecl>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// An addressable root inside an entity container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContainerElementDecl {
    EntitySet(EntitySetDecl),
    Singleton(SingletonDecl),
    OperationImport(OperationImportDecl),
}

impl ContainerElementDecl {
    /// Declared element name
    pub fn name(&self) -> &str {
        match self {
            Self::EntitySet(d) => &d.name,
            Self::Singleton(d) => &d.name,
            Self::OperationImport(d) => &d.name,
        }
    }

    /// Declaration position
    pub fn location(&self) -> Location {
        match self {
            Self::EntitySet(d) => d.location,
            Self::Singleton(d) => d.location,
            Self::OperationImport(d) => d.location,
        }
    }

    /// Inline annotations on the declaration
    pub fn annotations(&self) -> &[AnnotationDecl] {
        match self {
            Self::EntitySet(d) => &d.annotations,
            Self::Singleton(d) => &d.annotations,
            Self::OperationImport(d) => &d.annotations,
        }
    }
}

/// An `<EntitySet>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySetDecl {
    pub name: String,
    pub entity_type: String,
    pub bindings: Vec<NavigationBindingDecl>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// A `<Singleton>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingletonDecl {
    pub name: String,
    pub entity_type: String,
    pub bindings: Vec<NavigationBindingDecl>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// A `<NavigationPropertyBinding>` declaration.
///
/// The path may include derived-type-cast segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationBindingDecl {
    pub path: String,
    pub target: String,
    pub location: Location,
}

/// An `<ActionImport>` or `<FunctionImport>` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationImportDecl {
    pub name: String,
    pub kind: OperationKind,
    /// Qualified name of the imported operation
    pub operation: String,
    /// Static target set name or path expression
    pub entity_set: Option<String>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str) -> EntityTypeDecl {
        EntityTypeDecl {
            name: name.to_string(),
            base_type: None,
            is_abstract: false,
            is_open: false,
            key: None,
            properties: Vec::new(),
            annotations: Vec::new(),
            location: Location::new(1, 2),
        }
    }

    #[test]
    fn test_full_name() {
        let mut doc = SchemaDocument::new("NS1", Location::new(1, 1));
        doc.elements
            .push(SchemaElementDecl::EntityType(entity("Customer")));

        assert_eq!(doc.full_name(&doc.elements[0]), "NS1.Customer");
    }

    #[test]
    fn test_element_accessors() {
        let element = SchemaElementDecl::EntityType(entity("Customer"));

        assert_eq!(element.name(), "Customer");
        assert_eq!(element.location(), Location::new(1, 2));
        assert!(element.annotations().is_empty());
    }

    #[test]
    fn test_property_order_is_preserved() {
        let mut decl = entity("Customer");
        decl.properties
            .push(PropertyDecl::Structural(StructuralPropertyDecl {
                name: "Name".to_string(),
                type_ref: TypeReferenceDecl::from_raw("Edm.String", Location::new(2, 3)),
                default_value: None,
                annotations: Vec::new(),
                location: Location::new(2, 3),
            }));
        decl.properties
            .push(PropertyDecl::Navigation(NavigationPropertyDecl {
                name: "Pets".to_string(),
                type_ref: TypeReferenceDecl::from_raw("Collection(NS1.Pet)", Location::new(3, 3)),
                partner: None,
                contains_target: false,
                referential_constraints: Vec::new(),
                on_delete: None,
                annotations: Vec::new(),
                location: Location::new(3, 3),
            }));

        let names: Vec<&str> = decl.properties.iter().map(PropertyDecl::name).collect();
        assert_eq!(names, vec!["Name", "Pets"]);
    }

    #[test]
    fn test_on_delete_action_round_trip() {
        for action in [
            OnDeleteAction::Cascade,
            OnDeleteAction::None,
            OnDeleteAction::SetNull,
            OnDeleteAction::SetDefault,
        ] {
            assert_eq!(OnDeleteAction::from_str(action.as_str()), Some(action));
        }
        assert_eq!(OnDeleteAction::from_str("Restrict"), None);
    }
}
