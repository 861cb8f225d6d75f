//! Resolved type references
//!
//! Resolution never fails: an unresolvable name produces a `Bad` definition
//! carrying its errors, and everything downstream propagates it.

use crate::primitives::PrimitiveTypeKind;
use edm_ast::{EdmError, FacetsDecl};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved type definition.
///
/// Schema-declared types are referenced by canonical full name rather than
/// by pointer, which keeps resolved values owned and cacheable even when
/// the underlying graph is cyclic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdmType {
    Primitive(PrimitiveTypeKind),
    Entity(String),
    Complex(String),
    Enum(String),
    TypeDefinition(String),
    Collection(Box<EdmTypeReference>),
    /// A reference to an entity (`Ref(T)`)
    EntityReference(Box<EdmTypeReference>),
    /// Placeholder for a reference that could not be resolved
    Bad {
        name: String,
        errors: Vec<EdmError>,
    },
}

impl EdmType {
    /// Whether this definition or any nested definition failed to resolve
    #[must_use]
    pub fn is_bad(&self) -> bool {
        match self {
            Self::Bad { .. } => true,
            Self::Collection(element) | Self::EntityReference(element) => element.is_bad(),
            _ => false,
        }
    }

    /// Errors carried by this definition and nested definitions
    #[must_use]
    pub fn errors(&self) -> Vec<EdmError> {
        match self {
            Self::Bad { errors, .. } => errors.clone(),
            Self::Collection(element) | Self::EntityReference(element) => element.errors(),
            _ => Vec::new(),
        }
    }

    /// Canonical full name of the definition
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.qualified_name().to_string(),
            Self::Entity(name)
            | Self::Complex(name)
            | Self::Enum(name)
            | Self::TypeDefinition(name)
            | Self::Bad { name, .. } => name.clone(),
            Self::Collection(element) => format!("Collection({})", element.definition.full_name()),
            Self::EntityReference(element) => {
                format!("Ref({})", element.definition.full_name())
            }
        }
    }

    /// Whether this is a structured (entity or complex) definition
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Entity(_) | Self::Complex(_))
    }

    /// The primitive kind, if this is a primitive definition
    #[must_use]
    pub fn as_primitive(&self) -> Option<PrimitiveTypeKind> {
        match self {
            Self::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for EdmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// A resolved type reference: definition plus nullability and facets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdmTypeReference {
    pub definition: EdmType,
    pub nullable: bool,
    pub facets: FacetsDecl,
}

impl EdmTypeReference {
    /// Create a reference with default facets
    #[must_use]
    pub fn new(definition: EdmType, nullable: bool) -> Self {
        Self {
            definition,
            nullable,
            facets: FacetsDecl::default(),
        }
    }

    /// A non-nullable reference to a primitive kind
    #[must_use]
    pub fn primitive(kind: PrimitiveTypeKind, nullable: bool) -> Self {
        Self::new(EdmType::Primitive(kind), nullable)
    }

    /// Whether the reference or anything nested failed to resolve
    #[must_use]
    pub fn is_bad(&self) -> bool {
        self.definition.is_bad()
    }

    /// Errors carried by the reference
    #[must_use]
    pub fn errors(&self) -> Vec<EdmError> {
        self.definition.errors()
    }

    /// Whether the definition is a collection
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self.definition, EdmType::Collection(_))
    }

    /// Element reference of a collection definition
    #[must_use]
    pub fn element_type(&self) -> Option<&EdmTypeReference> {
        match &self.definition {
            EdmType::Collection(element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for EdmTypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.definition)?;
        if !self.nullable {
            write!(f, " [Nullable=false]")?;
        }
        Ok(())
    }
}
