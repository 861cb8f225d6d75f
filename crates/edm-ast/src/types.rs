//! Type reference syntax and facets
#![allow(clippy::must_use_candidate)] // Accessors are clear at call sites without #[must_use].

use crate::location::Location;
use serde::{Deserialize, Serialize};

/// A type reference as written in the document.
///
/// The named type stays an unresolved string; `Collection(...)` and
/// `Ref(...)` wrapping is unwrapped at parse time so `type_name` is always
/// the element type name. The `Nullable` attribute records presence and
/// value separately because a collection navigation property must not
/// carry the attribute at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeReferenceDecl {
    /// Qualified element type name (e.g. `Edm.String`, `NS.Customer`)
    pub type_name: String,

    /// Whether the reference was written as `Collection(...)`
    pub is_collection: bool,

    /// Whether the reference was written as `Ref(...)`
    pub is_entity_reference: bool,

    /// Explicit `Nullable` attribute value, if the attribute was present
    pub nullable: Option<bool>,

    /// Type facets
    pub facets: FacetsDecl,

    /// Position of the owning element
    pub location: Location,
}

impl TypeReferenceDecl {
    /// Create a reference from a raw `Type` attribute value, unwrapping
    /// `Collection(...)` and `Ref(...)`
    pub fn from_raw(raw: &str, location: Location) -> Self {
        let unwrap = |prefix: &str| {
            raw.strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(')'))
        };

        let (type_name, is_collection, is_entity_reference) = match unwrap("Collection(") {
            Some(inner) => (inner.to_string(), true, false),
            None => match unwrap("Ref(") {
                Some(inner) => (inner.to_string(), false, true),
                None => (raw.to_string(), false, false),
            },
        };

        Self {
            type_name,
            is_collection,
            is_entity_reference,
            nullable: None,
            facets: FacetsDecl::default(),
            location,
        }
    }

    /// The raw `Type` attribute value this reference was parsed from
    pub fn raw_name(&self) -> String {
        if self.is_collection {
            format!("Collection({})", self.type_name)
        } else if self.is_entity_reference {
            format!("Ref({})", self.type_name)
        } else {
            self.type_name.clone()
        }
    }

    /// Nullability with the documented default of `true`
    pub fn nullable_or_default(&self) -> bool {
        self.nullable.unwrap_or(true)
    }
}

/// `MaxLength` facet value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxLengthValue {
    /// The symbolic value `max`
    Unbounded,
    /// A fixed maximum length
    Fixed(i64),
}

/// `Scale` facet value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleValue {
    /// The symbolic value `variable`
    Variable,
    /// A fixed scale
    Fixed(i64),
}

/// `SRID` facet value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SridValue {
    /// The symbolic value `variable`
    Variable,
    /// A fixed spatial reference id
    Value(i64),
}

/// Facets attached to a type reference.
///
/// Absent facets keep their documented implicit defaults: `Unicode` is
/// `true`, `Scale` is `0`, the rest are unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetsDecl {
    /// Maximum length for string and binary types
    pub max_length: Option<MaxLengthValue>,

    /// Precision for decimal and temporal types
    pub precision: Option<i64>,

    /// Scale for decimal types
    pub scale: Option<ScaleValue>,

    /// Whether a string type is Unicode (default `true`)
    pub unicode: Option<bool>,

    /// Spatial reference id for geo types
    pub srid: Option<SridValue>,
}

impl FacetsDecl {
    /// Whether no facet was written
    pub fn is_empty(&self) -> bool {
        self.max_length.is_none()
            && self.precision.is_none()
            && self.scale.is_none()
            && self.unicode.is_none()
            && self.srid.is_none()
    }

    /// `Unicode` with its implicit default
    pub fn unicode_or_default(&self) -> bool {
        self.unicode.unwrap_or(true)
    }

    /// `Scale` with its implicit default of zero
    pub fn scale_or_default(&self) -> ScaleValue {
        self.scale.unwrap_or(ScaleValue::Fixed(0))
    }
}
