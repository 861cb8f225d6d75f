//! Built-in primitive types
//!
//! The `Edm` namespace is not declared by any document; its types are
//! immutable shared data reachable from every model.

use serde::{Deserialize, Serialize};

/// The built-in primitive type kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveTypeKind {
    Binary,
    Boolean,
    Byte,
    Date,
    DateTimeOffset,
    Decimal,
    Double,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    Stream,
    String,
    TimeOfDay,
    Geography,
    Geometry,
}

/// All primitive kinds in stable order
pub const ALL_PRIMITIVE_KINDS: [PrimitiveTypeKind; 19] = [
    PrimitiveTypeKind::Binary,
    PrimitiveTypeKind::Boolean,
    PrimitiveTypeKind::Byte,
    PrimitiveTypeKind::Date,
    PrimitiveTypeKind::DateTimeOffset,
    PrimitiveTypeKind::Decimal,
    PrimitiveTypeKind::Double,
    PrimitiveTypeKind::Duration,
    PrimitiveTypeKind::Guid,
    PrimitiveTypeKind::Int16,
    PrimitiveTypeKind::Int32,
    PrimitiveTypeKind::Int64,
    PrimitiveTypeKind::SByte,
    PrimitiveTypeKind::Single,
    PrimitiveTypeKind::Stream,
    PrimitiveTypeKind::String,
    PrimitiveTypeKind::TimeOfDay,
    PrimitiveTypeKind::Geography,
    PrimitiveTypeKind::Geometry,
];

impl PrimitiveTypeKind {
    /// Look up a kind by qualified name (`Edm.String`)
    #[must_use]
    pub fn from_qualified_name(name: &str) -> Option<Self> {
        name.strip_prefix("Edm.").and_then(Self::from_simple_name)
    }

    /// Look up a kind by simple name (`String`)
    #[must_use]
    pub fn from_simple_name(name: &str) -> Option<Self> {
        match name {
            "Binary" => Some(Self::Binary),
            "Boolean" => Some(Self::Boolean),
            "Byte" => Some(Self::Byte),
            "Date" => Some(Self::Date),
            "DateTimeOffset" => Some(Self::DateTimeOffset),
            "Decimal" => Some(Self::Decimal),
            "Double" => Some(Self::Double),
            "Duration" => Some(Self::Duration),
            "Guid" => Some(Self::Guid),
            "Int16" => Some(Self::Int16),
            "Int32" => Some(Self::Int32),
            "Int64" => Some(Self::Int64),
            "SByte" => Some(Self::SByte),
            "Single" => Some(Self::Single),
            "Stream" => Some(Self::Stream),
            "String" => Some(Self::String),
            "TimeOfDay" => Some(Self::TimeOfDay),
            "Geography" => Some(Self::Geography),
            "Geometry" => Some(Self::Geometry),
            _ => None,
        }
    }

    /// Qualified name (`Edm.String`)
    #[must_use]
    pub fn qualified_name(self) -> &'static str {
        match self {
            Self::Binary => "Edm.Binary",
            Self::Boolean => "Edm.Boolean",
            Self::Byte => "Edm.Byte",
            Self::Date => "Edm.Date",
            Self::DateTimeOffset => "Edm.DateTimeOffset",
            Self::Decimal => "Edm.Decimal",
            Self::Double => "Edm.Double",
            Self::Duration => "Edm.Duration",
            Self::Guid => "Edm.Guid",
            Self::Int16 => "Edm.Int16",
            Self::Int32 => "Edm.Int32",
            Self::Int64 => "Edm.Int64",
            Self::SByte => "Edm.SByte",
            Self::Single => "Edm.Single",
            Self::Stream => "Edm.Stream",
            Self::String => "Edm.String",
            Self::TimeOfDay => "Edm.TimeOfDay",
            Self::Geography => "Edm.Geography",
            Self::Geometry => "Edm.Geometry",
        }
    }

    /// Whether the kind is a whole-number type
    #[must_use]
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::SByte | Self::Int16 | Self::Int32 | Self::Int64
        )
    }

    /// Inclusive value range for integral kinds
    #[must_use]
    pub fn integral_range(self) -> Option<(i64, i64)> {
        match self {
            Self::Byte => Some((0, i64::from(u8::MAX))),
            Self::SByte => Some((i64::from(i8::MIN), i64::from(i8::MAX))),
            Self::Int16 => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            Self::Int32 => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            Self::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Whether the kind is a floating point type
    #[must_use]
    pub fn is_floating(self) -> bool {
        matches!(self, Self::Single | Self::Double)
    }

    /// Whether the kind carries an SRID facet
    #[must_use]
    pub fn is_spatial(self) -> bool {
        matches!(self, Self::Geography | Self::Geometry)
    }
}
