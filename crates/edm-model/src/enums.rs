//! Enum member resolution
//!
//! Member values are computed eagerly on first access and memoized by the
//! model: auto values continue from the previous member, restarting after
//! any explicit value. Out-of-range values are recorded as member-level
//! errors, never panics.

use crate::model::EdmModel;
use crate::primitives::PrimitiveTypeKind;
use edm_ast::{EdmError, EnumTypeDecl, ErrorCode, Location};

/// A resolved enum member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnumMember {
    pub name: String,
    pub value: i64,
    pub location: Location,
}

/// The resolved view of an enum type
#[derive(Debug, Clone)]
pub struct ResolvedEnum {
    pub underlying: PrimitiveTypeKind,
    pub is_flags: bool,
    pub members: Vec<ResolvedEnumMember>,
    pub errors: Vec<EdmError>,
}

impl ResolvedEnum {
    /// An enum with no members (used for non-enum keys)
    #[must_use]
    pub fn empty() -> Self {
        Self {
            underlying: PrimitiveTypeKind::Int32,
            is_flags: false,
            members: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Find a member by name
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&ResolvedEnumMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Resolve underlying type and member values for an enum declaration
pub(crate) fn resolve_enum_members(model: &EdmModel, decl: &EnumTypeDecl) -> ResolvedEnum {
    let mut errors = Vec::new();

    let underlying = match &decl.underlying_type {
        None => PrimitiveTypeKind::Int32,
        Some(name) => {
            let canonical = model.resolve_qualified(name);
            match PrimitiveTypeKind::from_qualified_name(&canonical) {
                Some(kind) if kind.is_integral() => kind,
                _ => {
                    errors.push(EdmError::new(
                        ErrorCode::EnumMustHaveIntegerUnderlyingType,
                        format!(
                            "The underlying type of '{}' must be an integral primitive type.",
                            decl.name
                        ),
                        decl.location,
                    ));
                    // Keep resolving member values against the default so
                    // the model stays queryable.
                    PrimitiveTypeKind::Int32
                }
            }
        }
    };

    let range = underlying
        .integral_range()
        .unwrap_or((i64::MIN, i64::MAX));

    let mut members = Vec::with_capacity(decl.members.len());
    let mut previous: Option<i64> = None;

    for member in &decl.members {
        let value = match member.value {
            Some(explicit) => Some(explicit),
            None => match previous {
                None => Some(0),
                Some(p) => p.checked_add(1),
            },
        };

        let value = match value {
            Some(v) => v,
            None => {
                errors.push(out_of_range(decl, &member.name, member.location));
                previous = Some(i64::MAX);
                continue;
            }
        };

        if value < range.0 || value > range.1 {
            errors.push(out_of_range(decl, &member.name, member.location));
        }

        members.push(ResolvedEnumMember {
            name: member.name.clone(),
            value,
            location: member.location,
        });
        previous = Some(value);
    }

    ResolvedEnum {
        underlying,
        is_flags: decl.is_flags,
        members,
        errors,
    }
}

fn out_of_range(decl: &EnumTypeDecl, member: &str, location: Location) -> EdmError {
    EdmError::new(
        ErrorCode::EnumMemberValueOutOfRange,
        format!(
            "The value of enum member '{member}' is out of range of the underlying type of '{}'.",
            decl.name
        ),
        location,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdmModel;
    use crate::test_support::*;
    use edm_ast::SchemaElementDecl;

    fn resolve(decl: SchemaElementDecl) -> ResolvedEnum {
        let mut doc = schema("NS1");
        doc.elements.push(decl);
        let model = model_from(vec![doc]);
        let handle = model.schema_elements().next().unwrap();
        model.resolve_enum(handle.key).as_ref().clone()
    }

    #[test]
    fn test_auto_values_start_at_zero() {
        let resolved = resolve(enum_type("Color", None, &[("Red", None), ("Green", None)]));

        assert_eq!(resolved.underlying, PrimitiveTypeKind::Int32);
        assert_eq!(resolved.member("Red").unwrap().value, 0);
        assert_eq!(resolved.member("Green").unwrap().value, 1);
        assert!(resolved.errors.is_empty());
    }

    #[test]
    fn test_auto_values_restart_after_explicit() {
        let resolved = resolve(enum_type(
            "Color",
            None,
            &[("Red", None), ("Blue", Some(10)), ("Green", None)],
        ));

        assert_eq!(resolved.member("Red").unwrap().value, 0);
        assert_eq!(resolved.member("Blue").unwrap().value, 10);
        assert_eq!(resolved.member("Green").unwrap().value, 11);
    }

    #[test]
    fn test_out_of_range_value_is_reported() {
        let resolved = resolve(enum_type(
            "Small",
            Some("Edm.Byte"),
            &[("Ok", Some(255)), ("TooBig", Some(256))],
        ));

        assert_eq!(resolved.errors.len(), 1);
        assert_eq!(
            resolved.errors[0].code,
            ErrorCode::EnumMemberValueOutOfRange
        );
    }

    #[test]
    fn test_auto_increment_can_run_out_of_range() {
        let resolved = resolve(enum_type(
            "Small",
            Some("Edm.Byte"),
            &[("Last", Some(255)), ("Over", None)],
        ));

        assert_eq!(resolved.errors.len(), 1);
        assert_eq!(resolved.member("Over").unwrap().value, 256);
    }

    #[test]
    fn test_non_integral_underlying_type() {
        let resolved = resolve(enum_type("Bad", Some("Edm.String"), &[("A", None)]));

        assert_eq!(resolved.errors.len(), 1);
        assert_eq!(
            resolved.errors[0].code,
            ErrorCode::EnumMustHaveIntegerUnderlyingType
        );
        // Members still resolve against the fallback underlying type.
        assert_eq!(resolved.member("A").unwrap().value, 0);
    }
}
