//! Version-keyed rule sets
//!
//! A rule set is data: an ordered list of rule identifiers. Adding a
//! specification version is a new list, not new branching logic.

use crate::rules::RuleId;
use crate::version::EdmVersion;

/// Rules applied when validating against version 4.0
pub const V4_0_RULES: &[RuleId] = &[
    RuleId::NamedElementMustHaveValidName,
    RuleId::SchemaElementNameMustBeUnique,
    RuleId::StructuredTypeBaseTypeMustBeResolvable,
    RuleId::StructuredTypePropertyTypesMustBeResolvable,
    RuleId::StructuredTypePropertyNamesMustBeUnique,
    RuleId::OpenTypeBaseTypeMustBeOpen,
    RuleId::EntityTypeKeyRequired,
    RuleId::EntityTypeKeyPropertiesMustBeValid,
    RuleId::NavigationPropertyCollectionMustNotHaveNullableAttribute,
    RuleId::NavigationPropertyTypeMustBeEntity,
    RuleId::NavigationPropertyPartnerMustBeConsistent,
    RuleId::NavigationPropertyConstraintPropertiesMustExist,
    RuleId::EnumTypeMembersMustBeValid,
    RuleId::EnumTypeMemberNamesMustBeUnique,
    RuleId::TypeDefinitionUnderlyingTypeMustBePrimitive,
    RuleId::TermTypeMustBeResolvable,
    RuleId::OperationTypesMustBeResolvable,
    RuleId::OperationParameterNamesMustBeUnique,
    RuleId::BoundOperationMustHaveParameters,
    RuleId::FunctionMustHaveReturnType,
    RuleId::EntityContainerMemberNamesMustBeUnique,
    RuleId::EntitySetTypeMustBeEntityType,
    RuleId::NavigationPropertyBindingsMustBeValid,
    RuleId::OperationImportOperationMustBeResolvable,
    RuleId::AnnotationTermMustBeResolvable,
    RuleId::AnnotationTargetMustBeResolvable,
    RuleId::AnnotationMustNotBeDuplicated,
    RuleId::AnnotationValueMustMatchTermType,
];

/// Rules applied when validating against version 4.01.
///
/// 4.01 drops the key-presence requirement; everything else matches 4.0.
pub const V4_01_RULES: &[RuleId] = &[
    RuleId::NamedElementMustHaveValidName,
    RuleId::SchemaElementNameMustBeUnique,
    RuleId::StructuredTypeBaseTypeMustBeResolvable,
    RuleId::StructuredTypePropertyTypesMustBeResolvable,
    RuleId::StructuredTypePropertyNamesMustBeUnique,
    RuleId::OpenTypeBaseTypeMustBeOpen,
    RuleId::EntityTypeKeyPropertiesMustBeValid,
    RuleId::NavigationPropertyCollectionMustNotHaveNullableAttribute,
    RuleId::NavigationPropertyTypeMustBeEntity,
    RuleId::NavigationPropertyPartnerMustBeConsistent,
    RuleId::NavigationPropertyConstraintPropertiesMustExist,
    RuleId::EnumTypeMembersMustBeValid,
    RuleId::EnumTypeMemberNamesMustBeUnique,
    RuleId::TypeDefinitionUnderlyingTypeMustBePrimitive,
    RuleId::TermTypeMustBeResolvable,
    RuleId::OperationTypesMustBeResolvable,
    RuleId::OperationParameterNamesMustBeUnique,
    RuleId::BoundOperationMustHaveParameters,
    RuleId::FunctionMustHaveReturnType,
    RuleId::EntityContainerMemberNamesMustBeUnique,
    RuleId::EntitySetTypeMustBeEntityType,
    RuleId::NavigationPropertyBindingsMustBeValid,
    RuleId::OperationImportOperationMustBeResolvable,
    RuleId::AnnotationTermMustBeResolvable,
    RuleId::AnnotationTargetMustBeResolvable,
    RuleId::AnnotationMustNotBeDuplicated,
    RuleId::AnnotationValueMustMatchTermType,
];

/// The ordered rule list for a target version
#[must_use]
pub fn rule_set(version: EdmVersion) -> &'static [RuleId] {
    match version {
        EdmVersion::V4_0 => V4_0_RULES,
        EdmVersion::V4_01 => V4_01_RULES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_sets_differ_only_in_key_requirement() {
        assert!(V4_0_RULES.contains(&RuleId::EntityTypeKeyRequired));
        assert!(!V4_01_RULES.contains(&RuleId::EntityTypeKeyRequired));
        assert_eq!(V4_0_RULES.len(), V4_01_RULES.len() + 1);
    }

    #[test]
    fn test_rule_sets_have_no_duplicates() {
        for rules in [V4_0_RULES, V4_01_RULES] {
            let mut seen = std::collections::HashSet::new();
            for rule in rules {
                assert!(seen.insert(*rule), "duplicate rule {rule:?}");
            }
        }
    }
}
