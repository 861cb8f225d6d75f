//! Validation engine
//!
//! A pure function over a resolved model and a version-keyed rule set.
//! Elements are visited in model declaration order, annotations afterwards
//! in model annotation order; findings are concatenated in visitation
//! order without re-sorting. The engine never mutates the model, so
//! repeated runs produce identical results.

use crate::rules::{run_annotation_rule, run_element_rule, RuleContext, RuleScope};
use crate::ruleset::rule_set;
use crate::version::EdmVersion;
use edm_ast::EdmError;
use edm_model::EdmModel;
use tracing::debug;

/// Validation outcome: validity flag plus the ordered error list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether no rule produced a finding
    pub is_valid: bool,
    /// Findings in visitation order
    pub errors: Vec<EdmError>,
}

impl ValidationResult {
    /// Check if there are any errors
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Validate a model against the rule set for the given version
#[must_use]
pub fn validate(model: &EdmModel, version: EdmVersion) -> ValidationResult {
    let rules = rule_set(version);
    debug!(%version, rules = rules.len(), "validation started");

    let mut context = RuleContext::new(model);
    let mut errors = Vec::new();

    for element in model.schema_elements() {
        for &rule in rules {
            if rule.scope().matches(&element) {
                errors.extend(run_element_rule(rule, &mut context, element));
            }
        }
    }

    let annotations = model.local_vocabulary_annotations();
    context.count_annotations(&annotations);
    for annotation in &annotations {
        for &rule in rules {
            if rule.scope() == RuleScope::Annotation {
                errors.extend(run_annotation_rule(rule, &context, annotation));
            }
        }
    }

    debug!(errors = errors.len(), "validation finished");
    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edm_ast::{ErrorCode, Location, SchemaDocument};
    use edm_model::EdmModel;

    fn model_of(documents: Vec<SchemaDocument>) -> EdmModel {
        EdmModel::from_documents(documents, Vec::new())
    }

    #[test]
    fn test_empty_schema_is_valid() {
        let model = model_of(vec![SchemaDocument::new("NS1", Location::new(1, 1))]);

        let result = validate(&model, EdmVersion::V4_0);

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut document = SchemaDocument::new("NS1", Location::new(1, 1));
        document.elements.push(edm_ast::SchemaElementDecl::EntityType(
            edm_ast::EntityTypeDecl {
                name: "Keyless".to_string(),
                base_type: None,
                is_abstract: false,
                is_open: false,
                key: None,
                properties: Vec::new(),
                annotations: Vec::new(),
                location: Location::new(2, 2),
            },
        ));
        let model = model_of(vec![document]);

        let first = validate(&model, EdmVersion::V4_0);
        let second = validate(&model, EdmVersion::V4_0);

        assert!(!first.is_valid);
        assert_eq!(first, second);
    }

    #[test]
    fn test_version_selects_rule_set() {
        let mut document = SchemaDocument::new("NS1", Location::new(1, 1));
        document.elements.push(edm_ast::SchemaElementDecl::EntityType(
            edm_ast::EntityTypeDecl {
                name: "Keyless".to_string(),
                base_type: None,
                is_abstract: false,
                is_open: false,
                key: None,
                properties: Vec::new(),
                annotations: Vec::new(),
                location: Location::new(2, 2),
            },
        ));
        let model = model_of(vec![document]);

        let strict = validate(&model, EdmVersion::V4_0);
        let relaxed = validate(&model, EdmVersion::V4_01);

        assert_eq!(strict.errors.len(), 1);
        assert_eq!(strict.errors[0].code, ErrorCode::KeyMissingOnEntityType);
        assert!(relaxed.is_valid);
    }
}
