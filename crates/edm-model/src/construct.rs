//! Constructible model
//!
//! A mutable counterpart to `EdmModel` for building or editing schemas
//! directly. Removing an element detaches out-of-line annotation blocks
//! whose target head no longer exists; `build` produces a regular,
//! immutable model.

use crate::model::EdmModel;
use crate::{Error, Result};
use edm_ast::{AnnotationsBlock, Location, SchemaDocument, SchemaElementDecl};
use std::sync::Arc;
use tracing::debug;

/// A mutable model that supports direct add and remove
#[derive(Default)]
pub struct MutableModel {
    documents: Vec<SchemaDocument>,
    referenced: Vec<Arc<EdmModel>>,
}

impl MutableModel {
    /// An empty mutable model
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing model's documents and references
    #[must_use]
    pub fn from_model(model: &EdmModel) -> Self {
        Self {
            documents: model.documents().to_vec(),
            referenced: model.referenced_models().to_vec(),
        }
    }

    /// The documents being edited
    #[must_use]
    pub fn documents(&self) -> &[SchemaDocument] {
        &self.documents
    }

    /// Add an empty schema document for a namespace
    pub fn add_schema(&mut self, namespace: impl Into<String>) -> &mut SchemaDocument {
        self.documents
            .push(SchemaDocument::new(namespace, Location::default()));
        self.documents.last_mut().expect("just pushed")
    }

    /// Add a schema element to an existing namespace
    pub fn add_element(&mut self, namespace: &str, element: SchemaElementDecl) -> Result<()> {
        let document = self
            .documents
            .iter_mut()
            .find(|d| d.namespace == namespace)
            .ok_or_else(|| Error::namespace_not_found(namespace))?;
        document.elements.push(element);
        Ok(())
    }

    /// Add an out-of-line annotations block to an existing namespace
    pub fn add_annotations(&mut self, namespace: &str, block: AnnotationsBlock) -> Result<()> {
        let document = self
            .documents
            .iter_mut()
            .find(|d| d.namespace == namespace)
            .ok_or_else(|| Error::namespace_not_found(namespace))?;
        document.out_of_line.push(block);
        Ok(())
    }

    /// Remove the first element with the given full name.
    ///
    /// Out-of-line annotation blocks whose target head becomes
    /// unreachable are detached.
    pub fn remove_element(&mut self, full_name: &str) -> bool {
        let mut removed = false;
        for document in &mut self.documents {
            if removed {
                break;
            }
            let namespace = document.namespace.clone();
            if let Some(position) = document.elements.iter().position(|e| {
                format!("{namespace}.{}", e.name()) == full_name
            }) {
                document.elements.remove(position);
                removed = true;
            }
        }

        if removed {
            debug!(element = full_name, "removed element");
            self.detach_unreachable_annotations();
        }
        removed
    }

    fn detach_unreachable_annotations(&mut self) {
        // Resolve target heads against the edited document set.
        let snapshot = EdmModel::from_documents(self.documents.clone(), self.referenced.clone());

        for document in &mut self.documents {
            document.out_of_line.retain(|block| {
                let head = block.target.split('/').next().unwrap_or_default();
                let head_name = head.split('(').next().unwrap_or_default();
                snapshot.find_schema_element(head_name).is_some()
            });
        }
    }

    /// Freeze into an immutable, queryable model
    #[must_use]
    pub fn build(self) -> EdmModel {
        EdmModel::from_documents(self.documents, self.referenced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_add_and_build() {
        let mut mutable = MutableModel::new();
        mutable.add_schema("NS1");
        mutable
            .add_element("NS1", entity_type("Customer", None))
            .unwrap();

        let model = mutable.build();
        assert!(model.find_schema_element("NS1.Customer").is_some());
    }

    #[test]
    fn test_add_element_to_unknown_namespace() {
        let mut mutable = MutableModel::new();
        let result = mutable.add_element("NS1", entity_type("Customer", None));
        assert!(result.is_err());
    }

    #[test]
    fn test_remove_element_detaches_annotations() {
        let mut mutable = MutableModel::new();
        mutable.add_schema("NS1");
        mutable
            .add_element("NS1", entity_type("Customer", None))
            .unwrap();
        mutable.add_element("NS1", term("T", "Edm.String")).unwrap();
        mutable
            .add_annotations(
                "NS1",
                annotations_block(
                    "NS1.Customer",
                    vec![annotation("NS1.T", Some(string_expr("x")))],
                ),
            )
            .unwrap();

        assert!(mutable.remove_element("NS1.Customer"));

        let model = mutable.build();
        assert!(model.find_schema_element("NS1.Customer").is_none());
        assert!(model.vocabulary_annotations().is_empty());
    }

    #[test]
    fn test_remove_keeps_annotations_on_surviving_targets() {
        let mut mutable = MutableModel::new();
        mutable.add_schema("NS1");
        mutable
            .add_element("NS1", entity_type("Customer", None))
            .unwrap();
        mutable
            .add_element("NS1", entity_type("Order", None))
            .unwrap();
        mutable.add_element("NS1", term("T", "Edm.String")).unwrap();
        mutable
            .add_annotations(
                "NS1",
                annotations_block(
                    "NS1.Customer",
                    vec![annotation("NS1.T", Some(string_expr("x")))],
                ),
            )
            .unwrap();

        assert!(mutable.remove_element("NS1.Order"));

        let model = mutable.build();
        assert_eq!(model.vocabulary_annotations().len(), 1);
    }

    #[test]
    fn test_remove_missing_element() {
        let mut mutable = MutableModel::new();
        mutable.add_schema("NS1");
        assert!(!mutable.remove_element("NS1.Nope"));
    }

    #[test]
    fn test_untouched_copy_builds_identical_surface() {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type("Customer", None));
        let original = model_from(vec![doc]);

        let copy = MutableModel::from_model(&original).build();

        let original_names: Vec<String> =
            original.schema_elements().map(|h| h.full_name()).collect();
        let copy_names: Vec<String> = copy.schema_elements().map(|h| h.full_name()).collect();
        assert_eq!(original_names, copy_names);
    }
}
