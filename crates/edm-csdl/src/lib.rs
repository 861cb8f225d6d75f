//! # edm-csdl
//!
//! CSDL reader and writer.
//!
//! `parse` turns one or more CSDL documents into a composed semantic
//! model. Success is decided by structural well-formedness alone: a
//! document that parses but is semantically broken still yields
//! `success == true` with an unvalidated model, and every diagnostic is a
//! return value rather than a panic or a log line.

/// CSDL document interpreter producing the AST.
pub mod reader;
/// CSDL serializer for round-trip output.
pub mod writer;
/// Minimal XML tokenizer with source positions.
pub mod xml;

pub use reader::SchemaReader;
pub use writer::CsdlWriter;
pub use xml::{XmlAttribute, XmlElement, XmlReader};

use edm_ast::EdmError;
use edm_model::EdmModel;
use std::sync::Arc;
use tracing::debug;

/// Result of parsing one or more CSDL documents
pub struct ParseResult {
    /// Whether no structural errors were found
    pub success: bool,
    /// The composed model; queryable even when semantically broken
    pub model: EdmModel,
    /// Structural errors in document order
    pub errors: Vec<EdmError>,
}

/// Parse CSDL documents into a composed model
#[must_use]
pub fn parse(sources: &[&str]) -> ParseResult {
    parse_with_references(sources, Vec::new())
}

/// Parse CSDL documents, composing them with already-resolved referenced
/// models
#[must_use]
pub fn parse_with_references(
    sources: &[&str],
    referenced: Vec<Arc<EdmModel>>,
) -> ParseResult {
    let mut documents = Vec::new();
    let mut errors = Vec::new();

    for source in sources {
        match XmlReader::new(source).parse_document() {
            Ok(root) => {
                let (document, document_errors) = SchemaReader::new().read(&root);
                errors.extend(document_errors);
                if let Some(document) = document {
                    documents.push(document);
                }
            }
            Err(error) => errors.push(error),
        }
    }

    let success = errors.is_empty();
    debug!(
        sources = sources.len(),
        documents = documents.len(),
        errors = errors.len(),
        "parse finished"
    );

    ParseResult {
        success,
        model: EdmModel::from_documents(documents, referenced),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edm_ast::ErrorCode;

    #[test]
    fn test_empty_schema_parses_clean() {
        let result = parse(&[r#"<Schema Namespace="NS1"/>"#]);

        assert!(result.success);
        assert!(result.errors.is_empty());
        assert_eq!(result.model.schema_elements().count(), 0);
    }

    #[test]
    fn test_customer_container_scenario() {
        let result = parse(&[r#"<Schema Namespace="NS1">
  <EntityType Name="Customer">
    <Key><PropertyRef Name="CustomerID"/></Key>
    <Property Name="CustomerID" Type="Edm.String" Nullable="false"/>
  </EntityType>
  <EntityContainer Name="C1">
    <EntitySet Name="Customers" EntityType="NS1.Customer"/>
  </EntityContainer>
</Schema>"#]);

        assert!(result.success);

        let container = result.model.entity_container().unwrap();
        assert_eq!(container.as_container().unwrap().name, "C1");
        assert_eq!(
            container.as_container().unwrap().elements[0].name(),
            "Customers"
        );

        let customer = result.model.find_schema_element("NS1.Customer").unwrap();
        let properties: Vec<&str> = customer
            .declared_properties()
            .iter()
            .filter_map(|p| match p {
                edm_ast::PropertyDecl::Structural(s) => Some(s.name.as_str()),
                edm_ast::PropertyDecl::Navigation(_) => None,
            })
            .collect();
        assert_eq!(properties, vec!["CustomerID"]);
    }

    #[test]
    fn test_malformed_xml_fails_parse() {
        let result = parse(&["<Schema Namespace=\"NS1\">"]);

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::MalformedXml);
    }

    #[test]
    fn test_semantic_breakage_does_not_fail_parse() {
        // A base type cycle is a semantic problem, not a structural one.
        let result = parse(&[r#"<Schema Namespace="NS1">
  <EntityType Name="Clod" BaseType="NS1.Smod"/>
  <EntityType Name="Smod" BaseType="NS1.Blob"/>
  <EntityType Name="Blob" BaseType="NS1.Clod"/>
</Schema>"#]);

        assert!(result.success);
        assert!(result.errors.is_empty());
        assert_eq!(result.model.schema_elements().count(), 3);
    }

    #[test]
    fn test_multiple_documents_compose() {
        let result = parse(&[
            r#"<Schema Namespace="NS1"><EntityType Name="A" BaseType="NS2.B"/></Schema>"#,
            r#"<Schema Namespace="NS2"><EntityType Name="B"/></Schema>"#,
        ]);

        assert!(result.success);
        let a = result.model.find_schema_element("NS1.A").unwrap();
        assert_eq!(a.base_type().unwrap().full_name(), "NS2.B");
    }

    #[test]
    fn test_name_collision_is_deferred_to_validation() {
        let result = parse(&[
            r#"<Schema Namespace="NS1"><EntityType Name="Dup"/></Schema>"#,
            r#"<Schema Namespace="NS1"><ComplexType Name="Dup"/></Schema>"#,
        ]);

        // Parse never rejects collisions; validation reports them.
        assert!(result.success);
    }

    #[test]
    fn test_one_bad_document_does_not_abort_the_rest() {
        let result = parse(&[
            "<Schema Namespace=\"NS1\"><EntityType Name=\"A\"/>",
            r#"<Schema Namespace="NS2"><EntityType Name="B"/></Schema>"#,
        ]);

        assert!(!result.success);
        assert!(result.model.find_schema_element("NS2.B").is_some());
    }

    #[test]
    fn test_parse_with_references() {
        let external = parse(&[r#"<Schema Namespace="Ext"><EntityType Name="Thing"/></Schema>"#]);
        assert!(external.success);

        let result = parse_with_references(
            &[r#"<Schema Namespace="NS1"><EntityType Name="Derived" BaseType="Ext.Thing"/></Schema>"#],
            vec![Arc::new(external.model)],
        );

        assert!(result.success);
        let derived = result.model.find_schema_element("NS1.Derived").unwrap();
        assert_eq!(derived.base_type().unwrap().full_name(), "Ext.Thing");
    }

    #[test]
    fn test_alias_usable_model_wide() {
        let result = parse(&[
            r#"<Schema Namespace="My.Long.Namespace" Alias="Short"><EntityType Name="A"/></Schema>"#,
            r#"<Schema Namespace="Other"><EntityType Name="B" BaseType="Short.A"/></Schema>"#,
        ]);

        assert!(result.success);
        let b = result.model.find_schema_element("Other.B").unwrap();
        assert_eq!(b.base_type().unwrap().full_name(), "My.Long.Namespace.A");
    }
}
