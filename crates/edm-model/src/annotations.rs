//! Vocabulary annotation enumeration and target resolution
//!
//! Enumeration order is contractual: inline annotations in document order,
//! then the same document's out-of-line blocks, then later documents, then
//! referenced models. Unresolvable targets stay attached as `Bad` targets
//! that keep the written path, so the annotations remain enumerable.

use crate::model::{EdmModel, ElementHandle};
use crate::types::EdmType;
use edm_ast::{
    AnnotationDecl, ContainerElementDecl, EdmError, ErrorCode, Location, PropertyDecl,
    SchemaElementDecl,
};

/// The resolved target of a vocabulary annotation
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationTarget {
    /// A top-level schema element
    SchemaElement { name: String },
    /// An entity set, singleton, or operation import
    ContainerChild { container: String, name: String },
    /// A structural or navigation property
    Property { declaring_type: String, name: String },
    /// An enum member
    EnumMember { enum_type: String, name: String },
    /// An operation parameter
    Parameter { operation: String, name: String },
    /// A target that could not be resolved; keeps the written path
    Bad { path: String, error: EdmError },
}

impl AnnotationTarget {
    /// Whether resolution failed
    #[must_use]
    pub fn is_bad(&self) -> bool {
        matches!(self, Self::Bad { .. })
    }

    /// The error carried by a bad target
    #[must_use]
    pub fn error(&self) -> Option<&EdmError> {
        match self {
            Self::Bad { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Canonical path identifying the target
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::SchemaElement { name } => name.clone(),
            Self::ContainerChild { container, name } => format!("{container}/{name}"),
            Self::Property {
                declaring_type,
                name,
            } => format!("{declaring_type}/{name}"),
            Self::EnumMember { enum_type, name } => format!("{enum_type}/{name}"),
            Self::Parameter { operation, name } => format!("{operation}/{name}"),
            Self::Bad { path, .. } => path.clone(),
        }
    }
}

/// One annotation in the composed model
#[derive(Debug, Clone)]
pub struct ModelAnnotation<'m> {
    /// The underlying declaration
    pub decl: &'m AnnotationDecl,
    /// Resolved target
    pub target: AnnotationTarget,
    /// Canonical term name
    pub term: String,
    /// Effective qualifier (the block qualifier when the annotation has
    /// none of its own)
    pub qualifier: Option<String>,
}

impl ModelAnnotation<'_> {
    /// Source position of the annotation
    #[must_use]
    pub fn location(&self) -> Location {
        self.decl.location
    }
}

impl EdmModel {
    /// Enumerate every vocabulary annotation in contractual order,
    /// including referenced models' contributions
    #[must_use]
    pub fn vocabulary_annotations(&self) -> Vec<ModelAnnotation<'_>> {
        let mut out = self.local_vocabulary_annotations();
        for referenced in self.referenced_models() {
            out.extend(referenced.vocabulary_annotations());
        }
        out
    }

    /// Annotations contributed by this model's own documents only.
    ///
    /// Validation uses this view: referenced models arrive already
    /// resolved and are not re-validated.
    #[must_use]
    pub fn local_vocabulary_annotations(&self) -> Vec<ModelAnnotation<'_>> {
        let mut out = Vec::new();

        for (doc_idx, document) in self.documents().iter().enumerate() {
            for (elem_idx, _) in document.elements.iter().enumerate() {
                let handle = ElementHandle {
                    model: self,
                    key: crate::model::ElementKey {
                        doc: doc_idx,
                        index: elem_idx,
                    },
                };
                self.collect_inline(handle, &mut out);
            }

            for block in &document.out_of_line {
                let target = self.resolve_target(&block.target, block.location);
                for decl in &block.annotations {
                    out.push(ModelAnnotation {
                        decl,
                        target: target.clone(),
                        term: self.resolve_qualified(&decl.term),
                        qualifier: decl.qualifier.clone().or_else(|| block.qualifier.clone()),
                    });
                }
            }
        }

        out
    }

    /// Annotations whose target resolves to the given path
    #[must_use]
    pub fn annotations_for_target(&self, path: &str) -> Vec<ModelAnnotation<'_>> {
        let wanted = self.resolve_target(path, Location::default()).path();
        self.vocabulary_annotations()
            .into_iter()
            .filter(|a| a.target.path() == wanted)
            .collect()
    }

    fn collect_inline<'m>(&'m self, handle: ElementHandle<'m>, out: &mut Vec<ModelAnnotation<'m>>) {
        let element_target = AnnotationTarget::SchemaElement {
            name: handle.full_name(),
        };
        self.push_inline(handle.decl().annotations(), &element_target, out);

        match handle.decl() {
            SchemaElementDecl::EntityType(_) | SchemaElementDecl::ComplexType(_) => {
                for property in handle.declared_properties() {
                    let target = AnnotationTarget::Property {
                        declaring_type: handle.full_name(),
                        name: property.name().to_string(),
                    };
                    let annotations = match property {
                        PropertyDecl::Structural(p) => &p.annotations,
                        PropertyDecl::Navigation(p) => &p.annotations,
                    };
                    self.push_inline(annotations, &target, out);
                }
            }
            SchemaElementDecl::EnumType(decl) => {
                for member in &decl.members {
                    let target = AnnotationTarget::EnumMember {
                        enum_type: handle.full_name(),
                        name: member.name.clone(),
                    };
                    self.push_inline(&member.annotations, &target, out);
                }
            }
            SchemaElementDecl::Operation(decl) => {
                for parameter in &decl.parameters {
                    let target = AnnotationTarget::Parameter {
                        operation: handle.full_name(),
                        name: parameter.name.clone(),
                    };
                    self.push_inline(&parameter.annotations, &target, out);
                }
            }
            SchemaElementDecl::EntityContainer(decl) => {
                for element in &decl.elements {
                    let target = AnnotationTarget::ContainerChild {
                        container: handle.full_name(),
                        name: element.name().to_string(),
                    };
                    self.push_inline(element.annotations(), &target, out);
                }
            }
            _ => {}
        }
    }

    fn push_inline<'m>(
        &'m self,
        annotations: &'m [AnnotationDecl],
        target: &AnnotationTarget,
        out: &mut Vec<ModelAnnotation<'m>>,
    ) {
        for decl in annotations {
            out.push(ModelAnnotation {
                decl,
                target: target.clone(),
                term: self.resolve_qualified(&decl.term),
                qualifier: decl.qualifier.clone(),
            });
        }
    }

    /// Resolve an out-of-line annotation target path.
    ///
    /// The head segment names a schema element (with an optional
    /// parenthesized parameter signature selecting one operation
    /// overload); the remaining segments walk container children,
    /// parameters, and properties, with dotted segments applied as
    /// derived-type casts.
    #[must_use]
    pub fn resolve_target(&self, path: &str, location: Location) -> AnnotationTarget {
        let mut segments = path.split('/');
        let head = segments.next().unwrap_or_default();

        let handle = match self.resolve_target_head(head, path, location) {
            Ok(handle) => handle,
            Err(target) => return target,
        };

        let mut target = AnnotationTarget::SchemaElement {
            name: handle.full_name(),
        };
        let mut container = handle.as_container().map(|_| handle);
        let mut operation = handle.as_operation().map(|decl| (handle, decl));
        let mut current_type = handle.structured_kind().map(|_| handle);

        for segment in segments {
            if let Some(container_handle) = container.take() {
                match self.resolve_container_child(container_handle, segment) {
                    Some((child_target, entity_type)) => {
                        target = child_target;
                        current_type = entity_type;
                    }
                    None => {
                        return AnnotationTarget::Bad {
                            path: path.to_string(),
                            error: EdmError::new(
                                ErrorCode::BadUnresolvedEntitySet,
                                format!(
                                    "The container element '{segment}' could not be found in '{}'.",
                                    container_handle.full_name()
                                ),
                                location,
                            ),
                        };
                    }
                }
            } else if let Some((operation_handle, decl)) = operation.take() {
                match decl.parameters.iter().find(|p| p.name == segment) {
                    Some(parameter) => {
                        target = AnnotationTarget::Parameter {
                            operation: operation_handle.full_name(),
                            name: parameter.name.clone(),
                        };
                        current_type = match self
                            .resolve_type_reference(&parameter.type_ref)
                            .definition
                        {
                            EdmType::Entity(name) | EdmType::Complex(name) => {
                                self.find_canonical(&name)
                            }
                            _ => None,
                        };
                    }
                    None => {
                        return AnnotationTarget::Bad {
                            path: path.to_string(),
                            error: EdmError::new(
                                ErrorCode::BadUnresolvedParameter,
                                format!(
                                    "The parameter '{segment}' could not be found on '{}'.",
                                    operation_handle.full_name()
                                ),
                                location,
                            ),
                        };
                    }
                }
            } else if let Some(type_handle) = current_type {
                if segment.contains('.') {
                    // Derived type cast narrowing the current type.
                    let cast = self
                        .find_schema_element(segment)
                        .filter(|h| h.structured_kind().is_some())
                        .filter(|h| h.is_or_derives_from(&type_handle.full_name()));
                    match cast {
                        Some(cast) => {
                            current_type = Some(cast);
                        }
                        None => {
                            return self.bad_path_segment(path, segment, location);
                        }
                    }
                } else {
                    match type_handle.find_property(segment) {
                        Some(property) => {
                            target = AnnotationTarget::Property {
                                declaring_type: type_handle.full_name(),
                                name: property.name().to_string(),
                            };
                            let type_ref = match property {
                                PropertyDecl::Structural(p) => &p.type_ref,
                                PropertyDecl::Navigation(p) => &p.type_ref,
                            };
                            current_type = match self.resolve_type_reference(type_ref).definition {
                                EdmType::Entity(name) | EdmType::Complex(name) => {
                                    self.find_canonical(&name)
                                }
                                EdmType::Collection(element) => match &element.definition {
                                    EdmType::Entity(name) | EdmType::Complex(name) => {
                                        self.find_canonical(name)
                                    }
                                    _ => None,
                                },
                                _ => None,
                            };
                        }
                        None => {
                            return self.bad_path_segment(path, segment, location);
                        }
                    }
                }
            } else {
                return AnnotationTarget::Bad {
                    path: path.to_string(),
                    error: EdmError::new(
                        ErrorCode::BadUnresolvedTarget,
                        format!("The target path '{path}' could not be resolved."),
                        location,
                    ),
                };
            }
        }

        target
    }

    fn resolve_target_head<'m>(
        &'m self,
        head: &str,
        path: &str,
        location: Location,
    ) -> Result<ElementHandle<'m>, AnnotationTarget> {
        // `Namespace.Op(T1,T2)` selects one overload by signature.
        if let Some((name, args)) = head.split_once('(') {
            let args = args.strip_suffix(')').unwrap_or(args);
            let wanted: Vec<String> = if args.is_empty() {
                Vec::new()
            } else {
                args.split(',')
                    .map(|a| self.resolve_qualified(a.trim()))
                    .collect()
            };

            let overloads = self.find_operations(name);
            let mut matching = overloads.into_iter().filter(|h| {
                let Some(decl) = h.as_operation() else {
                    return false;
                };
                let signature: Vec<String> = decl
                    .parameters
                    .iter()
                    .map(|p| self.resolve_qualified(&p.type_ref.raw_name()))
                    .collect();
                signature == wanted
            });

            return match (matching.next(), matching.next()) {
                (Some(handle), None) => Ok(handle),
                _ => Err(AnnotationTarget::Bad {
                    path: path.to_string(),
                    error: EdmError::new(
                        ErrorCode::BadUnresolvedOperation,
                        format!("The operation '{head}' could not be resolved to one overload."),
                        location,
                    ),
                }),
            };
        }

        self.find_schema_element(head)
            .ok_or_else(|| AnnotationTarget::Bad {
                path: path.to_string(),
                error: EdmError::new(
                    ErrorCode::BadUnresolvedTarget,
                    format!("The target '{head}' could not be resolved."),
                    location,
                ),
            })
    }

    fn resolve_container_child<'m>(
        &'m self,
        container: ElementHandle<'m>,
        segment: &str,
    ) -> Option<(AnnotationTarget, Option<ElementHandle<'m>>)> {
        let decl = container.as_container()?;
        let child = decl.elements.iter().find(|e| e.name() == segment)?;

        let target = AnnotationTarget::ContainerChild {
            container: container.full_name(),
            name: child.name().to_string(),
        };
        let entity_type = match child {
            ContainerElementDecl::EntitySet(set) => self.find_schema_element(&set.entity_type),
            ContainerElementDecl::Singleton(singleton) => {
                self.find_schema_element(&singleton.entity_type)
            }
            ContainerElementDecl::OperationImport(_) => None,
        };

        Some((target, entity_type.filter(|h| h.structured_kind().is_some())))
    }

    fn bad_path_segment(&self, path: &str, segment: &str, location: Location) -> AnnotationTarget {
        AnnotationTarget::Bad {
            path: path.to_string(),
            error: EdmError::new(
                ErrorCode::BadUnresolvedNavigationPropertyPath,
                format!("The path segment '{segment}' in target '{path}' could not be resolved."),
                location,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn customer_model() -> EdmModel {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type_with_key(
            "Customer",
            None,
            &[("CustomerID", "Edm.String")],
            &["CustomerID"],
        ));
        doc.elements
            .push(container("C1", &[("Customers", "NS1.Customer")]));
        model_from(vec![doc])
    }

    #[test]
    fn test_schema_element_target() {
        let model = customer_model();
        let target = model.resolve_target("NS1.Customer", Location::default());

        assert_eq!(
            target,
            AnnotationTarget::SchemaElement {
                name: "NS1.Customer".to_string()
            }
        );
        assert_eq!(target.path(), "NS1.Customer");
    }

    #[test]
    fn test_container_child_target() {
        let model = customer_model();
        let target = model.resolve_target("NS1.C1/Customers", Location::default());

        assert_eq!(
            target,
            AnnotationTarget::ContainerChild {
                container: "NS1.C1".to_string(),
                name: "Customers".to_string()
            }
        );
    }

    #[test]
    fn test_unresolved_container_child_is_bad_but_keeps_path() {
        let model = customer_model();
        let target = model.resolve_target("NS1.C1/Nope", Location::new(9, 1));

        assert!(target.is_bad());
        assert_eq!(target.path(), "NS1.C1/Nope");
        assert_eq!(
            target.error().unwrap().code,
            ErrorCode::BadUnresolvedEntitySet
        );
    }

    #[test]
    fn test_property_target_through_entity_set() {
        let model = customer_model();
        let target = model.resolve_target("NS1.C1/Customers/CustomerID", Location::default());

        assert_eq!(
            target,
            AnnotationTarget::Property {
                declaring_type: "NS1.Customer".to_string(),
                name: "CustomerID".to_string()
            }
        );
    }

    #[test]
    fn test_property_target_on_type() {
        let model = customer_model();
        let target = model.resolve_target("NS1.Customer/CustomerID", Location::default());

        assert_eq!(
            target,
            AnnotationTarget::Property {
                declaring_type: "NS1.Customer".to_string(),
                name: "CustomerID".to_string()
            }
        );
    }

    #[test]
    fn test_unresolved_property_segment() {
        let model = customer_model();
        let target = model.resolve_target("NS1.Customer/Missing", Location::default());

        assert!(target.is_bad());
        assert_eq!(
            target.error().unwrap().code,
            ErrorCode::BadUnresolvedNavigationPropertyPath
        );
    }

    #[test]
    fn test_cast_segment_narrows_type() {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type_with_key(
            "Base",
            None,
            &[("Id", "Edm.Int32")],
            &["Id"],
        ));
        let mut derived = match entity_type("Derived", Some("NS1.Base")) {
            edm_ast::SchemaElementDecl::EntityType(d) => d,
            _ => unreachable!(),
        };
        derived
            .properties
            .push(structural_property("Extra", "Edm.String"));
        doc.elements
            .push(edm_ast::SchemaElementDecl::EntityType(derived));
        let model = model_from(vec![doc]);

        let target = model.resolve_target("NS1.Base/NS1.Derived/Extra", Location::default());

        assert_eq!(
            target,
            AnnotationTarget::Property {
                declaring_type: "NS1.Derived".to_string(),
                name: "Extra".to_string()
            }
        );
    }

    #[test]
    fn test_operation_parameter_target() {
        let mut doc = schema("NS1");
        doc.elements.push(operation("Compute", &["Edm.Int32"]));
        doc.elements
            .push(operation("Compute", &["Edm.Int32", "Edm.Int32"]));
        let model = model_from(vec![doc]);

        let target = model.resolve_target("NS1.Compute(Edm.Int32,Edm.Int32)/p1", Location::default());

        assert_eq!(
            target,
            AnnotationTarget::Parameter {
                operation: "NS1.Compute".to_string(),
                name: "p1".to_string()
            }
        );

        let missing = model.resolve_target("NS1.Compute(Edm.Int32)/p9", Location::default());
        assert_eq!(
            missing.error().unwrap().code,
            ErrorCode::BadUnresolvedParameter
        );
    }

    #[test]
    fn test_annotation_order_inline_then_out_of_line_then_later_documents() {
        let mut doc1 = schema("NS1");
        let mut customer = match entity_type("Customer", None) {
            edm_ast::SchemaElementDecl::EntityType(d) => d,
            _ => unreachable!(),
        };
        customer
            .annotations
            .push(annotation("NS1.InlineTerm", Some(string_expr("a"))));
        doc1.elements
            .push(edm_ast::SchemaElementDecl::EntityType(customer));
        doc1.elements.push(term("InlineTerm", "Edm.String"));
        doc1.elements.push(term("OutTerm", "Edm.String"));
        doc1.out_of_line.push(annotations_block(
            "NS1.Customer",
            vec![annotation("NS1.OutTerm", Some(string_expr("b")))],
        ));

        let mut doc2 = schema("NS2");
        doc2.elements.push(term("LaterTerm", "Edm.String"));
        doc2.out_of_line.push(annotations_block(
            "NS1.Customer",
            vec![annotation("NS2.LaterTerm", Some(string_expr("c")))],
        ));

        let model = model_from(vec![doc1, doc2]);
        let annotations = model.annotations_for_target("NS1.Customer");

        let terms: Vec<&str> = annotations.iter().map(|a| a.term.as_str()).collect();
        assert_eq!(terms, vec!["NS1.InlineTerm", "NS1.OutTerm", "NS2.LaterTerm"]);
    }

    #[test]
    fn test_bad_target_annotations_stay_enumerable() {
        let mut doc = schema("NS1");
        doc.elements.push(term("T", "Edm.String"));
        doc.out_of_line.push(annotations_block(
            "NS1.DoesNotExist",
            vec![annotation("NS1.T", Some(string_expr("x")))],
        ));
        let model = model_from(vec![doc]);

        let all = model.vocabulary_annotations();
        assert_eq!(all.len(), 1);
        assert!(all[0].target.is_bad());
        assert_eq!(all[0].target.path(), "NS1.DoesNotExist");
    }
}
