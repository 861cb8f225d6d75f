//! Shared AST builders for unit tests

use crate::model::EdmModel;
use edm_ast::{
    AnnotationDecl, AnnotationsBlock, ComplexTypeDecl, ContainerElementDecl, EntityContainerDecl,
    EntitySetDecl, EntityTypeDecl, EnumMemberDecl, EnumTypeDecl, Expression, ExpressionKind,
    KeyDecl, Location, OperationDecl, OperationKind, ParameterDecl, PropertyDecl, PropertyRefDecl,
    SchemaDocument, SchemaElementDecl, StructuralPropertyDecl, TermDecl, TypeReferenceDecl,
};

pub fn schema(namespace: &str) -> SchemaDocument {
    SchemaDocument::new(namespace, Location::new(1, 1))
}

pub fn model_from(documents: Vec<SchemaDocument>) -> EdmModel {
    EdmModel::from_documents(documents, Vec::new())
}

pub fn type_ref(raw: &str) -> TypeReferenceDecl {
    TypeReferenceDecl::from_raw(raw, Location::new(1, 1))
}

pub fn entity_type(name: &str, base: Option<&str>) -> SchemaElementDecl {
    entity_type_at(name, base, 1)
}

pub fn entity_type_at(name: &str, base: Option<&str>, line: usize) -> SchemaElementDecl {
    SchemaElementDecl::EntityType(EntityTypeDecl {
        name: name.to_string(),
        base_type: base.map(str::to_string),
        is_abstract: false,
        is_open: false,
        key: None,
        properties: Vec::new(),
        annotations: Vec::new(),
        location: Location::new(line, 2),
    })
}

pub fn entity_type_with_key(
    name: &str,
    base: Option<&str>,
    properties: &[(&str, &str)],
    key: &[&str],
) -> SchemaElementDecl {
    SchemaElementDecl::EntityType(EntityTypeDecl {
        name: name.to_string(),
        base_type: base.map(str::to_string),
        is_abstract: false,
        is_open: false,
        key: Some(KeyDecl {
            property_refs: key
                .iter()
                .map(|k| PropertyRefDecl {
                    name: (*k).to_string(),
                    alias: None,
                    location: Location::new(1, 3),
                })
                .collect(),
            location: Location::new(1, 3),
        }),
        properties: properties
            .iter()
            .map(|(n, t)| structural_property(n, t))
            .collect(),
        annotations: Vec::new(),
        location: Location::new(1, 2),
    })
}

pub fn complex_type(name: &str, base: Option<&str>) -> SchemaElementDecl {
    SchemaElementDecl::ComplexType(ComplexTypeDecl {
        name: name.to_string(),
        base_type: base.map(str::to_string),
        is_abstract: false,
        is_open: false,
        properties: Vec::new(),
        annotations: Vec::new(),
        location: Location::new(1, 2),
    })
}

pub fn structural_property(name: &str, type_name: &str) -> PropertyDecl {
    PropertyDecl::Structural(StructuralPropertyDecl {
        name: name.to_string(),
        type_ref: type_ref(type_name),
        default_value: None,
        annotations: Vec::new(),
        location: Location::new(1, 4),
    })
}

pub fn enum_type(
    name: &str,
    underlying: Option<&str>,
    members: &[(&str, Option<i64>)],
) -> SchemaElementDecl {
    SchemaElementDecl::EnumType(EnumTypeDecl {
        name: name.to_string(),
        underlying_type: underlying.map(str::to_string),
        is_flags: false,
        members: members
            .iter()
            .map(|(n, v)| EnumMemberDecl {
                name: (*n).to_string(),
                value: *v,
                annotations: Vec::new(),
                location: Location::new(1, 5),
            })
            .collect(),
        annotations: Vec::new(),
        location: Location::new(1, 2),
    })
}

pub fn term(name: &str, type_name: &str) -> SchemaElementDecl {
    SchemaElementDecl::Term(TermDecl {
        name: name.to_string(),
        type_ref: type_ref(type_name),
        default_value: None,
        applies_to: None,
        annotations: Vec::new(),
        location: Location::new(1, 2),
    })
}

pub fn operation(name: &str, parameter_types: &[&str]) -> SchemaElementDecl {
    SchemaElementDecl::Operation(OperationDecl {
        name: name.to_string(),
        kind: OperationKind::Function,
        is_bound: false,
        is_composable: false,
        entity_set_path: None,
        parameters: parameter_types
            .iter()
            .enumerate()
            .map(|(i, t)| ParameterDecl {
                name: format!("p{i}"),
                type_ref: type_ref(t),
                annotations: Vec::new(),
                location: Location::new(1, 6),
            })
            .collect(),
        return_type: None,
        annotations: Vec::new(),
        location: Location::new(1, 2),
    })
}

pub fn container(name: &str, sets: &[(&str, &str)]) -> SchemaElementDecl {
    SchemaElementDecl::EntityContainer(EntityContainerDecl {
        name: name.to_string(),
        extends: None,
        elements: sets
            .iter()
            .map(|(set_name, entity_type)| {
                ContainerElementDecl::EntitySet(EntitySetDecl {
                    name: (*set_name).to_string(),
                    entity_type: (*entity_type).to_string(),
                    bindings: Vec::new(),
                    annotations: Vec::new(),
                    location: Location::new(1, 3),
                })
            })
            .collect(),
        annotations: Vec::new(),
        location: Location::new(1, 2),
    })
}

pub fn annotation(term: &str, value: Option<Expression>) -> AnnotationDecl {
    annotation_at(term, value, 1)
}

pub fn annotation_at(term: &str, value: Option<Expression>, line: usize) -> AnnotationDecl {
    AnnotationDecl {
        term: term.to_string(),
        qualifier: None,
        value,
        location: Location::new(line, 7),
    }
}

pub fn annotations_block(target: &str, annotations: Vec<AnnotationDecl>) -> AnnotationsBlock {
    AnnotationsBlock {
        target: target.to_string(),
        qualifier: None,
        annotations,
        location: Location::new(1, 2),
    }
}

pub fn expr(kind: ExpressionKind) -> Expression {
    Expression::new(kind, Location::new(1, 8))
}

pub fn string_expr(value: &str) -> Expression {
    expr(ExpressionKind::String(value.to_string()))
}

pub fn int_expr(value: &str) -> Expression {
    expr(ExpressionKind::Integer(value.to_string()))
}
