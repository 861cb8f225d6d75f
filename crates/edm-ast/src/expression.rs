//! Vocabulary annotation declarations and the annotation expression tree
#![allow(clippy::must_use_candidate)]

use crate::location::Location;
use serde::{Deserialize, Serialize};

/// A single vocabulary annotation: term, optional qualifier, value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationDecl {
    /// Qualified term name
    pub term: String,
    pub qualifier: Option<String>,
    /// Absent value means the term's default value applies
    pub value: Option<Expression>,
    pub location: Location,
}

/// An out-of-line `<Annotations Target="...">` block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationsBlock {
    /// Structural target path, resolved by the semantic model
    pub target: String,
    /// Qualifier applied to every contained annotation without its own
    pub qualifier: Option<String>,
    pub annotations: Vec<AnnotationDecl>,
    pub location: Location,
}

/// An annotation expression node with its source position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub location: Location,
}

impl Expression {
    /// Create an expression node
    pub fn new(kind: ExpressionKind, location: Location) -> Self {
        Self { kind, location }
    }

    /// Whether this node is a constant literal
    pub fn is_constant(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::Integer(_)
                | ExpressionKind::String(_)
                | ExpressionKind::Boolean(_)
                | ExpressionKind::Float(_)
                | ExpressionKind::Decimal(_)
                | ExpressionKind::Guid(_)
                | ExpressionKind::DateTimeOffset(_)
                | ExpressionKind::Duration(_)
                | ExpressionKind::Binary(_)
                | ExpressionKind::EnumMember(_)
                | ExpressionKind::Null
        )
    }
}

/// The declarative expression language attached to annotations.
///
/// Constants keep their raw document text; parsing and range checking
/// happen in the semantic layer so malformed literals become local errors
/// instead of parse failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExpressionKind {
    Integer(String),
    String(String),
    Boolean(String),
    Float(String),
    Decimal(String),
    Guid(String),
    DateTimeOffset(String),
    Duration(String),
    Binary(String),
    Null,

    /// Space-separated sequence of `Namespace.Enum/Member` tokens
    EnumMember(String),

    /// Slash-separated model path, possibly with type-cast segments
    Path(String),

    Record {
        /// Asserted structured type, if written
        type_name: Option<String>,
        properties: Vec<PropertyConstructor>,
    },
    Collection(Vec<Expression>),
    If {
        test: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Box<Expression>,
    },
    IsType {
        type_name: String,
        operand: Box<Expression>,
    },
    Cast {
        type_name: String,
        operand: Box<Expression>,
    },
    Apply {
        /// Qualified operation name, resolved to one overload by shape
        function: String,
        arguments: Vec<Expression>,
    },
    LabeledElement {
        name: String,
        expression: Box<Expression>,
    },
    LabeledElementReference(String),
}

/// A `<PropertyValue>` inside a record expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyConstructor {
    pub name: String,
    pub value: Expression,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(kind: ExpressionKind) -> Expression {
        Expression::new(kind, Location::new(1, 1))
    }

    #[test]
    fn test_constant_classification() {
        assert!(expr(ExpressionKind::Integer("42".to_string())).is_constant());
        assert!(expr(ExpressionKind::Null).is_constant());
        assert!(!expr(ExpressionKind::Path("A/B".to_string())).is_constant());
        assert!(!expr(ExpressionKind::Collection(Vec::new())).is_constant());
    }

    #[test]
    fn test_record_structure() {
        let record = expr(ExpressionKind::Record {
            type_name: Some("NS.Address".to_string()),
            properties: vec![PropertyConstructor {
                name: "City".to_string(),
                value: expr(ExpressionKind::String("Rome".to_string())),
                location: Location::new(2, 4),
            }],
        });

        match record.kind {
            ExpressionKind::Record {
                type_name,
                properties,
            } => {
                assert_eq!(type_name.as_deref(), Some("NS.Address"));
                assert_eq!(properties.len(), 1);
                assert_eq!(properties[0].name, "City");
            }
            _ => panic!("expected record"),
        }
    }

    #[test]
    fn test_expression_serializes_to_json() {
        let nested = expr(ExpressionKind::If {
            test: Box::new(expr(ExpressionKind::Boolean("true".to_string()))),
            if_true: Box::new(expr(ExpressionKind::Integer("1".to_string()))),
            if_false: Box::new(expr(ExpressionKind::Integer("0".to_string()))),
        });

        let json = serde_json::to_string(&nested).unwrap();
        assert!(json.contains("If"));
    }
}
