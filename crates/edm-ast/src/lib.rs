#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # edm-ast
//!
//! Immutable CSDL syntax tree, source locations, and EDM error codes.
//!
//! This crate holds the declarations produced by the CSDL reader. Nodes are
//! created once at parse time and never mutated; all reference targets
//! (base types, property types, annotation terms) are kept as raw qualified
//! name strings and resolved later by the semantic model.

/// Vocabulary annotation declarations and the annotation expression tree.
pub mod expression;
/// Source line/column positions attached to every node and error.
pub mod location;
/// Schema documents and schema element declarations.
pub mod schema;
/// Type reference syntax and facets.
pub mod types;

/// EDM diagnostic type and the closed set of error codes.
pub mod error;

pub use error::{EdmError, ErrorCode};
pub use expression::{
    AnnotationDecl, AnnotationsBlock, Expression, ExpressionKind, PropertyConstructor,
};
pub use location::Location;
pub use schema::{
    ComplexTypeDecl, ContainerElementDecl, EntityContainerDecl, EntitySetDecl, EntityTypeDecl,
    EnumMemberDecl, EnumTypeDecl, KeyDecl, NavigationBindingDecl, NavigationPropertyDecl,
    OnDeleteAction, OnDeleteDecl, OperationDecl, OperationImportDecl, OperationKind,
    ParameterDecl, PropertyDecl, PropertyRefDecl, ReferentialConstraintDecl, ReturnTypeDecl,
    SchemaDocument, SchemaElementDecl, SingletonDecl, StructuralPropertyDecl, TermDecl,
    TypeDefinitionDecl,
};
pub use types::{FacetsDecl, MaxLengthValue, ScaleValue, SridValue, TypeReferenceDecl};

use thiserror::Error;

/// Errors that can occur when working with the syntax tree
#[derive(Error, Debug)]
pub enum Error {
    #[error("Element not found: {name}")]
    ElementNotFound { name: String },

    #[error("Invalid qualified name '{name}': {reason}")]
    InvalidQualifiedName { name: String, reason: String },
}

impl Error {
    /// Build an element-not-found error.
    pub fn element_not_found(name: impl Into<String>) -> Self {
        Self::ElementNotFound { name: name.into() }
    }

    /// Build an invalid-qualified-name error with the parsing reason.
    pub fn invalid_qualified_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidQualifiedName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for syntax tree operations.
pub type Result<T> = std::result::Result<T, Error>;
