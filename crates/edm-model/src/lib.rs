//! # edm-model
//!
//! Semantic EDM model over the immutable CSDL syntax tree.
//!
//! This crate composes parsed documents and externally referenced models
//! into one queryable surface, resolves references lazily with
//! memoization, detects base type cycles with finite termination, and
//! type-checks vocabulary annotation expressions. Resolution never
//! throws: anything unresolvable becomes a `Bad` value carrying its
//! errors, and the model stays fully queryable.

pub mod annotations;
pub mod construct;
pub mod core_vocabulary;
pub mod enums;
pub mod expressions;
pub mod model;
pub mod primitives;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use annotations::{AnnotationTarget, ModelAnnotation};
pub use construct::MutableModel;
pub use core_vocabulary::{core_terms, find_core_term, CoreTerm, CORE_NAMESPACE};
pub use enums::{ResolvedEnum, ResolvedEnumMember};
pub use model::{BaseOutcome, EdmModel, ElementHandle, ElementKey, StructuredKind, TermLookup};
pub use primitives::{PrimitiveTypeKind, ALL_PRIMITIVE_KINDS};
pub use types::{EdmType, EdmTypeReference};

use thiserror::Error;

/// Errors that can occur when editing a constructible model
#[derive(Error, Debug)]
pub enum Error {
    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),
}

impl Error {
    /// Build a namespace-not-found error.
    pub fn namespace_not_found(namespace: impl Into<String>) -> Self {
        Self::NamespaceNotFound(namespace.into())
    }
}

/// Crate-local result type for model editing operations.
pub type Result<T> = std::result::Result<T, Error>;
