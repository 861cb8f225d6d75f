//! # edm-validation
//!
//! Validation rule engine for EDM models.
//!
//! Validation is a pure function over a resolved model plus a
//! version-keyed rule set, returning a validity flag and an ordered error
//! list. Rule sets are data; rules are independent units scoped to one
//! element kind. Re-running validation on an unchanged model yields
//! identical results.

pub mod engine;
pub mod reporter;
pub mod rules;
pub mod ruleset;
pub mod version;

pub use engine::{validate, ValidationResult};
pub use reporter::ValidationReporter;
pub use rules::{RuleContext, RuleId, RuleScope};
pub use ruleset::{rule_set, V4_01_RULES, V4_0_RULES};
pub use version::EdmVersion;

use thiserror::Error;

/// Errors that can occur when driving validation
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown specification version: {0}")]
    UnknownVersion(String),
}

/// Crate-local result type for validation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Parse a version string or report it as unknown
///
/// # Errors
///
/// Returns an error when the version string names no known rule set.
pub fn version_from_str(value: &str) -> Result<EdmVersion> {
    EdmVersion::parse(value).ok_or_else(|| Error::UnknownVersion(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_str() {
        assert_eq!(version_from_str("4.0").unwrap(), EdmVersion::V4_0);
        assert!(version_from_str("5.0").is_err());
    }
}
