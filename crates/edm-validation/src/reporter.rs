//! Validation report rendering

use crate::engine::ValidationResult;
use crate::version::EdmVersion;
use std::fmt::Write;

/// Renders a validation result for human consumption
pub struct ValidationReporter;

impl ValidationReporter {
    /// Create a new validation reporter
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Render a result as one line per error plus a summary
    #[must_use]
    pub fn render(&self, version: EdmVersion, result: &ValidationResult) -> String {
        let mut out = String::new();

        for error in &result.errors {
            let _ = writeln!(out, "{error}");
        }

        if result.is_valid {
            let _ = writeln!(out, "Model is valid against version {version}.");
        } else {
            let _ = writeln!(
                out,
                "Model is invalid against version {version}: {} error(s).",
                result.errors.len()
            );
        }
        out
    }
}

impl Default for ValidationReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edm_ast::{EdmError, ErrorCode, Location};

    #[test]
    fn test_render_valid() {
        let report = ValidationReporter::new().render(
            EdmVersion::V4_0,
            &ValidationResult {
                is_valid: true,
                errors: Vec::new(),
            },
        );
        assert_eq!(report, "Model is valid against version 4.0.\n");
    }

    #[test]
    fn test_render_errors_use_contract_format() {
        let result = ValidationResult {
            is_valid: false,
            errors: vec![EdmError::new(
                ErrorCode::AlreadyDefined,
                "An element with the name 'NS.X' is already defined.",
                Location::new(3, 4),
            )],
        };

        let report = ValidationReporter::new().render(EdmVersion::V4_01, &result);

        assert!(report.starts_with(
            "AlreadyDefined : An element with the name 'NS.X' is already defined. : (3, 4)\n"
        ));
        assert!(report.ends_with("Model is invalid against version 4.01: 1 error(s).\n"));
    }
}
