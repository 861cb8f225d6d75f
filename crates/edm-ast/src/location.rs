//! Source positions for error reporting

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position information attached to every AST node and error
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Line number (1-indexed)
    pub line: usize,

    /// Column number (1-indexed)
    pub column: usize,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_creation() {
        let loc = Location::new(10, 20);
        assert_eq!(loc.line, 10);
        assert_eq!(loc.column, 20);
    }

    #[test]
    fn test_location_default() {
        let loc = Location::default();
        assert_eq!(loc.line, 0);
        assert_eq!(loc.column, 0);
    }

    #[test]
    fn test_location_display() {
        let loc = Location::new(3, 14);
        assert_eq!(loc.to_string(), "(3, 14)");
    }
}
