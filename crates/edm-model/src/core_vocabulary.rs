//! Core vocabulary terms
//!
//! A small set of well-known terms (`Org.OData.Core.V1`) is available to
//! every model without being declared in any document. Constructed once as
//! immutable shared data, never mutated.

use std::sync::LazyLock;

/// Namespace of the core vocabulary
pub const CORE_NAMESPACE: &str = "Org.OData.Core.V1";

/// A built-in vocabulary term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreTerm {
    /// Simple term name
    pub name: &'static str,
    /// Qualified type of the term's value
    pub type_name: &'static str,
    /// Whether the term's value may be null
    pub nullable: bool,
}

impl CoreTerm {
    /// Full name of the term
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{CORE_NAMESPACE}.{}", self.name)
    }
}

static CORE_TERMS: LazyLock<Vec<CoreTerm>> = LazyLock::new(|| {
    vec![
        CoreTerm {
            name: "Description",
            type_name: "Edm.String",
            nullable: true,
        },
        CoreTerm {
            name: "LongDescription",
            type_name: "Edm.String",
            nullable: true,
        },
        CoreTerm {
            name: "IsLanguageDependent",
            type_name: "Edm.Boolean",
            nullable: false,
        },
    ]
});

/// Find a core term by full name
#[must_use]
pub fn find_core_term(full_name: &str) -> Option<&'static CoreTerm> {
    let simple = full_name.strip_prefix(CORE_NAMESPACE)?.strip_prefix('.')?;
    CORE_TERMS.iter().find(|t| t.name == simple)
}

/// All core terms in stable order
#[must_use]
pub fn core_terms() -> &'static [CoreTerm] {
    &CORE_TERMS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_core_term() {
        let term = find_core_term("Org.OData.Core.V1.Description").unwrap();
        assert_eq!(term.name, "Description");
        assert_eq!(term.type_name, "Edm.String");
        assert_eq!(term.full_name(), "Org.OData.Core.V1.Description");
    }

    #[test]
    fn test_unknown_term() {
        assert!(find_core_term("Org.OData.Core.V1.Nope").is_none());
        assert!(find_core_term("NS.Description").is_none());
    }

    #[test]
    fn test_terms_are_stable() {
        assert_eq!(core_terms().len(), 3);
    }
}
