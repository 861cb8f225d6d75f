//! Semantic model over parsed schema documents
//!
//! `EdmModel` composes one or more documents plus already-resolved
//! referenced models into a single queryable surface. Lookups are pure and
//! idempotent; reference resolution is lazy, memoized per element, and
//! never fails: unresolvable or cyclic references produce `Bad` values
//! carrying their errors.
//!
//! The memoization caches are not part of the observable state. The model
//! is single-threaded by contract; a fully warmed model is safe to read
//! concurrently because every further access is a pure cache hit.

use crate::enums::{resolve_enum_members, ResolvedEnum};
use crate::core_vocabulary::{find_core_term, CoreTerm};
use crate::primitives::PrimitiveTypeKind;
use crate::types::{EdmType, EdmTypeReference};
use dashmap::DashMap;
use edm_ast::{
    ComplexTypeDecl, EdmError, EntityContainerDecl, EntityTypeDecl, ErrorCode, Location,
    OperationDecl, PropertyDecl, SchemaDocument, SchemaElementDecl, TermDecl, TypeReferenceDecl,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// Identity of a schema element inside one model: document index plus
/// element index, both in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementKey {
    pub doc: usize,
    pub index: usize,
}

/// The two structured type kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredKind {
    Entity,
    Complex,
}

/// Memoized outcome of resolving a structured type's base
#[derive(Debug, Clone)]
pub enum BaseOutcome {
    /// No base type declared
    None,
    /// Base resolved to the canonical full name
    Resolved(String),
    /// The declared base could not be found (or is the wrong kind)
    Unresolved(EdmError),
    /// The type participates in a base type cycle
    Cyclic(EdmError),
}

impl BaseOutcome {
    /// The error carried by unresolved or cyclic outcomes
    #[must_use]
    pub fn error(&self) -> Option<&EdmError> {
        match self {
            Self::Unresolved(e) | Self::Cyclic(e) => Some(e),
            _ => None,
        }
    }
}

/// A borrowed view of one schema element in its owning model
#[derive(Clone, Copy)]
pub struct ElementHandle<'m> {
    pub model: &'m EdmModel,
    pub key: ElementKey,
}

impl PartialEq for ElementHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.model, other.model) && self.key == other.key
    }
}

impl std::fmt::Debug for ElementHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementHandle")
            .field("key", &self.key)
            .field("full_name", &self.full_name())
            .finish()
    }
}

impl<'m> ElementHandle<'m> {
    /// The element declaration
    #[must_use]
    pub fn decl(&self) -> &'m SchemaElementDecl {
        self.model.element(self.key)
    }

    /// The document declaring the element
    #[must_use]
    pub fn document(&self) -> &'m SchemaDocument {
        &self.model.documents[self.key.doc]
    }

    /// Declaring namespace
    #[must_use]
    pub fn namespace(&self) -> &'m str {
        &self.document().namespace
    }

    /// Namespace-qualified full name
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace(), self.decl().name())
    }

    /// Declaration position
    #[must_use]
    pub fn location(&self) -> Location {
        self.decl().location()
    }

    /// Entity type declaration, if this element is one
    #[must_use]
    pub fn as_entity(&self) -> Option<&'m EntityTypeDecl> {
        match self.decl() {
            SchemaElementDecl::EntityType(d) => Some(d),
            _ => None,
        }
    }

    /// Complex type declaration, if this element is one
    #[must_use]
    pub fn as_complex(&self) -> Option<&'m ComplexTypeDecl> {
        match self.decl() {
            SchemaElementDecl::ComplexType(d) => Some(d),
            _ => None,
        }
    }

    /// Term declaration, if this element is one
    #[must_use]
    pub fn as_term(&self) -> Option<&'m TermDecl> {
        match self.decl() {
            SchemaElementDecl::Term(d) => Some(d),
            _ => None,
        }
    }

    /// Operation declaration, if this element is one
    #[must_use]
    pub fn as_operation(&self) -> Option<&'m OperationDecl> {
        match self.decl() {
            SchemaElementDecl::Operation(d) => Some(d),
            _ => None,
        }
    }

    /// Entity container declaration, if this element is one
    #[must_use]
    pub fn as_container(&self) -> Option<&'m EntityContainerDecl> {
        match self.decl() {
            SchemaElementDecl::EntityContainer(d) => Some(d),
            _ => None,
        }
    }

    /// Structured kind of the element, if it is a structured type
    #[must_use]
    pub fn structured_kind(&self) -> Option<StructuredKind> {
        match self.decl() {
            SchemaElementDecl::EntityType(_) => Some(StructuredKind::Entity),
            SchemaElementDecl::ComplexType(_) => Some(StructuredKind::Complex),
            _ => None,
        }
    }

    /// Memoized base type outcome for structured types
    #[must_use]
    pub fn base_outcome(&self) -> BaseOutcome {
        self.model.base_outcome(self.key)
    }

    /// The resolved base type, when one exists
    #[must_use]
    pub fn base_type(&self) -> Option<ElementHandle<'m>> {
        match self.base_outcome() {
            BaseOutcome::Resolved(name) => self.model.find_canonical(&name),
            _ => None,
        }
    }

    /// Properties declared directly on this structured type
    #[must_use]
    pub fn declared_properties(&self) -> &'m [PropertyDecl] {
        match self.decl() {
            SchemaElementDecl::EntityType(d) => &d.properties,
            SchemaElementDecl::ComplexType(d) => &d.properties,
            _ => &[],
        }
    }

    /// All properties, inherited first, bounded against cyclic bases
    #[must_use]
    pub fn all_properties(&self) -> Vec<&'m PropertyDecl> {
        let mut chain = vec![*self];
        let mut visited: HashSet<String> = HashSet::from([self.full_name()]);
        let mut current = *self;
        while let Some(base) = current.base_type() {
            if !visited.insert(base.full_name()) {
                break;
            }
            chain.push(base);
            current = base;
        }

        chain
            .iter()
            .rev()
            .flat_map(|h| h.declared_properties().iter())
            .collect()
    }

    /// Find a declared or inherited property by name
    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<&'m PropertyDecl> {
        self.all_properties()
            .into_iter()
            .find(|p| p.name() == name)
    }

    /// Key property names: the nearest declared key up the base chain
    #[must_use]
    pub fn key_property_names(&self) -> Option<Vec<String>> {
        let mut visited: HashSet<String> = HashSet::from([self.full_name()]);
        let mut current = *self;
        loop {
            if let Some(entity) = current.as_entity() {
                if let Some(key) = &entity.key {
                    return Some(key.property_refs.iter().map(|r| r.name.clone()).collect());
                }
            }
            match current.base_type() {
                Some(base) if visited.insert(base.full_name()) => current = base,
                _ => return None,
            }
        }
    }

    /// Whether this type is the named type or derives from it
    #[must_use]
    pub fn is_or_derives_from(&self, full_name: &str) -> bool {
        if self.full_name() == full_name {
            return true;
        }
        let mut visited: HashSet<String> = HashSet::from([self.full_name()]);
        let mut current = *self;
        while let Some(base) = current.base_type() {
            if base.full_name() == full_name {
                return true;
            }
            if !visited.insert(base.full_name()) {
                break;
            }
            current = base;
        }
        false
    }

    /// Whether the structured type is open
    #[must_use]
    pub fn is_open(&self) -> bool {
        match self.decl() {
            SchemaElementDecl::EntityType(d) => d.is_open,
            SchemaElementDecl::ComplexType(d) => d.is_open,
            _ => false,
        }
    }

    /// Errors carried inline by this element's resolved views.
    ///
    /// This is the `IsBad` side of the contract: the aggregate `validate`
    /// view surfaces exactly these errors for reference resolution.
    #[must_use]
    pub fn inline_errors(&self) -> Vec<EdmError> {
        let mut errors = Vec::new();

        if let Some(error) = self.base_outcome().error() {
            errors.push(error.clone());
        }

        for property in self.declared_properties() {
            let type_ref = match property {
                PropertyDecl::Structural(p) => &p.type_ref,
                PropertyDecl::Navigation(p) => &p.type_ref,
            };
            errors.extend(self.model.resolve_type_reference(type_ref).errors());
        }

        match self.decl() {
            SchemaElementDecl::EnumType(_) => {
                errors.extend(self.model.resolve_enum(self.key).errors.clone());
            }
            SchemaElementDecl::TypeDefinition(d) => {
                let canonical = self.model.resolve_qualified(&d.underlying_type);
                if PrimitiveTypeKind::from_qualified_name(&canonical).is_none() {
                    errors.push(EdmError::new(
                        ErrorCode::UnderlyingTypeMustBePrimitive,
                        format!(
                            "The underlying type of '{}' must be a primitive type.",
                            self.full_name()
                        ),
                        d.location,
                    ));
                }
            }
            SchemaElementDecl::Term(d) => {
                errors.extend(self.model.resolve_type_reference(&d.type_ref).errors());
            }
            SchemaElementDecl::Operation(d) => {
                for parameter in &d.parameters {
                    errors.extend(self.model.resolve_type_reference(&parameter.type_ref).errors());
                }
                if let Some(return_type) = &d.return_type {
                    errors.extend(self.model.resolve_type_reference(&return_type.type_ref).errors());
                }
            }
            _ => {}
        }

        errors
    }

    /// Whether any resolved view of this element carries errors
    #[must_use]
    pub fn is_bad(&self) -> bool {
        !self.inline_errors().is_empty()
    }
}

/// A term lookup result: declared in a document or built into the core
/// vocabulary
#[derive(Debug, Clone, Copy)]
pub enum TermLookup<'m> {
    Declared(ElementHandle<'m>),
    Core(&'static CoreTerm),
}

impl TermLookup<'_> {
    /// Full name of the term
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            Self::Declared(handle) => handle.full_name(),
            Self::Core(term) => term.full_name(),
        }
    }

    /// The type annotation values of this term must have
    #[must_use]
    pub fn type_reference(&self) -> EdmTypeReference {
        match self {
            Self::Declared(handle) => match handle.as_term() {
                Some(decl) => handle.model.resolve_type_reference(&decl.type_ref),
                None => EdmTypeReference::new(
                    EdmType::Bad {
                        name: handle.full_name(),
                        errors: Vec::new(),
                    },
                    true,
                ),
            },
            Self::Core(term) => {
                let kind = PrimitiveTypeKind::from_qualified_name(term.type_name)
                    .unwrap_or(PrimitiveTypeKind::String);
                EdmTypeReference::primitive(kind, term.nullable)
            }
        }
    }
}

/// The composed, lazily resolved semantic model
pub struct EdmModel {
    documents: Vec<SchemaDocument>,
    referenced: Vec<Arc<EdmModel>>,
    /// alias → namespace, collected from every document of this parse
    aliases: HashMap<String, String>,
    /// full name → declaring elements, in declaration order
    index: HashMap<String, Vec<ElementKey>>,
    base_cache: DashMap<ElementKey, BaseOutcome>,
    enum_cache: DashMap<ElementKey, Arc<ResolvedEnum>>,
}

impl EdmModel {
    /// An empty model
    #[must_use]
    pub fn empty() -> Self {
        Self::from_documents(Vec::new(), Vec::new())
    }

    /// Compose documents and referenced models into one read surface.
    ///
    /// Name collisions are indexed, not rejected; validation reports them.
    #[must_use]
    pub fn from_documents(
        documents: Vec<SchemaDocument>,
        referenced: Vec<Arc<EdmModel>>,
    ) -> Self {
        let mut aliases = HashMap::new();
        let mut index: HashMap<String, Vec<ElementKey>> = HashMap::new();

        for (doc_idx, document) in documents.iter().enumerate() {
            if let Some(alias) = &document.alias {
                // Dotted aliases were already rejected at parse time.
                if !alias.contains('.') {
                    aliases
                        .entry(alias.clone())
                        .or_insert_with(|| document.namespace.clone());
                }
            }
            for (elem_idx, element) in document.elements.iter().enumerate() {
                let full_name = document.full_name(element);
                index.entry(full_name).or_default().push(ElementKey {
                    doc: doc_idx,
                    index: elem_idx,
                });
            }
        }

        debug!(
            documents = documents.len(),
            elements = index.values().map(Vec::len).sum::<usize>(),
            referenced = referenced.len(),
            "composed model"
        );

        Self {
            documents,
            referenced,
            aliases,
            index,
            base_cache: DashMap::new(),
            enum_cache: DashMap::new(),
        }
    }

    /// The parsed documents backing this model
    #[must_use]
    pub fn documents(&self) -> &[SchemaDocument] {
        &self.documents
    }

    /// Externally supplied referenced models
    #[must_use]
    pub fn referenced_models(&self) -> &[Arc<EdmModel>] {
        &self.referenced
    }

    pub(crate) fn element(&self, key: ElementKey) -> &SchemaElementDecl {
        &self.documents[key.doc].elements[key.index]
    }

    /// Rewrite an alias-qualified name to its canonical namespace form
    #[must_use]
    pub fn resolve_qualified(&self, name: &str) -> String {
        if let Some((qualifier, simple)) = name.rsplit_once('.') {
            if let Some(namespace) = self.aliases.get(qualifier) {
                return format!("{namespace}.{simple}");
            }
        }
        name.to_string()
    }

    /// All schema elements of this model's own documents, in declaration
    /// order
    pub fn schema_elements(&self) -> impl Iterator<Item = ElementHandle<'_>> {
        self.documents.iter().enumerate().flat_map(move |(doc, d)| {
            d.elements
                .iter()
                .enumerate()
                .map(move |(index, _)| ElementHandle {
                    model: self,
                    key: ElementKey { doc, index },
                })
        })
    }

    pub(crate) fn find_canonical<'m>(&'m self, canonical: &str) -> Option<ElementHandle<'m>> {
        if let Some(keys) = self.index.get(canonical) {
            return Some(ElementHandle {
                model: self,
                key: keys[0],
            });
        }
        for referenced in &self.referenced {
            if let Some(handle) = referenced.find_canonical(canonical) {
                return Some(handle);
            }
        }
        None
    }

    /// Find any schema element by qualified (or alias-qualified) name
    #[must_use]
    pub fn find_schema_element(&self, name: &str) -> Option<ElementHandle<'_>> {
        let canonical = self.resolve_qualified(name);
        self.find_canonical(&canonical)
    }

    /// Find a schema type (entity, complex, enum, or type definition)
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<ElementHandle<'_>> {
        self.find_schema_element(name).filter(|h| {
            matches!(
                h.decl(),
                SchemaElementDecl::EntityType(_)
                    | SchemaElementDecl::ComplexType(_)
                    | SchemaElementDecl::EnumType(_)
                    | SchemaElementDecl::TypeDefinition(_)
            )
        })
    }

    /// Find a term, falling back to the built-in core vocabulary
    #[must_use]
    pub fn find_term(&self, name: &str) -> Option<TermLookup<'_>> {
        let canonical = self.resolve_qualified(name);
        if let Some(handle) = self.find_canonical(&canonical) {
            if handle.as_term().is_some() {
                return Some(TermLookup::Declared(handle));
            }
        }
        find_core_term(&canonical).map(TermLookup::Core)
    }

    /// Find every operation overload sharing the given name
    #[must_use]
    pub fn find_operations(&self, name: &str) -> Vec<ElementHandle<'_>> {
        let canonical = self.resolve_qualified(name);
        let mut overloads = Vec::new();
        self.collect_operations(&canonical, &mut overloads);
        overloads
    }

    fn collect_operations<'m>(&'m self, canonical: &str, out: &mut Vec<ElementHandle<'m>>) {
        if let Some(keys) = self.index.get(canonical) {
            for key in keys {
                let handle = ElementHandle {
                    model: self,
                    key: *key,
                };
                if handle.as_operation().is_some() {
                    out.push(handle);
                }
            }
        }
        for referenced in &self.referenced {
            referenced.collect_operations(canonical, out);
        }
    }

    /// Find an entity container by qualified name
    #[must_use]
    pub fn find_entity_container(&self, name: &str) -> Option<ElementHandle<'_>> {
        self.find_schema_element(name)
            .filter(|h| h.as_container().is_some())
    }

    /// The first entity container, if any
    #[must_use]
    pub fn entity_container(&self) -> Option<ElementHandle<'_>> {
        let own = self
            .schema_elements()
            .find(|h| h.as_container().is_some());
        own.or_else(|| {
            self.referenced
                .iter()
                .find_map(|r| r.entity_container())
        })
    }

    /// Resolve a declared type reference; never fails, may return `Bad`
    #[must_use]
    pub fn resolve_type_reference(&self, decl: &TypeReferenceDecl) -> EdmTypeReference {
        let mut element = self.resolve_type_name(
            &decl.type_name,
            decl.nullable_or_default(),
            decl.location,
        );
        element.facets = decl.facets.clone();

        if decl.is_collection {
            EdmTypeReference::new(EdmType::Collection(Box::new(element)), true)
        } else if decl.is_entity_reference {
            EdmTypeReference::new(
                EdmType::EntityReference(Box::new(element)),
                decl.nullable_or_default(),
            )
        } else {
            element
        }
    }

    fn resolve_type_name(
        &self,
        name: &str,
        nullable: bool,
        location: Location,
    ) -> EdmTypeReference {
        let canonical = self.resolve_qualified(name);

        if let Some(kind) = PrimitiveTypeKind::from_qualified_name(&canonical) {
            return EdmTypeReference::primitive(kind, nullable);
        }

        let definition = match self.find_canonical(&canonical) {
            Some(handle) => match handle.decl() {
                SchemaElementDecl::EntityType(_) => EdmType::Entity(handle.full_name()),
                SchemaElementDecl::ComplexType(_) => EdmType::Complex(handle.full_name()),
                SchemaElementDecl::EnumType(_) => EdmType::Enum(handle.full_name()),
                SchemaElementDecl::TypeDefinition(_) => {
                    EdmType::TypeDefinition(handle.full_name())
                }
                _ => EdmType::Bad {
                    name: canonical.clone(),
                    errors: vec![EdmError::new(
                        ErrorCode::BadUnresolvedType,
                        format!("The name '{name}' does not refer to a type."),
                        location,
                    )],
                },
            },
            None => EdmType::Bad {
                name: canonical.clone(),
                errors: vec![EdmError::new(
                    ErrorCode::BadUnresolvedType,
                    format!("The type '{name}' could not be found."),
                    location,
                )],
            },
        };

        EdmTypeReference::new(definition, nullable)
    }

    /// Memoized base type outcome for a structured type.
    ///
    /// The walk carries a visited set; a type whose chain returns to itself
    /// is a cycle participant and gets exactly one cyclic error at its own
    /// declaration location. Types that merely lead into a foreign cycle
    /// resolve their immediate base normally, so a model of N types
    /// produces at most N cyclic errors.
    pub(crate) fn base_outcome(&self, key: ElementKey) -> BaseOutcome {
        if let Some(cached) = self.base_cache.get(&key) {
            trace!(?key, "base outcome cache hit");
            return cached.clone();
        }

        let handle = ElementHandle { model: self, key };
        let outcome = self.compute_base_outcome(handle);
        self.base_cache.insert(key, outcome.clone());
        outcome
    }

    fn compute_base_outcome(&self, handle: ElementHandle<'_>) -> BaseOutcome {
        let (kind, declared_base, location) = match handle.decl() {
            SchemaElementDecl::EntityType(d) => {
                (StructuredKind::Entity, d.base_type.as_deref(), d.location)
            }
            SchemaElementDecl::ComplexType(d) => {
                (StructuredKind::Complex, d.base_type.as_deref(), d.location)
            }
            _ => return BaseOutcome::None,
        };

        let Some(declared_base) = declared_base else {
            return BaseOutcome::None;
        };

        let start = handle.full_name();
        if self.chain_returns_to(&start, declared_base, kind) {
            let (code, noun) = match kind {
                StructuredKind::Entity => (ErrorCode::BadCyclicEntity, "entity"),
                StructuredKind::Complex => (ErrorCode::BadCyclicComplex, "complex"),
            };
            debug!(type_name = %start, "base type cycle detected");
            return BaseOutcome::Cyclic(EdmError::new(
                code,
                format!("The {noun} type '{start}' is invalid because its base type is cyclic."),
                location,
            ));
        }

        let canonical = self.resolve_qualified(declared_base);
        match self.find_canonical(&canonical) {
            Some(base) if base.structured_kind() == Some(kind) => {
                BaseOutcome::Resolved(base.full_name())
            }
            _ => BaseOutcome::Unresolved(EdmError::new(
                ErrorCode::BadUnresolvedType,
                format!("The type '{declared_base}' could not be found."),
                location,
            )),
        }
    }

    /// Whether following the base chain from `declared_base` returns to
    /// `start`. Bounded by a visited set, so any cycle shape terminates.
    fn chain_returns_to(&self, start: &str, declared_base: &str, kind: StructuredKind) -> bool {
        let mut visited: HashSet<String> = HashSet::from([start.to_string()]);
        let mut current = self.resolve_qualified(declared_base);

        loop {
            if current == start {
                return true;
            }
            if !visited.insert(current.clone()) {
                // Revisited a type other than the start: the chain leads
                // into a cycle this type is not part of.
                return false;
            }
            let Some(handle) = self.find_canonical(&current) else {
                return false;
            };
            if handle.structured_kind() != Some(kind) {
                return false;
            }
            let next = match handle.decl() {
                SchemaElementDecl::EntityType(d) => d.base_type.as_deref(),
                SchemaElementDecl::ComplexType(d) => d.base_type.as_deref(),
                _ => None,
            };
            match next {
                Some(next) => current = handle.model.resolve_qualified(next),
                None => return false,
            }
        }
    }

    /// Memoized enum member resolution
    #[must_use]
    pub fn resolve_enum(&self, key: ElementKey) -> Arc<ResolvedEnum> {
        if let Some(cached) = self.enum_cache.get(&key) {
            return Arc::clone(&cached);
        }

        let resolved = Arc::new(match self.element(key) {
            SchemaElementDecl::EnumType(decl) => resolve_enum_members(self, decl),
            _ => ResolvedEnum::empty(),
        });
        self.enum_cache.insert(key, Arc::clone(&resolved));
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_empty_schema_has_no_elements() {
        let model = model_from(vec![schema("NS1")]);
        assert_eq!(model.schema_elements().count(), 0);
    }

    #[test]
    fn test_find_schema_element_by_namespace_and_alias() {
        let mut doc = schema("NS1");
        doc.alias = Some("Self".to_string());
        doc.elements.push(entity_type("Customer", None));
        let model = model_from(vec![doc]);

        let by_namespace = model.find_schema_element("NS1.Customer").unwrap();
        let by_alias = model.find_schema_element("Self.Customer").unwrap();

        assert_eq!(by_namespace.full_name(), "NS1.Customer");
        assert_eq!(by_namespace, by_alias);
    }

    #[test]
    fn test_unresolved_type_reference_is_bad_not_fatal() {
        let model = model_from(vec![schema("NS1")]);
        let decl = type_ref("NS1.Missing");

        let resolved = model.resolve_type_reference(&decl);

        assert!(resolved.is_bad());
        let errors = resolved.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, edm_ast::ErrorCode::BadUnresolvedType);
    }

    #[test]
    fn test_collection_of_unresolved_element() {
        let model = model_from(vec![schema("NS1")]);
        let decl = type_ref("Collection(NS1.Missing)");

        let resolved = model.resolve_type_reference(&decl);

        // The collection itself is well-formed; its element is bad.
        assert!(resolved.is_collection());
        assert!(resolved.element_type().unwrap().is_bad());
    }

    #[test]
    fn test_entity_reference_type() {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type("Customer", None));
        let model = model_from(vec![doc]);

        let resolved = model.resolve_type_reference(&type_ref("Ref(NS1.Customer)"));

        assert!(!resolved.is_bad());
        assert_eq!(resolved.definition.full_name(), "Ref(NS1.Customer)");
    }

    #[test]
    fn test_two_cycle_marks_both_types() {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type("A", Some("NS1.B")));
        doc.elements.push(entity_type("B", Some("NS1.A")));
        let model = model_from(vec![doc]);

        let outcomes: Vec<BaseOutcome> = model
            .schema_elements()
            .map(|h| h.base_outcome())
            .collect();

        for outcome in &outcomes {
            assert!(matches!(outcome, BaseOutcome::Cyclic(_)));
        }
    }

    #[test]
    fn test_three_cycle_marks_every_participant_at_its_own_location() {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type_at("Clod", Some("NS1.Smod"), 2));
        doc.elements.push(entity_type_at("Smod", Some("NS1.Blob"), 3));
        doc.elements.push(entity_type_at("Blob", Some("NS1.Clod"), 4));
        let model = model_from(vec![doc]);

        let errors: Vec<EdmError> = model
            .schema_elements()
            .filter_map(|h| h.base_outcome().error().cloned())
            .collect();

        assert_eq!(errors.len(), 3);
        for error in &errors {
            assert_eq!(error.code, ErrorCode::BadCyclicEntity);
        }
        assert_eq!(errors[0].location.line, 2);
        assert_eq!(errors[1].location.line, 3);
        assert_eq!(errors[2].location.line, 4);
    }

    #[test]
    fn test_tail_into_cycle_is_not_itself_cyclic() {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type("A", Some("NS1.B")));
        doc.elements.push(entity_type("B", Some("NS1.A")));
        doc.elements.push(entity_type("Tail", Some("NS1.A")));
        let model = model_from(vec![doc]);

        let tail = model.find_schema_element("NS1.Tail").unwrap();
        match tail.base_outcome() {
            BaseOutcome::Resolved(name) => assert_eq!(name, "NS1.A"),
            other => panic!("expected resolved base, got {other:?}"),
        }
    }

    #[test]
    fn test_self_cycle() {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type("Loop", Some("NS1.Loop")));
        let model = model_from(vec![doc]);

        let handle = model.find_schema_element("NS1.Loop").unwrap();
        assert!(matches!(handle.base_outcome(), BaseOutcome::Cyclic(_)));
    }

    #[test]
    fn test_base_outcome_is_memoized() {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type("A", Some("NS1.B")));
        doc.elements.push(entity_type("B", None));
        let model = model_from(vec![doc]);

        let handle = model.find_schema_element("NS1.A").unwrap();
        let first = format!("{:?}", handle.base_outcome());
        let second = format!("{:?}", handle.base_outcome());
        assert_eq!(first, second);
    }

    #[test]
    fn test_key_is_inherited_from_base() {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type_with_key(
            "Base",
            None,
            &[("Id", "Edm.Int32")],
            &["Id"],
        ));
        doc.elements.push(entity_type("Derived", Some("NS1.Base")));
        let model = model_from(vec![doc]);

        let derived = model.find_schema_element("NS1.Derived").unwrap();
        assert_eq!(derived.key_property_names(), Some(vec!["Id".to_string()]));
    }

    #[test]
    fn test_inherited_properties_come_before_declared() {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type_with_key(
            "Base",
            None,
            &[("Id", "Edm.Int32")],
            &["Id"],
        ));
        let mut derived = match entity_type("Derived", Some("NS1.Base")) {
            SchemaElementDecl::EntityType(d) => d,
            _ => unreachable!(),
        };
        derived
            .properties
            .push(structural_property("Name", "Edm.String"));
        doc.elements.push(SchemaElementDecl::EntityType(derived));
        let model = model_from(vec![doc]);

        let handle = model.find_schema_element("NS1.Derived").unwrap();
        let names: Vec<&str> = handle.all_properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Id", "Name"]);
    }

    #[test]
    fn test_lookup_falls_through_to_referenced_model() {
        let mut external_doc = schema("Ext");
        external_doc.elements.push(entity_type("Thing", None));
        let external = Arc::new(model_from(vec![external_doc]));

        let model = EdmModel::from_documents(vec![schema("NS1")], vec![external]);

        let found = model.find_schema_element("Ext.Thing").unwrap();
        assert_eq!(found.full_name(), "Ext.Thing");
    }

    #[test]
    fn test_operation_overloads_share_a_name() {
        let mut doc = schema("NS1");
        doc.elements.push(operation("Compute", &["Edm.Int32"]));
        doc.elements
            .push(operation("Compute", &["Edm.Int32", "Edm.Int32"]));
        let model = model_from(vec![doc]);

        assert_eq!(model.find_operations("NS1.Compute").len(), 2);
        assert!(model.find_operations("NS1.Missing").is_empty());
    }

    #[test]
    fn test_find_term_uses_core_fallback() {
        let model = model_from(vec![schema("NS1")]);

        let term = model.find_term("Org.OData.Core.V1.Description").unwrap();
        assert_eq!(term.full_name(), "Org.OData.Core.V1.Description");
        let type_ref = term.type_reference();
        assert_eq!(
            type_ref.definition,
            EdmType::Primitive(PrimitiveTypeKind::String)
        );
    }

    #[test]
    fn test_duplicate_names_resolve_to_first_declaration() {
        let mut doc = schema("NS1");
        doc.elements.push(entity_type_at("Dup", None, 2));
        doc.elements.push(entity_type_at("Dup", None, 5));
        let model = model_from(vec![doc]);

        let found = model.find_schema_element("NS1.Dup").unwrap();
        assert_eq!(found.location().line, 2);
    }
}
