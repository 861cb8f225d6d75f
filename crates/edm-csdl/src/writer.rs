//! CSDL serializer
//!
//! Writes a model back to CSDL documents, element by element, including
//! the full annotation target/qualifier/term/expression shape, so that
//! re-parsing yields an observationally equivalent model.

use edm_ast::{
    AnnotationDecl, AnnotationsBlock, ContainerElementDecl, EntityContainerDecl, EnumTypeDecl,
    Expression, ExpressionKind, FacetsDecl, MaxLengthValue, NavigationPropertyDecl, OperationDecl,
    OperationKind, PropertyDecl, ScaleValue, SchemaDocument, SchemaElementDecl, SridValue,
    StructuralPropertyDecl, TermDecl, TypeDefinitionDecl, TypeReferenceDecl,
};
use edm_model::EdmModel;
use std::fmt::Write;
use tracing::debug;

const EDM_XMLNS: &str = "http://docs.oasis-open.org/odata/ns/edm";

/// Serializer for CSDL documents
pub struct CsdlWriter;

impl CsdlWriter {
    /// Create a new CSDL writer
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Write every document of a model, one output string per document
    #[must_use]
    pub fn write_model(&self, model: &EdmModel) -> Vec<String> {
        let outputs: Vec<String> = model
            .documents()
            .iter()
            .map(|d| self.write_document(d))
            .collect();
        debug!(documents = outputs.len(), "wrote model");
        outputs
    }

    /// Write one schema document
    #[must_use]
    pub fn write_document(&self, document: &SchemaDocument) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let _ = write!(
            out,
            "<Schema Namespace=\"{}\"",
            escape(&document.namespace)
        );
        if let Some(alias) = &document.alias {
            let _ = write!(out, " Alias=\"{}\"", escape(alias));
        }
        let _ = writeln!(out, " xmlns=\"{EDM_XMLNS}\">");

        for element in &document.elements {
            self.write_element(&mut out, 1, element);
        }
        for block in &document.out_of_line {
            self.write_annotations_block(&mut out, 1, block);
        }

        out.push_str("</Schema>\n");
        out
    }

    fn write_element(&self, out: &mut String, depth: usize, element: &SchemaElementDecl) {
        match element {
            SchemaElementDecl::EntityType(decl) => {
                indent(out, depth);
                let _ = write!(out, "<EntityType Name=\"{}\"", escape(&decl.name));
                if let Some(base) = &decl.base_type {
                    let _ = write!(out, " BaseType=\"{}\"", escape(base));
                }
                if decl.is_abstract {
                    out.push_str(" Abstract=\"true\"");
                }
                if decl.is_open {
                    out.push_str(" OpenType=\"true\"");
                }
                out.push_str(">\n");

                if let Some(key) = &decl.key {
                    indent(out, depth + 1);
                    out.push_str("<Key>");
                    for property_ref in &key.property_refs {
                        let _ = write!(out, "<PropertyRef Name=\"{}\"", escape(&property_ref.name));
                        if let Some(alias) = &property_ref.alias {
                            let _ = write!(out, " Alias=\"{}\"", escape(alias));
                        }
                        out.push_str("/>");
                    }
                    out.push_str("</Key>\n");
                }
                for property in &decl.properties {
                    self.write_property(out, depth + 1, property);
                }
                self.write_annotations(out, depth + 1, &decl.annotations);

                indent(out, depth);
                out.push_str("</EntityType>\n");
            }
            SchemaElementDecl::ComplexType(decl) => {
                indent(out, depth);
                let _ = write!(out, "<ComplexType Name=\"{}\"", escape(&decl.name));
                if let Some(base) = &decl.base_type {
                    let _ = write!(out, " BaseType=\"{}\"", escape(base));
                }
                if decl.is_abstract {
                    out.push_str(" Abstract=\"true\"");
                }
                if decl.is_open {
                    out.push_str(" OpenType=\"true\"");
                }
                out.push_str(">\n");
                for property in &decl.properties {
                    self.write_property(out, depth + 1, property);
                }
                self.write_annotations(out, depth + 1, &decl.annotations);
                indent(out, depth);
                out.push_str("</ComplexType>\n");
            }
            SchemaElementDecl::EnumType(decl) => self.write_enum(out, depth, decl),
            SchemaElementDecl::TypeDefinition(decl) => self.write_type_definition(out, depth, decl),
            SchemaElementDecl::Term(decl) => self.write_term(out, depth, decl),
            SchemaElementDecl::Operation(decl) => self.write_operation(out, depth, decl),
            SchemaElementDecl::EntityContainer(decl) => self.write_container(out, depth, decl),
        }
    }

    fn write_property(&self, out: &mut String, depth: usize, property: &PropertyDecl) {
        match property {
            PropertyDecl::Structural(decl) => self.write_structural_property(out, depth, decl),
            PropertyDecl::Navigation(decl) => self.write_navigation_property(out, depth, decl),
        }
    }

    fn write_structural_property(
        &self,
        out: &mut String,
        depth: usize,
        decl: &StructuralPropertyDecl,
    ) {
        indent(out, depth);
        let _ = write!(out, "<Property Name=\"{}\"", escape(&decl.name));
        write_type_attributes(out, &decl.type_ref);
        if let Some(default) = &decl.default_value {
            let _ = write!(out, " DefaultValue=\"{}\"", escape(default));
        }
        if decl.annotations.is_empty() {
            out.push_str("/>\n");
        } else {
            out.push_str(">\n");
            self.write_annotations(out, depth + 1, &decl.annotations);
            indent(out, depth);
            out.push_str("</Property>\n");
        }
    }

    fn write_navigation_property(
        &self,
        out: &mut String,
        depth: usize,
        decl: &NavigationPropertyDecl,
    ) {
        indent(out, depth);
        let _ = write!(out, "<NavigationProperty Name=\"{}\"", escape(&decl.name));
        write_type_attributes(out, &decl.type_ref);
        if let Some(partner) = &decl.partner {
            let _ = write!(out, " Partner=\"{}\"", escape(partner));
        }
        if decl.contains_target {
            out.push_str(" ContainsTarget=\"true\"");
        }

        let has_children = !decl.referential_constraints.is_empty()
            || decl.on_delete.is_some()
            || !decl.annotations.is_empty();
        if !has_children {
            out.push_str("/>\n");
            return;
        }
        out.push_str(">\n");

        for constraint in &decl.referential_constraints {
            indent(out, depth + 1);
            let _ = writeln!(
                out,
                "<ReferentialConstraint Property=\"{}\" ReferencedProperty=\"{}\"/>",
                escape(&constraint.property),
                escape(&constraint.referenced_property)
            );
        }
        if let Some(on_delete) = &decl.on_delete {
            indent(out, depth + 1);
            let _ = writeln!(out, "<OnDelete Action=\"{}\"/>", on_delete.action.as_str());
        }
        self.write_annotations(out, depth + 1, &decl.annotations);

        indent(out, depth);
        out.push_str("</NavigationProperty>\n");
    }

    fn write_enum(&self, out: &mut String, depth: usize, decl: &EnumTypeDecl) {
        indent(out, depth);
        let _ = write!(out, "<EnumType Name=\"{}\"", escape(&decl.name));
        if let Some(underlying) = &decl.underlying_type {
            let _ = write!(out, " UnderlyingType=\"{}\"", escape(underlying));
        }
        if decl.is_flags {
            out.push_str(" IsFlags=\"true\"");
        }
        out.push_str(">\n");

        for member in &decl.members {
            indent(out, depth + 1);
            let _ = write!(out, "<Member Name=\"{}\"", escape(&member.name));
            if let Some(value) = member.value {
                let _ = write!(out, " Value=\"{value}\"");
            }
            if member.annotations.is_empty() {
                out.push_str("/>\n");
            } else {
                out.push_str(">\n");
                self.write_annotations(out, depth + 2, &member.annotations);
                indent(out, depth + 1);
                out.push_str("</Member>\n");
            }
        }
        self.write_annotations(out, depth + 1, &decl.annotations);

        indent(out, depth);
        out.push_str("</EnumType>\n");
    }

    fn write_type_definition(&self, out: &mut String, depth: usize, decl: &TypeDefinitionDecl) {
        indent(out, depth);
        let _ = write!(
            out,
            "<TypeDefinition Name=\"{}\" UnderlyingType=\"{}\"",
            escape(&decl.name),
            escape(&decl.underlying_type)
        );
        write_facet_attributes(out, &decl.facets);
        if decl.annotations.is_empty() {
            out.push_str("/>\n");
        } else {
            out.push_str(">\n");
            self.write_annotations(out, depth + 1, &decl.annotations);
            indent(out, depth);
            out.push_str("</TypeDefinition>\n");
        }
    }

    fn write_term(&self, out: &mut String, depth: usize, decl: &TermDecl) {
        indent(out, depth);
        let _ = write!(out, "<Term Name=\"{}\"", escape(&decl.name));
        write_type_attributes(out, &decl.type_ref);
        if let Some(default) = &decl.default_value {
            let _ = write!(out, " DefaultValue=\"{}\"", escape(default));
        }
        if let Some(applies_to) = &decl.applies_to {
            let _ = write!(out, " AppliesTo=\"{}\"", escape(applies_to));
        }
        if decl.annotations.is_empty() {
            out.push_str("/>\n");
        } else {
            out.push_str(">\n");
            self.write_annotations(out, depth + 1, &decl.annotations);
            indent(out, depth);
            out.push_str("</Term>\n");
        }
    }

    fn write_operation(&self, out: &mut String, depth: usize, decl: &OperationDecl) {
        let tag = match decl.kind {
            OperationKind::Action => "Action",
            OperationKind::Function => "Function",
        };
        indent(out, depth);
        let _ = write!(out, "<{tag} Name=\"{}\"", escape(&decl.name));
        if decl.is_bound {
            out.push_str(" IsBound=\"true\"");
        }
        if decl.kind == OperationKind::Function && decl.is_composable {
            out.push_str(" IsComposable=\"true\"");
        }
        if let Some(path) = &decl.entity_set_path {
            let _ = write!(out, " EntitySetPath=\"{}\"", escape(path));
        }
        out.push_str(">\n");

        for parameter in &decl.parameters {
            indent(out, depth + 1);
            let _ = write!(out, "<Parameter Name=\"{}\"", escape(&parameter.name));
            write_type_attributes(out, &parameter.type_ref);
            if parameter.annotations.is_empty() {
                out.push_str("/>\n");
            } else {
                out.push_str(">\n");
                self.write_annotations(out, depth + 2, &parameter.annotations);
                indent(out, depth + 1);
                out.push_str("</Parameter>\n");
            }
        }
        if let Some(return_type) = &decl.return_type {
            indent(out, depth + 1);
            out.push_str("<ReturnType");
            write_type_attributes(out, &return_type.type_ref);
            out.push_str("/>\n");
        }
        self.write_annotations(out, depth + 1, &decl.annotations);

        indent(out, depth);
        let _ = writeln!(out, "</{tag}>");
    }

    fn write_container(&self, out: &mut String, depth: usize, decl: &EntityContainerDecl) {
        indent(out, depth);
        let _ = write!(out, "<EntityContainer Name=\"{}\"", escape(&decl.name));
        if let Some(extends) = &decl.extends {
            let _ = write!(out, " Extends=\"{}\"", escape(extends));
        }
        out.push_str(">\n");

        for element in &decl.elements {
            match element {
                ContainerElementDecl::EntitySet(set) => {
                    indent(out, depth + 1);
                    let _ = write!(
                        out,
                        "<EntitySet Name=\"{}\" EntityType=\"{}\"",
                        escape(&set.name),
                        escape(&set.entity_type)
                    );
                    self.write_set_body(out, depth + 1, &set.bindings, &set.annotations, "EntitySet");
                }
                ContainerElementDecl::Singleton(singleton) => {
                    indent(out, depth + 1);
                    let _ = write!(
                        out,
                        "<Singleton Name=\"{}\" Type=\"{}\"",
                        escape(&singleton.name),
                        escape(&singleton.entity_type)
                    );
                    self.write_set_body(
                        out,
                        depth + 1,
                        &singleton.bindings,
                        &singleton.annotations,
                        "Singleton",
                    );
                }
                ContainerElementDecl::OperationImport(import) => {
                    let (tag, attribute) = match import.kind {
                        OperationKind::Action => ("ActionImport", "Action"),
                        OperationKind::Function => ("FunctionImport", "Function"),
                    };
                    indent(out, depth + 1);
                    let _ = write!(
                        out,
                        "<{tag} Name=\"{}\" {attribute}=\"{}\"",
                        escape(&import.name),
                        escape(&import.operation)
                    );
                    if let Some(entity_set) = &import.entity_set {
                        let _ = write!(out, " EntitySet=\"{}\"", escape(entity_set));
                    }
                    if import.annotations.is_empty() {
                        out.push_str("/>\n");
                    } else {
                        out.push_str(">\n");
                        self.write_annotations(out, depth + 2, &import.annotations);
                        indent(out, depth + 1);
                        let _ = writeln!(out, "</{tag}>");
                    }
                }
            }
        }
        self.write_annotations(out, depth + 1, &decl.annotations);

        indent(out, depth);
        out.push_str("</EntityContainer>\n");
    }

    fn write_set_body(
        &self,
        out: &mut String,
        depth: usize,
        bindings: &[edm_ast::NavigationBindingDecl],
        annotations: &[AnnotationDecl],
        tag: &str,
    ) {
        if bindings.is_empty() && annotations.is_empty() {
            out.push_str("/>\n");
            return;
        }
        out.push_str(">\n");
        for binding in bindings {
            indent(out, depth + 1);
            let _ = writeln!(
                out,
                "<NavigationPropertyBinding Path=\"{}\" Target=\"{}\"/>",
                escape(&binding.path),
                escape(&binding.target)
            );
        }
        self.write_annotations(out, depth + 1, annotations);
        indent(out, depth);
        let _ = writeln!(out, "</{tag}>");
    }

    fn write_annotations_block(&self, out: &mut String, depth: usize, block: &AnnotationsBlock) {
        indent(out, depth);
        let _ = write!(out, "<Annotations Target=\"{}\"", escape(&block.target));
        if let Some(qualifier) = &block.qualifier {
            let _ = write!(out, " Qualifier=\"{}\"", escape(qualifier));
        }
        out.push_str(">\n");
        self.write_annotations(out, depth + 1, &block.annotations);
        indent(out, depth);
        out.push_str("</Annotations>\n");
    }

    fn write_annotations(&self, out: &mut String, depth: usize, annotations: &[AnnotationDecl]) {
        for annotation in annotations {
            indent(out, depth);
            let _ = write!(out, "<Annotation Term=\"{}\"", escape(&annotation.term));
            if let Some(qualifier) = &annotation.qualifier {
                let _ = write!(out, " Qualifier=\"{}\"", escape(qualifier));
            }

            match &annotation.value {
                None => out.push_str("/>\n"),
                Some(value) => match constant_attribute(value) {
                    Some((name, raw)) => {
                        let _ = writeln!(out, " {name}=\"{}\"/>", escape(raw));
                    }
                    None => {
                        out.push_str(">\n");
                        self.write_expression(out, depth + 1, value);
                        indent(out, depth);
                        out.push_str("</Annotation>\n");
                    }
                },
            }
        }
    }

    fn write_expression(&self, out: &mut String, depth: usize, expression: &Expression) {
        indent(out, depth);
        match &expression.kind {
            ExpressionKind::String(text) => {
                let _ = writeln!(out, "<String>{}</String>", escape_text(text));
            }
            ExpressionKind::Integer(raw) => {
                let _ = writeln!(out, "<Int>{}</Int>", escape_text(raw));
            }
            ExpressionKind::Boolean(raw) => {
                let _ = writeln!(out, "<Bool>{}</Bool>", escape_text(raw));
            }
            ExpressionKind::Float(raw) => {
                let _ = writeln!(out, "<Float>{}</Float>", escape_text(raw));
            }
            ExpressionKind::Decimal(raw) => {
                let _ = writeln!(out, "<Decimal>{}</Decimal>", escape_text(raw));
            }
            ExpressionKind::Guid(raw) => {
                let _ = writeln!(out, "<Guid>{}</Guid>", escape_text(raw));
            }
            ExpressionKind::DateTimeOffset(raw) => {
                let _ = writeln!(out, "<DateTimeOffset>{}</DateTimeOffset>", escape_text(raw));
            }
            ExpressionKind::Duration(raw) => {
                let _ = writeln!(out, "<Duration>{}</Duration>", escape_text(raw));
            }
            ExpressionKind::Binary(raw) => {
                let _ = writeln!(out, "<Binary>{}</Binary>", escape_text(raw));
            }
            ExpressionKind::Null => out.push_str("<Null/>\n"),
            ExpressionKind::EnumMember(raw) => {
                let _ = writeln!(out, "<EnumMember>{}</EnumMember>", escape_text(raw));
            }
            ExpressionKind::Path(raw) => {
                let _ = writeln!(out, "<Path>{}</Path>", escape_text(raw));
            }
            ExpressionKind::Record {
                type_name,
                properties,
            } => {
                out.push_str("<Record");
                if let Some(type_name) = type_name {
                    let _ = write!(out, " Type=\"{}\"", escape(type_name));
                }
                out.push_str(">\n");
                for constructor in properties {
                    indent(out, depth + 1);
                    let _ = write!(
                        out,
                        "<PropertyValue Property=\"{}\"",
                        escape(&constructor.name)
                    );
                    match constant_attribute(&constructor.value) {
                        Some((name, raw)) => {
                            let _ = writeln!(out, " {name}=\"{}\"/>", escape(raw));
                        }
                        None => {
                            out.push_str(">\n");
                            self.write_expression(out, depth + 2, &constructor.value);
                            indent(out, depth + 1);
                            out.push_str("</PropertyValue>\n");
                        }
                    }
                }
                indent(out, depth);
                out.push_str("</Record>\n");
            }
            ExpressionKind::Collection(elements) => {
                out.push_str("<Collection>\n");
                for element in elements {
                    self.write_expression(out, depth + 1, element);
                }
                indent(out, depth);
                out.push_str("</Collection>\n");
            }
            ExpressionKind::If {
                test,
                if_true,
                if_false,
            } => {
                out.push_str("<If>\n");
                self.write_expression(out, depth + 1, test);
                self.write_expression(out, depth + 1, if_true);
                self.write_expression(out, depth + 1, if_false);
                indent(out, depth);
                out.push_str("</If>\n");
            }
            ExpressionKind::IsType { type_name, operand } => {
                let _ = writeln!(out, "<IsOf Type=\"{}\">", escape(type_name));
                self.write_expression(out, depth + 1, operand);
                indent(out, depth);
                out.push_str("</IsOf>\n");
            }
            ExpressionKind::Cast { type_name, operand } => {
                let _ = writeln!(out, "<Cast Type=\"{}\">", escape(type_name));
                self.write_expression(out, depth + 1, operand);
                indent(out, depth);
                out.push_str("</Cast>\n");
            }
            ExpressionKind::Apply {
                function,
                arguments,
            } => {
                let _ = writeln!(out, "<Apply Function=\"{}\">", escape(function));
                for argument in arguments {
                    self.write_expression(out, depth + 1, argument);
                }
                indent(out, depth);
                out.push_str("</Apply>\n");
            }
            ExpressionKind::LabeledElement { name, expression } => {
                let _ = writeln!(out, "<LabeledElement Name=\"{}\">", escape(name));
                self.write_expression(out, depth + 1, expression);
                indent(out, depth);
                out.push_str("</LabeledElement>\n");
            }
            ExpressionKind::LabeledElementReference(name) => {
                let _ = writeln!(out, "<LabeledElementReference Name=\"{}\"/>", escape(name));
            }
        }
    }
}

impl Default for CsdlWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Constant expressions that can be written in attribute form
fn constant_attribute(expression: &Expression) -> Option<(&'static str, &str)> {
    match &expression.kind {
        ExpressionKind::String(raw) => Some(("String", raw)),
        ExpressionKind::Integer(raw) => Some(("Int", raw)),
        ExpressionKind::Boolean(raw) => Some(("Bool", raw)),
        ExpressionKind::Float(raw) => Some(("Float", raw)),
        ExpressionKind::Decimal(raw) => Some(("Decimal", raw)),
        ExpressionKind::Guid(raw) => Some(("Guid", raw)),
        ExpressionKind::DateTimeOffset(raw) => Some(("DateTimeOffset", raw)),
        ExpressionKind::Duration(raw) => Some(("Duration", raw)),
        ExpressionKind::Binary(raw) => Some(("Binary", raw)),
        ExpressionKind::EnumMember(raw) => Some(("EnumMember", raw)),
        ExpressionKind::Path(raw) => Some(("Path", raw)),
        _ => None,
    }
}

fn write_type_attributes(out: &mut String, type_ref: &TypeReferenceDecl) {
    let _ = write!(out, " Type=\"{}\"", escape(&type_ref.raw_name()));
    if let Some(nullable) = type_ref.nullable {
        let _ = write!(out, " Nullable=\"{nullable}\"");
    }
    write_facet_attributes(out, &type_ref.facets);
}

fn write_facet_attributes(out: &mut String, facets: &FacetsDecl) {
    match facets.max_length {
        Some(MaxLengthValue::Unbounded) => out.push_str(" MaxLength=\"max\""),
        Some(MaxLengthValue::Fixed(value)) => {
            let _ = write!(out, " MaxLength=\"{value}\"");
        }
        None => {}
    }
    if let Some(precision) = facets.precision {
        let _ = write!(out, " Precision=\"{precision}\"");
    }
    match facets.scale {
        Some(ScaleValue::Variable) => out.push_str(" Scale=\"variable\""),
        Some(ScaleValue::Fixed(value)) => {
            let _ = write!(out, " Scale=\"{value}\"");
        }
        None => {}
    }
    if let Some(unicode) = facets.unicode {
        let _ = write!(out, " Unicode=\"{unicode}\"");
    }
    match facets.srid {
        Some(SridValue::Variable) => out.push_str(" SRID=\"variable\""),
        Some(SridValue::Value(value)) => {
            let _ = write!(out, " SRID=\"{value}\"");
        }
        None => {}
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
