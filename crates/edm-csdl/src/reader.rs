//! CSDL document interpreter
//!
//! Maps a parsed XML tree onto the AST, collecting structural errors.
//! An unexpected element or a declaration missing a required attribute
//! aborts only that subtree; everything else in the document is still
//! interpreted, so independent structural errors all surface together.

use crate::xml::XmlElement;
use edm_ast::{
    AnnotationDecl, AnnotationsBlock, ComplexTypeDecl, ContainerElementDecl, EdmError,
    EntityContainerDecl, EntitySetDecl, EntityTypeDecl, EnumMemberDecl, EnumTypeDecl, ErrorCode,
    Expression, ExpressionKind, FacetsDecl, KeyDecl, MaxLengthValue, NavigationBindingDecl,
    NavigationPropertyDecl, OnDeleteAction, OnDeleteDecl, OperationDecl, OperationImportDecl,
    OperationKind, ParameterDecl, PropertyConstructor, PropertyDecl, PropertyRefDecl,
    ReferentialConstraintDecl, ReturnTypeDecl, ScaleValue, SchemaDocument, SchemaElementDecl,
    SingletonDecl, SridValue, StructuralPropertyDecl, TermDecl, TypeDefinitionDecl,
    TypeReferenceDecl,
};

/// Attribute names that introduce a constant value on `<Annotation>` and
/// `<PropertyValue>`
const CONSTANT_ATTRIBUTES: &[&str] = &[
    "String",
    "Int",
    "Bool",
    "Float",
    "Decimal",
    "Guid",
    "DateTimeOffset",
    "Duration",
    "Binary",
    "EnumMember",
    "Path",
];

/// Interprets one `<Schema>` tree, collecting structural errors
pub struct SchemaReader {
    errors: Vec<EdmError>,
}

impl SchemaReader {
    /// Create a reader with an empty error list
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Interpret a root element; always returns the collected errors
    pub fn read(mut self, root: &XmlElement) -> (Option<SchemaDocument>, Vec<EdmError>) {
        let document = self.read_schema(root);
        (document, self.errors)
    }

    fn read_schema(&mut self, root: &XmlElement) -> Option<SchemaDocument> {
        if root.name != "Schema" {
            self.push(
                ErrorCode::UnexpectedElement,
                format!("The element '{}' is not a valid document root.", root.name),
                root,
            );
            return None;
        }
        self.check_attributes(root, &["Namespace", "Alias"]);

        let namespace = self.require_attribute(root, "Namespace")?;
        let mut document = SchemaDocument::new(namespace, root.location);

        if let Some(alias) = root.attribute("Alias") {
            if alias.contains('.') || alias.is_empty() {
                self.errors.push(EdmError::new(
                    ErrorCode::InvalidQualifiedName,
                    format!("The alias '{alias}' is not a valid simple name."),
                    root.attribute_location("Alias"),
                ));
            } else {
                document.alias = Some(alias.to_string());
            }
        }

        for child in &root.children {
            match child.name.as_str() {
                "EntityType" => {
                    if let Some(decl) = self.read_entity_type(child) {
                        document.elements.push(SchemaElementDecl::EntityType(decl));
                    }
                }
                "ComplexType" => {
                    if let Some(decl) = self.read_complex_type(child) {
                        document.elements.push(SchemaElementDecl::ComplexType(decl));
                    }
                }
                "EnumType" => {
                    if let Some(decl) = self.read_enum_type(child) {
                        document.elements.push(SchemaElementDecl::EnumType(decl));
                    }
                }
                "TypeDefinition" => {
                    if let Some(decl) = self.read_type_definition(child) {
                        document
                            .elements
                            .push(SchemaElementDecl::TypeDefinition(decl));
                    }
                }
                "Term" => {
                    if let Some(decl) = self.read_term(child) {
                        document.elements.push(SchemaElementDecl::Term(decl));
                    }
                }
                "Action" => {
                    if let Some(decl) = self.read_operation(child, OperationKind::Action) {
                        document.elements.push(SchemaElementDecl::Operation(decl));
                    }
                }
                "Function" => {
                    if let Some(decl) = self.read_operation(child, OperationKind::Function) {
                        document.elements.push(SchemaElementDecl::Operation(decl));
                    }
                }
                "EntityContainer" => {
                    if let Some(decl) = self.read_container(child) {
                        document
                            .elements
                            .push(SchemaElementDecl::EntityContainer(decl));
                    }
                }
                "Annotations" => {
                    if let Some(block) = self.read_annotations_block(child) {
                        document.out_of_line.push(block);
                    }
                }
                _ => self.unexpected_element(child, "Schema"),
            }
        }

        Some(document)
    }

    fn read_entity_type(&mut self, element: &XmlElement) -> Option<EntityTypeDecl> {
        self.check_attributes(element, &["Name", "BaseType", "Abstract", "OpenType", "HasStream"]);
        let name = self.require_attribute(element, "Name")?;

        let mut decl = EntityTypeDecl {
            name,
            base_type: element.attribute("BaseType").map(str::to_string),
            is_abstract: self.bool_attribute(element, "Abstract"),
            is_open: self.bool_attribute(element, "OpenType"),
            key: None,
            properties: Vec::new(),
            annotations: Vec::new(),
            location: element.location,
        };

        for child in &element.children {
            match child.name.as_str() {
                "Key" if decl.key.is_none() => decl.key = Some(self.read_key(child)),
                "Property" => {
                    if let Some(property) = self.read_property(child) {
                        decl.properties.push(PropertyDecl::Structural(property));
                    }
                }
                "NavigationProperty" => {
                    if let Some(property) = self.read_navigation_property(child) {
                        decl.properties.push(PropertyDecl::Navigation(property));
                    }
                }
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        decl.annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, "EntityType"),
            }
        }

        Some(decl)
    }

    fn read_complex_type(&mut self, element: &XmlElement) -> Option<ComplexTypeDecl> {
        self.check_attributes(element, &["Name", "BaseType", "Abstract", "OpenType"]);
        let name = self.require_attribute(element, "Name")?;

        let mut decl = ComplexTypeDecl {
            name,
            base_type: element.attribute("BaseType").map(str::to_string),
            is_abstract: self.bool_attribute(element, "Abstract"),
            is_open: self.bool_attribute(element, "OpenType"),
            properties: Vec::new(),
            annotations: Vec::new(),
            location: element.location,
        };

        for child in &element.children {
            match child.name.as_str() {
                "Property" => {
                    if let Some(property) = self.read_property(child) {
                        decl.properties.push(PropertyDecl::Structural(property));
                    }
                }
                "NavigationProperty" => {
                    if let Some(property) = self.read_navigation_property(child) {
                        decl.properties.push(PropertyDecl::Navigation(property));
                    }
                }
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        decl.annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, "ComplexType"),
            }
        }

        Some(decl)
    }

    fn read_key(&mut self, element: &XmlElement) -> KeyDecl {
        let mut key = KeyDecl {
            property_refs: Vec::new(),
            location: element.location,
        };
        for child in &element.children {
            match child.name.as_str() {
                "PropertyRef" => {
                    self.check_attributes(child, &["Name", "Alias"]);
                    if let Some(name) = self.require_attribute(child, "Name") {
                        key.property_refs.push(PropertyRefDecl {
                            name,
                            alias: child.attribute("Alias").map(str::to_string),
                            location: child.location,
                        });
                    }
                }
                _ => self.unexpected_element(child, "Key"),
            }
        }
        key
    }

    fn read_property(&mut self, element: &XmlElement) -> Option<StructuralPropertyDecl> {
        self.check_attributes(
            element,
            &[
                "Name",
                "Type",
                "Nullable",
                "MaxLength",
                "Precision",
                "Scale",
                "Unicode",
                "SRID",
                "DefaultValue",
            ],
        );
        let name = self.require_attribute(element, "Name")?;
        let type_ref = self.read_type_reference(element, "Type")?;

        let mut decl = StructuralPropertyDecl {
            name,
            type_ref,
            default_value: element.attribute("DefaultValue").map(str::to_string),
            annotations: Vec::new(),
            location: element.location,
        };

        for child in &element.children {
            match child.name.as_str() {
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        decl.annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, "Property"),
            }
        }

        Some(decl)
    }

    fn read_navigation_property(
        &mut self,
        element: &XmlElement,
    ) -> Option<NavigationPropertyDecl> {
        self.check_attributes(
            element,
            &["Name", "Type", "Nullable", "Partner", "ContainsTarget"],
        );
        let name = self.require_attribute(element, "Name")?;
        let type_ref = self.read_type_reference(element, "Type")?;

        let mut decl = NavigationPropertyDecl {
            name,
            type_ref,
            partner: element.attribute("Partner").map(str::to_string),
            contains_target: self.bool_attribute(element, "ContainsTarget"),
            referential_constraints: Vec::new(),
            on_delete: None,
            annotations: Vec::new(),
            location: element.location,
        };

        for child in &element.children {
            match child.name.as_str() {
                "ReferentialConstraint" => {
                    self.check_attributes(child, &["Property", "ReferencedProperty"]);
                    let property = self.require_attribute(child, "Property");
                    let referenced = self.require_attribute(child, "ReferencedProperty");
                    if let (Some(property), Some(referenced_property)) = (property, referenced) {
                        decl.referential_constraints.push(ReferentialConstraintDecl {
                            property,
                            referenced_property,
                            location: child.location,
                        });
                    }
                }
                "OnDelete" => {
                    self.check_attributes(child, &["Action"]);
                    if let Some(action) = self.require_attribute(child, "Action") {
                        match OnDeleteAction::from_str(&action) {
                            Some(action) => {
                                decl.on_delete = Some(OnDeleteDecl {
                                    action,
                                    location: child.location,
                                });
                            }
                            None => self.errors.push(EdmError::new(
                                ErrorCode::InvalidOnDeleteAction,
                                format!("The value '{action}' is not a valid OnDelete action."),
                                child.attribute_location("Action"),
                            )),
                        }
                    }
                }
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        decl.annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, "NavigationProperty"),
            }
        }

        Some(decl)
    }

    fn read_enum_type(&mut self, element: &XmlElement) -> Option<EnumTypeDecl> {
        self.check_attributes(element, &["Name", "UnderlyingType", "IsFlags"]);
        let name = self.require_attribute(element, "Name")?;

        let mut decl = EnumTypeDecl {
            name,
            underlying_type: element.attribute("UnderlyingType").map(str::to_string),
            is_flags: self.bool_attribute(element, "IsFlags"),
            members: Vec::new(),
            annotations: Vec::new(),
            location: element.location,
        };

        for child in &element.children {
            match child.name.as_str() {
                "Member" => {
                    self.check_attributes(child, &["Name", "Value"]);
                    let Some(member_name) = self.require_attribute(child, "Name") else {
                        continue;
                    };
                    let value = match child.attribute("Value") {
                        None => None,
                        Some(raw) => match raw.parse::<i64>() {
                            Ok(value) => Some(value),
                            Err(_) => {
                                self.errors.push(EdmError::new(
                                    ErrorCode::InvalidInteger,
                                    format!("The value '{raw}' is not a valid integer."),
                                    child.attribute_location("Value"),
                                ));
                                continue;
                            }
                        },
                    };
                    let mut member = EnumMemberDecl {
                        name: member_name,
                        value,
                        annotations: Vec::new(),
                        location: child.location,
                    };
                    for grandchild in &child.children {
                        match grandchild.name.as_str() {
                            "Annotation" => {
                                if let Some(annotation) = self.read_annotation(grandchild) {
                                    member.annotations.push(annotation);
                                }
                            }
                            _ => self.unexpected_element(grandchild, "Member"),
                        }
                    }
                    decl.members.push(member);
                }
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        decl.annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, "EnumType"),
            }
        }

        Some(decl)
    }

    fn read_type_definition(&mut self, element: &XmlElement) -> Option<TypeDefinitionDecl> {
        self.check_attributes(
            element,
            &[
                "Name",
                "UnderlyingType",
                "MaxLength",
                "Precision",
                "Scale",
                "Unicode",
                "SRID",
            ],
        );
        let name = self.require_attribute(element, "Name")?;
        let underlying_type = self.require_attribute(element, "UnderlyingType")?;

        let mut decl = TypeDefinitionDecl {
            name,
            underlying_type,
            facets: self.read_facets(element),
            annotations: Vec::new(),
            location: element.location,
        };

        for child in &element.children {
            match child.name.as_str() {
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        decl.annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, "TypeDefinition"),
            }
        }

        Some(decl)
    }

    fn read_term(&mut self, element: &XmlElement) -> Option<TermDecl> {
        self.check_attributes(
            element,
            &[
                "Name",
                "Type",
                "DefaultValue",
                "AppliesTo",
                "Nullable",
                "MaxLength",
                "Precision",
                "Scale",
                "Unicode",
                "SRID",
            ],
        );
        let name = self.require_attribute(element, "Name")?;
        let type_ref = self.read_type_reference(element, "Type")?;

        let mut decl = TermDecl {
            name,
            type_ref,
            default_value: element.attribute("DefaultValue").map(str::to_string),
            applies_to: element.attribute("AppliesTo").map(str::to_string),
            annotations: Vec::new(),
            location: element.location,
        };

        for child in &element.children {
            match child.name.as_str() {
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        decl.annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, "Term"),
            }
        }

        Some(decl)
    }

    fn read_operation(
        &mut self,
        element: &XmlElement,
        kind: OperationKind,
    ) -> Option<OperationDecl> {
        let allowed: &[&str] = match kind {
            OperationKind::Action => &["Name", "IsBound", "EntitySetPath"],
            OperationKind::Function => &["Name", "IsBound", "EntitySetPath", "IsComposable"],
        };
        self.check_attributes(element, allowed);
        let name = self.require_attribute(element, "Name")?;

        let mut decl = OperationDecl {
            name,
            kind,
            is_bound: self.bool_attribute(element, "IsBound"),
            is_composable: self.bool_attribute(element, "IsComposable"),
            entity_set_path: element.attribute("EntitySetPath").map(str::to_string),
            parameters: Vec::new(),
            return_type: None,
            annotations: Vec::new(),
            location: element.location,
        };

        for child in &element.children {
            match child.name.as_str() {
                "Parameter" => {
                    self.check_attributes(
                        child,
                        &[
                            "Name",
                            "Type",
                            "Nullable",
                            "MaxLength",
                            "Precision",
                            "Scale",
                            "Unicode",
                            "SRID",
                        ],
                    );
                    let parameter_name = self.require_attribute(child, "Name");
                    let type_ref = self.read_type_reference(child, "Type");
                    if let (Some(parameter_name), Some(type_ref)) = (parameter_name, type_ref) {
                        let mut parameter = ParameterDecl {
                            name: parameter_name,
                            type_ref,
                            annotations: Vec::new(),
                            location: child.location,
                        };
                        for grandchild in &child.children {
                            match grandchild.name.as_str() {
                                "Annotation" => {
                                    if let Some(annotation) = self.read_annotation(grandchild) {
                                        parameter.annotations.push(annotation);
                                    }
                                }
                                _ => self.unexpected_element(grandchild, "Parameter"),
                            }
                        }
                        decl.parameters.push(parameter);
                    }
                }
                "ReturnType" if decl.return_type.is_none() => {
                    self.check_attributes(
                        child,
                        &["Type", "Nullable", "MaxLength", "Precision", "Scale", "Unicode", "SRID"],
                    );
                    if let Some(type_ref) = self.read_type_reference(child, "Type") {
                        decl.return_type = Some(ReturnTypeDecl {
                            type_ref,
                            location: child.location,
                        });
                    }
                }
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        decl.annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, element.name.as_str()),
            }
        }

        Some(decl)
    }

    fn read_container(&mut self, element: &XmlElement) -> Option<EntityContainerDecl> {
        self.check_attributes(element, &["Name", "Extends"]);
        let name = self.require_attribute(element, "Name")?;

        let mut decl = EntityContainerDecl {
            name,
            extends: element.attribute("Extends").map(str::to_string),
            elements: Vec::new(),
            annotations: Vec::new(),
            location: element.location,
        };

        for child in &element.children {
            match child.name.as_str() {
                "EntitySet" => {
                    self.check_attributes(
                        child,
                        &["Name", "EntityType", "IncludeInServiceDocument"],
                    );
                    let set_name = self.require_attribute(child, "Name");
                    let entity_type = self.require_attribute(child, "EntityType");
                    if let (Some(set_name), Some(entity_type)) = (set_name, entity_type) {
                        let (bindings, annotations) = self.read_set_children(child, "EntitySet");
                        decl.elements.push(ContainerElementDecl::EntitySet(EntitySetDecl {
                            name: set_name,
                            entity_type,
                            bindings,
                            annotations,
                            location: child.location,
                        }));
                    }
                }
                "Singleton" => {
                    self.check_attributes(child, &["Name", "Type"]);
                    let singleton_name = self.require_attribute(child, "Name");
                    let entity_type = self.require_attribute(child, "Type");
                    if let (Some(singleton_name), Some(entity_type)) = (singleton_name, entity_type)
                    {
                        let (bindings, annotations) = self.read_set_children(child, "Singleton");
                        decl.elements.push(ContainerElementDecl::Singleton(SingletonDecl {
                            name: singleton_name,
                            entity_type,
                            bindings,
                            annotations,
                            location: child.location,
                        }));
                    }
                }
                "ActionImport" => {
                    if let Some(import) =
                        self.read_operation_import(child, OperationKind::Action, "Action")
                    {
                        decl.elements.push(ContainerElementDecl::OperationImport(import));
                    }
                }
                "FunctionImport" => {
                    if let Some(import) =
                        self.read_operation_import(child, OperationKind::Function, "Function")
                    {
                        decl.elements.push(ContainerElementDecl::OperationImport(import));
                    }
                }
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        decl.annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, "EntityContainer"),
            }
        }

        Some(decl)
    }

    fn read_set_children(
        &mut self,
        element: &XmlElement,
        parent: &str,
    ) -> (Vec<NavigationBindingDecl>, Vec<AnnotationDecl>) {
        let mut bindings = Vec::new();
        let mut annotations = Vec::new();
        for child in &element.children {
            match child.name.as_str() {
                "NavigationPropertyBinding" => {
                    self.check_attributes(child, &["Path", "Target"]);
                    let path = self.require_attribute(child, "Path");
                    let target = self.require_attribute(child, "Target");
                    if let (Some(path), Some(target)) = (path, target) {
                        bindings.push(NavigationBindingDecl {
                            path,
                            target,
                            location: child.location,
                        });
                    }
                }
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, parent),
            }
        }
        (bindings, annotations)
    }

    fn read_operation_import(
        &mut self,
        element: &XmlElement,
        kind: OperationKind,
        operation_attribute: &str,
    ) -> Option<OperationImportDecl> {
        let allowed: &[&str] = match kind {
            OperationKind::Action => &["Name", "Action", "EntitySet"],
            OperationKind::Function => {
                &["Name", "Function", "EntitySet", "IncludeInServiceDocument"]
            }
        };
        self.check_attributes(element, allowed);
        let name = self.require_attribute(element, "Name")?;
        let operation = self.require_attribute(element, operation_attribute)?;

        let mut import = OperationImportDecl {
            name,
            kind,
            operation,
            entity_set: element.attribute("EntitySet").map(str::to_string),
            annotations: Vec::new(),
            location: element.location,
        };

        for child in &element.children {
            match child.name.as_str() {
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        import.annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, element.name.as_str()),
            }
        }

        Some(import)
    }

    fn read_annotations_block(&mut self, element: &XmlElement) -> Option<AnnotationsBlock> {
        self.check_attributes(element, &["Target", "Qualifier"]);
        let target = self.require_attribute(element, "Target")?;

        let mut block = AnnotationsBlock {
            target,
            qualifier: element.attribute("Qualifier").map(str::to_string),
            annotations: Vec::new(),
            location: element.location,
        };

        for child in &element.children {
            match child.name.as_str() {
                "Annotation" => {
                    if let Some(annotation) = self.read_annotation(child) {
                        block.annotations.push(annotation);
                    }
                }
                _ => self.unexpected_element(child, "Annotations"),
            }
        }

        Some(block)
    }

    fn read_annotation(&mut self, element: &XmlElement) -> Option<AnnotationDecl> {
        let mut allowed = vec!["Term", "Qualifier"];
        allowed.extend_from_slice(CONSTANT_ATTRIBUTES);
        self.check_attributes(element, &allowed);
        let term = self.require_attribute(element, "Term")?;

        let mut value = self.constant_from_attributes(element);

        for child in &element.children {
            if let Some(expression) = self.read_expression(child) {
                if value.is_none() {
                    value = Some(expression);
                } else {
                    self.push(
                        ErrorCode::UnexpectedElement,
                        "The annotation already has a value.".to_string(),
                        child,
                    );
                }
            }
        }

        Some(AnnotationDecl {
            term,
            qualifier: element.attribute("Qualifier").map(str::to_string),
            value,
            location: element.location,
        })
    }

    /// Constant shorthand written as an attribute (`String="..."`)
    fn constant_from_attributes(&mut self, element: &XmlElement) -> Option<Expression> {
        for name in CONSTANT_ATTRIBUTES {
            if let Some(raw) = element.attribute(name) {
                let location = element.attribute_location(name);
                let kind = match *name {
                    "String" => ExpressionKind::String(raw.to_string()),
                    "Int" => ExpressionKind::Integer(raw.to_string()),
                    "Bool" => ExpressionKind::Boolean(raw.to_string()),
                    "Float" => ExpressionKind::Float(raw.to_string()),
                    "Decimal" => ExpressionKind::Decimal(raw.to_string()),
                    "Guid" => ExpressionKind::Guid(raw.to_string()),
                    "DateTimeOffset" => ExpressionKind::DateTimeOffset(raw.to_string()),
                    "Duration" => ExpressionKind::Duration(raw.to_string()),
                    "Binary" => ExpressionKind::Binary(raw.to_string()),
                    "EnumMember" => ExpressionKind::EnumMember(raw.to_string()),
                    "Path" => ExpressionKind::Path(raw.to_string()),
                    _ => unreachable!("constant attribute list is fixed"),
                };
                return Some(Expression::new(kind, location));
            }
        }
        None
    }

    fn read_expression(&mut self, element: &XmlElement) -> Option<Expression> {
        let location = element.location;
        let kind = match element.name.as_str() {
            "String" => ExpressionKind::String(element.text.clone()),
            "Int" => ExpressionKind::Integer(element.trimmed_text().to_string()),
            "Bool" => ExpressionKind::Boolean(element.trimmed_text().to_string()),
            "Float" => ExpressionKind::Float(element.trimmed_text().to_string()),
            "Decimal" => ExpressionKind::Decimal(element.trimmed_text().to_string()),
            "Guid" => ExpressionKind::Guid(element.trimmed_text().to_string()),
            "DateTimeOffset" => {
                ExpressionKind::DateTimeOffset(element.trimmed_text().to_string())
            }
            "Duration" => ExpressionKind::Duration(element.trimmed_text().to_string()),
            "Binary" => ExpressionKind::Binary(element.trimmed_text().to_string()),
            "EnumMember" => ExpressionKind::EnumMember(element.trimmed_text().to_string()),
            "Path" => ExpressionKind::Path(element.trimmed_text().to_string()),
            "Null" => ExpressionKind::Null,
            "Record" => {
                self.check_attributes(element, &["Type"]);
                let mut properties = Vec::new();
                for child in &element.children {
                    match child.name.as_str() {
                        "PropertyValue" => {
                            if let Some(constructor) = self.read_property_value(child) {
                                properties.push(constructor);
                            }
                        }
                        _ => self.unexpected_element(child, "Record"),
                    }
                }
                ExpressionKind::Record {
                    type_name: element.attribute("Type").map(str::to_string),
                    properties,
                }
            }
            "Collection" => {
                let mut elements = Vec::new();
                for child in &element.children {
                    if let Some(expression) = self.read_expression(child) {
                        elements.push(expression);
                    }
                }
                ExpressionKind::Collection(elements)
            }
            "If" => {
                let mut parts = Vec::new();
                for child in &element.children {
                    if let Some(expression) = self.read_expression(child) {
                        parts.push(expression);
                    }
                }
                if parts.len() != 3 {
                    self.push(
                        ErrorCode::UnexpectedElement,
                        "The 'If' expression must have exactly three child expressions."
                            .to_string(),
                        element,
                    );
                    return None;
                }
                let if_false = parts.pop().expect("three parts");
                let if_true = parts.pop().expect("two parts");
                let test = parts.pop().expect("one part");
                ExpressionKind::If {
                    test: Box::new(test),
                    if_true: Box::new(if_true),
                    if_false: Box::new(if_false),
                }
            }
            "IsOf" | "Cast" => {
                self.check_attributes(element, &["Type"]);
                let type_name = self.require_attribute(element, "Type")?;
                let mut operand = None;
                for child in &element.children {
                    if let Some(expression) = self.read_expression(child) {
                        if operand.is_none() {
                            operand = Some(expression);
                        } else {
                            self.unexpected_element(child, element.name.as_str());
                        }
                    }
                }
                let Some(operand) = operand else {
                    self.push(
                        ErrorCode::UnexpectedElement,
                        format!("The '{}' expression must have an operand.", element.name),
                        element,
                    );
                    return None;
                };
                if element.name == "IsOf" {
                    ExpressionKind::IsType {
                        type_name,
                        operand: Box::new(operand),
                    }
                } else {
                    ExpressionKind::Cast {
                        type_name,
                        operand: Box::new(operand),
                    }
                }
            }
            "Apply" => {
                self.check_attributes(element, &["Function"]);
                let function = self.require_attribute(element, "Function")?;
                let mut arguments = Vec::new();
                for child in &element.children {
                    if let Some(expression) = self.read_expression(child) {
                        arguments.push(expression);
                    }
                }
                ExpressionKind::Apply {
                    function,
                    arguments,
                }
            }
            "LabeledElement" => {
                self.check_attributes(element, &["Name"]);
                let name = self.require_attribute(element, "Name")?;
                let mut inner = self.constant_from_attributes(element);
                for child in &element.children {
                    if let Some(expression) = self.read_expression(child) {
                        if inner.is_none() {
                            inner = Some(expression);
                        } else {
                            self.unexpected_element(child, "LabeledElement");
                        }
                    }
                }
                let Some(inner) = inner else {
                    self.push(
                        ErrorCode::UnexpectedElement,
                        "The 'LabeledElement' expression must have a value.".to_string(),
                        element,
                    );
                    return None;
                };
                ExpressionKind::LabeledElement {
                    name,
                    expression: Box::new(inner),
                }
            }
            "LabeledElementReference" => {
                self.check_attributes(element, &["Name"]);
                let name = self.require_attribute(element, "Name")?;
                ExpressionKind::LabeledElementReference(name)
            }
            _ => {
                self.unexpected_element(element, "expression");
                return None;
            }
        };

        Some(Expression::new(kind, location))
    }

    fn read_property_value(&mut self, element: &XmlElement) -> Option<PropertyConstructor> {
        let mut allowed = vec!["Property"];
        allowed.extend_from_slice(CONSTANT_ATTRIBUTES);
        self.check_attributes(element, &allowed);
        let name = self.require_attribute(element, "Property")?;

        let mut value = self.constant_from_attributes(element);
        for child in &element.children {
            if let Some(expression) = self.read_expression(child) {
                if value.is_none() {
                    value = Some(expression);
                } else {
                    self.unexpected_element(child, "PropertyValue");
                }
            }
        }

        let Some(value) = value else {
            self.push(
                ErrorCode::MissingAttribute,
                "The 'PropertyValue' element must supply a value.".to_string(),
                element,
            );
            return None;
        };

        Some(PropertyConstructor {
            name,
            value,
            location: element.location,
        })
    }

    /// Read the `Type`/`UnderlyingType` reference plus facets and the raw
    /// `Nullable` presence
    fn read_type_reference(
        &mut self,
        element: &XmlElement,
        attribute: &str,
    ) -> Option<TypeReferenceDecl> {
        let raw = self.require_attribute(element, attribute)?;
        let mut type_ref = TypeReferenceDecl::from_raw(&raw, element.location);
        type_ref.nullable = self.optional_bool_attribute(element, "Nullable");
        type_ref.facets = self.read_facets(element);
        Some(type_ref)
    }

    fn read_facets(&mut self, element: &XmlElement) -> FacetsDecl {
        let mut facets = FacetsDecl::default();

        if let Some(raw) = element.attribute("MaxLength") {
            facets.max_length = if raw == "max" {
                Some(MaxLengthValue::Unbounded)
            } else {
                match raw.parse::<i64>() {
                    Ok(value) if value >= 0 => Some(MaxLengthValue::Fixed(value)),
                    _ => {
                        self.errors.push(EdmError::new(
                            ErrorCode::InvalidMaxLength,
                            format!("The value '{raw}' is not a valid MaxLength."),
                            element.attribute_location("MaxLength"),
                        ));
                        None
                    }
                }
            };
        }

        if let Some(raw) = element.attribute("Precision") {
            facets.precision = match raw.parse::<i64>() {
                Ok(value) if value >= 0 => Some(value),
                _ => {
                    self.errors.push(EdmError::new(
                        ErrorCode::InvalidPrecision,
                        format!("The value '{raw}' is not a valid Precision."),
                        element.attribute_location("Precision"),
                    ));
                    None
                }
            };
        }

        if let Some(raw) = element.attribute("Scale") {
            facets.scale = if raw == "variable" {
                Some(ScaleValue::Variable)
            } else {
                match raw.parse::<i64>() {
                    Ok(value) if value >= 0 => Some(ScaleValue::Fixed(value)),
                    _ => {
                        self.errors.push(EdmError::new(
                            ErrorCode::InvalidScale,
                            format!("The value '{raw}' is not a valid Scale."),
                            element.attribute_location("Scale"),
                        ));
                        None
                    }
                }
            };
        }

        facets.unicode = self.optional_bool_attribute(element, "Unicode");

        if let Some(raw) = element.attribute("SRID") {
            facets.srid = if raw == "variable" {
                Some(SridValue::Variable)
            } else {
                match raw.parse::<i64>() {
                    Ok(value) if value >= 0 => Some(SridValue::Value(value)),
                    _ => {
                        self.errors.push(EdmError::new(
                            ErrorCode::InvalidSrid,
                            format!("The value '{raw}' is not a valid SRID."),
                            element.attribute_location("SRID"),
                        ));
                        None
                    }
                }
            };
        }

        facets
    }

    fn require_attribute(&mut self, element: &XmlElement, name: &str) -> Option<String> {
        match element.attribute(name) {
            Some(value) => Some(value.to_string()),
            None => {
                self.push(
                    ErrorCode::MissingAttribute,
                    format!(
                        "The required attribute '{name}' is missing from element '{}'.",
                        element.name
                    ),
                    element,
                );
                None
            }
        }
    }

    fn bool_attribute(&mut self, element: &XmlElement, name: &str) -> bool {
        self.optional_bool_attribute(element, name).unwrap_or(false)
    }

    fn optional_bool_attribute(&mut self, element: &XmlElement, name: &str) -> Option<bool> {
        match element.attribute(name) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                self.errors.push(EdmError::new(
                    ErrorCode::InvalidBoolean,
                    format!("The value '{other}' is not a valid boolean."),
                    element.attribute_location(name),
                ));
                None
            }
            None => None,
        }
    }

    fn check_attributes(&mut self, element: &XmlElement, allowed: &[&str]) {
        for attribute in &element.attributes {
            if attribute.name.starts_with("xmlns") {
                continue;
            }
            if !allowed.contains(&attribute.name.as_str()) {
                self.errors.push(EdmError::new(
                    ErrorCode::UnexpectedAttribute,
                    format!(
                        "The attribute '{}' is not valid on element '{}'.",
                        attribute.name, element.name
                    ),
                    attribute.location,
                ));
            }
        }
    }

    fn unexpected_element(&mut self, element: &XmlElement, parent: &str) {
        self.push(
            ErrorCode::UnexpectedElement,
            format!(
                "The element '{}' is not valid inside '{parent}'.",
                element.name
            ),
            element,
        );
    }

    fn push(&mut self, code: ErrorCode, message: String, element: &XmlElement) {
        self.errors.push(EdmError::new(code, message, element.location));
    }
}

impl Default for SchemaReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlReader;

    fn read(source: &str) -> (Option<SchemaDocument>, Vec<EdmError>) {
        let root = XmlReader::new(source).parse_document().unwrap();
        SchemaReader::new().read(&root)
    }

    #[test]
    fn test_empty_schema() {
        let (document, errors) = read(r#"<Schema Namespace="NS1"/>"#);

        let document = document.unwrap();
        assert_eq!(document.namespace, "NS1");
        assert!(document.elements.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_namespace() {
        let (document, errors) = read(r#"<Schema Alias="S"/>"#);

        assert!(document.is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::MissingAttribute);
    }

    #[test]
    fn test_dotted_alias_is_invalid_qualified_name() {
        let (document, errors) = read(r#"<Schema Namespace="NS1" Alias="A.B"/>"#);

        let document = document.unwrap();
        assert!(document.alias.is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::InvalidQualifiedName);
    }

    #[test]
    fn test_entity_type_with_key_and_properties() {
        let (document, errors) = read(
            r#"<Schema Namespace="NS1">
  <EntityType Name="Customer">
    <Key><PropertyRef Name="CustomerID"/></Key>
    <Property Name="CustomerID" Type="Edm.String" Nullable="false" MaxLength="40"/>
    <NavigationProperty Name="Pets" Type="Collection(NS1.Pet)" Partner="Owner"/>
  </EntityType>
</Schema>"#,
        );

        assert!(errors.is_empty());
        let document = document.unwrap();
        assert_eq!(document.elements.len(), 1);

        let SchemaElementDecl::EntityType(entity) = &document.elements[0] else {
            panic!("expected entity type");
        };
        assert_eq!(entity.name, "Customer");
        assert_eq!(
            entity.key.as_ref().unwrap().property_refs[0].name,
            "CustomerID"
        );
        assert_eq!(entity.properties.len(), 2);

        let PropertyDecl::Structural(id) = &entity.properties[0] else {
            panic!("expected structural property");
        };
        assert_eq!(id.type_ref.nullable, Some(false));
        assert_eq!(id.type_ref.facets.max_length, Some(MaxLengthValue::Fixed(40)));

        let PropertyDecl::Navigation(pets) = &entity.properties[1] else {
            panic!("expected navigation property");
        };
        assert!(pets.type_ref.is_collection);
        assert_eq!(pets.type_ref.type_name, "NS1.Pet");
        assert_eq!(pets.partner.as_deref(), Some("Owner"));
        assert!(pets.type_ref.nullable.is_none());
    }

    #[test]
    fn test_unexpected_element_skips_only_that_subtree() {
        let (document, errors) = read(
            r#"<Schema Namespace="NS1">
  <Widget Name="W"><Inner/></Widget>
  <EntityType Name="Customer"/>
</Schema>"#,
        );

        let document = document.unwrap();
        assert_eq!(document.elements.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::UnexpectedElement);
        assert_eq!(errors[0].location.line, 2);
    }

    #[test]
    fn test_multiple_structural_errors_surface_together() {
        let (_, errors) = read(
            r#"<Schema Namespace="NS1">
  <EntityType>
    <Property Name="P"/>
  </EntityType>
  <EnumType Name="E"><Member Name="M" Value="abc"/></EnumType>
</Schema>"#,
        );

        let codes: Vec<ErrorCode> = errors.iter().map(|e| e.code).collect();
        assert!(codes.contains(&ErrorCode::MissingAttribute));
        assert!(codes.contains(&ErrorCode::InvalidInteger));
        assert!(errors.len() >= 2);
    }

    #[test]
    fn test_unexpected_attribute() {
        let (_, errors) = read(r#"<Schema Namespace="NS1" Sneaky="yes"/>"#);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::UnexpectedAttribute);
    }

    #[test]
    fn test_annotation_constant_attribute_and_element_forms() {
        let (document, errors) = read(
            r#"<Schema Namespace="NS1">
  <Term Name="Caption" Type="Edm.String"/>
  <Annotations Target="NS1.Caption">
    <Annotation Term="NS1.Caption" String="from attribute"/>
    <Annotation Term="NS1.Caption" Qualifier="Q"><String>from element</String></Annotation>
  </Annotations>
</Schema>"#,
        );

        assert!(errors.is_empty());
        let document = document.unwrap();
        let block = &document.out_of_line[0];
        assert_eq!(block.annotations.len(), 2);

        match &block.annotations[0].value.as_ref().unwrap().kind {
            ExpressionKind::String(text) => assert_eq!(text, "from attribute"),
            other => panic!("unexpected kind {other:?}"),
        }
        match &block.annotations[1].value.as_ref().unwrap().kind {
            ExpressionKind::String(text) => assert_eq!(text, "from element"),
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(block.annotations[1].qualifier.as_deref(), Some("Q"));
    }

    #[test]
    fn test_nested_expressions() {
        let (document, errors) = read(
            r#"<Schema Namespace="NS1">
  <Term Name="T" Type="Edm.String"/>
  <Annotations Target="NS1.T">
    <Annotation Term="NS1.T">
      <If>
        <Bool>true</Bool>
        <Record Type="NS1.R"><PropertyValue Property="A" Int="1"/></Record>
        <Collection><String>x</String><Null/></Collection>
      </If>
    </Annotation>
  </Annotations>
</Schema>"#,
        );

        assert!(errors.is_empty());
        let document = document.unwrap();
        let value = document.out_of_line[0].annotations[0].value.as_ref().unwrap();
        let ExpressionKind::If {
            test,
            if_true,
            if_false,
        } = &value.kind
        else {
            panic!("expected If");
        };
        assert!(matches!(&test.kind, ExpressionKind::Boolean(b) if b == "true"));
        assert!(matches!(
            &if_true.kind,
            ExpressionKind::Record { type_name: Some(t), properties } if t == "NS1.R" && properties.len() == 1
        ));
        assert!(matches!(&if_false.kind, ExpressionKind::Collection(items) if items.len() == 2));
    }

    #[test]
    fn test_operations_and_container() {
        let (document, errors) = read(
            r#"<Schema Namespace="NS1">
  <EntityType Name="Customer"><Key><PropertyRef Name="ID"/></Key><Property Name="ID" Type="Edm.Int32" Nullable="false"/></EntityType>
  <Function Name="TopCustomer" IsComposable="true">
    <Parameter Name="count" Type="Edm.Int32"/>
    <ReturnType Type="NS1.Customer"/>
  </Function>
  <Action Name="Reset" IsBound="true">
    <Parameter Name="it" Type="NS1.Customer"/>
  </Action>
  <EntityContainer Name="C1">
    <EntitySet Name="Customers" EntityType="NS1.Customer">
      <NavigationPropertyBinding Path="Friends" Target="Customers"/>
    </EntitySet>
    <Singleton Name="Me" Type="NS1.Customer"/>
    <FunctionImport Name="TopCustomer" Function="NS1.TopCustomer" EntitySet="Customers"/>
    <ActionImport Name="Reset" Action="NS1.Reset"/>
  </EntityContainer>
</Schema>"#,
        );

        assert!(errors.is_empty());
        let document = document.unwrap();
        assert_eq!(document.elements.len(), 4);

        let SchemaElementDecl::EntityContainer(container) = &document.elements[3] else {
            panic!("expected container");
        };
        assert_eq!(container.elements.len(), 4);
        let ContainerElementDecl::EntitySet(set) = &container.elements[0] else {
            panic!("expected entity set");
        };
        assert_eq!(set.bindings.len(), 1);
        assert_eq!(set.bindings[0].path, "Friends");
    }
}
