//! Minimal XML reader for CSDL documents
//!
//! This is not a general XML library: it reads exactly the subset CSDL
//! uses (elements, attributes, character data, comments, CDATA, the five
//! named entities and numeric references) while tracking line and column
//! for every element and attribute. Namespaced element names are kept
//! verbatim.

use edm_ast::{EdmError, ErrorCode, Location};

/// An attribute with its source position
#[derive(Debug, Clone)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
    pub location: Location,
}

/// An element subtree with its source position
#[derive(Debug, Clone)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlElement>,
    /// Concatenated character data directly inside the element
    pub text: String,
    pub location: Location,
}

impl XmlElement {
    /// Attribute value by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Attribute position by name, falling back to the element position
    #[must_use]
    pub fn attribute_location(&self, name: &str) -> Location {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map_or(self.location, |a| a.location)
    }

    /// Trimmed character data
    #[must_use]
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// Byte-walking reader with line/column tracking
pub struct XmlReader<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> XmlReader<'a> {
    /// Create a reader over a source string
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            data: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Parse one document and return its root element
    ///
    /// # Errors
    ///
    /// Returns a `MalformedXml` error with the offending position when the
    /// input is not well-formed.
    pub fn parse_document(mut self) -> Result<XmlElement, EdmError> {
        // UTF-8 byte order mark
        if self.data.starts_with(&[0xEF, 0xBB, 0xBF]) {
            self.pos = 3;
        }

        loop {
            self.skip_whitespace();
            if self.starts_with(b"<?") {
                self.skip_until(b"?>")?;
            } else if self.starts_with(b"<!--") {
                self.skip_until(b"-->")?;
            } else {
                break;
            }
        }

        if !self.starts_with(b"<") {
            return Err(self.error("expected a root element"));
        }
        let root = self.parse_element()?;

        loop {
            self.skip_whitespace();
            if self.starts_with(b"<!--") {
                self.skip_until(b"-->")?;
            } else {
                break;
            }
        }
        if self.pos < self.data.len() {
            return Err(self.error("unexpected content after the root element"));
        }

        Ok(root)
    }

    fn parse_element(&mut self) -> Result<XmlElement, EdmError> {
        let location = self.location();
        self.expect(b'<')?;
        let name = self.read_name()?;

        let mut element = XmlElement {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
            location,
        };

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'/') => {
                    self.advance();
                    self.expect(b'>')?;
                    return Ok(element);
                }
                Some(b'>') => {
                    self.advance();
                    self.parse_content(&mut element)?;
                    return Ok(element);
                }
                Some(_) => {
                    let attribute = self.parse_attribute()?;
                    element.attributes.push(attribute);
                }
                None => return Err(self.error("unexpected end of input inside an element tag")),
            }
        }
    }

    fn parse_attribute(&mut self) -> Result<XmlAttribute, EdmError> {
        let location = self.location();
        let name = self.read_name()?;
        self.skip_whitespace();
        self.expect(b'=')?;
        self.skip_whitespace();

        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => {
                self.advance();
                q
            }
            _ => return Err(self.error("expected a quoted attribute value")),
        };

        let mut value = String::new();
        loop {
            match self.peek() {
                Some(b) if b == quote => {
                    self.advance();
                    break;
                }
                Some(b'&') => value.push(self.read_entity()?),
                Some(b'<') => return Err(self.error("'<' is not allowed in attribute values")),
                Some(_) => {
                    let c = self.read_char().ok_or_else(|| self.error("invalid character"))?;
                    value.push(c);
                }
                None => return Err(self.error("unterminated attribute value")),
            }
        }

        Ok(XmlAttribute {
            name,
            value,
            location,
        })
    }

    fn parse_content(&mut self, element: &mut XmlElement) -> Result<(), EdmError> {
        loop {
            match self.peek() {
                Some(b'<') => {
                    if self.starts_with(b"<!--") {
                        self.skip_until(b"-->")?;
                    } else if self.starts_with(b"<![CDATA[") {
                        self.read_cdata(element)?;
                    } else if self.starts_with(b"</") {
                        self.advance();
                        self.advance();
                        let close = self.read_name()?;
                        if close != element.name {
                            return Err(self.error(format!(
                                "mismatched closing tag '{close}' for element '{}'",
                                element.name
                            )));
                        }
                        self.skip_whitespace();
                        self.expect(b'>')?;
                        return Ok(());
                    } else {
                        let child = self.parse_element()?;
                        element.children.push(child);
                    }
                }
                Some(b'&') => {
                    let c = self.read_entity()?;
                    element.text.push(c);
                }
                Some(_) => {
                    let c = self.read_char().ok_or_else(|| self.error("invalid character"))?;
                    element.text.push(c);
                }
                None => {
                    return Err(self.error(format!(
                        "unexpected end of input inside element '{}'",
                        element.name
                    )));
                }
            }
        }
    }

    fn read_cdata(&mut self, element: &mut XmlElement) -> Result<(), EdmError> {
        for _ in 0..b"<![CDATA[".len() {
            self.advance();
        }
        loop {
            if self.starts_with(b"]]>") {
                for _ in 0..3 {
                    self.advance();
                }
                return Ok(());
            }
            match self.peek() {
                Some(_) => {
                    let c = self.read_char().ok_or_else(|| self.error("invalid character"))?;
                    element.text.push(c);
                }
                None => return Err(self.error("unterminated CDATA section")),
            }
        }
    }

    fn read_name(&mut self) -> Result<String, EdmError> {
        let mut name = String::new();
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-' | b':') {
                name.push(b as char);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error("expected a name"));
        }
        Ok(name)
    }

    fn read_entity(&mut self) -> Result<char, EdmError> {
        self.expect(b'&')?;
        let mut entity = String::new();
        loop {
            match self.peek() {
                Some(b';') => {
                    self.advance();
                    break;
                }
                Some(b) if entity.len() < 8 => {
                    entity.push(b as char);
                    self.advance();
                }
                _ => return Err(self.error("malformed entity reference")),
            }
        }

        match entity.as_str() {
            "amp" => Ok('&'),
            "lt" => Ok('<'),
            "gt" => Ok('>'),
            "quot" => Ok('"'),
            "apos" => Ok('\''),
            _ => {
                let code = entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse))
                    .and_then(std::result::Result::ok)
                    .and_then(char::from_u32);
                code.ok_or_else(|| self.error(format!("unknown entity '&{entity};'")))
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Read one character, decoding multi-byte UTF-8 sequences (the input
    /// came from a `&str`, so the bytes are valid)
    fn read_char(&mut self) -> Option<char> {
        let byte = self.peek()?;
        if byte < 0x80 {
            self.advance();
            return Some(byte as char);
        }
        let rest = std::str::from_utf8(&self.data[self.pos..]).ok()?;
        let c = rest.chars().next()?;
        self.pos += c.len_utf8();
        self.column += 1;
        Some(c)
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    fn starts_with(&self, prefix: &[u8]) -> bool {
        self.data[self.pos..].starts_with(prefix)
    }

    fn expect(&mut self, byte: u8) -> Result<(), EdmError> {
        if self.peek() == Some(byte) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", byte as char)))
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.advance();
        }
    }

    fn skip_until(&mut self, marker: &[u8]) -> Result<(), EdmError> {
        while !self.starts_with(marker) {
            if self.advance().is_none() {
                return Err(self.error("unexpected end of input"));
            }
        }
        for _ in 0..marker.len() {
            self.advance();
        }
        Ok(())
    }

    fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    fn error(&self, message: impl Into<String>) -> EdmError {
        EdmError::new(ErrorCode::MalformedXml, message.into(), self.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> XmlElement {
        XmlReader::new(source).parse_document().unwrap()
    }

    #[test]
    fn test_self_closing_root() {
        let root = parse(r#"<Schema Namespace="NS1"/>"#);

        assert_eq!(root.name, "Schema");
        assert_eq!(root.attribute("Namespace"), Some("NS1"));
        assert!(root.children.is_empty());
        assert_eq!(root.location, Location::new(1, 1));
    }

    #[test]
    fn test_nested_elements_with_positions() {
        let root = parse("<Schema Namespace=\"NS1\">\n  <EntityType Name=\"Customer\"/>\n</Schema>");

        assert_eq!(root.children.len(), 1);
        let entity = &root.children[0];
        assert_eq!(entity.name, "EntityType");
        assert_eq!(entity.location, Location::new(2, 3));
        assert_eq!(entity.attribute_location("Name").line, 2);
    }

    #[test]
    fn test_text_content_and_entities() {
        let root = parse("<String>a &amp; b &lt;c&gt; &#65;</String>");
        assert_eq!(root.trimmed_text(), "a & b <c> A");
    }

    #[test]
    fn test_attribute_entities() {
        let root = parse(r#"<Annotation String="Tom &amp; Jerry"/>"#);
        assert_eq!(root.attribute("String"), Some("Tom & Jerry"));
    }

    #[test]
    fn test_declaration_and_comments_are_skipped() {
        let root = parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- top -->\n<Schema Namespace=\"NS1\"><!-- inner --></Schema>\n<!-- after -->",
        );
        assert_eq!(root.name, "Schema");
    }

    #[test]
    fn test_cdata() {
        let root = parse("<String><![CDATA[<not parsed>]]></String>");
        assert_eq!(root.trimmed_text(), "<not parsed>");
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let error = XmlReader::new("<A><B></A></A>").parse_document().unwrap_err();
        assert_eq!(error.code, ErrorCode::MalformedXml);
        assert!(error.message.contains("mismatched"));
    }

    #[test]
    fn test_unterminated_document() {
        let error = XmlReader::new("<A><B/>").parse_document().unwrap_err();
        assert_eq!(error.code, ErrorCode::MalformedXml);
    }

    #[test]
    fn test_error_location_is_tracked() {
        let error = XmlReader::new("<A>\n  <B attr=oops/>\n</A>")
            .parse_document()
            .unwrap_err();
        assert_eq!(error.location.line, 2);
    }
}
