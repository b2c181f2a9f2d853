//! Minimal XML reader for scene files.
//!
//! Covers the subset scene descriptions use: nested elements, quoted
//! attributes, text content, comments, and a leading declaration. No
//! namespaces, CDATA, or entity references.

use thiserror::Error;

/// Errors that can occur while reading scene XML.
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unexpected end of input")]
    UnexpectedEof,
}

/// Result type for XML reading.
pub type XmlResult<T> = Result<T, XmlError>;

/// An element with its attributes, child elements, and text content.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parse an XML document and return its root element.
pub fn parse(input: &str) -> XmlResult<Element> {
    let mut reader = Reader::new(input);
    reader.skip_misc()?;
    reader.parse_element()
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
        }
        Some(byte)
    }

    fn advance(&mut self, count: usize) {
        for _ in 0..count {
            self.bump();
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.bytes[self.pos..].starts_with(prefix.as_bytes())
    }

    fn error(&self, message: impl Into<String>) -> XmlError {
        XmlError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(byte) if byte.is_ascii_whitespace()) {
            self.bump();
        }
    }

    /// Consume until `terminator`, inclusive.
    fn skip_until(&mut self, terminator: &str) -> XmlResult<()> {
        while !self.starts_with(terminator) {
            if self.bump().is_none() {
                return Err(XmlError::UnexpectedEof);
            }
        }
        self.advance(terminator.len());
        Ok(())
    }

    /// Skip whitespace, comments, and `<?...?>` / `<!...>` prologue.
    fn skip_misc(&mut self) -> XmlResult<()> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<!--") {
                self.advance(4);
                self.skip_until("-->")?;
            } else if self.starts_with("<?") {
                self.advance(2);
                self.skip_until("?>")?;
            } else if self.starts_with("<!") {
                self.advance(2);
                self.skip_until(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn read_name(&mut self) -> XmlResult<String> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(byte) if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b'.' | b':')
        ) {
            self.bump();
        }
        if start == self.pos {
            return Err(self.error("expected a name"));
        }
        Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    fn parse_element(&mut self) -> XmlResult<Element> {
        if self.bump() != Some(b'<') {
            return Err(self.error("expected '<'"));
        }
        let name = self.read_name()?;
        let mut element = Element {
            name,
            ..Default::default()
        };

        // Attribute list up to '>' or '/>'
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'>') => {
                    self.bump();
                    break;
                }
                Some(b'/') => {
                    self.bump();
                    if self.bump() != Some(b'>') {
                        return Err(self.error("malformed self-closing tag"));
                    }
                    return Ok(element);
                }
                Some(_) => {
                    let key = self.read_name()?;
                    self.skip_whitespace();
                    if self.bump() != Some(b'=') {
                        return Err(self.error(format!("expected '=' after attribute '{key}'")));
                    }
                    self.skip_whitespace();
                    let quote = match self.bump() {
                        Some(quote @ (b'"' | b'\'')) => quote,
                        _ => return Err(self.error("expected quoted attribute value")),
                    };
                    let start = self.pos;
                    while self.peek() != Some(quote) {
                        if self.bump().is_none() {
                            return Err(XmlError::UnexpectedEof);
                        }
                    }
                    let value = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
                    self.bump();
                    element.attributes.push((key, value));
                }
                None => return Err(XmlError::UnexpectedEof),
            }
        }

        // Content: text and child elements until the matching close tag
        loop {
            if self.starts_with("<!--") {
                self.advance(4);
                self.skip_until("-->")?;
            } else if self.starts_with("</") {
                self.advance(2);
                let close = self.read_name()?;
                if close != element.name {
                    return Err(
                        self.error(format!("closing </{close}> does not match <{}>", element.name))
                    );
                }
                self.skip_whitespace();
                if self.bump() != Some(b'>') {
                    return Err(self.error("malformed closing tag"));
                }
                return Ok(element);
            } else if self.peek() == Some(b'<') {
                element.children.push(self.parse_element()?);
            } else {
                let start = self.pos;
                while !matches!(self.peek(), Some(b'<') | None) {
                    self.bump();
                }
                if self.peek().is_none() {
                    return Err(XmlError::UnexpectedEof);
                }
                element
                    .text
                    .push_str(&String::from_utf8_lossy(&self.bytes[start..self.pos]));
            }
        }
    }
}
