//! Recursive-descent JSON parser with source position tracking.

use polydoc::{Error, Map, Node, ParseInfo, ParseMark, Result, Sequence};
use std::io::Read;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;
use std::sync::Arc;

/// Parses JSON text into a document tree.
///
/// Every constructed node, container or scalar, is registered in a
/// [`ParseInfo`] under its identifier at the position of its first
/// character, so diagnostics raised later can point back into the source.
/// The info of the most recent load stays queryable until the next load.
#[derive(Debug, Default)]
pub struct JsonImport {
    parse_info: ParseInfo,
}

impl JsonImport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source positions recorded by the most recent load.
    pub fn parse_info(&self) -> &ParseInfo {
        &self.parse_info
    }

    /// Parses one complete document from an in-memory string.
    pub fn load_str(&mut self, text: &str) -> Result<Node> {
        self.load_impl(text, None)
    }

    /// Parses one complete document from a byte stream.
    pub fn load_reader<R: Read>(&mut self, mut reader: R) -> Result<Node> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(|e| Error::Import {
            message: format!("cannot read stream: {e}"),
            mark: ParseMark::invalid(),
        })?;
        self.load_impl(&text, None)
    }

    /// Parses one complete document from a named file. The filename is
    /// threaded into every resulting mark.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Node> {
        let filename: Arc<str> = Arc::from(path.as_ref().to_string_lossy().as_ref());
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Import {
            message: format!("cannot open file: {e}"),
            mark: ParseMark::with_filename(Some(filename.clone()), -1, -1),
        })?;
        self.load_impl(&text, Some(filename))
    }

    fn load_impl(&mut self, text: &str, filename: Option<Arc<str>>) -> Result<Node> {
        self.parse_info.clear();
        let mut parser = Parser {
            chars: text.chars().peekable(),
            filename,
            line: 1,
            column: 1,
            parse_info: &mut self.parse_info,
        };
        parser.skip_ws();
        if parser.peek()? != '{' {
            return Err(parser.error("not a JSON object"));
        }
        parser.load_map()
    }
}

/// Parser state for a single document: a forward-only cursor plus the
/// running line/column position (both 1-based).
struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    filename: Option<Arc<str>>,
    line: i32,
    column: i32,
    parse_info: &'a mut ParseInfo,
}

impl Parser<'_> {
    fn mark(&self) -> ParseMark {
        ParseMark::with_filename(self.filename.clone(), self.line, self.column)
    }

    fn error(&self, message: &str) -> Error {
        Error::Import {
            message: message.to_string(),
            mark: self.mark(),
        }
    }

    fn syntax_error(&self) -> Error {
        self.error("JSON syntax error")
    }

    fn register(&mut self, node: &Node, mark: ParseMark) {
        self.parse_info.insert(node.id(), mark);
    }

    fn peek(&mut self) -> Result<char> {
        match self.chars.peek() {
            Some(&c) => Ok(c),
            None => Err(self.error("unexpected document end")),
        }
    }

    fn read(&mut self) -> Result<char> {
        let Some(c) = self.chars.next() else {
            return Err(self.error("unexpected document end"));
        };
        self.column += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        }
        Ok(c)
    }

    /// Leaves the cursor at the next significant character. Safe at end of
    /// input, since every production calls this before handing back control.
    fn skip_ws(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if !matches!(c, ' ' | '\t' | '\n' | '\r') {
                return;
            }
            let _ = self.read();
        }
    }

    fn load_value(&mut self) -> Result<Node> {
        match self.peek()? {
            '"' => self.load_string(),
            '[' => self.load_sequence(),
            '{' => self.load_map(),
            't' => self.load_keyword("true", Node::from(true)),
            'f' => self.load_keyword("false", Node::from(false)),
            'n' => self.load_keyword("null", Node::null()),
            '-' | '0'..='9' => self.load_number(),
            _ => Err(self.syntax_error()),
        }
    }

    /// Reads a literal keyword unconditionally, character by character.
    fn load_keyword(&mut self, keyword: &str, node: Node) -> Result<Node> {
        let mark = self.mark();
        for expected in keyword.chars() {
            if self.read()? != expected {
                return Err(self.syntax_error());
            }
        }
        self.skip_ws();
        self.register(&node, mark);
        Ok(node)
    }

    fn load_number(&mut self) -> Result<Node> {
        let mark = self.mark();

        let mut is_negative = false;
        let mut has_fraction = false;
        let mut has_exponent = false;

        // accumulated unsigned so i64::MIN survives the negation at the end
        let mut integer: u64 = 0;
        let mut literal = String::new();

        let mut c = self.read()?;
        literal.push(c);

        if c == '-' {
            is_negative = true;
            c = self.read()?;
            literal.push(c);
        }

        // integer part; a leading zero must stand alone
        if c == '0' {
            c = self.peek()?;
        } else if c.is_ascii_digit() {
            integer = u64::from(c as u8 - b'0');
            loop {
                c = self.peek()?;
                if !c.is_ascii_digit() {
                    break;
                }
                integer = integer
                    .wrapping_mul(10)
                    .wrapping_add(u64::from(c as u8 - b'0'));
                self.read()?;
                literal.push(c);
            }
        } else {
            return Err(self.syntax_error());
        }

        if c == '.' {
            has_fraction = true;
            self.read()?;
            literal.push(c);
            loop {
                c = self.peek()?;
                if !c.is_ascii_digit() {
                    break;
                }
                self.read()?;
                literal.push(c);
            }
        }

        if c == 'e' || c == 'E' {
            has_exponent = true;
            self.read()?;
            literal.push(c);

            c = self.read()?;
            literal.push(c);
            if c == '+' || c == '-' {
                c = self.read()?;
                literal.push(c);
            }
            if !c.is_ascii_digit() {
                return Err(self.syntax_error());
            }
            loop {
                c = self.peek()?;
                if !c.is_ascii_digit() {
                    break;
                }
                self.read()?;
                literal.push(c);
            }
        }

        self.skip_ws();

        let node = if has_fraction || has_exponent {
            let value: f64 = literal.parse().map_err(|_| self.syntax_error())?;
            Node::from(value)
        } else if is_negative {
            Node::from(integer.wrapping_neg() as i64)
        } else {
            Node::try_from(integer)?
        };
        self.register(&node, mark);
        Ok(node)
    }

    fn load_string(&mut self) -> Result<Node> {
        let mark = self.mark();
        let node = Node::from(self.parse_string()?);
        self.register(&node, mark);
        Ok(node)
    }

    fn load_sequence(&mut self) -> Result<Node> {
        let mark = self.mark();
        let mut seq = Sequence::new();

        self.read()?; // '['
        self.skip_ws();

        if self.peek()? != ']' {
            loop {
                seq.push(self.load_value()?);
                match self.peek()? {
                    ']' => break,
                    ',' => {
                        self.read()?;
                        self.skip_ws();
                    }
                    _ => return Err(self.syntax_error()),
                }
            }
        }

        self.read()?; // ']'
        self.skip_ws();

        let node = Node::from(seq);
        self.register(&node, mark);
        Ok(node)
    }

    fn load_map(&mut self) -> Result<Node> {
        let mark = self.mark();
        let mut entries: Vec<(String, Node)> = Vec::new();

        self.read()?; // '{'
        self.skip_ws();

        if self.peek()? != '}' {
            loop {
                let key = self.parse_string()?;
                if self.read()? != ':' {
                    return Err(self.syntax_error());
                }
                self.skip_ws();
                entries.push((key, self.load_value()?));
                match self.peek()? {
                    '}' => break,
                    ',' => {
                        self.read()?;
                        self.skip_ws();
                    }
                    _ => return Err(self.syntax_error()),
                }
            }
        }

        self.read()?; // '}'
        self.skip_ws();

        let node = Node::from(Map::from_entries(entries)?);
        self.register(&node, mark);
        Ok(node)
    }

    fn parse_string(&mut self) -> Result<String> {
        if self.peek()? != '"' {
            return Err(self.syntax_error());
        }
        self.read()?;

        let mut text = String::new();
        loop {
            let c = self.read()?;
            match c {
                '"' => break,
                '\\' => match self.read()? {
                    '"' => text.push('"'),
                    '\\' => text.push('\\'),
                    '/' => text.push('/'),
                    'b' => text.push('\u{8}'),
                    'f' => text.push('\u{c}'),
                    'n' => text.push('\n'),
                    'r' => text.push('\r'),
                    't' => text.push('\t'),
                    'u' => text.push(self.parse_unicode_escape()?),
                    _ => return Err(self.syntax_error()),
                },
                c => text.push(c),
            }
        }
        self.skip_ws();
        Ok(text)
    }

    /// `\uXXXX`, basic multilingual plane only; no surrogate pair
    /// combination (a lone surrogate half is rejected).
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let mut code_point: u32 = 0;
        for _ in 0..4 {
            let c = self.read()?;
            let digit = c
                .to_digit(16)
                .ok_or_else(|| self.error("invalid unicode escape"))?;
            code_point = (code_point << 4) | digit;
        }
        char::from_u32(code_point).ok_or_else(|| self.error("invalid unicode escape"))
    }
}
