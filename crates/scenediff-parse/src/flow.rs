//! Flow collections (`{a: 1}`, `[x, y]`) and quoted scalars.

use scenediff_types::{insert_entry, TreeNode};

use crate::error::{ParseError, ParseResult};

/// Parse a complete flow value. `line` is only used for diagnostics.
pub fn parse_flow(text: &str, line: usize) -> ParseResult<TreeNode> {
    let mut parser = FlowParser { text, pos: 0, line };
    let node = parser.parse_node(false)?;
    parser.skip_ws();
    if parser.pos < text.len() {
        return Err(parser.error(format!(
            "trailing content {:?}",
            &text[parser.pos..]
        )));
    }
    Ok(node)
}

/// Returns `true` once every `{`/`[` opened outside quotes has been closed.
pub fn flow_is_balanced(text: &str) -> bool {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match quote {
            Some('"') => match c {
                '\\' => {
                    chars.next();
                }
                '"' => quote = None,
                _ => {}
            },
            Some(_) => {
                if c == '\'' {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            None => match c {
                '{' | '[' => depth += 1,
                '}' | ']' => depth -= 1,
                '"' | '\'' => quote = Some(c),
                _ => {}
            },
        }
    }
    depth <= 0 && quote.is_none()
}

/// Returns `true` if a scalar starting with a quote has its closing quote.
pub fn quote_is_closed(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(open) = chars.next() else {
        return true;
    };
    let mut chars = chars.peekable();
    while let Some(c) = chars.next() {
        if open == '"' && c == '\\' {
            chars.next();
        } else if c == open {
            if open == '\'' && chars.peek() == Some(&'\'') {
                chars.next();
            } else {
                return true;
            }
        }
    }
    false
}

struct FlowParser<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> FlowParser<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn error(&self, message: String) -> ParseError {
        ParseError::Flow {
            line: self.line,
            message,
        }
    }

    fn expect(&mut self, expected: char) -> ParseResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected {expected:?}, found {c:?}"))),
            None => Err(ParseError::UnterminatedFlow { line: self.line }),
        }
    }

    fn parse_node(&mut self, in_flow: bool) -> ParseResult<TreeNode> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.parse_mapping(),
            Some('[') => self.parse_sequence(),
            Some('"') => self.parse_double_quoted().map(TreeNode::Scalar),
            Some('\'') => self.parse_single_quoted().map(TreeNode::Scalar),
            _ => Ok(TreeNode::Scalar(self.parse_plain(in_flow, false))),
        }
    }

    fn parse_mapping(&mut self) -> ParseResult<TreeNode> {
        self.expect('{')?;
        let mut entries = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('}') => {
                    self.bump();
                    break;
                }
                None => return Err(ParseError::UnterminatedFlow { line: self.line }),
                _ => {}
            }

            let key = match self.peek() {
                Some('"') => self.parse_double_quoted()?,
                Some('\'') => self.parse_single_quoted()?,
                _ => self.parse_plain(true, true),
            };
            self.skip_ws();
            let value = if self.peek() == Some(':') {
                self.bump();
                self.skip_ws();
                match self.peek() {
                    Some(',') | Some('}') => TreeNode::Scalar(String::new()),
                    _ => self.parse_node(true)?,
                }
            } else {
                // `{a, b}` shorthand: keys with empty values.
                TreeNode::Scalar(String::new())
            };
            insert_entry(&mut entries, key, value);

            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => break,
                Some(c) => return Err(self.error(format!("expected ',' or '}}', found {c:?}"))),
                None => return Err(ParseError::UnterminatedFlow { line: self.line }),
            }
        }
        Ok(TreeNode::Mapping(entries))
    }

    fn parse_sequence(&mut self) -> ParseResult<TreeNode> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(']') => {
                    self.bump();
                    break;
                }
                None => return Err(ParseError::UnterminatedFlow { line: self.line }),
                _ => {}
            }
            items.push(self.parse_node(true)?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(']') => break,
                Some(c) => return Err(self.error(format!("expected ',' or ']', found {c:?}"))),
                None => return Err(ParseError::UnterminatedFlow { line: self.line }),
            }
        }
        Ok(TreeNode::Sequence(items))
    }

    /// Plain scalar. Inside flow collections it stops at `,`, `}` and `]`;
    /// as a key it also stops at `:`.
    fn parse_plain(&mut self, in_flow: bool, as_key: bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if in_flow && matches!(c, ',' | '}' | ']') {
                break;
            }
            if as_key && c == ':' {
                break;
            }
            self.bump();
        }
        self.text[start..self.pos].trim().to_string()
    }

    fn parse_single_quoted(&mut self) -> ParseResult<String> {
        self.expect('\'')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.bump();
                        out.push('\'');
                    } else {
                        return Ok(out);
                    }
                }
                Some(c) => out.push(c),
                None => return Err(ParseError::UnterminatedQuote { line: self.line }),
            }
        }
    }

    fn parse_double_quoted(&mut self) -> ParseResult<String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or(ParseError::UnterminatedQuote { line: self.line })?;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        ' ' => out.push(' '),
                        'x' => out.push(self.parse_hex_escape(2)?),
                        'u' => out.push(self.parse_hex_escape(4)?),
                        'U' => out.push(self.parse_hex_escape(8)?),
                        other => out.push(other),
                    }
                }
                Some(c) => out.push(c),
                None => return Err(ParseError::UnterminatedQuote { line: self.line }),
            }
        }
    }

    fn parse_hex_escape(&mut self, digits: usize) -> ParseResult<char> {
        let end = self.pos + digits;
        let hex = self
            .text
            .get(self.pos..end)
            .ok_or(ParseError::UnterminatedQuote { line: self.line })?;
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| self.error(format!("invalid escape \\{hex}")))?;
        self.pos = end;
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}
