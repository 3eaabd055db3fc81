//! Permissive block grammar for record bodies.
//!
//! Supports indentation-based mappings and sequences, sequences placed at
//! the same indentation as their parent key, `- key: value` items, wrapped
//! plain scalars, and flow/quoted values that continue across lines.
//! Duplicate keys keep their first position and take the last value.

use scenediff_types::{insert_entry, TreeNode};

use crate::error::{ParseError, ParseResult};
use crate::flow::{flow_is_balanced, parse_flow, quote_is_closed};

/// Parse a record body into a tree.
pub fn parse_body(text: &str) -> ParseResult<TreeNode> {
    let mut parser = BlockParser::new(text);
    parser.skip_blank();
    if parser.at_end() {
        return Err(ParseError::EmptyBody);
    }
    let root = parser.parse_block()?;
    parser.skip_blank();
    if let Some(line) = parser.current() {
        return Err(ParseError::UnexpectedIndent { line: line.number });
    }
    Ok(root)
}

#[derive(Clone, Debug)]
struct Line {
    /// 1-based line number within the body.
    number: usize,
    indent: usize,
    /// Content without indentation or trailing whitespace; empty for blank
    /// and comment lines.
    text: String,
}

impl Line {
    fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    fn is_sequence_item(&self) -> bool {
        is_sequence_item(&self.text)
    }
}

fn is_sequence_item(text: &str) -> bool {
    text == "-" || text.starts_with("- ")
}

/// Split `key: value` / `key:`. Flow and quoted scalars are never keys.
fn split_key(text: &str) -> Option<(String, &str)> {
    let first = text.chars().next()?;
    if matches!(first, '{' | '[') {
        return None;
    }
    if matches!(first, '"' | '\'') {
        let close = text[1..].find(first)? + 1;
        let rest = text[close + 1..].trim_start();
        let value = rest.strip_prefix(':')?;
        if !(value.is_empty() || value.starts_with(' ')) {
            return None;
        }
        return Some((text[1..close].to_string(), value.trim()));
    }
    let colon = match text.find(": ") {
        Some(i) => i,
        None if text.ends_with(':') => text.len() - 1,
        None => return None,
    };
    let key = text[..colon].trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), text[colon + 1..].trim()))
}

struct BlockParser {
    lines: Vec<Line>,
    pos: usize,
}

impl BlockParser {
    fn new(text: &str) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, raw)| {
                let trimmed = raw.trim_end();
                let content = trimmed.trim_start_matches([' ', '\t']);
                let indent = trimmed.len() - content.len();
                let text = if content.starts_with('#') {
                    String::new()
                } else {
                    content.to_string()
                };
                Line {
                    number: i + 1,
                    indent,
                    text,
                }
            })
            .collect();
        Self { lines, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// Current non-consumed line, if any.
    fn current(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    /// Indentation and sequence-item flag of the current line.
    fn peek_shape(&self) -> Option<(usize, bool)> {
        self.current().map(|l| (l.indent, l.is_sequence_item()))
    }

    fn skip_blank(&mut self) {
        while self.current().is_some_and(Line::is_blank) {
            self.pos += 1;
        }
    }

    /// Parse the block starting at the current (non-blank) line.
    fn parse_block(&mut self) -> ParseResult<TreeNode> {
        let Some(line) = self.current() else {
            return Ok(TreeNode::Scalar(String::new()));
        };
        let indent = line.indent;
        if line.is_sequence_item() {
            self.parse_sequence(indent)
        } else {
            self.parse_mapping(indent)
        }
    }

    fn parse_mapping(&mut self, indent: usize) -> ParseResult<TreeNode> {
        let mut entries = Vec::new();
        loop {
            self.skip_blank();
            let Some(line) = self.current().cloned() else {
                break;
            };
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(ParseError::UnexpectedIndent { line: line.number });
            }
            let Some((key, rest)) = split_key(&line.text) else {
                return Err(ParseError::ExpectedKey {
                    line: line.number,
                    text: line.text.clone(),
                });
            };
            self.pos += 1;
            let value = self.parse_value(rest, indent, line.number)?;
            insert_entry(&mut entries, key, value);
        }
        Ok(TreeNode::Mapping(entries))
    }

    /// Value of a `key:` entry whose key sits at `indent`.
    fn parse_value(&mut self, rest: &str, indent: usize, number: usize) -> ParseResult<TreeNode> {
        if !rest.is_empty() {
            return self.parse_inline(rest, indent, number);
        }
        self.skip_blank();
        match self.peek_shape() {
            Some((next, _)) if next > indent => self.parse_block(),
            Some((next, true)) if next == indent => self.parse_sequence(indent),
            _ => Ok(TreeNode::Scalar(String::new())),
        }
    }

    fn parse_sequence(&mut self, indent: usize) -> ParseResult<TreeNode> {
        let mut items = Vec::new();
        loop {
            self.skip_blank();
            let Some(line) = self.current().cloned() else {
                break;
            };
            if line.indent > indent {
                return Err(ParseError::UnexpectedIndent { line: line.number });
            }
            if line.indent < indent || !line.is_sequence_item() {
                break;
            }

            let rest = line.text[1..].trim_start();
            let column = indent + (line.text.len() - rest.len());

            let item = if rest.is_empty() {
                self.pos += 1;
                self.skip_blank();
                match self.peek_shape() {
                    Some((next, _)) if next > indent => self.parse_block()?,
                    _ => TreeNode::Scalar(String::new()),
                }
            } else if is_sequence_item(rest) || split_key(rest).is_some() {
                // `- - x` or `- key: value`: re-read the item content as a
                // block starting at its own column.
                self.lines[self.pos] = Line {
                    number: line.number,
                    indent: column,
                    text: rest.to_string(),
                };
                self.parse_block()?
            } else {
                self.pos += 1;
                self.parse_inline(rest, indent, line.number)?
            };
            items.push(item);
        }
        Ok(TreeNode::Sequence(items))
    }

    /// A value written on the same line as its key or dash. Flow and quoted
    /// values may continue on following lines; plain scalars continue on
    /// lines indented deeper than `indent`.
    fn parse_inline(&mut self, rest: &str, indent: usize, number: usize) -> ParseResult<TreeNode> {
        match rest.chars().next() {
            Some('{') | Some('[') => {
                let mut text = rest.to_string();
                while !flow_is_balanced(&text) {
                    let next = self
                        .take_continuation(indent, true)
                        .ok_or(ParseError::UnterminatedFlow { line: number })?;
                    text.push(' ');
                    text.push_str(&next);
                }
                parse_flow(&text, number)
            }
            Some('"') | Some('\'') => {
                let mut text = rest.to_string();
                while !quote_is_closed(&text) {
                    self.skip_blank_into(&mut text);
                    let next = self
                        .take_continuation(indent, true)
                        .ok_or(ParseError::UnterminatedQuote { line: number })?;
                    join_quoted_line(&mut text, &next);
                }
                parse_flow(&text, number)
            }
            _ => {
                let mut text = rest.to_string();
                while let Some((blanks, next)) = self.take_plain_continuation(indent) {
                    match blanks {
                        0 => text.push(' '),
                        n => text.extend(std::iter::repeat('\n').take(n)),
                    }
                    text.push_str(&next);
                }
                Ok(TreeNode::Scalar(text))
            }
        }
    }

    /// Consume the next line if it is non-blank and indented deeper than
    /// `indent`. Plain scalars never continue into a `key:` line.
    fn take_continuation(&mut self, indent: usize, allow_keys: bool) -> Option<String> {
        let line = self.current()?;
        if line.is_blank() || line.indent <= indent {
            return None;
        }
        if !allow_keys && (line.is_sequence_item() || split_key(&line.text).is_some()) {
            return None;
        }
        let text = line.text.clone();
        self.pos += 1;
        Some(text)
    }

    /// Next continuation of a plain scalar, with the number of blank lines
    /// skipped to reach it. Blank lines are consumed only when a
    /// continuation follows them.
    fn take_plain_continuation(&mut self, indent: usize) -> Option<(usize, String)> {
        let blanks = self.lines[self.pos..]
            .iter()
            .take_while(|line| line.is_blank())
            .count();
        let start = self.pos;
        self.pos += blanks;
        match self.take_continuation(indent, false) {
            Some(next) => Some((blanks, next)),
            None => {
                self.pos = start;
                None
            }
        }
    }

    /// Blank lines inside a quoted scalar fold to newlines.
    fn skip_blank_into(&mut self, text: &mut String) {
        while self.current().is_some_and(|l| l.text.is_empty()) {
            text.push('\n');
            self.pos += 1;
        }
    }
}

fn join_quoted_line(text: &mut String, next: &str) {
    let trailing_backslashes = text.chars().rev().take_while(|c| *c == '\\').count();
    if trailing_backslashes % 2 == 1 {
        // Escaped line break: join without a separator.
        text.pop();
    } else if !text.ends_with('\n') {
        text.push(' ');
    }
    text.push_str(next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenediff_types::FileId;

    fn scalar<'a>(node: &'a TreeNode, path: &str) -> Option<&'a str> {
        node.get_path(path).and_then(TreeNode::as_scalar)
    }

    const GAME_OBJECT: &str = "\
GameObject:
  m_ObjectHideFlags: 0
  serializedVersion: 6
  m_Component:
  - component: {fileID: 11}
  - component: {fileID: 12}
  m_Layer: 0
  m_Name: Player
  m_IsActive: 1
";

    #[test]
    fn game_object_body() {
        let tree = parse_body(GAME_OBJECT).unwrap();
        let body = tree.get("GameObject").unwrap();
        assert_eq!(scalar(body, "m_Name"), Some("Player"));
        assert_eq!(scalar(body, "m_IsActive"), Some("1"));
        let components = body.get("m_Component").and_then(TreeNode::as_sequence).unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(
            components[1].get("component").and_then(TreeNode::file_id),
            Some(FileId::new(12))
        );
    }

    #[test]
    fn historical_component_entries() {
        let text = "GameObject:\n  m_Component:\n  - 4: {fileID: 11}\n  - 114: {fileID: 12}\n  m_Name: Old\n";
        let tree = parse_body(text).unwrap();
        let components = tree
            .get_path("GameObject.m_Component")
            .and_then(TreeNode::as_sequence)
            .unwrap();
        assert_eq!(components[0].get("4").and_then(TreeNode::file_id), Some(FileId::new(11)));
    }

    #[test]
    fn nested_mapping_items_and_deeper_sequences() {
        let text = "\
PrefabInstance:
  m_Modification:
    m_TransformParent: {fileID: 0}
    m_Modifications:
    - target: {fileID: 400000, guid: abc,
        type: 3}
      propertyPath: m_LocalPosition.x
      value: 1.5
      objectReference: {fileID: 0}
    - target: {fileID: 100000, guid: abc, type: 3}
      propertyPath: m_Name
      value: Door
      objectReference: {fileID: 0}
    m_RemovedComponents: []
";
        let tree = parse_body(text).unwrap();
        let mods = tree
            .get_path("PrefabInstance.m_Modification.m_Modifications")
            .and_then(TreeNode::as_sequence)
            .unwrap();
        assert_eq!(mods.len(), 2);
        assert_eq!(mods[0].get_path("target.type").and_then(TreeNode::as_scalar), Some("3"));
        assert_eq!(scalar(&mods[1], "value"), Some("Door"));
        assert_eq!(
            tree.get_path("PrefabInstance.m_Modification.m_RemovedComponents"),
            Some(&TreeNode::Sequence(vec![]))
        );
    }

    #[test]
    fn wrapped_plain_and_quoted_scalars() {
        let text = "\
MonoBehaviour:
  m_Text: a long line
    that wraps
  quoted: \"first\\
    second\"
  single: 'it''s
    wrapped'
  empty:
  after: 1
";
        let tree = parse_body(text).unwrap();
        let body = tree.get("MonoBehaviour").unwrap();
        assert_eq!(scalar(body, "m_Text"), Some("a long line that wraps"));
        assert_eq!(scalar(body, "quoted"), Some("firstsecond"));
        assert_eq!(scalar(body, "single"), Some("it's wrapped"));
        assert_eq!(scalar(body, "empty"), Some(""));
        assert_eq!(scalar(body, "after"), Some("1"));
    }

    #[test]
    fn blank_lines_inside_plain_scalars_fold_to_newlines() {
        let text = "\
MonoBehaviour:
  m_Text: first paragraph
    continues

    second paragraph


    third
  after: 1

  last: 2
";
        let tree = parse_body(text).unwrap();
        let body = tree.get("MonoBehaviour").unwrap();
        assert_eq!(
            scalar(body, "m_Text"),
            Some("first paragraph continues\nsecond paragraph\n\nthird")
        );
        assert_eq!(scalar(body, "after"), Some("1"));
        assert_eq!(scalar(body, "last"), Some("2"));
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let tree = parse_body("A:\n  x: 1\n  y: 2\n  x: 3\n").unwrap();
        let body = tree.get("A").unwrap();
        assert_eq!(body.as_mapping().unwrap().len(), 2);
        assert_eq!(scalar(body, "x"), Some("3"));
    }

    #[test]
    fn scalar_and_nested_sequence_items() {
        let text = "A:\n  list:\n    - one\n    - - inner\n      - inner2\n    -\n      k: v\n";
        let tree = parse_body(text).unwrap();
        let list = tree.get_path("A.list").and_then(TreeNode::as_sequence).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], TreeNode::scalar("one"));
        assert_eq!(list[1].as_sequence().map(<[TreeNode]>::len), Some(2));
        assert_eq!(scalar(&list[2], "k"), Some("v"));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let tree = parse_body("A:\n\n  # note\n  x: 1\n\n").unwrap();
        assert_eq!(scalar(&tree, "A.x"), Some("1"));
    }

    #[test]
    fn malformed_bodies_fail() {
        assert_eq!(parse_body("   \n"), Err(ParseError::EmptyBody));
        assert!(matches!(
            parse_body("A:\n  x: 1\n      y: 2\n"),
            Err(ParseError::UnexpectedIndent { line: 3 })
        ));
        assert!(matches!(
            parse_body("A:\n  just text\n"),
            Err(ParseError::ExpectedKey { line: 2, .. })
        ));
        assert!(matches!(
            parse_body("A:\n  r: {fileID: 1\n"),
            Err(ParseError::UnterminatedFlow { line: 2 })
        ));
    }
}
