//! repeated mapping key detection
//!
//! A line-tracked recursive-descent parse of the two-space-indented mapping
//! syntax. Every mapping key is recorded with the 1-based line its token
//! starts on; a key seen more than once is reported with every line it
//! occurs on, first occurrence included.
//!
//! Key tracking is document-wide, not per mapping scope: a key name reused
//! in two different nested mappings anywhere in the document is still
//! reported. This catches copy-paste duplication across scopes and matches
//! the behavior downstream tooling expects.
use crate::report::Error;
use indexmap::IndexMap;

/// key name -> every line it occurs on, for keys occurring at least twice
pub type DuplicateKeys = IndexMap<String, Vec<usize>>;

/// Parse `text` and collect repeated mapping keys
///
/// Returns an empty mapping when no key repeats.
pub fn check(text: &str) -> Result<DuplicateKeys, ParseError> {
    let mut parser = Parser {
        lines: tokenize(text)?,
        pos: 0,
        seen: Default::default(),
        duplicates: Default::default(),
    };

    while let Some(line) = parser.peek() {
        parser.parse_value(line.indent)?;
    }

    Ok(parser.duplicates)
}

/// [check] wrapped for reporting
///
/// One error per recorded line; an unparseable document becomes a single
/// document-level error.
pub fn errors(text: &str) -> Vec<Error> {
    match check(text) {
        Ok(duplicates) => duplicates
            .iter()
            .flat_map(|(key, lines)| {
                lines.iter().map(move |line| {
                    Error::new(Some(*line), format!("Variable {key} occurs more than once"))
                })
            })
            .collect(),
        Err(error) => vec![Error::new(None, format!("Unable to parse document: {error}"))],
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("tab character in indentation at line {line}")]
    TabIndent { line: usize },
    #[error("expected a key/value mapping entry at line {line}")]
    ExpectedKey { line: usize },
    #[error("indentation does not match any open block at line {line}")]
    UnexpectedIndent { line: usize },
}

/// One non-blank, non-comment source line
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    indent: usize,
    content: &'a str,
}

fn tokenize(text: &str) -> Result<Vec<Line>, ParseError> {
    let mut lines = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let indent = raw.len() - raw.trim_start_matches(' ').len();
        let content = raw[indent..].trim_end();

        if content.starts_with('\t') {
            return Err(ParseError::TabIndent { line: number });
        }
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        // document markers carry no structure
        if content == "---" || content == "..." {
            continue;
        }

        lines.push(Line {
            number,
            indent,
            content,
        });
    }

    Ok(lines)
}

struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
    /// line of the most recent occurrence per key, document-wide
    seen: IndexMap<String, usize>,
    duplicates: DuplicateKeys,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn parse_value(&mut self, indent: usize) -> Result<(), ParseError> {
        let Some(line) = self.peek() else {
            return Ok(());
        };

        if is_sequence_item(line.content) {
            self.parse_sequence(indent)
        } else if split_key(line.content).is_some() {
            self.parse_mapping(indent)
        } else {
            self.parse_scalar(indent)
        }
    }

    fn parse_mapping(&mut self, indent: usize) -> Result<(), ParseError> {
        while let Some(line) = self.peek() {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(ParseError::UnexpectedIndent { line: line.number });
            }
            if is_sequence_item(line.content) {
                break;
            }

            let Some((key, value)) = split_key(line.content) else {
                return Err(ParseError::ExpectedKey { line: line.number });
            };
            self.record(key, line.number);
            self.advance();

            if is_block_scalar(value) {
                // verbatim body, anything deeper is opaque
                self.skip_deeper(indent);
            } else if value.is_empty() {
                match self.peek() {
                    Some(next) if next.indent > indent => self.parse_value(next.indent)?,
                    Some(next) if next.indent == indent && is_sequence_item(next.content) => {
                        // zero-indented sequence under a mapping key
                        self.parse_sequence(indent)?
                    }
                    _ => {} // null value
                }
            } else {
                // plain scalar value; folded continuations are deeper
                self.skip_deeper(indent);
            }
        }

        Ok(())
    }

    fn parse_sequence(&mut self, indent: usize) -> Result<(), ParseError> {
        while let Some(line) = self.peek() {
            if line.indent != indent || !is_sequence_item(line.content) {
                break;
            }

            if line.content == "-" {
                self.advance();
                if let Some(next) = self.peek() {
                    if next.indent > indent {
                        self.parse_value(next.indent)?;
                    }
                }
            } else {
                // the item body starts right after the marker; reframe it as
                // a line that many columns deeper and parse it in place
                let rest = &line.content[2..];
                let extra = rest.len() - rest.trim_start_matches(' ').len();
                self.lines[self.pos].indent = indent + 2 + extra;
                self.lines[self.pos].content = &rest[extra..];
                self.parse_value(indent + 2 + extra)?;
            }
        }

        Ok(())
    }

    fn parse_scalar(&mut self, indent: usize) -> Result<(), ParseError> {
        self.advance();
        self.skip_deeper(indent);
        Ok(())
    }

    fn skip_deeper(&mut self, indent: usize) {
        while let Some(line) = self.peek() {
            if line.indent <= indent {
                break;
            }
            self.advance();
        }
    }

    fn record(&mut self, key: &str, line: usize) {
        let Some(last) = self.seen.get_mut(key) else {
            self.seen.insert(key.to_string(), line);
            return;
        };

        let previous = std::mem::replace(last, line);
        match self.duplicates.get_mut(key) {
            Some(lines) => lines.push(line),
            None => {
                self.duplicates.insert(key.to_string(), vec![previous, line]);
            }
        }
    }
}

fn is_sequence_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

fn split_key(content: &str) -> Option<(&str, &str)> {
    if let Some(position) = content.find(": ") {
        let key = unquote(&content[..position]);
        let value = content[position + 2..].trim();
        return (!key.is_empty()).then_some((key, value));
    }

    if let Some(key) = content.strip_suffix(':') {
        let key = unquote(key);
        return (!key.is_empty()).then_some((key, ""));
    }

    None
}

fn unquote(key: &str) -> &str {
    let key = key.trim();
    for quote in ['"', '\''] {
        if key.len() >= 2 && key.starts_with(quote) && key.ends_with(quote) {
            return &key[1..key.len() - 1];
        }
    }
    key
}

fn is_block_scalar(value: &str) -> bool {
    let Some(rest) = value.strip_prefix(['|', '>']) else {
        return false;
    };
    rest.chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-')
}
