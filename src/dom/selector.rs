use std::str::FromStr;

use crate::dom::document::{Document, NodeId};
use crate::error::PanelError;

/// A CSS selector list restricted to what the panel markup needs:
/// type, `#id`, `.class`, attribute tests (`[a]`, `=`, `^=`, `$=`, `*=`, `~=`),
/// descendant and child combinators, and comma-separated alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<ComplexSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeTest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeTest {
    name: String,
    op: AttributeOp,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeOp {
    Exists,
    Equals,
    Prefix,
    Suffix,
    Substring,
    Word,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, PanelError> {
        let mut alternatives = Vec::new();
        for part in split_alternatives(source) {
            let mut cursor = Cursor {
                chars: part.chars().collect(),
                pos: 0,
                source,
            };
            alternatives.push(cursor.complex()?);
        }
        if alternatives.is_empty() {
            return Err(PanelError::Selector {
                selector: source.to_string(),
                message: "empty selector".to_string(),
            });
        }
        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives.iter().any(|complex| {
            let last = complex.compounds.len() - 1;
            complex.matches_at(doc, node, last)
        })
    }
}

impl FromStr for Selector {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl ComplexSelector {
    fn matches_at(&self, doc: &Document, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(doc, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|p| self.matches_at(doc, p, index - 1)),
            Combinator::Descendant => {
                let mut current = doc.parent(node);
                while let Some(p) = current {
                    if self.matches_at(doc, p, index - 1) {
                        return true;
                    }
                    current = doc.parent(p);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(el) = doc.element(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != el.tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| el.id() != Some(id)) {
            return false;
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|test| {
            let Some(actual) = el.attr(&test.name) else {
                return false;
            };
            match test.op {
                AttributeOp::Exists => true,
                AttributeOp::Equals => actual == test.value,
                AttributeOp::Prefix => !test.value.is_empty() && actual.starts_with(&test.value),
                AttributeOp::Suffix => !test.value.is_empty() && actual.ends_with(&test.value),
                AttributeOp::Substring => !test.value.is_empty() && actual.contains(&test.value),
                AttributeOp::Word => actual.split_whitespace().any(|w| w == test.value),
            }
        })
    }
}

/// Split on top-level commas, ignoring commas inside quoted attribute values.
fn split_alternatives(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in source.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ',') => {
                parts.push(source[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(source[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

struct Cursor<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl Cursor<'_> {
    fn error(&self, message: impl Into<String>) -> PanelError {
        PanelError::Selector {
            selector: self.source.to_string(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn complex(&mut self) -> Result<ComplexSelector, PanelError> {
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        self.skip_whitespace();
        loop {
            compounds.push(self.compound()?);
            let had_space = self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_space => combinators.push(Combinator::Descendant),
                Some(c) => return Err(self.error(format!("unexpected '{}'", c))),
            }
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, PanelError> {
        let start = self.pos;
        let mut compound = Compound::default();

        match self.peek() {
            Some('*') => self.pos += 1,
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.attribute()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(match self.peek() {
                Some(c) => self.error(format!("unexpected '{}'", c)),
                None => self.error("expected a selector"),
            });
        }
        Ok(compound)
    }

    fn ident(&mut self) -> Result<String, PanelError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> Result<AttributeTest, PanelError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttributeTest {
                    name,
                    op: AttributeOp::Exists,
                    value: String::new(),
                });
            }
            Some('=') => AttributeOp::Equals,
            Some('^') => AttributeOp::Prefix,
            Some('$') => AttributeOp::Suffix,
            Some('*') => AttributeOp::Substring,
            Some('~') => AttributeOp::Word,
            _ => return Err(self.error("expected an attribute operator")),
        };
        self.pos += 1;
        if op != AttributeOp::Equals {
            if self.peek() != Some('=') {
                return Err(self.error("expected '='"));
            }
            self.pos += 1;
        }
        self.skip_whitespace();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek() != Some(quote) {
                    return Err(self.error("unterminated string"));
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                value
            }
            _ => self.ident()?,
        };

        self.skip_whitespace();
        if self.peek() != Some(']') {
            return Err(self.error("expected ']'"));
        }
        self.pos += 1;
        Ok(AttributeTest { name, op, value })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
