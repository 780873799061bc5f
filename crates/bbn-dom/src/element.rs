//! Element Query and Methods
//!
//! querySelectorAll, matches, closest over a small selector grammar:
//! selector lists, compound selectors (type, `*`, `#id`, `.class`,
//! attribute tests) and the descendant / child combinators.

use crate::{DomError, DomResult, DomTree, ElementData, NodeId};

/// Element query trait
pub trait ElementQuery {
    /// Query single element by CSS selector
    fn query_selector(&self, root: NodeId, selector: &str) -> DomResult<Option<NodeId>>;

    /// Query all elements by CSS selector, in document order
    fn query_selector_all(&self, root: NodeId, selector: &str) -> DomResult<Vec<NodeId>>;

    /// Find closest inclusive ancestor matching selector
    fn closest(&self, element: NodeId, selector: &str) -> DomResult<Option<NodeId>>;

    /// Check if element matches selector
    fn matches(&self, element: NodeId, selector: &str) -> DomResult<bool>;
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

/// Compound selectors joined by combinators, stored right-most first
#[derive(Debug, Clone, PartialEq)]
struct Complex {
    subject: Compound,
    ancestors: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    parts: Vec<SimpleSelector>,
}

/// Simple selector for matching
#[derive(Debug, Clone, PartialEq)]
enum SimpleSelector {
    Tag(String),
    Class(String),
    Id(String),
    Attribute { name: String, test: AttrTest },
    Universal,
}

#[derive(Debug, Clone, PartialEq)]
enum AttrTest {
    Exists,
    Equals(String),
    Includes(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

impl Selector {
    /// Parse a selector list
    pub fn parse(source: &str) -> DomResult<Self> {
        let mut alternatives = Vec::new();
        for part in split_top_level(source) {
            alternatives.push(Complex::parse(source, part.trim())?);
        }
        if alternatives.is_empty() {
            return Err(DomError::selector(source, "empty selector"));
        }
        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    /// Selector text, trimmed
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether `node` matches any alternative
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(tree, node))
    }
}

/// Split on commas outside of attribute brackets and quotes
fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in source.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}

impl Complex {
    fn parse(source: &str, text: &str) -> DomResult<Self> {
        if text.is_empty() {
            return Err(DomError::selector(source, "empty selector in list"));
        }

        let mut compounds: Vec<Compound> = Vec::new();
        let mut combinators: Vec<Combinator> = Vec::new();
        let mut pending: Option<Combinator> = None;
        let mut chars = text.char_indices().peekable();

        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
                if !compounds.is_empty() && pending.is_none() {
                    pending = Some(Combinator::Descendant);
                }
                continue;
            }
            if c == '>' {
                chars.next();
                if compounds.is_empty() || pending == Some(Combinator::Child) {
                    return Err(DomError::selector(source, "dangling '>' combinator"));
                }
                pending = Some(Combinator::Child);
                continue;
            }

            let end = compound_end(text, i);
            let compound = Compound::parse(source, &text[i..end])?;
            if !compounds.is_empty() {
                combinators.push(pending.take().unwrap_or(Combinator::Descendant));
            }
            compounds.push(compound);
            while chars.peek().is_some_and(|&(j, _)| j < end) {
                chars.next();
            }
        }

        if pending == Some(Combinator::Child) {
            return Err(DomError::selector(source, "dangling '>' combinator"));
        }

        let subject = compounds.pop().ok_or_else(|| DomError::selector(source, "empty selector"))?;
        let ancestors = combinators.into_iter().rev().zip(compounds.into_iter().rev()).collect();
        Ok(Self { subject, ancestors })
    }

    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        if !self.subject.matches(tree, node) {
            return false;
        }
        self.match_ancestors(tree, node, 0)
    }

    /// Right-to-left matching with backtracking over descendant combinators
    fn match_ancestors(&self, tree: &DomTree, node: NodeId, index: usize) -> bool {
        let Some((combinator, compound)) = self.ancestors.get(index) else {
            return true;
        };
        match combinator {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|p| compound.matches(tree, p) && self.match_ancestors(tree, p, index + 1)),
            Combinator::Descendant => tree
                .ancestors(node)
                .any(|a| compound.matches(tree, a) && self.match_ancestors(tree, a, index + 1)),
        }
    }
}

/// Byte offset where the compound selector starting at `start` ends
fn compound_end(text: &str, start: usize) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in text[start..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if depth == 0 && (c.is_whitespace() || c == '>') => return start + i,
            _ => {}
        }
    }
    text.len()
}

impl Compound {
    fn parse(source: &str, text: &str) -> DomResult<Self> {
        let mut parts = Vec::new();
        let mut rest = text;

        if let Some(stripped) = rest.strip_prefix('*') {
            parts.push(SimpleSelector::Universal);
            rest = stripped;
        } else {
            let len = ident_len(rest);
            if len > 0 {
                parts.push(SimpleSelector::Tag(rest[..len].to_ascii_lowercase()));
                rest = &rest[len..];
            }
        }

        while let Some(c) = rest.chars().next() {
            match c {
                '#' | '.' => {
                    let len = ident_len(&rest[1..]);
                    if len == 0 {
                        return Err(DomError::selector(source, format!("expected name after '{c}'")));
                    }
                    let name = rest[1..=len].to_string();
                    parts.push(if c == '#' {
                        SimpleSelector::Id(name)
                    } else {
                        SimpleSelector::Class(name)
                    });
                    rest = &rest[1 + len..];
                }
                '[' => {
                    let close = rest
                        .find(']')
                        .ok_or_else(|| DomError::selector(source, "unterminated attribute selector"))?;
                    parts.push(parse_attribute(source, &rest[1..close])?);
                    rest = &rest[close + 1..];
                }
                other => {
                    return Err(DomError::selector(source, format!("unexpected character '{other}'")));
                }
            }
        }

        if parts.is_empty() {
            return Err(DomError::selector(source, "empty compound selector"));
        }
        Ok(Self { parts })
    }

    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match tree.get(node).and_then(|n| n.as_element()) {
            Some(elem) => self.parts.iter().all(|p| p.matches(elem)),
            None => false,
        }
    }
}

fn ident_len(s: &str) -> usize {
    s.char_indices()
        .find(|&(_, c)| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .map_or(s.len(), |(i, _)| i)
}

fn parse_attribute(source: &str, inner: &str) -> DomResult<SimpleSelector> {
    let inner = inner.trim();
    let Some(eq) = inner.find('=') else {
        if ident_len(inner) != inner.len() || inner.is_empty() {
            return Err(DomError::selector(source, "invalid attribute name"));
        }
        return Ok(SimpleSelector::Attribute {
            name: inner.to_ascii_lowercase(),
            test: AttrTest::Exists,
        });
    };

    let (op, name_end) = match inner[..eq].chars().last() {
        Some(c @ ('~' | '^' | '$' | '*')) => (Some(c), eq - 1),
        _ => (None, eq),
    };
    let name = inner[..name_end].trim();
    if name.is_empty() || ident_len(name) != name.len() {
        return Err(DomError::selector(source, "invalid attribute name"));
    }
    let value = unquote(inner[eq + 1..].trim());
    let test = match op {
        None => AttrTest::Equals(value),
        Some('~') => AttrTest::Includes(value),
        Some('^') => AttrTest::Prefix(value),
        Some('$') => AttrTest::Suffix(value),
        _ => AttrTest::Substring(value),
    };
    Ok(SimpleSelector::Attribute {
        name: name.to_ascii_lowercase(),
        test,
    })
}

fn unquote(value: &str) -> String {
    for q in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(q).and_then(|v| v.strip_suffix(q)) {
            return inner.to_string();
        }
    }
    value.to_string()
}

impl SimpleSelector {
    fn matches(&self, elem: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => elem.tag == *tag,
            Self::Id(id) => elem.id() == Some(id.as_str()),
            Self::Class(class) => elem.has_class(class),
            Self::Attribute { name, test } => {
                let Some(value) = elem.get_attr(name) else {
                    return false;
                };
                match test {
                    AttrTest::Exists => true,
                    AttrTest::Equals(v) => value == v,
                    AttrTest::Includes(v) => value.split_ascii_whitespace().any(|w| w == v),
                    AttrTest::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
                    AttrTest::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
                    AttrTest::Substring(v) => !v.is_empty() && value.contains(v.as_str()),
                }
            }
        }
    }
}

impl ElementQuery for DomTree {
    fn query_selector(&self, root: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .find(|&n| selector.matches(self, n)))
    }

    fn query_selector_all(&self, root: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect())
    }

    fn closest(&self, element: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(std::iter::once(element)
            .chain(self.ancestors(element))
            .find(|&n| selector.matches(self, n)))
    }

    fn matches(&self, element: NodeId, selector: &str) -> DomResult<bool> {
        Ok(Selector::parse(selector)?.matches(self, element))
    }
}
