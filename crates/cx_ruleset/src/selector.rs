//! JSONPath selectors used by rule `given` clauses.
//!
//! Supported syntax is the subset rulesets rely on:
//! - `$` root
//! - `.name` and `['name']` / `["name"]` child access
//! - `[n]` array index
//! - `.*` and `[*]` wildcards
//! - `..name` and `..*` recursive descent
//!
//! Filter expressions (`[?(...)]`) and slices are not supported.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error produced when a selector cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at position {position} in `{selector}`")]
pub struct SelectorError {
    pub selector: String,
    pub position: usize,
    pub message: String,
}

/// One step of a location inside a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Location of a fragment inside a document, from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentPath(pub Vec<PathSegment>);

impl DocumentPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// The last key of the path, if it ends on an object property.
    pub fn property(&self) -> Option<&str> {
        match self.0.last() {
            Some(PathSegment::Key(key)) => Some(key.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$");
        }
        let joined = self
            .0
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", joined)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Child(String),
    Index(usize),
    Wildcard,
    RecursiveChild(String),
    RecursiveWildcard,
}

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    steps: Vec<Step>,
}

impl Selector {
    /// Parse a selector expression.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        Parser::new(source).parse()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Select every matching fragment, paired with its location.
    pub fn select<'a>(&self, root: &'a Value) -> Vec<(DocumentPath, &'a Value)> {
        let mut current = vec![(DocumentPath::root(), root)];

        for step in &self.steps {
            let mut next = Vec::new();
            for (path, value) in current {
                apply_step(step, path, value, &mut next);
            }
            current = next;
        }

        current
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

fn apply_step<'a>(
    step: &Step,
    path: DocumentPath,
    value: &'a Value,
    out: &mut Vec<(DocumentPath, &'a Value)>,
) {
    match step {
        Step::Child(key) => {
            if let Some(child) = value.as_object().and_then(|map| map.get(key)) {
                out.push((path.child(PathSegment::Key(key.clone())), child));
            }
        }
        Step::Index(index) => {
            if let Some(child) = value.as_array().and_then(|items| items.get(*index)) {
                out.push((path.child(PathSegment::Index(*index)), child));
            }
        }
        Step::Wildcard => push_children(&path, value, out),
        Step::RecursiveChild(key) => {
            let mut nodes = vec![(path.clone(), value)];
            collect_descendants(&path, value, &mut nodes);
            for (node_path, node) in nodes {
                if let Some(child) = node.as_object().and_then(|map| map.get(key)) {
                    out.push((node_path.child(PathSegment::Key(key.clone())), child));
                }
            }
        }
        Step::RecursiveWildcard => collect_descendants(&path, value, out),
    }
}

fn push_children<'a>(
    path: &DocumentPath,
    value: &'a Value,
    out: &mut Vec<(DocumentPath, &'a Value)>,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                out.push((path.child(PathSegment::Key(key.clone())), child));
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                out.push((path.child(PathSegment::Index(index)), child));
            }
        }
        _ => {}
    }
}

/// Every descendant of `value` (not `value` itself), pre-order.
fn collect_descendants<'a>(
    path: &DocumentPath,
    value: &'a Value,
    out: &mut Vec<(DocumentPath, &'a Value)>,
) {
    let mut children = Vec::new();
    push_children(path, value, &mut children);
    for (child_path, child) in children {
        out.push((child_path.clone(), child));
        collect_descendants(&child_path, child, out);
    }
}

struct Parser<'s> {
    source: &'s str,
    chars: Vec<char>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> SelectorError {
        SelectorError {
            selector: self.source.to_string(),
            position: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse(mut self) -> Result<Selector, SelectorError> {
        if !self.eat('$') {
            return Err(self.error("selector must start with `$`"));
        }

        let mut steps = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    if self.eat('.') {
                        steps.push(self.parse_recursive()?);
                    } else if self.eat('*') {
                        steps.push(Step::Wildcard);
                    } else {
                        steps.push(Step::Child(self.parse_name()?));
                    }
                }
                '[' => steps.push(self.parse_bracket()?),
                _ => return Err(self.error(format!("unexpected character `{}`", c))),
            }
        }

        Ok(Selector {
            source: self.source.to_string(),
            steps,
        })
    }

    fn parse_recursive(&mut self) -> Result<Step, SelectorError> {
        if self.eat('*') {
            return Ok(Step::RecursiveWildcard);
        }
        if self.peek() == Some('[') {
            return match self.parse_bracket()? {
                Step::Child(key) => Ok(Step::RecursiveChild(key)),
                Step::Wildcard => Ok(Step::RecursiveWildcard),
                _ => Err(self.error("recursive descent supports only names and `*`")),
            };
        }
        Ok(Step::RecursiveChild(self.parse_name()?))
    }

    fn parse_name(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '.' || c == '[' {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected a property name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_bracket(&mut self) -> Result<Step, SelectorError> {
        if !self.eat('[') {
            return Err(self.error("expected `[`"));
        }

        let step = match self.peek() {
            Some('*') => {
                self.pos += 1;
                Step::Wildcard
            }
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                Step::Child(self.parse_quoted(quote)?)
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                let index = digits
                    .parse::<usize>()
                    .map_err(|e| self.error(format!("invalid index: {}", e)))?;
                Step::Index(index)
            }
            Some('?') => return Err(self.error("filter expressions are not supported")),
            Some(c) => return Err(self.error(format!("unexpected character `{}` in brackets", c))),
            None => return Err(self.error("unterminated `[`")),
        };

        if !self.eat(']') {
            return Err(self.error("expected `]`"));
        }
        Ok(step)
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut name = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(c) => {
                            name.push(c);
                            self.pos += 1;
                        }
                        None => return Err(self.error("unterminated escape")),
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(name);
                }
                Some(c) => {
                    name.push(c);
                    self.pos += 1;
                }
            }
        }
    }
}
