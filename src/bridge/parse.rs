//! Parsing of printed Lisp output.
//!
//! Only a single level of list structure is understood. Nested lists
//! come through as opaque text tokens.

use super::NIL;
use serde::{Deserialize, Serialize};

/// One scalar element of a printed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Atom {
    /// `nil`
    Nil,
    /// `t`
    Bool(bool),
    /// A token made only of ASCII digits.
    Integer(i64),
    /// A dequoted string or any other raw token.
    Text(String),
}

impl Atom {
    /// Text content, for both strings and bare symbols.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Lisp truthiness: everything except `nil` is true.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil)
    }
}

/// Parse simple list output such as `("foo" nil t 42 bar)`.
///
/// `"nil"` and empty input parse to an empty sequence.
#[must_use]
pub fn parse_list(raw: &str) -> Vec<Atom> {
    let content = raw.trim();
    if content.is_empty() || content == NIL {
        return Vec::new();
    }

    let content = content
        .strip_prefix('(')
        .and_then(|c| c.strip_suffix(')'))
        .unwrap_or(content);

    tokenize(content).into_iter().map(classify).collect()
}

/// Split on spaces that are not inside a double-quoted span.
fn tokenize(content: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_string = false;

    for ch in content.chars() {
        match ch {
            '"' => {
                in_string = !in_string;
                current.push(ch);
            }
            ' ' if !in_string => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

fn classify(token: String) -> Atom {
    if token == NIL {
        return Atom::Nil;
    }
    if token == "t" {
        return Atom::Bool(true);
    }
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        return Atom::Text(token[1..token.len() - 1].to_string());
    }
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        // Too large for i64: keep the digits as text.
        if let Ok(n) = token.parse() {
            return Atom::Integer(n);
        }
    }
    Atom::Text(token)
}

/// Decode one printed Lisp string: surrounding quotes plus `\"` and `\\`.
///
/// Input without surrounding quotes is returned unchanged.
#[must_use]
pub fn decode_string(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .filter(|_| raw.len() >= 2)
    else {
        return raw.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Quote text for embedding as a Lisp string literal.
#[must_use]
pub fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}
