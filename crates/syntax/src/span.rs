// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Byte-offset spans
//!
//! Every syntax node carries a [`Span`] locating it in the source text of its
//! statement file. Spans drive error reporting, error deduplication, and the
//! cursor-lookup hook, so the analyzer treats them as node identity.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into the source text.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Span {
    /// Byte offset of the first character of the node
    pub start: usize,
    /// Byte offset one past the last character of the node
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether the given byte offset falls inside this span
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An identifier together with its source span
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    /// Identifier text, exactly as written (lookups are identity exact-match)
    pub text: String,
    /// Location of the identifier in the source
    pub span: Span,
}

impl Name {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains() {
        let span = Span::new(4, 9);
        assert!(span.contains(4));
        assert!(span.contains(8));
        assert!(!span.contains(9));
        assert!(!span.contains(3));
    }

    #[test]
    fn test_name_display() {
        let name = Name::new("users", Span::new(0, 5));
        assert_eq!(name.to_string(), "users");
        assert_eq!(name.span.len(), 5);
    }
}
