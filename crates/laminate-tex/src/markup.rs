//! Markup assembly
//!
//! [`MarkupBuilder`] is the only way the generator writes output. Raw markup
//! must be a `&'static str`, so it can only come from literals in this
//! crate; anything else goes through [`MarkupBuilder::text`] and is escaped.

use std::fmt;

use crate::escape::push_escaped;

/// A complete LaTeX source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupDocument(String);

impl MarkupDocument {
    /// The markup as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The markup as bytes, ready to be written to disk
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Consume the document, returning the markup
    pub fn into_string(self) -> String {
        self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the document is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MarkupDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MarkupDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered builder of typed markup fragments
#[derive(Debug, Default)]
pub struct MarkupBuilder {
    output: String,
}

impl MarkupBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append trusted markup
    pub fn raw(&mut self, markup: &'static str) -> &mut Self {
        self.output.push_str(markup);
        self
    }

    /// Append user text, escaped
    pub fn text(&mut self, text: &str) -> &mut Self {
        push_escaped(&mut self.output, text);
        self
    }

    /// Append `\name{text}` with the argument escaped
    pub fn command(&mut self, name: &'static str, text: &str) -> &mut Self {
        self.output.push('\\');
        self.output.push_str(name);
        self.group(text)
    }

    /// Append `{text}` with the content escaped
    pub fn group(&mut self, text: &str) -> &mut Self {
        self.output.push('{');
        push_escaped(&mut self.output, text);
        self.output.push('}');
        self
    }

    /// Append a line break
    pub fn newline(&mut self) -> &mut Self {
        self.output.push('\n');
        self
    }

    /// Finish the document
    pub fn finish(self) -> MarkupDocument {
        MarkupDocument(self.output)
    }
}
