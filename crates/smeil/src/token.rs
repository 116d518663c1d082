//! Source location tokens.
//!
//! Every AST and instance node carries a [`Token`] so that diagnostics can
//! always quote the offending source text. The lexer/parser that produces
//! these tokens is an external collaborator; the core only consumes them.

use std::{ops::Range, sync::Arc};

use crate::file::SourceFile;

/// A piece of source text together with its location.
///
/// `line` is 1-based, `column` is 0-based, `offset` is the absolute character
/// offset into the file. All three are carried independently rather than
/// recomputed, since the producing parser already has them on hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub text: Arc<str>,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub file: Arc<SourceFile>,
}

impl Token {
    pub fn new(text: impl Into<Arc<str>>, line: usize, column: usize, offset: usize, file: Arc<SourceFile>) -> Self {
        Self {
            text: text.into(),
            line,
            column,
            offset,
            file,
        }
    }

    /// Character range of this token within its file's source text.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.text.chars().count()
    }

    /// `miette` span covering this token, for use in `#[label]` fields.
    pub fn span(&self) -> miette::SourceSpan {
        self.range().into()
    }

    /// Renders the `[<line>:<column>] "<text>"` prefix used by diagnostics.
    pub fn locator(&self) -> String {
        format!("[{}:{}] \"{}\"", self.line, self.column, self.text)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
