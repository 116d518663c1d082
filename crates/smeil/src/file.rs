//! Source file representation for the SMEIL compiler core.
//!
//! The parser and module loader are external collaborators; this module only
//! defines the handle the core uses to refer back to a file's contents when
//! rendering diagnostics.

use std::{error::Error, path::PathBuf, sync::Arc};

/// A source file, identified by a dotted module path and holding its full text.
///
/// The core never reads files itself; `SourceFile` values are constructed by
/// whatever feeds it a [`crate::ast::Module`] and are carried along purely for
/// diagnostic rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    /// Path components, e.g. `["network", "top"]` for `network/top.smeil`.
    pub path: Arc<Vec<String>>,
    /// Full source text.
    pub code: Arc<String>,
}

impl SourceFile {
    pub fn new(path: Vec<String>, code: String) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
        }
    }

    pub fn path(&self) -> &Vec<String> {
        &self.path
    }

    pub fn code(&self) -> &String {
        self.code.as_ref()
    }

    pub fn display_path(&self) -> String {
        PathBuf::from_iter(self.path.iter())
            .to_string_lossy()
            .into_owned()
    }
}

impl From<SourceFile> for miette::NamedSource<String> {
    fn from(file: SourceFile) -> Self {
        miette::NamedSource::new(file.display_path(), file.code.to_string())
    }
}

impl From<&SourceFile> for miette::NamedSource<String> {
    fn from(file: &SourceFile) -> Self {
        miette::NamedSource::new(file.display_path(), file.code.to_string())
    }
}

impl Error for SourceFile {}

impl std::fmt::Display for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SourceFile: {}", self.display_path())
    }
}
