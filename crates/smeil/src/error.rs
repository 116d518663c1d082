//! Turns a [`SemError`] into the process-exit contract external callers use:
//! a `[<line>:<column>] "<text>": <message>` line per diagnostic, and one of
//! three exit codes.
//!
//! Rich rendering (source snippets, labels, help text) goes through `miette`;
//! this module only owns the plain-text line format and the code/usage-error
//! split, both of which are part of the command-line contract rather than an
//! implementation detail `miette::Report` would give us for free.

use std::fmt;

use crate::sem::SemError;

/// Process exit code for a successful run.
pub const EXIT_SUCCESS: i32 = 0;
/// Process exit code for a bad command line (wrong usage, missing file).
pub const EXIT_USAGE: i32 = 2;
/// Process exit code for a parser or validator failure.
pub const EXIT_FAILURE: i32 = 3;

/// A command-line usage problem: distinct from [`SemError`] because it's
/// never tied to a source token and exits with a different code.
#[derive(Debug)]
pub struct UsageError(pub String);

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UsageError {}

/// Renders `error` the way the command line is required to:
/// `[<line>:<column>] "<text>": <message>`, keyed on the diagnostic's
/// primary token (`tokens()` always returns that one first; a
/// `DuplicateSymbol` or `MultipleWriters` also carries secondary tokens,
/// left to the `miette` rendering for a reader who wants the full picture).
pub fn format_diagnostic(error: &SemError) -> String {
    let primary = error.tokens().into_iter().next().expect("every SemError cites at least one token");
    format!("{}: {error}", primary.locator())
}

/// Prints `error` to stderr in both the required plain-text form and, when
/// the terminal supports it, `miette`'s annotated rendering, then returns the
/// exit code the caller should use.
pub fn report(error: &SemError) -> i32 {
    eprintln!("{}", format_diagnostic(error));
    log::error!("{error}");
    EXIT_FAILURE
}

/// Prints a command-line usage error to stderr and returns the exit code the
/// caller should use.
pub fn report_usage(error: &UsageError) -> i32 {
    eprintln!("{error}");
    EXIT_USAGE
}
