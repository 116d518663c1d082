//! SMEIL semantic analysis core.
//!
//! This crate takes a parsed [`ast::Module`] — produced by an external
//! parser this crate does not implement — and runs it through six fixed
//! passes: identifier/keyword verification, instance elaboration (including
//! `connect` identity-process synthesis), constant-initializer cycle
//! checking, parameter wiring, type assignment, and dependency scheduling.
//!
//! # Architecture
//!
//! - [`ast`]: the module/entity/statement/expression tree the parser hands in
//! - [`ast_builder`]: programmatic `Module` construction, for tests and demos
//! - [`token`]: source-located tokens carried by every AST and instance node
//! - [`file`]: the `SourceFile` handle tokens point back into
//! - [`map`]: an order-preserving, duplicate-checked map used for scopes
//! - [`keywords`]: the reserved-word and intrinsic-type vocabulary
//! - [`sem`]: the six-pass analyzer and its output types
//! - [`error`]: turns a [`sem::SemError`] into the diagnostic line format and
//!   exit code external callers are expected to use
//!
//! # Usage
//!
//! ```ignore
//! use smeil::{analyze, ast::Module};
//!
//! let module: Module = /* from an external parser */;
//! let analysis = analyze(&module, None, &[])?;
//! for process in &analysis.schedule {
//!     // ...
//! }
//! ```

pub mod ast;
pub mod ast_builder;
pub mod error;
pub mod file;
pub mod keywords;
pub mod map;
pub mod sem;
pub mod token;

#[cfg(test)]
mod tests;

pub use sem::{analyze, Analysis, Context, SemError};
