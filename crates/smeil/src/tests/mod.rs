//! Test suite for the semantic analysis core.

mod scenarios;
mod types;
