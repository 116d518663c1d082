//! Semantic analysis: turns a parsed [`crate::ast::Module`] into an
//! elaborated instance graph, a type-checked process body for every
//! instance, and a process execution schedule.
//!
//! The six passes run in a fixed order and fail fast: the first diagnostic
//! raised by any pass aborts analysis rather than being collected alongside
//! later ones.

pub mod context;
pub mod elaborate;
pub mod error;
pub mod instance;
pub mod params;
pub mod resolve;
pub mod schedule;
pub mod scope;
pub mod typecheck;
pub mod types;
pub mod verify;

use crate::ast::Module;

pub use context::Context;
pub use error::SemError;
pub use instance::InstanceLocation;

/// Everything produced by a successful run: the populated [`Context`], the
/// elaborated top-level module instance, and the process schedule.
pub struct Analysis {
    pub context: Context,
    pub program: InstanceLocation,
    pub schedule: Vec<InstanceLocation>,
}

/// Runs every pass over `module`, instantiating `network_name` (or the
/// module's sole network if only one is declared) as the top level and
/// binding `cli_args` positionally to its formal parameters.
pub fn analyze(module: &Module, network_name: Option<&str>, cli_args: &[String]) -> Result<Analysis, SemError> {
    verify::verify_identifiers(module)?;

    let mut context = Context::new();
    let program = elaborate::elaborate_program(&mut context, module, network_name, cli_args)?;
    verify::verify_constant_initializers(&context)?;
    params::wire_all_parameters(&mut context)?;
    typecheck::assign_types(&mut context)?;
    let schedule = schedule::build_schedule(&context)?;

    Ok(Analysis { context, program, schedule })
}
