//! SMEIL semantic analysis command line.
//!
//! There is no parser wired in yet (an external collaborator owns that per
//! the core's contract), so this binary demonstrates the full six-pass
//! pipeline against a small built-in program: a network instantiating a
//! process that adds one to every value it reads off an input bus. Trailing
//! command-line arguments are bound positionally to that network's formal
//! parameters, exactly as the core's external interface requires.

use std::process::exit;

use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, LevelPadding, TermLogger, TerminalMode, ThreadLogMode};
use smeil::{
    ast::{BinaryOperator, Direction},
    ast_builder::AstBuilder,
    error::{report, report_usage, EXIT_SUCCESS, UsageError},
};

fn init_logging() {
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Error)
        .set_thread_mode(ThreadLogMode::Both)
        .set_level_padding(LevelPadding::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    CombinedLogger::init(vec![TermLogger::new(LevelFilter::Info, config, TerminalMode::Mixed, ColorChoice::Auto)])
        .expect("logger already initialized");
}

/// Parses `-n`/`--network NAME` out of `args`, returning it plus everything
/// else to bind positionally to the chosen network's formal parameters.
fn parse_args(args: &[String]) -> Result<(Option<String>, Vec<String>), UsageError> {
    let mut network_name = None;
    let mut cli_args = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-n" | "--network" => {
                let name = iter.next().ok_or_else(|| UsageError("--network requires a value".to_string()))?;
                network_name = Some(name.clone());
            }
            _ => cli_args.push(arg.clone()),
        }
    }
    Ok((network_name, cli_args))
}

/// `bus tdata { v: u8 }`
/// `process plus_one(in inbus: tdata, out outbus: tdata) { outbus.v = inbus.v + 1; }`
/// `network top { bus inbus: tdata; bus outbus: tdata; instance stage: plus_one(inbus, outbus); }`
fn demo_module(b: &mut AstBuilder) -> smeil::ast::Module {
    let v = b.bus_signal("v", "u8");
    let shape = smeil::ast::Declaration::Bus(b.bus("tdata", vec![v], false));

    let inbus_param = b.parameter("inbus", Direction::In, Some("tdata"));
    let outbus_param = b.parameter("outbus", Direction::Out, Some("tdata"));
    let one = b.int(1);
    let read = b.name_expr("inbus.v");
    let sum = b.binary(BinaryOperator::Add, read, one);
    let assign = b.assign("outbus.v", sum);
    let process = b.process("plus_one", false, vec![inbus_param, outbus_param], vec![], vec![assign]);

    let inbus_decl = b.bus_typed("inbus", "tdata", true);
    let outbus_decl = b.bus_typed("outbus", "tdata", true);
    let in_expr = b.name_expr("inbus");
    let arg_in = b.positional_arg(in_expr);
    let out_expr = b.name_expr("outbus");
    let arg_out = b.positional_arg(out_expr);
    let instance = b.instance("stage", "plus_one", vec![arg_in, arg_out]);

    let network = b.network(
        "top",
        vec![],
        vec![smeil::ast::Declaration::Bus(inbus_decl), smeil::ast::Declaration::Bus(outbus_decl), instance],
    );

    b.module(vec![shape], vec![smeil::ast::Entity::Process(process), smeil::ast::Entity::Network(network)])
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (network_name, cli_args) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(error) => exit(report_usage(&error)),
    };

    let mut builder = AstBuilder::new(vec!["top".to_string()], "<built-in>");
    let module = demo_module(&mut builder);

    match smeil::analyze(&module, network_name.as_deref(), &cli_args) {
        Ok(analysis) => {
            println!("analysis succeeded: {} process(es) scheduled", analysis.schedule.len());
            for location in &analysis.schedule {
                let name = analysis.context.get(*location).name().unwrap_or("<process>");
                println!("  {name}");
            }
            exit(EXIT_SUCCESS);
        }
        Err(error) => exit(report(&error)),
    }
}
