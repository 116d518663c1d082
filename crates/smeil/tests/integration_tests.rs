//! Integration tests for the SMEIL semantic analysis core.
//!
//! These build a `Module` through the public [`smeil::ast_builder::AstBuilder`]
//! API the same way an external parser or the `smeilc` binary would, then
//! drive the whole `analyze` pipeline, rather than reaching into private
//! `sem` submodules the way the in-crate scenario tests do.

use smeil::{
    analyze,
    ast::{BinaryOperator, Declaration, Direction, Entity},
    ast_builder::AstBuilder,
    SemError,
};

#[test]
fn top_level_network_is_selected_when_unambiguous() {
    let mut b = AstBuilder::new(vec!["main".into()], "<test>");

    let v = b.bus_signal("v", "u8");
    let shape = Declaration::Bus(b.bus("tdata", vec![v], false));

    let inbus_param = b.parameter("inbus", Direction::In, Some("tdata"));
    let outbus_param = b.parameter("outbus", Direction::Out, Some("tdata"));
    let one = b.int(1);
    let read = b.name_expr("inbus.v");
    let sum = b.binary(BinaryOperator::Add, read, one);
    let assign = b.assign("outbus.v", sum);
    let process = b.process("plus_one", false, vec![inbus_param, outbus_param], vec![], vec![assign]);

    let inbus_decl = b.bus_typed("inbus", "tdata", true);
    let outbus_decl = b.bus_typed("outbus", "tdata", true);
    let arg_in = b.positional_arg(b.name_expr("inbus"));
    let arg_out = b.positional_arg(b.name_expr("outbus"));
    let instance = b.instance("stage", "plus_one", vec![arg_in, arg_out]);

    let network = b.network(
        "top",
        vec![],
        vec![Declaration::Bus(inbus_decl), Declaration::Bus(outbus_decl), instance],
    );
    let module = b.module(vec![shape], vec![Entity::Process(process), Entity::Network(network)]);

    // No network name given: the module's sole network is picked automatically.
    let analysis = analyze(&module, None, &[]).expect("the only network in the module should be selected");
    assert_eq!(analysis.schedule.len(), 1);
}

#[test]
fn naming_a_network_absent_from_the_module_is_an_unknown_symbol() {
    let mut b = AstBuilder::new(vec!["main".into()], "<test>");
    let network = b.network("top", vec![], vec![]);
    let module = b.module(vec![], vec![Entity::Network(network)]);

    let error = analyze(&module, Some("does_not_exist"), &[]).expect_err("an unlisted network name must fail");
    assert!(matches!(error, SemError::UnknownSymbol { .. }), "expected UnknownSymbol, got {error:?}");
}

#[test]
fn trailing_command_line_arguments_bind_positionally_to_network_parameters() {
    let mut b = AstBuilder::new(vec!["main".into()], "<test>");

    let label_param = b.parameter("label", Direction::In, None);
    let network = b.network("top", vec![label_param], vec![]);
    let module = b.module(vec![], vec![Entity::Network(network)]);

    let analysis = analyze(&module, Some("top"), &["release".to_string()])
        .expect("a single string argument should bind to the network's only formal parameter");
    assert_eq!(analysis.schedule.len(), 0, "a network with no process instances schedules nothing");
}

#[test]
fn missing_a_required_command_line_argument_fails_with_missing_argument() {
    let mut b = AstBuilder::new(vec!["main".into()], "<test>");

    let label_param = b.parameter("label", Direction::In, None);
    let network = b.network("top", vec![label_param], vec![]);
    let module = b.module(vec![], vec![Entity::Network(network)]);

    let error = analyze(&module, Some("top"), &[]).expect_err("an unbound formal parameter must be rejected");
    assert!(matches!(error, SemError::MissingArgument { .. }), "expected MissingArgument, got {error:?}");
}

#[test]
fn reserved_keyword_used_as_a_declaration_name_is_rejected() {
    let mut b = AstBuilder::new(vec!["main".into()], "<test>");

    let one = b.int(1);
    let bad_constant = b.constant("proc", None, one);
    let network = b.network("top", vec![], vec![]);
    let module = b.module(vec![bad_constant], vec![Entity::Network(network)]);

    let error = analyze(&module, Some("top"), &[]).expect_err("declaring a constant named after a keyword must fail");
    assert!(matches!(error, SemError::ReservedName { .. }), "expected ReservedName, got {error:?}");
}
