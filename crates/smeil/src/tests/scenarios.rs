//! End-to-end coverage of the six-pass pipeline, each test building its
//! program directly through [`crate::ast_builder::AstBuilder`] rather than
//! parsing source text.

use pretty_assertions::assert_eq;

use crate::{
    analyze,
    ast::{BinaryOperator, Declaration, Direction, Entity},
    ast_builder::AstBuilder,
    sem::{error::SemError, instance::Instance, instance::ProcessTag},
};

fn builder() -> AstBuilder {
    AstBuilder::new(vec!["test".to_string()], "<test>")
}

#[test]
fn adder_process_schedules_after_elaboration() {
    let mut b = builder();

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
    let in_expr = b.name_expr("inbus");
    let arg_in = b.positional_arg(in_expr);
    let out_expr = b.name_expr("outbus");
    let arg_out = b.positional_arg(out_expr);
    let instance = b.instance("stage", "plus_one", vec![arg_in, arg_out]);

    let network = b.network(
        "top",
        vec![],
        vec![Declaration::Bus(inbus_decl), Declaration::Bus(outbus_decl), instance],
    );
    let module = b.module(vec![shape], vec![Entity::Process(process), Entity::Network(network)]);

    let analysis = analyze(&module, Some("top"), &[]).expect("a single writer per signal should schedule cleanly");
    assert_eq!(analysis.schedule.len(), 1);
    let scheduled = analysis.context.get(analysis.schedule[0]).name();
    assert_eq!(scheduled, Some("plus_one"));
}

#[test]
fn connect_between_two_buses_synthesizes_an_identity_process() {
    let mut b = builder();

    let v = b.bus_signal("v", "u8");
    let shape = Declaration::Bus(b.bus("tdata", vec![v], false));

    let from_decl = b.bus_typed("from_bus", "tdata", true);
    let to_decl = b.bus_typed("to_bus", "tdata", false);
    let connect = b.connect("from_bus", "to_bus");

    let network = b.network("top", vec![], vec![Declaration::Bus(from_decl), Declaration::Bus(to_decl), connect]);
    let module = b.module(vec![shape], vec![Entity::Network(network)]);

    let analysis = analyze(&module, Some("top"), &[]).expect("connecting two compatible buses should elaborate");

    let synthesized = analysis
        .context
        .instances
        .iter()
        .enumerate()
        .find_map(|(i, inst)| match inst {
            Instance::Process(p) if p.tag == ProcessTag::Connect => Some(crate::sem::instance::InstanceLocation(i)),
            _ => None,
        })
        .expect("a connect entry synthesizes a process instance");

    assert!(analysis.schedule.contains(&synthesized), "the synthesized process must be scheduled like any other");
}

#[test]
fn connect_between_differently_typed_signals_inserts_an_explicit_cast() {
    let mut b = builder();

    let v = b.bus_signal("v", "u8");
    let from_shape = Declaration::Bus(b.bus("from_shape", vec![v], false));
    let w = b.bus_signal("w", "u16");
    let to_shape = Declaration::Bus(b.bus("to_shape", vec![w], false));

    let from_decl = b.bus_typed("from_bus", "from_shape", true);
    let to_decl = b.bus_typed("to_bus", "to_shape", false);
    let connect = b.connect("from_bus.v", "to_bus.w");

    let network = b.network("top", vec![], vec![Declaration::Bus(from_decl), Declaration::Bus(to_decl), connect]);
    let module = b.module(vec![from_shape, to_shape], vec![Entity::Network(network)]);

    // Before the fix, the synthesized cast's target-type token carried the
    // shared signal's *name* rather than a type spelling, so resolving it
    // failed; this must now elaborate and schedule cleanly.
    let analysis = analyze(&module, Some("top"), &[])
        .expect("connecting a u8 signal to a u16 signal must synthesize an explicit widening cast, not fail to resolve a type");

    let synthesized = analysis
        .context
        .instances
        .iter()
        .enumerate()
        .find_map(|(i, inst)| match inst {
            Instance::Process(p) if p.tag == ProcessTag::Connect => Some(crate::sem::instance::InstanceLocation(i)),
            _ => None,
        })
        .expect("a connect entry synthesizes a process instance");
    assert!(analysis.schedule.contains(&synthesized));
}

#[test]
fn two_processes_writing_the_same_signal_is_rejected() {
    let mut b = builder();

    let v = b.bus_signal("v", "u8");
    let shape = Declaration::Bus(b.bus("tdata", vec![v], false));

    let out_param_a = b.parameter("outbus", Direction::Out, Some("tdata"));
    let one_a = b.int(1);
    let assign_a = b.assign("outbus.v", one_a);
    let writer_a = b.process("writer_a", false, vec![out_param_a], vec![], vec![assign_a]);

    let out_param_b = b.parameter("outbus", Direction::Out, Some("tdata"));
    let one_b = b.int(2);
    let assign_b = b.assign("outbus.v", one_b);
    let writer_b = b.process("writer_b", false, vec![out_param_b], vec![], vec![assign_b]);

    let bus_decl = b.bus_typed("shared", "tdata", false);
    let shared_expr_a = b.name_expr("shared");
    let arg_a = b.positional_arg(shared_expr_a);
    let inst_a = b.instance("inst_a", "writer_a", vec![arg_a]);
    let shared_expr_b = b.name_expr("shared");
    let arg_b = b.positional_arg(shared_expr_b);
    let inst_b = b.instance("inst_b", "writer_b", vec![arg_b]);

    let network = b.network("top", vec![], vec![Declaration::Bus(bus_decl), inst_a, inst_b]);
    let module = b.module(
        vec![shape],
        vec![Entity::Process(writer_a), Entity::Process(writer_b), Entity::Network(network)],
    );

    let error = analyze(&module, Some("top"), &[]).expect_err("two writers of the same signal must be rejected");
    assert!(matches!(error, SemError::MultipleWriters { .. }), "expected MultipleWriters, got {error:?}");
}

#[test]
fn circular_constant_initializer_is_rejected() {
    let mut b = builder();

    let b_ref = b.name_expr("b");
    let const_a = b.constant("a", None, b_ref);
    let a_ref = b.name_expr("a");
    let const_b = b.constant("b", None, a_ref);

    let network = b.network("top", vec![], vec![]);
    let module = b.module(vec![const_a, const_b], vec![Entity::Network(network)]);

    let error = analyze(&module, None, &[]).expect_err("a two-constant cycle must be rejected");
    assert!(matches!(error, SemError::CircularInitializer { .. }), "expected CircularInitializer, got {error:?}");
}

#[test]
fn a_local_constant_may_reference_a_sibling_local_constant() {
    let mut b = builder();

    let one = b.int(1);
    let const_a = b.constant("a", None, one);
    let a_ref = b.name_expr("a");
    let const_b = b.constant("b", None, a_ref);

    // Both constants are declared inside the network, not at module level,
    // so `b`'s initializer must resolve `a` as a sibling in the network's
    // own scope rather than failing to find it in the module scope.
    let network = b.network("top", vec![], vec![const_a, const_b]);
    let module = b.module(vec![], vec![Entity::Network(network)]);

    analyze(&module, None, &[]).expect("a local constant initializer may reference a sibling local constant");
}

#[test]
fn narrowing_assignment_without_a_cast_loses_precision() {
    let mut b = builder();

    let v8 = b.bus_signal("v", "u8");
    let narrow_shape = Declaration::Bus(b.bus("narrow_shape", vec![v8], false));
    let v16 = b.bus_signal("v", "u16");
    let wide_shape = Declaration::Bus(b.bus("wide_shape", vec![v16], false));

    let in_param = b.parameter("inbus", Direction::In, Some("wide_shape"));
    let out_param = b.parameter("outbus", Direction::Out, Some("narrow_shape"));
    let read = b.name_expr("inbus.v");
    let assign = b.assign("outbus.v", read);
    let process = b.process("narrowing", false, vec![in_param, out_param], vec![], vec![assign]);

    let inbus_decl = b.bus_typed("inbus", "wide_shape", true);
    let outbus_decl = b.bus_typed("outbus", "narrow_shape", true);
    let in_expr = b.name_expr("inbus");
    let arg_in = b.positional_arg(in_expr);
    let out_expr = b.name_expr("outbus");
    let arg_out = b.positional_arg(out_expr);
    let instance = b.instance("stage", "narrowing", vec![arg_in, arg_out]);

    let network = b.network(
        "top",
        vec![],
        vec![Declaration::Bus(inbus_decl), Declaration::Bus(outbus_decl), instance],
    );
    let module = b.module(
        vec![narrow_shape, wide_shape],
        vec![Entity::Process(process), Entity::Network(network)],
    );

    let error = analyze(&module, Some("top"), &[]).expect_err("assigning a u16 signal into a u8 signal needs an explicit cast");
    assert!(matches!(error, SemError::PrecisionLoss { .. }), "expected PrecisionLoss, got {error:?}");
}

#[test]
fn reading_an_out_parameter_is_rejected() {
    let mut b = builder();

    let v = b.bus_signal("v", "u8");
    let shape = Declaration::Bus(b.bus("tdata", vec![v], false));

    let out_param = b.parameter("outbus", Direction::Out, Some("tdata"));
    let local = b.variable("local", Some("u8"), None);
    let read = b.name_expr("outbus.v");
    let assign = b.assign("local", read);
    let process = b.process("bad", false, vec![out_param], vec![local], vec![assign]);

    let outbus_decl = b.bus_typed("outbus", "tdata", false);
    let out_expr = b.name_expr("outbus");
    let arg_out = b.positional_arg(out_expr);
    let instance = b.instance("stage", "bad", vec![arg_out]);

    let network = b.network("top", vec![], vec![Declaration::Bus(outbus_decl), instance]);
    let module = b.module(vec![shape], vec![Entity::Process(process), Entity::Network(network)]);

    let error = analyze(&module, Some("top"), &[]).expect_err("reading an `out` formal parameter must be rejected");
    assert!(matches!(error, SemError::IllegalSignalDirection { direction: "read", .. }), "expected a read-direction violation, got {error:?}");
}

#[test]
fn an_inverse_out_parameter_may_be_read_but_not_written() {
    let mut b = builder();

    let v = b.bus_signal("v", "u8");
    let shape = Declaration::Bus(b.bus("tdata", vec![v], false));

    let out_param = b.parameter_with_inverse("outbus", Direction::Out, Some("tdata"), true);
    let local = b.variable("local", Some("u8"), None);
    let read = b.name_expr("outbus.v");
    let assign = b.assign("local", read);
    let process = b.process("reader", false, vec![out_param], vec![local], vec![assign]);

    let outbus_decl = b.bus_typed("outbus", "tdata", true);
    let out_expr = b.name_expr("outbus");
    let arg_out = b.positional_arg(out_expr);
    let instance = b.instance("stage", "reader", vec![arg_out]);

    let network = b.network("top", vec![], vec![Declaration::Bus(outbus_decl), instance]);
    let module = b.module(vec![shape], vec![Entity::Process(process), Entity::Network(network)]);

    analyze(&module, Some("top"), &[]).expect("inverse flips an `out` formal into a readable one");
}

#[test]
fn an_inverse_out_parameter_cannot_be_written() {
    let mut b = builder();

    let v = b.bus_signal("v", "u8");
    let shape = Declaration::Bus(b.bus("tdata", vec![v], false));

    let out_param = b.parameter_with_inverse("outbus", Direction::Out, Some("tdata"), true);
    let one = b.int(1);
    let assign = b.assign("outbus.v", one);
    let process = b.process("writer", false, vec![out_param], vec![], vec![assign]);

    let outbus_decl = b.bus_typed("outbus", "tdata", true);
    let out_expr = b.name_expr("outbus");
    let arg_out = b.positional_arg(out_expr);
    let instance = b.instance("stage", "writer", vec![arg_out]);

    let network = b.network("top", vec![], vec![Declaration::Bus(outbus_decl), instance]);
    let module = b.module(vec![shape], vec![Entity::Process(process), Entity::Network(network)]);

    let error = analyze(&module, Some("top"), &[]).expect_err("inverse flips an `out` formal so writing it is rejected");
    assert!(matches!(error, SemError::IllegalSignalDirection { direction: "write", .. }), "expected a write-direction violation, got {error:?}");
}
