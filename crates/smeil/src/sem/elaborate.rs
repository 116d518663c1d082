//! Instance elaboration: expands declarations into the concrete instance
//! tree, with scoped symbol tables and synthesized identity processes for
//! `connect` statements (component D).

use crate::{
    ast::{
        reindex_statements, BinaryOperator, BusDecl, ConnectEntry, Declaration, Direction, DottedName, Entity,
        Expression, ExpressionNode, GeneratorDecl, LiteralValue, Module, NameSegment, NetworkEntity, Parameter,
        ParameterMapEntry, ProcessEntity, Statement, StatementNode,
    },
    sem::{
        context::Context,
        error::SemError,
        instance::{
            BusInstance, ConnectionInstance, ConstantInstance, EnumFieldInstance, EnumTypeInstance,
            ForLoopInstance, FunctionInvocationInstance, Instance, InstanceLocation, NetworkInstance, ParameterInstance,
            ProcessInstance, ProcessTag, SignalInstance, VariableInstance,
        },
        resolve::{find_dotted, resolve_type_name},
        scope::{ScopeLocation, Typedef},
        types::{BusShape, DataType},
    },
    token::Token,
};

/// Elaborates `module`'s top-level declarations and then the network named
/// `network_name` (or the module's sole network), binding `cli_args`
/// positionally to that network's formal parameters.
pub fn elaborate_program(
    ctx: &mut Context,
    module: &Module,
    network_name: Option<&str>,
    cli_args: &[String],
) -> Result<InstanceLocation, SemError> {
    for entity in &module.entities {
        ctx.entities.insert(entity.name().as_ref().to_string(), entity.clone());
    }

    let module_scope = ctx.module_scope;
    let mut declarations = Vec::new();
    for decl in &module.declarations {
        declarations.extend(elaborate_declaration(ctx, decl, module_scope)?);
    }

    let network = select_top_network(module, network_name, &module.token)?;
    let argument_map = cli_argument_map(ctx, &network.token, cli_args);
    let network_loc = elaborate_network_instance(ctx, network, &argument_map, module_scope)?;

    let module_instance = Instance::Module(crate::sem::instance::ModuleInstance {
        token: module.token.clone(),
        declarations,
        top_network: Some(network_loc),
    });
    Ok(ctx.add_instance(module_instance))
}

fn select_top_network<'a>(module: &'a Module, network_name: Option<&str>, at: &Token) -> Result<&'a NetworkEntity, SemError> {
    let networks: Vec<&NetworkEntity> = module
        .entities
        .iter()
        .filter_map(|e| match e {
            Entity::Network(n) => Some(n),
            _ => None,
        })
        .collect();

    if let Some(name) = network_name {
        networks
            .into_iter()
            .find(|n| n.name.as_ref() == name)
            .ok_or_else(|| SemError::unknown_symbol(name, at, None))
    } else if networks.len() == 1 {
        Ok(networks[0])
    } else {
        Err(SemError::unknown_symbol("<top-level network>", at, None))
    }
}

/// Elaborates one declaration in `scope`, returning every instance it
/// introduced (usually one, but generators expand to many).
fn elaborate_declaration(ctx: &mut Context, decl: &Declaration, scope: ScopeLocation) -> Result<Vec<InstanceLocation>, SemError> {
    match decl {
        Declaration::Bus(bus) => Ok(vec![elaborate_bus(ctx, bus, scope)?]),
        Declaration::Constant(c) => {
            let ty = match &c.type_name {
                Some(t) => Some(resolve_type_name(ctx, scope, t)?),
                None => None,
            };
            let instance = ctx.add_instance(Instance::ConstantReference(ConstantInstance {
                token: c.token.clone(),
                name: c.name.as_ref().to_string(),
                ty,
                initializer: c.initializer.clone(),
                scope,
            }));
            ctx.scope_mut(scope).try_add_symbol(c.name.as_ref(), instance, c.name.clone())?;
            Ok(vec![instance])
        }
        Declaration::Variable(v) => {
            let ty = match &v.type_name {
                Some(t) => Some(resolve_type_name(ctx, scope, t)?),
                None => None,
            };
            let instance = ctx.add_instance(Instance::Variable(VariableInstance {
                token: v.token.clone(),
                name: v.name.as_ref().to_string(),
                ty,
                initializer: v.initializer.clone(),
            }));
            ctx.scope_mut(scope).try_add_symbol(v.name.as_ref(), instance, v.name.clone())?;
            Ok(vec![instance])
        }
        Declaration::Enum(e) => Ok(vec![elaborate_enum(ctx, e, scope)?]),
        Declaration::Function(f) => {
            ctx.functions.insert(f.name.as_ref().to_string(), f.clone());
            // A placeholder symbol so call statements resolve the name; the
            // body is cloned fresh into a new instance at each call site.
            let instance = ctx.add_instance(Instance::FunctionInvocation(FunctionInvocationInstance {
                token: f.token.clone(),
                name: f.name.as_ref().to_string(),
                parameters: Vec::new(),
                argument_map: Vec::new(),
                mapped_parameters: Vec::new(),
                declarations: Vec::new(),
                statements: Vec::new(),
                scope,
            }));
            ctx.scope_mut(scope).try_add_symbol(f.name.as_ref(), instance, f.name.clone())?;
            Ok(vec![])
        }
        Declaration::TypeDef(t) => {
            ctx.scope_mut(scope).try_add_typedef(t.name.as_ref(), Typedef::Alias(t.target.name.clone()), t.name.clone())?;
            Ok(vec![])
        }
        Declaration::Generator(g) => elaborate_generator(ctx, g, scope),
        Declaration::Instance(inst) => {
            let entity = ctx
                .entities
                .get(inst.source.as_ref())
                .cloned()
                .ok_or_else(|| SemError::unknown_symbol(inst.source.as_ref(), &inst.source, None))?;
            let location = match &entity {
                Entity::Process(p) => elaborate_process_instance(ctx, p, &inst.parameter_map, scope)?,
                Entity::Network(n) => elaborate_network_instance(ctx, n, &inst.parameter_map, scope)?,
            };
            ctx.scope_mut(scope).try_add_symbol(inst.name.as_ref(), location, inst.name.clone())?;
            Ok(vec![location])
        }
        Declaration::Connect(connect) => {
            let mut out = Vec::new();
            for entry in &connect.entries {
                out.push(elaborate_connect_entry(ctx, entry, scope)?);
            }
            Ok(out)
        }
    }
}

fn elaborate_bus(ctx: &mut Context, bus: &BusDecl, scope: ScopeLocation) -> Result<InstanceLocation, SemError> {
    let shape = match &bus.typename {
        Some(type_name) => match resolve_type_name(ctx, scope, type_name)? {
            DataType::Bus(shape) => shape,
            other => return Err(SemError::bad_type(format!("{other:?}"), &type_name.name)),
        },
        None => {
            let mut signals = Vec::new();
            for signal in &bus.signals {
                let ty = resolve_type_name(ctx, scope, &signal.type_name)?;
                signals.push((signal.name.as_ref().to_string(), ty));
            }
            BusShape { signals }
        }
    };

    let bus_loc = ctx.add_instance(Instance::Bus(BusInstance {
        token: bus.token.clone(),
        name: bus.name.as_ref().to_string(),
        signals: Vec::new(),
        exposed: bus.exposed,
        unique: bus.unique,
        writer: None,
    }));

    let mut signal_locs = Vec::new();
    for (name, ty) in &shape.signals {
        let signal_token = bus
            .signals
            .iter()
            .find(|s| s.name.as_ref() == name.as_str())
            .map(|s| s.token.clone())
            .unwrap_or_else(|| bus.token.clone());
        let signal_loc = ctx.add_instance(Instance::Signal(SignalInstance {
            token: signal_token,
            name: name.clone(),
            bus: bus_loc,
            ty: ty.clone(),
        }));
        signal_locs.push(signal_loc);
    }
    if let Instance::Bus(b) = ctx.get_mut(bus_loc) {
        b.signals = signal_locs;
    }

    ctx.scope_mut(scope).try_add_symbol(bus.name.as_ref(), bus_loc, bus.name.clone())?;
    // A bus declaration doubles as its own shape: `parameter x: <bus name>`
    // resolves through the typedef chain to this shape, while the
    // declaration itself remains usable as a concrete instance by name.
    ctx.scope_mut(scope).try_add_typedef(bus.name.as_ref(), Typedef::Bus(shape), bus.name.clone())?;
    Ok(bus_loc)
}

fn elaborate_enum(ctx: &mut Context, e: &crate::ast::EnumDecl, scope: ScopeLocation) -> Result<InstanceLocation, SemError> {
    let enum_loc = ctx.add_instance(Instance::EnumType(EnumTypeInstance {
        token: e.token.clone(),
        name: e.name.as_ref().to_string(),
        fields: Vec::new(),
    }));

    let mut fields = Vec::new();
    let mut next_value = 0i64;
    for field in &e.fields {
        let value = field.value.unwrap_or(next_value);
        next_value = value + 1;
        let field_loc = ctx.add_instance(Instance::EnumField(EnumFieldInstance {
            token: field.token.clone(),
            name: field.name.as_ref().to_string(),
            parent: enum_loc,
            value,
        }));
        fields.push(field_loc);
    }
    if let Instance::EnumType(enum_instance) = ctx.get_mut(enum_loc) {
        enum_instance.fields = fields;
    }

    ctx.scope_mut(scope).try_add_symbol(e.name.as_ref(), enum_loc, e.name.clone())?;
    ctx.scope_mut(scope).try_add_typedef(e.name.as_ref(), Typedef::Enum(enum_loc), e.name.clone())?;
    Ok(enum_loc)
}

fn elaborate_generator(ctx: &mut Context, g: &GeneratorDecl, scope: ScopeLocation) -> Result<Vec<InstanceLocation>, SemError> {
    let from = eval_const_int(ctx, &g.from, scope)?;
    let to = eval_const_int(ctx, &g.to, scope)?;
    let mut out = Vec::new();
    // Iterations share the enclosing scope; the source language defines no
    // automatic per-iteration index suffixing, so a declaration name that
    // repeats across iterations is rejected by the ordinary duplicate
    // symbol check rather than silently shadowed.
    for _ in from..=to {
        for decl in &g.inner {
            out.extend(elaborate_declaration(ctx, decl, scope)?);
        }
    }
    Ok(out)
}

/// A minimal constant-folding evaluator for generator bounds and other
/// compile-time-integer contexts; shares its closure walk with constant
/// initializer verification (component E).
pub fn eval_const_int(ctx: &Context, expr: &ExpressionNode, scope: ScopeLocation) -> Result<i64, SemError> {
    eval_const_int_depth(ctx, expr, scope, 0)
}

/// Recursion ceiling for constant folding, guarding against a circular
/// constant initializer looping forever before the dedicated closure check
/// (component E) gets a chance to name the cycle precisely.
const MAX_FOLD_DEPTH: usize = 256;

fn eval_const_int_depth(ctx: &Context, expr: &ExpressionNode, scope: ScopeLocation, depth: usize) -> Result<i64, SemError> {
    if depth > MAX_FOLD_DEPTH {
        return Err(SemError::CircularInitializer { name: expr.token.as_ref().to_string(), at: expr.token.clone() });
    }
    match expr.kind.as_ref() {
        Expression::Literal(LiteralValue::Int(v)) => Ok(*v),
        Expression::Paren(inner) => eval_const_int_depth(ctx, inner, scope, depth + 1),
        Expression::Unary(u) => {
            let operand = eval_const_int_depth(ctx, &u.operand, scope, depth + 1)?;
            match u.operator {
                crate::ast::UnaryOperator::Neg => Ok(-operand),
                crate::ast::UnaryOperator::Pos => Ok(operand),
                crate::ast::UnaryOperator::BitNot => Ok(!operand),
                crate::ast::UnaryOperator::Not => Err(SemError::TypeMismatch {
                    message: "`!` is not valid in a constant integer expression".to_string(),
                    at: expr.token.clone(),
                }),
            }
        }
        Expression::Binary(b) => {
            let left = eval_const_int_depth(ctx, &b.left, scope, depth + 1)?;
            let right = eval_const_int_depth(ctx, &b.right, scope, depth + 1)?;
            match b.operator {
                BinaryOperator::Add => Ok(left + right),
                BinaryOperator::Sub => Ok(left - right),
                BinaryOperator::Mul => Ok(left * right),
                BinaryOperator::Div => Ok(left / right),
                BinaryOperator::Mod => Ok(left % right),
                _ => Err(SemError::TypeMismatch {
                    message: "operator is not valid in a constant integer expression".to_string(),
                    at: expr.token.clone(),
                }),
            }
        }
        Expression::Name(dotted) => {
            let location = find_dotted(ctx, scope, dotted)?;
            match ctx.get(location) {
                Instance::ConstantReference(c) => eval_const_int_depth(ctx, &c.initializer, scope, depth + 1),
                Instance::EnumField(f) => Ok(f.value),
                _ => Err(SemError::NonConstantInitializer { name: dotted.token.as_ref().to_string(), at: dotted.token.clone() }),
            }
        }
        _ => Err(SemError::NonConstantInitializer { name: expr.token.as_ref().to_string(), at: expr.token.clone() }),
    }
}

fn elaborate_network_instance(
    ctx: &mut Context,
    entity: &NetworkEntity,
    argument_map: &[ParameterMapEntry],
    parent_scope: ScopeLocation,
) -> Result<InstanceLocation, SemError> {
    ctx.enter_recursion(entity.name.as_ref(), &entity.token)?;
    let scope = ctx.create_scope(Some(parent_scope));

    let mut parameters = Vec::new();
    for parameter in &entity.parameters {
        parameters.push(elaborate_parameter(ctx, parameter, scope)?);
    }

    let location = ctx.add_instance(Instance::Network(NetworkInstance {
        token: entity.token.clone(),
        name: entity.name.as_ref().to_string(),
        parameters,
        argument_map: argument_map.to_vec(),
        mapped_parameters: Vec::new(),
        declarations: Vec::new(),
        scope,
    }));

    let mut declarations = Vec::new();
    for decl in &entity.declarations {
        declarations.extend(elaborate_declaration(ctx, decl, scope)?);
    }
    if let Instance::Network(n) = ctx.get_mut(location) {
        n.declarations = declarations;
    }

    ctx.exit_recursion();
    Ok(location)
}

fn elaborate_parameter(ctx: &mut Context, parameter: &Parameter, scope: ScopeLocation) -> Result<InstanceLocation, SemError> {
    let declared_type = match &parameter.type_name {
        Some(t) => Some(resolve_type_name(ctx, scope, t)?),
        None => None,
    };
    let location = ctx.add_instance(Instance::Parameter(ParameterInstance {
        token: parameter.token.clone(),
        name: parameter.name.clone(),
        direction: parameter.direction,
        inverse: parameter.inverse,
        declared_type,
    }));
    ctx.scope_mut(scope).try_add_symbol(parameter.name.as_ref(), location, parameter.name.clone())?;
    Ok(location)
}

fn elaborate_process_instance(
    ctx: &mut Context,
    entity: &ProcessEntity,
    argument_map: &[ParameterMapEntry],
    parent_scope: ScopeLocation,
) -> Result<InstanceLocation, SemError> {
    ctx.enter_recursion(entity.name.as_ref(), &entity.token)?;
    let scope = ctx.create_scope(Some(parent_scope));

    let mut parameters = Vec::new();
    for parameter in &entity.parameters {
        parameters.push(elaborate_parameter(ctx, parameter, scope)?);
    }

    let mut declarations = Vec::new();
    for decl in &entity.declarations {
        declarations.extend(elaborate_declaration(ctx, decl, scope)?);
    }

    elaborate_statements(ctx, &entity.statements, scope)?;

    let location = ctx.add_instance(Instance::Process(ProcessInstance {
        token: entity.token.clone(),
        name: entity.name.as_ref().to_string(),
        tag: ProcessTag::Normal,
        clocked: entity.clocked,
        parameters,
        argument_map: argument_map.to_vec(),
        mapped_parameters: Vec::new(),
        declarations,
        statements: entity.statements.clone(),
        scope,
        usage: Default::default(),
    }));

    ctx.exit_recursion();
    Ok(location)
}

/// Walks statements to register `for`-loop counters, nested scopes, and
/// function-call invocations, in source order.
fn elaborate_statements(ctx: &mut Context, statements: &[StatementNode], scope: ScopeLocation) -> Result<(), SemError> {
    for statement in statements {
        elaborate_statement(ctx, statement, scope)?;
    }
    Ok(())
}

fn elaborate_statement(ctx: &mut Context, statement: &StatementNode, scope: ScopeLocation) -> Result<(), SemError> {
    match &statement.kind {
        Statement::For(f) => {
            let from = eval_const_int(ctx, &f.from, scope)?;
            let to = eval_const_int(ctx, &f.to, scope)?;
            let loop_scope = ctx.create_scope(Some(scope));
            let counter = ctx.add_instance(Instance::Variable(VariableInstance {
                token: f.variable.clone(),
                name: f.variable.as_ref().to_string(),
                ty: Some(DataType::Signed(-1)),
                initializer: None,
            }));
            ctx.scope_mut(loop_scope).try_add_symbol(f.variable.as_ref(), counter, f.variable.clone())?;
            ctx.add_instance(Instance::ForLoop(ForLoopInstance {
                token: statement.token.clone(),
                counter,
                from,
                to,
            }));
            elaborate_statements(ctx, &f.body, loop_scope)?;
        }
        Statement::If(i) => {
            elaborate_statements(ctx, &i.then_body, scope)?;
            for (_, body) in &i.elifs {
                elaborate_statements(ctx, body, scope)?;
            }
            if let Some(body) = &i.else_body {
                elaborate_statements(ctx, body, scope)?;
            }
        }
        Statement::Switch(sw) => {
            for case in &sw.cases {
                elaborate_statements(ctx, &case.body, scope)?;
            }
        }
        Statement::Call(call) => {
            elaborate_call(ctx, call, scope)?;
        }
        _ => {}
    }
    Ok(())
}

/// Resolves a call target and clones its definition's declarations and
/// statements (with fresh [`crate::ast::AstIndex`] values) into a dedicated
/// invocation instance parented at `scope`, so implicit-cast bookkeeping for
/// one call site never leaks into another call of the same function.
fn elaborate_call(ctx: &mut Context, call: &crate::ast::CallStatement, scope: ScopeLocation) -> Result<InstanceLocation, SemError> {
    let name = call.name.segments[0].name.as_ref().to_string();
    let def = ctx
        .functions
        .get(&name)
        .cloned()
        .ok_or_else(|| SemError::unknown_symbol(&name, &call.name.token, None))?;

    let call_scope = ctx.create_scope(Some(scope));
    let mut parameters = Vec::new();
    for parameter in &def.parameters {
        parameters.push(elaborate_parameter(ctx, parameter, call_scope)?);
    }
    let mut declarations = Vec::new();
    for decl in &def.declarations {
        declarations.extend(elaborate_declaration(ctx, decl, call_scope)?);
    }
    let statements = reindex_statements(&ctx.clone_indexer, &def.statements);
    elaborate_statements(ctx, &statements, call_scope)?;

    let argument_map: Vec<ParameterMapEntry> = call
        .arguments
        .iter()
        .map(|value| ParameterMapEntry { token: value.token.clone(), name: None, value: value.clone() })
        .collect();

    Ok(ctx.add_instance(Instance::FunctionInvocation(FunctionInvocationInstance {
        token: call.name.token.clone(),
        name,
        parameters,
        argument_map,
        mapped_parameters: Vec::new(),
        declarations,
        statements,
        scope: call_scope,
    })))
}

fn elaborate_connect_entry(ctx: &mut Context, entry: &ConnectEntry, scope: ScopeLocation) -> Result<InstanceLocation, SemError> {
    let from = find_dotted(ctx, scope, &entry.from)?;
    let to = find_dotted(ctx, scope, &entry.to)?;

    let process = match (ctx.get(from).clone(), ctx.get(to).clone()) {
        (Instance::Signal(a), Instance::Signal(b)) => {
            synthesize_signal_connect(ctx, &entry.token, &a, from, &b, to, scope)?
        }
        (Instance::Bus(a), Instance::Bus(b)) => synthesize_bus_connect(ctx, &entry.token, &a, from, &b, to, scope)?,
        _ => return Err(SemError::IncompatibleConnect { at: entry.token.clone() }),
    };

    let connection = ctx.add_instance(Instance::Connection(ConnectionInstance {
        token: entry.token.clone(),
        from,
        to,
        process,
    }));
    Ok(connection)
}

fn synthesize_signal_connect(
    ctx: &mut Context,
    token: &Token,
    from: &SignalInstance,
    from_loc: InstanceLocation,
    to: &SignalInstance,
    to_loc: InstanceLocation,
    scope: ScopeLocation,
) -> Result<InstanceLocation, SemError> {
    let in_shape = BusShape { signals: vec![("value".to_string(), from.ty.clone())] };
    let out_shape = BusShape { signals: vec![("value".to_string(), to.ty.clone())] };
    synthesize_connect_process(ctx, token, in_shape, out_shape, from_loc, to_loc, scope)
}

fn synthesize_bus_connect(
    ctx: &mut Context,
    token: &Token,
    from: &BusInstance,
    from_loc: InstanceLocation,
    to: &BusInstance,
    to_loc: InstanceLocation,
    scope: ScopeLocation,
) -> Result<InstanceLocation, SemError> {
    let from_shape = bus_shape_of(ctx, from);
    let to_shape = bus_shape_of(ctx, to);
    let shared: Vec<(String, DataType)> = from_shape
        .signals
        .into_iter()
        .filter(|(name, _)| to_shape.get(name).is_some())
        .collect();
    if shared.is_empty() {
        return Err(SemError::IncompatibleConnect { at: token.clone() });
    }
    synthesize_connect_process(
        ctx,
        token,
        BusShape { signals: shared.clone() },
        BusShape { signals: shared },
        from_loc,
        to_loc,
        scope,
    )
}

/// Text for a synthetic `TypeName` token that resolves back to `ty` through
/// `resolve_type_name`: an intrinsic spelling, or an enum declaration's own
/// name for an enumeration type.
fn type_name_spelling(ctx: &Context, ty: &DataType) -> String {
    match ty {
        DataType::Enumeration(loc) => ctx.get(*loc).name().unwrap_or("int").to_string(),
        other => crate::sem::types::spelling(other),
    }
}

fn bus_shape_of(ctx: &Context, bus: &BusInstance) -> BusShape {
    let signals = bus
        .signals
        .iter()
        .filter_map(|loc| ctx.get(*loc).as_signal().map(|s| (s.name.clone(), s.ty.clone())))
        .collect();
    BusShape { signals }
}

/// Builds a `Connect`-tagged process with formal `in`/`out` bus parameters
/// matching `in_shape`/`out_shape`, one assignment per shared signal name
/// (wrapped in an explicit cast if the two sides' types differ), with
/// actual arguments wired to `from_loc`/`to_loc` so parameter wiring and
/// type assignment treat it exactly like a user-written instance (§4.D.1).
fn synthesize_connect_process(
    ctx: &mut Context,
    token: &Token,
    in_shape: BusShape,
    out_shape: BusShape,
    from_loc: InstanceLocation,
    to_loc: InstanceLocation,
    scope: ScopeLocation,
) -> Result<InstanceLocation, SemError> {
    let in_token = Token::new("in", token.line, token.column, token.offset, token.file.clone());
    let out_token = Token::new("out", token.line, token.column, token.offset, token.file.clone());

    let process_scope = ctx.create_scope(Some(scope));
    let in_param = ctx.add_instance(Instance::Parameter(ParameterInstance {
        token: in_token.clone(),
        name: in_token.clone(),
        direction: Direction::In,
        inverse: false,
        declared_type: Some(DataType::Bus(in_shape.clone())),
    }));
    let out_param = ctx.add_instance(Instance::Parameter(ParameterInstance {
        token: out_token.clone(),
        name: out_token.clone(),
        direction: Direction::Out,
        inverse: false,
        declared_type: Some(DataType::Bus(out_shape.clone())),
    }));
    ctx.scope_mut(process_scope).try_add_symbol("in", in_param, in_token.clone())?;
    ctx.scope_mut(process_scope).try_add_symbol("out", out_param, out_token.clone())?;

    let mut statements = Vec::new();
    for (name, out_ty) in &out_shape.signals {
        let Some(in_ty) = in_shape.get(name) else { continue };
        let name_token = Token::new(name.clone(), token.line, token.column, token.offset, token.file.clone());
        let value = ExpressionNode::new(
            ctx.clone_indexer.next(),
            name_token.clone(),
            Expression::Name(DottedName {
                token: name_token.clone(),
                segments: vec![
                    NameSegment { name: in_token.clone(), index: None },
                    NameSegment { name: name_token.clone(), index: None },
                ],
            }),
        );
        let value = if crate::sem::types::types_equal(in_ty, out_ty) {
            value
        } else {
            let type_token = Token::new(type_name_spelling(ctx, out_ty), token.line, token.column, token.offset, token.file.clone());
            ExpressionNode::new(
                ctx.clone_indexer.next(),
                name_token.clone(),
                Expression::Cast(crate::ast::CastExpr {
                    target_type: crate::ast::TypeName { token: type_token.clone(), name: type_token },
                    source: value,
                }),
            )
        };
        statements.push(StatementNode {
            id: ctx.clone_indexer.next(),
            token: name_token.clone(),
            kind: Statement::Assignment(crate::ast::AssignmentStatement {
                target: DottedName {
                    token: name_token.clone(),
                    segments: vec![
                        NameSegment { name: out_token.clone(), index: None },
                        NameSegment { name: name_token.clone(), index: None },
                    ],
                },
                value,
            }),
        });
    }

    let argument_map = vec![
        ParameterMapEntry { token: token.clone(), name: None, value: name_expr_for(ctx, from_loc) },
        ParameterMapEntry { token: token.clone(), name: None, value: name_expr_for(ctx, to_loc) },
    ];

    let process = ctx.add_instance(Instance::Process(ProcessInstance {
        token: token.clone(),
        name: format!("$connect_{}$", token.offset),
        tag: ProcessTag::Connect,
        clocked: false,
        parameters: vec![in_param, out_param],
        argument_map,
        mapped_parameters: Vec::new(),
        declarations: Vec::new(),
        statements,
        scope: process_scope,
        usage: Default::default(),
    }));
    Ok(process)
}

/// Builds a bare name expression referring back to an already-resolved
/// instance, reusing its own token so parameter wiring re-resolves it
/// exactly as if the user had written it positionally.
fn name_expr_for(ctx: &mut Context, location: InstanceLocation) -> ExpressionNode {
    let token = ctx.get(location).token().clone();
    ExpressionNode::new(ctx.clone_indexer.next(), token.clone(), Expression::Name(DottedName::simple(token)))
}

/// Binds `cli_args` positionally to the top-level network's formals, each as
/// a string-literal argument carrying a synthetic token (same file, same
/// location as the network's own declaration: there is no real source text
/// to point at).
fn cli_argument_map(ctx: &mut Context, at: &Token, cli_args: &[String]) -> Vec<ParameterMapEntry> {
    cli_args
        .iter()
        .map(|value| {
            let token = Token::new(value.clone(), at.line, at.column, at.offset, at.file.clone());
            let expr = ExpressionNode::new(ctx.clone_indexer.next(), token.clone(), Expression::Literal(LiteralValue::Str(value.clone())));
            ParameterMapEntry { token: token.clone(), name: None, value: expr }
        })
        .collect()
}
