//! Parameter wiring: binds each process/network/function invocation's
//! actual arguments to its formal parameters, producing one
//! [`MappedParameterInstance`] per formal (component F).

use crate::{
    ast::{Expression, LiteralValue, ParameterMapEntry},
    sem::{
        context::Context,
        error::SemError,
        instance::{
            Instance, InstanceLocation, LiteralInstance, MappedParameterInstance, ParameterizedInstance,
        },
        resolve::find_dotted,
        scope::ScopeLocation,
        types::{can_cast, types_equal, width, DataType},
    },
    token::Token,
};

/// Wires every process, network and function invocation instance currently
/// in the arena. Safe to call once elaboration (D) has produced every
/// instance: the arena only grows, so iterating a snapshot of today's
/// length never misses or double-visits an instance.
pub fn wire_all_parameters(ctx: &mut Context) -> Result<(), SemError> {
    let len = ctx.instances.len();
    for index in 0..len {
        wire_parameters_at(ctx, InstanceLocation(index))?;
    }
    Ok(())
}

fn wire_parameters_at(ctx: &mut Context, location: InstanceLocation) -> Result<(), SemError> {
    let (formals, argument_map, scope) = match ctx.get(location) {
        Instance::Process(p) => (p.formals().to_vec(), p.argument_map().to_vec(), p.scope()),
        Instance::Network(n) => (n.formals().to_vec(), n.argument_map().to_vec(), n.scope()),
        Instance::FunctionInvocation(f) => (f.formals().to_vec(), f.argument_map().to_vec(), f.scope()),
        _ => return Ok(()),
    };

    let mapped = wire(ctx, &formals, &argument_map, scope)?;

    match ctx.get_mut(location) {
        Instance::Process(p) => p.set_mapped_parameters(mapped),
        Instance::Network(n) => n.set_mapped_parameters(mapped),
        Instance::FunctionInvocation(f) => f.set_mapped_parameters(mapped),
        _ => unreachable!("location was matched as parameterized above"),
    }
    Ok(())
}

/// Returns a `MappedParameterInstance` location per formal, in formal
/// declaration order.
fn wire(
    ctx: &mut Context,
    formals: &[InstanceLocation],
    argument_map: &[ParameterMapEntry],
    scope: ScopeLocation,
) -> Result<Vec<InstanceLocation>, SemError> {
    let mut assigned: Vec<Option<(ParameterMapEntry, Token)>> = vec![None; formals.len()];
    let mut seen_named = false;

    for entry in argument_map {
        match &entry.name {
            None => {
                if seen_named {
                    return Err(SemError::PositionalAfterNamed { at: entry.token.clone() });
                }
                let index = assigned.iter().position(|slot| slot.is_none()).ok_or_else(|| SemError::UnknownParameter {
                    name: "<extra positional argument>".to_string(),
                    at: entry.token.clone(),
                })?;
                assigned[index] = Some((entry.clone(), entry.token.clone()));
            }
            Some(name) => {
                seen_named = true;
                let index = formals
                    .iter()
                    .position(|formal| instance_name(ctx, *formal).as_deref() == Some(name.as_ref()))
                    .ok_or_else(|| SemError::UnknownParameter { name: name.as_ref().to_string(), at: name.clone() })?;
                if let Some((_, first)) = &assigned[index] {
                    return Err(SemError::DuplicateArgument {
                        name: name.as_ref().to_string(),
                        at: name.clone(),
                        first: first.clone(),
                    });
                }
                assigned[index] = Some((entry.clone(), name.clone()));
            }
        }
    }

    let mut mapped = Vec::with_capacity(formals.len());
    for (formal, slot) in formals.iter().zip(assigned.into_iter()) {
        let (entry, token) = slot.ok_or_else(|| SemError::MissingArgument {
            name: instance_name(ctx, *formal).unwrap_or_default(),
            at: token_of(ctx, *formal),
        })?;
        mapped.push(bind_one(ctx, *formal, &entry, &token, scope)?);
    }
    Ok(mapped)
}

fn bind_one(
    ctx: &mut Context,
    formal: InstanceLocation,
    entry: &ParameterMapEntry,
    token: &Token,
    scope: ScopeLocation,
) -> Result<InstanceLocation, SemError> {
    let (direction, inverse, declared_type, formal_name) = match ctx.get(formal) {
        Instance::Parameter(p) => (p.direction, p.inverse, p.declared_type.clone(), p.name.clone()),
        _ => unreachable!("formals are always Parameter instances"),
    };
    // `inverse` swaps which side is the producer, so a value-typed formal
    // only needs `out`'s bus-only restriction when its *effective* direction
    // (after the flip) is still `out`.
    let effective_direction = match (direction, inverse) {
        (crate::ast::Direction::In, true) => crate::ast::Direction::Out,
        (crate::ast::Direction::Out, true) => crate::ast::Direction::In,
        (direction, _) => direction,
    };

    let actual = resolve_argument(ctx, &entry.value, scope)?;
    let actual_type = instance_type(ctx, actual).ok_or_else(|| SemError::ArgumentTypeMismatch {
        name: formal_name.as_ref().to_string(),
        at: token.clone(),
        precision_loss: false,
    })?;

    if effective_direction == crate::ast::Direction::Out && !matches!(actual_type, DataType::Bus(_)) {
        return Err(SemError::OutValueParameter { name: formal_name.as_ref().to_string(), at: token.clone() });
    }

    let ty = match &declared_type {
        Some(declared) => {
            if !can_cast(declared, &actual_type) && !types_equal(declared, &actual_type) {
                return Err(SemError::ArgumentTypeMismatch {
                    name: formal_name.as_ref().to_string(),
                    at: token.clone(),
                    precision_loss: false,
                });
            }
            let precision_loss = width(&actual_type) < width(declared) && width(&actual_type) >= 0;
            if precision_loss {
                return Err(SemError::ArgumentTypeMismatch {
                    name: formal_name.as_ref().to_string(),
                    at: token.clone(),
                    precision_loss: true,
                });
            }
            declared.clone()
        }
        None => actual_type,
    };

    let mapped_loc = ctx.add_instance(Instance::MappedParameter(MappedParameterInstance {
        token: token.clone(),
        formal,
        actual,
        ty,
    }));
    ctx.scope_mut(scope).rebind_symbol(formal_name.as_ref(), mapped_loc, formal_name.clone());
    Ok(mapped_loc)
}

/// Only a bare name or a literal is accepted in argument position; anything
/// else (arithmetic, casts) would need its own constant-folding or
/// elaboration-time evaluation this pass doesn't perform.
fn resolve_argument(ctx: &mut Context, expr: &crate::ast::ExpressionNode, scope: ScopeLocation) -> Result<InstanceLocation, SemError> {
    match expr.kind.as_ref() {
        Expression::Name(dotted) => find_dotted(ctx, scope, dotted),
        Expression::Literal(value) => {
            let ty = literal_type(value);
            Ok(ctx.add_instance(Instance::Literal(LiteralInstance { token: expr.token.clone(), value: value.clone(), ty })))
        }
        _ => Err(SemError::UnsupportedArgumentExpr { at: expr.token.clone() }),
    }
}

pub(crate) fn literal_type(value: &LiteralValue) -> DataType {
    match value {
        LiteralValue::Bool(_) => DataType::Bool,
        LiteralValue::Int(_) => DataType::Signed(-1),
        LiteralValue::Float(_) => DataType::Float(-1),
        LiteralValue::Str(_) | LiteralValue::Special => DataType::Special,
    }
}

fn instance_name(ctx: &Context, location: InstanceLocation) -> Option<String> {
    ctx.get(location).name().map(str::to_string)
}

fn token_of(ctx: &Context, location: InstanceLocation) -> Token {
    ctx.get(location).token().clone()
}

/// The type a resolved instance contributes to an expression: a signal's,
/// variable's or constant's declared type, a bus's shape, an enum field's
/// owning enum, or (transparently) a mapped parameter's bound type. Shared
/// by parameter wiring and the type pass (component G).
pub fn instance_type(ctx: &Context, location: InstanceLocation) -> Option<DataType> {
    match ctx.get(location) {
        Instance::Signal(s) => Some(s.ty.clone()),
        Instance::Variable(v) => v.ty.clone(),
        Instance::ConstantReference(c) => c.ty.clone(),
        Instance::Parameter(p) => p.declared_type.clone(),
        Instance::MappedParameter(m) => Some(m.ty.clone()),
        Instance::Bus(_) => bus_type(ctx, location),
        Instance::EnumField(f) => Some(DataType::Enumeration(f.parent)),
        Instance::Literal(l) => Some(l.ty.clone()),
        _ => None,
    }
}

fn bus_type(ctx: &Context, location: InstanceLocation) -> Option<DataType> {
    let bus = ctx.get(location).as_bus()?;
    let signals = bus
        .signals
        .iter()
        .filter_map(|loc| ctx.get(*loc).as_signal().map(|s| (s.name.clone(), s.ty.clone())))
        .collect();
    Some(DataType::Bus(crate::sem::types::BusShape { signals }))
}
