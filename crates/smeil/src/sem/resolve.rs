//! Dotted-name resolution: walks the scope chain for the first segment,
//! then hops into the found instance's own children for each further
//! segment (component B's "scope registry" contract, realized directly
//! against the instance graph rather than a synthetic per-instance Scope).

use crate::{
    ast::DottedName,
    keywords,
    sem::{
        context::Context,
        error::SemError,
        instance::{Instance, InstanceLocation},
        scope::{find_symbol_in_chain, find_typedef_in_chain, suggest_symbol, ScopeLocation, Typedef},
        types::{parse_intrinsic, DataType},
    },
    token::Token,
};

pub fn find_dotted(ctx: &Context, scope: ScopeLocation, dotted: &DottedName) -> Result<InstanceLocation, SemError> {
    let first = &dotted.segments[0];
    let entry = find_symbol_in_chain(&ctx.scopes, scope, first.name.as_ref()).ok_or_else(|| {
        let suggestion = suggest_symbol(&ctx.scopes, scope, first.name.as_ref());
        SemError::unknown_symbol(first.name.as_ref(), &first.name, suggestion)
    })?;
    let mut current = entry.instance;
    for segment in &dotted.segments[1..] {
        current = lookup_child(ctx, current, segment.name.as_ref(), &segment.name)?;
    }
    Ok(current)
}

pub fn find_symbol(ctx: &Context, scope: ScopeLocation, name: &crate::token::Token) -> Result<InstanceLocation, SemError> {
    find_symbol_in_chain(&ctx.scopes, scope, name.as_ref())
        .map(|entry| entry.instance)
        .ok_or_else(|| {
            let suggestion = suggest_symbol(&ctx.scopes, scope, name.as_ref());
            SemError::unknown_symbol(name.as_ref(), name, suggestion)
        })
}

/// Resolves a type name in `scope`: intrinsic spellings short-circuit to a
/// built-in type, otherwise the typedef chain is walked with cycle
/// detection (component C).
pub fn resolve_type_name(ctx: &Context, scope: ScopeLocation, type_name: &crate::ast::TypeName) -> Result<DataType, SemError> {
    resolve_type_token(ctx, scope, &type_name.name, &mut Vec::new())
}

fn resolve_type_token(ctx: &Context, scope: ScopeLocation, token: &Token, visited: &mut Vec<String>) -> Result<DataType, SemError> {
    let name = token.as_ref();
    if keywords::is_intrinsic_type_name(name) {
        return parse_intrinsic(token);
    }
    if visited.iter().any(|seen| seen == name) {
        return Err(SemError::circular_type(name, token));
    }
    visited.push(name.to_string());

    let entry = find_typedef_in_chain(&ctx.scopes, scope, name).ok_or_else(|| SemError::bad_type(name, token))?;
    match &entry.typedef {
        Typedef::Enum(loc) => Ok(DataType::Enumeration(*loc)),
        Typedef::Bus(shape) => Ok(DataType::Bus(shape.clone())),
        Typedef::Alias(target) => resolve_type_token(ctx, scope, target, visited),
    }
}

fn lookup_child(ctx: &Context, parent: InstanceLocation, name: &str, at: &crate::token::Token) -> Result<InstanceLocation, SemError> {
    match ctx.get(parent) {
        Instance::Bus(bus) => bus
            .signals
            .iter()
            .find(|loc| ctx.get(**loc).name() == Some(name))
            .copied()
            .ok_or_else(|| SemError::unknown_symbol(name, at, None)),
        Instance::EnumType(e) => e
            .fields
            .iter()
            .find(|loc| ctx.get(**loc).name() == Some(name))
            .copied()
            .ok_or_else(|| SemError::unknown_symbol(name, at, None)),
        Instance::MappedParameter(mapped) => lookup_child(ctx, mapped.actual, name, at),
        _ => Err(SemError::unknown_symbol(name, at, None)),
    }
}
