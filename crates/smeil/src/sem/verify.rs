//! Two independent checks that don't belong to elaboration, parameter
//! wiring or type assignment (component E):
//!
//! - [`verify_identifiers`] scans the raw AST, before any elaboration, for
//!   declared names that collide with a reserved keyword or intrinsic type
//!   spelling.
//! - [`verify_constant_initializers`] walks every elaborated constant's
//!   initializer, confirming it closes over literals, enum fields and other
//!   constants only, and has no self-reference or cycle.

use crate::{
    ast::{Declaration, Entity, Expression, ExpressionNode, Module, Statement, StatementNode},
    keywords,
    sem::{
        context::Context,
        error::SemError,
        instance::{Instance, InstanceLocation},
        resolve::find_dotted,
        scope::ScopeLocation,
    },
    token::Token,
};

pub fn verify_identifiers(module: &Module) -> Result<(), SemError> {
    for entity in &module.entities {
        check_token(entity.name())?;
        for parameter in entity.parameters() {
            check_token(&parameter.name)?;
        }
        for decl in entity.declarations() {
            check_declaration(decl)?;
        }
        if let Entity::Process(p) = entity {
            check_statements(&p.statements)?;
        }
    }
    for decl in &module.declarations {
        check_declaration(decl)?;
    }
    Ok(())
}

fn check_token(token: &Token) -> Result<(), SemError> {
    if keywords::is_reserved(token.as_ref()) {
        return Err(SemError::reserved_name(token.as_ref(), token));
    }
    Ok(())
}

fn check_declaration(decl: &Declaration) -> Result<(), SemError> {
    match decl {
        Declaration::Variable(v) => check_token(&v.name),
        Declaration::Constant(c) => check_token(&c.name),
        Declaration::Bus(b) => {
            check_token(&b.name)?;
            for signal in &b.signals {
                check_token(&signal.name)?;
            }
            Ok(())
        }
        Declaration::Enum(e) => {
            check_token(&e.name)?;
            for field in &e.fields {
                check_token(&field.name)?;
            }
            Ok(())
        }
        Declaration::Function(f) => {
            check_token(&f.name)?;
            for parameter in &f.parameters {
                check_token(&parameter.name)?;
            }
            for inner in &f.declarations {
                check_declaration(inner)?;
            }
            check_statements(&f.statements)
        }
        Declaration::Instance(i) => check_token(&i.name),
        Declaration::Generator(g) => {
            check_token(&g.name)?;
            for inner in &g.inner {
                check_declaration(inner)?;
            }
            Ok(())
        }
        Declaration::TypeDef(t) => check_token(&t.name),
        Declaration::Connect(_) => Ok(()),
    }
}

fn check_statements(statements: &[StatementNode]) -> Result<(), SemError> {
    for statement in statements {
        check_statement(statement)?;
    }
    Ok(())
}

fn check_statement(statement: &StatementNode) -> Result<(), SemError> {
    match &statement.kind {
        Statement::For(f) => {
            check_token(&f.variable)?;
            check_statements(&f.body)
        }
        Statement::If(i) => {
            check_statements(&i.then_body)?;
            for (_, body) in &i.elifs {
                check_statements(body)?;
            }
            if let Some(body) = &i.else_body {
                check_statements(body)?;
            }
            Ok(())
        }
        Statement::Switch(sw) => {
            for case in &sw.cases {
                check_statements(&case.body)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Classifies the reason an initializer's dependency closure does not
/// resolve to a constant-foldable value.
enum Fold {
    Ok,
    SelfReference,
    Circular,
    NonConstant(String, Token),
}

pub fn verify_constant_initializers(ctx: &Context) -> Result<(), SemError> {
    for (idx, instance) in ctx.instances.iter().enumerate() {
        if let Instance::ConstantReference(c) = instance {
            let origin = InstanceLocation(idx);
            let scope = owning_scope(ctx, origin);
            let mut visited = vec![origin];
            match walk_initializer(ctx, scope, &c.initializer, origin, &mut visited) {
                Fold::Ok => {}
                Fold::SelfReference => {
                    return Err(SemError::SelfReferenceInitializer { name: c.name.clone(), at: c.token.clone() })
                }
                Fold::Circular => return Err(SemError::CircularInitializer { name: c.name.clone(), at: c.token.clone() }),
                Fold::NonConstant(name, at) => return Err(SemError::NonConstantInitializer { name, at }),
            }
        }
    }
    Ok(())
}

/// The scope a constant's initializer resolves names in: the constant's own
/// declaring scope, so a local constant inside a network or process can
/// reference a sibling local constant, not just module-level ones.
fn owning_scope(ctx: &Context, constant: InstanceLocation) -> ScopeLocation {
    match ctx.get(constant) {
        Instance::ConstantReference(c) => c.scope,
        _ => ctx.module_scope,
    }
}

fn walk_initializer(
    ctx: &Context,
    scope: ScopeLocation,
    expr: &ExpressionNode,
    origin: InstanceLocation,
    visited: &mut Vec<InstanceLocation>,
) -> Fold {
    match expr.kind.as_ref() {
        Expression::Literal(_) => Fold::Ok,
        Expression::Paren(inner) => walk_initializer(ctx, scope, inner, origin, visited),
        Expression::Unary(u) => walk_initializer(ctx, scope, &u.operand, origin, visited),
        Expression::Cast(c) => walk_initializer(ctx, scope, &c.source, origin, visited),
        Expression::Binary(b) => match walk_initializer(ctx, scope, &b.left, origin, visited) {
            Fold::Ok => walk_initializer(ctx, scope, &b.right, origin, visited),
            other => other,
        },
        Expression::Name(dotted) => {
            let location = match find_dotted(ctx, scope, dotted) {
                Ok(loc) => loc,
                Err(_) => return Fold::NonConstant(dotted.token.as_ref().to_string(), dotted.token.clone()),
            };
            match ctx.get(location) {
                Instance::EnumField(_) => Fold::Ok,
                Instance::ConstantReference(c) => {
                    if location == origin {
                        // A direct self-reference is distinguished from a
                        // multi-constant cycle by whether any other
                        // constant was visited on the way back to origin.
                        return if visited.len() == 1 { Fold::SelfReference } else { Fold::Circular };
                    }
                    if visited.contains(&location) {
                        return Fold::Circular;
                    }
                    visited.push(location);
                    walk_initializer(ctx, scope, &c.initializer, origin, visited)
                }
                _ => Fold::NonConstant(dotted.token.as_ref().to_string(), dotted.token.clone()),
            }
        }
    }
}
