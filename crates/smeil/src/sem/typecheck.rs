//! Bottom-up expression typing, implicit-cast insertion, assignment
//! checking and usage-direction enforcement (component G).

use crate::{
    ast::{Direction, Expression, ExpressionNode, Statement, StatementNode},
    sem::{
        context::Context,
        error::SemError,
        instance::{Instance, InstanceLocation, Usage},
        params::{instance_type, literal_type},
        resolve::{find_dotted, find_symbol, resolve_type_name},
        scope::ScopeLocation,
        types::{can_cast, types_equal, width},
    },
};

/// Type-checks the body of every process and function invocation currently
/// elaborated, in arena order. Parameter wiring (F) must have already run so
/// that formal-parameter names resolve through their mapped bindings.
pub fn assign_types(ctx: &mut Context) -> Result<(), SemError> {
    let len = ctx.instances.len();
    for index in 0..len {
        let location = InstanceLocation(index);
        let (owner, scope, statements) = match ctx.get(location) {
            Instance::Process(p) => (location, p.scope, p.statements.clone()),
            Instance::FunctionInvocation(f) => (location, f.scope, f.statements.clone()),
            _ => continue,
        };
        for statement in &statements {
            typecheck_statement(ctx, owner, scope, statement)?;
        }
    }
    Ok(())
}

fn typecheck_statement(ctx: &mut Context, owner: InstanceLocation, scope: ScopeLocation, statement: &StatementNode) -> Result<(), SemError> {
    match &statement.kind {
        Statement::Assignment(a) => {
            let target = find_dotted(ctx, scope, &a.target)?;
            let target_ty = instance_type(ctx, target).ok_or_else(|| SemError::TypeMismatch {
                message: format!("`{}` is not assignable", a.target.token.as_ref()),
                at: a.target.token.clone(),
            })?;
            check_usage_direction(ctx, scope, &a.target, Usage::Write)?;
            mark_usage(ctx, owner, target, Usage::Write);

            let value_ty = typecheck_expr(ctx, owner, scope, &a.value)?;
            if !types_equal(&target_ty, &value_ty) {
                if !can_cast(&value_ty, &target_ty) {
                    return Err(SemError::TypeMismatch {
                        message: format!("cannot assign `{value_ty:?}` to `{target_ty:?}`"),
                        at: a.value.token.clone(),
                    });
                }
                if width(&value_ty) > width(&target_ty) && width(&target_ty) >= 0 {
                    return Err(SemError::PrecisionLoss { at: a.value.token.clone() });
                }
                ctx.record_implicit_cast(a.value.id, target_ty);
            }
            Ok(())
        }
        Statement::If(i) => {
            let cond_ty = typecheck_expr(ctx, owner, scope, &i.condition)?;
            require_bool(&cond_ty, &i.condition)?;
            for s in &i.then_body {
                typecheck_statement(ctx, owner, scope, s)?;
            }
            for (cond, body) in &i.elifs {
                let ty = typecheck_expr(ctx, owner, scope, cond)?;
                require_bool(&ty, cond)?;
                for s in body {
                    typecheck_statement(ctx, owner, scope, s)?;
                }
            }
            if let Some(body) = &i.else_body {
                for s in body {
                    typecheck_statement(ctx, owner, scope, s)?;
                }
            }
            Ok(())
        }
        Statement::For(f) => {
            for s in &f.body {
                typecheck_statement(ctx, owner, scope, s)?;
            }
            Ok(())
        }
        Statement::Switch(sw) => {
            let subject_ty = typecheck_expr(ctx, owner, scope, &sw.expression)?;
            for case in &sw.cases {
                if let Some(value) = &case.value {
                    let case_ty = typecheck_expr(ctx, owner, scope, value)?;
                    if !types_equal(&subject_ty, &case_ty) {
                        return Err(SemError::TypeMismatch {
                            message: "switch case value does not match the subject's type".to_string(),
                            at: value.token.clone(),
                        });
                    }
                }
                for s in &case.body {
                    typecheck_statement(ctx, owner, scope, s)?;
                }
            }
            Ok(())
        }
        Statement::Call(c) => {
            for argument in &c.arguments {
                typecheck_expr(ctx, owner, scope, argument)?;
            }
            Ok(())
        }
        Statement::Trace(t) => {
            for argument in &t.arguments {
                typecheck_expr(ctx, owner, scope, argument)?;
            }
            Ok(())
        }
        Statement::Assert(a) => {
            let ty = typecheck_expr(ctx, owner, scope, &a.condition)?;
            require_bool(&ty, &a.condition)
        }
        Statement::Break => Ok(()),
    }
}

fn require_bool(ty: &crate::sem::types::DataType, expr: &ExpressionNode) -> Result<(), SemError> {
    if matches!(ty, crate::sem::types::DataType::Bool) {
        Ok(())
    } else {
        Err(SemError::TypeMismatch { message: "expected a `bool` expression".to_string(), at: expr.token.clone() })
    }
}

fn typecheck_expr(
    ctx: &mut Context,
    owner: InstanceLocation,
    scope: ScopeLocation,
    expr: &ExpressionNode,
) -> Result<crate::sem::types::DataType, SemError> {
    let ty = typecheck_expr_kind(ctx, owner, scope, expr)?;
    ctx.record_type(expr.id, ty.clone());
    Ok(ty)
}

fn typecheck_expr_kind(
    ctx: &mut Context,
    owner: InstanceLocation,
    scope: ScopeLocation,
    expr: &ExpressionNode,
) -> Result<crate::sem::types::DataType, SemError> {
    use crate::sem::types::DataType;
    match expr.kind.as_ref() {
        Expression::Literal(value) => Ok(literal_type(value)),
        Expression::Name(dotted) => {
            let location = find_dotted(ctx, scope, dotted)?;
            check_usage_direction(ctx, scope, dotted, Usage::Read)?;
            mark_usage(ctx, owner, location, Usage::Read);
            instance_type(ctx, location).ok_or_else(|| SemError::TypeMismatch {
                message: format!("`{}` has no value type", dotted.token.as_ref()),
                at: dotted.token.clone(),
            })
        }
        Expression::Unary(u) => {
            let operand = typecheck_expr(ctx, owner, scope, &u.operand)?;
            match u.operator {
                crate::ast::UnaryOperator::Not => {
                    require_bool(&operand, &u.operand)?;
                    Ok(DataType::Bool)
                }
                _ => {
                    if !matches!(operand, DataType::Signed(_) | DataType::Unsigned(_) | DataType::Float(_)) {
                        return Err(SemError::TypeMismatch {
                            message: "expected a numeric expression".to_string(),
                            at: u.operand.token.clone(),
                        });
                    }
                    Ok(operand)
                }
            }
        }
        Expression::Binary(b) => {
            let left = typecheck_expr(ctx, owner, scope, &b.left)?;
            let right = typecheck_expr(ctx, owner, scope, &b.right)?;
            if b.operator.is_logical() {
                require_bool(&left, &b.left)?;
                require_bool(&right, &b.right)?;
                return Ok(DataType::Bool);
            }
            let unified = crate::sem::types::unify(&left, &right).ok_or_else(|| SemError::TypeMismatch {
                message: format!("`{left:?}` and `{right:?}` do not unify"),
                at: expr.token.clone(),
            })?;
            if b.operator.result_is_operand_type() {
                Ok(unified)
            } else {
                Ok(DataType::Bool)
            }
        }
        Expression::Paren(inner) => typecheck_expr(ctx, owner, scope, inner),
        Expression::Cast(c) => {
            let source = typecheck_expr(ctx, owner, scope, &c.source)?;
            let target = resolve_type_name(ctx, scope, &c.target_type)?;
            if !can_cast(&source, &target) {
                return Err(SemError::IncompatibleCast { at: expr.token.clone() });
            }
            Ok(target)
        }
    }
}

/// Checks that `usage` is legal for the formal parameter (if any) that
/// `dotted`'s first segment is bound to. Only the first segment carries
/// direction information: it is either a local declaration (no
/// restriction) or a mapped formal parameter (direction-restricted).
fn check_usage_direction(ctx: &Context, scope: ScopeLocation, dotted: &crate::ast::DottedName, usage: Usage) -> Result<(), SemError> {
    let first = &dotted.segments[0].name;
    let Ok(location) = find_symbol(ctx, scope, first) else { return Ok(()) };
    let Instance::MappedParameter(mapped) = ctx.get(location) else { return Ok(()) };
    let Some(formal) = ctx.get(mapped.formal).as_parameter() else { return Ok(()) };

    // An `inverse` parameter swaps which side of the connection is
    // considered the producer, so read/write legality swaps with it.
    let direction = match (formal.direction, formal.inverse) {
        (Direction::In, true) => Direction::Out,
        (Direction::Out, true) => Direction::In,
        (direction, _) => direction,
    };

    let illegal = match (direction, usage) {
        (Direction::In, Usage::Write) | (Direction::In, Usage::Both) => Some("write"),
        (Direction::Out, Usage::Read) | (Direction::Out, Usage::Both) => Some("read"),
        _ => None,
    };
    if let Some(direction) = illegal {
        return Err(SemError::IllegalSignalDirection {
            name: first.as_ref().to_string(),
            direction,
            at: first.clone(),
        });
    }
    Ok(())
}

fn mark_usage(ctx: &mut Context, owner: InstanceLocation, target: InstanceLocation, usage: Usage) {
    ctx.record_usage(owner, target, usage);
    if let Instance::Process(p) = ctx.get_mut(owner) {
        let entry = p.usage.entry(target).or_insert(usage);
        *entry = entry.merge(usage);
    }
}
