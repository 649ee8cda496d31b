//! Tree-walking evaluation of parsed templates.

use deck_syntax::{Arguments, BinaryOp, Expr, Literal, Node, Template, UnaryOp};
use smol_str::SmolStr;

use crate::error::TemplateError;
use crate::value::Value;

use super::functions::{apply_filter, call_function};
use super::{auto_cast, TemplateContext};

/// Variable bound to the button's own entity id.
const ENTITY_ID_VAR: &str = "entity_id";

/// Evaluates a parsed template to its typed result.
///
/// A lone `{{ expr }}` keeps the expression's type; anything else is
/// rendered to text first. String results are trimmed and auto-cast.
pub(crate) fn evaluate_template(
    template: &Template,
    ctx: &TemplateContext<'_>,
) -> Result<Value, TemplateError> {
    let value = match template.single_expression() {
        Some(expr) => eval_expr(expr, ctx)?,
        None => {
            let mut out = String::new();
            render_nodes(&template.nodes, ctx, &mut out)?;
            Value::String(out)
        }
    };
    Ok(match value {
        Value::String(text) => auto_cast(text.trim()),
        other => other,
    })
}

fn render_nodes(
    nodes: &[Node],
    ctx: &TemplateContext<'_>,
    out: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Output(expr) => out.push_str(&eval_expr(expr, ctx)?.to_display_text()),
            Node::If {
                branches,
                otherwise,
            } => {
                let mut taken = None;
                for (condition, body) in branches {
                    if eval_expr(condition, ctx)?.is_truthy() {
                        taken = Some(body);
                        break;
                    }
                }
                render_nodes(taken.unwrap_or(otherwise), ctx, out)?;
            }
        }
    }
    Ok(())
}

/// Evaluated call arguments.
pub(crate) struct EvaluatedArgs {
    pub(crate) positional: Vec<Value>,
    pub(crate) keyword: Vec<(SmolStr, Value)>,
}

fn eval_args(args: &Arguments, ctx: &TemplateContext<'_>) -> Result<EvaluatedArgs, TemplateError> {
    let positional = args
        .positional
        .iter()
        .map(|expr| eval_expr(expr, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    let keyword = args
        .keyword
        .iter()
        .map(|(name, expr)| Ok((name.clone(), eval_expr(expr, ctx)?)))
        .collect::<Result<Vec<_>, TemplateError>>()?;
    Ok(EvaluatedArgs {
        positional,
        keyword,
    })
}

pub(crate) fn eval_expr(expr: &Expr, ctx: &TemplateContext<'_>) -> Result<Value, TemplateError> {
    match expr {
        Expr::Literal(literal) => Ok(match literal {
            Literal::None => Value::Null,
            Literal::Bool(value) => Value::Bool(*value),
            Literal::Int(value) => Value::Int(*value),
            Literal::Float(value) => Value::Float(*value),
            Literal::Str(text) => Value::String(text.to_string()),
        }),
        // Unknown names are lenient and evaluate to null.
        Expr::Name(name) => Ok(match (name.as_str(), ctx.entity_id) {
            (ENTITY_ID_VAR, Some(entity_id)) => Value::from(entity_id),
            _ => Value::Null,
        }),
        Expr::List(items) => items
            .iter()
            .map(|item| eval_expr(item, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        Expr::Call { function, args } => call_function(function, eval_args(args, ctx)?, ctx),
        Expr::Filter { value, name, args } => {
            let input = eval_expr(value, ctx)?;
            apply_filter(name, input, eval_args(args, ctx)?)
        }
        Expr::Unary { op, expr } => {
            let value = eval_expr(expr, ctx)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                UnaryOp::Neg => match value {
                    Value::Int(number) => number
                        .checked_neg()
                        .map(Value::Int)
                        .ok_or_else(|| type_error("integer overflow")),
                    Value::Float(number) => Ok(Value::Float(-number)),
                    other => Err(type_error(format!("cannot negate {}", other.type_name()))),
                },
            }
        }
        Expr::Binary { op, left, right } => eval_binary(*op, left, right, ctx),
        Expr::Conditional {
            condition,
            then,
            otherwise,
        } => {
            if eval_expr(condition, ctx)?.is_truthy() {
                eval_expr(then, ctx)
            } else {
                eval_expr(otherwise, ctx)
            }
        }
    }
}

fn type_error(message: impl Into<SmolStr>) -> TemplateError {
    TemplateError::Type(message.into())
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    ctx: &TemplateContext<'_>,
) -> Result<Value, TemplateError> {
    let lhs = eval_expr(left, ctx)?;
    match op {
        BinaryOp::Or if lhs.is_truthy() => return Ok(lhs),
        BinaryOp::And if !lhs.is_truthy() => return Ok(lhs),
        BinaryOp::Or | BinaryOp::And => return eval_expr(right, ctx),
        _ => {}
    }
    let rhs = eval_expr(right, ctx)?;
    match op {
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
        BinaryOp::NotEq => Ok(Value::Bool(!values_equal(&lhs, &rhs))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = compare(&lhs, &rhs).ok_or_else(|| {
                type_error(format!(
                    "cannot compare {} with {}",
                    lhs.type_name(),
                    rhs.type_name()
                ))
            })?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::LtEq => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
        BinaryOp::In => contains(&rhs, &lhs).map(Value::Bool),
        BinaryOp::Concat => Ok(Value::String(format!(
            "{}{}",
            lhs.to_display_text(),
            rhs.to_display_text()
        ))),
        BinaryOp::Add => match (lhs, rhs) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (Value::Sequence(mut a), Value::Sequence(b)) => {
                a.extend(b);
                Ok(Value::Sequence(a))
            }
            (a, b) => arithmetic(op, &a, &b),
        },
        _ => arithmetic(op, &lhs, &rhs),
    }
}

fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, TemplateError> {
    let mismatch = || {
        type_error(format!(
            "unsupported operand types for {}: {} and {}",
            op.symbol(),
            lhs.type_name(),
            rhs.type_name()
        ))
    };
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        let (a, b) = (*a, *b);
        // True division falls through to floats.
        let result = match op {
            BinaryOp::Add => Some(a.checked_add(b)),
            BinaryOp::Sub => Some(a.checked_sub(b)),
            BinaryOp::Mul => Some(a.checked_mul(b)),
            BinaryOp::Rem => {
                if b == 0 {
                    return Err(type_error("modulo by zero"));
                }
                Some(a.checked_rem(b).map(|rem| floor_rem(rem, b)))
            }
            _ => None,
        };
        if let Some(result) = result {
            return result
                .map(Value::Int)
                .ok_or_else(|| type_error("integer overflow"));
        }
    }
    let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
        return Err(mismatch());
    };
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(type_error("division by zero"));
            }
            a / b
        }
        BinaryOp::Rem => {
            if b == 0.0 {
                return Err(type_error("modulo by zero"));
            }
            let rem = a % b;
            if rem != 0.0 && (rem < 0.0) != (b < 0.0) {
                rem + b
            } else {
                rem
            }
        }
        _ => return Err(mismatch()),
    };
    if !result.is_finite() {
        return Err(type_error("float overflow"));
    }
    Ok(Value::Float(result))
}

/// Remainder carrying the sign of the divisor.
fn floor_rem(rem: i64, divisor: i64) -> i64 {
    if rem != 0 && (rem < 0) != (divisor < 0) {
        rem + divisor
    } else {
        rem
    }
}

/// Equality with integers and floats comparing by numeric value.
pub(crate) fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            lhs.as_f64() == rhs.as_f64()
        }
        _ => lhs == rhs,
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Option<std::cmp::Ordering> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => lhs.as_f64()?.partial_cmp(&rhs.as_f64()?),
    }
}

fn contains(container: &Value, item: &Value) -> Result<bool, TemplateError> {
    match container {
        Value::String(text) => item
            .as_str()
            .map(|needle| text.contains(needle))
            .ok_or_else(|| type_error("'in <string>' requires a string")),
        Value::Sequence(items) => Ok(items.iter().any(|candidate| values_equal(candidate, item))),
        Value::Mapping(map) => Ok(item.as_str().is_some_and(|key| map.contains_key(key))),
        other => Err(type_error(format!(
            "argument of type {} is not iterable",
            other.type_name()
        ))),
    }
}
