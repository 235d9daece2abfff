//! Tree-walking evaluator.
//!
//! Two entry points, one per mode:
//!   * `run_planning` — project a single `reps`/`weight` target, nothing
//!     persisted.
//!   * `run_execution` — run the finish-day script and hand back the
//!     finished working copy of the state dictionary.
//!
//! Any failure aborts the whole run; the working copy is dropped with the
//! environment, so partial mutation is never observable.

use super::ast::{BinOp, Expr, Stmt, UnaryOp};
use super::env::{Environment, Value};
use super::error::EvalError;
use crate::model::program::ProgramState;
use crate::model::weight::Weight;

/// Which planning result the caller wants. Closed set on purpose: the two
/// script slots per set are the only planning targets that exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptTarget {
    Reps,
    Weight,
}

impl ScriptTarget {
    pub fn name(self) -> &'static str {
        match self {
            ScriptTarget::Reps => "reps",
            ScriptTarget::Weight => "weight",
        }
    }
}

/// Planning mode: run everything, then report the value last assigned to a
/// local named like the target, falling back to the last bare expression.
pub fn run_planning(
    stmts: &[Stmt],
    mut env: Environment<'_>,
    target: ScriptTarget,
) -> Result<Value, EvalError> {
    let mut last_expr = None;
    exec_block(stmts, &mut env, &mut last_expr)?;
    env.local(target.name())
        .or(last_expr)
        .ok_or(EvalError::MissingResult(target.name()))
}

/// Execution mode: run everything for its state effects and return the new
/// state dictionary.
pub fn run_execution(stmts: &[Stmt], mut env: Environment<'_>) -> Result<ProgramState, EvalError> {
    let mut last_expr = None;
    exec_block(stmts, &mut env, &mut last_expr)?;
    Ok(env.into_state())
}

fn exec_block(
    stmts: &[Stmt],
    env: &mut Environment<'_>,
    last_expr: &mut Option<Value>,
) -> Result<(), EvalError> {
    for stmt in stmts {
        exec_stmt(stmt, env, last_expr)?;
    }
    Ok(())
}

fn exec_stmt(
    stmt: &Stmt,
    env: &mut Environment<'_>,
    last_expr: &mut Option<Value>,
) -> Result<(), EvalError> {
    match stmt {
        Stmt::AssignState { name, value } => {
            let value = eval_expr(value, env)?;
            env.assign_state(name, value)
        }
        Stmt::AssignLocal { name, value } => {
            let value = eval_expr(value, env)?;
            env.assign_local(name, value);
            Ok(())
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let taken = match eval_expr(cond, env)? {
                Value::Bool(b) => b,
                other => {
                    return Err(EvalError::Arithmetic(format!(
                        "if condition must be a boolean, got a {}",
                        other.kind()
                    )));
                }
            };
            if taken {
                exec_block(then_branch, env, last_expr)
            } else if let Some(else_branch) = else_branch {
                exec_block(else_branch, env, last_expr)
            } else {
                Ok(())
            }
        }
        Stmt::Expr(expr) => {
            *last_expr = Some(eval_expr(expr, env)?);
            Ok(())
        }
    }
}

fn eval_expr(expr: &Expr, env: &mut Environment<'_>) -> Result<Value, EvalError> {
    match expr {
        Expr::Number { value, unit } => Ok(match unit {
            Some(unit) => Value::Weight(Weight::new(*value, *unit)),
            None => Value::Number(*value),
        }),
        Expr::Variable(name) => env.lookup_variable(name),
        Expr::StateRef(name) => env.lookup_state(name),
        Expr::SetBinding {
            field,
            exercise,
            set,
        } => {
            let index = match eval_expr(set, env)? {
                Value::Number(n) if n >= 0.0 && n.fract() == 0.0 => n as usize,
                other => {
                    return Err(EvalError::Arithmetic(format!(
                        "set index must be a whole number, got {other:?}"
                    )));
                }
            };
            env.lookup_set_binding(*field, exercise, index)
        }
        Expr::Unary(op, inner) => {
            let inner = eval_expr(inner, env)?;
            match (op, inner) {
                (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                (UnaryOp::Neg, Value::Weight(w)) => {
                    Ok(Value::Weight(Weight::new(-w.value, w.unit)))
                }
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (op, other) => Err(EvalError::Arithmetic(format!(
                    "cannot apply {op:?} to a {}",
                    other.kind()
                ))),
            }
        }
        Expr::Binary(op, lhs, rhs) => eval_binary(*op, lhs, rhs, env),
        Expr::Call { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(arg, env)?);
            }
            env.call_function(name, &values)
        }
    }
}

fn eval_binary(
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
    env: &mut Environment<'_>,
) -> Result<Value, EvalError> {
    // && and || short-circuit, so the rhs is only touched when needed.
    if matches!(op, BinOp::And | BinOp::Or) {
        let l = as_bool(op, eval_expr(lhs, env)?)?;
        return match (op, l) {
            (BinOp::And, false) => Ok(Value::Bool(false)),
            (BinOp::Or, true) => Ok(Value::Bool(true)),
            _ => Ok(Value::Bool(as_bool(op, eval_expr(rhs, env)?)?)),
        };
    }

    let l = eval_expr(lhs, env)?;
    let r = eval_expr(rhs, env)?;

    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => arith(op, l, r),
        BinOp::Eq | BinOp::NotEq => {
            if let (Value::Bool(a), Value::Bool(b)) = (l, r) {
                let eq = a == b;
                return Ok(Value::Bool(if op == BinOp::Eq { eq } else { !eq }));
            }
            let (a, b) = comparable(op, l, r)?;
            let eq = a == b;
            Ok(Value::Bool(if op == BinOp::Eq { eq } else { !eq }))
        }
        BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
            let (a, b) = comparable(op, l, r)?;
            Ok(Value::Bool(match op {
                BinOp::Lt => a < b,
                BinOp::LtEq => a <= b,
                BinOp::Gt => a > b,
                BinOp::GtEq => a >= b,
                _ => unreachable!(),
            }))
        }
        BinOp::And | BinOp::Or => unreachable!(),
    }
}

fn as_bool(op: BinOp, v: Value) -> Result<bool, EvalError> {
    match v {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::Arithmetic(format!(
            "{op:?} needs boolean operands, got a {}",
            other.kind()
        ))),
    }
}

/// `+ - * /` over numbers and weights. A weight on either side pins the
/// unit: the other side converts (weight) or scales the magnitude (number).
fn arith(op: BinOp, l: Value, r: Value) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => combine(op, a, b).map(Value::Number),
        (Value::Weight(a), Value::Weight(b)) => {
            let b = b.convert_to(a.unit);
            combine(op, a.value, b.value).map(|v| Value::Weight(Weight::new(v, a.unit)))
        }
        (Value::Weight(a), Value::Number(b)) => {
            combine(op, a.value, b).map(|v| Value::Weight(Weight::new(v, a.unit)))
        }
        (Value::Number(a), Value::Weight(b)) => {
            combine(op, a, b.value).map(|v| Value::Weight(Weight::new(v, b.unit)))
        }
        (l, r) => Err(EvalError::Arithmetic(format!(
            "cannot apply {op:?} to a {} and a {}",
            l.kind(),
            r.kind()
        ))),
    }
}

fn combine(op: BinOp, a: f64, b: f64) -> Result<f64, EvalError> {
    if op == BinOp::Div && b == 0.0 {
        return Err(EvalError::Arithmetic("division by zero".into()));
    }
    let out = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        _ => unreachable!(),
    };
    if !out.is_finite() {
        return Err(EvalError::Arithmetic(format!(
            "result of {op:?} is not a finite number"
        )));
    }
    Ok(out)
}

/// Normalise a comparison pair down to two magnitudes. Weights convert to
/// the left side's unit first.
fn comparable(op: BinOp, l: Value, r: Value) -> Result<(f64, f64), EvalError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        (Value::Weight(a), Value::Weight(b)) => Ok((a.value, b.convert_to(a.unit).value)),
        (Value::Weight(a), Value::Number(b)) => Ok((a.value, b)),
        (Value::Number(a), Value::Weight(b)) => Ok((a, b.value)),
        (l, r) => Err(EvalError::Arithmetic(format!(
            "cannot compare a {} and a {} with {op:?}",
            l.kind(),
            r.kind()
        ))),
    }
}
