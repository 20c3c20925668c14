//! Predicate evaluation against in-memory columns
//!
//! Evaluates a `QueryExpr` row by row, producing a boolean mask. Backs the
//! default highlight mask service; filter synthesis never depends on it.

use crate::ast::{BinaryOp, LiteralValue, QueryExpr};
use thiserror::Error;

/// Evaluation errors
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Expression cannot be evaluated as a predicate: {0}")]
    NotAPredicate(String),
}

/// Result type for evaluation
pub type EvalResult<T> = Result<T, EvalError>;

/// Context for evaluation - provides per-row attribute values
pub trait EvalContext {
    /// Number of rows in the dataset
    fn num_rows(&self) -> usize;

    /// Value of an attribute at a row, `None` for missing cells.
    /// Missing cells never match any predicate.
    fn value(&self, attribute: &str, row: usize) -> Option<LiteralValue>;
}

/// Evaluate a predicate over every row, returning a selection mask
pub fn evaluate_mask<C: EvalContext>(expr: &QueryExpr, ctx: &C) -> EvalResult<Vec<bool>> {
    let n = ctx.num_rows();
    let mut mask = vec![false; n];
    for (row, slot) in mask.iter_mut().enumerate() {
        *slot = evaluate_at(expr, ctx, row)?;
    }
    Ok(mask)
}

/// Evaluate a predicate at a single row
pub fn evaluate_at<C: EvalContext>(expr: &QueryExpr, ctx: &C, row: usize) -> EvalResult<bool> {
    match expr {
        QueryExpr::Between { value, start, stop } => {
            let v = match resolve_number(value, ctx, row)? {
                Some(v) => v,
                None => return Ok(false),
            };
            let start = require_number(start, ctx, row, "BETWEEN start")?;
            let stop = require_number(stop, ctx, row, "BETWEEN stop")?;
            Ok(start <= v && v < stop)
        }

        QueryExpr::Binary { op, left, right } => match op {
            BinaryOp::And => Ok(evaluate_at(left, ctx, row)? && evaluate_at(right, ctx, row)?),
            BinaryOp::Or => Ok(evaluate_at(left, ctx, row)? || evaluate_at(right, ctx, row)?),

            BinaryOp::In => {
                let lhs = match resolve(left, ctx, row)? {
                    Some(v) => v,
                    None => return Ok(false),
                };
                match right.as_ref() {
                    QueryExpr::List(values) => Ok(values.iter().any(|v| *v == lhs)),
                    other => Err(EvalError::TypeError(format!(
                        "IN requires a literal list, got {:?}",
                        other
                    ))),
                }
            }

            BinaryOp::Eq | BinaryOp::Ne => {
                let (lhs, rhs) = match (resolve(left, ctx, row)?, resolve(right, ctx, row)?) {
                    (Some(l), Some(r)) => (l, r),
                    _ => return Ok(false),
                };
                let equal = lhs == rhs;
                Ok(if *op == BinaryOp::Eq { equal } else { !equal })
            }

            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let (lhs, rhs) = match (
                    resolve_number(left, ctx, row)?,
                    resolve_number(right, ctx, row)?,
                ) {
                    (Some(l), Some(r)) => (l, r),
                    _ => return Ok(false),
                };
                op.compare(lhs, rhs)
                    .ok_or_else(|| EvalError::TypeError(format!("{} is not a comparison", op.as_str())))
            }
        },

        QueryExpr::Not(inner) => Ok(!evaluate_at(inner, ctx, row)?),

        other => Err(EvalError::NotAPredicate(format!("{:?}", other))),
    }
}

/// Resolve an operand to a literal value, `None` for missing cells
fn resolve<C: EvalContext>(
    expr: &QueryExpr,
    ctx: &C,
    row: usize,
) -> EvalResult<Option<LiteralValue>> {
    match expr {
        QueryExpr::Literal(lit) => Ok(Some(lit.clone())),
        QueryExpr::Identifier(name) => Ok(ctx.value(name, row)),
        other => Err(EvalError::NotAPredicate(format!(
            "expected literal or identifier, got {:?}",
            other
        ))),
    }
}

fn resolve_number<C: EvalContext>(
    expr: &QueryExpr,
    ctx: &C,
    row: usize,
) -> EvalResult<Option<f64>> {
    match resolve(expr, ctx, row)? {
        Some(LiteralValue::Number(n)) => Ok(Some(n)),
        Some(LiteralValue::Text(_)) | None => Ok(None),
    }
}

fn require_number<C: EvalContext>(
    expr: &QueryExpr,
    ctx: &C,
    row: usize,
    what: &str,
) -> EvalResult<f64> {
    resolve_number(expr, ctx, row)?
        .ok_or_else(|| EvalError::TypeError(format!("{} must be numeric", what)))
}

/// Get indices of selected rows
pub fn selected_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &b)| if b { Some(i) } else { None })
        .collect()
}
