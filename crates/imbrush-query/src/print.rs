//! Display text for predicates
//!
//! Renders a `QueryExpr` as user-facing filter text. The core engine only
//! consumes printing through its formatter seam; this is the default
//! implementation behind it.

use crate::ast::{BinaryOp, LiteralValue, QueryExpr};

/// Render a predicate as display text
pub fn print(expr: &QueryExpr) -> String {
    match expr {
        QueryExpr::Literal(lit) => print_literal(lit),
        QueryExpr::Identifier(name) => name.clone(),
        QueryExpr::List(values) => {
            let parts: Vec<String> = values.iter().map(print_literal).collect();
            format!("({})", parts.join(", "))
        }
        QueryExpr::Between { value, start, stop } => format!(
            "{} BETWEEN {} AND {}",
            print(value),
            print(start),
            print(stop)
        ),
        QueryExpr::Binary { op, left, right } => {
            let connective = matches!(op, BinaryOp::And | BinaryOp::Or);
            format!(
                "{} {} {}",
                print_operand(left, connective),
                op.as_str(),
                print_operand(right, connective)
            )
        }
        QueryExpr::Not(inner) => format!("NOT ({})", print(inner)),
    }
}

fn print_operand(expr: &QueryExpr, parenthesize_compound: bool) -> String {
    if parenthesize_compound && !expr.is_atomic() {
        format!("({})", print(expr))
    } else {
        print(expr)
    }
}

fn print_literal(lit: &LiteralValue) -> String {
    match lit {
        LiteralValue::Number(_) => lit.to_string(),
        LiteralValue::Text(s) => format!("\"{}\"", s.replace('"', "\\\"")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_between() {
        let expr = QueryExpr::between("degree", 20.0.into(), 30.0.into());
        assert_eq!(print(&expr), "degree BETWEEN 20 AND 30");
    }

    #[test]
    fn test_print_in_list() {
        let expr = QueryExpr::in_list("category", vec!["a".into(), "b".into()]);
        assert_eq!(print(&expr), "category IN (\"a\", \"b\")");
    }

    #[test]
    fn test_print_not() {
        let expr = QueryExpr::not(QueryExpr::in_list("category", vec!["a".into()]));
        assert_eq!(print(&expr), "NOT (category IN (\"a\"))");
    }

    #[test]
    fn test_print_or_parenthesizes_compounds() {
        let expr = QueryExpr::or(
            QueryExpr::between("x", 0.0.into(), 1.0.into()),
            QueryExpr::not(QueryExpr::field_eq("x", 5.0.into())),
        );
        assert_eq!(print(&expr), "x BETWEEN 0 AND 1 OR (NOT (x = 5))");
    }
}
