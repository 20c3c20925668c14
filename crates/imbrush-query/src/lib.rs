//! imbrush-query - Filter predicate AST
//!
//! This crate provides the structured representation of single-attribute
//! filter predicates synthesized from histogram bin selections:
//!
//! - **Range predicates**: `degree BETWEEN 20 AND 30`
//! - **Membership**: `category IN ("a", "b")`
//! - **Complements**: `NOT (category IN ("a", "b", "c"))`
//! - **Combinations**: OR/AND-composed mixtures of the above
//!
//! Predicates are plain data (serde-serializable, structurally comparable)
//! so that replaying the same bin selection produces an identical tree.

pub mod ast;
pub mod eval;
pub mod print;

pub use ast::*;
pub use eval::*;
pub use print::print;
