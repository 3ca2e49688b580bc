//! Postfix (RPN) token programs.
//!
//! Computed columns and published-view expressions are declared as small
//! postfix programs in the schema documents. Three evaluators share one
//! token classification but nothing else:
//!
//! - [`rpn_to_sql`] composes a SQL expression string for view definitions;
//! - [`rpn_eval`] computes one immediate value (composite identifiers) from
//!   context-substituted tokens;
//! - [`rpn_eval_array`] derives a whole column from existing raw columns.
//!
//! The evaluators deliberately stay separate functions: their operand pop
//! orders and function vocabularies differ, and programs in existing
//! schema documents depend on those differences.

pub mod array;
pub mod error;
pub mod scalar;
pub mod sql;
pub mod token;

pub use array::rpn_eval_array;
pub use error::{ExprError, Result};
pub use scalar::{Value, rpn_eval, substitute_context};
pub use sql::rpn_to_sql;
pub use token::{Token, classify};
