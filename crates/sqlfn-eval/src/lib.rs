//! Row-level evaluation of scalar SQL expressions over in-memory tables.
//!
//! An [`Expr`] is bound once to a [`Schema`] by [`Evaluator::prepare`],
//! which resolves columns and functions up front, and the resulting
//! [`PreparedExpr`] is then evaluated per row. [`Evaluator::execute`] runs a
//! projection/filter [`Query`] over a whole [`Table`], switching to a rayon
//! scan for large tables.

pub mod config;
mod evaluator;
pub mod expr;
mod prepared;
pub mod query;
pub mod table;

pub use config::{EvalConfig, PARALLEL_THRESHOLD_ENV};
pub use evaluator::Evaluator;
pub use expr::{CompareOp, Expr};
pub use prepared::PreparedExpr;
pub use query::{Projection, Query, ResultSet, RowError};
pub use table::{Column, Row, Schema, Table};
