use rayon::prelude::*;
use sqlfn_error::Result;
use sqlfn_func::{FunctionRegistry, builtin_registry};
use sqlfn_types::Value;
use tracing::{debug, warn};

use crate::config::EvalConfig;
use crate::expr::Expr;
use crate::prepared::PreparedExpr;
use crate::query::{Query, ResultSet, RowError};
use crate::table::{Row, Schema, Table};

/// Binds expressions against a registry and runs queries over tables.
///
/// Holds no per-query state; one evaluator may run any number of queries,
/// concurrently if needed.
#[derive(Clone, Copy)]
pub struct Evaluator<'r> {
    registry: &'r FunctionRegistry,
    config: &'r EvalConfig,
}

impl Evaluator<'static> {
    /// Evaluator over the builtin registry with default settings, including
    /// any `SQLFN_PARALLEL_THRESHOLD` override.
    pub fn builtin() -> Self {
        Self::new(builtin_registry(), EvalConfig::global())
    }
}

impl Default for Evaluator<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'r> Evaluator<'r> {
    pub const fn new(registry: &'r FunctionRegistry, config: &'r EvalConfig) -> Self {
        Self { registry, config }
    }

    pub const fn registry(&self) -> &'r FunctionRegistry {
        self.registry
    }

    pub const fn config(&self) -> &'r EvalConfig {
        self.config
    }

    /// Bind `expr` to `schema`.
    ///
    /// Unknown columns, unknown functions and wrong argument counts are all
    /// reported here, before any row is touched.
    pub fn prepare(&self, expr: &Expr, schema: &Schema) -> Result<PreparedExpr> {
        let prepared = PreparedExpr::bind(expr, schema, self.registry)?;
        debug!(expr = %prepared, "expression prepared");
        Ok(prepared)
    }

    /// Run `query` over every row of `table`.
    ///
    /// Rows whose filter is not TRUE are skipped. In strict mode the first
    /// row error (in scan order) fails the query; otherwise domain errors are
    /// recorded per row in [`ResultSet::errors`] and the scan continues.
    pub fn execute(&self, table: &Table, query: &Query) -> Result<ResultSet> {
        let plan = Plan {
            projection: query
                .projection()
                .iter()
                .map(|p| self.prepare(&p.expr, table.schema()))
                .collect::<Result<Vec<_>>>()?,
            filter: query
                .filter()
                .map(|f| self.prepare(f, table.schema()))
                .transpose()?,
        };

        let parallel = self.config.should_parallelize(table.len());
        debug!(
            table = table.name(),
            rows = table.len(),
            parallel,
            "query started"
        );

        let outcomes: Vec<Result<Option<Vec<Value>>>> = if parallel {
            table.rows().par_iter().map(|row| plan.eval_row(row)).collect()
        } else {
            table.rows().iter().map(|row| plan.eval_row(row)).collect()
        };

        let mut result = ResultSet {
            columns: query.projection().iter().map(|p| p.alias.clone()).collect(),
            ..ResultSet::default()
        };
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(Some(values)) => result.rows.push(values),
                Ok(None) => {}
                Err(error) if !self.config.strict_batch && error.is_row_local() => {
                    warn!(table = table.name(), row = index, %error, "row skipped");
                    result.errors.push(RowError { row: index, error });
                }
                Err(error) => return Err(error),
            }
        }

        debug!(
            table = table.name(),
            rows_scanned = table.len(),
            rows_produced = result.rows.len(),
            row_errors = result.errors.len(),
            "query finished"
        );
        Ok(result)
    }
}

struct Plan {
    projection: Vec<PreparedExpr>,
    filter: Option<PreparedExpr>,
}

impl Plan {
    /// `None` when the filter rejects the row.
    fn eval_row(&self, row: &Row) -> Result<Option<Vec<Value>>> {
        let keep = match &self.filter {
            Some(filter) => filter.eval_truth(row)?.is_true(),
            None => true,
        };
        if !keep {
            return Ok(None);
        }
        self.projection
            .iter()
            .map(|p| p.eval(row))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}
