//! Projection/filter queries and their results.

use serde::{Serialize, Serializer};
use sqlfn_error::{Result, SqlFnError};
use sqlfn_types::Value;

use crate::expr::Expr;

/// One output column: an expression and the name it is reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub alias: String,
    pub expr: Expr,
}

/// `SELECT <projection> FROM <table> [WHERE <filter>]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    projection: Vec<Projection>,
    filter: Option<Expr>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an output column named `alias`.
    #[must_use]
    pub fn select(mut self, alias: impl Into<String>, expr: Expr) -> Self {
        self.projection.push(Projection {
            alias: alias.into(),
            expr,
        });
        self
    }

    /// Append an output column named after its SQL rendering.
    #[must_use]
    pub fn select_expr(self, expr: Expr) -> Self {
        let alias = expr.to_string();
        self.select(alias, expr)
    }

    /// Set the `WHERE` clause. Rows are kept only where it is TRUE.
    #[must_use]
    pub fn with_filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn projection(&self) -> &[Projection] {
        &self.projection
    }

    pub fn filter(&self) -> Option<&Expr> {
        self.filter.as_ref()
    }
}

/// An error confined to a single row, recorded instead of failing the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// Index of the row in table scan order.
    pub row: usize,
    #[serde(serialize_with = "serialize_error")]
    pub error: SqlFnError,
}

fn serialize_error<S: Serializer>(
    error: &SqlFnError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Query output, rows in table scan order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub errors: Vec<RowError>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Value at (`row`, column `name`).
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let column = self.column_index(name)?;
        self.rows.get(row)?.get(column)
    }

    /// All values of column `name`, top to bottom.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let column = self.column_index(name)?;
        self.rows.iter().map(|r| r.get(column)).collect()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Serialize to JSON. Non-finite doubles are written as the strings
    /// `"NaN"`, `"Infinity"` and `"-Infinity"`.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SqlFnError::internal(e.to_string()))
    }
}
