//! In-memory table fixture: schema, rows and type-checked insertion.

use serde::{Deserialize, Serialize};
use sqlfn_error::{Result, SqlFnError};
use sqlfn_types::{Value, ValueType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub ty: ValueType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Ordered column list. Column names are looked up case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Like [`Schema::index_of`], but fails with `NoSuchColumn`.
    pub fn resolve(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| SqlFnError::NoSuchColumn {
            name: name.trim().to_owned(),
        })
    }
}

/// One stored row. Values are positionally aligned with the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row.
    ///
    /// NULL is accepted in every column. Integers stored into a DOUBLE
    /// column are widened. Any other type disagreement is `TypeMismatch`,
    /// and a row of the wrong width is `WrongColumnCount`. Nothing is stored
    /// on error.
    pub fn insert(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.schema.len() {
            return Err(SqlFnError::WrongColumnCount {
                expected: self.schema.len(),
                actual: values.len(),
            });
        }
        let values = values
            .into_iter()
            .zip(self.schema.columns())
            .map(|(value, column)| store(value, column))
            .collect::<Result<Vec<_>>>()?;
        self.rows.push(Row::new(values));
        Ok(())
    }
}

fn store(value: Value, column: &Column) -> Result<Value> {
    let Some(ty) = value.value_type() else {
        return Ok(Value::Null);
    };
    if !ty.coerces_to(column.ty) {
        return Err(SqlFnError::type_mismatch(
            column.ty.sql_name(),
            value.type_name(),
        ));
    }
    match (column.ty, value.as_double()) {
        (ValueType::Double, Some(d)) => Ok(Value::Double(d)),
        _ => Ok(value),
    }
}
