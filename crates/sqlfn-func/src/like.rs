//! `LIKE` / `NOT LIKE` over nullable values.
//!
//! Both operands NULL-propagate: if either side is NULL the result is NULL,
//! and `NOT LIKE` passes that NULL through instead of negating it. Non-null
//! operands must be TEXT.

use sqlfn_error::{Result, SqlFnError};
use sqlfn_types::{Truth, Value};

use crate::pattern::LikePattern;

/// `subject LIKE pattern`.
pub fn like(subject: &Value, pattern: &Value) -> Result<Value> {
    like_with_escape(subject, pattern, None)
}

/// `subject NOT LIKE pattern`.
pub fn not_like(subject: &Value, pattern: &Value) -> Result<Value> {
    like(subject, pattern).map(negate)
}

/// `subject LIKE pattern ESCAPE escape`.
pub fn like_with_escape(subject: &Value, pattern: &Value, escape: Option<char>) -> Result<Value> {
    if subject.is_null() || pattern.is_null() {
        return Ok(Value::Null);
    }
    let subject = text_operand(subject)?;
    let pattern = text_operand(pattern)?;
    let compiled = LikePattern::compile_with_escape(pattern, escape);
    Ok(Value::Boolean(compiled.matches(subject)))
}

/// Match `subject` against an already-compiled pattern.
pub fn like_compiled(subject: &Value, pattern: &LikePattern) -> Result<Value> {
    if subject.is_null() {
        return Ok(Value::Null);
    }
    let subject = text_operand(subject)?;
    Ok(Value::Boolean(pattern.matches(subject)))
}

/// Negate a `LIKE` result: booleans flip, NULL stays NULL.
pub fn negate(value: Value) -> Value {
    match Truth::from_value(&value) {
        Some(truth) => (!truth).into_value(),
        None => value,
    }
}

fn text_operand(value: &Value) -> Result<&str> {
    value
        .as_text()
        .ok_or_else(|| SqlFnError::type_mismatch("TEXT", value.type_name()))
}
