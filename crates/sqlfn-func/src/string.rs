//! String functions: `lower`, `upper`, `position`.
#![allow(clippy::unnecessary_literal_bound)]

use sqlfn_error::{Result, SqlFnError};
use sqlfn_types::{Value, ValueType};

use crate::scalar::Signature;
use crate::{FunctionRegistry, ScalarFunction};

const TEXT_TO_TEXT: Signature = Signature::new(&[ValueType::Text], ValueType::Text);

fn arg_text<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a str> {
    args.get(index)
        .and_then(Value::as_text)
        .ok_or_else(|| SqlFnError::internal(format!("{name}: argument {index} is not text")))
}

// ── lower(X) / upper(X) ──────────────────────────────────────────────────

pub struct LowerFunc;

impl ScalarFunction for LowerFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        Ok(Value::Text(arg_text("lower", args, 0)?.to_lowercase()))
    }

    fn signature(&self) -> Signature {
        TEXT_TO_TEXT
    }

    fn name(&self) -> &str {
        "lower"
    }
}

pub struct UpperFunc;

impl ScalarFunction for UpperFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        Ok(Value::Text(arg_text("upper", args, 0)?.to_uppercase()))
    }

    fn signature(&self) -> Signature {
        TEXT_TO_TEXT
    }

    fn name(&self) -> &str {
        "upper"
    }
}

// ── position(NEEDLE IN HAYSTACK) ─────────────────────────────────────────

/// `position(needle IN haystack)`: 1-based character index of the first
/// occurrence of `needle`, or 0 when absent.
///
/// Comparison folds ASCII letters, so `position('bc' IN 'AbCdEf')` is 2.
/// An empty needle is found at position 1.
pub struct PositionFunc;

impl ScalarFunction for PositionFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        let needle = arg_text("position", args, 0)?;
        let haystack = arg_text("position", args, 1)?;
        let index = find_ascii_ci(needle, haystack).map_or(0, |i| i + 1);
        Ok(Value::Integer(i64::try_from(index).unwrap_or(i64::MAX)))
    }

    fn signature(&self) -> Signature {
        Signature::new(&[ValueType::Text, ValueType::Text], ValueType::Integer)
    }

    fn name(&self) -> &str {
        "position"
    }
}

/// Character index of the first ASCII-case-insensitive occurrence of
/// `needle` in `haystack`.
fn find_ascii_ci(needle: &str, haystack: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return Some(0);
    }
    let haystack: Vec<char> = haystack.chars().collect();
    haystack.windows(needle.len()).position(|window| {
        window
            .iter()
            .zip(&needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

// ── Registration ──────────────────────────────────────────────────────────

pub fn register_string_builtins(registry: &mut FunctionRegistry) {
    registry.register_scalar(LowerFunc);
    registry.register_scalar(UpperFunc);
    registry.register_scalar(PositionFunc);
}
