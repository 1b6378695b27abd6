//! Trigonometric, hyperbolic and logarithmic functions.
//!
//! All take DOUBLE (INTEGER arguments are widened) and return DOUBLE.
//! Arguments outside a function's mathematical domain raise
//! [`SqlFnError::DomainError`] for that row instead of producing NaN.
//! Overflow to ±Inf is a valid DOUBLE result and propagates.
#![allow(clippy::unnecessary_literal_bound, clippy::float_cmp)]

use sqlfn_error::{Result, SqlFnError};
use sqlfn_types::{Value, ValueType};

use crate::scalar::Signature;
use crate::{FunctionRegistry, ScalarFunction};

const UNARY_DOUBLE: Signature = Signature::new(&[ValueType::Double], ValueType::Double);
const BINARY_DOUBLE: Signature =
    Signature::new(&[ValueType::Double, ValueType::Double], ValueType::Double);

// ── Helpers ───────────────────────────────────────────────────────────────

fn arg_f64(name: &str, args: &[Value], index: usize) -> Result<f64> {
    args.get(index)
        .and_then(Value::as_double)
        .ok_or_else(|| SqlFnError::internal(format!("{name}: argument {index} is not numeric")))
}

/// Wrap a result, reporting NaN from a non-NaN input as a domain error.
fn wrap(name: &str, x: f64, y: f64) -> Result<Value> {
    if y.is_nan() && !x.is_nan() {
        return Err(SqlFnError::domain(name, format!("undefined for {x}")));
    }
    Ok(Value::Double(y))
}

fn unary_math(name: &str, args: &[Value], f: fn(f64) -> f64) -> Result<Value> {
    let x = arg_f64(name, args, 0)?;
    wrap(name, x, f(x))
}

/// One-arg math with an explicit domain check.
fn unary_domain(
    name: &str,
    args: &[Value],
    domain: fn(f64) -> bool,
    requirement: &str,
    f: fn(f64) -> f64,
) -> Result<Value> {
    let x = arg_f64(name, args, 0)?;
    if !domain(x) {
        return Err(SqlFnError::domain(
            name,
            format!("argument {requirement}, got {x}"),
        ));
    }
    wrap(name, x, f(x))
}

// ── Trigonometric ─────────────────────────────────────────────────────────

pub struct CosFunc;

impl ScalarFunction for CosFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        unary_math("cos", args, f64::cos)
    }

    fn signature(&self) -> Signature {
        UNARY_DOUBLE
    }

    fn name(&self) -> &str {
        "cos"
    }
}

pub struct SinFunc;

impl ScalarFunction for SinFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        unary_math("sin", args, f64::sin)
    }

    fn signature(&self) -> Signature {
        UNARY_DOUBLE
    }

    fn name(&self) -> &str {
        "sin"
    }
}

pub struct TanFunc;

impl ScalarFunction for TanFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        unary_math("tan", args, f64::tan)
    }

    fn signature(&self) -> Signature {
        UNARY_DOUBLE
    }

    fn name(&self) -> &str {
        "tan"
    }
}

pub struct CotFunc;

impl ScalarFunction for CotFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        unary_domain(
            "cot",
            args,
            |x| x != 0.0,
            "must be non-zero",
            |x| x.tan().recip(),
        )
    }

    fn signature(&self) -> Signature {
        UNARY_DOUBLE
    }

    fn name(&self) -> &str {
        "cot"
    }
}

pub struct AcosFunc;

impl ScalarFunction for AcosFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        unary_domain(
            "acos",
            args,
            |x| (-1.0..=1.0).contains(&x),
            "must be between -1 and 1",
            f64::acos,
        )
    }

    fn signature(&self) -> Signature {
        UNARY_DOUBLE
    }

    fn name(&self) -> &str {
        "acos"
    }
}

pub struct AsinFunc;

impl ScalarFunction for AsinFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        unary_domain(
            "asin",
            args,
            |x| (-1.0..=1.0).contains(&x),
            "must be between -1 and 1",
            f64::asin,
        )
    }

    fn signature(&self) -> Signature {
        UNARY_DOUBLE
    }

    fn name(&self) -> &str {
        "asin"
    }
}

pub struct AtanFunc;

impl ScalarFunction for AtanFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        unary_math("atan", args, f64::atan)
    }

    fn signature(&self) -> Signature {
        UNARY_DOUBLE
    }

    fn name(&self) -> &str {
        "atan"
    }
}

pub struct Atan2Func;

impl ScalarFunction for Atan2Func {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        let y = arg_f64("atan2", args, 0)?;
        let x = arg_f64("atan2", args, 1)?;
        Ok(Value::Double(y.atan2(x)))
    }

    fn signature(&self) -> Signature {
        BINARY_DOUBLE
    }

    fn name(&self) -> &str {
        "atan2"
    }
}

// ── Hyperbolic ────────────────────────────────────────────────────────────

pub struct CoshFunc;

impl ScalarFunction for CoshFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        unary_math("cosh", args, f64::cosh)
    }

    fn signature(&self) -> Signature {
        UNARY_DOUBLE
    }

    fn name(&self) -> &str {
        "cosh"
    }
}

pub struct SinhFunc;

impl ScalarFunction for SinhFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        unary_math("sinh", args, f64::sinh)
    }

    fn signature(&self) -> Signature {
        UNARY_DOUBLE
    }

    fn name(&self) -> &str {
        "sinh"
    }
}

pub struct TanhFunc;

impl ScalarFunction for TanhFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        unary_math("tanh", args, f64::tanh)
    }

    fn signature(&self) -> Signature {
        UNARY_DOUBLE
    }

    fn name(&self) -> &str {
        "tanh"
    }
}

// ── Logarithmic ───────────────────────────────────────────────────────────

pub struct Log2Func;

impl ScalarFunction for Log2Func {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        unary_domain("log2", args, |x| x > 0.0, "must be positive", f64::log2)
    }

    fn signature(&self) -> Signature {
        UNARY_DOUBLE
    }

    fn name(&self) -> &str {
        "log2"
    }
}

// ── Registration ──────────────────────────────────────────────────────────

/// Register all math functions into the given registry.
pub fn register_math_builtins(registry: &mut FunctionRegistry) {
    // Trigonometric
    registry.register_scalar(CosFunc);
    registry.register_scalar(SinFunc);
    registry.register_scalar(TanFunc);
    registry.register_scalar(CotFunc);
    registry.register_scalar(AcosFunc);
    registry.register_scalar(AsinFunc);
    registry.register_scalar(AtanFunc);
    registry.register_scalar(Atan2Func);

    // Hyperbolic
    registry.register_scalar(CoshFunc);
    registry.register_scalar(SinhFunc);
    registry.register_scalar(TanhFunc);

    // Logarithmic
    registry.register_scalar(Log2Func);
}

// ── Tests ─────────────────────────────────────────────────────────────────
