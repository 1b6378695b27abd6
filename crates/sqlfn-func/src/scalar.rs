//! Scalar (row-level) function trait and the shared dispatch rule.
//!
//! Scalar functions compute one output value from a fixed list of input
//! values. They are stateless across rows: each invocation is independent.
//!
//! NULL handling and type checking are **not** the implementor's job.
//! [`invoke_checked`] applies one rule for every function:
//!
//! 1. the argument count must equal the signature's arity,
//! 2. any NULL argument short-circuits to NULL without calling `invoke`,
//! 3. every other argument must coerce to its declared parameter type.
//!
//! `invoke` therefore only ever sees non-null, type-correct arguments.
//!
//! # Send + Sync
//!
//! Functions are shared across evaluation threads via `Arc`, so
//! implementations must be thread-safe.
#![allow(clippy::unnecessary_literal_bound)]

use sqlfn_error::{Result, SqlFnError};
use sqlfn_types::{Value, ValueType};

/// Declared parameter and return types of a scalar function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// One declared type per parameter. Integer arguments are accepted
    /// where a Double is declared.
    pub params: &'static [ValueType],
    /// Type of every non-null result.
    pub returns: ValueType,
}

impl Signature {
    pub const fn new(params: &'static [ValueType], returns: ValueType) -> Self {
        Self { params, returns }
    }

    pub const fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A scalar (row-level) SQL function.
///
/// Stored in the [`FunctionRegistry`](crate::FunctionRegistry) as
/// `Arc<dyn ScalarFunction>`.
///
/// # Error Handling
///
/// Return [`SqlFnError::DomainError`] for mathematically undefined input
/// (e.g. `log2(0)`). Never return NULL to signal an error.
pub trait ScalarFunction: Send + Sync {
    /// Execute this function on non-null, type-checked arguments.
    fn invoke(&self, args: &[Value]) -> Result<Value>;

    /// Declared parameter and return types.
    fn signature(&self) -> Signature;

    /// The function name, used in error messages.
    fn name(&self) -> &str;

    /// Whether this function is deterministic (same inputs → same output).
    fn is_deterministic(&self) -> bool {
        true
    }

    /// The number of arguments this function accepts.
    fn num_args(&self) -> usize {
        self.signature().arity()
    }
}

/// Invoke `function` under the shared arity / NULL / type rule.
pub fn invoke_checked(function: &dyn ScalarFunction, args: &[Value]) -> Result<Value> {
    let signature = function.signature();
    if args.len() != signature.arity() {
        return Err(SqlFnError::WrongArgumentCount {
            name: function.name().to_owned(),
            expected: signature.arity(),
            actual: args.len(),
        });
    }
    if args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    for (arg, &declared) in args.iter().zip(signature.params) {
        let accepted = arg.value_type().is_some_and(|ty| ty.coerces_to(declared));
        if !accepted {
            return Err(SqlFnError::type_mismatch(
                declared.sql_name(),
                arg.type_name(),
            ));
        }
    }
    function.invoke(args)
}
