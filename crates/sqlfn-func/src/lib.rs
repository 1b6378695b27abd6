//! SQL `LIKE` matching and the scalar function registry.
//!
//! This crate provides:
//! - the `LIKE` pattern compiler and greedy backtracking matcher ([`LikePattern`])
//! - the `LIKE` / `NOT LIKE` operators over nullable values
//! - an open [`ScalarFunction`] trait and a [`FunctionRegistry`] that
//!   resolves functions by `(name, num_args)` and dispatches them under one
//!   shared NULL / type rule
//! - the builtin math and string functions, and a process-wide read-only
//!   registry holding them ([`builtin_registry`])
#![allow(clippy::unnecessary_literal_bound)]

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use sqlfn_error::{Result, SqlFnError};
use sqlfn_types::Value;
use tracing::debug;

pub mod like;
pub mod math;
pub mod pattern;
pub mod scalar;
pub mod string;

pub use like::{like, like_compiled, like_with_escape, not_like};
pub use math::register_math_builtins;
pub use pattern::{LikePattern, PatternToken};
pub use scalar::{ScalarFunction, Signature, invoke_checked};
pub use string::register_string_builtins;

/// Composite lookup key for functions: `(UPPERCASE name, num_args)`.
///
/// Names are stored as uppercase ASCII for case-insensitive matching.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct FunctionKey {
    /// Function name, stored as uppercase ASCII.
    pub name: String,
    /// Expected argument count.
    pub num_args: usize,
}

impl FunctionKey {
    /// Create a new function key with the name canonicalized to uppercase.
    #[must_use]
    pub fn new(name: &str, num_args: usize) -> Self {
        Self {
            name: canonical_name(name),
            num_args,
        }
    }
}

/// Registry for scalar functions, keyed by `(name, num_args)`.
///
/// Built once, then shared read-only (typically behind `Arc` or a
/// `'static` reference) by every evaluation thread.
#[derive(Default)]
pub struct FunctionRegistry {
    scalars: HashMap<FunctionKey, Arc<dyn ScalarFunction>>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every builtin function.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    /// Register a scalar function, keyed by `(name, num_args)`.
    ///
    /// Overwrites any existing function with the same key. Returns the
    /// previous function if one existed.
    pub fn register_scalar<F>(&mut self, function: F) -> Option<Arc<dyn ScalarFunction>>
    where
        F: ScalarFunction + 'static,
    {
        let key = FunctionKey::new(function.name(), function.num_args());
        self.scalars.insert(key, Arc::new(function))
    }

    /// Look up a scalar function by `(name, num_args)`.
    #[must_use]
    pub fn find_scalar(&self, name: &str, num_args: usize) -> Option<Arc<dyn ScalarFunction>> {
        let key = FunctionKey::new(name, num_args);
        let result = self.scalars.get(&key).map(Arc::clone);
        debug!(
            name = %key.name,
            arity = num_args,
            hit = result.is_some(),
            "registry lookup"
        );
        result
    }

    /// Resolve a call site to a function, distinguishing an unknown name
    /// from a known name called with the wrong number of arguments.
    pub fn resolve(&self, name: &str, num_args: usize) -> Result<Arc<dyn ScalarFunction>> {
        if let Some(f) = self.find_scalar(name, num_args) {
            return Ok(f);
        }
        let canon = canonical_name(name);
        match self.scalars.keys().find(|k| k.name == canon) {
            Some(other) => Err(SqlFnError::WrongArgumentCount {
                name: name.trim().to_owned(),
                expected: other.num_args,
                actual: num_args,
            }),
            None => Err(SqlFnError::unknown_function(name.trim())),
        }
    }

    /// Whether the registry contains any scalar function with this name
    /// (any arg count).
    #[must_use]
    pub fn contains_scalar(&self, name: &str) -> bool {
        let canon = canonical_name(name);
        self.scalars.keys().any(|k| k.name == canon)
    }

    /// Call `name` with a single argument.
    pub fn apply(&self, name: &str, arg: &Value) -> Result<Value> {
        self.apply_args(name, std::slice::from_ref(arg))
    }

    /// Call `name` with any number of arguments.
    pub fn apply_args(&self, name: &str, args: &[Value]) -> Result<Value> {
        let function = self.resolve(name, args.len())?;
        invoke_checked(function.as_ref(), args)
    }

    /// All registered keys, sorted by name then arity.
    pub fn keys(&self) -> Vec<FunctionKey> {
        let mut keys: Vec<FunctionKey> = self.scalars.keys().cloned().collect();
        keys.sort_by(|a, b| a.name.cmp(&b.name).then(a.num_args.cmp(&b.num_args)));
        keys
    }

    pub fn len(&self) -> usize {
        self.scalars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
    }
}

fn canonical_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

/// Register every builtin function.
pub fn register_builtins(registry: &mut FunctionRegistry) {
    register_math_builtins(registry);
    register_string_builtins(registry);
}

/// The process-wide builtin registry.
///
/// Initialized on first use and never mutated afterwards, so it can be read
/// from any number of threads without locking.
pub fn builtin_registry() -> &'static FunctionRegistry {
    static REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let registry = FunctionRegistry::with_builtins();
        debug!(functions = registry.len(), "builtin registry initialized");
        registry
    })
}

/// Call builtin function `name` with a single argument.
pub fn apply(name: &str, arg: &Value) -> Result<Value> {
    builtin_registry().apply(name, arg)
}

/// Call builtin function `name` with any number of arguments.
pub fn apply_args(name: &str, args: &[Value]) -> Result<Value> {
    builtin_registry().apply_args(name, args)
}
