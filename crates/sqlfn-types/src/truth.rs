//! Three-valued (Kleene) logic for SQL predicates.
//!
//! `Unknown` is what a NULL boolean means: it propagates through `NOT`,
//! short-circuits `AND`/`OR` only where the known side decides the result,
//! and never resolves to `True` or `False` on its own.

use std::fmt;

use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    /// Whether a `WHERE` clause keeps the row. Only `True` does; `Unknown`
    /// is excluded exactly like `False`.
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Unknown,
        }
    }

    /// Interpret a value as a truth value. NULL is `Unknown`; non-boolean
    /// values yield `None`.
    pub const fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Unknown),
            Value::Boolean(true) => Some(Self::True),
            Value::Boolean(false) => Some(Self::False),
            _ => None,
        }
    }

    pub const fn into_value(self) -> Value {
        match self {
            Self::True => Value::Boolean(true),
            Self::False => Value::Boolean(false),
            Self::Unknown => Value::Null,
        }
    }
}

impl std::ops::Not for Truth {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

impl From<bool> for Truth {
    fn from(b: bool) -> Self {
        if b { Self::True } else { Self::False }
    }
}

impl From<Option<bool>> for Truth {
    fn from(b: Option<bool>) -> Self {
        b.map_or(Self::Unknown, Self::from)
    }
}

impl From<Truth> for Value {
    fn from(t: Truth) -> Self {
        t.into_value()
    }
}

impl fmt::Display for Truth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Unknown => "UNKNOWN",
        })
    }
}
