//! Core value types shared by the sqlfn crates.

use std::fmt;

pub mod truth;
pub mod value;

pub use truth::Truth;
pub use value::Value;

/// Type tag of a non-null [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ValueType {
    Integer,
    Double,
    Text,
    Boolean,
}

impl ValueType {
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Double => "DOUBLE",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
        }
    }

    /// Whether a value of this type may be stored in, or passed where, a
    /// `target` is declared. Integers widen into doubles; nothing else
    /// converts implicitly.
    pub const fn coerces_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Integer, Self::Integer | Self::Double)
                | (Self::Double, Self::Double)
                | (Self::Text, Self::Text)
                | (Self::Boolean, Self::Boolean)
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}
