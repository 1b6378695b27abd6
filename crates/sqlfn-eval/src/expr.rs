//! Unbound expression tree, as handed over by a planner.

use std::fmt;

use sqlfn_types::Value;

/// Comparison operators. All of them return NULL when either side is NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }

    pub(crate) fn test(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            Self::Eq => ordering == Equal,
            Self::NotEq => ordering != Equal,
            Self::Lt => ordering == Less,
            Self::LtEq => ordering != Greater,
            Self::Gt => ordering == Greater,
            Self::GtEq => ordering != Less,
        }
    }
}

/// A scalar expression over the columns of one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a column by name (case-insensitive).
    Column(String),
    /// A constant.
    Literal(Value),
    /// Scalar function call, resolved against the registry at bind time.
    Call { name: String, args: Vec<Expr> },
    /// `subject [NOT] LIKE pattern [ESCAPE 'c']`.
    Like {
        subject: Box<Expr>,
        pattern: Box<Expr>,
        escape: Option<char>,
        negated: bool,
    },
    /// Binary comparison.
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `expr IS [NOT] NULL`. Never NULL itself.
    IsNull { expr: Box<Expr>, negated: bool },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub const fn null() -> Self {
        Self::Literal(Value::Null)
    }

    pub fn call(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    /// `position(needle IN haystack)`.
    pub fn position(needle: Self, haystack: Self) -> Self {
        Self::call("position", vec![needle, haystack])
    }

    #[must_use]
    pub fn like(self, pattern: Self) -> Self {
        self.like_op(pattern, None, false)
    }

    #[must_use]
    pub fn not_like(self, pattern: Self) -> Self {
        self.like_op(pattern, None, true)
    }

    #[must_use]
    pub fn like_escape(self, pattern: Self, escape: char, negated: bool) -> Self {
        self.like_op(pattern, Some(escape), negated)
    }

    fn like_op(self, pattern: Self, escape: Option<char>, negated: bool) -> Self {
        Self::Like {
            subject: Box::new(self),
            pattern: Box::new(pattern),
            escape,
            negated,
        }
    }

    #[must_use]
    pub fn compare(self, op: CompareOp, other: Self) -> Self {
        Self::Compare {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, other: Self) -> Self {
        self.compare(CompareOp::Eq, other)
    }

    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(name) => f.write_str(name),
            Self::Literal(v) => write!(f, "{v}"),
            Self::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Self::Like {
                subject,
                pattern,
                escape,
                negated,
            } => {
                let op = if *negated { "NOT LIKE" } else { "LIKE" };
                write!(f, "{subject} {op} {pattern}")?;
                if let Some(c) = escape {
                    write!(f, " ESCAPE '{c}'")?;
                }
                Ok(())
            }
            Self::Compare { op, left, right } => write!(f, "({left} {} {right})", op.as_str()),
            Self::IsNull { expr, negated } => {
                let op = if *negated { "IS NOT NULL" } else { "IS NULL" };
                write!(f, "{expr} {op}")
            }
            Self::Not(e) => write!(f, "NOT {e}"),
            Self::And(l, r) => write!(f, "({l} AND {r})"),
            Self::Or(l, r) => write!(f, "({l} OR {r})"),
        }
    }
}
