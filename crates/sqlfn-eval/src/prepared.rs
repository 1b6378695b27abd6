//! Bound expressions: columns resolved to indices, functions resolved to
//! implementations, constant `LIKE` patterns compiled once.

use std::fmt;
use std::sync::Arc;

use sqlfn_error::{Result, SqlFnError};
use sqlfn_func::like::negate;
use sqlfn_func::{
    FunctionRegistry, LikePattern, ScalarFunction, invoke_checked, like_compiled, like_with_escape,
};
use sqlfn_types::{Truth, Value};

use crate::expr::{CompareOp, Expr};
use crate::table::{Row, Schema};

/// An expression ready to be evaluated against rows of one schema.
///
/// Immutable after binding, so one instance is shared by every worker of a
/// parallel scan.
#[derive(Debug, Clone)]
pub struct PreparedExpr {
    root: Node,
    text: String,
}

#[derive(Clone)]
enum Node {
    Column(usize),
    Literal(Value),
    Call {
        function: Arc<dyn ScalarFunction>,
        args: Vec<Node>,
    },
    Like {
        subject: Box<Node>,
        pattern: LikeOperand,
        negated: bool,
    },
    Compare {
        op: CompareOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    IsNull {
        operand: Box<Node>,
        negated: bool,
    },
    Not(Box<Node>),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
}

#[derive(Debug, Clone)]
enum LikeOperand {
    Compiled(LikePattern),
    Dynamic {
        pattern: Box<Node>,
        escape: Option<char>,
    },
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(i) => f.debug_tuple("Column").field(i).finish(),
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Self::Call { function, args } => f
                .debug_struct("Call")
                .field("function", &function.name())
                .field("args", args)
                .finish(),
            Self::Like {
                subject,
                pattern,
                negated,
            } => f
                .debug_struct("Like")
                .field("subject", subject)
                .field("pattern", pattern)
                .field("negated", negated)
                .finish(),
            Self::Compare { op, left, right } => f
                .debug_struct("Compare")
                .field("op", op)
                .field("left", left)
                .field("right", right)
                .finish(),
            Self::IsNull { operand, negated } => f
                .debug_struct("IsNull")
                .field("operand", operand)
                .field("negated", negated)
                .finish(),
            Self::Not(e) => f.debug_tuple("Not").field(e).finish(),
            Self::And(l, r) => f.debug_tuple("And").field(l).field(r).finish(),
            Self::Or(l, r) => f.debug_tuple("Or").field(l).field(r).finish(),
        }
    }
}

impl PreparedExpr {
    pub(crate) fn bind(expr: &Expr, schema: &Schema, registry: &FunctionRegistry) -> Result<Self> {
        Ok(Self {
            root: bind(expr, schema, registry)?,
            text: expr.to_string(),
        })
    }

    /// Evaluate against one row.
    pub fn eval(&self, row: &Row) -> Result<Value> {
        self.root.eval(row)
    }

    /// Evaluate as a predicate. NULL is `Unknown`; a non-boolean result is
    /// `TypeMismatch`.
    pub fn eval_truth(&self, row: &Row) -> Result<Truth> {
        truth(&self.root.eval(row)?)
    }

    /// SQL rendering of the source expression.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for PreparedExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn bind(expr: &Expr, schema: &Schema, registry: &FunctionRegistry) -> Result<Node> {
    let bind_box = |e: &Expr| bind(e, schema, registry).map(Box::new);
    Ok(match expr {
        Expr::Column(name) => Node::Column(schema.resolve(name)?),
        Expr::Literal(v) => Node::Literal(v.clone()),
        Expr::Call { name, args } => {
            let function = registry.resolve(name, args.len())?;
            let args = args
                .iter()
                .map(|a| bind(a, schema, registry))
                .collect::<Result<Vec<_>>>()?;
            Node::Call { function, args }
        }
        Expr::Like {
            subject,
            pattern,
            escape,
            negated,
        } => {
            let pattern = match pattern.as_ref() {
                Expr::Literal(Value::Text(text)) => {
                    LikeOperand::Compiled(LikePattern::compile_with_escape(text, *escape))
                }
                other => LikeOperand::Dynamic {
                    pattern: bind_box(other)?,
                    escape: *escape,
                },
            };
            Node::Like {
                subject: bind_box(subject)?,
                pattern,
                negated: *negated,
            }
        }
        Expr::Compare { op, left, right } => Node::Compare {
            op: *op,
            left: bind_box(left)?,
            right: bind_box(right)?,
        },
        Expr::IsNull { expr, negated } => Node::IsNull {
            operand: bind_box(expr)?,
            negated: *negated,
        },
        Expr::Not(e) => Node::Not(bind_box(e)?),
        Expr::And(l, r) => Node::And(bind_box(l)?, bind_box(r)?),
        Expr::Or(l, r) => Node::Or(bind_box(l)?, bind_box(r)?),
    })
}

impl Node {
    fn eval(&self, row: &Row) -> Result<Value> {
        match self {
            Self::Column(index) => row
                .get(*index)
                .cloned()
                .ok_or_else(|| SqlFnError::internal(format!("row has no column {index}"))),
            Self::Literal(v) => Ok(v.clone()),
            Self::Call { function, args } => {
                let args = args
                    .iter()
                    .map(|a| a.eval(row))
                    .collect::<Result<Vec<_>>>()?;
                invoke_checked(function.as_ref(), &args)
            }
            Self::Like {
                subject,
                pattern,
                negated,
            } => {
                let subject = subject.eval(row)?;
                let result = match pattern {
                    LikeOperand::Compiled(p) => like_compiled(&subject, p)?,
                    LikeOperand::Dynamic { pattern, escape } => {
                        like_with_escape(&subject, &pattern.eval(row)?, *escape)?
                    }
                };
                Ok(if *negated { negate(result) } else { result })
            }
            Self::Compare { op, left, right } => compare(*op, &left.eval(row)?, &right.eval(row)?),
            Self::IsNull { operand, negated } => {
                Ok(Value::Boolean(operand.eval(row)?.is_null() != *negated))
            }
            Self::Not(e) => Ok((!truth(&e.eval(row)?)?).into_value()),
            Self::And(l, r) => {
                let left = truth(&l.eval(row)?)?;
                if left == Truth::False {
                    return Ok(Value::Boolean(false));
                }
                Ok(left.and(truth(&r.eval(row)?)?).into_value())
            }
            Self::Or(l, r) => {
                let left = truth(&l.eval(row)?)?;
                if left == Truth::True {
                    return Ok(Value::Boolean(true));
                }
                Ok(left.or(truth(&r.eval(row)?)?).into_value())
            }
        }
    }
}

fn truth(value: &Value) -> Result<Truth> {
    Truth::from_value(value).ok_or_else(|| SqlFnError::type_mismatch("BOOLEAN", value.type_name()))
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<Value> {
    let (Some(lt), Some(rt)) = (left.value_type(), right.value_type()) else {
        return Ok(Value::Null);
    };
    if !(lt.coerces_to(rt) || rt.coerces_to(lt)) {
        return Err(SqlFnError::type_mismatch(lt.sql_name(), rt.sql_name()));
    }
    // NaN compares as unknown.
    Ok(left
        .sql_cmp(right)
        .map_or(Value::Null, |ordering| Value::Boolean(op.test(ordering))))
}
