use std::cmp::Ordering;
use std::fmt;

use crate::ValueType;

/// A nullable, dynamically-typed scalar.
///
/// Values flow from table storage into expression evaluation and back into
/// result rows. `Null` carries no payload; every function and operator
/// special-cases it instead of evaluating on it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A 64-bit signed integer.
    Integer(i64),
    /// A 64-bit IEEE 754 floating-point number. Serialized as a number when
    /// finite, otherwise as `"NaN"`, `"Infinity"` or `"-Infinity"`.
    Double(#[serde(with = "double_repr")] f64),
    /// A UTF-8 text string.
    Text(String),
    /// A boolean.
    Boolean(bool),
}

impl Value {
    /// Returns the type tag of this value, or `None` for NULL.
    pub const fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Null => None,
            Self::Integer(_) => Some(ValueType::Integer),
            Self::Double(_) => Some(ValueType::Double),
            Self::Text(_) => Some(ValueType::Text),
            Self::Boolean(_) => Some(ValueType::Boolean),
        }
    }

    /// Returns true if this is a NULL value.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract a double, widening integers.
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Type name used in error messages: "NULL", "INTEGER", "DOUBLE",
    /// "TEXT" or "BOOLEAN".
    pub const fn type_name(&self) -> &'static str {
        match self.value_type() {
            Some(ty) => ty.sql_name(),
            None => "NULL",
        }
    }

    /// Compare two non-null values of compatible types.
    ///
    /// Returns `None` when either side is NULL, when the types cannot be
    /// compared (e.g. TEXT vs INTEGER), or for NaN. Integer/double pairs
    /// compare by exact numeric value, without rounding the integer.
    pub fn sql_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Double(b)) => cmp_int_double(*a, *b),
            (Self::Double(a), Self::Integer(b)) => cmp_int_double(*b, *a).map(Ordering::reverse),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Exact comparison of an integer with a double.
fn cmp_int_double(i: i64, d: f64) -> Option<Ordering> {
    // 2^63, the first double above i64::MAX.
    const I64_END: f64 = 9_223_372_036_854_775_808.0;
    if d.is_nan() {
        return None;
    }
    if d >= I64_END {
        return Some(Ordering::Less);
    }
    if d < -I64_END {
        return Some(Ordering::Greater);
    }
    let whole = d.trunc();
    // In range and integral, so the cast is exact.
    #[allow(clippy::cast_possible_truncation)]
    let whole_int = whole as i64;
    Some(i.cmp(&whole_int).then_with(|| {
        if d > whole {
            Ordering::Less
        } else if d < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }))
}

/// Serde representation of doubles that keeps NaN and the infinities,
/// which JSON numbers cannot express.
mod double_repr {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    const NAN: &str = "NaN";
    const INFINITY: &str = "Infinity";
    const NEG_INFINITY: &str = "-Infinity";

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str(NAN)
        } else if value.is_infinite() {
            let text = if *value > 0.0 { INFINITY } else { NEG_INFINITY };
            serializer.serialize_str(text)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(DoubleVisitor)
    }

    struct DoubleVisitor;

    impl Visitor<'_> for DoubleVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number, \"NaN\", \"Infinity\" or \"-Infinity\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                NAN => Ok(f64::NAN),
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Double(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn null_properties() {
        let v = Value::Null;
        assert!(v.is_null());
        assert_eq!(v.value_type(), None);
        assert_eq!(v.type_name(), "NULL");
        assert_eq!(v.to_string(), "NULL");
        assert_eq!(v.as_integer(), None);
        assert_eq!(v.as_double(), None);
    }

    #[test]
    fn integer_properties() {
        let v = Value::Integer(123);
        assert!(!v.is_null());
        assert_eq!(v.value_type(), Some(ValueType::Integer));
        assert_eq!(v.as_integer(), Some(123));
        assert_eq!(v.as_double(), Some(123.0));
        assert_eq!(v.to_string(), "123");
    }

    #[test]
    fn double_properties() {
        let v = Value::Double(12.34);
        assert_eq!(v.value_type(), Some(ValueType::Double));
        assert_eq!(v.as_double(), Some(12.34));
        assert_eq!(v.as_integer(), None);
        assert_eq!(v.type_name(), "DOUBLE");
    }

    #[test]
    fn text_and_bool_properties() {
        let v = Value::from("AbCdEf");
        assert_eq!(v.as_text(), Some("AbCdEf"));
        assert_eq!(v.to_string(), "'AbCdEf'");

        let b = Value::from(true);
        assert_eq!(b.as_bool(), Some(true));
        assert_eq!(b.to_string(), "TRUE");
        assert_eq!(Value::Boolean(false).to_string(), "FALSE");
    }

    #[test]
    fn option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(7_i64)), Value::Integer(7));
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_owned()));
    }

    #[test]
    fn null_is_distinct_from_every_variant() {
        for v in [
            Value::Integer(0),
            Value::Double(0.0),
            Value::Text(String::new()),
            Value::Boolean(false),
        ] {
            assert_ne!(v, Value::Null);
        }
    }

    #[test]
    fn sql_cmp_numeric_mixed() {
        assert_eq!(
            Value::Integer(3).sql_cmp(&Value::Double(3.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Double(2.5).sql_cmp(&Value::Integer(3)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn sql_cmp_integer_double_is_exact() {
        let big = Value::Integer(9_007_199_254_740_993);
        let near = Value::Double(9_007_199_254_740_992.0);
        assert_eq!(big.sql_cmp(&near), Some(Ordering::Greater));
        assert_eq!(near.sql_cmp(&big), Some(Ordering::Less));
        assert_eq!(
            Value::Integer(i64::MAX).sql_cmp(&Value::Double(9.223_372_036_854_775_808e18)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Integer(i64::MIN).sql_cmp(&Value::Double(-9.223_372_036_854_775_808e18)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Integer(-3).sql_cmp(&Value::Double(-3.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Integer(3).sql_cmp(&Value::Double(3.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Integer(0).sql_cmp(&Value::Double(f64::NEG_INFINITY)),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::Integer(0).sql_cmp(&Value::Double(f64::NAN)), None);
    }

    #[test]
    fn sql_cmp_incomparable() {
        assert_eq!(Value::Null.sql_cmp(&Value::Null), None);
        assert_eq!(Value::Integer(1).sql_cmp(&Value::from("1")), None);
        assert_eq!(Value::Double(f64::NAN).sql_cmp(&Value::Double(1.0)), None);
    }

    #[test]
    fn serde_keeps_non_finite_doubles() {
        let values = vec![
            Value::Double(f64::INFINITY),
            Value::Double(f64::NEG_INFINITY),
            Value::Double(1.5),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(
            json,
            r#"[{"Double":"Infinity"},{"Double":"-Infinity"},{"Double":1.5}]"#
        );
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);

        let nan: Value = serde_json::from_str(r#"{"Double":"NaN"}"#).unwrap();
        assert!(nan.as_double().unwrap().is_nan());
        let whole: Value = serde_json::from_str(r#"{"Double":2}"#).unwrap();
        assert_eq!(whole, Value::Double(2.0));
        assert!(serde_json::from_str::<Value>(r#"{"Double":"lots"}"#).is_err());
    }

    #[test]
    fn serde_round_trip() {
        let values = vec![
            Value::Null,
            Value::Integer(123),
            Value::Double(12.34),
            Value::from("AbCdEf"),
            Value::Boolean(true),
        ];
        let json = serde_json::to_string(&values).unwrap();
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}
