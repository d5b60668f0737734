//! Structured key/value fields attached to log records

use std::fmt;
use std::time::Duration;

/// Value type for structured logging fields
///
/// A closed set of shapes. Anything richer is carried as a nested
/// [`FieldValue::Object`] or [`FieldValue::Array`], usually via the
/// `From<serde_json::Value>` conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    /// An error, rendered through its `Display` impl
    Error(String),
    Array(Vec<FieldValue>),
    /// Nested structure; member order is kept as given
    Object(Vec<Field>),
    Null,
}

impl FieldValue {
    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        FieldValue::Object(fields.into_iter().collect())
    }

    pub fn error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        FieldValue::Error(err.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Duration(d) => write!(f, "{:?}", d),
            FieldValue::Error(e) => write!(f, "{}", e),
            FieldValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            FieldValue::Object(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", field)?;
                }
                write!(f, "}}")
            }
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(i: $t) -> Self {
                    FieldValue::Int(i as i64)
                }
            }
        )*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(u: $t) -> Self {
                    FieldValue::Uint(u as u64)
                }
            }
        )*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f64::from(f))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Duration> for FieldValue {
    fn from(d: Duration) -> Self {
        FieldValue::Duration(d)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::Uint(u)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => FieldValue::String(s),
            Value::Array(items) => {
                FieldValue::Array(items.into_iter().map(FieldValue::from).collect())
            }
            Value::Object(map) => FieldValue::Object(
                map.into_iter()
                    .map(|(key, value)| Field::new(key, value))
                    .collect(),
            ),
        }
    }
}

/// A single key/value pair attached to one log record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Same as [`Field::new`]; reads better when the value type varies.
    pub fn any(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(key, value)
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, FieldValue::Int(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, FieldValue::Uint(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, FieldValue::Float(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, FieldValue::Duration(value))
    }

    /// Error under the conventional `error` key
    pub fn error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::named_error("error", err)
    }

    pub fn named_error<E: std::error::Error + ?Sized>(key: impl Into<String>, err: &E) -> Self {
        Self::new(key, FieldValue::error(err))
    }

    pub fn object(key: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> Self {
        Self::new(key, FieldValue::object(fields))
    }

    pub fn array<T: Into<FieldValue>>(key: impl Into<String>, items: impl IntoIterator<Item = T>) -> Self {
        Self::new(
            key,
            FieldValue::Array(items.into_iter().map(Into::into).collect()),
        )
    }

    pub fn null(key: impl Into<String>) -> Self {
        Self::new(key, FieldValue::Null)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> From<(K, V)> for Field {
    fn from((key, value): (K, V)) -> Self {
        Field::new(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_conversions() {
        assert_eq!(FieldValue::from(42i32), FieldValue::Int(42));
        assert_eq!(FieldValue::from(42u16), FieldValue::Uint(42));
        assert_eq!(FieldValue::from("x"), FieldValue::String("x".to_string()));
        assert_eq!(FieldValue::from(true), FieldValue::Bool(true));
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(1.5f64)), FieldValue::Float(1.5));
    }

    #[test]
    fn test_error_field_uses_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let field = Field::error(&io_err);
        assert_eq!(field.key, "error");
        assert_eq!(field.value, FieldValue::Error("no such file".to_string()));
    }

    #[test]
    fn test_from_json_value_nested() {
        let value = FieldValue::from(json!({
            "user": { "id": 7, "tags": ["a", "b"] },
            "ratio": 0.25,
            "missing": null
        }));

        let FieldValue::Object(fields) = value else {
            panic!("expected object");
        };
        assert_eq!(fields.len(), 3);
        let user = fields.iter().find(|f| f.key == "user").unwrap();
        match &user.value {
            FieldValue::Object(inner) => {
                assert_eq!(inner[0], Field::int("id", 7));
                assert_eq!(
                    inner[1].value,
                    FieldValue::Array(vec!["a".into(), "b".into()])
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_large_unsigned_from_json() {
        let value = FieldValue::from(json!(u64::MAX));
        assert_eq!(value, FieldValue::Uint(u64::MAX));
    }

    #[test]
    fn test_display() {
        let field = Field::object("req", [Field::string("method", "GET"), Field::int("status", 200)]);
        assert_eq!(field.to_string(), "req={method=GET status=200}");
        assert_eq!(Field::array("ids", [1, 2, 3]).to_string(), "ids=[1,2,3]");
    }

    #[test]
    fn test_tuple_into_field() {
        let field: Field = ("attempt", 3u8).into();
        assert_eq!(field, Field::uint("attempt", 3));
    }
}
