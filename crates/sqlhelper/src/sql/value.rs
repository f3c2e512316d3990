//! Value kinds accepted by the SQL builders.

use std::fmt;
use std::ops::{Range, RangeInclusive};

/// Literal SQL that is emitted as-is, never quoted or escaped (e.g. `sysdate`, `now()`).
///
/// Builder output still goes through [`check`](crate::sql::check), so an expression cannot
/// smuggle in a second statement or a comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr(String);

impl Expr {
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marker for "IS NOT NULL" in a condition map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NotNil;

/// The [`NotNil`] marker.
pub const NOT_NIL: NotNil = NotNil;

/// A `lo..hi` or `lo..=hi` bound in a condition map.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRange {
    pub start: Box<Value>,
    pub end: Box<Value>,
    /// `true` renders the upper bound with `<`, `false` with `<=`.
    pub exclusive: bool,
}

impl SqlRange {
    pub fn inclusive(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self {
            start: Box::new(start.into()),
            end: Box::new(end.into()),
            exclusive: false,
        }
    }

    pub fn exclusive(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self {
            start: Box::new(start.into()),
            end: Box::new(end.into()),
            exclusive: true,
        }
    }
}

/// A value in a condition map or data map.
///
/// Not every kind is valid everywhere: `NotNull`, `Range` and `List` only make sense as
/// conditions, and `Unsupported` is rejected by every builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    NotNull,
    Integer(i128),
    Float(f64),
    #[cfg(feature = "rust_decimal")]
    Decimal(rust_decimal::Decimal),
    Expr(Expr),
    Text(String),
    Range(SqlRange),
    List(Vec<Value>),
    /// A kind with no SQL rendering; carries the kind's name for the error message.
    Unsupported(String),
}

impl Value {
    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::NotNull => "not-null marker",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(_) => "decimal",
            Value::Expr(_) => "expression",
            Value::Text(_) => "string",
            Value::Range(_) => "range",
            Value::List(_) => "list",
            Value::Unsupported(kind) => kind.as_str(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Integer(v as i128)
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

// Widen through the shortest decimal text so `1.1f32` stays `1.1`.
impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.to_string().parse().unwrap_or_else(|_| f64::from(v)))
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for Value {
    fn from(v: rust_decimal::Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Expr> for Value {
    fn from(v: Expr) -> Self {
        Value::Expr(v)
    }
}

impl From<NotNil> for Value {
    fn from(_: NotNil) -> Self {
        Value::NotNull
    }
}

impl From<SqlRange> for Value {
    fn from(v: SqlRange) -> Self {
        Value::Range(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Range<T>> for Value {
    fn from(r: Range<T>) -> Self {
        Value::Range(SqlRange::exclusive(r.start, r.end))
    }
}

impl<T: Into<Value>> From<RangeInclusive<T>> for Value {
    fn from(r: RangeInclusive<T>) -> Self {
        let (start, end) = r.into_inner();
        Value::Range(SqlRange::inclusive(start, end))
    }
}
