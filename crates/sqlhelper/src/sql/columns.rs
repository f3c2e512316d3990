use super::value::Value;

/// Reserved key carrying the nested WHERE conditions of an `update` data map.
pub const WHERE_KEY: &str = "where";

/// An ordered mapping from column name to [`Value`].
///
/// Iteration order is insertion order, and the builders render columns in that order.
/// Inserting an existing column replaces its value in place.
///
/// Also carries the conditions stored under the reserved [`WHERE_KEY`], which only
/// [`update`](crate::sql::update) reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    entries: Vec<(String, Value)>,
    filter: Option<Box<Conditions>>,
}

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column (builder style).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Attach the conditions that `update` turns into its WHERE clause.
    pub fn filter(mut self, conds: impl Into<Conditions>) -> Self {
        self.filter = Some(Box::new(conds.into()));
        self
    }

    /// Insert a column, returning the previous value if the column was already present.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((column, value));
                None
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Remove a column, keeping the order of the rest.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(c, _)| c == column)?;
        Some(self.entries.remove(pos).1)
    }

    /// Detach the reserved WHERE conditions.
    pub fn take_filter(&mut self) -> Option<Conditions> {
        self.filter.take().map(|c| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Columns {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut columns = Columns::new();
        for (k, v) in iter {
            columns.insert(k, v);
        }
        columns
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Columns {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Build a [`Columns`] map with heterogeneous values.
///
/// ```ignore
/// use sqlhelper::{columns, sql};
///
/// let data = columns! { "a" => 1, "b" => "A's", "c" => None::<i32> };
/// let conds = columns! { "a" => sql::not_nil() };
/// ```
#[macro_export]
macro_rules! columns {
    () => {
        $crate::sql::Columns::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {
        $crate::sql::Columns::new()$(.with($column, $value))+
    };
}

/// Input to a WHERE clause: raw SQL text or a condition map.
#[derive(Debug, Clone, PartialEq)]
pub enum Conditions {
    /// Used verbatim (still safety-checked).
    Raw(String),
    /// Joined with ` and ` in the map's order.
    Map(Columns),
}

impl From<&str> for Conditions {
    fn from(s: &str) -> Self {
        Conditions::Raw(s.to_string())
    }
}

impl From<String> for Conditions {
    fn from(s: String) -> Self {
        Conditions::Raw(s)
    }
}

impl From<Columns> for Conditions {
    fn from(c: Columns) -> Self {
        Conditions::Map(c)
    }
}

/// Convert an input into optional [`Conditions`].
///
/// This is mainly for ergonomics in the builder functions: pass `None` for "no WHERE clause",
/// or a string / [`Columns`] / [`Conditions`] directly.
pub trait IntoConditions {
    fn into_conditions(self) -> Option<Conditions>;
}

impl IntoConditions for Conditions {
    fn into_conditions(self) -> Option<Conditions> {
        Some(self)
    }
}

impl IntoConditions for &Conditions {
    fn into_conditions(self) -> Option<Conditions> {
        Some(self.clone())
    }
}

impl IntoConditions for Option<Conditions> {
    fn into_conditions(self) -> Option<Conditions> {
        self
    }
}

impl IntoConditions for Columns {
    fn into_conditions(self) -> Option<Conditions> {
        Some(Conditions::Map(self))
    }
}

impl IntoConditions for &Columns {
    fn into_conditions(self) -> Option<Conditions> {
        Some(Conditions::Map(self.clone()))
    }
}

impl IntoConditions for &str {
    fn into_conditions(self) -> Option<Conditions> {
        Some(Conditions::Raw(self.to_string()))
    }
}

impl IntoConditions for String {
    fn into_conditions(self) -> Option<Conditions> {
        Some(Conditions::Raw(self))
    }
}
