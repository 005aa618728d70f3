use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A spreadsheet row: column name → value.
///
/// Columns vary between tables and between years, so rows are kept as open
/// maps and the store reads the handful of columns it cares about by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// String value of `column`, if present and a string
    pub fn str_field(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(Value::as_str)
    }

    /// True only when `column` holds the boolean `true`. Truthy strings or
    /// numbers do not count.
    pub fn is_true(&self, column: &str) -> bool {
        matches!(self.0.get(column), Some(Value::Bool(true)))
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(column.into(), value.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Schedule rows sharing a time slot, in the order they were appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSlot {
    pub time: String,
    pub items: Vec<Record>,
}
