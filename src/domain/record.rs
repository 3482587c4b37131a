//! Record domain model
//!
//! A [`Record`] is one flat row produced by the data source: an ordered mapping
//! of column names to loosely-typed [`FieldValue`]s. Column order is the
//! source's order and is preserved so the tabular exports can reproduce it.
//! Records are read-only snapshots; nothing in the export path mutates them.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use std::fmt;

static NULL: FieldValue = FieldValue::Null;

/// A single loosely-typed column value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// SQL NULL, missing cell
    Null,
    /// Free text
    Text(String),
    /// Whole number
    Integer(i64),
    /// Decimal number
    Decimal(f64),
    /// Boolean flag
    Bool(bool),
    /// Calendar date
    Date(NaiveDate),
    /// Timestamp without zone
    DateTime(NaiveDateTime),
}

impl FieldValue {
    /// Null, or text that is empty after trimming
    pub fn is_absent(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text rendition used by the tabular exports and text formatters
    ///
    /// Null renders as the empty string, dates as `YYYY-MM-DD`.
    pub fn to_plain_string(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Decimal(d) => d.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// One flat row of clinical/administrative data
///
/// # Examples
///
/// ```
/// use bpa_export::domain::{FieldValue, Record};
///
/// let record = Record::new()
///     .with("cod_procedimento", "0301010064")
///     .with("quantidade", 2_i64)
///     .with("cid10", FieldValue::Null);
///
/// assert_eq!(record.len(), 3);
/// assert!(record.value("cid10").is_absent());
/// assert!(record.value("not_a_column").is_absent());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a column, keeping its original position on replace
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Looks up a column
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Looks up a column, treating a missing column as Null
    pub fn value(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&NULL)
    }

    /// Plain text of a column, empty when missing or Null
    pub fn text(&self, name: &str) -> String {
        self.value(name).to_plain_string()
    }

    /// First of several alias columns that holds a present value
    pub fn first_present(&self, names: &[&str]) -> &FieldValue {
        names
            .iter()
            .map(|name| self.value(name))
            .find(|v| !v.is_absent())
            .unwrap_or(&NULL)
    }

    /// Column names in source order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no columns
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
