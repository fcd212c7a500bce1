use chrono::{DateTime, Utc};
use paging_core::FieldDescriptor;
use std::cmp::Ordering;
use uuid::Uuid;

/// A value a record can be ordered by.
///
/// Values of different variants order by variant, so a column that mixes
/// kinds still sorts deterministically.
#[derive(Debug, Clone)]
pub enum SortValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
    /// A field that is optional and currently unset. Sorts first.
    Null,
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Null => 0,
            SortValue::Boolean(_) => 1,
            SortValue::Integer(_) => 2,
            SortValue::Float(_) => 3,
            SortValue::Text(_) => 4,
            SortValue::DateTime(_) => 5,
            SortValue::Uuid(_) => 6,
        }
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Integer(a), SortValue::Integer(b)) => a.cmp(b),
            (SortValue::Float(a), SortValue::Float(b)) => a.total_cmp(b),
            (SortValue::Boolean(a), SortValue::Boolean(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::DateTime(a), SortValue::DateTime(b)) => a.cmp(b),
            (SortValue::Uuid(a), SortValue::Uuid(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        SortValue::Integer(value)
    }
}

impl From<f64> for SortValue {
    fn from(value: f64) -> Self {
        SortValue::Float(value)
    }
}

impl From<bool> for SortValue {
    fn from(value: bool) -> Self {
        SortValue::Boolean(value)
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::Text(value.to_string())
    }
}

impl From<String> for SortValue {
    fn from(value: String) -> Self {
        SortValue::Text(value)
    }
}

impl From<DateTime<Utc>> for SortValue {
    fn from(value: DateTime<Utc>) -> Self {
        SortValue::DateTime(value)
    }
}

impl From<Uuid> for SortValue {
    fn from(value: Uuid) -> Self {
        SortValue::Uuid(value)
    }
}

impl<T> From<Option<T>> for SortValue
where
    T: Into<SortValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SortValue::Null)
    }
}

/// A record type an in-memory source can filter and order.
///
/// `FIELDS` describes the record's fields and `sort_value` resolves a field
/// name to the value to order by. Every mapped, orderable field in `FIELDS`
/// must resolve, an unset optional value resolves to [`SortValue::Null`].
/// Sorting by a listed field that resolves to `None` is an error.
pub trait Record: Clone + Send + Sync + 'static {
    const FIELDS: &'static [FieldDescriptor];

    fn sort_value(&self, field: &str) -> Option<SortValue>;

    fn field(name: &str) -> Option<&'static FieldDescriptor> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }
}
