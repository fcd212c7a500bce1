//! Sorting requests and the field metadata collaborators use to pick a
//! default ordering.
//!
//! The core never maps a column name to a field itself. It only carries the
//! requested [`SortSpec`] through to the data source, which decides how the
//! name resolves. [`resolve_default_sort_field`] is offered to data sources that
//! need *some* stable order when the caller did not ask for one.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Copy, Clone, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            Direction::Descending
        } else {
            Direction::Ascending
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, Direction::Descending)
    }
}

/// A column name to order by and the direction to order in.
///
/// Deserializing a blank column fails. A `SortSpec` built by hand with a
/// blank column is ignored by [`PageQuery::sort`](crate::PageQuery::sort).
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq, Clone)]
pub struct SortSpec {
    pub column: String,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("sort column must not be blank")]
pub struct BlankSortColumn;

#[derive(Deserialize)]
struct RawSortSpec {
    column: String,
    #[serde(default)]
    direction: Direction,
}

impl<'de> Deserialize<'de> for SortSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawSortSpec::deserialize(deserializer)?;
        SortSpec::new(raw.column, raw.direction)
            .ok_or_else(|| serde::de::Error::custom(BlankSortColumn))
    }
}

impl SortSpec {
    /// Returns `None` when `column` is empty or only whitespace, meaning no
    /// ordering was requested.
    pub fn new(column: impl Into<String>, direction: Direction) -> Option<Self> {
        let column = column.into();
        if is_blank(&column) {
            None
        } else {
            Some(Self { column, direction })
        }
    }

    pub fn is_blank(&self) -> bool {
        is_blank(&self.column)
    }

    pub fn ascending(column: impl Into<String>) -> Option<Self> {
        Self::new(column, Direction::Ascending)
    }

    pub fn descending(column: impl Into<String>) -> Option<Self> {
        Self::new(column, Direction::Descending)
    }
}

fn is_blank(column: &str) -> bool {
    column.trim().is_empty()
}

/// The storage shape of a record field.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum FieldKind {
    Integer,
    Float,
    Boolean,
    Text,
    DateTime,
    Uuid,
    /// Nested records, collections and anything else without a natural order.
    Composite,
}

impl FieldKind {
    pub fn is_orderable(&self) -> bool {
        !matches!(self, FieldKind::Composite)
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Identifies the record.
    pub key: bool,
    /// `false` for computed fields that are not stored with the record.
    pub mapped: bool,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            key: false,
            mapped: true,
        }
    }

    pub const fn key(name: &'static str, kind: FieldKind) -> Self {
        Self {
            key: true,
            ..Self::new(name, kind)
        }
    }

    pub const fn not_mapped(self) -> Self {
        Self {
            mapped: false,
            ..self
        }
    }
}

/// Picks a field to order by when the caller did not specify one.
///
/// The key field wins. Otherwise the first mapped field with an orderable
/// kind is used.
pub fn resolve_default_sort_field(fields: &[FieldDescriptor]) -> Option<&'static str> {
    fields
        .iter()
        .find(|f| f.key)
        .or_else(|| {
            fields
                .iter()
                .find(|f| f.mapped && f.kind.is_orderable())
        })
        .map(|f| f.name)
}
