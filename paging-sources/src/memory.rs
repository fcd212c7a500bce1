use crate::record::{Record, SortValue};
use error_stack::{Report, ResultExt};
use paging_core::{
    BlockingQuerySource, Direction, FetchRequest, QuerySource, SourceResult,
    resolve_default_sort_field,
};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("'{0}' is not a field of the record")]
    UnknownSortField(String),
    #[error("field '{0}' cannot be ordered")]
    UnorderableField(String),
}

/// A filter for an [`InMemorySource`].
pub struct Predicate<R>(Box<dyn Fn(&R) -> bool + Send + Sync>);

impl<R> Predicate<R> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Self(Box::new(predicate))
    }

    pub fn matches(&self, record: &R) -> bool {
        (self.0)(record)
    }
}

impl<R> Debug for Predicate<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Predicate")
    }
}

/// Serves records held in memory.
///
/// Sort columns are resolved through [`Record::sort_value`]. Without a sort
/// column the records are ordered by the record's default sort field, or kept
/// in insertion order when it has none.
#[derive(Debug)]
pub struct InMemorySource<R> {
    records: Arc<[R]>,
}

impl<R> Clone for InMemorySource<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<R> FromIterator<R> for InMemorySource<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<R: Record> InMemorySource<R> {
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
    {
        records.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn matching<'a>(
        &'a self,
        filter: Option<&'a Predicate<R>>,
    ) -> impl Iterator<Item = &'a R> + 'a {
        self.records
            .iter()
            .filter(move |r| filter.is_none_or(|f| f.matches(r)))
    }

    fn count_matching(&self, filter: Option<&Predicate<R>>) -> u64 {
        let count = self.matching(filter).count() as u64;
        trace!(count, filtered = filter.is_some(), "counted records");
        count
    }

    #[instrument(skip_all, fields(skip = request.skip, take = request.take))]
    fn window(&self, request: FetchRequest<'_, Predicate<R>>) -> SourceResult<Vec<R>, SourceError> {
        let matching = self.matching(request.filter);

        let order = match request.sort {
            Some(sort) => Some((orderable_field::<R>(&sort.column)?, sort.direction)),
            None => resolve_default_sort_field(R::FIELDS).map(|f| (f, Direction::Ascending)),
        };

        let ordered: Vec<&R> = match order {
            Some((field, direction)) => {
                debug!(field, ?direction, "ordering records");
                let mut keyed = matching
                    .map(|r| sort_key(r, field).map(|value| (value, r)))
                    .collect::<Result<Vec<_>, _>>()?;
                match direction {
                    Direction::Ascending => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
                    Direction::Descending => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
                }
                keyed.into_iter().map(|(_, r)| r).collect()
            }
            None => matching.collect(),
        };

        Ok(ordered
            .into_iter()
            .skip(usize::try_from(request.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(request.take).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

fn orderable_field<R: Record>(column: &str) -> SourceResult<&'static str, SourceError> {
    let field = R::field(column)
        .ok_or_else(|| Report::new(SourceError::UnknownSortField(column.to_string())))
        .attach_with(|| {
            format!(
                "known fields: {}",
                itertools::join(R::FIELDS.iter().map(|f| f.name), ", ")
            )
        })?;

    if field.kind.is_orderable() && field.mapped {
        Ok(field.name)
    } else {
        Err(Report::new(SourceError::UnorderableField(column.to_string())))
            .attach_with(|| format!("'{column}' is a {:?} field", field.kind))
    }
}

/// The value `record` orders by for a field listed as orderable. A listed field
/// the record cannot resolve makes the field unorderable.
fn sort_key<R: Record>(record: &R, field: &'static str) -> SourceResult<SortValue, SourceError> {
    record.sort_value(field).ok_or_else(|| {
        Report::new(SourceError::UnorderableField(field.to_string()))
            .attach(format!("'{field}' has no sort value"))
    })
}

impl<R: Record> QuerySource for InMemorySource<R> {
    type Record = R;
    type Filter = Predicate<R>;
    type Error = SourceError;

    async fn count(&self, filter: Option<&Self::Filter>) -> SourceResult<u64, SourceError> {
        Ok(self.count_matching(filter))
    }

    async fn fetch(
        &self,
        request: FetchRequest<'_, Self::Filter>,
    ) -> SourceResult<Vec<R>, SourceError> {
        self.window(request)
    }
}

impl<R: Record> BlockingQuerySource for InMemorySource<R> {
    type Record = R;
    type Filter = Predicate<R>;
    type Error = SourceError;

    fn count(&self, filter: Option<&Self::Filter>) -> SourceResult<u64, SourceError> {
        Ok(self.count_matching(filter))
    }

    fn fetch(&self, request: FetchRequest<'_, Self::Filter>) -> SourceResult<Vec<R>, SourceError> {
        self.window(request)
    }
}
