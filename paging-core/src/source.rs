//! The data-access side of pagination.
//!
//! A source knows how to count the records matching a filter and how to fetch
//! one window of them, ordered however the caller asked. How a filter or a sort
//! column is turned into a query is entirely up to the implementation.

use crate::sort::SortSpec;
use error_stack::Report;
use std::error::Error;
use std::sync::Arc;

pub type SourceResult<T, E> = Result<T, Report<E>>;

/// Everything a source needs to fetch one page of records.
#[derive(Debug)]
pub struct FetchRequest<'a, F> {
    pub filter: Option<&'a F>,
    pub sort: Option<&'a SortSpec>,
    pub skip: u64,
    pub take: u64,
}

impl<F> Clone for FetchRequest<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for FetchRequest<'_, F> {}

pub trait QuerySource {
    type Record: Send;
    type Filter: Send + Sync;
    type Error: Error + Send + Sync + 'static;

    /// Number of records matching `filter`, or every record when there is no
    /// filter.
    fn count(
        &self,
        filter: Option<&Self::Filter>,
    ) -> impl Future<Output = SourceResult<u64, Self::Error>> + Send;

    /// The records in `[skip, skip + take)` of the filtered and sorted set.
    /// A sort column the source cannot resolve is an error of the source.
    fn fetch(
        &self,
        request: FetchRequest<'_, Self::Filter>,
    ) -> impl Future<Output = SourceResult<Vec<Self::Record>, Self::Error>> + Send;
}

/// [`QuerySource`] for sources that answer without awaiting anything.
pub trait BlockingQuerySource {
    type Record;
    type Filter;
    type Error: Error + Send + Sync + 'static;

    fn count(&self, filter: Option<&Self::Filter>) -> SourceResult<u64, Self::Error>;

    fn fetch(
        &self,
        request: FetchRequest<'_, Self::Filter>,
    ) -> SourceResult<Vec<Self::Record>, Self::Error>;
}

impl<T> QuerySource for Arc<T>
where
    T: QuerySource + Send + Sync,
{
    type Record = T::Record;
    type Filter = T::Filter;
    type Error = T::Error;

    fn count(
        &self,
        filter: Option<&Self::Filter>,
    ) -> impl Future<Output = SourceResult<u64, Self::Error>> + Send {
        QuerySource::count(&**self, filter)
    }

    fn fetch(
        &self,
        request: FetchRequest<'_, Self::Filter>,
    ) -> impl Future<Output = SourceResult<Vec<Self::Record>, Self::Error>> + Send {
        QuerySource::fetch(&**self, request)
    }
}

impl<T> BlockingQuerySource for Arc<T>
where
    T: BlockingQuerySource,
{
    type Record = T::Record;
    type Filter = T::Filter;
    type Error = T::Error;

    fn count(&self, filter: Option<&Self::Filter>) -> SourceResult<u64, Self::Error> {
        BlockingQuerySource::count(&**self, filter)
    }

    fn fetch(
        &self,
        request: FetchRequest<'_, Self::Filter>,
    ) -> SourceResult<Vec<Self::Record>, Self::Error> {
        BlockingQuerySource::fetch(&**self, request)
    }
}
