//! Running a paginated query against a [`QuerySource`].
//!
//! [`PageQuery`] collects the optional parts of a request (filter, ordering
//! and a conversion of every record) and then runs the same steps for every
//! combination of them:
//!
//! 1. validate the page and the limit, failing before the source is touched
//! 2. count the matching records
//! 3. fetch the requested window, ordered when a sort column was given
//! 4. convert the fetched records if a conversion was set
//!
//! ```ignore
//! let page = PageQuery::new(Pagination::new(1, 25))
//!     .filter(Predicate::new(|p: &Person| p.firstname.contains("Joe")))
//!     .sort_by("firstname", Direction::Descending)
//!     .map(PersonView::from)
//!     .execute(&people)
//!     .await?;
//! ```

use crate::error::{PaginationError, PagingResult};
use crate::page::{PaginationResult, Window};
use crate::pagination::Pagination;
use crate::sort::{Direction, SortSpec};
use crate::source::{BlockingQuerySource, FetchRequest, QuerySource};
use crate::validation::validate_paging_parameters;
use error_stack::{Report, ResultExt};
use std::error::Error;
use tracing::{debug, instrument};

/// Records are returned as the source produced them.
#[derive(Debug, Copy, Clone, Default)]
pub struct Unmapped;

/// Every record goes through a synchronous conversion.
#[derive(Debug, Copy, Clone)]
pub struct Mapped<C>(C);

/// Every record goes through an asynchronous conversion. All conversions of a
/// page run concurrently.
#[derive(Debug, Copy, Clone)]
pub struct MappedAsync<C>(C);

/// Turns a page of source records into the page handed back to the caller.
pub trait PageMapper<R> {
    type Output;

    fn map_page(
        self,
        page: PaginationResult<R>,
    ) -> impl Future<Output = PagingResult<PaginationResult<Self::Output>>>;
}

pub trait BlockingPageMapper<R> {
    type Output;

    fn map_page_blocking(self, page: PaginationResult<R>) -> PaginationResult<Self::Output>;
}

impl<R> PageMapper<R> for Unmapped {
    type Output = R;

    async fn map_page(self, page: PaginationResult<R>) -> PagingResult<PaginationResult<R>> {
        Ok(page)
    }
}

impl<R> BlockingPageMapper<R> for Unmapped {
    type Output = R;

    fn map_page_blocking(self, page: PaginationResult<R>) -> PaginationResult<R> {
        page
    }
}

impl<R, D, C> PageMapper<R> for Mapped<C>
where
    C: FnMut(R) -> D,
{
    type Output = D;

    async fn map_page(self, page: PaginationResult<R>) -> PagingResult<PaginationResult<D>> {
        Ok(page.map_results(self.0))
    }
}

impl<R, D, C> BlockingPageMapper<R> for Mapped<C>
where
    C: FnMut(R) -> D,
{
    type Output = D;

    fn map_page_blocking(self, page: PaginationResult<R>) -> PaginationResult<D> {
        page.map_results(self.0)
    }
}

impl<R, D, C, Fut, E> PageMapper<R> for MappedAsync<C>
where
    C: Fn(R) -> Fut,
    Fut: Future<Output = Result<D, Report<E>>>,
    E: Error + Send + Sync + 'static,
{
    type Output = D;

    async fn map_page(self, page: PaginationResult<R>) -> PagingResult<PaginationResult<D>> {
        page.map_results_async(self.0).await
    }
}

/// A paginated query waiting to be run against a source.
///
/// `F` is the filter type of the source the query will run against.
#[derive(Debug, Clone)]
pub struct PageQuery<F, M = Unmapped> {
    pagination: Pagination,
    filter: Option<F>,
    sort: Option<SortSpec>,
    mapper: M,
}

impl<F> PageQuery<F, Unmapped> {
    pub fn new(pagination: Pagination) -> Self {
        Self {
            pagination,
            filter: None,
            sort: None,
            mapper: Unmapped,
        }
    }
}

impl<F, M> PageQuery<F, M> {
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn sort_spec(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Only records matching `filter` are counted and fetched.
    pub fn filter(mut self, filter: F) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Orders by `sort`. A blank column leaves the order to the source.
    pub fn sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort.filter(|s| !s.is_blank());
        self
    }

    /// Orders by `column`. An empty column leaves the order to the source.
    pub fn sort_by(self, column: impl Into<String>, direction: Direction) -> Self {
        self.sort(SortSpec::new(column, direction))
    }

    pub fn map<C>(self, convert: C) -> PageQuery<F, Mapped<C>> {
        self.with_mapper(Mapped(convert))
    }

    pub fn map_async<C>(self, convert: C) -> PageQuery<F, MappedAsync<C>> {
        self.with_mapper(MappedAsync(convert))
    }

    fn with_mapper<N>(self, mapper: N) -> PageQuery<F, N> {
        PageQuery {
            pagination: self.pagination,
            filter: self.filter,
            sort: self.sort,
            mapper,
        }
    }

    fn fetch_request(&self) -> FetchRequest<'_, F> {
        FetchRequest {
            filter: self.filter.as_ref(),
            sort: self.sort.as_ref(),
            skip: self.pagination.skip(),
            take: self.pagination.limit,
        }
    }

    #[instrument(
        skip_all,
        err(Debug),
        name = "page_query#execute",
        fields(page = self.pagination.page, limit = self.pagination.limit, sort = ?self.sort)
    )]
    pub async fn execute<S>(
        self,
        source: &S,
    ) -> PagingResult<PaginationResult<<M as PageMapper<S::Record>>::Output>>
    where
        S: QuerySource<Filter = F>,
        M: PageMapper<S::Record>,
    {
        validate_paging_parameters(self.pagination.page, self.pagination.limit)?;

        let total_items = QuerySource::count(source, self.filter.as_ref())
            .await
            .change_context(PaginationError::Count)?;
        debug!(total_items, "counted matching records");

        let request = self.fetch_request();
        let records = QuerySource::fetch(source, request)
            .await
            .change_context(PaginationError::Fetch)
            .attach_with(|| format!("fetching {} records after {}", request.take, request.skip))?;
        debug!(fetched = records.len(), "fetched page of records");

        let page = PaginationResult::new(records, total_items, self.pagination, Window::Presliced)?;
        self.mapper.map_page(page).await
    }

    #[instrument(
        skip_all,
        err(Debug),
        name = "page_query#execute_blocking",
        fields(page = self.pagination.page, limit = self.pagination.limit, sort = ?self.sort)
    )]
    pub fn execute_blocking<S>(
        self,
        source: &S,
    ) -> PagingResult<PaginationResult<<M as BlockingPageMapper<S::Record>>::Output>>
    where
        S: BlockingQuerySource<Filter = F>,
        M: BlockingPageMapper<S::Record>,
    {
        validate_paging_parameters(self.pagination.page, self.pagination.limit)?;

        let total_items = BlockingQuerySource::count(source, self.filter.as_ref())
            .change_context(PaginationError::Count)?;
        debug!(total_items, "counted matching records");

        let request = self.fetch_request();
        let records = BlockingQuerySource::fetch(source, request)
            .change_context(PaginationError::Fetch)
            .attach_with(|| format!("fetching {} records after {}", request.take, request.skip))?;
        debug!(fetched = records.len(), "fetched page of records");

        let page = PaginationResult::new(records, total_items, self.pagination, Window::Presliced)?;
        Ok(self.mapper.map_page_blocking(page))
    }
}
