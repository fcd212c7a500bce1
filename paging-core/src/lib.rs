//! Offset pagination over any data source that can count and fetch records.
//!
//! - [`PaginationResult`] holds one page and computes its navigation metadata
//! - [`PageQuery`] validates a request, asks a [`QuerySource`] for the total
//!   and the page of records, and optionally converts every record
//! - [`resolve_default_sort_field`] gives sources a stable default ordering

pub mod error;
mod page;
mod pagination;
pub mod query;
pub mod sort;
pub mod source;
mod validation;

pub use error::{PaginationError, PagingParameter, PagingResult};
pub use page::{PaginationResult, Window, total_pages};
pub use pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, Pagination};
pub use query::PageQuery;
pub use sort::{
    BlankSortColumn, Direction, FieldDescriptor, FieldKind, SortSpec, resolve_default_sort_field,
};
pub use source::{BlockingQuerySource, FetchRequest, QuerySource, SourceResult};
pub use validation::{validate_page, validate_paging_parameters};
