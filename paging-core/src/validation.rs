use crate::error::{PaginationError, PagingParameter, PagingResult};
use error_stack::{Report, ResultExt};

/// Rejects a page number of 0. Pages are 1-based.
pub fn validate_page(page: u64) -> PagingResult<()> {
    if page == 0 {
        return Err(Report::new(PaginationError::InvalidPagingParameter(
            PagingParameter::Page,
        )))
        .attach("pages start at 1");
    }
    Ok(())
}

/// Strict validation used before any data source is touched: both the page
/// and the limit must be positive.
pub fn validate_paging_parameters(page: u64, limit: u64) -> PagingResult<()> {
    validate_page(page)?;

    if limit == 0 {
        return Err(Report::new(PaginationError::InvalidPagingParameter(
            PagingParameter::Limit,
        )))
        .attach_with(|| format!("a limit of 0 was requested for page {page}"));
    }
    Ok(())
}
