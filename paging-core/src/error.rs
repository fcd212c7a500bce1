use error_stack::Report;
use std::fmt::{Display, Formatter};

pub type PagingResult<T> = Result<T, Report<PaginationError>>;

/// Which of the paging inputs was rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PagingParameter {
    Page,
    Limit,
}

impl Display for PagingParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PagingParameter::Page => write!(f, "page"),
            PagingParameter::Limit => write!(f, "limit"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("{0} must be greater than 0")]
    InvalidPagingParameter(PagingParameter),
    #[error("failed to count matching records")]
    Count,
    #[error("failed to fetch a page of records")]
    Fetch,
    #[error("failed to convert a page of records")]
    Convert,
}

impl PaginationError {
    pub fn is_invalid_paging_parameter(&self) -> bool {
        matches!(self, PaginationError::InvalidPagingParameter(_))
    }
}
