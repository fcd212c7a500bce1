use crate::error::{AppError, AppResult};
use error_stack::ResultExt;
use paging_core::{DEFAULT_LIMIT, DEFAULT_PAGE, Direction, Pagination, SortSpec};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

pub const LOG_VAR: &str = "PAGING_LOG";
pub const PAGE_VAR: &str = "PAGING_PAGE";
pub const LIMIT_VAR: &str = "PAGING_LIMIT";
pub const SORT_VAR: &str = "PAGING_SORT";
pub const DESCENDING_VAR: &str = "PAGING_DESCENDING";
pub const FILTER_VAR: &str = "PAGING_FILTER";

/// Outcome of looking for a `.env` file in the working directory or its
/// parents.
#[derive(Debug)]
pub enum EnvFile {
    Loaded(PathBuf),
    Missing,
    Unreadable(dotenv::Error),
}

pub fn load_env_file() -> EnvFile {
    match dotenv::dotenv() {
        Ok(path) => EnvFile::Loaded(path),
        Err(e) if e.not_found() => EnvFile::Missing,
        Err(e) => EnvFile::Unreadable(e),
    }
}

impl EnvFile {
    /// Logging is set up after the file is read, so the outcome is logged here.
    pub fn log(&self) {
        match self {
            EnvFile::Loaded(path) => debug!(path = %path.display(), "loaded .env file"),
            EnvFile::Missing => debug!("no .env file found"),
            EnvFile::Unreadable(e) => warn!("failed to load .env file: {e}"),
        }
    }
}

/// The query the demo runs against its seeded people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub pagination: Pagination,
    pub sort: Option<SortSpec>,
    /// Keeps people whose first name contains this text.
    pub filter: Option<String>,
}

impl QueryConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let page = parse_var(&lookup, PAGE_VAR)?.unwrap_or(DEFAULT_PAGE);
        let limit = parse_var(&lookup, LIMIT_VAR)?.unwrap_or(DEFAULT_LIMIT);
        let descending = parse_var(&lookup, DESCENDING_VAR)?.unwrap_or(false);

        let sort = lookup(SORT_VAR)
            .and_then(|column| SortSpec::new(column.trim(), Direction::from_descending(descending)));
        let filter = lookup(FILTER_VAR).filter(|f| !f.is_empty());

        Ok(Self {
            pagination: Pagination::new(page, limit),
            sort,
            filter,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .change_context(AppError)
                .attach_with(|| format!("{name} has an invalid value: '{raw}'"))
        })
        .transpose()
}
