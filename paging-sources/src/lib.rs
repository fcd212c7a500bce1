//! Data sources that paging queries can run against.

mod memory;
mod record;

pub use memory::{InMemorySource, Predicate, SourceError};
pub use record::{Record, SortValue};
