pub mod error;
pub mod intent;
pub mod organize;
pub mod paginate;
pub mod resource;
pub mod types;

pub use error::QueryError;
pub use intent::QueryIntent;
pub use organize::{OrganizedQuery, MIN_SEARCH_LENGTH};
pub use paginate::{paginate, Page, PageMeta, PageRequest};
pub use resource::{ColumnKind, FilterColumn, Organizable, Resource};
pub use types::*;

/// Dedicated search endpoints refuse short terms instead of silently ignoring them.
pub fn require_search_term(term: &str) -> Result<&str, QueryError> {
    let term = term.trim();
    if term.chars().count() < MIN_SEARCH_LENGTH {
        return Err(QueryError::SearchTooShort(MIN_SEARCH_LENGTH));
    }
    Ok(term)
}
