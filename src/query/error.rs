use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("page must be a positive integer, got '{0}'")]
    InvalidPage(String),

    #[error("per_page must be a positive integer, got '{0}'")]
    InvalidPerPage(String),

    #[error("filter value '{value}' for '{column}' is not a valid {expected}")]
    InvalidFilterValue {
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("Search must be at least {0} characters long")]
    SearchTooShort(usize),
}
