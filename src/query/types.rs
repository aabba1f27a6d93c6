use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than `desc` (case-insensitive) sorts ascending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One requested ordering, as it arrived from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortEntry {
    pub property: String,
    pub direction: SortDirection,
}

impl SortEntry {
    pub fn new(property: impl Into<String>, direction: SortDirection) -> Self {
        Self { property: property.into(), direction }
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, SortDirection::Asc)
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, SortDirection::Desc)
    }
}

/// One requested equality filter, as it arrived from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub column: String,
    pub value: String,
}

impl FilterEntry {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self { column: column.into(), value: value.into() }
    }
}

/// A value bound to a `$n` placeholder. User input only ever reaches SQL this way.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        SqlParam::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub query: String,
    pub params: Vec<SqlParam>,
}
