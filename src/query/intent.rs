use crate::config::QueryConfig;

use super::error::QueryError;
use super::paginate::PageRequest;
use super::types::{FilterEntry, SortDirection, SortEntry};

/// Sort/filter/search/page parameters of one list request. Nothing here is trusted yet:
/// entries are checked against a resource's allow-lists when applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryIntent {
    pub sort: Vec<SortEntry>,
    pub filters: Vec<FilterEntry>,
    pub search: Option<String>,
    pub page: PageRequest,
}

impl QueryIntent {
    pub fn new(page: PageRequest) -> Self {
        Self { sort: vec![], filters: vec![], search: None, page }
    }

    /// Parse `sort=prop:dir`, `filter[col]=value`, `search=term`, `page`, `per_page`.
    /// Unknown keys are ignored.
    pub fn from_query_string(query: Option<&str>, config: &QueryConfig) -> Result<Self, QueryError> {
        let mut sort = Vec::new();
        let mut filters = Vec::new();
        let mut search = None;
        let mut page = None;
        let mut per_page = None;

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            match key.as_ref() {
                "sort" | "sort[]" => sort.extend(parse_sort(&value)),
                "search" => {
                    let term = value.trim();
                    search = if term.is_empty() { None } else { Some(term.to_string()) };
                }
                "page" => page = Some(value.into_owned()),
                "per_page" => per_page = Some(value.into_owned()),
                other => {
                    if let Some(column) = other.strip_prefix("filter[").and_then(|c| c.strip_suffix(']')) {
                        if !column.is_empty() {
                            filters.push(FilterEntry::new(column, value.into_owned()));
                        }
                    }
                }
            }
        }

        let page = PageRequest::parse(page.as_deref(), per_page.as_deref(), config)?;
        Ok(Self { sort, filters, search, page })
    }
}

/// `title:asc,created_at:desc` or a single `title` (ascending).
pub fn parse_sort(s: &str) -> Vec<SortEntry> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (property, direction) = match trimmed.split_once(':') {
            Some((property, direction)) => (property.trim(), SortDirection::parse(direction)),
            None => (trimmed, SortDirection::Asc),
        };
        if !property.is_empty() {
            out.push(SortEntry::new(property, direction));
        }
    }
    out
}
