use super::error::QueryError;
use super::intent::QueryIntent;
use super::resource::{Organizable, Resource};
use super::types::{FilterEntry, SortDirection, SqlParam, SqlQuery};

/// Search terms shorter than this add no constraint.
pub const MIN_SEARCH_LENGTH: usize = 3;

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Eq(&'static str, SqlParam),
    /// `(a = $1 OR b = $2)`
    AnyEq(Vec<(&'static str, SqlParam)>),
}

/// A select over one declared resource, restricted to its allow-lists.
///
/// Identifiers in the generated SQL only ever come from the static [`Resource`]
/// declaration; every client value is bound as a parameter.
#[derive(Debug, Clone)]
pub struct OrganizedQuery {
    resource: Resource,
    scope: Vec<Condition>,
    filters: Vec<Condition>,
    search: Option<String>,
    sort: Vec<(&'static str, SortDirection)>,
}

impl OrganizedQuery {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            scope: vec![],
            filters: vec![],
            search: None,
            sort: vec![],
        }
    }

    pub fn for_resource<T: Organizable>() -> Self {
        Self::new(T::RESOURCE)
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Server-side restriction (ownership, visibility). Not subject to the allow-lists,
    /// so callers must only pass column names they control.
    pub fn scope_eq(&mut self, column: &'static str, value: impl Into<SqlParam>) -> &mut Self {
        self.scope.push(Condition::Eq(column, value.into()));
        self
    }

    /// Server-side restriction matching when any one of the pairs holds.
    pub fn scope_any(&mut self, pairs: Vec<(&'static str, SqlParam)>) -> &mut Self {
        if !pairs.is_empty() {
            self.scope.push(Condition::AnyEq(pairs));
        }
        self
    }

    /// Apply filter, search and sort from a parsed request.
    pub fn organize(&mut self, intent: &QueryIntent) -> Result<&mut Self, QueryError> {
        self.apply_filter(&intent.filters)?;
        self.apply_search(intent.search.as_deref());
        self.apply_sort(&intent.sort);
        Ok(self)
    }

    /// Keeps allow-listed entries in their requested order; the rest are dropped.
    pub fn apply_sort(&mut self, spec: &[super::types::SortEntry]) -> &mut Self {
        self.sort = spec
            .iter()
            .filter_map(|entry| match self.resource.sortable_column(&entry.property) {
                Some(column) => Some((column, entry.direction)),
                None => {
                    tracing::debug!(
                        "Dropping sort on '{}' (not sortable on {})",
                        entry.property,
                        self.resource.table
                    );
                    None
                }
            })
            .collect();
        self
    }

    /// Equality filters on allow-listed columns, combined with AND. Unknown columns are
    /// dropped; a value that does not fit an allowed column is an error.
    pub fn apply_filter(&mut self, spec: &[FilterEntry]) -> Result<&mut Self, QueryError> {
        for entry in spec {
            match self.resource.filter_column(&entry.column) {
                Some(column) => {
                    let value = column.coerce(&entry.value)?;
                    self.filters.push(Condition::Eq(column.name, value));
                }
                None => tracing::debug!(
                    "Dropping filter on '{}' (not filterable on {})",
                    entry.column,
                    self.resource.table
                ),
            }
        }
        Ok(self)
    }

    /// Case-insensitive substring match across every searchable column. Terms under
    /// [`MIN_SEARCH_LENGTH`] characters are ignored entirely.
    pub fn apply_search(&mut self, term: Option<&str>) -> &mut Self {
        self.search = term
            .map(str::trim)
            .filter(|t| t.chars().count() >= MIN_SEARCH_LENGTH)
            .filter(|_| !self.resource.searchable.is_empty())
            .map(str::to_string);
        self
    }

    /// Effective ordering: the applied sort, or the primary key ascending.
    pub fn ordering(&self) -> Vec<(&'static str, SortDirection)> {
        if self.sort.is_empty() {
            vec![(self.resource.primary_key, SortDirection::Asc)]
        } else {
            self.sort.clone()
        }
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    pub fn to_select_sql(&self, limit: Option<u64>, offset: Option<u64>) -> SqlQuery {
        let mut params = Vec::new();
        let where_clause = self.build_where(&mut params);

        let columns = if self.resource.columns.is_empty() {
            "*".to_string()
        } else {
            self.resource.columns.iter().map(|c| quote_identifier(c)).collect::<Vec<_>>().join(", ")
        };
        let order = self
            .ordering()
            .iter()
            .map(|(column, direction)| format!("{} {}", quote_identifier(column), direction.to_sql()))
            .collect::<Vec<_>>()
            .join(", ");

        let query = [
            format!("SELECT {}", columns),
            format!("FROM {}", quote_identifier(self.resource.table)),
            where_clause.map(|w| format!("WHERE {}", w)).unwrap_or_default(),
            format!("ORDER BY {}", order),
            build_limit_clause(limit, offset),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlQuery { query, params }
    }

    pub fn to_count_sql(&self) -> SqlQuery {
        let mut params = Vec::new();
        let query = match self.build_where(&mut params) {
            Some(w) => format!(
                "SELECT COUNT(*) AS count FROM {} WHERE {}",
                quote_identifier(self.resource.table),
                w
            ),
            None => format!("SELECT COUNT(*) AS count FROM {}", quote_identifier(self.resource.table)),
        };
        SqlQuery { query, params }
    }

    fn build_where(&self, params: &mut Vec<SqlParam>) -> Option<String> {
        let mut parts: Vec<String> = self
            .scope
            .iter()
            .chain(self.filters.iter())
            .map(|condition| match condition {
                Condition::Eq(column, value) => eq_sql(column, value, params),
                Condition::AnyEq(pairs) => {
                    let ors: Vec<String> =
                        pairs.iter().map(|(column, value)| eq_sql(column, value, params)).collect();
                    format!("({})", ors.join(" OR "))
                }
            })
            .collect();

        if let Some(term) = &self.search {
            params.push(SqlParam::Text(format!("%{}%", escape_like(term))));
            let placeholder = format!("${}", params.len());
            let ors: Vec<String> = self
                .resource
                .searchable
                .iter()
                .map(|column| format!("{} ILIKE {}", quote_identifier(column), placeholder))
                .collect();
            parts.push(format!("({})", ors.join(" OR ")));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" AND "))
        }
    }
}

fn eq_sql(column: &str, value: &SqlParam, params: &mut Vec<SqlParam>) -> String {
    params.push(value.clone());
    format!("{} = ${}", quote_identifier(column), params.len())
}

fn build_limit_clause(limit: Option<u64>, offset: Option<u64>) -> String {
    match (limit, offset) {
        (Some(l), Some(o)) if o > 0 => format!("LIMIT {} OFFSET {}", l, o),
        (Some(l), _) => format!("LIMIT {}", l),
        (None, Some(o)) if o > 0 => format!("OFFSET {}", o),
        _ => String::new(),
    }
}

/// Quote SQL identifier to prevent injection
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Escape LIKE wildcards so the term matches literally (Postgres default escape is `\`).
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
