use super::error::QueryError;
use super::types::SqlParam;

/// Value kind of a filterable column; decides how the raw query-string value is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Boolean,
}

impl ColumnKind {
    fn label(&self) -> &'static str {
        match self {
            ColumnKind::Text => "string",
            ColumnKind::Integer => "integer",
            ColumnKind::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl FilterColumn {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Text }
    }

    pub const fn int(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Integer }
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Boolean }
    }

    pub fn coerce(&self, raw: &str) -> Result<SqlParam, QueryError> {
        let invalid = || QueryError::InvalidFilterValue {
            column: self.name.to_string(),
            value: raw.to_string(),
            expected: self.kind.label(),
        };
        match self.kind {
            ColumnKind::Text => Ok(SqlParam::Text(raw.to_string())),
            ColumnKind::Integer => raw.trim().parse::<i64>().map(SqlParam::Int).map_err(|_| invalid()),
            ColumnKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(SqlParam::Bool(true)),
                "false" | "0" => Ok(SqlParam::Bool(false)),
                _ => Err(invalid()),
            },
        }
    }
}

/// Static declaration of a list-able table and what clients may organize it by.
///
/// The primary key is always sortable; everything else must be listed explicitly.
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub table: &'static str,
    pub primary_key: &'static str,
    /// Columns projected into responses.
    pub columns: &'static [&'static str],
    pub sortable: &'static [&'static str],
    pub filterable: &'static [FilterColumn],
    pub searchable: &'static [&'static str],
}

impl Resource {
    pub const fn new(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table,
            primary_key: "id",
            columns,
            sortable: &[],
            filterable: &[],
            searchable: &[],
        }
    }

    pub const fn with_sortable(self, sortable: &'static [&'static str]) -> Self {
        Self { sortable, ..self }
    }

    pub const fn with_filterable(self, filterable: &'static [FilterColumn]) -> Self {
        Self { filterable, ..self }
    }

    pub const fn with_searchable(self, searchable: &'static [&'static str]) -> Self {
        Self { searchable, ..self }
    }

    /// Returns the declared (static) name so client strings never reach SQL.
    pub fn sortable_column(&self, property: &str) -> Option<&'static str> {
        if property == self.primary_key {
            return Some(self.primary_key);
        }
        self.sortable.iter().copied().find(|c| *c == property)
    }

    pub fn filter_column(&self, column: &str) -> Option<&'static FilterColumn> {
        self.filterable.iter().find(|c| c.name == column)
    }
}

/// A resource type whose list endpoints accept sort/filter/search parameters.
pub trait Organizable {
    const RESOURCE: Resource;
}
