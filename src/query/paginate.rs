use serde::Serialize;
use serde_json::Value;

use crate::config::QueryConfig;
use crate::database::{DatabaseError, QueryBase};

use super::error::QueryError;
use super::organize::OrganizedQuery;

/// Requested slice of a list, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Missing values fall back to page 1 / the configured default; `per_page` above the
    /// configured maximum is capped.
    pub fn parse(
        page: Option<&str>,
        per_page: Option<&str>,
        config: &QueryConfig,
    ) -> Result<Self, QueryError> {
        let page = match page {
            Some(raw) => parse_positive(raw).ok_or_else(|| QueryError::InvalidPage(raw.to_string()))?,
            None => 1,
        };
        let requested = match per_page {
            Some(raw) => {
                parse_positive(raw).ok_or_else(|| QueryError::InvalidPerPage(raw.to_string()))?
            }
            None => config.default_per_page.max(1),
        };

        // LIMIT/OFFSET are bigint in Postgres.
        let max_per_page = config.max_per_page.unwrap_or(u64::MAX).min(i64::MAX as u64);
        let per_page = if requested > max_per_page {
            if config.debug_logging {
                tracing::debug!("per_page {} exceeds max {}, capping to max", requested, max_per_page);
            }
            max_per_page
        } else {
            requested
        };

        Ok(Self { page, per_page })
    }

    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.per_page)
            .min(i64::MAX as u64)
    }
}

fn parse_positive(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|n| *n >= 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub count: u64,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
}

impl PageMeta {
    pub fn new(total: u64, request: PageRequest) -> Self {
        let last_page = last_page(total, request.per_page);
        let count = if request.page > last_page {
            0
        } else {
            total.saturating_sub(request.offset()).min(request.per_page)
        };
        Self {
            count,
            total,
            per_page: request.per_page,
            current_page: request.page,
            last_page,
        }
    }
}

/// Never below 1, even for an empty result.
pub fn last_page(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 1;
    }
    total.div_ceil(per_page).max(1)
}

/// `{data: [...], meta: {count, total, per_page, current_page, last_page}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// Count the restricted result, then fetch the requested slice. Pages past the end
/// come back empty with accurate counts; the data query is skipped for them.
pub async fn paginate(
    base: &dyn QueryBase,
    query: &OrganizedQuery,
    request: PageRequest,
) -> Result<Page<Value>, DatabaseError> {
    let total = base.fetch_count(&query.to_count_sql()).await?.max(0) as u64;
    let mut meta = PageMeta::new(total, request);

    let data = if meta.count == 0 {
        Vec::new()
    } else {
        let select = query.to_select_sql(Some(request.per_page), Some(request.offset()));
        base.fetch_rows(&select).await?
    };

    // The rows are authoritative if the table moved between the two queries.
    meta.count = data.len() as u64;
    Ok(Page { data, meta })
}
