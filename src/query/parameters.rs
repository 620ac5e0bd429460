use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;

use super::error::QueryError;
use super::filter::Filter;
use super::order_by::OrderByQuery;

/// Raw collection query as it arrives on the URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuery {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Filter, sort and paging for a single collection request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParameters {
    pub filter: Filter,
    pub order_by: Option<OrderByQuery>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl QueryParameters {
    pub fn new(filter: Filter) -> Self {
        Self { filter, ..Self::default() }
    }

    /// Build parameters from the raw query. The sort directive is left for
    /// normalization so it is parsed in one place.
    pub fn from_raw(raw: &RawQuery, config: &QueryConfig) -> Result<Self, QueryError> {
        let filter = match raw.filter.as_deref() {
            Some(f) => Filter::from_raw(f)?,
            None => Filter::new(),
        };

        let mut params = Self::new(filter);
        let limit = Self::parse_count("limit", raw.limit.as_deref())?.or(config.default_limit);
        let offset = Self::parse_count("offset", raw.offset.as_deref())?;
        params.set_limit(limit, offset, config);
        Ok(params)
    }

    pub fn set_limit(&mut self, limit: Option<u32>, offset: Option<u32>, config: &QueryConfig) -> &mut Self {
        self.limit = match (limit, config.max_limit) {
            (Some(l), Some(max)) if l > max => {
                if config.debug_logging {
                    tracing::warn!("Limit {} exceeds max {}, capping to max", l, max);
                }
                Some(max)
            }
            (l, _) => l,
        };
        self.offset = offset;
        self
    }

    fn parse_count(name: &str, raw: Option<&str>) -> Result<Option<u32>, QueryError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s
                .parse::<u32>()
                .map(Some)
                .map_err(|_| QueryError::InvalidLimit(format!("{} must be a non-negative integer, got '{}'", name, s))),
        }
    }
}
