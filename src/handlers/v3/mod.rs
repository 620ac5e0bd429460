// handlers/v3/mod.rs - Billing account resources (JWT authentication required)
//
// Every handler runs its caller through RequestGuard::require_admin before
// touching the store. Collection reads go through prepare_parameters so the
// store only ever sees normalized filters.

pub mod billing_accounts;
pub mod clients;

use axum::http::HeaderMap;

use crate::config::QueryConfig;
use crate::error::ApiError;
use crate::guard::{parse_filter_date, RequestGuard};
use crate::query::{QueryParameters, RawQuery};
use crate::store::StoreError;

pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

/// Build and normalize the collection query for the store.
pub fn prepare_parameters(raw: &RawQuery, config: &QueryConfig) -> Result<QueryParameters, ApiError> {
    let mut params = QueryParameters::from_raw(raw, config)?;
    RequestGuard::normalize_parameters(&mut params, raw.sort.as_deref())?;
    Ok(params)
}

/// Method named by the override header, if any.
pub fn method_override(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    headers
        .get(METHOD_OVERRIDE_HEADER)
        .map(|v| v.to_str().map_err(|_| ApiError::bad_request("Invalid X-HTTP-Method-Override header")))
        .transpose()
}

/// Parse a request-body date pair and check that the range is ordered.
pub fn parse_date_range(start: &str, end: &str) -> Result<(i64, i64), ApiError> {
    let start_date = parse_filter_date("startDate", start)?;
    let end_date = parse_filter_date("endDate", end)?;
    if end_date < start_date {
        return Err(StoreError::InvalidDateRange { start_date, end_date }.into());
    }
    Ok((start_date, end_date))
}

pub fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        let mut field_errors = std::collections::HashMap::new();
        field_errors.insert("name".to_string(), "This field is required".to_string());
        return Err(ApiError::validation_error("Missing required fields", Some(field_errors)));
    }
    Ok(())
}
