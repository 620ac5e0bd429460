// handlers/v3/clients.rs - /v3/clients handlers

use axum::{
    extract::{Extension, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use super::{method_override, parse_date_range, prepare_parameters, require_name};
use crate::app::AppState;
use crate::guard::{RequestGuard, READ_BILLING_ACCOUNT_SCOPE, WRITE_BILLING_ACCOUNT_SCOPE};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::query::RawQuery;
use crate::store::{Client, NewClient};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClient {
    pub name: String,
    pub status: Option<String>,
    pub code_name: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

/// GET /v3/clients - filtered, sorted list
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(raw): Query<RawQuery>,
) -> ApiResult<Vec<Client>> {
    RequestGuard::require_admin(&caller, Some(&[READ_BILLING_ACCOUNT_SCOPE]))?;

    let params = prepare_parameters(&raw, &state.config.query)?;
    let clients = state.store.list_clients(&params).await?;
    Ok(ApiResponse::success(clients))
}

/// POST /v3/clients
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    headers: HeaderMap,
    Json(body): Json<CreateClient>,
) -> ApiResult<Client> {
    RequestGuard::require_admin(&caller, Some(&[WRITE_BILLING_ACCOUNT_SCOPE]))?;
    RequestGuard::check_method(method_override(&headers)?)?;

    require_name(&body.name)?;
    let (start_date, end_date) = parse_date_range(&body.start_date, &body.end_date)?;

    let client = state
        .store
        .create_client(NewClient {
            name: body.name.trim().to_string(),
            status: body.status.unwrap_or_else(|| "Active".to_string()),
            code_name: body.code_name,
            start_date,
            end_date,
        })
        .await?;
    Ok(ApiResponse::created(client))
}
