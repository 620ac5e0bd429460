// handlers/v3/billing_accounts.rs - /v3/billing-accounts handlers

use axum::{
    extract::{Extension, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use super::{method_override, parse_date_range, prepare_parameters, require_name};
use crate::app::AppState;
use crate::guard::{parse_filter_date, RequestGuard, READ_BILLING_ACCOUNT_SCOPE, WRITE_BILLING_ACCOUNT_SCOPE};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::query::RawQuery;
use crate::store::{BillingAccount, BillingAccountPatch, NewBillingAccount};

const DEFAULT_STATUS: &str = "Active";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillingAccount {
    pub name: String,
    pub status: Option<String>,
    pub client_id: Option<i64>,
    pub po_number: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub budget_amount: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBillingAccount {
    pub name: Option<String>,
    pub status: Option<String>,
    pub client_id: Option<i64>,
    pub po_number: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub budget_amount: Option<f64>,
    pub description: Option<String>,
}

/// GET /v3/billing-accounts - filtered, sorted list
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(raw): Query<RawQuery>,
) -> ApiResult<Vec<BillingAccount>> {
    RequestGuard::require_admin(&caller, Some(&[READ_BILLING_ACCOUNT_SCOPE]))?;

    let params = prepare_parameters(&raw, &state.config.query)?;
    let accounts = state.store.list_billing_accounts(&params).await?;
    Ok(ApiResponse::success(accounts))
}

/// GET /v3/billing-accounts/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<BillingAccount> {
    RequestGuard::require_admin(&caller, Some(&[READ_BILLING_ACCOUNT_SCOPE]))?;

    let account = state.store.get_billing_account(id).await?;
    Ok(ApiResponse::success(account))
}

/// POST /v3/billing-accounts
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    headers: HeaderMap,
    Json(body): Json<CreateBillingAccount>,
) -> ApiResult<BillingAccount> {
    RequestGuard::require_admin(&caller, Some(&[WRITE_BILLING_ACCOUNT_SCOPE]))?;
    RequestGuard::check_method(method_override(&headers)?)?;

    require_name(&body.name)?;
    let (start_date, end_date) = parse_date_range(&body.start_date, &body.end_date)?;

    let account = state
        .store
        .create_billing_account(NewBillingAccount {
            name: body.name.trim().to_string(),
            status: body.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            client_id: body.client_id,
            po_number: body.po_number,
            start_date,
            end_date,
            budget_amount: body.budget_amount,
            description: body.description,
        })
        .await?;
    Ok(ApiResponse::created(account))
}

/// PATCH /v3/billing-accounts/:id - partial update
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<UpdateBillingAccount>,
) -> ApiResult<BillingAccount> {
    RequestGuard::require_admin(&caller, Some(&[WRITE_BILLING_ACCOUNT_SCOPE]))?;
    RequestGuard::check_method(method_override(&headers)?)?;

    if let Some(name) = body.name.as_deref() {
        require_name(name)?;
    }
    let start_date = body.start_date.as_deref().map(|s| parse_filter_date("startDate", s)).transpose()?;
    let end_date = body.end_date.as_deref().map(|s| parse_filter_date("endDate", s)).transpose()?;

    let patch = BillingAccountPatch {
        name: body.name.map(|n| n.trim().to_string()),
        status: body.status,
        client_id: body.client_id,
        po_number: body.po_number,
        start_date,
        end_date,
        budget_amount: body.budget_amount,
        description: body.description,
    };
    let account = state.store.update_billing_account(id, patch).await?;
    Ok(ApiResponse::success(account))
}
