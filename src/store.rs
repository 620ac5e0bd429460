//! Record storage behind the resource handlers.
//!
//! `AccountStore` is the seam a database-backed implementation plugs into;
//! `InMemoryStore` keeps everything in process and evaluates normalized
//! query parameters directly against the records.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::guard::{END_DATE, START_DATE};
use crate::query::{QueryError, QueryParameters, SortDirection};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("endDate {end_date} is before startDate {start_date}")]
    InvalidDateRange { start_date: i64, end_date: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Query(#[from] QueryError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAccount {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub client_id: Option<i64>,
    pub po_number: Option<String>,
    pub start_date: i64,
    pub end_date: i64,
    pub budget_amount: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBillingAccount {
    pub name: String,
    pub status: String,
    pub client_id: Option<i64>,
    pub po_number: Option<String>,
    pub start_date: i64,
    pub end_date: i64,
    pub budget_amount: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillingAccountPatch {
    pub name: Option<String>,
    pub status: Option<String>,
    pub client_id: Option<i64>,
    pub po_number: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub budget_amount: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub code_name: Option<String>,
    pub start_date: i64,
    pub end_date: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub status: String,
    pub code_name: Option<String>,
    pub start_date: i64,
    pub end_date: i64,
}

/// Records that can be filtered and sorted by `select`.
trait Record: Serialize + Clone {
    const KIND: &'static str;
    const FIELDS: &'static [&'static str];
}

impl Record for BillingAccount {
    const KIND: &'static str = "billing account";
    const FIELDS: &'static [&'static str] = &[
        "id", "name", "status", "clientId", "poNumber", "startDate", "endDate", "budgetAmount", "description",
    ];
}

impl Record for Client {
    const KIND: &'static str = "client";
    const FIELDS: &'static [&'static str] = &["id", "name", "status", "codeName", "startDate", "endDate"];
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn list_billing_accounts(&self, params: &QueryParameters) -> Result<Vec<BillingAccount>, StoreError>;
    async fn get_billing_account(&self, id: i64) -> Result<BillingAccount, StoreError>;
    async fn create_billing_account(&self, account: NewBillingAccount) -> Result<BillingAccount, StoreError>;
    async fn update_billing_account(&self, id: i64, patch: BillingAccountPatch) -> Result<BillingAccount, StoreError>;
    async fn list_clients(&self, params: &QueryParameters) -> Result<Vec<Client>, StoreError>;
    async fn create_client(&self, client: NewClient) -> Result<Client, StoreError>;
}

#[derive(Default)]
struct Tables {
    billing_accounts: BTreeMap<i64, BillingAccount>,
    clients: BTreeMap<i64, Client>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn list_billing_accounts(&self, params: &QueryParameters) -> Result<Vec<BillingAccount>, StoreError> {
        let tables = self.tables.read().await;
        select(tables.billing_accounts.values(), params)
    }

    async fn get_billing_account(&self, id: i64) -> Result<BillingAccount, StoreError> {
        let tables = self.tables.read().await;
        tables
            .billing_accounts
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: BillingAccount::KIND, id })
    }

    async fn create_billing_account(&self, account: NewBillingAccount) -> Result<BillingAccount, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.billing_accounts.values().any(|a| a.name == account.name) {
            return Err(StoreError::Conflict(format!("billing account '{}' already exists", account.name)));
        }
        if let Some(client_id) = account.client_id {
            if !tables.clients.contains_key(&client_id) {
                return Err(StoreError::NotFound { kind: Client::KIND, id: client_id });
            }
        }

        let record = BillingAccount {
            id: tables.allocate_id(),
            name: account.name,
            status: account.status,
            client_id: account.client_id,
            po_number: account.po_number,
            start_date: account.start_date,
            end_date: account.end_date,
            budget_amount: account.budget_amount,
            description: account.description,
        };
        tables.billing_accounts.insert(record.id, record.clone());
        tracing::info!("Created billing account {} ({})", record.id, record.name);
        Ok(record)
    }

    async fn update_billing_account(&self, id: i64, patch: BillingAccountPatch) -> Result<BillingAccount, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(name) = patch.name.as_deref() {
            if tables.billing_accounts.values().any(|a| a.name == name && a.id != id) {
                return Err(StoreError::Conflict(format!("billing account '{}' already exists", name)));
            }
        }

        if let Some(client_id) = patch.client_id {
            if !tables.clients.contains_key(&client_id) {
                return Err(StoreError::NotFound { kind: Client::KIND, id: client_id });
            }
        }

        let record = tables
            .billing_accounts
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: BillingAccount::KIND, id })?;

        // Checked on the merged record while the write guard is held
        let start_date = patch.start_date.unwrap_or(record.start_date);
        let end_date = patch.end_date.unwrap_or(record.end_date);
        if end_date < start_date {
            return Err(StoreError::InvalidDateRange { start_date, end_date });
        }

        if let Some(v) = patch.name { record.name = v; }
        if let Some(v) = patch.status { record.status = v; }
        if let Some(v) = patch.client_id { record.client_id = Some(v); }
        if let Some(v) = patch.po_number { record.po_number = Some(v); }
        if let Some(v) = patch.start_date { record.start_date = v; }
        if let Some(v) = patch.end_date { record.end_date = v; }
        if let Some(v) = patch.budget_amount { record.budget_amount = Some(v); }
        if let Some(v) = patch.description { record.description = Some(v); }

        tracing::info!("Updated billing account {}", id);
        Ok(record.clone())
    }

    async fn list_clients(&self, params: &QueryParameters) -> Result<Vec<Client>, StoreError> {
        let tables = self.tables.read().await;
        select(tables.clients.values(), params)
    }

    async fn create_client(&self, client: NewClient) -> Result<Client, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.clients.values().any(|c| c.name == client.name) {
            return Err(StoreError::Conflict(format!("client '{}' already exists", client.name)));
        }

        let record = Client {
            id: tables.allocate_id(),
            name: client.name,
            status: client.status,
            code_name: client.code_name,
            start_date: client.start_date,
            end_date: client.end_date,
        };
        tables.clients.insert(record.id, record.clone());
        tracing::info!("Created client {} ({})", record.id, record.name);
        Ok(record)
    }
}

/// Apply filter, sort and paging to `records`.
fn select<'a, T: Record + 'a>(
    records: impl Iterator<Item = &'a T>,
    params: &QueryParameters,
) -> Result<Vec<T>, StoreError> {
    for field in params.filter.fields() {
        if !T::FIELDS.iter().any(|f| *f == field) {
            return Err(QueryError::InvalidFilter(format!("unknown {} field: {}", T::KIND, field)).into());
        }
    }
    if let Some(order_by) = &params.order_by {
        for item in &order_by.items {
            if !T::FIELDS.iter().any(|f| *f == item.field) {
                return Err(QueryError::InvalidSort(format!("unknown {} field: {}", T::KIND, item.field)).into());
            }
        }
    }

    let mut rows = Vec::new();
    for record in records {
        let json = serde_json::to_value(record).unwrap_or(Value::Null);
        if matches_filter(&json, params)? {
            rows.push((json, record.clone()));
        }
    }

    if let Some(order_by) = &params.order_by {
        rows.sort_by(|(a, _), (b, _)| {
            order_by
                .items
                .iter()
                .map(|item| {
                    let ord = compare_json(&a[&item.field], &b[&item.field]);
                    match item.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    let offset = params.offset.unwrap_or(0) as usize;
    let limit = params.limit.map(|l| l as usize).unwrap_or(usize::MAX);
    Ok(rows.into_iter().skip(offset).take(limit).map(|(_, r)| r).collect())
}

fn matches_filter(json: &Value, params: &QueryParameters) -> Result<bool, QueryError> {
    for (field, expected) in params.filter.iter() {
        let actual = &json[field];
        let matched = match field {
            START_DATE | END_DATE => {
                let bound = expected
                    .as_integer()
                    .ok_or_else(|| QueryError::InvalidFilter(format!("{} has not been normalized", field)))?;
                match actual.as_i64() {
                    Some(v) if field == START_DATE => v >= bound,
                    Some(v) => v <= bound,
                    None => false,
                }
            }
            _ => expected.matches_json(actual),
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn compare_json(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
