#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use billing_account_service::auth::{generate_jwt, Claims};
use billing_account_service::config::AppConfig;
use billing_account_service::guard::{READ_BILLING_ACCOUNT_SCOPE, WRITE_BILLING_ACCOUNT_SCOPE};
use billing_account_service::store::InMemoryStore;
use billing_account_service::{app, AppState};

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::development();
        config.security.jwt_secret = SECRET.to_string();
        config.query.max_limit = Some(50);
        let state = AppState::new(config, InMemoryStore::new());
        Self { router: app(state) }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty())?).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        token: &str,
        body: Value,
        method_override: Option<&str>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(m) = method_override {
            builder = builder.header("X-HTTP-Method-Override", m);
        }
        self.send(builder.body(Body::from(body.to_string()))?).await
    }
}

pub fn admin_token() -> String {
    let claims = Claims::user("40011", "admin", vec!["Topcoder User".into(), "administrator".into()], 1);
    generate_jwt(&claims, SECRET).expect("admin token")
}

pub fn member_token() -> String {
    let claims = Claims::user("40012", "member", vec!["Topcoder User".into()], 1);
    generate_jwt(&claims, SECRET).expect("member token")
}

pub fn machine_token(scopes: &[&str]) -> String {
    generate_jwt(&Claims::machine("billing-sync", scopes, 1), SECRET).expect("machine token")
}

pub fn reader_token() -> String {
    machine_token(&[READ_BILLING_ACCOUNT_SCOPE])
}

pub fn writer_token() -> String {
    machine_token(&[WRITE_BILLING_ACCOUNT_SCOPE])
}
