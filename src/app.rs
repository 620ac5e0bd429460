use std::sync::Arc;

use axum::{http::HeaderValue, middleware, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::v3;
use crate::middleware::jwt_auth_middleware;
use crate::store::AccountStore;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AccountStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: impl AccountStore + 'static) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let request_logging = state.config.api.enable_request_logging;

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected
        .merge(v3_routes(state.clone()))
        .layer(cors);

    if request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn v3_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v3/billing-accounts",
            get(v3::billing_accounts::list).post(v3::billing_accounts::create),
        )
        .route(
            "/v3/billing-accounts/:id",
            get(v3::billing_accounts::get).patch(v3::billing_accounts::update),
        )
        .route(
            "/v3/clients",
            get(v3::clients::list).post(v3::clients::create),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    CorsLayer::new().allow_origin(AllowOrigin::list(origins))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Billing Account Service",
            "version": version,
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "billing_accounts": "/v3/billing-accounts[/:id] (administrator or billing account scope)",
                "clients": "/v3/clients (administrator or billing account scope)",
            }
        }
    }))
}

async fn health() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}
