pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod store;

pub use app::{app, AppState};
