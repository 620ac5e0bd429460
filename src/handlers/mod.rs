// handlers/mod.rs
//
// Public endpoints (/, /health) live in app.rs; everything under /v3 requires
// a bearer token and passes through RequestGuard.
pub mod v3;
