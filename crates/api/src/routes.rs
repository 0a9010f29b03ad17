use crate::handlers;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Auth routes
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/introspect", post(handlers::auth::introspect))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route("/api/auth/revoke", post(handlers::auth::revoke))
        .route("/api/auth/sessions/:identifier", get(handlers::auth::session))
        .with_state(state)
}
