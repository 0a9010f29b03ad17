// Memoria Auth Server
// REST surface for the credential/token lifecycle subsystem

mod config;
mod handlers;
mod routes;

use config::Config;
use dotenvy::dotenv;
use memoria_auth::{
    AuthenticationService, PgAuthenticationStore, PgUserStore, TokenFingerprinter,
    TokenSecretGenerator,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub struct AppState {
    pub auth_service: AuthenticationService,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,memoria_api=debug,tower_http=debug".to_string()),
        )
        .init();

    tracing::info!("🚀 Starting Memoria Auth Server");
    tracing::info!("📦 Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env();
    tracing::info!("🔌 Server: {}:{}", config.server_host, config.server_port);

    // Initialize database
    tracing::info!("🗄️  Connecting to database...");
    let database = memoria_database::Database::new(config.database.clone())
        .await
        .expect("Failed to connect to database");
    database.ping().await.expect("Database ping failed");
    tracing::info!("✅ Database connected");

    // Wire up the authentication service
    let fingerprinter = TokenFingerprinter::new(config.fingerprint_key.as_bytes());
    let secrets = TokenSecretGenerator::new(config.tokens.secret_length);
    let store = Arc::new(PgAuthenticationStore::new(
        database.pool().clone(),
        fingerprinter,
        secrets,
    ));
    let users = Arc::new(PgUserStore::new(database.pool().clone()));
    let auth_service = AuthenticationService::new(store, users, config.tokens.clone());
    tracing::info!("🔑 Auth service initialized");

    // Create app state
    let state = Arc::new(AppState { auth_service });

    // Create router
    let app = routes::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    tracing::info!("📡 Routes configured:");
    tracing::info!("   GET  /health");
    tracing::info!("   POST /api/auth/login");
    tracing::info!("   POST /api/auth/logout");
    tracing::info!("   POST /api/auth/introspect");
    tracing::info!("   POST /api/auth/refresh");
    tracing::info!("   POST /api/auth/revoke");
    tracing::info!("   GET  /api/auth/sessions/:identifier");

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("✅ Server ready at http://{}", addr);

    axum::serve(listener, app).await.expect("Server error");

    Ok(())
}
