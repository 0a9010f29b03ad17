use memoria_auth::TokenPolicy;
use memoria_database::DatabaseConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database: DatabaseConfig,
    pub fingerprint_key: String,
    pub tokens: TokenPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database: DatabaseConfig::from_env(),
            fingerprint_key: std::env::var("TOKEN_FINGERPRINT_KEY")
                .expect("TOKEN_FINGERPRINT_KEY must be set"),
            tokens: TokenPolicy::from_env(),
        }
    }
}
