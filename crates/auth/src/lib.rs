pub mod error;
pub mod fingerprint;
pub mod password;
pub mod secret;
pub mod service;
pub mod store;
pub mod user_store;

pub use error::{AuthError, Result};
pub use fingerprint::TokenFingerprinter;
pub use password::CredentialHasher;
pub use secret::TokenSecretGenerator;
pub use service::{AuthenticationService, TokenPolicy};
pub use store::{memory::MemoryAuthenticationStore, AuthenticationStore, PgAuthenticationStore};
pub use user_store::{PgUserStore, UserStore};
