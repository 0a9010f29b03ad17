use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

pub const DEFAULT_SECRET_LENGTH: usize = 64;

/// Produces raw token secrets from the thread-local CSPRNG. At the default
/// length the alphanumeric alphabet gives ~380 bits of entropy, far beyond
/// what any expiration window allows an online guesser.
#[derive(Debug, Clone)]
pub struct TokenSecretGenerator {
    length: usize,
}

impl Default for TokenSecretGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET_LENGTH)
    }
}

impl TokenSecretGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Generate one secret. Each call draws independently; paired access
    /// and refresh secrets share no derivation.
    pub fn generate(&self) -> String {
        thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}
