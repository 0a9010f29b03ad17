use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Derives the storable fingerprint of a raw token secret: HMAC-SHA256
/// keyed by a single process-wide server key, hex-encoded.
///
/// The derivation is deliberately deterministic and fast. An incoming
/// secret must be matched against the stored column by plain equality, so
/// per-call salting is off the table, and a slow adaptive hash buys
/// nothing against secrets that already carry generator-level entropy.
#[derive(Clone)]
pub struct TokenFingerprinter {
    key: Vec<u8>,
}

impl TokenFingerprinter {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
        }
    }

    pub fn fingerprint(&self, secret: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(secret.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_secret_same_fingerprint() {
        let fingerprinter = TokenFingerprinter::new("server-key");
        assert_eq!(
            fingerprinter.fingerprint("some-secret"),
            fingerprinter.fingerprint("some-secret")
        );
    }

    #[test]
    fn test_fingerprint_is_not_the_secret() {
        let fingerprinter = TokenFingerprinter::new("server-key");
        let fingerprint = fingerprinter.fingerprint("some-secret");

        assert_ne!(fingerprint, "some-secret");
        // SHA-256 output, hex-encoded
        assert_eq!(fingerprint.len(), 64);
    }

    #[test]
    fn test_different_secrets_different_fingerprints() {
        let fingerprinter = TokenFingerprinter::new("server-key");
        assert_ne!(
            fingerprinter.fingerprint("secret-one"),
            fingerprinter.fingerprint("secret-two")
        );
    }

    #[test]
    fn test_key_changes_the_fingerprint() {
        let a = TokenFingerprinter::new("key-a");
        let b = TokenFingerprinter::new("key-b");
        assert_ne!(a.fingerprint("some-secret"), b.fingerprint("some-secret"));
    }
}
