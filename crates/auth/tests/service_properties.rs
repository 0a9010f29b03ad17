//! Lifecycle tests for the authentication service over the in-memory
//! store: issuance, introspection, rotation, revocation and logout.

use async_trait::async_trait;
use chrono::Duration;
use memoria_auth::{
    AuthError, AuthenticationService, MemoryAuthenticationStore, Result, TokenFingerprinter,
    TokenPolicy, TokenSecretGenerator, UserStore,
};
use memoria_models::{Ability, Authentication, TokenType};
use std::sync::Arc;
use uuid::Uuid;

const CREDENTIAL: &str = "correct horse battery staple";

/// Stub collaborator: one account, fixed role, fixed credential.
struct StaticUserStore {
    user_id: Uuid,
    role: Ability,
}

#[async_trait]
impl UserStore for StaticUserStore {
    async fn verify(&self, _identifier: Uuid, credential: &str) -> Result<(Uuid, Ability)> {
        if credential == CREDENTIAL {
            Ok((self.user_id, self.role))
        } else {
            Err(AuthError::AccessDenied)
        }
    }
}

fn service_with(policy: TokenPolicy) -> (AuthenticationService, Uuid) {
    let fingerprinter = TokenFingerprinter::new("test-fingerprint-key");
    let secrets = TokenSecretGenerator::new(policy.secret_length);
    let store = Arc::new(MemoryAuthenticationStore::new(fingerprinter, secrets));
    let user_id = Uuid::new_v4();
    let users = Arc::new(StaticUserStore {
        user_id,
        role: Ability::Admin,
    });
    (AuthenticationService::new(store, users, policy), user_id)
}

fn service() -> (AuthenticationService, Uuid) {
    service_with(TokenPolicy::default())
}

fn access_value(auth: &Authentication) -> String {
    auth.access_token
        .as_ref()
        .and_then(|t| t.value.clone())
        .expect("issued aggregate carries the raw access secret")
}

fn refresh_value(auth: &Authentication) -> String {
    auth.refresh_token
        .as_ref()
        .and_then(|t| t.value.clone())
        .expect("issued aggregate carries the raw refresh secret")
}

#[tokio::test]
async fn test_login_issues_live_token_pair() {
    let (service, user_id) = service();
    let identifier = Uuid::new_v4();

    let auth = service.login(identifier, CREDENTIAL).await.unwrap();

    assert_eq!(auth.identifier, identifier);
    assert_eq!(auth.user, user_id);
    assert_eq!(auth.abilities, vec![Ability::Admin]);

    let access = access_value(&auth);
    let refresh = refresh_value(&auth);
    assert_eq!(access.len(), 64);
    assert_eq!(refresh.len(), 64);
    assert_ne!(access, refresh);

    let now = chrono::Utc::now();
    let access_expires = auth.access_token.as_ref().unwrap().expires_at.unwrap();
    let refresh_expires = auth.refresh_token.as_ref().unwrap().expires_at.unwrap();
    assert!(access_expires > now);
    assert!(refresh_expires > access_expires);

    assert!(service.introspect(&access, "ACCESS").await.unwrap());
    assert!(service.introspect(&refresh, "REFRESH").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_identifier_conflicts() {
    let (service, _) = service();
    let identifier = Uuid::new_v4();

    service.login(identifier, CREDENTIAL).await.unwrap();
    let err = service.login(identifier, CREDENTIAL).await.unwrap_err();

    assert!(matches!(err, AuthError::Conflict(_)));
}

#[tokio::test]
async fn test_bad_credential_is_access_denied() {
    let (service, _) = service();

    let err = service.login(Uuid::new_v4(), "wrong").await.unwrap_err();

    assert!(matches!(err, AuthError::AccessDenied));
}

#[tokio::test]
async fn test_expired_access_does_not_touch_refresh() {
    // A negative access TTL issues the access token already expired
    let (service, _) = service_with(TokenPolicy {
        access_ttl: Duration::seconds(-1),
        ..TokenPolicy::default()
    });

    let auth = service.login(Uuid::new_v4(), CREDENTIAL).await.unwrap();

    assert!(!service.introspect(&access_value(&auth), "ACCESS").await.unwrap());
    assert!(service.introspect(&refresh_value(&auth), "REFRESH").await.unwrap());
}

#[tokio::test]
async fn test_introspect_unknown_secret_is_false_not_an_error() {
    let (service, _) = service();

    assert!(!service.introspect("no-such-secret", "ACCESS").await.unwrap());
    assert!(!service.introspect("no-such-secret", "REFRESH").await.unwrap());
}

#[tokio::test]
async fn test_unknown_token_type_is_invalid_argument() {
    let (service, _) = service();

    for result in [
        service.introspect("whatever", "BEARER").await.err(),
        service.refresh("whatever", "SESSION").await.err(),
        service.revoke("whatever", "").await.err(),
    ] {
        assert!(matches!(result, Some(AuthError::InvalidArgument(_))));
    }
}

#[tokio::test]
async fn test_refresh_refuses_access_typed_secrets() {
    let (service, _) = service();
    let auth = service.login(Uuid::new_v4(), CREDENTIAL).await.unwrap();

    // Even a perfectly valid access secret is not exchangeable
    let err = service.refresh(&access_value(&auth), "ACCESS").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
}

#[tokio::test]
async fn test_refresh_rotates_both_slots() {
    let (service, _) = service();
    let identifier = Uuid::new_v4();
    let original = service.login(identifier, CREDENTIAL).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let rotated = service
        .refresh(&refresh_value(&original), "REFRESH")
        .await
        .unwrap();

    assert_eq!(rotated.identifier, identifier);
    assert_ne!(access_value(&rotated), access_value(&original));
    assert_ne!(refresh_value(&rotated), refresh_value(&original));
    assert!(
        rotated.access_token.as_ref().unwrap().expires_at.unwrap()
            > original.access_token.as_ref().unwrap().expires_at.unwrap()
    );
    assert!(
        rotated.refresh_token.as_ref().unwrap().expires_at.unwrap()
            > original.refresh_token.as_ref().unwrap().expires_at.unwrap()
    );

    // The new pair is live, the old pair is dead
    assert!(service.introspect(&access_value(&rotated), "ACCESS").await.unwrap());
    assert!(service.introspect(&refresh_value(&rotated), "REFRESH").await.unwrap());
    assert!(!service.introspect(&access_value(&original), "ACCESS").await.unwrap());
    assert!(!service.introspect(&refresh_value(&original), "REFRESH").await.unwrap());
}

#[tokio::test]
async fn test_spent_refresh_secret_cannot_be_replayed() {
    let (service, _) = service();
    let auth = service.login(Uuid::new_v4(), CREDENTIAL).await.unwrap();
    let spent = refresh_value(&auth);

    service.refresh(&spent, "REFRESH").await.unwrap();

    let err = service.refresh(&spent, "REFRESH").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
}

#[tokio::test]
async fn test_racing_refreshes_have_exactly_one_winner() {
    let (service, _) = service();
    let service = Arc::new(service);
    let auth = service.login(Uuid::new_v4(), CREDENTIAL).await.unwrap();
    let secret = refresh_value(&auth);

    let a = tokio::spawn({
        let service = Arc::clone(&service);
        let secret = secret.clone();
        async move { service.refresh(&secret, "REFRESH").await }
    });
    let b = tokio::spawn({
        let service = Arc::clone(&service);
        let secret = secret.clone();
        async move { service.refresh(&secret, "REFRESH").await }
    });

    let outcomes = [a.await.unwrap(), b.await.unwrap()];
    let winners = outcomes.iter().filter(|r| r.is_ok()).count();

    assert_eq!(winners, 1);
    assert!(outcomes
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, AuthError::InvalidToken)));
}

#[tokio::test]
async fn test_revoke_clears_one_slot_at_a_time() {
    let (service, _) = service();
    let identifier = Uuid::new_v4();
    let auth = service.login(identifier, CREDENTIAL).await.unwrap();
    let access = access_value(&auth);
    let refresh = refresh_value(&auth);

    service.revoke(&access, "ACCESS").await.unwrap();
    assert!(!service.introspect(&access, "ACCESS").await.unwrap());
    assert!(service.introspect(&refresh, "REFRESH").await.unwrap());

    let row = service.find(identifier).await.unwrap();
    assert!(row.access_token.is_none());
    assert!(row.refresh_token.is_some());

    service.revoke(&refresh, "REFRESH").await.unwrap();
    assert!(!service.introspect(&refresh, "REFRESH").await.unwrap());

    // Fully revoked, but the row survives until logout
    let row = service.find(identifier).await.unwrap();
    assert!(row.access_token.is_none());
    assert!(row.refresh_token.is_none());
}

#[tokio::test]
async fn test_revoke_unknown_secret_is_invalid_token() {
    let (service, _) = service();

    let err = service.revoke("no-such-secret", "ACCESS").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
}

#[tokio::test]
async fn test_logout_destroys_the_row() {
    let (service, _) = service();
    let identifier = Uuid::new_v4();
    service.login(identifier, CREDENTIAL).await.unwrap();

    service.logout(identifier).await.unwrap();

    assert!(matches!(
        service.find(identifier).await.unwrap_err(),
        AuthError::NotFound(_)
    ));
    assert!(matches!(
        service.logout(identifier).await.unwrap_err(),
        AuthError::NotFound(_)
    ));
}

/// End-to-end admin session: issue, rotate, revoke the new access token.
#[tokio::test]
async fn test_admin_session_lifecycle() {
    let (service, _) = service();
    let identifier = Uuid::new_v4();

    let issued = service.login(identifier, CREDENTIAL).await.unwrap();
    assert_eq!(issued.abilities, vec![Ability::Admin]);
    assert_eq!(
        serde_json::to_value(&issued.abilities).unwrap(),
        serde_json::json!(["ADMIN"])
    );

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let rotated = service
        .refresh(&refresh_value(&issued), "REFRESH")
        .await
        .unwrap();
    assert_eq!(rotated.identifier, identifier);

    let new_access = access_value(&rotated);
    let new_refresh = refresh_value(&rotated);

    service.revoke(&new_access, "ACCESS").await.unwrap();
    assert!(!service.introspect(&new_access, "ACCESS").await.unwrap());
    assert!(service.introspect(&new_refresh, "REFRESH").await.unwrap());

    service.logout(identifier).await.unwrap();

    assert_eq!(
        rotated.refresh_token.unwrap().token_type,
        TokenType::Refresh
    );
}
