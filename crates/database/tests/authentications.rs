//! Repository tests against a live Postgres with the migrations applied.
//! Run with `cargo test -p memoria-database -- --ignored`.

use chrono::{Duration, Utc};
use memoria_database::{AuthenticationRepository, Database, DatabaseConfig, DatabaseError};
use memoria_models::{Ability, NewAuthentication, TokenType};
use uuid::Uuid;

async fn repository() -> AuthenticationRepository {
    let db = Database::new(DatabaseConfig::from_env())
        .await
        .expect("Failed to connect to database");
    AuthenticationRepository::new(db.pool().clone())
}

fn fresh_row() -> NewAuthentication {
    let now = Utc::now();
    NewAuthentication {
        identifier: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        abilities: vec![Ability::Admin],
        access_token_hash: Some(Uuid::new_v4().to_string()),
        access_expires_at: Some(now + Duration::minutes(15)),
        refresh_token_hash: Some(Uuid::new_v4().to_string()),
        refresh_expires_at: Some(now + Duration::days(14)),
    }
}

#[tokio::test]
#[ignore] // Only run with database available
async fn test_insert_and_find() {
    let repo = repository().await;
    let new = fresh_row();

    let created = repo.insert(&new).await.expect("insert failed");
    assert_eq!(created.identifier, new.identifier);
    assert_eq!(created.abilities, vec![Ability::Admin]);

    let found = repo.find_by_identifier(new.identifier).await.expect("find failed");
    assert_eq!(found.access_token_hash, new.access_token_hash);
    assert_eq!(found.refresh_token_hash, new.refresh_token_hash);

    repo.delete(new.identifier).await.expect("cleanup failed");
}

#[tokio::test]
#[ignore] // Only run with database available
async fn test_duplicate_identifier_is_a_conflict() {
    let repo = repository().await;
    let new = fresh_row();

    repo.insert(&new).await.expect("insert failed");

    let mut duplicate = fresh_row();
    duplicate.identifier = new.identifier;
    let err = repo.insert(&duplicate).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)));

    repo.delete(new.identifier).await.expect("cleanup failed");
}

#[tokio::test]
#[ignore] // Only run with database available
async fn test_rotate_is_single_use() {
    let repo = repository().await;
    let new = fresh_row();
    repo.insert(&new).await.expect("insert failed");

    let old_refresh = new.refresh_token_hash.clone().unwrap();
    let now = Utc::now();

    let rotated = repo
        .rotate(
            &old_refresh,
            &Uuid::new_v4().to_string(),
            now + Duration::minutes(15),
            &Uuid::new_v4().to_string(),
            now + Duration::days(14),
        )
        .await
        .expect("rotate query failed")
        .expect("first rotation should win");
    assert_eq!(rotated.identifier, new.identifier);
    assert_ne!(rotated.refresh_token_hash.as_deref(), Some(old_refresh.as_str()));

    // The matched fingerprint is gone, so replaying it finds nothing
    let replay = repo
        .rotate(
            &old_refresh,
            &Uuid::new_v4().to_string(),
            now + Duration::minutes(15),
            &Uuid::new_v4().to_string(),
            now + Duration::days(14),
        )
        .await
        .expect("rotate query failed");
    assert!(replay.is_none());

    repo.delete(new.identifier).await.expect("cleanup failed");
}

#[tokio::test]
#[ignore] // Only run with database available
async fn test_clear_slot_leaves_the_other_slot_intact() {
    let repo = repository().await;
    let new = fresh_row();
    repo.insert(&new).await.expect("insert failed");

    let access = new.access_token_hash.clone().unwrap();
    assert!(repo.clear_slot(TokenType::Access, &access).await.expect("clear failed"));
    // Clearing the same fingerprint again matches nothing
    assert!(!repo.clear_slot(TokenType::Access, &access).await.expect("clear failed"));

    let row = repo.find_by_identifier(new.identifier).await.expect("find failed");
    assert!(row.access_token_hash.is_none());
    assert!(row.access_expires_at.is_none());
    assert_eq!(row.refresh_token_hash, new.refresh_token_hash);

    repo.delete(new.identifier).await.expect("cleanup failed");
}

#[tokio::test]
#[ignore] // Only run with database available
async fn test_delete_missing_row_is_not_found() {
    let repo = repository().await;
    let err = repo.delete(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));
}
