//! Behaviour tests for the in-memory store implementations.
//!
//! These run without a database and pin down the contract every
//! `SessionStore` / `UserDirectory` implementation must honour.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use tessera_db::models::session::{NewSession, Rotation, SessionSuccessor};
use tessera_db::models::user::CreateUser;
use tessera_db::repositories::{MemorySessionRepo, MemoryUserRepo, SessionStore, UserDirectory};
use tessera_db::StoreError;

fn new_session(key: &str, expires_in: Duration) -> NewSession {
    NewSession {
        token_hash: key.to_string(),
        user_id: 7,
        expires_at: Utc::now() + expires_in,
    }
}

fn new_user(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$placeholder".to_string(),
        display_name: "Test User".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn inserted_session_can_be_found() {
    let store = MemorySessionRepo::new();
    store.insert(new_session("k1", Duration::days(1))).await.unwrap();

    let found = store.find("k1").await.unwrap().expect("session should exist");
    assert_eq!(found.user_id, 7);
    assert!(store.find("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_key_is_a_conflict() {
    let store = MemorySessionRepo::new();
    store.insert(new_session("k1", Duration::days(1))).await.unwrap();

    let result = store.insert(new_session("k1", Duration::days(1))).await;
    assert_matches!(result, Err(StoreError::Conflict(_)));
}

fn successor(key: &str) -> SessionSuccessor {
    SessionSuccessor {
        token_hash: key.to_string(),
        expires_at: Utc::now() + Duration::days(1),
    }
}

#[tokio::test]
async fn rotate_replaces_the_record_once() {
    let store = MemorySessionRepo::new();
    store.insert(new_session("k1", Duration::days(1))).await.unwrap();

    let next = store.rotate("k1", successor("k2"), Utc::now()).await.unwrap();
    assert_matches!(next, Rotation::Rotated(ref s) if s.token_hash == "k2" && s.user_id == 7);

    assert_matches!(
        store.rotate("k1", successor("k3"), Utc::now()).await.unwrap(),
        Rotation::Missing
    );
    assert!(store.find("k1").await.unwrap().is_none());
    assert!(store.find("k3").await.unwrap().is_none());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn rotate_of_expired_record_inserts_nothing() {
    let store = MemorySessionRepo::new();
    store.insert(new_session("old", Duration::seconds(-5))).await.unwrap();

    let outcome = store.rotate("old", successor("new"), Utc::now()).await.unwrap();

    assert_matches!(outcome, Rotation::Expired(_));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn failed_rotation_keeps_the_old_record() {
    let store = MemorySessionRepo::new();
    store.insert(new_session("old", Duration::days(1))).await.unwrap();
    store.insert(new_session("taken", Duration::days(1))).await.unwrap();

    let result = store.rotate("old", successor("taken"), Utc::now()).await;

    assert_matches!(result, Err(StoreError::Conflict(_)));
    assert!(store.find("old").await.unwrap().is_some());
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn concurrent_rotate_has_a_single_winner() {
    let store = Arc::new(MemorySessionRepo::new());
    store.insert(new_session("k1", Duration::days(1))).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let outcome = store
                    .rotate("k1", successor(&format!("next-{i}")), Utc::now())
                    .await
                    .unwrap();
                matches!(outcome, Rotation::Rotated(_))
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn delete_reports_whether_a_row_existed() {
    let store = MemorySessionRepo::new();
    store.insert(new_session("k1", Duration::days(1))).await.unwrap();

    assert!(store.delete("k1").await.unwrap());
    assert!(!store.delete("k1").await.unwrap());
}

#[tokio::test]
async fn delete_expired_keeps_live_sessions() {
    let store = MemorySessionRepo::new();
    store.insert(new_session("live", Duration::days(1))).await.unwrap();
    store.insert(new_session("old-1", Duration::seconds(-5))).await.unwrap();
    store.insert(new_session("old-2", Duration::days(-3))).await.unwrap();

    let purged = store.delete_expired(Utc::now()).await.unwrap();

    assert_eq!(purged, 2);
    assert_eq!(store.len().await, 1);
    assert!(store.find("live").await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_user_is_found_by_name_and_id() {
    let users = MemoryUserRepo::new();
    let alice = users.create(new_user("alice")).await.unwrap();

    let by_name = users.find_by_username("alice").await.unwrap().unwrap();
    let by_id = users.find_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(by_name.id, alice.id);
    assert_eq!(by_id.username, "alice");
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let users = MemoryUserRepo::new();
    users.create(new_user("alice")).await.unwrap();

    let mut second = new_user("alice");
    second.email = "someone-else@example.com".to_string();
    assert_matches!(users.create(second).await, Err(StoreError::Conflict(_)));
}

#[tokio::test]
async fn usernames_are_case_sensitive() {
    let users = MemoryUserRepo::new();
    users.create(new_user("alice")).await.unwrap();

    assert!(users.find_by_username("Alice").await.unwrap().is_none());
    assert!(users.create(new_user("Alice")).await.is_ok());
}

#[tokio::test]
async fn removed_user_is_gone() {
    let users = MemoryUserRepo::new();
    let bob = users.create(new_user("bob")).await.unwrap();

    assert!(users.remove(bob.id).await);
    assert!(users.find_by_id(bob.id).await.unwrap().is_none());
}
