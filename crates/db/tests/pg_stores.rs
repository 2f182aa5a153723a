//! PostgreSQL store tests. Require `DATABASE_URL`; run with `--ignored`.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tessera_db::models::session::{NewSession, Rotation, SessionSuccessor};
use tessera_db::models::user::CreateUser;
use tessera_db::repositories::{PgSessionRepo, PgUserRepo, SessionStore, UserDirectory};
use tessera_db::StoreError;

async fn seed_user(pool: &PgPool, username: &str) -> i64 {
    let users = PgUserRepo::new(pool.clone());
    users
        .create(CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "$argon2id$placeholder".to_string(),
            display_name: "Test User".to_string(),
        })
        .await
        .expect("user creation should succeed")
        .id
}

async fn insert_session(store: &PgSessionRepo, key: &str, user_id: i64, offset: Duration) {
    store
        .insert(NewSession {
            token_hash: key.to_string(),
            user_id,
            expires_at: Utc::now() + offset,
        })
        .await
        .unwrap();
}

fn successor(key: &str) -> SessionSuccessor {
    SessionSuccessor {
        token_hash: key.to_string(),
        expires_at: Utc::now() + Duration::days(14),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn rotate_is_single_use(pool: PgPool) {
    let user_id = seed_user(&pool, "pg-rotate").await;
    let store = PgSessionRepo::new(pool);
    insert_session(&store, "h1", user_id, Duration::days(14)).await;

    let (a, b) = tokio::join!(
        store.rotate("h1", successor("h2"), Utc::now()),
        store.rotate("h1", successor("h3"), Utc::now())
    );
    let winners = [a.unwrap(), b.unwrap()]
        .iter()
        .filter(|outcome| matches!(outcome, Rotation::Rotated(_)))
        .count();
    assert_eq!(winners, 1);
    assert!(store.find("h1").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn failed_rotation_rolls_back(pool: PgPool) {
    let user_id = seed_user(&pool, "pg-rollback").await;
    let store = PgSessionRepo::new(pool);
    insert_session(&store, "old", user_id, Duration::days(14)).await;
    insert_session(&store, "taken", user_id, Duration::days(14)).await;

    let result = store.rotate("old", successor("taken"), Utc::now()).await;

    assert_matches!(result, Err(StoreError::Conflict(_)));
    assert!(store.find("old").await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn duplicate_username_maps_to_conflict(pool: PgPool) {
    seed_user(&pool, "pg-dup").await;
    let users = PgUserRepo::new(pool);

    let result = users
        .create(CreateUser {
            username: "pg-dup".to_string(),
            email: "other@example.com".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            display_name: "Other".to_string(),
        })
        .await;
    assert_matches!(result, Err(StoreError::Conflict(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn delete_expired_purges_only_past_rows(pool: PgPool) {
    let user_id = seed_user(&pool, "pg-reaper").await;
    let store = PgSessionRepo::new(pool);
    for (key, offset) in [("live", Duration::days(1)), ("dead", Duration::days(-1))] {
        store
            .insert(NewSession {
                token_hash: key.to_string(),
                user_id,
                expires_at: Utc::now() + offset,
            })
            .await
            .unwrap();
    }

    assert_eq!(store.delete_expired(Utc::now()).await.unwrap(), 1);
    assert!(store.find("live").await.unwrap().is_some());
}
