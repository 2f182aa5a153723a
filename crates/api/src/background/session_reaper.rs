//! Periodic removal of expired sessions.
//!
//! Expired sessions are already refused by every lookup; this job only
//! reclaims their storage.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::auth::session::SessionManager;

/// Run the session cleanup loop every `interval` until `cancel` fires.
pub async fn run(sessions: Arc<SessionManager>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Session reaper started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session reaper stopping");
                break;
            }
            _ = ticker.tick() => {
                match sessions.purge_expired().await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Session reaper: purged expired sessions");
                    }
                    Ok(_) => tracing::debug!("Session reaper: nothing to purge"),
                    Err(e) => tracing::error!(error = %e, "Session reaper: cleanup failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tessera_core::session_token::generate_session_token;
    use tessera_db::models::session::NewSession;
    use tessera_db::repositories::{MemorySessionRepo, SessionStore};

    use super::*;
    use crate::auth::session::SessionConfig;

    #[tokio::test]
    async fn purges_on_first_tick_and_stops_on_cancel() {
        let store = Arc::new(MemorySessionRepo::new());
        let sessions = Arc::new(SessionManager::new(store.clone(), &SessionConfig::default()));

        let live = sessions.create_session(1).await.unwrap();
        store
            .insert(NewSession {
                token_hash: generate_session_token().hash,
                user_id: 2,
                expires_at: Utc::now() - chrono::Duration::seconds(5),
            })
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            sessions.clone(),
            Duration::from_secs(3600),
            cancel.clone(),
        ));

        // The first tick fires immediately.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.len().await, 1);
        assert_eq!(sessions.validate_session(&live.token).await.unwrap(), 1);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reaper should stop after cancel")
            .unwrap();
    }
}
