//! In-memory session store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use somon_shared::types::SessionId;

use super::error::AuthError;
use super::session::{NewSession, Session, SessionStore};

/// [`SessionStore`] kept in process memory, keyed by token hash.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Session>>, AuthError> {
        self.sessions
            .lock()
            .map_err(|_| AuthError::Store("session state lock poisoned".to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    async fn create(&self, input: NewSession) -> Result<Session, AuthError> {
        let session = Session {
            id: SessionId::new(),
            account_id: input.account_id,
            expires_at: input.expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        };
        self.lock()?.insert(input.token_hash, session.clone());
        Ok(session)
    }

    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, AuthError> {
        Ok(self
            .lock()?
            .get(token_hash)
            .filter(|s| s.is_active(now))
            .cloned())
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, AuthError> {
        let mut sessions = self.lock()?;
        match sessions.get_mut(token_hash) {
            Some(session) if session.revoked_at.is_none() => {
                session.revoked_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
