//! Login sessions and their storage capability.

use chrono::{DateTime, Utc};
use somon_shared::types::{AccountId, SessionId};

use super::error::AuthError;

/// A login session. The token itself is never kept, only its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session ID.
    pub id: SessionId,
    /// Account the session authenticates.
    pub account_id: AccountId,
    /// When the session stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// When the session was ended by logout.
    pub revoked_at: Option<DateTime<Utc>>,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Returns true if the session authenticates requests at `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// Input for issuing a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Account being logged in.
    pub account_id: AccountId,
    /// SHA-256 hex digest of the issued token.
    pub token_hash: String,
    /// Expiry.
    pub expires_at: DateTime<Utc>,
}

/// Persistence for sessions, keyed by token hash.
pub trait SessionStore: Send + Sync {
    /// Stores a new session.
    fn create(
        &self,
        input: NewSession,
    ) -> impl std::future::Future<Output = Result<Session, AuthError>> + Send;

    /// Finds the session for a token hash if it is active at `now`.
    fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Option<Session>, AuthError>> + Send;

    /// Revokes the session for a token hash.
    ///
    /// Returns false if there was no active session. Revoking twice is not
    /// an error.
    fn revoke(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<bool, AuthError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn session(expires_in: TimeDelta, revoked: bool) -> Session {
        let now = Utc::now();
        Session {
            id: SessionId::new(),
            account_id: AccountId::new(),
            expires_at: now + expires_in,
            revoked_at: revoked.then_some(now),
            created_at: now,
        }
    }

    #[test]
    fn test_is_active() {
        let now = Utc::now();
        assert!(session(TimeDelta::hours(1), false).is_active(now));
        assert!(!session(TimeDelta::hours(1), true).is_active(now));
        assert!(!session(TimeDelta::hours(-1), false).is_active(now));
    }
}
