//! Registration, login and session resolution.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use somon_shared::config::{LedgerConfig, SessionConfig};
use somon_shared::types::AccountId;
use tracing::{info, warn};

use super::credential::{Argon2Verifier, CredentialVerifier};
use super::error::AuthError;
use super::session::{NewSession, SessionStore};
use super::token::{SessionToken, hash_token};
use crate::ledger::{Account, LedgerStore, NewAccount};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Tunables for [`AuthService`].
#[derive(Debug, Clone, Copy)]
pub struct AuthSettings {
    /// How long an issued session stays valid.
    pub session_ttl: TimeDelta,
    /// Home-currency balance every new account opens with.
    pub starting_grant: Decimal,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl: TimeDelta::weeks(1),
            starting_grant: Decimal::ONE_HUNDRED,
        }
    }
}

impl AuthSettings {
    /// Builds settings from the loaded configuration sections.
    #[must_use]
    pub fn from_config(session: &SessionConfig, ledger: &LedgerConfig) -> Self {
        let session_ttl = i64::try_from(session.ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::weeks(1));

        Self {
            session_ttl,
            starting_grant: ledger.starting_grant,
        }
    }
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The authenticated account.
    pub account: Account,
    /// Raw bearer token. Shown to the client once, never stored.
    pub token: SessionToken,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Account registration and session management.
#[derive(Debug)]
pub struct AuthService<L: LedgerStore, S: SessionStore, V: CredentialVerifier = Argon2Verifier> {
    ledger: Arc<L>,
    sessions: Arc<S>,
    verifier: V,
    settings: AuthSettings,
}

impl<L: LedgerStore, S: SessionStore, V: CredentialVerifier> AuthService<L, S, V> {
    /// Creates the service.
    pub const fn new(ledger: Arc<L>, sessions: Arc<S>, verifier: V, settings: AuthSettings) -> Self {
        Self {
            ledger,
            sessions,
            verifier,
            settings,
        }
    }

    /// Opens an account with the configured starting grant.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for an empty name, an email without `@`
    ///   or a password shorter than [`MIN_PASSWORD_LEN`]
    /// - [`AuthError::EmailTaken`] if the email is already registered
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Account, AuthError> {
        let name = name.trim();
        let email = normalize_email(email);

        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }
        if !email.contains('@') {
            return Err(AuthError::Validation("Email address is invalid".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.ledger.find_account_by_email(&email).await?.is_some() {
            warn!(%email, "registration with an existing email");
            return Err(AuthError::EmailTaken(email));
        }

        let password_hash = self.verifier.hash(password)?;
        let account = self
            .ledger
            .create_account(NewAccount {
                name: name.to_string(),
                email,
                password_hash,
                opening_balance: self.settings.starting_grant,
            })
            .await?;

        info!(account_id = %account.id, "account registered");
        Ok(account)
    }

    /// Verifies credentials and issues a session.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] for an unknown email or a wrong
    /// password alike.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = normalize_email(email);

        let Some(account) = self.ledger.find_account_by_email(&email).await? else {
            warn!("login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verifier.verify(password, &account.password_hash)? {
            warn!(account_id = %account.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = SessionToken::generate();
        let expires_at = Utc::now()
            .checked_add_signed(self.settings.session_ttl)
            .ok_or_else(|| AuthError::Store("session expiry out of range".to_string()))?;

        self.sessions
            .create(NewSession {
                account_id: account.id,
                token_hash: token.hash(),
                expires_at,
            })
            .await?;

        info!(account_id = %account.id, %expires_at, "session issued");
        Ok(LoginOutcome {
            account,
            token,
            expires_at,
        })
    }

    /// Resolves a raw bearer token to the account it authenticates.
    ///
    /// # Errors
    ///
    /// [`AuthError::SessionNotFound`] if the token is unknown, revoked or
    /// expired.
    pub async fn resolve(&self, token: &str) -> Result<AccountId, AuthError> {
        self.sessions
            .find_active(&hash_token(token), Utc::now())
            .await?
            .map(|session| session.account_id)
            .ok_or(AuthError::SessionNotFound)
    }

    /// Ends the session for a raw bearer token. Idempotent.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if self.sessions.revoke(&hash_token(token)).await? {
            info!("session revoked");
        }
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
