//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for accounts, transfers, conversions and rates
//! - Session authentication middleware
//! - JSON error rendering for domain errors

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use somon_core::auth::{Argon2Verifier, AuthService, AuthSettings, SessionStore};
use somon_core::currency::{
    OpenExchangeRatesClient, PivotConfig, RateError, RateResolver, RateSource, RateSourceConfig,
};
use somon_core::ledger::{LedgerService, LedgerStore};
use somon_db::{LedgerRepository, SessionRepository};
use somon_shared::AppConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// The storage and rate source implementations the API runs on.
pub trait Backend: Send + Sync + 'static {
    /// Account and history storage.
    type Ledger: LedgerStore + 'static;
    /// Session storage.
    type Sessions: SessionStore + 'static;
    /// Market price source.
    type Rates: RateSource + 'static;
}

/// Postgres storage with Open Exchange Rates prices.
#[derive(Debug)]
pub struct PostgresBackend;

impl Backend for PostgresBackend {
    type Ledger = LedgerRepository;
    type Sessions = SessionRepository;
    type Rates = OpenExchangeRatesClient;
}

/// Application state shared across handlers.
pub struct AppState<B: Backend> {
    /// Ledger engine.
    pub ledger: LedgerService<B::Ledger>,
    /// Registration and sessions.
    pub auth: Arc<AuthService<B::Ledger, B::Sessions>>,
    /// Exchange rate resolver.
    pub rates: Arc<RateResolver<B::Rates>>,
    /// Name of the cookie carrying the session token.
    pub cookie_name: Arc<str>,
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            auth: Arc::clone(&self.auth),
            rates: Arc::clone(&self.rates),
            cookie_name: Arc::clone(&self.cookie_name),
        }
    }
}

impl<B: Backend> AppState<B> {
    /// Wires the services over one ledger store.
    pub fn new(
        ledger: Arc<B::Ledger>,
        sessions: Arc<B::Sessions>,
        rates: RateResolver<B::Rates>,
        settings: AuthSettings,
        cookie_name: impl Into<Arc<str>>,
    ) -> Self {
        let auth = AuthService::new(Arc::clone(&ledger), sessions, Argon2Verifier, settings);
        Self {
            ledger: LedgerService::new(ledger),
            auth: Arc::new(auth),
            rates: Arc::new(rates),
            cookie_name: cookie_name.into(),
        }
    }
}

impl AppState<PostgresBackend> {
    /// Builds the production state from a database pool and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Configuration`] if the rate source or the pivot
    /// peg is misconfigured.
    pub fn from_config(db: DatabaseConnection, config: &AppConfig) -> Result<Self, RateError> {
        let source = OpenExchangeRatesClient::new(RateSourceConfig::from(&config.rates))?;
        let pivot = PivotConfig::try_from(&config.rates)?;

        Ok(Self::new(
            Arc::new(LedgerRepository::new(db.clone())),
            Arc::new(SessionRepository::new(db)),
            RateResolver::new(source, pivot),
            AuthSettings::from_config(&config.session, &config.ledger),
            config.session.cookie_name.as_str(),
        ))
    }
}

/// Creates the main application router.
pub fn create_router<B: Backend>(state: AppState<B>) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
