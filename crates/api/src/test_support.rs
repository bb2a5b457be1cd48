//! In-memory application harness for route tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use somon_core::auth::{AuthSettings, InMemorySessionStore};
use somon_core::currency::{PivotConfig, RateError, RateResolver, RateSource};
use somon_core::ledger::InMemoryLedgerStore;
use somon_shared::types::Currency;
use tower::ServiceExt;

use crate::{AppState, Backend, create_router};

/// Fixed reference-relative prices that count how often they are read.
#[derive(Debug, Default)]
pub struct StaticPrices {
    prices: HashMap<String, Decimal>,
    calls: Arc<AtomicUsize>,
}

impl RateSource for StaticPrices {
    async fn latest_prices(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<HashMap<String, Decimal>, RateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .prices
            .iter()
            .filter(|(code, _)| *code == from.code() || *code == to.code())
            .map(|(code, price)| (code.clone(), *price))
            .collect())
    }
}

/// Everything in memory.
pub struct MemoryBackend;

impl Backend for MemoryBackend {
    type Ledger = InMemoryLedgerStore;
    type Sessions = InMemorySessionStore;
    type Rates = StaticPrices;
}

pub struct TestApp {
    router: Router,
    calls: Arc<AtomicUsize>,
}

impl TestApp {
    /// USD = 1, EUR = 0.9 with the default TJS peg.
    pub fn new() -> Self {
        Self::with_prices(&[(Currency::Usd, dec!(1)), (Currency::Eur, dec!(0.9))])
    }

    pub fn without_prices() -> Self {
        Self::with_prices(&[])
    }

    fn with_prices(prices: &[(Currency, Decimal)]) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = StaticPrices {
            prices: prices
                .iter()
                .map(|(c, p)| (c.code().to_string(), *p))
                .collect(),
            calls: Arc::clone(&calls),
        };

        let state = AppState::<MemoryBackend>::new(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(InMemorySessionStore::new()),
            RateResolver::new(source, PivotConfig::default()),
            AuthSettings::default(),
            "auth_token",
        );

        Self {
            router: create_router(state),
            calls,
        }
    }

    pub fn source_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn json(response: Response<Body>) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        Self::json(self.send(request.body(Body::empty()).unwrap()).await).await
    }

    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        Self::json(self.send(request).await).await
    }

    pub async fn raw_post(&self, uri: &str, body: Value) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        Self::json(self.send(request.body(Body::from(body.to_string())).unwrap()).await).await
    }

    /// Registers `email` with the password `password123`.
    pub async fn register(&self, email: &str) {
        let name = email.split('@').next().unwrap_or(email);
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({ "name": name, "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    }

    /// Registers and logs in, returning the bearer token.
    pub async fn register_and_login(&self, email: &str) -> String {
        self.register(email).await;
        let (status, body) = self
            .post(
                "/api/v1/auth/login",
                None,
                json!({ "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_owned()
    }
}
