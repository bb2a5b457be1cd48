//! Exchange rate lookup route.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use somon_core::currency::RateQuote;
use somon_shared::types::Currency;

use crate::{ApiError, AppState, Backend, middleware::AuthUser};

/// Creates the rate routes (requires auth middleware to be applied externally).
pub fn routes<B: Backend>() -> Router<AppState<B>> {
    Router::new().route("/rates", get(get_rate::<B>))
}

/// Query parameters for a rate lookup.
#[derive(Debug, Deserialize)]
pub struct RateQuery {
    /// Source currency code.
    pub from: Currency,
    /// Target currency code.
    pub to: Currency,
}

/// GET /rates?from=&to= - Resolve the current rate for a currency pair.
async fn get_rate<B: Backend>(
    State(state): State<AppState<B>>,
    _user: AuthUser,
    Query(query): Query<RateQuery>,
) -> Result<Json<RateQuote>, ApiError> {
    Ok(Json(state.rates.resolve(query.from, query.to).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::test_support::TestApp;

    fn rate(body: &serde_json::Value) -> Decimal {
        body["rate"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_same_currency_rate_skips_source() {
        let app = TestApp::new();
        let token = app.register_and_login("rates-same@example.com").await;

        let (status, body) = app.get("/api/v1/rates?from=EUR&to=EUR", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rate(&body), Decimal::ONE);
        assert_eq!(app.source_calls(), 0);
    }

    #[tokio::test]
    async fn test_pivot_rates() {
        let app = TestApp::new();
        let token = app.register_and_login("rates-pivot@example.com").await;

        let (_, body) = app.get("/api/v1/rates?from=TJS&to=EUR", Some(&token)).await;
        assert_eq!(rate(&body), dec!(0.0828));

        let (_, body) = app.get("/api/v1/rates?from=USD&to=EUR", Some(&token)).await;
        assert_eq!(rate(&body), dec!(0.9));
    }

    #[tokio::test]
    async fn test_unsupported_currency_is_rejected() {
        let app = TestApp::new();
        let token = app.register_and_login("rates-bad@example.com").await;

        let (status, _) = app.get("/api/v1/rates?from=GBP&to=EUR", Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_price_is_unprocessable() {
        let app = TestApp::without_prices();
        let token = app.register_and_login("rates-missing@example.com").await;

        let (status, body) = app.get("/api/v1/rates?from=USD&to=EUR", Some(&token)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "RATE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_pivot_to_reference_asks_the_source() {
        let app = TestApp::without_prices();
        let token = app.register_and_login("rates-peg@example.com").await;

        let (status, body) = app.get("/api/v1/rates?from=TJS&to=USD", Some(&token)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "RATE_UNAVAILABLE");
        assert_eq!(app.source_calls(), 1);
    }

    #[tokio::test]
    async fn test_rates_require_session() {
        let app = TestApp::new();
        let (status, _) = app.get("/api/v1/rates?from=USD&to=EUR", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
