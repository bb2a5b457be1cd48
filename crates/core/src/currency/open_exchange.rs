//! Open Exchange Rates client.
//!
//! Talks to the `latest.json` endpoint, which quotes every currency against
//! USD. Only the two requested symbols are fetched.

use std::collections::HashMap;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use somon_shared::config::RatesConfig;
use somon_shared::types::Currency;
use tracing::{debug, warn};

use super::error::RateError;
use super::source::RateSource;

/// Connection settings for the external rate source.
#[derive(Clone)]
pub struct RateSourceConfig {
    /// Application id sent with every request.
    pub app_id: Option<String>,
    /// API base URL, without the trailing endpoint.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for RateSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateSourceConfig")
            .field("app_id", &self.app_id.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl From<&RatesConfig> for RateSourceConfig {
    fn from(config: &RatesConfig) -> Self {
        Self {
            app_id: config.app_id.clone(),
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Body of a `latest.json` response. Everything but `rates` is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct LatestResponse {
    pub(crate) rates: HashMap<String, Decimal>,
}

/// [`RateSource`] backed by openexchangerates.org.
#[derive(Debug, Clone)]
pub struct OpenExchangeRatesClient {
    http: reqwest::Client,
    config: RateSourceConfig,
}

impl OpenExchangeRatesClient {
    /// Creates a client with the configured timeout.
    ///
    /// A missing app id is not rejected here; lookups fail with
    /// [`RateError::Configuration`] until one is set.
    pub fn new(config: RateSourceConfig) -> Result<Self, RateError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RateError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn app_id(&self) -> Result<&str, RateError> {
        self.config
            .app_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RateError::Configuration("exchange rate app id is not set".to_string()))
    }

    fn endpoint(&self) -> String {
        format!("{}/latest.json", self.config.base_url.trim_end_matches('/'))
    }
}

impl RateSource for OpenExchangeRatesClient {
    async fn latest_prices(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<HashMap<String, Decimal>, RateError> {
        let app_id = self.app_id()?;
        let symbols = format!("{from},{to}");

        debug!(%from, %to, "fetching latest exchange rates");

        let response = self
            .http
            .get(self.endpoint())
            .query(&[("app_id", app_id), ("symbols", symbols.as_str())])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "exchange rate request failed");
                RateError::Source(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "exchange rate source returned an error status");
            return Err(RateError::Source(format!("unexpected status {status}")));
        }

        let body: LatestResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "exchange rate response could not be parsed");
            RateError::Source(format!("invalid response body: {e}"))
        })?;

        Ok(body.rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn config(app_id: Option<&str>, base_url: &str) -> RateSourceConfig {
        RateSourceConfig {
            app_id: app_id.map(str::to_string),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Serves one canned HTTP response and hands back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            request
        });

        (format!("http://{addr}/api"), handle)
    }

    #[tokio::test]
    async fn test_missing_app_id_is_configuration_error() {
        let client = OpenExchangeRatesClient::new(config(None, "http://127.0.0.1:9")).unwrap();
        let result = client.latest_prices(Currency::Usd, Currency::Eur).await;
        assert!(matches!(result, Err(RateError::Configuration(_))));

        let client = OpenExchangeRatesClient::new(config(Some("  "), "http://127.0.0.1:9")).unwrap();
        let result = client.latest_prices(Currency::Usd, Currency::Eur).await;
        assert!(matches!(result, Err(RateError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_fetches_requested_symbols() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"base":"USD","timestamp":1700000000,"rates":{"USD":1,"EUR":0.9}}"#,
        )
        .await;

        let client = OpenExchangeRatesClient::new(config(Some("test-key"), &base_url)).unwrap();
        let prices = client.latest_prices(Currency::Usd, Currency::Eur).await.unwrap();

        assert_eq!(prices.get("USD"), Some(&dec!(1)));
        assert_eq!(prices.get("EUR"), Some(&dec!(0.9)));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/latest.json?"));
        assert!(request.contains("app_id=test-key"));
        assert!(request.contains("symbols=USD%2CEUR"));
    }

    #[tokio::test]
    async fn test_error_status_is_source_error() {
        let (base_url, _server) =
            serve_once("401 Unauthorized", r#"{"error":true,"message":"invalid_app_id"}"#).await;

        let client = OpenExchangeRatesClient::new(config(Some("bad"), &base_url)).unwrap();
        let result = client.latest_prices(Currency::Usd, Currency::Eur).await;
        assert!(matches!(result, Err(RateError::Source(_))));
    }

    #[tokio::test]
    async fn test_unparsable_body_is_source_error() {
        let (base_url, _server) = serve_once("200 OK", "not json").await;

        let client = OpenExchangeRatesClient::new(config(Some("key"), &base_url)).unwrap();
        let result = client.latest_prices(Currency::Usd, Currency::Eur).await;
        assert!(matches!(result, Err(RateError::Source(_))));
    }

    #[test]
    fn test_debug_redacts_app_id() {
        let printed = format!("{:?}", config(Some("secret-key"), "https://example.test"));
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("[redacted]"));
    }

    #[test]
    fn test_parse_latest_body() {
        let body: LatestResponse =
            serde_json::from_str(r#"{"disclaimer":"x","rates":{"TJS":10.9,"EUR":"0.92"}}"#).unwrap();
        assert_eq!(body.rates.get("TJS"), Some(&dec!(10.9)));
        assert_eq!(body.rates.get("EUR"), Some(&dec!(0.92)));
    }
}
