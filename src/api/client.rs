//! Logo Objects base client
//!
//! HTTP transport for the Logo Objects REST service: bearer auth with
//! token renewal, JSON bodies, retry with backoff for throttling and
//! server errors.

use crate::api::transport::{decode_body, Transport};
use crate::auth::{normalize_base_url, AuthError, Credentials, LogoAuth};
use crate::config::RuntimeConfig;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// Logo Objects client errors
#[derive(Error, Debug)]
pub enum LogoError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited (429): retry after {0} seconds")]
    RateLimited(u64),

    #[error("Server error ({0}): {1}")]
    Server(u16, String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Base client for the Logo Objects REST API
#[derive(Debug)]
pub struct LogoClient {
    auth: LogoAuth,
    base_url: String,
    http_client: Client,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl LogoClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g., "http://erp:32001/api/v1/")
    /// * `credentials` - Client key, user credentials and firm number
    /// * `max_retries` - Maximum attempts for throttled or failing requests
    /// * `retry_delay_ms` - Initial delay between retries in milliseconds
    /// * `timeout` - Per-request timeout
    /// * `insecure_ssl` - Skip SSL certificate verification
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        max_retries: u32,
        retry_delay_ms: u64,
        timeout: Duration,
        insecure_ssl: bool,
    ) -> Result<Self, LogoError> {
        let base_url = normalize_base_url(base_url);

        let http_client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure_ssl)
            .build()?;

        let auth = LogoAuth::new(&base_url, credentials, http_client.clone());

        Ok(Self {
            auth,
            base_url,
            http_client,
            max_retries: max_retries.max(1),
            retry_delay_ms,
        })
    }

    /// Create a client from validated configuration
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, LogoError> {
        Self::new(
            &config.base_url,
            config.credentials.clone(),
            config.max_retries,
            config.retry_delay_ms,
            Duration::from_secs(config.timeout_secs),
            config.insecure_ssl,
        )
    }

    /// Get the API root URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the auth helper
    pub fn auth(&self) -> &LogoAuth {
        &self.auth
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Execute HTTP request with token renewal and retry logic
    async fn execute_with_retry(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, LogoError> {
        let mut attempt = 0;
        let mut delay = self.retry_delay_ms;
        let mut renewed = false;

        loop {
            attempt += 1;

            let token = self.auth.get_token().await?;
            let mut request = self
                .http_client
                .request(method.clone(), url)
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .header(ACCEPT, "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;

            match response.status() {
                status if status.is_success() => {
                    return Ok(response);
                }
                StatusCode::UNAUTHORIZED => {
                    let body = response.text().await.unwrap_or_default();
                    if renewed {
                        return Err(LogoError::Unauthorized(body));
                    }

                    tracing::warn!("Unauthorized (401), renewing access token");
                    self.auth.clear_cache().await;
                    renewed = true;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.trim().parse::<u64>().ok());

                    if attempt >= self.max_retries {
                        return Err(LogoError::RateLimited(
                            retry_after.unwrap_or_else(|| delay.div_ceil(1000)),
                        ));
                    }

                    // Retry-After is in seconds; otherwise fall back to the backoff delay
                    let wait = retry_after
                        .map(Duration::from_secs)
                        .unwrap_or_else(|| Duration::from_millis(delay));

                    tracing::warn!(
                        "Rate limited (429), attempt {}/{}, retrying after {:?}",
                        attempt,
                        self.max_retries,
                        wait
                    );

                    sleep(wait).await;
                    delay = delay.saturating_mul(2);
                }
                StatusCode::NOT_FOUND => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(LogoError::NotFound(body));
                }
                status if status.is_server_error() => {
                    if attempt >= self.max_retries {
                        let body = response.text().await.unwrap_or_default();
                        return Err(LogoError::Server(status.as_u16(), body));
                    }

                    tracing::warn!(
                        "Server error ({}), attempt {}/{}, retrying...",
                        status,
                        attempt,
                        self.max_retries
                    );

                    sleep(Duration::from_millis(delay)).await;
                    delay = delay.saturating_mul(2);
                }
                status => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(LogoError::Server(status.as_u16(), body));
                }
            }
        }
    }

    /// End the server-side session and drop the cached token
    pub async fn revoke(&self) -> Result<(), LogoError> {
        if !self.auth.has_valid_token().await {
            return Ok(());
        }

        let token = self.auth.get_token().await?;
        let response = self
            .http_client
            .get(self.url_for("revoke"))
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!("Token revoke returned {}", response.status());
        }

        self.auth.clear_cache().await;
        Ok(())
    }
}

#[async_trait]
impl Transport for LogoClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, LogoError> {
        let url = self.url_for(path);
        tracing::debug!("{} {}", method, url);

        let response = self.execute_with_retry(method, &url, body).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LogoError::Parse(format!("Failed to read response body: {}", e)))?;

        Ok(decode_body(&bytes))
    }
}
