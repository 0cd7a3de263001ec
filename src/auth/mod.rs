//! Logo Objects authentication module
//!
//! Implements the password grant used by the Logo Objects REST service:
//! the client key goes in a Basic header, the user credentials and firm
//! number go in the form body.

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    TokenRequestFailed(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Token parse error: {0}")]
    ParseError(String),
}

/// Token response from the `token` endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    #[serde(default)]
    token_type: String,
    expires_in: u64,
}

/// Cached token with expiry tracking
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        // Consider token expired 60 seconds before actual expiry
        self.expires_at > Instant::now() + Duration::from_secs(60)
    }
}

/// User credentials for the password grant
#[derive(Clone)]
pub struct Credentials {
    pub client_key: String,
    pub username: String,
    pub password: String,
    pub firm_no: u32,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_key", &"***")
            .field("username", &self.username)
            .field("password", &"***")
            .field("firm_no", &self.firm_no)
            .finish()
    }
}

/// Token acquisition and caching for one Logo Objects endpoint
#[derive(Debug)]
pub struct LogoAuth {
    credentials: Credentials,
    base_url: String,
    http_client: Client,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl LogoAuth {
    /// Create a new auth helper
    ///
    /// `base_url` is the API root, e.g. `http://erp:32001/api/v1/`.
    pub fn new(base_url: &str, credentials: Credentials, http_client: Client) -> Self {
        Self {
            credentials,
            base_url: normalize_base_url(base_url),
            http_client,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    fn token_endpoint(&self) -> String {
        format!("{}token", self.base_url)
    }

    /// Return the cached access token, acquiring a new one if needed
    pub async fn get_token(&self) -> Result<String, AuthError> {
        {
            let cache = self.token_cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.is_valid() {
                    tracing::debug!("Using cached token");
                    return Ok(cached.access_token.clone());
                }
            }
        }

        tracing::info!(
            "Acquiring new access token for {} (firm {})",
            self.credentials.username,
            self.credentials.firm_no
        );
        self.acquire_token().await
    }

    async fn acquire_token(&self) -> Result<String, AuthError> {
        let firm_no = self.credentials.firm_no.to_string();
        let params = [
            ("grant_type", "password"),
            ("username", self.credentials.username.as_str()),
            ("firmno", firm_no.as_str()),
            ("password", self.credentials.password.as_str()),
        ];

        let response = self
            .http_client
            .post(self.token_endpoint())
            .header(AUTHORIZATION, format!("Basic {}", self.credentials.client_key))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Token request failed: {} - {}", status, body);
            return Err(AuthError::TokenRequestFailed(format!(
                "Status: {}, Body: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            AuthError::ParseError(format!("Failed to parse token response: {}", e))
        })?;

        let cached = CachedToken {
            access_token: token_response.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token_response.expires_in),
        };

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(cached);
        }

        tracing::info!(
            "Token acquired successfully, expires in {} seconds",
            token_response.expires_in
        );

        Ok(token_response.access_token)
    }

    /// Clear the token cache
    pub async fn clear_cache(&self) {
        let mut cache = self.token_cache.write().await;
        *cache = None;
    }

    /// Whether a usable token is cached
    pub async fn has_valid_token(&self) -> bool {
        self.token_cache
            .read()
            .await
            .as_ref()
            .is_some_and(CachedToken::is_valid)
    }
}

/// Ensure the API root ends with `/`
pub fn normalize_base_url(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Credentials {
        Credentials {
            client_key: "a2V5".to_string(),
            username: "LOGO".to_string(),
            password: "secret".to_string(),
            firm_no: 1,
        }
    }

    #[test]
    fn test_token_endpoint() {
        let auth = LogoAuth::new("http://erp:32001/api/v1", credentials(), Client::new());
        assert_eq!(auth.token_endpoint(), "http://erp:32001/api/v1/token");
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://erp/api/v1"), "http://erp/api/v1/");
        assert_eq!(normalize_base_url("http://erp/api/v1/"), "http://erp/api/v1/");
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let printed = format!("{:?}", credentials());
        assert!(printed.contains("username: \"LOGO\""));
        assert!(printed.contains("firm_no: 1"));
        assert!(!printed.contains("secret"));
        assert!(!printed.contains("a2V5"));
    }

    #[test]
    fn test_cached_token_validity() {
        let valid_token = CachedToken {
            access_token: "test".to_string(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        };
        assert!(valid_token.is_valid());

        let almost_expired = CachedToken {
            access_token: "test".to_string(),
            expires_at: Instant::now() + Duration::from_secs(30),
        };
        assert!(!almost_expired.is_valid());
    }

    #[tokio::test]
    async fn test_acquire_and_cache_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/token"))
            .and(header("authorization", "Basic a2V5"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("firmno=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-1",
                "token_type": "bearer",
                "expires_in": 1800
            })))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/api/v1/", server.uri());
        let auth = LogoAuth::new(&base, credentials(), Client::new());

        assert_eq!(auth.get_token().await.unwrap(), "tok-1");
        assert!(auth.has_valid_token().await);
        // Second call is served from the cache
        assert_eq!(auth.get_token().await.unwrap(), "tok-1");

        auth.clear_cache().await;
        assert!(!auth.has_valid_token().await);
    }

    #[tokio::test]
    async fn test_token_request_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let auth = LogoAuth::new(&server.uri(), credentials(), Client::new());
        let err = auth.get_token().await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRequestFailed(ref msg) if msg.contains("invalid_grant")));
    }
}
