//! Caller identity: the optional session token and the hosted identity service.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use tracing::{info, warn};

use crate::config::{load_config, Config};
use crate::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::error::{CivicError, CivicResult};

/// Who is making requests. Both halves are optional; anonymous reporting is allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub email: Option<String>,
    pub access_token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            email: None,
            access_token: Some(token.into()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            email: None,
            access_token: config.access_token.clone(),
        }
    }

    pub fn bearer(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }
}

/// Client for the hosted identity service (magic-link sign in).
#[derive(Debug)]
pub struct IdentityClient {
    base_url: String,
    client: reqwest::Client,
}

impl IdentityClient {
    pub fn new(base_url: &str, anon_key: &str) -> CivicResult<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(anon_key)
            .map_err(|_| CivicError::Configuration("Identity anon key is not a valid header".to_string()))?;
        headers.insert("apikey", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CivicError::Configuration(format!("Failed to create identity client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// `None` when the identity credentials are not configured.
    pub fn from_config(config: &Config) -> CivicResult<Option<Self>> {
        match config.identity_credentials() {
            Some((url, key)) => Ok(Some(Self::new(url, key)?)),
            None => Ok(None),
        }
    }

    /// Sends a one-time sign-in link to `email`.
    pub async fn sign_in_with_otp(&self, email: &str) -> CivicResult<()> {
        if !email.contains('@') {
            return Err(CivicError::Validation(format!("'{}' is not an email address", email)));
        }

        let response = self
            .client
            .post(format!("{}/auth/v1/otp", self.base_url))
            .json(&json!({ "email": email, "create_user": true }))
            .send()
            .await?;

        crate::client::check_response(response).await?;
        info!("Sign-in link requested for {}", email);
        Ok(())
    }
}

lazy_static::lazy_static! {
    // Outer None: not initialised yet. Inner None: initialised but unconfigured.
    static ref IDENTITY: RwLock<Option<Option<Arc<IdentityClient>>>> = RwLock::new(None);
}

/// Process-wide identity client, created on first use from the loaded config.
///
/// Missing credentials are logged and leave the handle empty; nothing panics.
pub fn handle() -> Option<Arc<IdentityClient>> {
    if let Ok(slot) = IDENTITY.read() {
        if let Some(existing) = slot.as_ref() {
            return existing.clone();
        }
    }

    let created = match load_config().and_then(|config| IdentityClient::from_config(&config)) {
        Ok(Some(client)) => Some(Arc::new(client)),
        Ok(None) => {
            warn!("Identity service credentials are not configured; sign-in is disabled");
            None
        }
        Err(e) => {
            warn!("Identity service unavailable: {}", e);
            None
        }
    };

    match IDENTITY.write() {
        Ok(mut slot) => slot.get_or_insert(created).clone(),
        Err(_) => created,
    }
}

/// Replaces the process-wide handle, e.g. with a client aimed at a test server.
pub fn install(client: Option<Arc<IdentityClient>>) {
    if let Ok(mut slot) = IDENTITY.write() {
        *slot = Some(client);
    }
}

/// Forgets the handle so the next `handle()` call re-reads configuration.
pub fn reset() {
    if let Ok(mut slot) = IDENTITY.write() {
        *slot = None;
    }
}

/// Sign in through the process-wide handle, degrading to a configuration
/// error when the service is not set up.
pub async fn sign_in(email: &str) -> CivicResult<()> {
    match handle() {
        Some(client) => client.sign_in_with_otp(email).await,
        None => Err(CivicError::Configuration(
            "Sign-in is disabled: identity_url and identity_anon_key are not configured".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_bearer() {
        assert_eq!(Session::anonymous().bearer(), None);
        assert_eq!(Session::with_token("  ").bearer(), None);
        assert_eq!(Session::with_token("abc").bearer(), Some("abc"));
        assert!(Session::with_token("abc").is_authenticated());
    }

    #[test]
    fn test_from_config_without_credentials_is_none() {
        let config = Config::default();
        assert!(IdentityClient::from_config(&config).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_with_otp_posts_email() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/otp")
            .match_header("apikey", "anon-key")
            .match_body(mockito::Matcher::PartialJson(json!({"email": "a@b.org"})))
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let client = IdentityClient::new(&server.url(), "anon-key").unwrap();
        client.sign_in_with_otp("a@b.org").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_sign_in_rejects_non_email() {
        let client = IdentityClient::new("http://127.0.0.1:9", "anon-key").unwrap();
        let err = client.sign_in_with_otp("not-an-email").await.unwrap_err();
        assert!(matches!(err, CivicError::Validation(_)));
    }

    #[tokio::test]
    async fn test_installed_handle_is_used_then_disabled() {
        install(None);
        let err = sign_in("a@b.org").await.unwrap_err();
        assert!(matches!(err, CivicError::Configuration(_)));
        reset();
    }
}
