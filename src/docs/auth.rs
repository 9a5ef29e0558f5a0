//! OAuth authentication for the Docs API
//!
//! Handles the authorization-code flow:
//! - Loading the provider-issued client secrets
//! - Building the consent URL
//! - Exchanging the callback code and refreshing tokens at the token endpoint

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use yup_oauth2::ApplicationSecret;

use crate::config::Config;
use crate::docs::store::CredentialStore;
use crate::docs::types::{split_scopes, CredentialRecord, TokenResponse};
use crate::error::{AuthError, BridgeError, Result};

/// Load the client secrets file (`installed` or `web` credentials)
pub async fn load_client_secret(path: &Path) -> Result<ApplicationSecret> {
    if !path.exists() {
        return Err(BridgeError::Auth(AuthError::SecretsFileNotFound {
            path: path.display().to_string(),
        }));
    }

    yup_oauth2::read_application_secret(path)
        .await
        .map_err(|e| {
            BridgeError::Auth(AuthError::InvalidSecrets {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })
}

/// Exchanges a refresh token for a fresh access token
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Return `record` with a new access token and expiry
    async fn refresh(&self, record: &CredentialRecord) -> Result<CredentialRecord>;
}

/// Client for the provider's OAuth token endpoint
#[derive(Debug, Clone)]
pub struct TokenEndpoint {
    http_client: reqwest::Client,
}

impl TokenEndpoint {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    async fn post(&self, token_uri: &str, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http_client
            .post(token_uri)
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(BridgeError::Auth(AuthError::TokenExchangeFailed {
                message: format!("({}) {}", status, text),
            }));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TokenRefresher for TokenEndpoint {
    async fn refresh(&self, record: &CredentialRecord) -> Result<CredentialRecord> {
        let refresh_token = record
            .refresh_token
            .as_deref()
            .ok_or(BridgeError::Auth(AuthError::RefreshTokenMissing))?;

        let params = [
            ("client_id", record.client_id.as_str()),
            ("client_secret", record.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let token_response = self.post(&record.token_uri, &params).await?;

        let mut refreshed = record.clone();
        refreshed.apply_refresh(token_response, Utc::now());
        Ok(refreshed)
    }
}

/// Drives the authorization-code flow and writes the result to the store
pub struct Authenticator {
    secret: ApplicationSecret,
    redirect_uri: String,
    scopes: Vec<String>,
    endpoint: TokenEndpoint,
    store: Arc<dyn CredentialStore>,
}

impl Authenticator {
    pub fn new(
        config: &Config,
        secret: ApplicationSecret,
        endpoint: TokenEndpoint,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            secret,
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            endpoint,
            store,
        }
    }

    /// Build the consent URL. Offline access plus a forced consent prompt
    /// make the provider issue a refresh token every time.
    pub fn begin_authorization(&self) -> String {
        let scopes = self.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&include_granted_scopes=true",
            self.secret.auth_uri,
            urlencoding::encode(&self.secret.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&scopes)
        )
    }

    /// Exchange the callback code for tokens and persist them,
    /// replacing any previously stored record.
    pub async fn complete_authorization(&self, code: Option<&str>) -> Result<CredentialRecord> {
        let code = code
            .filter(|c| !c.is_empty())
            .ok_or(BridgeError::Auth(AuthError::NoAuthCode))?;

        let params = [
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let token_response = self.endpoint.post(&self.secret.token_uri, &params).await?;

        let now = Utc::now();
        let scopes = match token_response.scope.as_deref() {
            Some(scope) => split_scopes(scope),
            None => self.scopes.iter().cloned().collect(),
        };

        let record = CredentialRecord {
            access_token: token_response.access_token,
            refresh_token: token_response.refresh_token,
            expiry: token_response
                .expires_in
                .map(|secs| now + Duration::seconds(secs)),
            scopes,
            token_uri: self.secret.token_uri.clone(),
            client_id: self.secret.client_id.clone(),
            client_secret: self.secret.client_secret.clone(),
        };

        if record.refresh_token.is_none() {
            tracing::warn!("Provider issued no refresh token; re-authorization will be needed on expiry");
        }

        self.store.save(&record).await?;
        tracing::info!("Stored new credentials");

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::store::FileCredentialStore;

    fn secret() -> ApplicationSecret {
        yup_oauth2::parse_application_secret(
            r#"{
                "installed": {
                    "client_id": "test-client-id",
                    "client_secret": "test-secret",
                    "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                    "token_uri": "https://oauth2.googleapis.com/token",
                    "redirect_uris": ["http://localhost"]
                }
            }"#,
        )
        .unwrap()
    }

    fn authenticator(dir: &Path) -> Authenticator {
        let store = Arc::new(FileCredentialStore::new(dir.join("user_token.json")));
        Authenticator::new(
            &Config::default(),
            secret(),
            TokenEndpoint::new(reqwest::Client::new()),
            store,
        )
    }

    #[test]
    fn test_authorization_url() {
        let dir = tempfile::tempdir().unwrap();
        let url = authenticator(dir.path()).begin_authorization();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains(&*urlencoding::encode("http://localhost:8000/oauth2callback")));
        assert!(url.contains(&*urlencoding::encode(
            "https://www.googleapis.com/auth/documents https://www.googleapis.com/auth/drive.readonly"
        )));
    }

    #[tokio::test]
    async fn test_missing_code_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authenticator(dir.path());

        for code in [None, Some("")] {
            let err = auth.complete_authorization(code).await.unwrap_err();
            assert!(matches!(err, BridgeError::Auth(AuthError::NoAuthCode)));
        }
        assert!(!dir.path().join("user_token.json").exists());
    }

    #[tokio::test]
    async fn test_missing_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_client_secret(&dir.path().join("client_secret.json"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Auth(AuthError::SecretsFileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_without_token_fails() {
        let record = CredentialRecord {
            access_token: "a".to_string(),
            refresh_token: None,
            expiry: None,
            scopes: Default::default(),
            token_uri: "http://127.0.0.1:9/token".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        };
        let err = TokenEndpoint::new(reqwest::Client::new())
            .refresh(&record)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Auth(AuthError::RefreshTokenMissing)));
    }
}
