//! Configuration management for the Google Docs bridge
//!
//! Handles paths, environment variables, and API endpoints.

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Configuration for the bridge server
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// OAuth redirect URI registered with the provider
    pub redirect_uri: String,

    /// Path to the provider-issued client secrets file
    pub client_secrets_path: PathBuf,

    /// Directory holding the persisted user token
    pub tokens_dir: PathBuf,

    /// Docs API base URL
    pub docs_api_base_url: String,

    /// Drive API base URL
    pub drive_api_base_url: String,

    /// OAuth scopes requested during consent
    pub scopes: Vec<String>,
}

impl Config {
    /// Build configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidVar {
                var: "PORT".to_string(),
                value,
            })?,
            Err(_) => defaults::PORT,
        };

        Ok(Self {
            host: env_or("HOST", defaults::HOST),
            port,
            redirect_uri: env_or("REDIRECT_URI", defaults::REDIRECT_URI),
            client_secrets_path: PathBuf::from(env_or(
                "CLIENT_SECRETS_FILE",
                defaults::CLIENT_SECRETS_FILE,
            )),
            tokens_dir: PathBuf::from(env_or("TOKENS_DIR", defaults::TOKENS_DIR)),
            docs_api_base_url: env_or("DOCS_API_BASE_URL", google::DOCS_API_BASE_URL),
            drive_api_base_url: env_or("DRIVE_API_BASE_URL", google::DRIVE_API_BASE_URL),
            scopes: google::SCOPES.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Path of the persisted user token
    pub fn token_path(&self) -> PathBuf {
        self.tokens_dir.join(defaults::TOKEN_FILE)
    }

    /// Check if the client secrets file exists
    pub fn client_secrets_exist(&self) -> bool {
        self.client_secrets_path.exists()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            redirect_uri: defaults::REDIRECT_URI.to_string(),
            client_secrets_path: PathBuf::from(defaults::CLIENT_SECRETS_FILE),
            tokens_dir: PathBuf::from(defaults::TOKENS_DIR),
            docs_api_base_url: google::DOCS_API_BASE_URL.to_string(),
            drive_api_base_url: google::DRIVE_API_BASE_URL.to_string(),
            scopes: google::SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

/// Default settings
pub mod defaults {
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 8000;
    pub const REDIRECT_URI: &str = "http://localhost:8000/oauth2callback";
    pub const CLIENT_SECRETS_FILE: &str = "client_secret.json";
    pub const TOKENS_DIR: &str = "./tokens";
    pub const TOKEN_FILE: &str = "user_token.json";
}

/// Google API constants
pub mod google {
    /// Base URL for the Docs API
    pub const DOCS_API_BASE_URL: &str = "https://docs.googleapis.com/v1";

    /// Base URL for the Drive API
    pub const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

    /// MIME type of native Google Docs documents
    pub const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";

    /// Scopes requested during consent
    pub const SCOPES: &[&str] = &[
        "https://www.googleapis.com/auth/documents",
        "https://www.googleapis.com/auth/drive.readonly",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.redirect_uri, "http://localhost:8000/oauth2callback");
        assert_eq!(
            config.token_path(),
            PathBuf::from("./tokens").join("user_token.json")
        );
    }

    #[test]
    fn test_default_scopes() {
        let config = Config::default();
        assert_eq!(config.scopes.len(), 2);
        assert!(config.scopes[0].ends_with("/auth/documents"));
        assert!(config.scopes[1].ends_with("/auth/drive.readonly"));
    }
}
