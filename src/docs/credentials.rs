//! Credential lifecycle
//!
//! Hands out a usable credential record, refreshing it when it has expired and
//! discarding it when it can no longer be refreshed.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::docs::auth::TokenRefresher;
use crate::docs::store::CredentialStore;
use crate::docs::types::CredentialRecord;
use crate::error::{AuthError, BridgeError, Result};

/// Wraps the credential store with expiry checks and refresh
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    /// Serializes load -> refresh -> save
    lock: Mutex<()>,
}

impl CredentialManager {
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            lock: Mutex::new(()),
        }
    }

    /// Return a credential that is valid right now.
    ///
    /// Fails with an unauthorized error when nothing is stored, or when the
    /// stored record is expired and cannot be refreshed. In the latter case
    /// the record is deleted so later calls fail fast.
    pub async fn obtain_valid_credential(&self) -> Result<CredentialRecord> {
        let _guard = self.lock.lock().await;

        let record = self
            .store
            .load()
            .await?
            .ok_or(BridgeError::Auth(AuthError::NotAuthorized))?;

        if !record.is_expired() {
            return Ok(record);
        }

        if record.refresh_token.is_none() {
            tracing::warn!("Stored credentials expired without a refresh token, discarding");
            self.discard().await;
            return Err(BridgeError::Auth(AuthError::RefreshTokenMissing));
        }

        tracing::debug!("Access token expired, refreshing");
        match self.refresher.refresh(&record).await {
            Ok(refreshed) => {
                self.store.save(&refreshed).await?;
                tracing::info!("Refreshed access token");
                Ok(refreshed)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed, discarding stored credentials: {}", e);
                self.discard().await;
                Err(BridgeError::Auth(AuthError::TokenRefreshFailed {
                    message: e.to_string(),
                }))
            }
        }
    }

    async fn discard(&self) {
        if let Err(e) = self.store.delete().await {
            tracing::error!("Failed to delete stored credentials: {}", e);
        }
    }
}
