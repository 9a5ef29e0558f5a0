//! Credential persistence
//!
//! A single user's credential record lives in one JSON file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::docs::types::CredentialRecord;
use crate::error::Result;

/// Storage backend for the credential record
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the stored record, `None` if nothing is stored
    async fn load(&self) -> Result<Option<CredentialRecord>>;

    /// Store a record, replacing any previous one
    async fn save(&self, record: &CredentialRecord) -> Result<()>;

    /// Remove the stored record; a missing record is not an error
    async fn delete(&self) -> Result<()>;
}

/// JSON file backed credential store
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<CredentialRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn save(&self, record: &CredentialRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn record() -> CredentialRecord {
        CredentialRecord {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expiry: None,
            scopes: BTreeSet::from(["https://www.googleapis.com/auth/documents".to_string()]),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("user_token.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("tokens").join("user_token.json"));

        store.save(&record()).await.unwrap();
        let mut updated = record();
        updated.access_token = "second".to_string();
        store.save(&updated).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("user_token.json"));

        store.save(&record()).await.unwrap();
        store.delete().await.unwrap();
        store.delete().await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_token.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileCredentialStore::new(path);
        assert!(store.load().await.is_err());
    }
}
