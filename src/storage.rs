use crate::models::CredentialFile;
use std::{env, path::Path, path::PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::error;

/// Failure writing or encoding the credential file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("credential file io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential file encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/credentials.json"))
}

/// File-backed store for the single Oura API token. The durable
/// key-value store of the browser client, one well-known key.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Currently stored token, if any. A missing, unreadable, or
    /// malformed file counts as "no credential".
    pub async fn token(&self) -> Option<String> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                error!("failed to read credential file: {err}");
                return None;
            }
        };
        match serde_json::from_slice::<CredentialFile>(&bytes) {
            Ok(file) => file.oura_api_token.filter(|token| !token.trim().is_empty()),
            Err(err) => {
                error!("failed to parse credential file: {err}");
                None
            }
        }
    }

    pub async fn has_token(&self) -> bool {
        self.token().await.is_some()
    }

    pub async fn store(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let file = CredentialFile {
            oura_api_token: Some(token.to_string()),
        };
        let payload = serde_json::to_vec_pretty(&file)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> CredentialStore {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "oura_dash_cred_{name}_{}_{nanos}.json",
            std::process::id()
        ));
        CredentialStore::new(path)
    }

    #[tokio::test]
    async fn store_then_check_round_trip() {
        let store = temp_store("round_trip");
        assert!(!store.has_token().await);

        store.store("secret-token").await.unwrap();
        assert!(store.has_token().await);
        assert_eq!(store.token().await.as_deref(), Some("secret-token"));

        store.clear().await.unwrap();
        assert!(!store.has_token().await);
        assert_eq!(store.token().await, None);
    }

    #[tokio::test]
    async fn clear_without_file_is_ok() {
        let store = temp_store("clear_missing");
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn malformed_file_counts_as_no_credential() {
        let store = temp_store("malformed");
        fs::write(store.path(), b"not json").await.unwrap();
        assert_eq!(store.token().await, None);
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn blank_token_counts_as_no_credential() {
        let store = temp_store("blank");
        store.store("   ").await.unwrap();
        assert_eq!(store.token().await, None);
        store.clear().await.unwrap();
    }
}
