//! Credential store — persists the generation API key between sessions.
//!
//! The key lives under a fixed namespace inside a small JSON object file, so
//! the same file can hold other entries without them being touched.

pub mod handlers;

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// Namespace the API key is stored under.
pub const CREDENTIAL_NAMESPACE: &str = "instagram_manga_api_key";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API key must not be empty")]
    EmptyKey,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, CredentialError>;

    /// Stores the trimmed key. Blank keys are rejected and leave the stored
    /// value untouched.
    async fn save(&self, key: &str) -> Result<(), CredentialError>;

    async fn clear(&self) -> Result<(), CredentialError>;
}

/// JSON-file backed store. Access is serialized so concurrent requests never
/// interleave a read-modify-write.
pub struct FileCredentialStore {
    path: PathBuf,
    namespace: String,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            namespace: CREDENTIAL_NAMESPACE.to_string(),
            lock: Mutex::new(()),
        }
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(
        &self,
        entries: &BTreeMap<String, String>,
    ) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<String>, CredentialError> {
        let _guard = self.lock.lock().await;
        let entries = self.read_entries().await?;
        Ok(entries
            .get(&self.namespace)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()))
    }

    async fn save(&self, key: &str) -> Result<(), CredentialError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CredentialError::EmptyKey);
        }

        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(self.namespace.clone(), key.to_string());
        self.write_entries(&entries).await?;
        info!("API key saved to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(&self.namespace).is_some() {
            self.write_entries(&entries).await?;
            info!("API key cleared from {}", self.path.display());
        }
        Ok(())
    }
}
