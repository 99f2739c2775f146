//! Synced key/value storage holding the API credential

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::errors::SummarizerError;

/// Storage key of the OpenAI API key.
pub const API_KEY_STORAGE_KEY: &str = "openaiApiKey";

/// Prefix every OpenAI secret key starts with.
pub const API_KEY_PREFIX: &str = "sk-";

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SummarizerError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), SummarizerError>;
}

/// In-process store, used by embedders and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_api_key(key: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(API_KEY_STORAGE_KEY.to_string(), key.to_string());
        Self {
            values: RwLock::new(values),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SummarizerError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SummarizerError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, e.g. `{ "openaiApiKey": "sk-..." }`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<Map<String, Value>, SummarizerError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(SummarizerError::Storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }
}

#[async_trait]
impl CredentialStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SummarizerError> {
        let _guard = self.lock.read().await;
        let map = self.read_map().await?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SummarizerError> {
        let _guard = self.lock.write().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_string_pretty(&Value::Object(map))?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }
}

/// Show only enough of a key to recognise it in logs.
#[must_use]
pub fn mask_key(key: &str) -> String {
    let shown = (key.chars().count() / 2).min(5);
    let visible: String = key.chars().take(shown).collect();
    format!("{visible}...")
}

/// The stored key, trimmed; blank values count as missing.
pub async fn load_api_key(store: &dyn CredentialStore) -> Result<Option<String>, SummarizerError> {
    Ok(store
        .get(API_KEY_STORAGE_KEY)
        .await?
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty()))
}

/// Validate, persist and read back a key entered by the user.
///
/// # Errors
///
/// `MissingCredential` for blank input, `InvalidCredentialFormat` when the
/// prefix is wrong, `Storage` when the write cannot be verified.
pub async fn save_api_key(store: &dyn CredentialStore, raw: &str) -> Result<(), SummarizerError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(SummarizerError::MissingCredential);
    }
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(SummarizerError::InvalidCredentialFormat);
    }

    store.set(API_KEY_STORAGE_KEY, key).await?;

    let stored = store.get(API_KEY_STORAGE_KEY).await?;
    if stored.as_deref() != Some(key) {
        warn!("API key verification failed after save");
        return Err(SummarizerError::Storage(
            "API key verification failed after save".to_string(),
        ));
    }

    info!("API key saved ({})", mask_key(key));
    Ok(())
}
