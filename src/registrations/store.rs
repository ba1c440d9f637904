//! Registration persistence.
//!
//! The whole collection is loaded, modified and saved on every mutation.
//! Saves go through a uniquely named temp file and a rename, so a reader
//! sees either the old or the new collection, never half of one. There is
//! no cross-writer locking: two racing writers are last-writer-wins.

use async_trait::async_trait;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::blockchain::classify::{ClassifiedError, ErrorKind};
use crate::observability::metrics;
use crate::registrations::types::{normalize_address, RegistrationRecord};

/// Errors from reading or writing the registration collection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("remote store error: {0}")]
    Remote(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl From<StoreError> for ClassifiedError {
    fn from(err: StoreError) -> Self {
        ClassifiedError::new(ErrorKind::StorageIOError, err.to_string())
    }
}

/// Keyed collection of registrations.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<RegistrationRecord>, StoreError>;

    /// Look up by wallet address; case and surrounding whitespace are ignored.
    async fn get_by_key(&self, address: &str) -> Result<Option<RegistrationRecord>, StoreError> {
        let key = normalize_address(address);
        Ok(self.get_all().await?.into_iter().find(|r| r.key() == key))
    }

    /// Replace any record with the same key by `record`.
    async fn upsert(&self, record: RegistrationRecord) -> Result<(), StoreError>;

    /// Remove the record for `address`; absent keys are not an error.
    async fn delete_by_key(&self, address: &str) -> Result<(), StoreError>;
}

/// Drop every record keyed `key`, then append `record` (keyed the same).
pub(crate) fn replace_record(records: &mut Vec<RegistrationRecord>, mut record: RegistrationRecord) {
    let key = record.key();
    records.retain(|r| r.key() != key);
    record.wallet_address = key;
    records.push(record);
}

/// Registrations kept in one JSON array on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<RegistrationRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Storage file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, records: &[RegistrationRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let tmp_path = PathBuf::from(tmp_name);

        if let Err(e) = fs::write(&tmp_path, json).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        metrics::record_registration_count(records.len());
        tracing::debug!(path = %self.path.display(), count = records.len(), "Saved registrations");
        Ok(())
    }

    async fn replace(&self, record: RegistrationRecord) -> Result<(), StoreError> {
        let mut records = self.load().await?;
        replace_record(&mut records, record);
        self.save(&records).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.key() != key);
        if records.len() == before {
            tracing::debug!(wallet = %key, "No registration to delete");
            return Ok(());
        }
        self.save(&records).await
    }
}

#[async_trait]
impl RegistrationStore for FileStore {
    async fn get_all(&self) -> Result<Vec<RegistrationRecord>, StoreError> {
        let result = self.load().await;
        metrics::record_store_operation("get_all", result.is_ok());
        result
    }

    async fn upsert(&self, record: RegistrationRecord) -> Result<(), StoreError> {
        if record.key().is_empty() {
            return Err(StoreError::InvalidRecord("walletAddress is required".to_string()));
        }
        let key = record.key();

        let result = self.replace(record).await;

        metrics::record_store_operation("upsert", result.is_ok());
        match &result {
            Ok(()) => tracing::info!(wallet = %key, "Registration saved"),
            Err(e) => tracing::error!(wallet = %key, error = %e, "Error saving registration"),
        }
        result
    }

    async fn delete_by_key(&self, address: &str) -> Result<(), StoreError> {
        let key = normalize_address(address);

        let result = self.remove(&key).await;

        metrics::record_store_operation("delete", result.is_ok());
        match &result {
            Ok(()) => tracing::info!(wallet = %key, "Registration deleted"),
            Err(e) => tracing::error!(wallet = %key, error = %e, "Error deleting registration"),
        }
        result
    }
}
