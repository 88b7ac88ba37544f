use log::{info, warn};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::storage::STARRED_TOKENS_KEY;

use super::storage::{KeyValueStore, StorageError};

#[derive(Error, Debug)]
pub enum StarredTokensError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Persisted starred tokens are corrupt: {0}")]
    Corrupt(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Bookmarked pair addresses, kept as one JSON array under a single key.
///
/// Every read-modify-write, including the reset of a corrupt record in
/// `list`, runs under `write_lock`.
pub struct StarredTokens<S: KeyValueStore> {
    store: S,
    key: String,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> StarredTokens<S> {
    pub fn new(store: S) -> Self {
        StarredTokens {
            store,
            key: STARRED_TOKENS_KEY.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    /// Strict read. A value that is not an array of strings comes back as
    /// `Corrupt` and is left in place.
    pub fn read(&self) -> Result<Vec<String>, StarredTokensError> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(StorageError::Utf8Error(e)) => {
                return Err(StarredTokensError::Corrupt(e.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str::<Vec<String>>(&raw)
            .map_err(|e| StarredTokensError::Corrupt(e.to_string()))
    }

    /// Current list. A corrupt record is deleted and reported as empty, so
    /// this call may write.
    pub async fn list(&self) -> Result<Vec<String>, StarredTokensError> {
        let _guard = self.write_lock.lock().await;

        self.list_locked()
    }

    pub async fn contains(&self, address: &str) -> Result<bool, StarredTokensError> {
        Ok(self.list().await?.iter().any(|token| token == address))
    }

    pub async fn add(&self, address: &str) -> Result<(), StarredTokensError> {
        let _guard = self.write_lock.lock().await;
        let mut tokens = self.list_locked()?;

        if tokens.iter().any(|token| token == address) {
            return Ok(());
        }

        tokens.push(address.to_string());
        self.write(&tokens)?;

        info!("starred tokens: added {}, total {}", address, tokens.len());

        Ok(())
    }

    pub async fn remove(&self, address: &str) -> Result<(), StarredTokensError> {
        let _guard = self.write_lock.lock().await;
        let tokens: Vec<String> = self
            .list_locked()?
            .into_iter()
            .filter(|token| token != address)
            .collect();

        self.write(&tokens)?;

        info!("starred tokens: removed {}, total {}", address, tokens.len());

        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StarredTokensError> {
        let _guard = self.write_lock.lock().await;

        self.store.delete(&self.key)?;

        Ok(())
    }

    // Caller must hold `write_lock`.
    fn list_locked(&self) -> Result<Vec<String>, StarredTokensError> {
        match self.read() {
            Err(StarredTokensError::Corrupt(reason)) => {
                warn!("starred tokens: resetting corrupt record: {}", reason);

                self.store.delete(&self.key)?;

                Ok(Vec::new())
            }
            res => res,
        }
    }

    fn write(&self, tokens: &[String]) -> Result<(), StarredTokensError> {
        let serialized = serde_json::to_string(tokens)?;

        self.store.set(&self.key, &serialized)?;

        Ok(())
    }
}
