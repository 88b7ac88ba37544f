use sled::Tree;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Sled DB error: {0}")]
    SledError(#[from] sled::Error),
    #[error("Stored value is not UTF-8: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
}

/// A single-record string store: one key, one value.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

pub struct SledStore {
    db: sled::Db,
    tree: Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(db_path: P, tree_name: &str) -> Result<Self, StorageError> {
        let db = sled::open(db_path)?;
        let tree = db.open_tree(tree_name)?;

        Ok(SledStore { db, tree })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.tree.get(key.as_bytes())? {
            Some(ivec) => Ok(Some(String::from_utf8(ivec.to_vec())?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.tree.remove(key.as_bytes())?;
        self.db.flush()?;

        Ok(())
    }
}
