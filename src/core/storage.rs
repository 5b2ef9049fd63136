//! # Favourites Storage
//!
//! Durable key-value slot holding the serialized favourites list.
//! The store owns serialization; a backend only gets and sets one string.
//!
//! `FileStorage` keeps it at `~/.cinedex/favourites.json` and writes with an
//! atomic rename (write `.tmp`, then `rename()`) so a crash mid-write never
//! leaves a truncated file behind.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

#[derive(Debug)]
pub enum StorageError {
    Io(io::Error),
    /// Stored content exists but cannot be decoded.
    Corrupt(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "storage I/O error: {e}"),
            StorageError::Corrupt(msg) => write!(f, "corrupt favourites data: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

pub trait FavouritesStorage {
    /// Returns the last value written, or `None` if nothing was ever stored.
    fn get(&self) -> Result<Option<String>, StorageError>;

    /// Replaces the stored value. Must be durable when it returns `Ok`.
    fn set(&mut self, value: &str) -> Result<(), StorageError>;

    /// Keeps the current value somewhere the next `set` will not overwrite.
    /// Called when the stored value cannot be decoded.
    fn set_aside(&mut self) -> Result<(), StorageError>;
}

/// Returns `~/.cinedex/favourites.json`.
pub fn default_favourites_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".cinedex").join("favourites.json"))
}

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `favourites.json` → `favourites.json.bak`
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }
}

impl FavouritesStorage for FileStorage {
    fn get(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn set(&mut self, value: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!("Wrote {} bytes to {}", value.len(), self.path.display());
        Ok(())
    }

    fn set_aside(&mut self) -> Result<(), StorageError> {
        let backup = self.backup_path();
        match fs::rename(&self.path, &backup) {
            Ok(()) => {
                warn!("Moved {} to {}", self.path.display(), backup.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
