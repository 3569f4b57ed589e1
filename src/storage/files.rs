use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::StorageError;

const USED_SUFFIX: &str = ".used";

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let contents = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| StorageError::json(path, e))
}

/// Replaces the whole file with the pretty-printed value.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let contents = serde_json::to_string_pretty(value).map_err(|e| StorageError::json(path, e))?;
    fs::write(path, contents).map_err(|e| StorageError::io(path, e))
}

/// Snapshot of already-known coins; a missing file reads as empty.
pub fn load_old_coins(path: &Path) -> Result<Vec<String>, StorageError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let coins = read_json(path)?;
    tracing::info!("Loaded old_coins from {}", path.display());
    Ok(coins)
}

pub fn store_old_coins(path: &Path, coins: &[String]) -> Result<(), StorageError> {
    write_json_pretty(path, coins)?;
    tracing::info!("Wrote old_coins to {}", path.display());
    Ok(())
}

/// A dry-run listing: either a bare symbol or an object carrying one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestListing {
    Symbol(String),
    Record {
        #[serde(alias = "coin")]
        symbol: String,
    },
}

impl TestListing {
    pub fn symbol(&self) -> &str {
        match self {
            TestListing::Symbol(symbol) => symbol,
            TestListing::Record { symbol } => symbol,
        }
    }
}

pub fn used_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(USED_SUFFIX);
    PathBuf::from(name)
}

/// Reads the dry-run fixture and renames it to `<name>.used`.
///
/// No fixture present is `Ok(None)` and touches nothing. The fixture is marked
/// consumed before it is parsed, so a malformed one fails exactly once.
pub fn consume_test_listing(path: &Path) -> Result<Option<TestListing>, StorageError> {
    if !path.is_file() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;

    let used = used_path(path);
    if used.is_file() {
        fs::remove_file(&used).map_err(|e| StorageError::io(&used, e))?;
    }
    fs::rename(path, &used).map_err(|e| StorageError::io(path, e))?;

    let listing = serde_json::from_str(&contents).map_err(|e| StorageError::json(path, e))?;
    Ok(Some(listing))
}
