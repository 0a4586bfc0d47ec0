//! Fixed payloads served verbatim by `/data`.
//!
//! The driving test decides which size class is active; the handler only
//! serves whatever is currently loaded.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use axum::body::Bytes;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 500 KiB.
pub const SHORT_LEN: usize = 500 * 1024;

/// 50 MiB.
pub const LONG_LEN: usize = 50 * 1024 * 1024;

/// Size class of the fixed dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSize {
    Short,
    Long,
}

impl DatasetSize {
    pub fn byte_len(self) -> usize {
        match self {
            DatasetSize::Short => SHORT_LEN,
            DatasetSize::Long => LONG_LEN,
        }
    }
}

impl fmt::Display for DatasetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSize::Short => f.write_str("short"),
            DatasetSize::Long => f.write_str("long"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown dataset size {0:?} (expected \"short\" or \"long\")")]
pub struct ParseDatasetSizeError(String);

impl FromStr for DatasetSize {
    type Err = ParseDatasetSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short" => Ok(DatasetSize::Short),
            "long" => Ok(DatasetSize::Long),
            _ => Err(ParseDatasetSizeError(s.to_string())),
        }
    }
}

#[derive(Debug)]
struct Dataset {
    data: Bytes,
    digest: blake3::Hash,
}

/// Holds the one dataset currently served by `/data`.
#[derive(Debug, Clone, Default)]
pub struct DataManager {
    current: Arc<RwLock<Option<Dataset>>>,
}

impl DataManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the dataset with `len` fresh random bytes.
    pub fn set_data(&self, len: usize) {
        let mut data = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut data);
        self.set_bytes(Bytes::from(data));
    }

    /// Replace the dataset with caller-supplied bytes.
    pub fn set_bytes(&self, data: Bytes) {
        let digest = blake3::hash(&data);
        tracing::debug!(len = data.len(), digest = %digest, "Dataset loaded");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Dataset { data, digest });
    }

    /// Load a random dataset of the given size class.
    pub fn load(&self, size: DatasetSize) {
        self.set_data(size.byte_len());
    }

    /// The loaded dataset. Cloning `Bytes` does not copy the payload.
    pub fn get_data(&self) -> Option<Bytes> {
        self.read(|dataset| dataset.data.clone())
    }

    /// Hex BLAKE3 digest of the loaded dataset.
    pub fn digest(&self) -> Option<String> {
        self.read(|dataset| dataset.digest.to_hex().to_string())
    }

    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn read<T>(&self, f: impl FnOnce(&Dataset) -> T) -> Option<T> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }
}
