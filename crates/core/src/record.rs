//! File-backed persistence of the seed-plus-configuration contract.
//!
//! Only the seed and the generation configuration are stored, never the
//! generated graph or rooms. The record carries a SHA-256 of the layout's
//! canonical bytes so a replay can prove it reproduced the original.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{ConfigError, LayoutConfig};
use crate::layout::{DungeonLayout, generate_layout};

pub const RECORD_FORMAT_VERSION: u16 = 1;

/// Everything needed to reproduce a layout, plus proof of what it was.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    pub format_version: u16,
    pub seed: u32,
    pub config: LayoutConfig,
    /// Hex SHA-256 of the layout's canonical bytes.
    pub layout_sha256_hex: String,
}

#[derive(Debug)]
pub enum RecordError {
    Io(io::Error),
    Malformed(String),
    UnsupportedVersion(u16),
    InvalidConfig(ConfigError),
    /// Replay produced a different layout than the record promised.
    FingerprintMismatch { expected: String, actual: String },
}

impl From<io::Error> for RecordError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    format!("{digest:064x}")
}

/// Build the record for a layout already generated from `config`.
pub fn record_for(layout: &DungeonLayout, config: &LayoutConfig) -> LayoutRecord {
    LayoutRecord {
        format_version: RECORD_FORMAT_VERSION,
        seed: layout.seed,
        config: config.clone(),
        layout_sha256_hex: sha256_hex(&layout.canonical_bytes()),
    }
}

pub fn save_record(path: &Path, record: &LayoutRecord) -> Result<(), RecordError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(record)
        .map_err(|error| RecordError::Malformed(error.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_record(path: &Path) -> Result<LayoutRecord, RecordError> {
    let json = fs::read_to_string(path)?;
    let record: LayoutRecord =
        serde_json::from_str(&json).map_err(|error| RecordError::Malformed(error.to_string()))?;
    if record.format_version != RECORD_FORMAT_VERSION {
        return Err(RecordError::UnsupportedVersion(record.format_version));
    }
    Ok(record)
}

/// Regenerate the layout a record describes and verify it matches the
/// stored fingerprint.
pub fn replay_record(record: &LayoutRecord) -> Result<DungeonLayout, RecordError> {
    if record.format_version != RECORD_FORMAT_VERSION {
        return Err(RecordError::UnsupportedVersion(record.format_version));
    }
    let layout =
        generate_layout(&record.config, record.seed).map_err(RecordError::InvalidConfig)?;
    let actual = sha256_hex(&layout.canonical_bytes());
    if actual != record.layout_sha256_hex {
        return Err(RecordError::FingerprintMismatch {
            expected: record.layout_sha256_hex.clone(),
            actual,
        });
    }
    Ok(layout)
}
