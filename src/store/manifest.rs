use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::store::StoreError;
use crate::types::identifiers::SetVersion;

/// Summary of the last batch, rewritten after every batch.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunManifest {
    pub settings_version: SetVersion,
    pub configuration_count: usize,
    pub seed_derivation_version: u32,
    pub base_seed: u64,
    pub start_index: usize,
    pub end_index: usize,
    pub queries_processed: usize,
    pub finished_at: DateTime<Utc>, // informational only
}

impl RunManifest {
    pub fn write(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let f = fs::File::create(path)?;
        serde_json::to_writer_pretty(&f, self)?;
        f.sync_all()?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, StoreError> {
        let f = fs::File::open(path)?;
        Ok(serde_json::from_reader(f)?)
    }
}
