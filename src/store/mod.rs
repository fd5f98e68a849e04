pub mod checkpoint;
pub mod distribution;
pub mod manifest;
pub mod result_log;
pub mod snapshot;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use checkpoint::CheckpointManager;
pub use manifest::RunManifest;
pub use result_log::ResultLog;
pub use snapshot::{read_snapshot, write_snapshot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unparseable distribution {raw:?}: {reason}")]
    Distribution { raw: String, reason: String },
    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

/// On-disk layout under the results root:
/// `<root>/<config_index>/results.csv` and `<root>/run.json`.
#[derive(Debug, Clone)]
pub struct ResultsLayout {
    root: PathBuf,
}

impl ResultsLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn result_log(&self, config_index: usize) -> ResultLog {
        ResultLog::new(self.root.join(config_index.to_string()).join("results.csv"))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("run.json")
    }
}
