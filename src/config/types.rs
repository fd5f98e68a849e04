use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub paths: Paths,
    #[serde(default)]
    pub run: Run,
    #[serde(default)]
    pub retrieval: Retrieval,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    /// Configuration set artifact (JSON).
    pub settings: PathBuf,
    /// Pre-fit scaler artifact (JSON).
    pub scaler: PathBuf,
    /// Query embeddings, one JSON object per line.
    pub queries: PathBuf,
    /// Corpus backing the exact retriever, one JSON object per line.
    pub corpus: PathBuf,
    /// Root of the per-configuration result logs.
    pub results: PathBuf,
    /// Global distribution snapshot, rewritten on every flush.
    pub snapshot: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_flush_every")]
    pub flush_every: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_base_seed")]
    pub base_seed: u64,
}

impl Default for Run {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            flush_every: default_flush_every(),
            top_k: default_top_k(),
            base_seed: default_base_seed(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Retrieval {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for Retrieval {
    fn default() -> Self {
        Self { max_attempts: default_max_attempts() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_batch_size() -> usize {
    40_000
}

fn default_flush_every() -> usize {
    2_500
}

fn default_top_k() -> usize {
    250
}

fn default_base_seed() -> u64 {
    42
}

fn default_max_attempts() -> u32 {
    5
}
