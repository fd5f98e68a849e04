pub mod aggregator;
pub mod queries;

use std::ops::Range;
use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;

use crate::config::{self, ConfigurationSet, RunConfig};
use crate::features::{FeatureNormalizer, ScalerError};
use crate::retrieval::{
    CandidateRetriever, ExactRetriever, RetrievalError, RetryPolicy, RetryingRetriever,
};
use crate::selection::{ConfigurationFanout, WeightedSumScorer, SEED_DERIVATION_VERSION};
use crate::store::{CheckpointManager, ResultsLayout, RunManifest, StoreError};
use crate::types::selection_result::SelectionResult;

pub use aggregator::{FlushStats, ResultAggregator};
pub use queries::{load_queries, QueryRecord};

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error(transparent)]
    Scaler(#[from] ScalerError),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to load queries from {path:?}: {reason}")]
    Queries { path: PathBuf, reason: String },
    #[error("Query index {index} out of range ({len} queries)")]
    QueryOutOfRange { index: usize, len: usize },
    #[error("Invalid run settings: {message}")]
    InvalidSettings { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub batch_size: usize,
    pub flush_every: usize,
    pub top_k: usize,
    pub base_seed: u64,
}

impl RunSettings {
    /// Same bounds `config::load` enforces on the `[run]` table.
    pub fn validate(&self) -> Result<(), ExperimentError> {
        for (name, value) in [
            ("batch_size", self.batch_size),
            ("flush_every", self.flush_every),
            ("top_k", self.top_k),
        ] {
            if value == 0 {
                return Err(ExperimentError::InvalidSettings {
                    message: format!("{name} must be greater than zero"),
                });
            }
        }
        Ok(())
    }
}

impl From<&config::Run> for RunSettings {
    fn from(run: &config::Run) -> Self {
        Self {
            batch_size: run.batch_size,
            flush_every: run.flush_every,
            top_k: run.top_k,
            base_seed: run.base_seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub range: Range<usize>,
    pub queries_processed: usize,
    pub flushes: usize,
}

/// `[offset, offset + batch_size)`, clamped to the available queries.
pub fn batch_range(resume_offset: usize, batch_size: usize, total: usize) -> Range<usize> {
    let start = resume_offset.min(total);
    let end = start.saturating_add(batch_size).min(total);
    start..end
}

/// Drives one batch: retrieve once per query, fan out over every configuration,
/// aggregate, flush periodically, resume from the result logs on restart.
///
/// Single-threaded. Exactly one process may write a given results root.
pub struct Experiment<R> {
    retriever: R,
    normalizer: FeatureNormalizer,
    configurations: ConfigurationSet,
    layout: ResultsLayout,
    snapshot_path: PathBuf,
    settings: RunSettings,
    fanout: ConfigurationFanout<WeightedSumScorer>,
}

impl Experiment<RetryingRetriever<ExactRetriever>> {
    /// Loads every startup artifact. Any missing one is fatal.
    pub fn open(cfg: &RunConfig) -> Result<Self, ExperimentError> {
        let configurations = ConfigurationSet::load(&cfg.paths.settings)?;
        let normalizer = FeatureNormalizer::load(&cfg.paths.scaler)?;
        let policy = RetryPolicy::new(cfg.retrieval.max_attempts);
        let retriever = ExactRetriever::connect(&cfg.paths.corpus, &policy)?;

        Ok(Self::new(
            RetryingRetriever::new(retriever, policy),
            normalizer,
            configurations,
            ResultsLayout::new(&cfg.paths.results),
            cfg.paths.snapshot.clone(),
            RunSettings::from(&cfg.run),
        ))
    }
}

impl<R> Experiment<R>
where
    R: CandidateRetriever,
{
    pub fn new(
        retriever: R,
        normalizer: FeatureNormalizer,
        configurations: ConfigurationSet,
        layout: ResultsLayout,
        snapshot_path: PathBuf,
        settings: RunSettings,
    ) -> Self {
        Self {
            retriever,
            normalizer,
            configurations,
            layout,
            snapshot_path,
            settings,
            fanout: ConfigurationFanout::default(),
        }
    }

    pub fn configurations(&self) -> &ConfigurationSet {
        &self.configurations
    }

    pub fn checkpoint(&self) -> CheckpointManager {
        CheckpointManager::new(self.layout.clone())
    }

    /// Runs the next batch. Failures are logged and returned; whatever was
    /// already flushed stays on disk and is picked up by the next run.
    pub fn run_batch(&self, queries: &[QueryRecord]) -> Result<BatchSummary, ExperimentError> {
        self.run_batch_inner(queries).map_err(|err| {
            tracing::error!("Batch execution failed: {err}");
            err
        })
    }

    fn run_batch_inner(&self, queries: &[QueryRecord]) -> Result<BatchSummary, ExperimentError> {
        self.settings.validate()?;
        tracing::info!(configurations = self.configurations.len(), "Starting experiment execution");

        let already_saved = self.checkpoint().resume_offset(&self.configurations)?;
        tracing::info!("Skipping already processed queries: {already_saved}");

        let range = batch_range(already_saved, self.settings.batch_size, queries.len());
        tracing::info!("Processing query range: {}..{}", range.start, range.end);

        let labels = self
            .configurations
            .iter()
            .map(|c| c.label())
            .collect::<Result<Vec<_>, _>>()?;
        let mut aggregator =
            ResultAggregator::new(self.layout.clone(), self.snapshot_path.clone(), labels);

        let mut processed = 0usize;
        let mut flushes = 0usize;

        for (query_offset, query) in queries[range.clone()].iter().enumerate() {
            let query_index = (range.start + query_offset) as u64;
            let results =
                self.process_query(&query.embedding, query_index, self.settings.base_seed)?;
            aggregator.record(query_index, results);
            processed += 1;

            if processed % self.settings.flush_every == 0 {
                let stats = aggregator.flush()?;
                flushes += 1;
                tracing::info!(
                    processed,
                    rows = stats.rows_appended,
                    "Checkpoint flushed at query {}",
                    query_index + 1
                );
            }
        }

        tracing::info!("Final result persistence");
        aggregator.flush()?;
        flushes += 1;

        let manifest = RunManifest {
            settings_version: self.configurations.version()?,
            configuration_count: self.configurations.len(),
            seed_derivation_version: SEED_DERIVATION_VERSION,
            base_seed: self.settings.base_seed,
            start_index: range.start,
            end_index: range.end,
            queries_processed: processed,
            finished_at: Utc::now(),
        };
        manifest.write(&self.layout.manifest_path())?;

        tracing::info!(processed, flushes, "Batch complete");
        Ok(BatchSummary { range, queries_processed: processed, flushes })
    }

    /// Retrieval and normalization once, then every configuration.
    fn process_query(
        &self,
        embedding: &[f32],
        query_index: u64,
        base_seed: u64,
    ) -> Result<Vec<SelectionResult>, ExperimentError> {
        let candidates = self.retriever.query(embedding, self.settings.top_k)?;
        let prepared = self.normalizer.prepare(candidates);
        tracing::debug!(query_index, candidates = prepared.len(), "Prepared candidates");
        Ok(self.fanout.fan_out(&prepared, &self.configurations, base_seed, query_index))
    }

    /// One query across all configurations, in memory only. Nothing is
    /// persisted and checkpoints are untouched.
    pub fn run_single_query(
        &self,
        embedding: &[f32],
        query_index: u64,
        seed: u64,
    ) -> Result<Vec<SelectionResult>, ExperimentError> {
        self.process_query(embedding, query_index, seed)
    }
}
