pub mod scaler;

use std::path::Path;

pub use scaler::{MinMaxScaler, ScalerError};

use crate::types::candidate::{Candidate, NormalizedCandidate, PreparedCandidates, RawFeatures};

/// Applies the corpus-wide scaler. Loaded once, never re-fit.
#[derive(Debug, Clone)]
pub struct FeatureNormalizer {
    scaler: MinMaxScaler,
}

impl FeatureNormalizer {
    pub fn new(scaler: MinMaxScaler) -> Self {
        Self { scaler }
    }

    /// A missing artifact is fatal; there is no per-batch fallback.
    pub fn load(path: &Path) -> Result<Self, ScalerError> {
        let scaler = MinMaxScaler::load(path)?;
        tracing::info!(
            n_samples = scaler.n_samples,
            "Loaded global scaler from {:?}",
            path
        );
        Ok(Self { scaler })
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    pub fn normalize(&self, features: &RawFeatures) -> [f64; 3] {
        self.scaler.transform(features.as_row())
    }

    /// Once per query; the result is shared by every configuration.
    pub fn prepare(&self, candidates: Vec<Candidate>) -> PreparedCandidates {
        let candidates = candidates
            .into_iter()
            .map(|candidate| {
                let scaled = self.normalize(&candidate.features);
                NormalizedCandidate { similarity: candidate.similarity(), scaled, candidate }
            })
            .collect();
        PreparedCandidates { candidates }
    }
}
