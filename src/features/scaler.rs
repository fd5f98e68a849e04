use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::candidate::RawFeatures;

#[derive(Debug, Error)]
pub enum ScalerError {
    #[error("Global scaler not found at {0:?}. Run `citesim fit-scaler` first.")]
    Missing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cannot fit a scaler on an empty corpus")]
    EmptyCorpus,
    #[error("Invalid feature range: [{0}, {1}]")]
    InvalidRange(f64, f64),
}

/// Column-wise min-max scaler over `[year, ln1p(citations), gov_score]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub feature_range: [f64; 2],
    pub data_min: [f64; 3],
    pub data_max: [f64; 3],
    pub n_samples: usize,
}

impl MinMaxScaler {
    /// Offline only. The engine never calls this.
    pub fn fit<'a, I>(rows: I) -> Result<Self, ScalerError>
    where
        I: IntoIterator<Item = &'a RawFeatures>,
    {
        let mut data_min = [f64::INFINITY; 3];
        let mut data_max = [f64::NEG_INFINITY; 3];
        let mut n_samples = 0;

        for features in rows {
            let row = features.as_row();
            for col in 0..3 {
                data_min[col] = data_min[col].min(row[col]);
                data_max[col] = data_max[col].max(row[col]);
            }
            n_samples += 1;
        }

        if n_samples == 0 {
            return Err(ScalerError::EmptyCorpus);
        }

        Ok(Self { feature_range: [0.0, 1.0], data_min, data_max, n_samples })
    }

    pub fn load(path: &Path) -> Result<Self, ScalerError> {
        if !path.exists() {
            return Err(ScalerError::Missing(path.to_path_buf()));
        }
        let f = fs::File::open(path)?;
        let scaler: MinMaxScaler = serde_json::from_reader(f)?;

        let [lo, hi] = scaler.feature_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(ScalerError::InvalidRange(lo, hi));
        }
        Ok(scaler)
    }

    pub fn save(&self, path: &Path) -> Result<(), ScalerError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let f = fs::File::create(path)?;
        serde_json::to_writer_pretty(&f, self)?;
        f.sync_all()?;
        Ok(())
    }

    /// Out-of-range inputs are not clipped.
    pub fn transform(&self, row: [f64; 3]) -> [f64; 3] {
        let [lo, hi] = self.feature_range;
        let mut out = [0.0; 3];
        for col in 0..3 {
            let mut data_range = self.data_max[col] - self.data_min[col];
            if data_range == 0.0 {
                data_range = 1.0;
            }
            let scale = (hi - lo) / data_range;
            out[col] = (row[col] - self.data_min[col]) * scale + lo;
        }
        out
    }
}
