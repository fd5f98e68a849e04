use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::error::{Error, Result};
use crate::types::identifiers::SetVersion;

const PAGE_SIZES: [usize; 2] = [10, 100];
const DRAW_COUNTS: [usize; 3] = [10, 25, 50];
const WEIGHT_LEVELS: [f64; 8] = [0.0, 0.1, 0.25, 0.33, 0.5, 0.75, 0.9, 1.0];
const WEIGHT_SUM_MIN: f64 = 0.99;
const WEIGHT_SUM_MAX: f64 = 1.0;
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Criterion weights, serialized as `[similarity, year, citation, government]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Weights {
    pub similarity: f64,
    pub year: f64,
    pub citation: f64,
    pub government: f64,
}

impl Weights {
    pub fn new(similarity: f64, year: f64, citation: f64, government: f64) -> Self {
        Self { similarity, year, citation, government }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.similarity, self.year, self.citation, self.government]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

impl From<[f64; 4]> for Weights {
    fn from(w: [f64; 4]) -> Self {
        Self::new(w[0], w[1], w[2], w[3])
    }
}

impl From<Weights> for [f64; 4] {
    fn from(w: Weights) -> Self {
        w.as_array()
    }
}

/// One simulated selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(alias = "N")]
    pub page_size: usize,
    #[serde(alias = "k")]
    pub draws: usize,
    #[serde(alias = "pn")]
    pub weights: Weights,
}

impl Configuration {
    pub fn new(page_size: usize, draws: usize, weights: Weights) -> Self {
        Self { page_size, draws, weights }
    }

    /// Settings label used as the snapshot key.
    pub fn label(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Ordered, immutable set of configurations, addressed by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationSet {
    configurations: Vec<Configuration>,
}

impl ConfigurationSet {
    pub fn new(configurations: Vec<Configuration>) -> Result<Self> {
        let set = Self { configurations };
        set.validate()?;
        Ok(set)
    }

    /// Full experiment grid: page size, then draw count, then every weight vector
    /// over the fixed levels whose sum lies in `[0.99, 1.0]`.
    pub fn grid() -> Self {
        let mut weight_vectors = Vec::new();
        for &a in &WEIGHT_LEVELS {
            for &b in &WEIGHT_LEVELS {
                for &c in &WEIGHT_LEVELS {
                    for &d in &WEIGHT_LEVELS {
                        let sum = a + b + c + d;
                        if sum >= WEIGHT_SUM_MIN - WEIGHT_SUM_TOLERANCE
                            && sum <= WEIGHT_SUM_MAX + WEIGHT_SUM_TOLERANCE
                        {
                            weight_vectors.push(Weights::new(a, b, c, d));
                        }
                    }
                }
            }
        }

        let mut configurations =
            Vec::with_capacity(PAGE_SIZES.len() * DRAW_COUNTS.len() * weight_vectors.len());
        for &page_size in &PAGE_SIZES {
            for &draws in &DRAW_COUNTS {
                for &weights in &weight_vectors {
                    configurations.push(Configuration::new(page_size, draws, weights));
                }
            }
        }

        Self { configurations }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingSettings(path.to_path_buf()));
        }
        let raw = fs::read(path)
            .map_err(|source| Error::SettingsIo { path: path.to_path_buf(), source })?;
        let set: ConfigurationSet = serde_json::from_slice(&raw)
            .map_err(|source| Error::ParseSettings { path: path.to_path_buf(), source })?;
        set.validate()?;

        let version = set.version()?;
        tracing::info!(
            count = set.len(),
            version = version.as_str(),
            "Loaded configuration set from {:?}",
            path
        );
        Ok(set)
    }

    /// Writes the set, refusing to replace an existing artifact.
    pub fn save_new(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Err(Error::SettingsExist(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| Error::SettingsIo { path: parent.to_path_buf(), source })?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)
            .map_err(|source| Error::SettingsIo { path: path.to_path_buf(), source })?;
        Ok(())
    }

    /// Content version over the compact JSON encoding.
    pub fn version(&self) -> Result<SetVersion> {
        let canonical = serde_json::to_vec(self)?;
        Ok(SetVersion::from_content(&canonical))
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Configuration> {
        self.configurations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Configuration> {
        self.configurations.iter()
    }

    fn validate(&self) -> Result<()> {
        if self.configurations.is_empty() {
            return Err(Error::Validation {
                message: "Configuration set must contain at least one configuration.".to_string(),
            });
        }
        for (index, config) in self.configurations.iter().enumerate() {
            if config.page_size == 0 {
                return Err(Error::Validation {
                    message: format!("Configuration {index}: page_size must be greater than zero."),
                });
            }
            if config.draws == 0 {
                return Err(Error::Validation {
                    message: format!("Configuration {index}: draws must be greater than zero."),
                });
            }
            if config.weights.as_array().iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(Error::Validation {
                    message: format!(
                        "Configuration {index}: weights must be finite and zero or greater."
                    ),
                });
            }
        }
        Ok(())
    }
}
