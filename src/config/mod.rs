mod error;
mod settings;
mod types;

pub use error::{Error, Result};
pub use settings::{Configuration, ConfigurationSet, Weights};
pub use types::{Paths, Retrieval, Run, RunConfig};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<RunConfig> {
    let raw = fs::read_to_string(path)
        .map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

    let mut cfg: RunConfig = toml::from_str(&raw)
        .map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

    normalize(&mut cfg);

    validate(&cfg)?;

    Ok(cfg)
}

pub fn validate(cfg: &RunConfig) -> Result<()> {
    if cfg.log_level.is_empty() {
        return Err(Error::Validation { message: "log_level must be non-empty.".to_string() });
    }
    if cfg.run.batch_size == 0 {
        return Err(Error::Validation {
            message: "run.batch_size must be greater than zero.".to_string(),
        });
    }
    if cfg.run.flush_every == 0 {
        return Err(Error::Validation {
            message: "run.flush_every must be greater than zero.".to_string(),
        });
    }
    if cfg.run.top_k == 0 {
        return Err(Error::Validation {
            message: "run.top_k must be greater than zero.".to_string(),
        });
    }
    if cfg.retrieval.max_attempts == 0 {
        return Err(Error::Validation {
            message: "retrieval.max_attempts must be greater than zero.".to_string(),
        });
    }

    for (label, path) in [
        ("paths.settings", &cfg.paths.settings),
        ("paths.scaler", &cfg.paths.scaler),
        ("paths.queries", &cfg.paths.queries),
        ("paths.corpus", &cfg.paths.corpus),
        ("paths.results", &cfg.paths.results),
        ("paths.snapshot", &cfg.paths.snapshot),
    ] {
        if path.as_os_str().is_empty() {
            return Err(Error::Validation { message: format!("{label} must be non-empty.") });
        }
    }

    Ok(())
}

fn normalize(cfg: &mut RunConfig) {
    cfg.log_level = cfg.log_level.trim().to_string();
}
