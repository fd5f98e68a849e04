use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read config file at {path:?}.")]
    ReadConfig { path: PathBuf, source: std::io::Error },
    #[error("Failed to parse config file at {path:?}.")]
    ParseConfig { path: PathBuf, source: toml::de::Error },
    #[error("Configuration set not found at {0:?}. Generate it first with `citesim generate-settings`.")]
    MissingSettings(PathBuf),
    #[error("Configuration set already exists at {0:?}. Remove it manually to regenerate.")]
    SettingsExist(PathBuf),
    #[error("IO error on configuration set {path:?}: {source}")]
    SettingsIo { path: PathBuf, source: std::io::Error },
    #[error("Failed to parse configuration set at {path:?}: {source}")]
    ParseSettings { path: PathBuf, source: serde_json::Error },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{message}")]
    Validation { message: String },
}
