use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io { source: io::Error, path: PathBuf },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        source: toml::de::Error,
        path: PathBuf,
    },
    #[error("failed to parse yaml {path}: {source}")]
    Yaml {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid config {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("invalid catalog {path}: {source}")]
    Catalog {
        source: CatalogError,
        path: PathBuf,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
