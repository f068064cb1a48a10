use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::catalog::{load_catalog, Catalog};
use crate::error::{ConfigError, Result};
use crate::events::ReactorConfig;
use crate::plan::{PlannerConfig, ReplannerConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TripplanConfig {
    pub planner: PlannerConfig,
    pub replanner: ReplannerConfig,
    pub reactor: ReactorConfig,
    pub catalog: CatalogSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// Catalog file (TOML or YAML). The built-in sample is used when unset.
    pub path: Option<PathBuf>,
}

impl TripplanConfig {
    /// Loads the configured catalog, or the sample catalog when none is set.
    pub fn catalog(&self) -> Result<Arc<Catalog>> {
        match &self.catalog.path {
            Some(path) => load_catalog(path).map(Arc::new),
            None => Ok(Arc::new(Catalog::sample())),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        let planner = &self.planner;
        for (name, share) in [
            ("planner.transport_share", planner.transport_share),
            ("planner.accommodation_share", planner.accommodation_share),
        ] {
            if !(0.0..=1.0).contains(&share) {
                return Err(format!("{name} must be within [0, 1], got {share}"));
            }
        }
        if planner.transport_share + planner.accommodation_share > 1.0 {
            return Err("planner shares must not sum to more than 1".to_string());
        }
        if planner.max_activities == 0 {
            return Err("planner.max_activities must be at least 1".to_string());
        }
        if !(self.replanner.minor_delay_hours >= 0.0) {
            return Err(format!(
                "replanner.minor_delay_hours must be >= 0, got {}",
                self.replanner.minor_delay_hours
            ));
        }
        self.reactor
            .validate()
            .map_err(|reason| format!("reactor.{reason}"))
    }

    fn resolve_relative_to(&mut self, config_path: &Path) {
        let Some(path) = self.catalog.path.as_mut() else {
            return;
        };
        if path.is_relative() {
            if let Some(dir) = config_path.parent() {
                *path = dir.join(&*path);
            }
        }
    }
}

/// Reads and validates a config file. A relative `catalog.path` is resolved
/// against the config file's directory.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TripplanConfig> {
    let path = path.as_ref();
    let mut config: TripplanConfig = load_toml(path)?;
    config
        .validate()
        .map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
    config.resolve_relative_to(path);
    Ok(config)
}

fn load_toml<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        source,
        path: path.to_path_buf(),
    })
}
