//! Read-only option pools shared by the planner, replanner, scorer and reactor.
//!
//! A [`Catalog`] is always validated on construction, so downstream code can
//! rely on non-empty transport/accommodation pools and sane numbers.

pub mod models;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ConfigError, Result};

pub use models::{
    AccommodationOption, AccommodationTier, Activity, ActivityCategory, TransportMode,
    TransportOption,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("{pool} pool must not be empty")]
    EmptyPool { pool: &'static str },
    #[error("duplicate {pool} id: {id}")]
    DuplicateId { pool: &'static str, id: String },
    #[error("invalid {pool} entry {id}: {reason}")]
    InvalidEntry {
        pool: &'static str,
        id: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogFile", into = "CatalogFile")]
pub struct Catalog {
    transport: Vec<TransportOption>,
    accommodation: Vec<AccommodationOption>,
    activities: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    transport: Vec<TransportOption>,
    accommodation: Vec<AccommodationOption>,
    #[serde(default)]
    activities: Vec<Activity>,
}

impl TryFrom<CatalogFile> for Catalog {
    type Error = CatalogError;

    fn try_from(file: CatalogFile) -> std::result::Result<Self, Self::Error> {
        Catalog::new(file.transport, file.accommodation, file.activities)
    }
}

impl From<Catalog> for CatalogFile {
    fn from(catalog: Catalog) -> Self {
        Self {
            transport: catalog.transport,
            accommodation: catalog.accommodation,
            activities: catalog.activities,
        }
    }
}

impl Catalog {
    pub fn new(
        transport: Vec<TransportOption>,
        accommodation: Vec<AccommodationOption>,
        activities: Vec<Activity>,
    ) -> std::result::Result<Self, CatalogError> {
        if transport.is_empty() {
            return Err(CatalogError::EmptyPool { pool: "transport" });
        }
        if accommodation.is_empty() {
            return Err(CatalogError::EmptyPool {
                pool: "accommodation",
            });
        }

        check_unique("transport", transport.iter().map(|t| t.id.as_str()))?;
        check_unique("accommodation", accommodation.iter().map(|a| a.id.as_str()))?;
        check_unique("activity", activities.iter().map(|a| a.id.as_str()))?;

        for option in &transport {
            check_amount("transport", &option.id, "cost_per_person", option.cost_per_person)?;
            check_amount("transport", &option.id, "duration_hours", option.duration_hours)?;
        }
        for option in &accommodation {
            check_amount("accommodation", &option.id, "cost_per_night", option.cost_per_night)?;
            if option.comfort_score > 10 {
                return Err(invalid(
                    "accommodation",
                    &option.id,
                    "comfort_score must be within [0, 10]",
                ));
            }
        }
        for activity in &activities {
            check_amount("activity", &activity.id, "cost", activity.cost)?;
            if !(0.0..=10.0).contains(&activity.score) {
                return Err(invalid(
                    "activity",
                    &activity.id,
                    "score must be within [0, 10]",
                ));
            }
        }

        Ok(Self {
            transport,
            accommodation,
            activities,
        })
    }

    /// Deterministic sample data used when no catalog file is configured.
    pub fn sample() -> Self {
        Self {
            transport: vec![
                TransportOption::new(
                    "flight_economy",
                    TransportMode::Flight,
                    "Flight (Economy)",
                    8000.0,
                    2.0,
                ),
                TransportOption::new(
                    "flight_premium",
                    TransportMode::Flight,
                    "Flight (Premium Economy)",
                    12000.0,
                    2.0,
                ),
                TransportOption::new("road_bus", TransportMode::Road, "Bus", 1500.0, 10.0),
                TransportOption::new(
                    "road_car",
                    TransportMode::Road,
                    "Private Car (shared)",
                    4000.0,
                    6.0,
                ),
            ],
            accommodation: vec![
                AccommodationOption::new("hostel", AccommodationTier::Budget, "Hostel", 1000.0, 3),
                AccommodationOption::new(
                    "guesthouse",
                    AccommodationTier::Mid,
                    "Guest House",
                    2500.0,
                    6,
                ),
                AccommodationOption::new("resort", AccommodationTier::Premium, "Resort", 8000.0, 9),
            ],
            activities: vec![
                Activity::new("beach_visit", "Beach Visit", 0.0, 5.0, ActivityCategory::Outdoor),
                Activity::new(
                    "water_sports",
                    "Water Sports",
                    3000.0,
                    8.0,
                    ActivityCategory::Outdoor,
                ),
                Activity::new("spa", "Spa Session", 2500.0, 6.0, ActivityCategory::Indoor),
                Activity::new("museums", "Local Museums", 500.0, 4.0, ActivityCategory::Indoor),
                Activity::new("boat_cruise", "Boat Cruise", 2000.0, 7.0, ActivityCategory::Outdoor),
                Activity::new("food_tour", "Local Food Tour", 1500.0, 6.0, ActivityCategory::Indoor),
            ],
        }
    }

    pub fn transport(&self) -> &[TransportOption] {
        &self.transport
    }

    pub fn accommodation(&self) -> &[AccommodationOption] {
        &self.accommodation
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|activity| activity.id == id)
    }

    /// Transport options ascending by per-person cost; ties keep catalog order.
    pub fn transport_by_cost(&self) -> Vec<&TransportOption> {
        let mut options: Vec<&TransportOption> = self.transport.iter().collect();
        options.sort_by(|a, b| a.cost_per_person.total_cmp(&b.cost_per_person));
        options
    }

    /// Accommodation options ascending by nightly cost; ties keep catalog order.
    pub fn accommodation_by_cost(&self) -> Vec<&AccommodationOption> {
        let mut options: Vec<&AccommodationOption> = self.accommodation.iter().collect();
        options.sort_by(|a, b| a.cost_per_night.total_cmp(&b.cost_per_night));
        options
    }
}

/// Loads a catalog from a TOML file, or YAML when the extension is `yaml`/`yml`.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    let file: CatalogFile = if is_yaml {
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            source,
            path: path.to_path_buf(),
        })?
    } else {
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            source,
            path: path.to_path_buf(),
        })?
    };
    Catalog::try_from(file).map_err(|source| ConfigError::Catalog {
        source,
        path: path.to_path_buf(),
    })
}

fn check_unique<'a>(
    pool: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> std::result::Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                pool,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn check_amount(
    pool: &'static str,
    id: &str,
    field: &str,
    value: f64,
) -> std::result::Result<(), CatalogError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(pool, id, &format!("{field} must be finite and >= 0")))
    }
}

fn invalid(pool: &'static str, id: &str, reason: &str) -> CatalogError {
    CatalogError::InvalidEntry {
        pool,
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
