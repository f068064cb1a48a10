use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Flight,
    Road,
    Rail,
    Ferry,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Flight => "flight",
            TransportMode::Road => "road",
            TransportMode::Rail => "rail",
            TransportMode::Ferry => "ferry",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccommodationTier {
    Budget,
    Mid,
    Premium,
}

impl AccommodationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccommodationTier::Budget => "budget",
            AccommodationTier::Mid => "mid",
            AccommodationTier::Premium => "premium",
        }
    }
}

impl fmt::Display for AccommodationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Indoor,
    Outdoor,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Indoor => "indoor",
            ActivityCategory::Outdoor => "outdoor",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportOption {
    pub id: String,
    pub mode: TransportMode,
    pub name: String,
    pub cost_per_person: f64,
    pub duration_hours: f64,
}

impl TransportOption {
    pub fn new(
        id: impl Into<String>,
        mode: TransportMode,
        name: impl Into<String>,
        cost_per_person: f64,
        duration_hours: f64,
    ) -> Self {
        Self {
            id: id.into(),
            mode,
            name: name.into(),
            cost_per_person,
            duration_hours,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccommodationOption {
    pub id: String,
    pub tier: AccommodationTier,
    pub name: String,
    pub cost_per_night: f64,
    pub comfort_score: u8,
}

impl AccommodationOption {
    pub fn new(
        id: impl Into<String>,
        tier: AccommodationTier,
        name: impl Into<String>,
        cost_per_night: f64,
        comfort_score: u8,
    ) -> Self {
        Self {
            id: id.into(),
            tier,
            name: name.into(),
            cost_per_night,
            comfort_score,
        }
    }
}

/// A bookable activity. `score` is a fixed desirability rating in `[0, 10]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub cost: f64,
    pub score: f64,
    pub category: ActivityCategory,
}

impl Activity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cost: f64,
        score: f64,
        category: ActivityCategory,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
            score,
            category,
        }
    }

    /// Score per unit of cost, shifted by one so free activities stay finite.
    pub fn value_for_money(&self) -> f64 {
        self.score / (self.cost + 1.0)
    }
}
