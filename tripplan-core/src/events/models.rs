use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plan::Plan;

/// Topics carried by the [`MessageBus`](super::MessageBus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    FlightDelay,
    Weather,
    Budget,
    Event,
    PlanUpdate,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::FlightDelay => "flight_delay",
            Topic::Weather => "weather",
            Topic::Budget => "budget",
            Topic::Event => "event",
            Topic::PlanUpdate => "plan_update",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WeatherSeverity {
    Normal,
    Light,
    Moderate,
    Heavy,
    Severe,
    Unrecognized(String),
}

impl WeatherSeverity {
    /// Heavy and severe weather invalidate outdoor activities.
    pub fn is_disruptive(&self) -> bool {
        matches!(self, WeatherSeverity::Heavy | WeatherSeverity::Severe)
    }

    pub fn as_str(&self) -> &str {
        match self {
            WeatherSeverity::Normal => "normal",
            WeatherSeverity::Light => "light",
            WeatherSeverity::Moderate => "moderate",
            WeatherSeverity::Heavy => "heavy",
            WeatherSeverity::Severe => "severe",
            WeatherSeverity::Unrecognized(other) => other,
        }
    }
}

impl From<&str> for WeatherSeverity {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => WeatherSeverity::Normal,
            "light" => WeatherSeverity::Light,
            "moderate" => WeatherSeverity::Moderate,
            "heavy" => WeatherSeverity::Heavy,
            "severe" => WeatherSeverity::Severe,
            _ => WeatherSeverity::Unrecognized(value.to_string()),
        }
    }
}

impl From<String> for WeatherSeverity {
    fn from(value: String) -> Self {
        WeatherSeverity::from(value.as_str())
    }
}

impl From<WeatherSeverity> for String {
    fn from(value: WeatherSeverity) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for WeatherSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of generic events. Anything not listed stays `Unrecognized` and is
/// ignored by the reactor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GenericEventKind {
    PeakSeason,
    Unrecognized(String),
}

impl GenericEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            GenericEventKind::PeakSeason => "peak_season",
            GenericEventKind::Unrecognized(name) => name,
        }
    }
}

impl From<&str> for GenericEventKind {
    fn from(value: &str) -> Self {
        match value {
            "peak_season" => GenericEventKind::PeakSeason,
            other => GenericEventKind::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for GenericEventKind {
    fn from(value: String) -> Self {
        GenericEventKind::from(value.as_str())
    }
}

impl From<GenericEventKind> for String {
    fn from(value: GenericEventKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for GenericEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain events that can invalidate the current plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    FlightDelay {
        delay_hours: f64,
    },
    WeatherAlert {
        severity: WeatherSeverity,
    },
    BudgetChange {
        new_budget: f64,
    },
    Generic {
        name: GenericEventKind,
        #[serde(default)]
        info: BTreeMap<String, serde_json::Value>,
    },
}

impl Event {
    pub fn generic(name: impl Into<String>) -> Self {
        Event::Generic {
            name: GenericEventKind::from(name.into()),
            info: BTreeMap::new(),
        }
    }

    pub fn topic(&self) -> Topic {
        match self {
            Event::FlightDelay { .. } => Topic::FlightDelay,
            Event::WeatherAlert { .. } => Topic::Weather,
            Event::BudgetChange { .. } => Topic::Budget,
            Event::Generic { .. } => Topic::Event,
        }
    }
}

/// Full plan snapshot broadcast after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanUpdate {
    pub update_id: Uuid,
    pub emitted_at: DateTime<Utc>,
    pub plan: Plan,
}

impl PlanUpdate {
    pub fn new(plan: Plan) -> Self {
        Self {
            update_id: Uuid::new_v4(),
            emitted_at: Utc::now(),
            plan,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Message {
    Event(Event),
    PlanUpdate(PlanUpdate),
}

impl Message {
    pub fn topic(&self) -> Topic {
        match self {
            Message::Event(event) => event.topic(),
            Message::PlanUpdate(_) => Topic::PlanUpdate,
        }
    }
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        Message::Event(event)
    }
}
