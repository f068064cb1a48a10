pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod plan;
pub mod scoring;

pub use catalog::{
    load_catalog, AccommodationOption, AccommodationTier, Activity, ActivityCategory, Catalog,
    CatalogError, TransportMode, TransportOption,
};
pub use config::{load_config, CatalogSection, TripplanConfig};
pub use error::{ConfigError, Result};
pub use events::{
    Event, EventReactor, GenericEventKind, Message, MessageBus, ObserverError, PlanUpdate,
    ReactorConfig, SubscriptionId, Topic, WeatherPolicy, WeatherSeverity,
};
pub use plan::{
    ActivityStatus, Plan, PlanError, PlanResult, PlannedActivity, Planner, PlannerConfig,
    ReplanBranch, ReplanOutcome, Replanner, ReplannerConfig,
};
pub use scoring::{find_replacements, score_replacement, similarity};
