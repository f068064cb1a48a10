//! Event plumbing: the message bus and the reactor that owns the live plan.

pub mod bus;
pub mod models;
pub mod reactor;

pub use bus::{MessageBus, ObserverError, SubscriptionId};
pub use models::{Event, GenericEventKind, Message, PlanUpdate, Topic, WeatherSeverity};
pub use reactor::{EventReactor, ReactorConfig, WeatherPolicy};
