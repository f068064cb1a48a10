pub mod error;
pub mod models;
pub mod planner;
pub mod replanner;
pub mod selection;

pub use error::{PlanError, PlanResult};
pub use models::{ActivityStatus, Plan, PlannedActivity};
pub use planner::{Planner, PlannerConfig};
pub use replanner::{ReplanBranch, ReplanOutcome, Replanner, ReplannerConfig};
