use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{AccommodationOption, Activity, ActivityCategory, TransportOption};

/// Transient tag attached to an activity after a disruption.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Rescheduled,
    SwappedDueToWeather,
    PostponedDueToWeather,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Rescheduled => "rescheduled",
            ActivityStatus::SwappedDueToWeather => "swapped_due_to_weather",
            ActivityStatus::PostponedDueToWeather => "postponed_due_to_weather",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An activity as it sits in a plan: the catalog record plus an optional status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedActivity {
    #[serde(flatten)]
    pub activity: Activity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ActivityStatus>,
}

impl PlannedActivity {
    pub fn new(activity: Activity) -> Self {
        Self {
            activity,
            status: None,
        }
    }

    pub fn with_status(mut self, status: ActivityStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn id(&self) -> &str {
        &self.activity.id
    }

    pub fn cost(&self) -> f64 {
        self.activity.cost
    }

    pub fn score(&self) -> f64 {
        self.activity.score
    }

    pub fn category(&self) -> ActivityCategory {
        self.activity.category
    }
}

impl From<Activity> for PlannedActivity {
    fn from(activity: Activity) -> Self {
        Self::new(activity)
    }
}

/// The itinerary work product. Field names are part of the interchange format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub transport: TransportOption,
    pub transport_cost: f64,
    pub accommodation: AccommodationOption,
    pub accommodation_cost: f64,
    pub activities: Vec<PlannedActivity>,
    pub activities_cost: f64,
    pub total_cost: f64,
    pub feasible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    pub budget: f64,
    pub num_people: u32,
    pub nights: u32,
}

impl Plan {
    /// Builds a plan from its components, deriving costs and feasibility.
    pub fn assemble(
        transport: TransportOption,
        accommodation: AccommodationOption,
        activities: Vec<PlannedActivity>,
        budget: f64,
        num_people: u32,
        nights: u32,
    ) -> Self {
        let transport_cost = transport.cost_per_person * f64::from(num_people);
        let accommodation_cost = accommodation.cost_per_night * f64::from(nights);
        let mut plan = Self {
            transport,
            transport_cost,
            accommodation,
            accommodation_cost,
            activities,
            activities_cost: 0.0,
            total_cost: 0.0,
            feasible: false,
            recommendation: None,
            budget,
            num_people,
            nights,
        };
        plan.recompute_totals();
        plan.feasible = plan.within_budget();
        plan
    }

    /// Re-derives `activities_cost` from the activity list and `total_cost`
    /// from the three cost components. Feasibility is left untouched.
    pub fn recompute_totals(&mut self) {
        self.activities_cost = self.activities.iter().map(PlannedActivity::cost).sum();
        self.total_cost = self.transport_cost + self.accommodation_cost + self.activities_cost;
    }

    pub fn within_budget(&self) -> bool {
        self.total_cost <= self.budget
    }

    /// Budget minus total cost; negative when over budget.
    pub fn headroom(&self) -> f64 {
        self.budget - self.total_cost
    }

    pub fn activity_ids(&self) -> Vec<&str> {
        self.activities.iter().map(PlannedActivity::id).collect()
    }

    pub fn recommendation(&self) -> &str {
        self.recommendation.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn sample_plan(budget: f64) -> Plan {
        let catalog = Catalog::sample();
        let activities = catalog
            .activities()
            .iter()
            .take(2)
            .cloned()
            .map(PlannedActivity::from)
            .collect();
        Plan::assemble(
            catalog.transport()[2].clone(),
            catalog.accommodation()[0].clone(),
            activities,
            budget,
            2,
            3,
        )
    }

    #[test]
    fn assemble_derives_costs() {
        let plan = sample_plan(10_000.0);
        assert_eq!(plan.transport_cost, 3000.0);
        assert_eq!(plan.accommodation_cost, 3000.0);
        assert_eq!(plan.activities_cost, 3000.0);
        assert_eq!(plan.total_cost, 9000.0);
        assert!(plan.feasible);
        assert_eq!(plan.headroom(), 1000.0);

        let tight = sample_plan(8000.0);
        assert!(!tight.feasible);
    }

    #[test]
    fn serializes_flat_activity_with_status() {
        let mut plan = sample_plan(10_000.0);
        plan.activities[0].status = Some(ActivityStatus::Rescheduled);
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["activities"][0]["id"], "beach_visit");
        assert_eq!(value["activities"][0]["category"], "outdoor");
        assert_eq!(value["activities"][0]["status"], "rescheduled");
        assert!(value["activities"][1].get("status").is_none());
        assert!(value.get("recommendation").is_none());
        assert_eq!(value["num_people"], 2);

        let back: Plan = serde_json::from_value(value).unwrap();
        assert_eq!(back, plan);
    }
}
