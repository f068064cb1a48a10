use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{Activity, ActivityCategory};
use crate::plan::selection::rank_by_value;
use crate::plan::{ActivityStatus, Plan, PlanResult, PlannedActivity, Planner, Replanner};
use crate::scoring::find_replacements;

use super::bus::{MessageBus, ObserverError, SubscriptionId};
use super::models::{Event, GenericEventKind, Message, PlanUpdate, Topic, WeatherSeverity};

const PEAK_SEASON_ADVISORY: &str =
    "Peak season detected: recommend early booking and price monitoring";
const WEATHER_ADVISORY: &str =
    "Weather alert: swapped outdoor activities to indoor alternatives (scored replacements)";
const DEFAULT_PEOPLE: u32 = 1;
const DEFAULT_NIGHTS: u32 = 2;

/// How outdoor activities are swapped when bad weather arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherPolicy {
    /// Best indoor value ratio whose score is within `replacement_score_delta`.
    #[default]
    RatioGate,
    /// Similarity-scored replacements under the activity budget.
    Similarity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactorConfig {
    /// A replacement is acceptable when its score is at least the original's
    /// score minus this delta.
    pub replacement_score_delta: f64,
    /// Weight on cost in the `score / (weight * cost + 1)` ranking.
    pub replacement_cost_weight: f64,
    pub weather_policy: WeatherPolicy,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            replacement_score_delta: 1.0,
            replacement_cost_weight: 1.0,
            weather_policy: WeatherPolicy::RatioGate,
        }
    }
}

impl ReactorConfig {
    /// Rejects a negative or NaN cost weight and a non-finite score delta,
    /// either of which breaks the value ranking.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.replacement_cost_weight >= 0.0) {
            return Err(format!(
                "replacement_cost_weight must be >= 0, got {}",
                self.replacement_cost_weight
            ));
        }
        if !self.replacement_score_delta.is_finite() {
            return Err(format!(
                "replacement_score_delta must be finite, got {}",
                self.replacement_score_delta
            ));
        }
        Ok(())
    }
}

/// Owns the current plan and turns domain events into plan updates.
#[derive(Debug)]
pub struct EventReactor {
    planner: Planner,
    replanner: Replanner,
    config: ReactorConfig,
    current_plan: Option<Plan>,
}

impl EventReactor {
    pub fn new(planner: Planner, replanner: Replanner, config: ReactorConfig) -> Self {
        Self {
            planner,
            replanner,
            config,
            current_plan: None,
        }
    }

    pub fn current_plan(&self) -> Option<&Plan> {
        self.current_plan.as_ref()
    }

    /// Replaces the held plan without emitting anything.
    pub fn set_plan(&mut self, plan: Plan) {
        self.current_plan = Some(plan);
    }

    pub fn create_plan(&mut self, budget: f64, people: u32, nights: u32) -> PlanResult<&Plan> {
        let plan = self.planner.plan(budget, people, nights)?;
        info!(
            target: "reactor",
            budget,
            people,
            nights,
            total_cost = plan.total_cost,
            feasible = plan.feasible,
            "created initial plan"
        );
        Ok(&*self.current_plan.insert(plan))
    }

    /// Applies one event. Returns the update to broadcast, if any.
    pub fn handle(&mut self, event: &Event) -> PlanResult<Option<PlanUpdate>> {
        match event {
            Event::FlightDelay { delay_hours } => Ok(self.on_flight_delay(*delay_hours)),
            Event::WeatherAlert { severity } => Ok(self.on_weather(severity)),
            Event::BudgetChange { new_budget } => self.on_budget_change(*new_budget).map(Some),
            Event::Generic { name, .. } => Ok(self.on_generic(name)),
        }
    }

    /// Subscribes the reactor to every event topic on `bus`; resulting plan
    /// updates are published back on [`Topic::PlanUpdate`].
    pub fn attach(reactor: &Rc<RefCell<Self>>, bus: &Rc<MessageBus>) -> Vec<SubscriptionId> {
        [Topic::FlightDelay, Topic::Weather, Topic::Budget, Topic::Event]
            .into_iter()
            .map(|topic| {
                let reactor = Rc::clone(reactor);
                let bus_ref = Rc::downgrade(bus);
                bus.subscribe(topic, move |message| {
                    let Message::Event(event) = message else {
                        return Ok(());
                    };
                    let update = reactor
                        .try_borrow_mut()
                        .map_err(|_| ObserverError::Busy)?
                        .handle(event)?;
                    if let (Some(update), Some(bus)) = (update, bus_ref.upgrade()) {
                        bus.publish(Message::PlanUpdate(update));
                    }
                    Ok(())
                })
            })
            .collect()
    }

    fn on_generic(&mut self, name: &GenericEventKind) -> Option<PlanUpdate> {
        match name {
            GenericEventKind::PeakSeason => {
                let plan = self.current_plan.as_mut()?;
                plan.recommendation = Some(PEAK_SEASON_ADVISORY.to_string());
                info!(target: "reactor", "peak season advisory attached");
                Some(PlanUpdate::new(plan.clone()))
            }
            GenericEventKind::Unrecognized(other) => {
                debug!(target: "reactor", event = %other, "ignoring unrecognized event");
                None
            }
        }
    }

    fn on_flight_delay(&mut self, delay_hours: f64) -> Option<PlanUpdate> {
        let current = self.current_plan.as_ref()?;
        info!(target: "reactor", delay_hours, "received flight delay");
        let next = self.replanner.replan(current, delay_hours);
        info!(
            target: "reactor",
            feasible = next.feasible,
            total_cost = next.total_cost,
            "replanner returned"
        );
        self.current_plan = Some(next.clone());
        Some(PlanUpdate::new(next))
    }

    fn on_budget_change(&mut self, new_budget: f64) -> PlanResult<PlanUpdate> {
        let (people, nights) = self
            .current_plan
            .as_ref()
            .map_or((DEFAULT_PEOPLE, DEFAULT_NIGHTS), |plan| {
                (plan.num_people, plan.nights)
            });
        let mut next = self.planner.plan(new_budget, people, nights)?;
        next.recommendation = Some(format!(
            "Budget updated to {new_budget}: replanned accordingly"
        ));
        info!(
            target: "reactor",
            new_budget,
            feasible = next.feasible,
            total_cost = next.total_cost,
            "replanned after budget change"
        );
        self.current_plan = Some(next.clone());
        Ok(PlanUpdate::new(next))
    }

    fn on_weather(&mut self, severity: &WeatherSeverity) -> Option<PlanUpdate> {
        if !severity.is_disruptive() {
            debug!(target: "reactor", %severity, "weather not disruptive");
            return None;
        }
        let current = self.current_plan.as_ref()?;

        let (activities, swaps) = match self.config.weather_policy {
            WeatherPolicy::RatioGate => self.swap_by_ratio(current),
            WeatherPolicy::Similarity => self.swap_by_similarity(current),
        };
        if swaps == 0 {
            info!(target: "reactor", %severity, "no acceptable indoor replacements");
            return None;
        }

        let mut next = current.clone();
        next.activities = activities;
        next.recompute_totals();
        next.feasible = next.within_budget();
        next.recommendation = Some(WEATHER_ADVISORY.to_string());
        info!(
            target: "reactor",
            %severity,
            swaps,
            total_cost = next.total_cost,
            "swapped outdoor activities"
        );
        self.current_plan = Some(next.clone());
        Some(PlanUpdate::new(next))
    }

    /// Each outdoor activity takes the best-ranked unused indoor candidate
    /// that passes the score gate, or is postponed.
    fn swap_by_ratio(&self, plan: &Plan) -> (Vec<PlannedActivity>, usize) {
        let indoor = rank_by_value(
            self.planner
                .catalog()
                .activities()
                .iter()
                .filter(|activity| activity.category == ActivityCategory::Indoor),
            self.config.replacement_cost_weight,
        );
        let mut used: HashSet<&str> = plan.activities.iter().map(PlannedActivity::id).collect();

        let mut swaps = 0;
        let mut activities = Vec::with_capacity(plan.activities.len());
        for current in &plan.activities {
            if current.category() != ActivityCategory::Outdoor {
                activities.push(current.clone());
                continue;
            }
            let floor = current.score() - self.config.replacement_score_delta;
            let replacement = indoor
                .iter()
                .find(|candidate| !used.contains(candidate.id.as_str()) && candidate.score >= floor);
            match replacement {
                Some(candidate) => {
                    used.insert(candidate.id.as_str());
                    swaps += 1;
                    activities.push(
                        PlannedActivity::new((*candidate).clone())
                            .with_status(ActivityStatus::SwappedDueToWeather),
                    );
                }
                None => activities.push(
                    current
                        .clone()
                        .with_status(ActivityStatus::PostponedDueToWeather),
                ),
            }
        }
        (activities, swaps)
    }

    fn swap_by_similarity(&self, plan: &Plan) -> (Vec<PlannedActivity>, usize) {
        let originals: Vec<Activity> = plan
            .activities
            .iter()
            .map(|planned| planned.activity.clone())
            .collect();
        let activity_budget = plan.budget - plan.transport_cost - plan.accommodation_cost;
        let replaced = find_replacements(
            &originals,
            self.planner.catalog().activities(),
            ActivityCategory::Indoor,
            Some(activity_budget),
        );

        let mut swaps = 0;
        let activities = plan
            .activities
            .iter()
            .zip(replaced)
            .map(|(current, replacement)| {
                if replacement.id != current.id() {
                    swaps += 1;
                    PlannedActivity::new(replacement)
                        .with_status(ActivityStatus::SwappedDueToWeather)
                } else if current.category() == ActivityCategory::Outdoor {
                    current
                        .clone()
                        .with_status(ActivityStatus::PostponedDueToWeather)
                } else {
                    current.clone()
                }
            })
            .collect();
        (activities, swaps)
    }
}
