use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{AccommodationOption, Catalog, TransportOption};

use super::models::{Plan, PlannedActivity};
use super::selection::select_activities;
use super::{PlanError, PlanResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Share of the budget used to pick the initial transport option.
    pub transport_share: f64,
    /// Share of the budget used to pick the initial accommodation option.
    pub accommodation_share: f64,
    pub max_activities: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            transport_share: 0.4,
            accommodation_share: 0.4,
            max_activities: 3,
        }
    }
}

/// Builds initial plans from `(budget, people, nights)` against a catalog.
#[derive(Debug, Clone)]
pub struct Planner {
    catalog: Arc<Catalog>,
    config: PlannerConfig,
}

impl Planner {
    pub fn new(catalog: Arc<Catalog>, config: PlannerConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Produces a plan for the given inputs. Infeasibility is reported in-band
    /// through `feasible`; only non-positive inputs are an error.
    pub fn plan(&self, budget: f64, people: u32, nights: u32) -> PlanResult<Plan> {
        // `!(budget > 0.0)` also rejects NaN.
        if !(budget > 0.0) || people == 0 || nights == 0 {
            return Err(PlanError::InvalidInput {
                budget,
                people,
                nights,
            });
        }

        let transports = self.catalog.transport_by_cost();
        let stays = self.catalog.accommodation_by_cost();

        let per_person = budget * self.config.transport_share / f64::from(people);
        let per_night = budget * self.config.accommodation_share / f64::from(nights);
        let transport = cheapest_within(&transports, per_person, |t| t.cost_per_person)
            .ok_or(PlanError::EmptyCatalog { pool: "transport" })?;
        let stay = cheapest_within(&stays, per_night, |a| a.cost_per_night).ok_or(
            PlanError::EmptyCatalog {
                pool: "accommodation",
            },
        )?;

        let initial = self.score_combination(transport, stay, budget, people, nights);
        if initial.feasible {
            let plan = self.apply_upgrades(initial);
            info!(
                target: "planner",
                transport = %plan.transport.id,
                accommodation = %plan.accommodation.id,
                total_cost = plan.total_cost,
                budget,
                "planned feasible itinerary"
            );
            return Ok(plan);
        }

        self.search_combinations(&transports, &stays, budget, people, nights)
    }

    /// Prices one transport/accommodation pair and fills the leftover budget
    /// with activities.
    fn score_combination(
        &self,
        transport: &TransportOption,
        stay: &AccommodationOption,
        budget: f64,
        people: u32,
        nights: u32,
    ) -> Plan {
        let fixed_cost =
            transport.cost_per_person * f64::from(people) + stay.cost_per_night * f64::from(nights);
        let remaining = (budget - fixed_cost).max(0.0);
        let activities = select_activities(
            self.catalog.activities(),
            remaining,
            self.config.max_activities,
            None,
        )
        .into_iter()
        .map(PlannedActivity::from)
        .collect();
        Plan::assemble(
            transport.clone(),
            stay.clone(),
            activities,
            budget,
            people,
            nights,
        )
    }

    /// Greedy upgrade pass: at most one accommodation upgrade, then at most one
    /// transport upgrade, each taking the cheapest step up that keeps the plan
    /// feasible. Better combinations further up are never searched.
    fn apply_upgrades(&self, mut plan: Plan) -> Plan {
        let budget = plan.budget;
        let people = plan.num_people;
        let nights = plan.nights;

        let current_stay = plan.accommodation.clone();
        for option in self
            .catalog
            .accommodation_by_cost()
            .into_iter()
            .filter(|option| option.cost_per_night > current_stay.cost_per_night)
        {
            let extra = (option.cost_per_night - current_stay.cost_per_night) * f64::from(nights);
            if extra > plan.headroom() {
                continue;
            }
            let attempt = self.score_combination(&plan.transport, option, budget, people, nights);
            if attempt.feasible {
                debug!(
                    target: "planner",
                    from = %current_stay.id,
                    to = %option.id,
                    "upgraded accommodation"
                );
                plan = attempt;
                break;
            }
        }

        let current_transport = plan.transport.clone();
        for option in self
            .catalog
            .transport_by_cost()
            .into_iter()
            .filter(|option| option.cost_per_person > current_transport.cost_per_person)
        {
            let extra =
                (option.cost_per_person - current_transport.cost_per_person) * f64::from(people);
            if extra > plan.headroom() {
                continue;
            }
            let attempt =
                self.score_combination(option, &plan.accommodation, budget, people, nights);
            if attempt.feasible {
                debug!(
                    target: "planner",
                    from = %current_transport.id,
                    to = %option.id,
                    "upgraded transport"
                );
                plan = attempt;
                break;
            }
        }

        plan
    }

    /// Walks every transport x accommodation pair (both ascending by cost,
    /// transport outermost) and returns the first feasible plan, or the
    /// cheapest attempt marked infeasible.
    fn search_combinations(
        &self,
        transports: &[&TransportOption],
        stays: &[&AccommodationOption],
        budget: f64,
        people: u32,
        nights: u32,
    ) -> PlanResult<Plan> {
        let mut best: Option<Plan> = None;
        for transport in transports {
            for stay in stays {
                let attempt = self.score_combination(transport, stay, budget, people, nights);
                if attempt.feasible {
                    info!(
                        target: "planner",
                        transport = %transport.id,
                        accommodation = %stay.id,
                        total_cost = attempt.total_cost,
                        "found feasible combination by search"
                    );
                    return Ok(attempt);
                }
                if best
                    .as_ref()
                    .map_or(true, |current| attempt.total_cost < current.total_cost)
                {
                    best = Some(attempt);
                }
            }
        }

        let best = best.ok_or(PlanError::EmptyCatalog { pool: "transport" })?;
        info!(
            target: "planner",
            total_cost = best.total_cost,
            budget,
            "no feasible plan; returning cheapest attempt"
        );
        Ok(best)
    }
}

/// First option (in ascending cost order) whose unit cost fits `limit`,
/// falling back to the cheapest option overall.
fn cheapest_within<'c, T>(
    sorted: &[&'c T],
    limit: f64,
    unit_cost: impl Fn(&T) -> f64,
) -> Option<&'c T> {
    sorted
        .iter()
        .find(|option| unit_cost(**option) <= limit)
        .or_else(|| sorted.first())
        .copied()
}
