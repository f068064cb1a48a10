use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::{Catalog, TransportOption};

use super::models::{ActivityStatus, Plan, PlannedActivity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplannerConfig {
    /// Delays up to and including this many hours only shift activities.
    pub minor_delay_hours: f64,
}

impl Default for ReplannerConfig {
    fn default() -> Self {
        Self {
            minor_delay_hours: 3.0,
        }
    }
}

/// Which adjustment the replanner settled on, least invasive first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplanBranch {
    AlreadyInfeasible,
    Rescheduled,
    ExtendedStay,
    CancelledActivities,
    Rerouted,
    Degraded,
}

impl ReplanBranch {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplanBranch::AlreadyInfeasible => "already_infeasible",
            ReplanBranch::Rescheduled => "rescheduled",
            ReplanBranch::ExtendedStay => "extended_stay",
            ReplanBranch::CancelledActivities => "cancelled_activities",
            ReplanBranch::Rerouted => "rerouted",
            ReplanBranch::Degraded => "degraded",
        }
    }
}

impl fmt::Display for ReplanBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplanOutcome {
    pub branch: ReplanBranch,
    pub plan: Plan,
}

/// Adjusts an existing plan after a flight delay. Never fails: the worst
/// case is a degraded plan with `feasible == false`.
#[derive(Debug, Clone)]
pub struct Replanner {
    catalog: Arc<Catalog>,
    config: ReplannerConfig,
}

impl Replanner {
    pub fn new(catalog: Arc<Catalog>, config: ReplannerConfig) -> Self {
        Self { catalog, config }
    }

    pub fn replan(&self, plan: &Plan, delay_hours: f64) -> Plan {
        self.evaluate(plan, delay_hours).plan
    }

    /// Tries, in order: reschedule, extend the stay by a night, cancel paid
    /// activities, and finally degrade to free activities with a faster
    /// transport as last resort. The first branch that applies wins.
    pub fn evaluate(&self, plan: &Plan, delay_hours: f64) -> ReplanOutcome {
        let delay = sanitize_delay(delay_hours);
        let mut next = plan.clone();

        if !plan.feasible {
            next.recommendation = Some("original plan already infeasible".to_string());
            return self.finish(ReplanBranch::AlreadyInfeasible, next, delay);
        }

        if delay <= self.config.minor_delay_hours {
            for activity in next.activities.iter_mut() {
                activity.status = Some(ActivityStatus::Rescheduled);
            }
            next.recommendation = Some(format!(
                "Delay {delay}h: shift activities where possible; no cost change"
            ));
            return self.finish(ReplanBranch::Rescheduled, next, delay);
        }

        let extra_night = plan.accommodation.cost_per_night;
        if plan.total_cost + extra_night <= plan.budget {
            next.nights += 1;
            next.accommodation_cost += extra_night;
            next.total_cost += extra_night;
            next.feasible = true;
            next.recommendation = Some(format!(
                "Delay {delay}h: added 1 extra night to accommodate delay"
            ));
            return self.finish(ReplanBranch::ExtendedStay, next, delay);
        }

        if let Some(cancelled) = cancel_low_value(&mut next) {
            next.feasible = next.within_budget();
            next.recommendation = Some(format!(
                "Delay {delay}h: cancelled {cancelled} paid activities to meet budget"
            ));
            return self.finish(ReplanBranch::CancelledActivities, next, delay);
        }

        // Best effort: free activities only. Feasibility is forced false here
        // even before checking whether a faster transport could recover it.
        next.activities.retain(|activity| activity.cost() == 0.0);
        next.recompute_totals();
        next.feasible = false;
        next.recommendation = Some(format!(
            "Delay {delay}h: cannot satisfy budget; recommend rescheduling or increasing budget"
        ));

        if let Some(faster) = self.faster_transport_within_budget(&next) {
            next.transport_cost = faster.cost_per_person * f64::from(next.num_people);
            next.transport = faster.clone();
            next.recompute_totals();
            next.feasible = true;
            next.recommendation = Some(format!(
                "Delay {delay}h: switched to faster transport '{}' to avoid further disruption",
                faster.id
            ));
            return self.finish(ReplanBranch::Rerouted, next, delay);
        }

        self.finish(ReplanBranch::Degraded, next, delay)
    }

    /// Strictly faster options ascending by duration; the first one whose
    /// substitution fits the budget, with accommodation and activities held.
    fn faster_transport_within_budget(&self, plan: &Plan) -> Option<&TransportOption> {
        let current = plan.transport.duration_hours;
        let mut faster: Vec<&TransportOption> = self
            .catalog
            .transport()
            .iter()
            .filter(|option| option.duration_hours < current)
            .collect();
        faster.sort_by(|a, b| a.duration_hours.total_cmp(&b.duration_hours));

        faster.into_iter().find(|option| {
            let transport_cost = option.cost_per_person * f64::from(plan.num_people);
            transport_cost + plan.accommodation_cost + plan.activities_cost <= plan.budget
        })
    }

    fn finish(&self, branch: ReplanBranch, plan: Plan, delay: f64) -> ReplanOutcome {
        info!(
            target: "replanner",
            branch = %branch,
            delay_hours = delay,
            feasible = plan.feasible,
            total_cost = plan.total_cost,
            "replanned after flight delay"
        );
        ReplanOutcome { branch, plan }
    }
}

/// Cancels paid activities worst value-for-money first (`cost / (score + 0.1)`
/// descending) until the plan fits. Returns the number cancelled, or `None`
/// when even cancelling every paid activity leaves the plan over budget, in
/// which case the plan is left untouched. Greedy: cancellation order is fixed
/// up front and never reconsidered.
fn cancel_low_value(plan: &mut Plan) -> Option<usize> {
    let mut candidates: Vec<usize> = plan
        .activities
        .iter()
        .enumerate()
        .filter(|(_, activity)| activity.cost() > 0.0)
        .map(|(index, _)| index)
        .collect();
    candidates.sort_by(|&a, &b| {
        let cost_ratio = |activity: &PlannedActivity| activity.cost() / (activity.score() + 0.1);
        cost_ratio(&plan.activities[b])
            .partial_cmp(&cost_ratio(&plan.activities[a]))
            .unwrap_or(Ordering::Equal)
    });

    // The running total is re-summed the way `recompute_totals` sums it, so
    // the stopping test and the final `within_budget` check always agree.
    let total_without = |removed: &[usize]| {
        let activities_cost: f64 = plan
            .activities
            .iter()
            .enumerate()
            .filter(|(index, _)| !removed.contains(index))
            .map(|(_, activity)| activity.cost())
            .sum();
        plan.transport_cost + plan.accommodation_cost + activities_cost
    };

    let mut removed = Vec::new();
    let mut running_total = total_without(&removed);
    for index in candidates {
        if running_total <= plan.budget {
            break;
        }
        removed.push(index);
        running_total = total_without(&removed);
    }

    if running_total > plan.budget {
        return None;
    }

    let mut position = 0;
    plan.activities.retain(|_| {
        let keep = !removed.contains(&position);
        position += 1;
        keep
    });
    plan.recompute_totals();
    Some(removed.len())
}

fn sanitize_delay(delay_hours: f64) -> f64 {
    if delay_hours.is_finite() && delay_hours >= 0.0 {
        delay_hours
    } else {
        warn!(target: "replanner", delay_hours, "invalid delay treated as zero");
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        AccommodationOption, AccommodationTier, Activity, ActivityCategory, TransportMode,
    };

    fn catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::new(
                vec![
                    TransportOption::new("slow_coach", TransportMode::Road, "Coach", 5000.0, 10.0),
                    TransportOption::new("fast_rail", TransportMode::Rail, "Rail", 1000.0, 3.0),
                    TransportOption::new("jet", TransportMode::Flight, "Jet", 9000.0, 1.0),
                ],
                vec![AccommodationOption::new(
                    "inn",
                    AccommodationTier::Budget,
                    "Inn",
                    1000.0,
                    4,
                )],
                vec![
                    Activity::new("walk", "Walk", 0.0, 5.0, ActivityCategory::Outdoor),
                    Activity::new("show", "Show", 1000.0, 8.0, ActivityCategory::Indoor),
                    Activity::new("tour", "Tour", 1000.0, 2.0, ActivityCategory::Outdoor),
                ],
            )
            .unwrap(),
        )
    }

    fn plan_with(catalog: &Catalog, transport: usize, activities: &[usize], budget: f64) -> Plan {
        let activities = activities
            .iter()
            .map(|&index| PlannedActivity::from(catalog.activities()[index].clone()))
            .collect();
        let mut plan = Plan::assemble(
            catalog.transport()[transport].clone(),
            catalog.accommodation()[0].clone(),
            activities,
            budget,
            1,
            2,
        );
        // Simulates a plan that went over budget after it was committed.
        plan.feasible = true;
        plan
    }

    #[test]
    fn cancels_worst_value_first() {
        let catalog = catalog();
        let replanner = Replanner::new(catalog.clone(), ReplannerConfig::default());
        // coach 5000 + inn 2000 + walk 0 + show 1000 + tour 1000 = 9000
        let plan = plan_with(&catalog, 0, &[0, 1, 2], 8000.0);
        let outcome = replanner.evaluate(&plan, 6.0);
        assert_eq!(outcome.branch, ReplanBranch::CancelledActivities);
        assert_eq!(outcome.plan.activity_ids(), vec!["walk", "show"]);
        assert_eq!(outcome.plan.activities_cost, 1000.0);
        assert_eq!(outcome.plan.total_cost, 8000.0);
        assert!(outcome.plan.feasible);
        assert_eq!(
            outcome.plan.recommendation(),
            "Delay 6h: cancelled 1 paid activities to meet budget"
        );
    }

    #[test]
    fn reroutes_to_faster_transport_after_degrading() {
        let catalog = catalog();
        let replanner = Replanner::new(catalog.clone(), ReplannerConfig::default());
        let plan = plan_with(&catalog, 0, &[0, 1, 2], 4000.0);
        let outcome = replanner.evaluate(&plan, 6.0);
        assert_eq!(outcome.branch, ReplanBranch::Rerouted);
        // jet is fastest but 9000 + 2000 does not fit; fast_rail does.
        assert_eq!(outcome.plan.transport.id, "fast_rail");
        assert_eq!(outcome.plan.transport_cost, 1000.0);
        assert_eq!(outcome.plan.activity_ids(), vec!["walk"]);
        assert_eq!(outcome.plan.total_cost, 3000.0);
        assert!(outcome.plan.feasible);
        assert!(outcome.plan.recommendation().contains("fast_rail"));
    }

    #[test]
    fn degraded_plan_is_forced_infeasible() {
        let catalog = catalog();
        let replanner = Replanner::new(catalog.clone(), ReplannerConfig::default());
        // already on jet, nothing is faster
        let plan = plan_with(&catalog, 2, &[0, 1], 5000.0);
        let outcome = replanner.evaluate(&plan, 12.0);
        assert_eq!(outcome.branch, ReplanBranch::Degraded);
        assert!(!outcome.plan.feasible);
        assert_eq!(outcome.plan.activity_ids(), vec!["walk"]);
        assert_eq!(outcome.plan.total_cost, 11_000.0);
        assert_eq!(
            outcome.plan.total_cost,
            outcome.plan.transport_cost
                + outcome.plan.accommodation_cost
                + outcome.plan.activities_cost
        );
        assert!(outcome.plan.recommendation().contains("rescheduling"));
    }

    #[test]
    fn cancellation_agrees_with_recomputed_total() {
        // Fractional costs where `total - c` fits the budget but the fresh
        // sum of the remaining activities lands one ulp above it.
        let catalog = Arc::new(
            Catalog::new(
                vec![TransportOption::new("shuttle", TransportMode::Road, "Shuttle", 13.44, 4.0)],
                vec![AccommodationOption::new(
                    "cabin",
                    AccommodationTier::Budget,
                    "Cabin",
                    84.74,
                    3,
                )],
                vec![
                    Activity::new("a", "A", 38.19, 10.0, ActivityCategory::Indoor),
                    Activity::new("b", "B", 12.76, 10.0, ActivityCategory::Indoor),
                    Activity::new("c", "C", 24.78, 0.0, ActivityCategory::Outdoor),
                ],
            )
            .unwrap(),
        );
        let activities = catalog
            .activities()
            .iter()
            .cloned()
            .map(PlannedActivity::from)
            .collect();
        let mut plan = Plan::assemble(
            catalog.transport()[0].clone(),
            catalog.accommodation()[0].clone(),
            activities,
            149.12999999999997,
            1,
            1,
        );
        plan.feasible = true;

        let replanner = Replanner::new(catalog, ReplannerConfig::default());
        let outcome = replanner.evaluate(&plan, 6.0);
        let next = &outcome.plan;
        assert_eq!(outcome.branch, ReplanBranch::CancelledActivities);
        assert_eq!(next.activity_ids(), vec!["b"]);
        assert!(next.feasible);
        assert_eq!(next.feasible, next.total_cost <= next.budget);
        assert_eq!(
            next.recommendation(),
            "Delay 6h: cancelled 2 paid activities to meet budget"
        );
    }

    #[test]
    fn invalid_delay_is_treated_as_minor() {
        let catalog = catalog();
        let replanner = Replanner::new(catalog.clone(), ReplannerConfig::default());
        let plan = plan_with(&catalog, 1, &[0], 10_000.0);
        assert_eq!(
            replanner.evaluate(&plan, f64::NAN).branch,
            ReplanBranch::Rescheduled
        );
        assert_eq!(
            replanner.evaluate(&plan, -4.0).branch,
            ReplanBranch::Rescheduled
        );
    }

    #[test]
    fn minor_delay_threshold_is_configurable() {
        let catalog = catalog();
        let replanner = Replanner::new(
            catalog.clone(),
            ReplannerConfig {
                minor_delay_hours: 8.0,
            },
        );
        let plan = plan_with(&catalog, 1, &[0], 10_000.0);
        assert_eq!(replanner.evaluate(&plan, 6.0).branch, ReplanBranch::Rescheduled);
        assert_eq!(replanner.evaluate(&plan, 9.0).branch, ReplanBranch::ExtendedStay);
    }
}
