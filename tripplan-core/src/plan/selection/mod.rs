use std::cmp::Ordering;

use crate::catalog::{Activity, ActivityCategory};

/// Orders activities by `score / (cost_weight * cost + 1)` descending, breaking
/// ties by raw score descending. The sort is stable, so remaining ties keep
/// their input order.
pub fn rank_by_value<'a, I>(candidates: I, cost_weight: f64) -> Vec<&'a Activity>
where
    I: IntoIterator<Item = &'a Activity>,
{
    let mut ranked: Vec<&Activity> = candidates.into_iter().collect();
    ranked.sort_by(|a, b| {
        let ratio_a = weighted_value(a, cost_weight);
        let ratio_b = weighted_value(b, cost_weight);
        ratio_b
            .partial_cmp(&ratio_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    });
    ranked
}

fn weighted_value(activity: &Activity, cost_weight: f64) -> f64 {
    activity.score / (cost_weight * activity.cost + 1.0)
}

/// Greedy activity pick used for every (re)selection during planning.
///
/// Candidates are walked in value order; anything that still fits the
/// remaining budget is taken and anything that would overflow is skipped,
/// never backtracked. This is not a knapsack optimum.
pub fn select_activities(
    pool: &[Activity],
    remaining_budget: f64,
    max_count: usize,
    category: Option<ActivityCategory>,
) -> Vec<Activity> {
    let candidates = pool
        .iter()
        .filter(|activity| category.map_or(true, |wanted| activity.category == wanted));

    let mut chosen = Vec::new();
    let mut spent = 0.0;
    for candidate in rank_by_value(candidates, 1.0) {
        if chosen.len() >= max_count {
            break;
        }
        if spent + candidate.cost <= remaining_budget {
            spent += candidate.cost;
            chosen.push(candidate.clone());
        }
    }
    chosen
}
