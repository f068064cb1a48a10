//! Activity similarity and replacement scoring.
//!
//! Pure functions over catalog records; nothing here holds state.

use tracing::{info, warn};

use crate::catalog::{Activity, ActivityCategory};

/// Cost difference at which cost-closeness reaches zero.
const COST_DIFF_NORMALIZER: f64 = 3000.0;
/// Score difference at which score-closeness reaches zero.
const SCORE_DIFF_NORMALIZER: f64 = 10.0;
const VALUE_NORMALIZER: f64 = 10.0;

/// Similarity in `[0, 1]`: 0.3 cost-closeness + 0.3 score-closeness + 0.4
/// exact category match. Symmetric, but not a metric.
pub fn similarity(a: &Activity, b: &Activity) -> f64 {
    let cost_closeness = (1.0 - (a.cost - b.cost).abs() / COST_DIFF_NORMALIZER).max(0.0);
    let score_closeness = (1.0 - (a.score - b.score).abs() / SCORE_DIFF_NORMALIZER).max(0.0);
    let category_match = if a.category == b.category { 1.0 } else { 0.0 };

    0.3 * cost_closeness + 0.3 * score_closeness + 0.4 * category_match
}

/// How well `candidate` stands in for `original` when `target` is the wanted
/// category. Always `0` for the original itself.
pub fn score_replacement(original: &Activity, candidate: &Activity, target: ActivityCategory) -> f64 {
    if candidate.id == original.id {
        return 0.0;
    }

    let category_match = if candidate.category == target { 1.0 } else { 0.0 };
    let value = (candidate.value_for_money() / VALUE_NORMALIZER).min(1.0);

    0.4 * similarity(original, candidate) + 0.4 * category_match + 0.2 * value
}

/// Swaps every activity not already in `target` for the best-scoring catalog
/// entry that fits the remaining budget (`None` means unbounded).
///
/// Single greedy left-to-right pass: each item is decided against the budget
/// left after the items before it and never revisited. Ties go to the entry
/// that comes first in `catalog`. When nothing fits, the original is kept and
/// its own cost is still debited.
pub fn find_replacements(
    activities: &[Activity],
    catalog: &[Activity],
    target: ActivityCategory,
    budget: Option<f64>,
) -> Vec<Activity> {
    let mut remaining = budget.unwrap_or(f64::INFINITY);
    let mut replacements = Vec::with_capacity(activities.len());

    for original in activities {
        if original.category == target {
            remaining -= original.cost;
            replacements.push(original.clone());
            continue;
        }

        let mut best: Option<(&Activity, f64)> = None;
        for candidate in catalog.iter().filter(|candidate| candidate.cost <= remaining) {
            let score = score_replacement(original, candidate, target);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((chosen, score)) => {
                info!(
                    target: "scorer",
                    original = %original.id,
                    replacement = %chosen.id,
                    score,
                    "replacing activity"
                );
                remaining -= chosen.cost;
                replacements.push(chosen.clone());
            }
            None => {
                warn!(
                    target: "scorer",
                    original = %original.id,
                    remaining,
                    "no replacement fits remaining budget"
                );
                remaining -= original.cost;
                replacements.push(original.clone());
            }
        }
    }

    replacements
}
