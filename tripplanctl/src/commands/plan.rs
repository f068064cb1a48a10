use clap::Args;
use serde::Serialize;
use tripplan_core::{Plan, Planner, ReplanBranch, Replanner};

use crate::{AppContext, AppError, DisplayFallback, Result};

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Total budget for the trip
    #[arg(long)]
    pub budget: f64,
    /// Number of travellers
    #[arg(long, default_value_t = 1)]
    pub people: u32,
    /// Number of nights
    #[arg(long, default_value_t = 2)]
    pub nights: u32,
    /// Replan the result after a flight delay of this many hours
    #[arg(long)]
    pub delay: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub plan: Plan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replan: Option<ReplanReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplanReport {
    pub delay_hours: f64,
    pub branch: ReplanBranch,
    pub plan: Plan,
}

impl PlanArgs {
    pub fn execute(&self, context: &AppContext) -> Result<PlanReport> {
        let delay = self.delay.map(validate_delay).transpose()?;

        let planner = Planner::new(context.catalog.clone(), context.config.planner.clone());
        let plan = planner.plan(self.budget, self.people, self.nights)?;

        let replan = delay.map(|delay_hours| {
            let replanner =
                Replanner::new(context.catalog.clone(), context.config.replanner.clone());
            let outcome = replanner.evaluate(&plan, delay_hours);
            ReplanReport {
                delay_hours,
                branch: outcome.branch,
                plan: outcome.plan,
            }
        });

        Ok(PlanReport { plan, replan })
    }
}

fn validate_delay(delay: f64) -> Result<f64> {
    if delay.is_finite() && delay >= 0.0 {
        Ok(delay)
    } else {
        Err(AppError::InvalidDelay(delay))
    }
}

impl DisplayFallback for PlanReport {
    fn display(&self) -> String {
        let mut out = self.plan.display();
        if let Some(replan) = &self.replan {
            out.push_str(&format!(
                "\n\nAfter {}h delay ({}):\n{}",
                replan.delay_hours,
                replan.branch,
                replan.plan.display()
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(budget: f64, delay: Option<f64>) -> PlanArgs {
        PlanArgs {
            budget,
            people: 1,
            nights: 2,
            delay,
        }
    }

    #[test]
    fn plans_and_replans() {
        let context = AppContext::new(None).unwrap();
        let report = args(30_000.0, Some(6.0)).execute(&context).unwrap();
        assert!(report.plan.feasible);
        let replan = report.replan.unwrap();
        assert_eq!(replan.branch, ReplanBranch::ExtendedStay);
        assert_eq!(replan.plan.nights, 3);

        let report = args(25_000.0, None).execute(&context).unwrap();
        assert!(report.replan.is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("replan").is_none());
        assert_eq!(json["plan"]["total_cost"], 11_000.0);
    }

    #[test]
    fn rejects_bad_delay_before_planning() {
        let context = AppContext::new(None).unwrap();
        for delay in [-1.0, f64::NAN, f64::INFINITY] {
            let err = args(25_000.0, Some(delay)).execute(&context).unwrap_err();
            assert!(matches!(err, AppError::InvalidDelay(_)));
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn non_positive_budget_is_a_plan_error() {
        let context = AppContext::new(None).unwrap();
        let err = args(0.0, None).execute(&context).unwrap_err();
        assert!(matches!(err, AppError::Plan(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
