use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::info;
use tripplan_core::{Plan, Planner};

use crate::{AppContext, DisplayFallback, Result};

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    /// Budgets to plan
    #[arg(default_values_t = [5000.0, 10000.0, 18000.0, 30000.0])]
    pub budgets: Vec<f64>,
    /// Number of travellers
    #[arg(long, default_value_t = 1)]
    pub people: u32,
    /// Number of nights
    #[arg(long, default_value_t = 2)]
    pub nights: u32,
    /// Also write one CSV row per budget to this file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub plans: Vec<Plan>,
}

#[derive(Debug, Serialize)]
struct SweepRow<'a> {
    budget: f64,
    total_cost: f64,
    feasible: bool,
    transport: &'a str,
    accommodation: &'a str,
    activities: String,
}

impl<'a> From<&'a Plan> for SweepRow<'a> {
    fn from(plan: &'a Plan) -> Self {
        Self {
            budget: plan.budget,
            total_cost: plan.total_cost,
            feasible: plan.feasible,
            transport: &plan.transport.id,
            accommodation: &plan.accommodation.id,
            activities: plan.activity_ids().join(";"),
        }
    }
}

impl SweepArgs {
    pub fn execute(&self, context: &AppContext) -> Result<SweepReport> {
        let planner = Planner::new(context.catalog.clone(), context.config.planner.clone());
        let plans = self
            .budgets
            .iter()
            .map(|&budget| planner.plan(budget, self.people, self.nights))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if let Some(path) = &self.csv {
            write_csv(path, &plans)?;
            info!(rows = plans.len(), path = %path.display(), "wrote sweep csv");
        }
        Ok(SweepReport { plans })
    }
}

fn write_csv(path: &Path, plans: &[Plan]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for plan in plans {
        writer.serialize(SweepRow::from(plan))?;
    }
    writer.flush()?;
    Ok(())
}

impl DisplayFallback for SweepReport {
    fn display(&self) -> String {
        if self.plans.is_empty() {
            return "No budgets given".to_string();
        }
        self.plans
            .iter()
            .map(|plan| {
                format!(
                    "{:>10.2}  {:>10.2}  {:<10}  {:<14}  {:<10}  {}",
                    plan.budget,
                    plan.total_cost,
                    if plan.feasible { "feasible" } else { "infeasible" },
                    plan.transport.id,
                    plan.accommodation.id,
                    plan.activity_ids().join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn writes_one_row_per_budget() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sweep.csv");
        let args = SweepArgs {
            budgets: vec![1000.0, 25_000.0],
            people: 1,
            nights: 2,
            csv: Some(path.clone()),
        };
        let report = args.execute(&AppContext::new(None).unwrap()).unwrap();
        assert_eq!(report.plans.len(), 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "budget,total_cost,feasible,transport,accommodation,activities"
        );
        assert_eq!(lines[1], "1000.0,3500.0,false,road_bus,hostel,beach_visit");
        assert_eq!(
            lines[2],
            "25000.0,11000.0,true,road_car,guesthouse,beach_visit;museums;food_tour"
        );
    }

    #[test]
    fn default_budgets_apply() {
        use clap::Parser;

        let cli = crate::Cli::try_parse_from(["tripplanctl", "sweep"]).unwrap();
        match cli.command {
            crate::Commands::Sweep(args) => {
                assert_eq!(args.budgets, vec![5000.0, 10_000.0, 18_000.0, 30_000.0]);
                assert!(args.csv.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn stops_on_invalid_budget() {
        let args = SweepArgs {
            budgets: vec![5000.0, -1.0],
            people: 1,
            nights: 2,
            csv: None,
        };
        assert!(args.execute(&AppContext::new(None).unwrap()).is_err());
    }
}
