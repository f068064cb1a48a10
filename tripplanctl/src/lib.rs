use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tripplan_core::{load_config, Catalog, Plan, TripplanConfig};

pub mod commands;

use commands::completions::CompletionsArgs;
use commands::demo::DemoArgs;
use commands::plan::PlanArgs;
use commands::sweep::SweepArgs;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] tripplan_core::ConfigError),
    #[error("plan error: {0}")]
    Plan(#[from] tripplan_core::PlanError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("delay must be a finite number of hours >= 0, got {0}")]
    InvalidDelay(f64),
    #[error("invalid override: {0}")]
    InvalidOverride(String),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidDelay(_) | AppError::InvalidOverride(_) => 2,
            _ => 1,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Travel budget planner", long_about = None)]
pub struct Cli {
    /// Path to tripplan.toml; built-in defaults and the sample catalog when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Builds a plan, optionally replanning it after a flight delay
    Plan(PlanArgs),
    /// Plans a series of budgets side by side
    Sweep(SweepArgs),
    /// Runs a scripted event sequence through the reactor
    Demo(DemoArgs),
    /// Prints a shell completion script
    Completions(CompletionsArgs),
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .compact(),
        )
        .try_init();
}

pub fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions(args) = &cli.command {
        args.generate(&mut Cli::command(), &mut io::stdout());
        return Ok(());
    }

    let context = AppContext::new(cli.config.as_deref())?;
    match &cli.command {
        Commands::Plan(args) => {
            let report = args.execute(&context)?;
            render(&report, cli.format)?;
        }
        Commands::Sweep(args) => {
            let report = args.execute(&context)?;
            render(&report, cli.format)?;
        }
        Commands::Demo(args) => {
            let report = args.execute(&context)?;
            render(&report, cli.format)?;
        }
        Commands::Completions(_) => {}
    }
    Ok(())
}

/// Loaded configuration plus the catalog it points at.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: TripplanConfig,
    pub catalog: Arc<Catalog>,
}

impl AppContext {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => load_config(path)?,
            None => TripplanConfig::default(),
        };
        let catalog = config.catalog()?;
        Ok(Self { config, catalog })
    }
}

fn render<T>(value: &T, format: OutputFormat) -> Result<()>
where
    T: Serialize + DisplayFallback,
{
    match format {
        OutputFormat::Text => {
            println!("{}", value.display());
            Ok(())
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
            Ok(())
        }
    }
}

trait DisplayFallback {
    fn display(&self) -> String;
}

impl DisplayFallback for Plan {
    fn display(&self) -> String {
        let status = if self.feasible { "feasible" } else { "INFEASIBLE" };
        let mut lines = vec![
            format!(
                "Plan for {} people, {} nights, budget {:.2} ({status})",
                self.num_people, self.nights, self.budget
            ),
            format!(
                "  transport:     {} ({}) {:.2}",
                self.transport.name, self.transport.id, self.transport_cost
            ),
            format!(
                "  accommodation: {} ({}) {:.2}",
                self.accommodation.name, self.accommodation.id, self.accommodation_cost
            ),
        ];
        if self.activities.is_empty() {
            lines.push("  activities:    none".to_string());
        } else {
            lines.push(format!("  activities:    {:.2}", self.activities_cost));
            for activity in &self.activities {
                let status = activity
                    .status
                    .map(|status| format!(" [{status}]"))
                    .unwrap_or_default();
                lines.push(format!(
                    "    - {} ({}, {}) {:.2}{status}",
                    activity.activity.name,
                    activity.id(),
                    activity.category(),
                    activity.cost()
                ));
            }
        }
        lines.push(format!(
            "  total:         {:.2} (headroom {:.2})",
            self.total_cost,
            self.headroom()
        ));
        if let Some(recommendation) = &self.recommendation {
            lines.push(format!("  note: {recommendation}"));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_and_subcommand() {
        let cli = Cli::try_parse_from([
            "tripplanctl",
            "--format",
            "json",
            "plan",
            "--budget",
            "25000",
            "--delay",
            "6",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Plan(args) => {
                assert_eq!(args.budget, 25_000.0);
                assert_eq!(args.people, 1);
                assert_eq!(args.nights, 2);
                assert_eq!(args.delay, Some(6.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unparseable_delay_is_a_usage_error() {
        let err = Cli::try_parse_from(["tripplanctl", "plan", "--budget", "100", "--delay", "soon"])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(AppError::InvalidDelay(-1.0).exit_code(), 2);
        let plan_err = tripplan_core::PlanError::InvalidInput {
            budget: 0.0,
            people: 1,
            nights: 1,
        };
        assert_eq!(AppError::from(plan_err).exit_code(), 1);
    }

    #[test]
    fn context_loads_fixture_config() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../configs/tripplan.toml");
        let context = AppContext::new(Some(path.as_path())).unwrap();
        assert_eq!(*context.catalog, Catalog::sample());

        let defaults = AppContext::new(None).unwrap();
        assert_eq!(defaults.config, TripplanConfig::default());
    }

    #[test]
    fn plan_text_lists_costs_and_note() {
        let context = AppContext::new(None).unwrap();
        let planner = tripplan_core::Planner::new(
            context.catalog.clone(),
            context.config.planner.clone(),
        );
        let mut plan = planner.plan(1000.0, 1, 2).unwrap();
        plan.recommendation = Some("original plan already infeasible".into());
        let text = plan.display();
        assert!(text.contains("INFEASIBLE"));
        assert!(text.contains("Bus (road_bus) 1500.00"));
        assert!(text.contains("note: original plan already infeasible"));
    }
}
