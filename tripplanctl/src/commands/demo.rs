use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use clap::Args;
use serde::Serialize;
use tracing::info;
use tripplan_core::{
    Event, EventReactor, Message, MessageBus, Plan, PlanUpdate, Planner, Replanner, Topic,
    WeatherSeverity,
};

use crate::{AppContext, AppError, DisplayFallback, Result};

const DEMO_BUDGET: f64 = 18_000.0;
const DEMO_PEOPLE: u32 = 1;
const DEMO_NIGHTS: u32 = 2;

#[derive(Args, Debug, Clone, Default)]
pub struct DemoArgs {
    /// Overrides reactor.replacement_score_delta
    #[arg(long)]
    pub replacement_score_delta: Option<f64>,
    /// Overrides reactor.replacement_cost_weight
    #[arg(long)]
    pub replacement_cost_weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub initial: Plan,
    pub steps: Vec<DemoStep>,
}

/// One published event and the update it produced, if any.
#[derive(Debug, Clone, Serialize)]
pub struct DemoStep {
    pub event: Event,
    pub update: Option<PlanUpdate>,
}

fn script() -> Vec<Event> {
    vec![
        Event::WeatherAlert {
            severity: WeatherSeverity::Heavy,
        },
        Event::Generic {
            name: "peak_season".into(),
            info: BTreeMap::from([("season".to_string(), "summer".into())]),
        },
        Event::FlightDelay { delay_hours: 6.0 },
        Event::BudgetChange {
            new_budget: 30_000.0,
        },
    ]
}

impl DemoArgs {
    pub fn execute(&self, context: &AppContext) -> Result<DemoReport> {
        let mut reactor_config = context.config.reactor.clone();
        if let Some(delta) = self.replacement_score_delta {
            reactor_config.replacement_score_delta = delta;
        }
        if let Some(weight) = self.replacement_cost_weight {
            reactor_config.replacement_cost_weight = weight;
        }
        reactor_config.validate().map_err(AppError::InvalidOverride)?;

        let reactor = Rc::new(RefCell::new(EventReactor::new(
            Planner::new(context.catalog.clone(), context.config.planner.clone()),
            Replanner::new(context.catalog.clone(), context.config.replanner.clone()),
            reactor_config,
        )));
        let initial = reactor
            .borrow_mut()
            .create_plan(DEMO_BUDGET, DEMO_PEOPLE, DEMO_NIGHTS)?
            .clone();

        let bus = Rc::new(MessageBus::new());
        EventReactor::attach(&reactor, &bus);

        let received: Rc<RefCell<Vec<PlanUpdate>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        bus.subscribe(Topic::PlanUpdate, move |message| {
            if let Message::PlanUpdate(update) = message {
                info!(
                    update = %update.update_id,
                    total_cost = update.plan.total_cost,
                    feasible = update.plan.feasible,
                    "plan update received"
                );
                sink.borrow_mut().push(update.clone());
            }
            Ok(())
        });

        let mut steps = Vec::new();
        for event in script() {
            let seen = received.borrow().len();
            bus.publish(event.clone());
            let update = received.borrow().get(seen).cloned();
            steps.push(DemoStep { event, update });
        }

        Ok(DemoReport { initial, steps })
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::FlightDelay { delay_hours } => format!("flight delay of {delay_hours}h"),
        Event::WeatherAlert { severity } => format!("weather alert ({severity})"),
        Event::BudgetChange { new_budget } => format!("budget changed to {new_budget}"),
        Event::Generic { name, .. } => format!("event '{name}'"),
    }
}

impl DisplayFallback for DemoReport {
    fn display(&self) -> String {
        let mut sections = vec![format!("Initial plan\n{}", self.initial.display())];
        for step in &self.steps {
            let body = match &step.update {
                Some(update) => format!(
                    "update {} at {}\n{}",
                    update.update_id,
                    update.emitted_at.format("%H:%M:%S"),
                    update.plan.display()
                ),
                None => "no change".to_string(),
            };
            sections.push(format!("On {}: {body}", describe(&step.event)));
        }
        sections.join("\n\n")
    }
}
