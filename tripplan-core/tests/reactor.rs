use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use tripplan_core::{
    ActivityStatus, Catalog, EventReactor, Message, MessageBus, Plan, Planner, PlannerConfig,
    ReactorConfig, Replanner, ReplannerConfig, Topic,
};

struct Harness {
    bus: Rc<MessageBus>,
    reactor: Rc<RefCell<EventReactor>>,
    updates: Rc<RefCell<Vec<Plan>>>,
}

fn harness() -> Harness {
    let catalog = Arc::new(Catalog::sample());
    let reactor = Rc::new(RefCell::new(EventReactor::new(
        Planner::new(catalog.clone(), PlannerConfig::default()),
        Replanner::new(catalog, ReplannerConfig::default()),
        ReactorConfig::default(),
    )));
    let bus = Rc::new(MessageBus::new());
    EventReactor::attach(&reactor, &bus);

    let updates = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&updates);
    bus.subscribe(Topic::PlanUpdate, move |message| {
        if let Message::PlanUpdate(update) = message {
            sink.borrow_mut().push(update.plan.clone());
        }
        Ok(())
    });

    Harness {
        bus,
        reactor,
        updates,
    }
}

#[test]
fn heavy_weather_tags_outdoor_activities() {
    let h = harness();
    h.reactor.borrow_mut().create_plan(18_000.0, 1, 2).unwrap();
    let before = h.reactor.borrow().current_plan().cloned().unwrap();
    assert!(before
        .activities
        .iter()
        .any(|a| a.category() == tripplan_core::ActivityCategory::Outdoor));

    h.bus.publish_weather("heavy");

    let updates = h.updates.borrow();
    assert_eq!(updates.len(), 1);
    let plan = &updates[0];
    assert!(plan.activities.iter().any(|a| matches!(
        a.status,
        Some(ActivityStatus::SwappedDueToWeather) | Some(ActivityStatus::PostponedDueToWeather)
    )));
    assert_eq!(
        plan.activities_cost,
        plan.activities.iter().map(|a| a.cost()).sum::<f64>()
    );
    assert_eq!(
        plan.total_cost,
        plan.transport_cost + plan.accommodation_cost + plan.activities_cost
    );
    assert_eq!(h.reactor.borrow().current_plan(), Some(plan));
}

#[test]
fn mild_weather_and_unknown_events_are_silent() {
    let h = harness();
    h.reactor.borrow_mut().create_plan(18_000.0, 1, 2).unwrap();
    h.bus.publish_weather("light");
    h.bus.publish_weather("drizzle");
    h.bus.publish_event("festival", BTreeMap::new());
    assert!(h.updates.borrow().is_empty());
}

#[test]
fn events_before_any_plan_are_ignored_except_budget() {
    let h = harness();
    h.bus.publish_flight_delay(5.0);
    h.bus.publish_weather("severe");
    h.bus.publish_event("peak_season", BTreeMap::new());
    assert!(h.updates.borrow().is_empty());

    h.bus.publish_budget(18_000.0);
    let updates = h.updates.borrow();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].num_people, 1);
    assert_eq!(updates[0].nights, 2);
}

#[test]
fn demo_sequence_emits_one_update_per_event() {
    let h = harness();
    h.reactor.borrow_mut().create_plan(18_000.0, 1, 2).unwrap();

    h.bus.publish_weather("heavy");
    h.bus.publish_event("peak_season", BTreeMap::new());
    h.bus.publish_flight_delay(6.0);
    h.bus.publish_budget(30_000.0);

    let updates = h.updates.borrow();
    assert_eq!(updates.len(), 4);
    assert!(updates[0].recommendation().starts_with("Weather alert"));
    assert!(updates[1].recommendation().starts_with("Peak season"));
    assert!(updates[2].recommendation().starts_with("Delay 6h"));
    assert_eq!(
        updates[3].recommendation(),
        "Budget updated to 30000: replanned accordingly"
    );
    assert_eq!(updates[3].budget, 30_000.0);
    // the delay extended the stay, so the new budget plans for three nights
    assert_eq!(updates[2].nights, 3);
    assert_eq!(updates[3].nights, 3);
}

#[test]
fn rejected_budget_is_swallowed_by_the_bus() {
    let h = harness();
    h.reactor.borrow_mut().create_plan(18_000.0, 1, 2).unwrap();
    h.bus.publish_budget(-50.0);
    assert!(h.updates.borrow().is_empty());
    assert_eq!(h.reactor.borrow().current_plan().unwrap().budget, 18_000.0);

    h.bus.publish_budget(20_000.0);
    assert_eq!(h.updates.borrow().len(), 1);
}
