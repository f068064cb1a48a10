//! Single-threaded topic-keyed publish/subscribe.
//!
//! Messages published while another message is being dispatched are queued
//! and delivered once the current one has been handled by every subscriber,
//! so handler bodies never interleave. A failing subscriber (error or panic)
//! is logged and skipped.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::plan::PlanError;

use super::models::{Event, GenericEventKind, Message, Topic, WeatherSeverity};

#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("observer busy")]
    Busy,
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type Handler = Box<dyn FnMut(&Message) -> Result<(), ObserverError>>;

struct Subscriber {
    id: SubscriptionId,
    handler: Rc<RefCell<Handler>>,
}

#[derive(Default)]
pub struct MessageBus {
    subscribers: RefCell<HashMap<Topic, Vec<Subscriber>>>,
    pending: RefCell<VecDeque<Message>>,
    dispatching: Cell<bool>,
    next_id: Cell<u64>,
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<Topic, usize> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(topic, subs)| (*topic, subs.len()))
            .collect();
        f.debug_struct("MessageBus")
            .field("subscribers", &counts)
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&Message) -> Result<(), ObserverError> + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let handler: Handler = Box::new(handler);
        self.subscribers
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push(Subscriber {
                id,
                handler: Rc::new(RefCell::new(handler)),
            });
        debug!(target: "bus", %topic, subscription = %id, "subscribed");
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        for subs in subscribers.values_mut() {
            if let Some(index) = subs.iter().position(|sub| sub.id == id) {
                subs.remove(index);
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers
            .borrow()
            .get(&topic)
            .map_or(0, |subs| subs.len())
    }

    pub fn publish(&self, message: impl Into<Message>) {
        self.pending.borrow_mut().push_back(message.into());
        if self.dispatching.get() {
            return;
        }

        self.dispatching.set(true);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(message) = next else {
                break;
            };
            self.dispatch(&message);
        }
        self.dispatching.set(false);
    }

    pub fn publish_flight_delay(&self, delay_hours: f64) {
        self.publish(Event::FlightDelay { delay_hours });
    }

    pub fn publish_weather(&self, severity: impl Into<WeatherSeverity>) {
        self.publish(Event::WeatherAlert {
            severity: severity.into(),
        });
    }

    pub fn publish_budget(&self, new_budget: f64) {
        self.publish(Event::BudgetChange { new_budget });
    }

    pub fn publish_event(
        &self,
        name: impl Into<String>,
        info: BTreeMap<String, serde_json::Value>,
    ) {
        self.publish(Event::Generic {
            name: GenericEventKind::from(name.into()),
            info,
        });
    }

    fn dispatch(&self, message: &Message) {
        let topic = message.topic();
        // Snapshot so handlers may subscribe or unsubscribe while running.
        let handlers: Vec<(SubscriptionId, Rc<RefCell<Handler>>)> = self
            .subscribers
            .borrow()
            .get(&topic)
            .map(|subs| {
                subs.iter()
                    .map(|sub| (sub.id, Rc::clone(&sub.handler)))
                    .collect()
            })
            .unwrap_or_default();

        for (id, cell) in handlers {
            let Ok(mut handler) = cell.try_borrow_mut() else {
                warn!(target: "bus", %topic, subscription = %id, "handler re-entered; skipped");
                continue;
            };
            match panic::catch_unwind(AssertUnwindSafe(|| (*handler)(message))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(target: "bus", %topic, subscription = %id, "handler failed: {err}");
                }
                Err(_) => {
                    warn!(target: "bus", %topic, subscription = %id, "handler panicked");
                }
            }
        }
    }
}
