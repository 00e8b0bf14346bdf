use rdtsim_types::{Entity, Packet};

/// The three kinds of thing the simulator can schedule.
#[derive(Debug, Clone)]
pub enum EventKind {
    TimerInterrupt,
    FromLayer5,
    FromLayer3(Packet),
}

/// A single scheduled occurrence. Events are never mutated after insertion.
#[derive(Debug, Clone)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
    pub entity: Entity,
}

/// Time-ordered sequence of events with stable FIFO ordering among equal
/// times. A linear-scan insert is fine for the simulator's workload; this is
/// not a performance-critical data structure.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Insert `event` after every already-queued event with `time <= event.time`.
    pub fn insert(&mut self, event: Event) {
        let pos = self
            .events
            .iter()
            .position(|e| e.time > event.time)
            .unwrap_or(self.events.len());
        self.events.insert(pos, event);
    }

    /// Remove and return the earliest event, if any.
    pub fn pop_front(&mut self) -> Option<Event> {
        if self.events.is_empty() {
            None
        } else {
            Some(self.events.remove(0))
        }
    }

    /// Remove the first event matching `pred`, returning whether one was found.
    pub fn remove_where(&mut self, pred: impl Fn(&Event) -> bool) -> bool {
        if let Some(pos) = self.events.iter().position(pred) {
            self.events.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn any(&self, pred: impl Fn(&Event) -> bool) -> bool {
        self.events.iter().any(pred)
    }

    /// Latest scheduled arrival time among `FromLayer3` events destined for `entity`.
    pub fn latest_arrival_for(&self, entity: Entity) -> Option<f64> {
        self.events
            .iter()
            .filter(|e| e.entity == entity && matches!(e.kind, EventKind::FromLayer3(_)))
            .map(|e| e.time)
            .fold(None, |acc, t| Some(acc.map_or(t, |m: f64| m.max(t))))
    }
}
