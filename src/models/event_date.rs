use serde::{Deserialize, Serialize};

use crate::models::event::Event;
use crate::models::trip_time::TripTime;

/// One calendar day of a trip: the day's events in start-time order plus the
/// weather summary injected after assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDate {
    pub date: TripTime,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub high: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub low: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl EventDate {
    pub fn new(date: TripTime) -> Self {
        Self {
            date,
            high: None,
            low: None,
            condition: None,
            events: Vec::new(),
        }
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Remove the event with the given id, returning it if present.
    pub fn remove_event(&mut self, id: &str) -> Option<Event> {
        let index = self.events.iter().position(|e| e.id() == id)?;
        Some(self.events.remove(index))
    }

    /// Stable sort by start time; same-time events keep their insert order.
    pub fn sort_events(&mut self) {
        self.events.sort_by_key(|e| e.start_time());
    }

    pub fn set_temperatures(&mut self, high: Option<i64>, low: Option<i64>) {
        self.high = high;
        self.low = low;
    }

    pub fn resolve_times(&mut self, baseline: TripTime) {
        self.date.resolve(baseline);
        for event in &mut self.events {
            event.resolve_times(baseline);
        }
    }
}
