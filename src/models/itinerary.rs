use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::store::RawRecord;
use crate::models::event_date::EventDate;
use crate::models::location::Location;
use crate::models::trip_time::{TripTime, MILLIS_PER_DAY};
use crate::services::PipelineError;

/// A single trip for a single user, as one version in the recommendation
/// sequence. Versions never share state; advancing a version clones the
/// whole itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    pub id: String,
    pub title: String,
    pub user: String,
    #[serde(default)]
    pub version: u32,
    pub start_time: TripTime,
    pub end_time: TripTime,
    pub initial_location: Location,
    #[serde(default)]
    pub dates: Vec<EventDate>,
}

impl Itinerary {
    /// Open an itinerary from its header record. Day buckets are pre-filled
    /// for every calendar day in `[start, end)`; events outside that span get
    /// buckets on demand via [`Itinerary::date_for`].
    pub fn from_record(record: &RawRecord) -> Result<Itinerary, PipelineError> {
        let mut itinerary: Itinerary = serde_json::from_value(Value::Object(record.clone()))
            .map_err(|err| PipelineError::MalformedRecord {
                kind: "itinerary",
                detail: err.to_string(),
            })?;

        let mut day = itinerary.start_time.start_of_day();
        while day < itinerary.end_time {
            itinerary.dates.push(EventDate::new(day));
            day = day.shift(MILLIS_PER_DAY);
        }
        Ok(itinerary)
    }

    /// The bucket for the given (midnight-normalized) day, creating it in
    /// chronological position if it does not exist yet.
    pub fn date_for(&mut self, day: TripTime) -> &mut EventDate {
        match self.dates.binary_search_by_key(&day, |d| d.date) {
            Ok(index) => &mut self.dates[index],
            Err(index) => {
                self.dates.insert(index, EventDate::new(day));
                &mut self.dates[index]
            }
        }
    }

    pub fn date(&self, day: TripTime) -> Option<&EventDate> {
        self.dates.iter().find(|d| d.date == day)
    }

    pub fn sort_all_events(&mut self) {
        for date in &mut self.dates {
            date.sort_events();
        }
    }

    pub fn resolve_times(&mut self, baseline: TripTime) {
        self.start_time.resolve(baseline);
        self.end_time.resolve(baseline);
        for date in &mut self.dates {
            date.resolve_times(baseline);
        }
    }
}

/// Everything the service returns for one user: the trip's five
/// recommendation versions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravelData {
    pub itineraries: Vec<Itinerary>,
}

impl TravelData {
    pub fn add_itinerary(&mut self, itinerary: Itinerary) {
        self.itineraries.push(itinerary);
    }

    pub fn resolve_times(&mut self, baseline: TripTime) {
        for itinerary in &mut self.itineraries {
            itinerary.resolve_times(baseline);
        }
    }
}

/// The deliverable shape: username to that user's versions.
pub type ItineraryBundle = HashMap<String, TravelData>;
