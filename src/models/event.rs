use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::store::RawRecord;
use crate::models::location::{GeoPoint, Geometry, Location};
use crate::models::trip_time::TripTime;
use crate::services::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Flight,
    Lodging,
    Meeting,
    Restaurant,
    Transit,
    Recommendations,
}

/// Which decision a recommendation event is pending on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecKind {
    Lodging,
    Restaurant,
    Transit,
}

/// How a chosen lodging booking is displayed on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StayMarker {
    Checkin,
    Stay,
    Checkout,
}

/// Fields shared by every event variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCore {
    pub id: String,
    #[serde(default)]
    pub itinerary_id: String,
    pub start_time: TripTime,
    pub end_time: TripTime,
    #[serde(default)]
    pub affected_by_weather: bool,
}

impl EventCore {
    pub fn resolve_times(&mut self, baseline: TripTime) {
        self.start_time.resolve(baseline);
        self.end_time.resolve(baseline);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightEvent {
    #[serde(flatten)]
    pub core: EventCore,
    pub boarding_time: TripTime,
    pub departure_time: TripTime,
    pub arrival_time: TripTime,
    pub departure_airport_code: String,
    pub arrival_airport_code: String,
    pub departure_location: Location,
    pub arrival_location: Location,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub terminal: Option<String>,
}

/// A price adjustment produced by the discount-evaluation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub message: String,
    pub previous_price: f32,
    pub discounted_price: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LodgingEvent {
    #[serde(flatten)]
    pub core: EventCore,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub confirmation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub geometry: Option<Geometry>,
    pub checkin: TripTime,
    pub checkout: TripTime,
    pub price: f32,
    #[serde(default)]
    pub original_price: f32,
    #[serde(default)]
    pub is_preferred: bool,
    #[serde(default)]
    pub has_promotional_discount: bool,
    #[serde(default)]
    pub is_loyalty_member: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub promotional_discount: Option<Discount>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub loyalty_discount: Option<Discount>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub loyalty_program_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub loyalty_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vicinity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub review_highlight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reviewer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
    /// Set once the booking is chosen and propagated across the stay.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_type: Option<StayMarker>,
}

impl LodgingEvent {
    fn resolve_times(&mut self, baseline: TripTime) {
        self.core.resolve_times(baseline);
        self.checkin.resolve(baseline);
        self.checkout.resolve(baseline);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingEvent {
    #[serde(flatten)]
    pub core: EventCore,
    pub name: String,
    pub geometry: Geometry,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub is_outdoor: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub recommended_replacements: Option<RecommendationEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantEvent {
    #[serde(flatten)]
    pub core: EventCore,
    pub name: String,
    pub geometry: Geometry,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub price_level: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub is_outdoor: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub review_highlight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reviewer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub recommended_replacements: Option<RecommendationEvent>,
}

/// One leg of a transit option. Fields shared by every step type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepLeg {
    pub start_time: TripTime,
    pub end_time: TripTime,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub departure_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub arrival_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransitStep {
    Rail {
        #[serde(flatten)]
        leg: StepLeg,
        transit_line: String,
        stops: i64,
    },
    Bus {
        #[serde(flatten)]
        leg: StepLeg,
        transit_line: String,
        stops: i64,
    },
    Walk {
        #[serde(flatten)]
        leg: StepLeg,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        walk_time: Option<String>,
    },
    Car {
        #[serde(flatten)]
        leg: StepLeg,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        title: Option<String>,
    },
    Partner {
        #[serde(flatten)]
        leg: StepLeg,
        partner_name: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pickup_time: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        fare_notice: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        seats_remaining: Option<i64>,
    },
}

impl TransitStep {
    pub fn leg(&self) -> &StepLeg {
        match self {
            TransitStep::Rail { leg, .. }
            | TransitStep::Bus { leg, .. }
            | TransitStep::Walk { leg, .. }
            | TransitStep::Car { leg, .. }
            | TransitStep::Partner { leg, .. } => leg,
        }
    }

    fn leg_mut(&mut self) -> &mut StepLeg {
        match self {
            TransitStep::Rail { leg, .. }
            | TransitStep::Bus { leg, .. }
            | TransitStep::Walk { leg, .. }
            | TransitStep::Car { leg, .. }
            | TransitStep::Partner { leg, .. } => leg,
        }
    }

    fn resolve_times(&mut self, baseline: TripTime) {
        let leg = self.leg_mut();
        leg.start_time.resolve(baseline);
        leg.end_time.resolve(baseline);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitEvent {
    #[serde(flatten)]
    pub core: EventCore,
    /// Stable wire name for the option, e.g. `walk_rail_rail_walk`.
    pub option_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub cost_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub departure_street: Option<String>,
    #[serde(default)]
    pub walking_distance: f64,
    #[serde(default)]
    pub is_preferred: bool,
    #[serde(default)]
    pub transit_steps: Vec<TransitStep>,
}

impl TransitEvent {
    /// Total time spent waiting between consecutive legs, in milliseconds.
    pub fn waiting_time(&self) -> i64 {
        self.transit_steps
            .windows(2)
            .map(|pair| pair[1].leg().start_time.millis() - pair[0].leg().end_time.millis())
            .sum()
    }

    pub fn num_transfers(&self) -> usize {
        self.transit_steps.len().saturating_sub(1)
    }

    /// End of the last leg minus start of the first, in milliseconds.
    pub fn total_duration(&self) -> i64 {
        match (self.transit_steps.first(), self.transit_steps.last()) {
            (Some(first), Some(last)) => {
                last.leg().end_time.millis() - first.leg().start_time.millis()
            }
            _ => 0,
        }
    }

    fn resolve_times(&mut self, baseline: TripTime) {
        self.core.resolve_times(baseline);
        for step in &mut self.transit_steps {
            step.resolve_times(baseline);
        }
    }
}

/// A pseudo-event holding a ranked, best-first candidate list for a pending
/// lodging, restaurant, or transit decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationEvent {
    #[serde(flatten)]
    pub core: EventCore,
    pub rec_type: RecKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub alert: bool,
    #[serde(default)]
    pub candidates: Vec<Event>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub from_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub to_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lodging_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub associated_event_id: Option<String>,
}

impl RecommendationEvent {
    pub fn resolve_times(&mut self, baseline: TripTime) {
        self.core.resolve_times(baseline);
        for candidate in &mut self.candidates {
            candidate.resolve_times(baseline);
        }
    }
}

/// An itinerary event. The `subtype` tag on raw records selects the variant,
/// so the feed's flat documents deserialize straight into the right shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "subtype", rename_all = "lowercase")]
pub enum Event {
    Flight(FlightEvent),
    Lodging(LodgingEvent),
    Meeting(MeetingEvent),
    Restaurant(RestaurantEvent),
    Transit(TransitEvent),
    Recommendations(RecommendationEvent),
}

impl Event {
    /// Build an event from a raw store record, attaching it to the itinerary
    /// currently being assembled.
    pub fn from_record(record: &RawRecord, itinerary_id: &str) -> Result<Event, PipelineError> {
        let mut event: Event = serde_json::from_value(Value::Object(record.clone())).map_err(
            |err| PipelineError::MalformedRecord {
                kind: "event",
                detail: err.to_string(),
            },
        )?;
        event.core_mut().itinerary_id = itinerary_id.to_string();
        Ok(event)
    }

    pub fn core(&self) -> &EventCore {
        match self {
            Event::Flight(e) => &e.core,
            Event::Lodging(e) => &e.core,
            Event::Meeting(e) => &e.core,
            Event::Restaurant(e) => &e.core,
            Event::Transit(e) => &e.core,
            Event::Recommendations(e) => &e.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut EventCore {
        match self {
            Event::Flight(e) => &mut e.core,
            Event::Lodging(e) => &mut e.core,
            Event::Meeting(e) => &mut e.core,
            Event::Restaurant(e) => &mut e.core,
            Event::Transit(e) => &mut e.core,
            Event::Recommendations(e) => &mut e.core,
        }
    }

    pub fn id(&self) -> &str {
        &self.core().id
    }

    pub fn start_time(&self) -> TripTime {
        self.core().start_time
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Flight(_) => EventKind::Flight,
            Event::Lodging(_) => EventKind::Lodging,
            Event::Meeting(_) => EventKind::Meeting,
            Event::Restaurant(_) => EventKind::Restaurant,
            Event::Transit(_) => EventKind::Transit,
            Event::Recommendations(_) => EventKind::Recommendations,
        }
    }

    pub fn is_outdoor(&self) -> bool {
        match self {
            Event::Meeting(e) => e.is_outdoor,
            Event::Restaurant(e) => e.is_outdoor,
            _ => false,
        }
    }

    /// The venue position for events that have one (meetings, restaurants).
    pub fn location(&self) -> Option<GeoPoint> {
        match self {
            Event::Meeting(e) => Some(e.geometry.location),
            Event::Restaurant(e) => Some(e.geometry.location),
            _ => None,
        }
    }

    pub fn affected_by_weather(&self) -> bool {
        self.core().affected_by_weather
    }

    pub fn set_affected_by_weather(&mut self, affected: bool) {
        self.core_mut().affected_by_weather = affected;
    }

    pub fn recommended_replacements(&self) -> Option<&RecommendationEvent> {
        match self {
            Event::Meeting(e) => e.recommended_replacements.as_ref(),
            Event::Restaurant(e) => e.recommended_replacements.as_ref(),
            _ => None,
        }
    }

    /// Embed replacement suggestions on an event. Only venue-bearing events
    /// can carry them; returns false otherwise.
    pub fn set_recommended_replacements(&mut self, recs: RecommendationEvent) -> bool {
        match self {
            Event::Meeting(e) => {
                e.recommended_replacements = Some(recs);
                true
            }
            Event::Restaurant(e) => {
                e.recommended_replacements = Some(recs);
                true
            }
            _ => false,
        }
    }

    pub fn resolve_times(&mut self, baseline: TripTime) {
        match self {
            Event::Flight(e) => {
                e.core.resolve_times(baseline);
                e.boarding_time.resolve(baseline);
                e.departure_time.resolve(baseline);
                e.arrival_time.resolve(baseline);
            }
            Event::Lodging(e) => e.resolve_times(baseline),
            Event::Meeting(e) => {
                e.core.resolve_times(baseline);
                if let Some(recs) = &mut e.recommended_replacements {
                    recs.resolve_times(baseline);
                }
            }
            Event::Restaurant(e) => {
                e.core.resolve_times(baseline);
                if let Some(recs) = &mut e.recommended_replacements {
                    recs.resolve_times(baseline);
                }
            }
            Event::Transit(e) => e.resolve_times(baseline),
            Event::Recommendations(e) => e.resolve_times(baseline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subtype_tag_selects_the_variant() {
        let record = json!({
            "type": "event",
            "subtype": "meeting",
            "id": "evt-1",
            "start_time": 3_600_000,
            "end_time": 7_200_000,
            "name": "Design review",
            "geometry": { "location": { "lat": 52.52, "lng": 13.405 } },
            "is_outdoor": false
        });
        let map = record.as_object().expect("object").clone();
        let event = Event::from_record(&map, "itin-1").expect("parse");
        assert_eq!(event.kind(), EventKind::Meeting);
        assert_eq!(event.core().itinerary_id, "itin-1");
        assert!(event.location().is_some());
    }

    #[test]
    fn unknown_subtype_is_a_malformed_record() {
        let record = json!({
            "subtype": "cruise",
            "id": "evt-2",
            "start_time": 0,
            "end_time": 0
        });
        let map = record.as_object().expect("object").clone();
        assert!(Event::from_record(&map, "itin-1").is_err());
    }

    fn leg(start: i64, end: i64) -> StepLeg {
        StepLeg {
            start_time: TripTime(start),
            end_time: TripTime(end),
            departure_area: None,
            arrival_area: None,
            details: None,
        }
    }

    #[test]
    fn transit_metrics_derive_from_steps() {
        let transit = TransitEvent {
            core: EventCore {
                id: "t-1".into(),
                itinerary_id: String::new(),
                start_time: TripTime(0),
                end_time: TripTime(0),
                affected_by_weather: false,
            },
            option_name: "walk_rail_walk".into(),
            cost: None,
            cost_amount: 3.2,
            departure_street: None,
            walking_distance: 400.0,
            is_preferred: false,
            transit_steps: vec![
                TransitStep::Walk {
                    leg: leg(0, 300_000),
                    walk_time: None,
                },
                TransitStep::Rail {
                    leg: leg(480_000, 1_080_000),
                    transit_line: "U2".into(),
                    stops: 4,
                },
                TransitStep::Walk {
                    leg: leg(1_080_000, 1_380_000),
                    walk_time: None,
                },
            ],
        };
        assert_eq!(transit.num_transfers(), 2);
        assert_eq!(transit.waiting_time(), 180_000);
        assert_eq!(transit.total_duration(), 1_380_000);
    }
}
