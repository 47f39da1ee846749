//! Builders shared by the engine unit tests.

use serde_json::json;

use crate::models::event::{
    Event, EventCore, LodgingEvent, MeetingEvent, RecKind, RecommendationEvent, RestaurantEvent,
    StepLeg, TransitEvent, TransitStep,
};
use crate::models::itinerary::Itinerary;
use crate::models::location::{GeoPoint, Geometry};
use crate::models::trip_time::{TripTime, MILLIS_PER_DAY};

pub fn core(id: &str, start: i64, end: i64) -> EventCore {
    EventCore {
        id: id.to_string(),
        itinerary_id: String::new(),
        start_time: TripTime(start),
        end_time: TripTime(end),
        affected_by_weather: false,
    }
}

/// A bare itinerary spanning `days` calendar days, starting 09:00 day 0 and
/// ending 18:00 on the last day.
pub fn itinerary(days: i64) -> Itinerary {
    let start = 9 * 3_600_000;
    let end = (days - 1) * MILLIS_PER_DAY + 18 * 3_600_000;
    let record = json!({
        "type": "itinerary",
        "id": "itin-test",
        "title": "Test trip",
        "user": "sam",
        "version": 0,
        "start_time": start,
        "end_time": end,
        "initial_location": { "city": "Berlin", "country": "Germany" }
    })
    .as_object()
    .expect("object")
    .clone();
    Itinerary::from_record(&record).expect("itinerary fixture parses")
}

pub fn lodging(id: &str, name: &str, loyalty: bool, promo: bool) -> LodgingEvent {
    LodgingEvent {
        core: core(id, 15 * 3_600_000, 15 * 3_600_000),
        name: name.to_string(),
        room: None,
        confirmation: None,
        geometry: None,
        checkin: TripTime(15 * 3_600_000),
        checkout: TripTime(4 * MILLIS_PER_DAY + 11 * 3_600_000),
        price: 180.0,
        original_price: 0.0,
        is_preferred: false,
        has_promotional_discount: promo,
        is_loyalty_member: loyalty,
        promotional_discount: None,
        loyalty_discount: None,
        loyalty_program_name: None,
        loyalty_points: None,
        rating: None,
        description: None,
        vicinity: None,
        review_highlight: None,
        reviewer: None,
        image_url: None,
        display_type: None,
    }
}

pub fn meeting(id: &str, start: i64, lat: f64, lng: f64) -> Event {
    Event::Meeting(MeetingEvent {
        core: core(id, start, start + 3_600_000),
        name: format!("Meeting {id}"),
        geometry: Geometry {
            location: GeoPoint::new(lat, lng),
        },
        vicinity: None,
        is_outdoor: false,
        image_url: None,
        recommended_replacements: None,
    })
}

pub fn restaurant(
    id: &str,
    name: &str,
    start: i64,
    lat: f64,
    lng: f64,
    outdoor: bool,
    description: &str,
) -> Event {
    Event::Restaurant(RestaurantEvent {
        core: core(id, start, start + 5_400_000),
        name: name.to_string(),
        geometry: Geometry {
            location: GeoPoint::new(lat, lng),
        },
        cuisine: None,
        price_level: None,
        rating: None,
        vicinity: None,
        is_outdoor: outdoor,
        description: Some(description.to_string()),
        review_highlight: None,
        reviewer: None,
        image_url: None,
        recommended_replacements: None,
    })
}

pub fn transit(
    id: &str,
    option_name: &str,
    cost: f64,
    legs: &[(i64, i64)],
    walking_distance: f64,
) -> TransitEvent {
    let transit_steps = legs
        .iter()
        .map(|(start, end)| TransitStep::Walk {
            leg: StepLeg {
                start_time: TripTime(*start),
                end_time: TripTime(*end),
                departure_area: None,
                arrival_area: None,
                details: None,
            },
            walk_time: None,
        })
        .collect();
    TransitEvent {
        core: core(id, legs.first().map(|l| l.0).unwrap_or(0), 0),
        option_name: option_name.to_string(),
        cost: None,
        cost_amount: cost,
        departure_street: None,
        walking_distance,
        is_preferred: false,
        transit_steps,
    }
}

pub fn pool(id: &str, rec_type: RecKind, candidates: Vec<Event>) -> RecommendationEvent {
    RecommendationEvent {
        core: core(id, 22 * 3_600_000, 22 * 3_600_000),
        rec_type,
        message: String::new(),
        alert: false,
        candidates,
        from_location: None,
        to_location: None,
        lodging_location: None,
        associated_event_id: None,
    }
}
