//! Hotel Recommendation Engine
//!
//! Detects trips with no lodging booked, recommends bookings for the trip's
//! span with discounts applied, and can then "choose" the top booking,
//! propagating check-in, stay, and check-out markers across the trip.

use std::sync::Arc;

use log::warn;
use uuid::Uuid;

use crate::models::event::{Event, EventKind, LodgingEvent, RecKind, StayMarker};
use crate::models::itinerary::Itinerary;
use crate::models::recs::RecsBundle;
use crate::models::trip_time::{TripTime, MILLIS_PER_DAY};
use crate::services::discount_service::DiscountEvaluator;
use crate::services::messages;

pub struct HotelRecommendationService {
    discounts: Arc<dyn DiscountEvaluator>,
}

impl HotelRecommendationService {
    pub fn new(discounts: Arc<dyn DiscountEvaluator>) -> Self {
        Self { discounts }
    }

    /// If the itinerary has no lodging, inject a recommendation event on the
    /// trip's first day carrying the tiered booking candidates. Itineraries
    /// that already have lodging come back as an unmodified copy.
    pub fn recommend(&self, itinerary: &Itinerary, recs: &RecsBundle, locale: &str) -> Itinerary {
        let mut updated = itinerary.clone();
        if booking_window(&updated).is_none() {
            return updated;
        }
        let Some(pool) = recs.lodging.as_ref() else {
            return updated;
        };

        let bookings: Vec<LodgingEvent> = pool
            .candidates
            .iter()
            .filter_map(|candidate| match candidate {
                Event::Lodging(booking) => Some(booking.clone()),
                _ => None,
            })
            .collect();
        if bookings.is_empty() {
            return updated;
        }

        let adjusted: Vec<LodgingEvent> = bookings
            .into_iter()
            .map(|booking| match self.discounts.evaluate(&booking) {
                Ok(adjusted) => adjusted,
                Err(err) => {
                    warn!("discount evaluation failed for {}: {err}", booking.name);
                    booking
                }
            })
            .collect();

        let mut rec_event = pool.clone();
        rec_event.core.itinerary_id = updated.id.clone();
        rec_event.candidates = tier_bookings(adjusted).into_iter().map(Event::Lodging).collect();
        if rec_event.message.is_empty() {
            rec_event.message = messages::fallback_message(RecKind::Lodging, locale).to_string();
        }

        if let Some(first_day) = updated.dates.first_mut() {
            first_day.add_event(Event::Recommendations(rec_event));
            first_day.sort_events();
        }
        updated
    }

    /// Take the top booking out of the lodging recommendation event and
    /// propagate it across the booking span.
    pub fn choose(&self, itinerary: &Itinerary) -> Itinerary {
        let mut updated = itinerary.clone();

        let mut found: Option<(usize, String)> = None;
        for (day_index, date) in updated.dates.iter().enumerate() {
            for event in &date.events {
                if let Event::Recommendations(rec) = event {
                    if rec.rec_type == RecKind::Lodging {
                        found = Some((day_index, rec.core.id.clone()));
                    }
                }
            }
        }
        let Some((day_index, rec_id)) = found else {
            warn!("no lodging recommendation present; nothing to choose");
            return updated;
        };

        let Some(Event::Recommendations(rec)) = updated.dates[day_index].remove_event(&rec_id)
        else {
            return updated;
        };
        let Some(Event::Lodging(chosen)) = rec.candidates.into_iter().next() else {
            warn!("lodging recommendation had no candidates");
            return updated;
        };

        let checkin = chosen.checkin;
        let checkout = chosen.checkout;
        for date in &mut updated.dates {
            let day = date.date;
            let day_end = day.shift(MILLIS_PER_DAY);
            let contains_checkin = day <= checkin && checkin < day_end;
            let contains_checkout = day <= checkout && checkout < day_end;

            if contains_checkin && !contains_checkout {
                date.add_event(stay_marker(&chosen, StayMarker::Checkin, checkin));
            } else if contains_checkout && checkin < day {
                date.add_event(stay_marker(&chosen, StayMarker::Checkout, checkout));
            } else if checkin < day && day_end <= checkout {
                // Pinned to the day's last millisecond so the stay always
                // sorts after that day's events.
                date.add_event(stay_marker(&chosen, StayMarker::Stay, day.end_of_day()));
            }
        }

        updated.sort_all_events();
        updated
    }
}

/// The span to book for, or None when the itinerary already has lodging.
fn booking_window(itinerary: &Itinerary) -> Option<(TripTime, TripTime)> {
    let has_lodging = itinerary
        .dates
        .iter()
        .flat_map(|date| date.events.iter())
        .any(|event| event.kind() == EventKind::Lodging);
    if has_lodging {
        None
    } else {
        Some((itinerary.start_time, itinerary.end_time))
    }
}

/// Order bookings into four tiers: loyalty+promotional, loyalty only,
/// promotional only, neither. Input order is preserved within each tier.
fn tier_bookings(bookings: Vec<LodgingEvent>) -> Vec<LodgingEvent> {
    let mut tiers: [Vec<LodgingEvent>; 4] = Default::default();
    for booking in bookings {
        let tier = match (booking.is_loyalty_member, booking.has_promotional_discount) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        };
        tiers[tier].push(booking);
    }
    tiers.into_iter().flatten().collect()
}

fn stay_marker(template: &LodgingEvent, marker: StayMarker, at: TripTime) -> Event {
    let mut event = template.clone();
    event.core.id = Uuid::new_v4().to_string();
    event.core.start_time = at;
    event.core.end_time = at;
    event.display_type = Some(marker);
    Event::Lodging(event)
}
