mod common;

use itinera_api::models::event::{Event, EventKind, RecKind, StayMarker};
use itinera_api::models::itinerary::{Itinerary, ItineraryBundle};
use itinera_api::models::trip_time::MILLIS_PER_DAY;

fn bundle() -> ItineraryBundle {
    common::cache().bundle(Some("en")).expect("bundle builds")
}

fn versions() -> Vec<Itinerary> {
    bundle()
        .remove("avery")
        .expect("avery has travel data")
        .itineraries
}

fn lodging_rec(itinerary: &Itinerary) -> Option<&itinera_api::models::event::RecommendationEvent> {
    itinerary
        .dates
        .iter()
        .flat_map(|d| d.events.iter())
        .find_map(|e| match e {
            Event::Recommendations(rec) if rec.rec_type == RecKind::Lodging => Some(rec),
            _ => None,
        })
}

#[test]
fn every_user_gets_five_stamped_versions() {
    let versions = versions();
    let stamps: Vec<u32> = versions.iter().map(|v| v.version).collect();
    assert_eq!(stamps, vec![1, 2, 3, 4, 5]);
}

#[test]
fn event_dates_form_a_contiguous_run_in_every_version() {
    for version in versions() {
        assert!(!version.dates.is_empty());
        for pair in version.dates.windows(2) {
            assert_eq!(
                pair[1].date.millis() - pair[0].date.millis(),
                MILLIS_PER_DAY,
                "gap or duplicate between days in version {}",
                version.version
            );
        }
    }
}

#[test]
fn events_are_sorted_by_start_time_in_every_version() {
    for version in versions() {
        for date in &version.dates {
            for pair in date.events.windows(2) {
                assert!(
                    pair[0].start_time() <= pair[1].start_time(),
                    "events out of order on day {} of version {}",
                    date.date.millis(),
                    version.version
                );
            }
        }
    }
}

#[test]
fn v1_recommends_hotels_on_the_first_day_best_tier_first() {
    let versions = versions();
    let v1 = &versions[0];

    let rec = lodging_rec(v1).expect("hotel recommendation present");
    let ids: Vec<&str> = rec.candidates.iter().map(|c| c.id()).collect();
    assert_eq!(
        ids,
        vec![
            "hotel-brandenburg",
            "hotel-lindenhof",
            "hotel-kastanie",
            "hotel-spreeblick"
        ]
    );

    // It sits on the trip's first day.
    assert!(v1.dates[0]
        .events
        .iter()
        .any(|e| e.kind() == EventKind::Recommendations));

    // Discounts were applied to the loyalty/promo candidates.
    if let Event::Lodging(top) = &rec.candidates[0] {
        assert!(top.price < 196.0);
        assert_eq!(top.original_price, 196.0);
        assert!(top.loyalty_discount.is_some());
    } else {
        panic!("top candidate is not a lodging event");
    }
}

#[test]
fn v2_chooses_the_hotel_and_propagates_markers() {
    let versions = versions();
    let v2 = &versions[1];

    assert!(lodging_rec(v2).is_none(), "recommendation must be consumed");

    let mut markers = Vec::new();
    for date in &v2.dates {
        for event in &date.events {
            if let Event::Lodging(booking) = event {
                assert_eq!(booking.name, "Grand Brandenburg");
                markers.push(booking.display_type.expect("marker set"));
            }
        }
    }
    // Five-day trip: one check-in, three stays, one check-out.
    assert_eq!(
        markers,
        vec![
            StayMarker::Checkin,
            StayMarker::Stay,
            StayMarker::Stay,
            StayMarker::Stay,
            StayMarker::Checkout,
        ]
    );
}

#[test]
fn v3_flags_the_rained_out_lunch_and_ranks_alternatives() {
    let versions = versions();
    let v3 = &versions[2];

    assert_eq!(v3.dates[2].condition.as_deref(), Some("Rain"));

    let lunch = v3.dates[2]
        .events
        .iter()
        .find(|e| e.id() == "evt-d2-lunch")
        .expect("outdoor lunch still present in v3");
    assert!(lunch.affected_by_weather());

    let replacements = lunch
        .recommended_replacements()
        .expect("alternatives embedded on the event");
    assert!(replacements.alert);
    assert_eq!(replacements.candidates.len(), 5);
    assert_eq!(replacements.candidates[0].id(), "rest-lume");

    // The rooftop dinner on day 3 is outdoor but dry, so untouched.
    let rooftop = v3.dates[3]
        .events
        .iter()
        .find(|e| e.id() == "evt-d3-dinner")
        .expect("rooftop dinner present");
    assert!(!rooftop.affected_by_weather());
}

#[test]
fn v4_swaps_the_lunch_and_recommends_transportation() {
    let versions = versions();
    let v4 = &versions[3];
    let day2 = &v4.dates[2];

    assert!(day2.events.iter().all(|e| e.id() != "evt-d2-lunch"));
    assert!(day2.events.iter().any(|e| e.id() == "rest-lume"));

    let rec = day2
        .events
        .iter()
        .find_map(|e| match e {
            Event::Recommendations(rec) if rec.rec_type == RecKind::Transit => Some(rec),
            _ => None,
        })
        .expect("transit recommendation on the replacement day");
    assert_eq!(rec.candidates.len(), 5);
    assert_eq!(rec.from_location.as_deref(), Some("Roadmap session"));
    assert_eq!(rec.to_location.as_deref(), Some("Trattoria Lume"));
    assert_eq!(rec.candidates[0].id(), "transit-rail");
}

#[test]
fn v5_chooses_the_seeded_transit_option() {
    let versions = versions();
    let v5 = &versions[4];

    let chosen = v5
        .dates
        .iter()
        .flat_map(|d| d.events.iter())
        .find_map(|e| match e {
            Event::Transit(t) => Some(t),
            _ => None,
        })
        .expect("a transit event was inserted");
    assert_eq!(chosen.option_name, "walk_rail_rail_walk");

    // Every pending decision has been resolved by the final version.
    for date in &v5.dates {
        for event in &date.events {
            assert_ne!(event.kind(), EventKind::Recommendations);
            assert!(event.recommended_replacements().is_none());
        }
    }
}

#[test]
fn delivered_times_are_resolved_against_today() {
    // The feed stores day offsets; a delivered bundle presents absolute
    // timestamps at or after today's midnight.
    let sep_2020_ms = 1_600_000_000_000;
    for version in versions() {
        assert!(version.start_time.millis() > sep_2020_ms);
        for date in &version.dates {
            assert!(date.date.millis() > sep_2020_ms);
            for event in &date.events {
                assert!(event.start_time().millis() > sep_2020_ms);
            }
        }
    }
}
