pub mod event;
pub mod event_date;
pub mod itinerary;
pub mod location;
pub mod recs;
pub mod trip_time;
pub mod weather;
