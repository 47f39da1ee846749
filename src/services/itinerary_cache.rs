//! Itinerary Cache
//!
//! The whole recommendation pipeline runs lazily, once per locale, behind a
//! single-flight guard. A slot moves Empty -> Building -> Ready; concurrent
//! callers that arrive during Building block until the one builder publishes
//! and then share its result. A failed build reverts the slot to Empty,
//! hands the error to every blocked caller, and the next fresh call retries
//! from scratch.
//!
//! Reads never alias cache state: every caller gets a deep copy with the
//! trip's relative offsets resolved against the current day, so "starting
//! tomorrow" stays true no matter when the cache was populated.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Instant;

use log::{error, info};
use serde_json::json;

use crate::db::store::{DocumentStore, ITINERARY_VIEW, RECS_VIEW, WEATHER_VIEW};
use crate::models::itinerary::{ItineraryBundle, TravelData};
use crate::models::recs::RecsBundle;
use crate::models::trip_time::today_baseline;
use crate::models::weather::UnitSystem;
use crate::services::assembly_service::{assemble_itineraries, format_recs};
use crate::services::messages::normalize_locale;
use crate::services::versioning_service::RecommendationPipeline;
use crate::services::weather_service::{enrich_itineraries, format_weather};
use crate::services::PipelineError;

enum SlotState {
    Empty,
    Building,
    Ready(ItineraryBundle),
}

struct Slot {
    state: SlotState,
    last_error: Option<String>,
}

impl Slot {
    fn new() -> Self {
        Self {
            state: SlotState::Empty,
            last_error: None,
        }
    }
}

pub struct ItineraryCache {
    store: Arc<dyn DocumentStore>,
    pipeline: RecommendationPipeline,
    units: UnitSystem,
    slots: Mutex<HashMap<String, Slot>>,
    built: Condvar,
}

impl ItineraryCache {
    pub fn new(store: Arc<dyn DocumentStore>, pipeline: RecommendationPipeline) -> Self {
        Self {
            store,
            pipeline,
            units: UnitSystem::Metric,
            slots: Mutex::new(HashMap::new()),
            built: Condvar::new(),
        }
    }

    /// The per-user bundle for the requested locale, building it on first
    /// use. Unsupported locales silently serve the default.
    pub fn bundle(&self, locale: Option<&str>) -> Result<ItineraryBundle, PipelineError> {
        enum Step {
            Deliver(ItineraryBundle),
            Build,
            Wait,
        }

        let locale = normalize_locale(locale);
        let mut slots = self.lock_slots();

        loop {
            let step = {
                let slot = slots.entry(locale.to_string()).or_insert_with(Slot::new);
                match &slot.state {
                    SlotState::Ready(bundle) => Step::Deliver(deliver(bundle)),
                    SlotState::Empty => Step::Build,
                    SlotState::Building => Step::Wait,
                }
            };
            match step {
                Step::Deliver(copy) => return Ok(copy),
                Step::Build => break,
                Step::Wait => {
                    slots = self
                        .built
                        .wait(slots)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    // If the build we waited on failed, its error is ours.
                    // Ready and still-Building states loop back around.
                    if let Some(slot) = slots.get(locale) {
                        if let (SlotState::Empty, Some(message)) = (&slot.state, &slot.last_error) {
                            return Err(PipelineError::Rebuild(message.clone()));
                        }
                    }
                }
            }
        }

        // This caller becomes the one builder for the slot.
        if let Some(slot) = slots.get_mut(locale) {
            slot.state = SlotState::Building;
            slot.last_error = None;
        }
        drop(slots);

        let result = self.build_bundle(locale);

        let mut slots = self.lock_slots();
        let slot = slots.entry(locale.to_string()).or_insert_with(Slot::new);
        let outcome = match result {
            Ok(bundle) => {
                let copy = deliver(&bundle);
                slot.state = SlotState::Ready(bundle);
                Ok(copy)
            }
            Err(err) => {
                error!("itinerary build for locale {locale} failed: {err}");
                slot.state = SlotState::Empty;
                slot.last_error = Some(err.to_string());
                Err(err)
            }
        };
        drop(slots);
        self.built.notify_all();
        outcome
    }

    /// Invalidate every slot, then synchronously rebuild the requested
    /// locale before returning.
    pub fn force_refresh(&self, locale: Option<&str>) -> Result<ItineraryBundle, PipelineError> {
        {
            let mut slots = self.lock_slots();
            // Let in-flight builds publish first so invalidation is a clean
            // Empty -> Building -> Ready cycle, never a torn one.
            while slots
                .values()
                .any(|slot| matches!(slot.state, SlotState::Building))
            {
                slots = self
                    .built
                    .wait(slots)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
            for slot in slots.values_mut() {
                slot.state = SlotState::Empty;
                slot.last_error = None;
            }
        }
        self.bundle(locale)
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run the whole pipeline: store reads, assembly, weather enrichment,
    /// recommendation pools, then the five versions per user.
    fn build_bundle(&self, locale: &str) -> Result<ItineraryBundle, PipelineError> {
        let started = Instant::now();
        info!("building itinerary bundle for locale {locale}");

        let records = self.store.query(
            ITINERARY_VIEW,
            &json!([locale, 0]),
            &json!([locale, u32::MAX]),
        )?;
        let mut itineraries = assemble_itineraries(&records)?;
        if itineraries.is_empty() {
            return Err(PipelineError::EmptyFeed);
        }

        let city = itineraries[0].initial_location.city.clone();
        let country = itineraries[0].initial_location.country.clone();
        let weather_records = self.store.query(
            WEATHER_VIEW,
            &json!([city, country, locale]),
            &json!([city, country, locale]),
        )?;
        let samples = format_weather(&weather_records)?;
        enrich_itineraries(&mut itineraries, &samples, self.units);

        let rec_records =
            self.store
                .query(RECS_VIEW, &json!([locale, 0]), &json!([locale, u32::MAX]))?;
        let catalogs = format_recs(&rec_records)?;

        let mut bundle = ItineraryBundle::new();
        for base in &itineraries {
            if bundle.contains_key(&base.user) {
                // Itineraries are (start, version) sorted; only the first
                // per user seeds the version sequence.
                continue;
            }
            let fallback = RecsBundle::new(&base.user);
            let recs = catalogs.get(&base.user).unwrap_or(&fallback);
            let versions = self.pipeline.run(base, recs, locale);
            bundle.insert(
                base.user.clone(),
                TravelData {
                    itineraries: versions,
                },
            );
        }

        info!(
            "itinerary bundle for locale {locale} built in {:?}",
            started.elapsed()
        );
        Ok(bundle)
    }
}

/// Deep copy with offsets resolved against today's midnight.
fn deliver(bundle: &ItineraryBundle) -> ItineraryBundle {
    let baseline = today_baseline();
    let mut copy = bundle.clone();
    for data in copy.values_mut() {
        data.resolve_times(baseline);
    }
    copy
}
