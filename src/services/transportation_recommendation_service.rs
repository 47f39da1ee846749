//! Transportation Recommendation Engine
//!
//! Finds consecutive same-day events that are too far apart to walk between
//! and injects ranked transit options on the day of the first event of each
//! pair. Ranking runs through the multi-criteria tradeoff service over five
//! minimized objectives; when the service cannot run, the pre-seeded feed
//! order is kept.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use log::warn;

use crate::models::event::{Event, RecKind, TransitEvent};
use crate::models::itinerary::Itinerary;
use crate::models::recs::RecsBundle;
use crate::services::messages;
use crate::services::tradeoff_service::{Objective, TradeoffOption, TradeoffRanker};
use crate::services::PipelineError;

const PRICE: &str = "price";
const WAITING_TIME: &str = "waiting_time";
const NUM_TRANSFERS: &str = "num_transfers";
const TOTAL_DURATION: &str = "total_duration";
const WALKING_DISTANCE: &str = "walking_distance";

const DEFAULT_MAX_WALKING_DISTANCE_M: f64 = 2000.0;
const DEFAULT_SEEDED_OPTION: &str = "walk_rail_rail_walk";

#[derive(Debug, Clone)]
pub struct TransportationConfig {
    /// Consecutive events farther apart than this need transportation.
    pub max_walking_distance_m: f64,
    /// Option name moved to the front of the candidate list before ranking,
    /// so it leads the ranker's stable front tier. Demo seeding; set the
    /// env var to an empty string to disable.
    pub seeded_option: Option<String>,
}

impl Default for TransportationConfig {
    fn default() -> Self {
        Self {
            max_walking_distance_m: DEFAULT_MAX_WALKING_DISTANCE_M,
            seeded_option: Some(DEFAULT_SEEDED_OPTION.to_string()),
        }
    }
}

impl TransportationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let seeded_option = match env::var("SEEDED_TRANSIT_OPTION") {
            Ok(name) if name.is_empty() => None,
            Ok(name) => Some(name),
            Err(_) => defaults.seeded_option,
        };
        Self {
            max_walking_distance_m: env::var("MAX_WALKING_DISTANCE_M")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_walking_distance_m),
            seeded_option,
        }
    }
}

/// Two consecutive same-day events that are too far apart to walk between.
struct FarPair {
    first_event_id: String,
    from_name: Option<String>,
    to_name: Option<String>,
}

pub struct TransportationRecommendationService {
    ranker: Arc<dyn TradeoffRanker>,
    config: TransportationConfig,
}

impl TransportationRecommendationService {
    pub fn new(ranker: Arc<dyn TradeoffRanker>, config: TransportationConfig) -> Self {
        Self { ranker, config }
    }

    /// Inject ranked transit options for every far-apart pair of events.
    pub fn recommend(&self, itinerary: &Itinerary, recs: &RecsBundle, locale: &str) -> Itinerary {
        let mut updated = itinerary.clone();
        let pairs = self.far_pairs(&updated);
        if pairs.is_empty() {
            return updated;
        }
        let Some(pool) = recs.transit.as_ref() else {
            warn!("far-apart events found but no transit pool to draw from");
            return updated;
        };
        let options: Vec<TransitEvent> = pool
            .candidates
            .iter()
            .filter_map(|candidate| match candidate {
                Event::Transit(option) => Some(option.clone()),
                _ => None,
            })
            .collect();
        if options.is_empty() {
            return updated;
        }

        for pair in pairs {
            let seeded = seed_front(options.clone(), self.config.seeded_option.as_deref());
            let ranked = match self.rank(&seeded) {
                Ok(ranked) => ranked,
                Err(err) => {
                    warn!("tradeoff ranking unavailable, keeping seeded order: {err}");
                    seeded
                }
            };

            let mut rec_event = pool.clone();
            rec_event.core.itinerary_id = updated.id.clone();
            rec_event.candidates = ranked.into_iter().map(Event::Transit).collect();
            rec_event.from_location = pair.from_name.clone();
            rec_event.to_location = pair.to_name.clone();
            if rec_event.message.is_empty() {
                rec_event.message = messages::fallback_message(RecKind::Transit, locale).to_string();
            }

            // The recommendation lands on the day of the pair's first event.
            let mut pending = Some(Event::Recommendations(rec_event));
            for date in &mut updated.dates {
                if date.events.iter().any(|e| e.id() == pair.first_event_id) {
                    if let Some(rec) = pending.take() {
                        date.add_event(rec);
                    }
                    break;
                }
            }
        }

        updated.sort_all_events();
        updated
    }

    /// Replace the transit recommendation with its top option directly.
    pub fn choose(&self, itinerary: &Itinerary) -> Itinerary {
        let mut updated = itinerary.clone();

        let mut found: Option<(usize, String)> = None;
        for (day_index, date) in updated.dates.iter().enumerate() {
            for event in &date.events {
                if let Event::Recommendations(rec) = event {
                    if rec.rec_type == RecKind::Transit {
                        found = Some((day_index, rec.core.id.clone()));
                    }
                }
            }
        }
        let Some((day_index, rec_id)) = found else {
            warn!("no transit recommendation present; nothing to choose");
            return updated;
        };

        let Some(Event::Recommendations(rec)) = updated.dates[day_index].remove_event(&rec_id)
        else {
            return updated;
        };
        let Some(mut chosen) = rec.candidates.into_iter().next() else {
            warn!("transit recommendation had no candidates");
            return updated;
        };

        chosen.core_mut().itinerary_id = updated.id.clone();
        updated.dates[day_index].add_event(chosen);
        updated.sort_all_events();
        updated
    }

    fn far_pairs(&self, itinerary: &Itinerary) -> Vec<FarPair> {
        let mut pairs = Vec::new();
        for date in &itinerary.dates {
            for window in date.events.windows(2) {
                let (Some(from), Some(to)) = (window[0].location(), window[1].location()) else {
                    continue;
                };
                if from.distance_to(&to) > self.config.max_walking_distance_m {
                    pairs.push(FarPair {
                        first_event_id: window[0].id().to_string(),
                        from_name: event_name(&window[0]).map(str::to_string),
                        to_name: event_name(&window[1]).map(str::to_string),
                    });
                }
            }
        }
        pairs
    }

    fn rank(&self, options: &[TransitEvent]) -> Result<Vec<TransitEvent>, PipelineError> {
        let objectives = [
            Objective::minimize(PRICE),
            Objective::minimize(WAITING_TIME),
            Objective::minimize(NUM_TRANSFERS),
            Objective::minimize(TOTAL_DURATION),
            Objective::minimize(WALKING_DISTANCE),
        ];

        let mut by_key: HashMap<String, &TransitEvent> = HashMap::new();
        let specs: Vec<TradeoffOption> = options
            .iter()
            .enumerate()
            .map(|(index, option)| {
                let key = index.to_string();
                by_key.insert(key.clone(), option);
                TradeoffOption {
                    key,
                    values: [
                        (PRICE, option.cost_amount),
                        (WAITING_TIME, option.waiting_time() as f64),
                        (NUM_TRANSFERS, option.num_transfers() as f64),
                        (TOTAL_DURATION, option.total_duration() as f64),
                        (WALKING_DISTANCE, option.walking_distance),
                    ]
                    .into_iter()
                    .collect(),
                }
            })
            .collect();

        let solution = self.ranker.solve(&objectives, &specs)?;
        Ok(solution
            .ordered_keys()
            .iter()
            .filter_map(|key| by_key.get(key).map(|option| (*option).clone()))
            .collect())
    }
}

fn event_name(event: &Event) -> Option<&str> {
    match event {
        Event::Meeting(e) => Some(&e.name),
        Event::Restaurant(e) => Some(&e.name),
        _ => None,
    }
}

/// Move the configured option to the front, keeping order otherwise.
fn seed_front(options: Vec<TransitEvent>, seed: Option<&str>) -> Vec<TransitEvent> {
    let Some(seed) = seed else {
        return options;
    };
    let (mut seeded, rest): (Vec<_>, Vec<_>) = options
        .into_iter()
        .partition(|option| option.option_name == seed);
    seeded.extend(rest);
    seeded
}
