//! Weather-Alternative Recommendation Engine
//!
//! Flags outdoor events scheduled on rainy days and embeds a ranked list of
//! indoor alternatives directly on the affected event. Ranking compares the
//! traveler's personality profile against each alternative's; when the
//! analysis cannot run, the feed's own ordering is kept.
//!
//! `inject_bad_weather` exists for the guided demo flow: it forces a
//! configured day's condition to rain so the rest of the engine has
//! something to react to.

use std::env;
use std::sync::Arc;

use log::warn;

use crate::models::event::{Event, RecKind, RestaurantEvent};
use crate::models::itinerary::Itinerary;
use crate::models::recs::RecsBundle;
use crate::models::weather::RAIN_CONDITION;
use crate::services::messages;
use crate::services::personality_service::PersonalityAnalyzer;
use crate::services::PipelineError;

const DEFAULT_STORM_DAY_INDEX: usize = 2;

#[derive(Debug, Clone)]
pub struct WeatherAltConfig {
    /// Which trip day `inject_bad_weather` turns rainy.
    pub storm_day_index: usize,
}

impl Default for WeatherAltConfig {
    fn default() -> Self {
        Self {
            storm_day_index: DEFAULT_STORM_DAY_INDEX,
        }
    }
}

impl WeatherAltConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storm_day_index: env::var("STORM_DAY_INDEX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.storm_day_index),
        }
    }
}

pub struct WeatherRecommendationService {
    analyzer: Arc<dyn PersonalityAnalyzer>,
    config: WeatherAltConfig,
}

impl WeatherRecommendationService {
    pub fn new(analyzer: Arc<dyn PersonalityAnalyzer>, config: WeatherAltConfig) -> Self {
        Self { analyzer, config }
    }

    /// Force the configured day's condition to rain on a fresh copy.
    pub fn inject_bad_weather(&self, itinerary: &Itinerary) -> Itinerary {
        let mut updated = itinerary.clone();
        match updated.dates.get_mut(self.config.storm_day_index) {
            Some(date) => date.condition = Some(RAIN_CONDITION.to_string()),
            None => warn!(
                "storm day index {} is outside the trip span",
                self.config.storm_day_index
            ),
        }
        updated
    }

    /// Mark outdoor events on rainy days as weather-affected and embed
    /// ranked indoor alternatives on each of them.
    pub fn recommend_alternatives(
        &self,
        itinerary: &Itinerary,
        recs: &RecsBundle,
        locale: &str,
    ) -> Itinerary {
        let mut updated = itinerary.clone();

        let mut affected_ids = Vec::new();
        for date in &mut updated.dates {
            if date.condition.as_deref() != Some(RAIN_CONDITION) {
                continue;
            }
            for event in &mut date.events {
                if event.is_outdoor() {
                    event.set_affected_by_weather(true);
                    affected_ids.push(event.id().to_string());
                }
            }
        }
        if affected_ids.is_empty() {
            return updated;
        }

        let Some(pool) = recs.restaurant.as_ref() else {
            warn!("weather-affected events found but no alternative pool to draw from");
            return updated;
        };
        let alternatives: Vec<RestaurantEvent> = pool
            .candidates
            .iter()
            .filter_map(|candidate| match candidate {
                Event::Restaurant(alternative) => Some(alternative.clone()),
                _ => None,
            })
            .collect();
        if alternatives.is_empty() {
            return updated;
        }

        for affected_id in affected_ids {
            let ranked = match self.rank(recs.profile_text.as_deref(), &alternatives) {
                Ok(ranked) => ranked,
                Err(err) => {
                    warn!("personality ranking unavailable, keeping feed order: {err}");
                    alternatives.clone()
                }
            };

            let mut rec_event = pool.clone();
            rec_event.core.itinerary_id = updated.id.clone();
            rec_event.candidates = ranked.into_iter().map(Event::Restaurant).collect();
            rec_event.alert = true;
            rec_event.associated_event_id = Some(affected_id.clone());
            if rec_event.message.is_empty() {
                rec_event.message =
                    messages::fallback_message(RecKind::Restaurant, locale).to_string();
            }

            let mut pending = Some(rec_event);
            for date in &mut updated.dates {
                if let Some(event) = date.events.iter_mut().find(|e| e.id() == affected_id) {
                    if let Some(rec) = pending.take() {
                        event.set_recommended_replacements(rec);
                    }
                    break;
                }
            }
        }
        updated
    }

    /// Swap the event carrying embedded replacements for its top-ranked
    /// alternative, in place on the same day.
    pub fn choose(&self, itinerary: &Itinerary) -> Itinerary {
        let mut updated = itinerary.clone();

        let mut found: Option<(usize, String)> = None;
        for (day_index, date) in updated.dates.iter().enumerate() {
            for event in &date.events {
                if event.recommended_replacements().is_some() {
                    found = Some((day_index, event.id().to_string()));
                }
            }
        }
        let Some((day_index, event_id)) = found else {
            warn!("no weather-affected event with replacements; nothing to choose");
            return updated;
        };

        let Some(removed) = updated.dates[day_index].remove_event(&event_id) else {
            return updated;
        };
        let top = removed
            .recommended_replacements()
            .and_then(|replacements| replacements.candidates.first().cloned());
        let Some(mut replacement) = top else {
            warn!("replacement list was empty; keeping the original event");
            updated.dates[day_index].add_event(removed);
            updated.dates[day_index].sort_events();
            return updated;
        };

        replacement.core_mut().itinerary_id = updated.id.clone();
        updated.dates[day_index].add_event(replacement);
        updated.sort_all_events();
        updated
    }

    fn rank(
        &self,
        profile_text: Option<&str>,
        alternatives: &[RestaurantEvent],
    ) -> Result<Vec<RestaurantEvent>, PipelineError> {
        let text = profile_text.ok_or_else(|| {
            PipelineError::Analysis("no traveler profile text available".to_string())
        })?;
        let reference = self.analyzer.analyze(text)?;

        let mut scored = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let candidate_text = alternative
                .description
                .as_deref()
                .unwrap_or(&alternative.name);
            let profile = self.analyzer.analyze(candidate_text)?;
            scored.push((reference.distance(&profile), alternative.clone()));
        }
        // Ascending distance; sort_by is stable so ties keep feed order.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(scored.into_iter().map(|(_, alt)| alt).collect())
    }
}
