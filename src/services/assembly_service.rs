use std::collections::HashMap;

use log::warn;

use crate::db::store::{record_str, RawRecord, ITINERARY_TYPE, PROFILE_TYPE, SUBTYPE_KEY, TYPE_KEY};
use crate::models::event::{Event, RecKind};
use crate::models::itinerary::Itinerary;
use crate::models::recs::RecsBundle;
use crate::services::PipelineError;

/// Join the flat, store-ordered record list into itineraries. The store
/// guarantees each itinerary header precedes its own event records; a
/// violation aborts the build.
pub fn assemble_itineraries(records: &[RawRecord]) -> Result<Vec<Itinerary>, PipelineError> {
    let mut itineraries: Vec<Itinerary> = Vec::new();

    for record in records {
        match record_str(record, TYPE_KEY) {
            Some(ITINERARY_TYPE) => {
                itineraries.push(Itinerary::from_record(record)?);
            }
            _ => {
                let current = itineraries
                    .last_mut()
                    .ok_or(PipelineError::EventBeforeHeader)?;
                let itinerary_id = current.id.clone();
                let event = Event::from_record(record, &itinerary_id)?;
                let day = event.start_time().start_of_day();
                current.date_for(day).add_event(event);
            }
        }
    }

    // Events arrive in no particular order within a day; dates are already
    // chronological from bucket insertion.
    for itinerary in &mut itineraries {
        itinerary.sort_all_events();
    }
    itineraries.sort_by_key(|i| (i.start_time, i.version));

    Ok(itineraries)
}

/// Parse the recommendation view into per-user candidate pools. Pool header
/// records (subtype `recommendations`) precede their candidates; traveler
/// profile records may appear anywhere.
pub fn format_recs(records: &[RawRecord]) -> Result<HashMap<String, RecsBundle>, PipelineError> {
    let mut bundles: HashMap<String, RecsBundle> = HashMap::new();
    let mut current_user: Option<String> = None;

    for record in records {
        if record_str(record, TYPE_KEY) == Some(PROFILE_TYPE) {
            let user = required_str(record, "user", "profile")?;
            let text = required_str(record, "text", "profile")?;
            bundles
                .entry(user.to_string())
                .or_insert_with(|| RecsBundle::new(user))
                .profile_text = Some(text.to_string());
            continue;
        }

        if record_str(record, SUBTYPE_KEY) == Some("recommendations") {
            let user = required_str(record, "user", "recommendations")?.to_string();
            let event = Event::from_record(record, "")?;
            let bundle = bundles
                .entry(user.clone())
                .or_insert_with(|| RecsBundle::new(&user));
            if let Event::Recommendations(pool) = event {
                match pool.rec_type {
                    RecKind::Lodging => bundle.lodging = Some(pool),
                    RecKind::Restaurant => bundle.restaurant = Some(pool),
                    RecKind::Transit => bundle.transit = Some(pool),
                }
            }
            current_user = Some(user);
            continue;
        }

        // A candidate for the most recently opened pool set.
        let user = current_user
            .as_ref()
            .ok_or(PipelineError::CandidateBeforePool)?;
        let event = Event::from_record(record, "")?;
        let bundle = bundles
            .get_mut(user)
            .ok_or(PipelineError::CandidateBeforePool)?;
        if !bundle.add_candidate(event) {
            warn!(
                "dropping candidate record with no matching pool for user {}",
                user
            );
        }
    }

    Ok(bundles)
}

fn required_str<'a>(
    record: &'a RawRecord,
    key: &str,
    kind: &'static str,
) -> Result<&'a str, PipelineError> {
    record_str(record, key).ok_or_else(|| PipelineError::MalformedRecord {
        kind,
        detail: format!("missing `{key}` field"),
    })
}
