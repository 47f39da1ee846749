use serde_json::Value;

use crate::db::store::RawRecord;
use crate::models::itinerary::Itinerary;
use crate::models::trip_time::MILLIS_PER_DAY;
use crate::models::weather::{UnitSystem, WeatherSample};
use crate::services::PipelineError;

/// Parse the weather view into a date-sorted sample list.
pub fn format_weather(records: &[RawRecord]) -> Result<Vec<WeatherSample>, PipelineError> {
    let mut samples = Vec::with_capacity(records.len());
    for record in records {
        let sample: WeatherSample = serde_json::from_value(Value::Object(record.clone()))
            .map_err(|err| PipelineError::MalformedRecord {
                kind: "weather",
                detail: err.to_string(),
            })?;
        samples.push(sample);
    }
    samples.sort_by_key(|s| s.date);
    Ok(samples)
}

/// Inject the daily high/low and the dominant condition into every event
/// date. Days with no samples keep their temperatures and condition unset.
pub fn enrich_itineraries(
    itineraries: &mut [Itinerary],
    samples: &[WeatherSample],
    units: UnitSystem,
) {
    for itinerary in itineraries {
        for date in &mut itinerary.dates {
            let day_start = date.date.millis();
            let day_end = day_start + MILLIS_PER_DAY;

            let mut low = i64::MAX;
            let mut high = i64::MIN;
            // BTreeMap iterates conditions in lexical order, which makes the
            // dominant-condition tie-break deterministic: equal counts go to
            // the lexically smallest name.
            let mut totals = std::collections::BTreeMap::<&str, u32>::new();

            for sample in samples {
                let at = sample.date.millis();
                if at >= day_start && at < day_end {
                    let temp = sample.temperature(units);
                    low = low.min(temp);
                    high = high.max(temp);
                    *totals.entry(sample.condition.as_str()).or_insert(0) += 1;
                }
            }

            if low <= high {
                date.set_temperatures(Some(high), Some(low));
            } else {
                date.set_temperatures(None, None);
            }

            let mut dominant: Option<(&str, u32)> = None;
            for (condition, count) in totals {
                if dominant.map(|(_, c)| count > c).unwrap_or(true) {
                    dominant = Some((condition, count));
                }
            }
            date.condition = dominant.map(|(condition, _)| condition.to_string());
        }
    }
}
