use thiserror::Error;

use crate::db::store::StoreError;

pub mod assembly_service;
pub mod discount_service;
pub mod hotel_recommendation_service;
pub mod itinerary_cache;
pub mod messages;
pub mod personality_service;
#[cfg(test)]
pub mod test_support;
pub mod tradeoff_service;
pub mod transportation_recommendation_service;
pub mod versioning_service;
pub mod weather_recommendation_service;
pub mod weather_service;

/// Errors that abort an itinerary build. Per-candidate service failures are
/// not represented here; they are logged where they happen and the pipeline
/// degrades to its documented fallback ordering.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("event record arrived before any itinerary header")]
    EventBeforeHeader,
    #[error("candidate record arrived before any recommendation pool header")]
    CandidateBeforePool,
    #[error("malformed {kind} record: {detail}")]
    MalformedRecord { kind: &'static str, detail: String },
    #[error("the feed contained no itineraries")]
    EmptyFeed,
    #[error("discount service: {0}")]
    Discount(String),
    #[error("personality analysis: {0}")]
    Analysis(String),
    #[error("tradeoff ranking: {0}")]
    Ranking(String),
    #[error("itinerary rebuild failed: {0}")]
    Rebuild(String),
}
