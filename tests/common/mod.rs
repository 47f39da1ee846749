#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;

use itinera_api::db::store::{DocumentStore, JsonFeedStore, RawRecord, StoreError};
use itinera_api::services::discount_service::StandardRateRules;
use itinera_api::services::hotel_recommendation_service::HotelRecommendationService;
use itinera_api::services::itinerary_cache::ItineraryCache;
use itinera_api::services::personality_service::LexiconAnalyzer;
use itinera_api::services::tradeoff_service::ParetoRanker;
use itinera_api::services::transportation_recommendation_service::{
    TransportationConfig, TransportationRecommendationService,
};
use itinera_api::services::versioning_service::RecommendationPipeline;
use itinera_api::services::weather_recommendation_service::{
    WeatherAltConfig, WeatherRecommendationService,
};

pub const FEED: &str = include_str!("../../data/sample_feed.json");

pub fn feed_store() -> JsonFeedStore {
    JsonFeedStore::from_json_str(FEED).expect("sample feed parses")
}

pub fn pipeline() -> RecommendationPipeline {
    RecommendationPipeline::new(
        HotelRecommendationService::new(Arc::new(StandardRateRules)),
        WeatherRecommendationService::new(Arc::new(LexiconAnalyzer), WeatherAltConfig::default()),
        TransportationRecommendationService::new(
            Arc::new(ParetoRanker),
            TransportationConfig::default(),
        ),
    )
}

pub fn cache() -> ItineraryCache {
    ItineraryCache::new(Arc::new(feed_store()), pipeline())
}

pub fn cache_with(store: Arc<dyn DocumentStore>) -> ItineraryCache {
    ItineraryCache::new(store, pipeline())
}

/// Counts every view query so tests can assert how often the store is hit.
pub struct CountingStore {
    inner: JsonFeedStore,
    pub queries: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: feed_store(),
            queries: AtomicUsize::new(0),
        }
    }
}

impl DocumentStore for CountingStore {
    fn query(
        &self,
        view: &str,
        low_key: &Value,
        high_key: &Value,
    ) -> Result<Vec<RawRecord>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(view, low_key, high_key)
    }
}

/// Fails the first query, then behaves normally, for build-retry tests.
pub struct FlakyStore {
    inner: JsonFeedStore,
    fail_next: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: feed_store(),
            fail_next: AtomicBool::new(true),
        }
    }
}

impl DocumentStore for FlakyStore {
    fn query(
        &self,
        view: &str,
        low_key: &Value,
        high_key: &Value,
    ) -> Result<Vec<RawRecord>, StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: "feed".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "store unreachable"),
            });
        }
        self.inner.query(view, low_key, high_key)
    }
}
