use crate::models::itinerary::Itinerary;
use crate::models::recs::RecsBundle;
use crate::services::hotel_recommendation_service::HotelRecommendationService;
use crate::services::transportation_recommendation_service::TransportationRecommendationService;
use crate::services::weather_recommendation_service::WeatherRecommendationService;

/// Sequences the three engines into the five itinerary versions that tell
/// the trip's story:
///
/// 1. hotel recommended
/// 2. hotel chosen
/// 3. bad weather hits, alternatives recommended
/// 4. alternative chosen, transportation recommended
/// 5. transportation chosen
///
/// Every step works on its own deep copy, so the versions share nothing.
pub struct RecommendationPipeline {
    hotels: HotelRecommendationService,
    weather: WeatherRecommendationService,
    transportation: TransportationRecommendationService,
}

impl RecommendationPipeline {
    pub fn new(
        hotels: HotelRecommendationService,
        weather: WeatherRecommendationService,
        transportation: TransportationRecommendationService,
    ) -> Self {
        Self {
            hotels,
            weather,
            transportation,
        }
    }

    pub fn run(&self, base: &Itinerary, recs: &RecsBundle, locale: &str) -> Vec<Itinerary> {
        let mut v1 = self.hotels.recommend(base, recs, locale);
        v1.version = 1;

        let mut v2 = self.hotels.choose(&v1);
        v2.version = 2;

        let stormy = self.weather.inject_bad_weather(&v2);
        let mut v3 = self.weather.recommend_alternatives(&stormy, recs, locale);
        v3.version = 3;

        let chosen = self.weather.choose(&v3);
        let mut v4 = self.transportation.recommend(&chosen, recs, locale);
        v4.version = 4;

        let mut v5 = self.transportation.choose(&v4);
        v5.version = 5;

        vec![v1, v2, v3, v4, v5]
    }
}
