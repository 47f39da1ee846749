use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use itinera_api::db::store::JsonFeedStore;
use itinera_api::routes;
use itinera_api::services::discount_service::{
    DiscountEvaluator, HttpDiscountService, StandardRateRules,
};
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

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const FEED_PATH: &str = "data/sample_feed.json";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let feed_path = env::var("FEED_PATH").unwrap_or_else(|_| FEED_PATH.to_string());
    println!("Loading travel feed from {}", feed_path);
    let store = JsonFeedStore::from_file(&feed_path)
        .unwrap_or_else(|err| panic!("Failed to load travel feed {}: {}", feed_path, err));

    let discounts: Arc<dyn DiscountEvaluator> = match HttpDiscountService::from_env() {
        Some(service) => {
            println!("Discount service configured from environment");
            Arc::new(service)
        }
        None => {
            println!("No discount service configured, using standard rate rules");
            Arc::new(StandardRateRules)
        }
    };

    let pipeline = RecommendationPipeline::new(
        HotelRecommendationService::new(discounts),
        WeatherRecommendationService::new(Arc::new(LexiconAnalyzer), WeatherAltConfig::from_env()),
        TransportationRecommendationService::new(
            Arc::new(ParetoRanker),
            TransportationConfig::from_env(),
        ),
    );
    let cache = Arc::new(ItineraryCache::new(Arc::new(store), pipeline));

    println!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(web::Data::new(cache.clone()))
            .service(
                web::scope("/api").service(
                    web::scope("/itineraries")
                        .route("", web::get().to(routes::itinerary::get_bundle))
                        .route("/refresh", web::get().to(routes::itinerary::refresh)),
                ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
