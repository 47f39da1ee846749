use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde::Deserialize;

use crate::services::itinerary_cache::ItineraryCache;

#[derive(Debug, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

/*
    /api/itineraries?locale=
*/
pub async fn get_bundle(
    query: web::Query<LocaleQuery>,
    data: web::Data<Arc<ItineraryCache>>,
) -> impl Responder {
    let cache = data.into_inner();
    let locale = query.into_inner().locale;

    // The first call builds the whole bundle and may sit on slow external
    // services, so it runs on a blocking worker.
    let result = web::block(move || cache.bundle(locale.as_deref())).await;

    match result {
        Ok(Ok(bundle)) => HttpResponse::Ok().json(bundle),
        Ok(Err(err)) => {
            error!("Failed to build itinerary bundle: {err}");
            HttpResponse::InternalServerError().body("Failed to build itineraries")
        }
        Err(err) => {
            error!("Itinerary build worker failed: {err:?}");
            HttpResponse::InternalServerError().body("Failed to build itineraries")
        }
    }
}

/*
    /api/itineraries/refresh?locale=
*/
pub async fn refresh(
    query: web::Query<LocaleQuery>,
    data: web::Data<Arc<ItineraryCache>>,
) -> impl Responder {
    let cache = data.into_inner();
    let locale = query.into_inner().locale;

    let result = web::block(move || cache.force_refresh(locale.as_deref())).await;

    match result {
        Ok(Ok(bundle)) => HttpResponse::Ok().json(bundle),
        Ok(Err(err)) => {
            error!("Failed to refresh itinerary bundle: {err}");
            HttpResponse::InternalServerError().body("Failed to refresh itineraries")
        }
        Err(err) => {
            error!("Itinerary refresh worker failed: {err:?}");
            HttpResponse::InternalServerError().body("Failed to refresh itineraries")
        }
    }
}
