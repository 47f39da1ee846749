//! Discount Evaluation Service
//!
//! Lodging candidates pass through a discount evaluator before they are
//! ranked and shown to the user. Two implementations are provided:
//!
//! - `HttpDiscountService` posts the booking to an external rules engine
//!   (set `DISCOUNT_SERVICE_URL`, optionally `DISCOUNT_SERVICE_USERNAME` and
//!   `DISCOUNT_SERVICE_PASSWORD`).
//! - `StandardRateRules` applies a fixed loyalty/promotional schedule, used
//!   when no external service is configured.
//!
//! Evaluation failures are never fatal: callers keep the undiscounted
//! candidate and log a warning.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::event::{Discount, LodgingEvent};
use crate::services::PipelineError;

const PROMOTIONAL_RATE: f32 = 0.10;
const LOYALTY_RATE: f32 = 0.15;
const HTTP_TIMEOUT_SECS: u64 = 10;

pub trait DiscountEvaluator: Send + Sync {
    /// Return the booking with any applicable discounts applied. Errors
    /// leave the original booking in play.
    fn evaluate(&self, booking: &LodgingEvent) -> Result<LodgingEvent, PipelineError>;
}

#[derive(Serialize, Deserialize)]
struct BookingEnvelope {
    lodging_event: LodgingEvent,
}

/// Calls the external rules engine over HTTP, in the same envelope shape the
/// engine returns.
pub struct HttpDiscountService {
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpDiscountService {
    /// Build the service if `DISCOUNT_SERVICE_URL` is configured.
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var("DISCOUNT_SERVICE_URL").ok()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .ok()?;
        Some(Self {
            endpoint,
            username: env::var("DISCOUNT_SERVICE_USERNAME").ok(),
            password: env::var("DISCOUNT_SERVICE_PASSWORD").ok(),
            client,
        })
    }
}

impl DiscountEvaluator for HttpDiscountService {
    fn evaluate(&self, booking: &LodgingEvent) -> Result<LodgingEvent, PipelineError> {
        let envelope = BookingEnvelope {
            lodging_event: booking.clone(),
        };

        let mut request = self.client.post(&self.endpoint).json(&envelope);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|err| PipelineError::Discount(err.to_string()))?;

        let adjusted: BookingEnvelope = response
            .json()
            .map_err(|err| PipelineError::Discount(err.to_string()))?;
        Ok(adjusted.lodging_event)
    }
}

/// Deterministic local rules: promotional bookings get a flat percentage
/// off, loyalty members a further one on the running price.
pub struct StandardRateRules;

impl DiscountEvaluator for StandardRateRules {
    fn evaluate(&self, booking: &LodgingEvent) -> Result<LodgingEvent, PipelineError> {
        let mut adjusted = booking.clone();
        adjusted.original_price = booking.price;

        if adjusted.has_promotional_discount {
            let previous = adjusted.price;
            adjusted.price = previous * (1.0 - PROMOTIONAL_RATE);
            adjusted.promotional_discount = Some(Discount {
                message: "Promotional rate applied".to_string(),
                previous_price: previous,
                discounted_price: adjusted.price,
            });
        }

        if adjusted.is_loyalty_member {
            let previous = adjusted.price;
            adjusted.price = previous * (1.0 - LOYALTY_RATE);
            adjusted.loyalty_discount = Some(Discount {
                message: "Loyalty member rate applied".to_string(),
                previous_price: previous,
                discounted_price: adjusted.price,
            });
        }

        Ok(adjusted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventCore;
    use crate::models::trip_time::TripTime;

    fn booking(loyalty: bool, promo: bool) -> LodgingEvent {
        LodgingEvent {
            core: EventCore {
                id: "b-1".into(),
                itinerary_id: String::new(),
                start_time: TripTime(0),
                end_time: TripTime(0),
                affected_by_weather: false,
            },
            name: "Hotel Test".into(),
            room: None,
            confirmation: None,
            geometry: None,
            checkin: TripTime(0),
            checkout: TripTime(0),
            price: 200.0,
            original_price: 0.0,
            is_preferred: false,
            has_promotional_discount: promo,
            is_loyalty_member: loyalty,
            promotional_discount: None,
            loyalty_discount: None,
            loyalty_program_name: None,
            loyalty_points: None,
            rating: None,
            description: None,
            vicinity: None,
            review_highlight: None,
            reviewer: None,
            image_url: None,
            display_type: None,
        }
    }

    #[test]
    fn plain_bookings_keep_their_price() {
        let adjusted = StandardRateRules
            .evaluate(&booking(false, false))
            .expect("evaluate");
        assert_eq!(adjusted.price, 200.0);
        assert_eq!(adjusted.original_price, 200.0);
        assert!(adjusted.promotional_discount.is_none());
        assert!(adjusted.loyalty_discount.is_none());
    }

    #[test]
    fn discounts_stack_promo_then_loyalty() {
        let adjusted = StandardRateRules
            .evaluate(&booking(true, true))
            .expect("evaluate");
        assert_eq!(adjusted.original_price, 200.0);
        // 200 * 0.90 * 0.85
        assert!((adjusted.price - 153.0).abs() < 0.01);
        let promo = adjusted.promotional_discount.expect("promo");
        assert_eq!(promo.previous_price, 200.0);
        let loyalty = adjusted.loyalty_discount.expect("loyalty");
        assert!((loyalty.previous_price - 180.0).abs() < 0.01);
    }
}
