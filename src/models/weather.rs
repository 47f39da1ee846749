use serde::{Deserialize, Serialize};

use crate::models::trip_time::TripTime;

pub const RAIN_CONDITION: &str = "Rain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSystem {
    Metric,
    English,
}

/// A temperature reading carried in both unit systems, as delivered by the
/// weather feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Temperature {
    pub metric: i64,
    pub english: i64,
}

/// One sample from the weather feed for a given city.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSample {
    pub date: TripTime,
    pub condition: String,
    pub temp: Temperature,
    pub city: String,
    pub country: String,
}

impl WeatherSample {
    pub fn temperature(&self, units: UnitSystem) -> i64 {
        match units {
            UnitSystem::Metric => self.temp.metric,
            UnitSystem::English => self.temp.english,
        }
    }
}
