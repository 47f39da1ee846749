use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// A timestamp stored as milliseconds relative to the trip baseline.
///
/// The feed keeps every date as an offset from "midnight of the day the data
/// is read", so a stored value of `MILLIS_PER_DAY + x` always presents as
/// "tomorrow at x" no matter when the cache was populated. Offsets are
/// resolved into absolute epoch milliseconds once per read, on the caller's
/// own copy of the data, never on cached state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TripTime(pub i64);

impl TripTime {
    pub fn millis(self) -> i64 {
        self.0
    }

    /// Truncate to midnight of the calendar day containing this instant.
    pub fn start_of_day(self) -> TripTime {
        TripTime(self.0 - self.0.rem_euclid(MILLIS_PER_DAY))
    }

    /// The last representable millisecond of the day containing this instant.
    pub fn end_of_day(self) -> TripTime {
        TripTime(self.start_of_day().0 + MILLIS_PER_DAY - 1)
    }

    pub fn shift(self, millis: i64) -> TripTime {
        TripTime(self.0 + millis)
    }

    /// Resolve this offset against an absolute baseline.
    pub fn resolve(&mut self, baseline: TripTime) {
        self.0 += baseline.0;
    }
}

/// Midnight (UTC) of the current day, as absolute epoch milliseconds.
pub fn today_baseline() -> TripTime {
    let now = Utc::now().timestamp_millis();
    TripTime(now - now.rem_euclid(MILLIS_PER_DAY))
}
