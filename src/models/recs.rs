use crate::models::event::{Event, EventKind, RecommendationEvent};

/// The per-user pools of candidates the recommendation engines draw from,
/// plus the traveler's representative text for personality ranking.
#[derive(Debug, Clone, Default)]
pub struct RecsBundle {
    pub user: String,
    pub lodging: Option<RecommendationEvent>,
    pub restaurant: Option<RecommendationEvent>,
    pub transit: Option<RecommendationEvent>,
    pub profile_text: Option<String>,
}

impl RecsBundle {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            ..Default::default()
        }
    }

    /// File a candidate event into the pool matching its own subtype.
    /// Candidates without a matching pool are dropped by the caller.
    pub fn add_candidate(&mut self, event: Event) -> bool {
        let pool = match event.kind() {
            EventKind::Lodging => self.lodging.as_mut(),
            EventKind::Restaurant => self.restaurant.as_mut(),
            EventKind::Transit => self.transit.as_mut(),
            _ => None,
        };
        match pool {
            Some(recs) => {
                recs.candidates.push(event);
                true
            }
            None => false,
        }
    }
}
