//! Personality Analysis
//!
//! Turns a piece of representative text into a five-trait profile, so that
//! alternative venues can be ranked by how close their "personality" sits to
//! the traveler's. The trait set is the one that matters for venue matching:
//! adventurousness, artistic interests, intellect, excitement seeking, and
//! outgoingness, each scored 0-100.

use serde::Serialize;

use crate::services::PipelineError;

pub const TRAIT_COUNT: usize = 5;

pub const TRAIT_NAMES: [&str; TRAIT_COUNT] = [
    "adventurousness",
    "artistic_interests",
    "intellect",
    "excitement_seeking",
    "outgoingness",
];

/// A point in trait space. Distance between two profiles is the Euclidean
/// norm of the score difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraitProfile {
    pub scores: [f64; TRAIT_COUNT],
}

impl TraitProfile {
    pub fn distance(&self, other: &TraitProfile) -> f64 {
        self.scores
            .iter()
            .zip(other.scores.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

pub trait PersonalityAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<TraitProfile, PipelineError>;
}

// One keyword list per trait, in TRAIT_NAMES order.
const LEXICON: [&[&str]; TRAIT_COUNT] = [
    &[
        "adventure",
        "adventurous",
        "explore",
        "exploring",
        "trail",
        "wild",
        "daring",
        "discover",
        "offbeat",
        "wander",
    ],
    &[
        "art", "gallery", "design", "craft", "mural", "jazz", "poetry", "vintage", "studio",
        "handmade",
    ],
    &[
        "history",
        "museum",
        "lecture",
        "book",
        "books",
        "philosophy",
        "science",
        "archive",
        "curious",
        "learning",
    ],
    &[
        "thrill",
        "lively",
        "buzzing",
        "energetic",
        "vibrant",
        "spontaneous",
        "nightlife",
        "crowd",
        "loud",
        "rush",
    ],
    &[
        "social",
        "friends",
        "conversation",
        "communal",
        "shared",
        "welcoming",
        "gather",
        "together",
        "hosts",
        "neighborly",
    ],
];

// Keyword density is a weak signal, so it gets amplified into the 0-100
// band before clamping.
const DENSITY_SCALE: f64 = 400.0;

/// A self-contained analyzer that scores text by keyword density per trait.
/// It stands in for a hosted language service and gives the sample feed a
/// fully deterministic ranking.
pub struct LexiconAnalyzer;

impl PersonalityAnalyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Result<TraitProfile, PipelineError> {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(PipelineError::Analysis(
                "no analyzable text provided".to_string(),
            ));
        }

        let mut scores = [0.0; TRAIT_COUNT];
        for (slot, keywords) in scores.iter_mut().zip(LEXICON.iter()) {
            let hits = words
                .iter()
                .filter(|w| keywords.contains(&w.as_str()))
                .count();
            *slot = (hits as f64 * DENSITY_SCALE / words.len() as f64).min(100.0);
        }

        Ok(TraitProfile { scores })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_is_deterministic() {
        let text = "We love to explore offbeat trails and discover wild places.";
        let a = LexiconAnalyzer.analyze(text).expect("analyze");
        let b = LexiconAnalyzer.analyze(text).expect("analyze");
        assert_eq!(a, b);
        assert!(a.scores[0] > 0.0, "adventurousness should register");
        assert_eq!(a.scores[1], 0.0, "no artistic keywords in the text");
    }

    #[test]
    fn empty_text_is_an_error() {
        assert!(LexiconAnalyzer.analyze("   ").is_err());
    }

    #[test]
    fn distance_is_zero_for_identical_profiles() {
        let p = TraitProfile {
            scores: [10.0, 20.0, 30.0, 40.0, 50.0],
        };
        assert_eq!(p.distance(&p), 0.0);
    }

    #[test]
    fn closer_texts_have_smaller_distances() {
        let user = LexiconAnalyzer
            .analyze("explore wild trails, discover offbeat adventure")
            .expect("analyze");
        let similar = LexiconAnalyzer
            .analyze("an adventurous place to explore and discover")
            .expect("analyze");
        let unrelated = LexiconAnalyzer
            .analyze("a quiet room with beige walls and a desk")
            .expect("analyze");
        assert!(user.distance(&similar) < user.distance(&unrelated));
    }
}
