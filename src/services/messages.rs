use crate::models::event::RecKind;

pub const DEFAULT_LOCALE: &str = "en";

const SUPPORTED_LOCALES: [&str; 1] = ["en"];

/// Normalize a requested locale, silently falling back to the default for
/// anything the deployment does not carry resources for.
pub fn normalize_locale(locale: Option<&str>) -> &str {
    match locale {
        Some(requested) => SUPPORTED_LOCALES
            .iter()
            .copied()
            .find(|supported| *supported == requested)
            .unwrap_or(DEFAULT_LOCALE),
        None => DEFAULT_LOCALE,
    }
}

/// Display copy for recommendation events whose pool header carried none.
/// The feed normally supplies localized messages per pool; this is the
/// last-resort wording.
pub fn fallback_message(kind: RecKind, _locale: &str) -> &'static str {
    match kind {
        RecKind::Lodging => "You don't have a hotel booked for this trip yet. Here are a few options.",
        RecKind::Restaurant => "Rain is expected, so here are some indoor alternatives nearby.",
        RecKind::Transit => "Your next stop is a long walk away. Here are some ways to get there.",
    }
}
