//! Content filters applied to merged catalog results.
//!
//! Both filters are title-substring heuristics, a first-line defense only.
//! They are not classifiers and never a completeness guarantee; false
//! positives and negatives are expected and acceptable. Matching is
//! case-sensitive in the title's own script, and the denylist terms live in
//! configuration, not code.

use bookmuse_profile::{AgeBracket, AudienceLevel};
use bookmuse_shared::{CatalogItem, FiltersConfig};

/// Title markers classifying a book as aimed at children.
const CHILD_MARKERS: &[&str] = &["어린이", "유아", "초등", "그림책", "동화"];

/// Title markers classifying a book as aimed at teens.
const TEEN_MARKERS: &[&str] = &["청소년", "중학생", "고등학생"];

/// True when the title contains any denylist term.
pub fn is_denied<'a>(title: &str, terms: impl IntoIterator<Item = &'a str>) -> bool {
    terms.into_iter().any(|term| title.contains(term))
}

/// Classify a title's target audience from its markers.
/// Anything unmarked counts as adult (general) audience.
pub fn classify_audience(title: &str) -> AudienceLevel {
    if CHILD_MARKERS.iter().any(|m| title.contains(m)) {
        AudienceLevel::Child
    } else if TEEN_MARKERS.iter().any(|m| title.contains(m)) {
        AudienceLevel::Teen
    } else {
        AudienceLevel::Adult
    }
}

/// Apply the exclusion filter and, when enabled and a bracket is declared,
/// the audience-level filter.
pub fn apply_filters(
    items: Vec<CatalogItem>,
    config: &FiltersConfig,
    floor: Option<AgeBracket>,
) -> Vec<CatalogItem> {
    let denylist: Vec<&str> = config.denylist().collect();

    items
        .into_iter()
        .filter(|item| !is_denied(&item.title, denylist.iter().copied()))
        .filter(|item| match (config.age_filter_enabled, floor) {
            (true, Some(floor)) => floor.admits(classify_audience(&item.title)),
            _ => true,
        })
        .collect()
}
