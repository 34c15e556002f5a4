use crate::catalog::{Catalog, CatalogItem};
use crate::config::{KioskSettings, MatchStrategy};
use strsim::normalized_damerau_levenshtein;

/// Shorter fragments are recognizer noise ("as", "la") and never match.
const MIN_FRAGMENT_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidate<'a> {
    pub item: &'a CatalogItem,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuMatcher {
    strategy: MatchStrategy,
    search_threshold: f64,
    accept_threshold: f64,
}

impl Default for MenuMatcher {
    fn default() -> Self {
        Self::from_settings(&KioskSettings::default())
    }
}

impl MenuMatcher {
    pub fn new(strategy: MatchStrategy, search_threshold: f64, accept_threshold: f64) -> Self {
        Self {
            strategy,
            search_threshold,
            accept_threshold,
        }
    }

    pub fn from_settings(settings: &KioskSettings) -> Self {
        Self::new(
            settings.match_strategy,
            settings.search_threshold,
            settings.accept_threshold,
        )
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Best catalog candidate under the search threshold. Ties keep the
    /// first-listed item.
    pub fn best_match<'a>(&self, fragment: &str, catalog: &'a Catalog) -> Option<MatchCandidate<'a>> {
        let folded = fold(fragment);
        if folded.chars().filter(|ch| ch.is_alphanumeric()).count() < MIN_FRAGMENT_CHARS {
            return None;
        }

        match self.strategy {
            MatchStrategy::Fuzzy => self
                .fuzzy_match(&folded, catalog)
                .or_else(|| substring_match(&folded, catalog)),
            MatchStrategy::Substring => substring_match(&folded, catalog),
        }
    }

    pub fn accepts(&self, candidate: &MatchCandidate<'_>) -> bool {
        candidate.score < self.accept_threshold
    }

    fn fuzzy_match<'a>(&self, folded: &str, catalog: &'a Catalog) -> Option<MatchCandidate<'a>> {
        let mut best: Option<MatchCandidate<'a>> = None;
        for item in catalog.items() {
            let score = folded_score(folded, &fold(&item.name));
            let better = match &best {
                Some(current) => score < current.score,
                None => true,
            };
            if better {
                best = Some(MatchCandidate { item, score });
            }
        }
        best.filter(|candidate| candidate.score < self.search_threshold)
    }
}

/// Containment on whole words, in either direction: "chai" is in
/// "masala chai", but "ken" is not in "butter chicken".
fn substring_match<'a>(folded: &str, catalog: &'a Catalog) -> Option<MatchCandidate<'a>> {
    let fragment_words = folded.split_whitespace().collect::<Vec<_>>();
    catalog
        .items()
        .iter()
        .find(|item| {
            let name = fold(&item.name);
            let name_words = name.split_whitespace().collect::<Vec<_>>();
            contains_words(&name_words, &fragment_words) || contains_words(&fragment_words, &name_words)
        })
        .map(|item| MatchCandidate { item, score: 0.0 })
}

fn contains_words(haystack: &[&str], needle: &[&str]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|window| window == needle)
}

pub fn score(fragment: &str, name: &str) -> f64 {
    folded_score(&fold(fragment), &fold(name))
}

fn folded_score(fragment: &str, name: &str) -> f64 {
    if fragment.is_empty() || name.is_empty() {
        return 1.0;
    }
    if fragment == name {
        return 0.0;
    }

    let mut best = distance(fragment, name);
    let name_words = name.split_whitespace().collect::<Vec<_>>();
    let width = fragment
        .split_whitespace()
        .count()
        .clamp(1, name_words.len().max(1));
    for window in name_words.windows(width) {
        best = best.min(distance(fragment, &window.join(" ")));
    }
    best
}

fn distance(a: &str, b: &str) -> f64 {
    1.0 - normalized_damerau_levenshtein(a, b)
}

fn fold(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_alphanumeric() { ch.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
