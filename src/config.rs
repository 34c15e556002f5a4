use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Fuzzy,
    Substring,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KioskSettings {
    #[serde(default = "default_match_strategy")]
    pub match_strategy: MatchStrategy,
    /// Best candidate must score strictly below this to be returned at all.
    #[serde(default = "default_search_threshold")]
    pub search_threshold: f64,
    /// Second gate applied before a match is allowed to touch the cart.
    #[serde(default = "default_accept_threshold")]
    pub accept_threshold: f64,
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default = "default_capture_max_retries")]
    pub capture_max_retries: u32,
    #[serde(default = "default_capture_backoff_ms")]
    pub capture_backoff_ms: u64,
}

fn default_match_strategy() -> MatchStrategy {
    MatchStrategy::Fuzzy
}

fn default_search_threshold() -> f64 {
    0.4
}

fn default_accept_threshold() -> f64 {
    0.5
}

fn default_capture_max_retries() -> u32 {
    3
}

fn default_capture_backoff_ms() -> u64 {
    1_000
}

impl Default for KioskSettings {
    fn default() -> Self {
        Self {
            match_strategy: default_match_strategy(),
            search_threshold: default_search_threshold(),
            accept_threshold: default_accept_threshold(),
            catalog_path: None,
            capture_max_retries: default_capture_max_retries(),
            capture_backoff_ms: default_capture_backoff_ms(),
        }
    }
}
