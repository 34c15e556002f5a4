use crate::config::{KioskSettings, MatchStrategy};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KioskSettingsPatch {
    pub match_strategy: Option<MatchStrategy>,
    pub search_threshold: Option<f64>,
    pub accept_threshold: Option<f64>,
    pub catalog_path: Option<Option<String>>,
    pub capture_max_retries: Option<u32>,
    pub capture_backoff_ms: Option<u64>,
}

pub fn default_settings_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("voice-kiosk").join("settings.json")
}

pub fn load_or_default(path: &Path) -> KioskSettings {
    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str::<KioskSettings>(&contents).unwrap_or_else(|error| {
            warn!(path = %path.display(), %error, "ignoring unreadable settings file");
            KioskSettings::default()
        }),
        Err(_) => KioskSettings::default(),
    }
}

pub fn save(path: &Path, settings: &KioskSettings) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Config("settings path has no parent directory".to_string()))?;
    fs::create_dir_all(parent)?;
    let contents = serde_json::to_string_pretty(settings)?;
    fs::write(path, contents)?;
    Ok(())
}

pub fn apply_patch(settings: &KioskSettings, patch: KioskSettingsPatch) -> KioskSettings {
    KioskSettings {
        match_strategy: patch.match_strategy.unwrap_or(settings.match_strategy),
        search_threshold: patch
            .search_threshold
            .map(clamp_threshold)
            .unwrap_or(settings.search_threshold),
        accept_threshold: patch
            .accept_threshold
            .map(clamp_threshold)
            .unwrap_or(settings.accept_threshold),
        catalog_path: patch
            .catalog_path
            .map(|value| {
                value
                    .map(|path| path.trim().to_string())
                    .filter(|path| !path.is_empty())
            })
            .unwrap_or_else(|| settings.catalog_path.clone()),
        capture_max_retries: patch
            .capture_max_retries
            .unwrap_or(settings.capture_max_retries),
        capture_backoff_ms: patch
            .capture_backoff_ms
            .unwrap_or(settings.capture_backoff_ms),
    }
}

fn clamp_threshold(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
