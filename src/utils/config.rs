use std::path::{Path, PathBuf};

use crate::models::Settings;

const ENV_CONFIG_PATH: &str = "APARTMENT_CONSOLE_CONFIG";
const ENV_PREDICTION_URL: &str = "PREDICTION_API_URL";
const ENV_DATA_URL: &str = "DATA_API_URL";
const ENV_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

const DEFAULT_CONFIG_PATH: &str = "config/settings.json";

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn config_path() -> PathBuf {
    env_value(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Environment wins over the settings file.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Some(url) = env_value(ENV_PREDICTION_URL) {
        settings.backend.prediction_url = url;
    }
    if let Some(url) = env_value(ENV_DATA_URL) {
        settings.backend.data_url = url;
    }
    if let Some(raw) = env_value(ENV_TIMEOUT_SECS) {
        match raw.parse::<u64>() {
            Ok(secs) => settings.backend.request_timeout_secs = Some(secs),
            Err(_) => log::warn!("ignoring {}={}: not a number of seconds", ENV_TIMEOUT_SECS, raw),
        }
    }
}

/// Reads settings from `path`, falling back to defaults when the file does not exist.
pub fn read_settings(path: &Path) -> Result<Settings, String> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

pub fn write_settings(path: &Path, settings: &Settings) -> Result<(), String> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    }
    let content = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
    std::fs::write(path, content).map_err(|e| e.to_string())
}

/// File settings with environment overrides applied.
pub fn load_settings(path: &Path) -> Result<Settings, String> {
    let mut settings = read_settings(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}
