use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub version: String,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub general: GeneralSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            backend: BackendSettings::default(),
            general: GeneralSettings::default(),
        }
    }
}

/// Base URLs of the two backends. The prediction service and the data service
/// are deployed separately and listen on different ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    pub prediction_url: String,
    pub data_url: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            prediction_url: "http://localhost:8000".to_string(),
            data_url: "http://localhost:8080".to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub theme: String,
    pub color_theme: String,
    #[serde(default = "default_sidebar_expanded")]
    pub sidebar_expanded: bool,
    pub notifications_enabled: bool,
    pub data_retention_days: u32,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            theme: "system".to_string(),
            color_theme: "blue".to_string(),
            sidebar_expanded: true,
            notifications_enabled: true,
            data_retention_days: 30,
        }
    }
}

fn default_sidebar_expanded() -> bool {
    true
}
