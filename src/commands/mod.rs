pub mod clustering;
pub mod dashboard;
pub mod history;
pub mod models;
pub mod predict;
pub mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use crate::models::Settings;
use crate::services::lifecycle::RunOutcome;
use crate::services::transport::{build_transport, Transport};

/// Shared state handed to every command.
pub struct AppContext {
    pub config_path: PathBuf,
    pub settings: Settings,
    pub transport: Arc<dyn Transport>,
}

impl AppContext {
    pub fn new(config_path: PathBuf, settings: Settings) -> Result<Self, String> {
        let transport = build_transport(&settings.backend).map_err(|e| e.to_string())?;
        Ok(Self::with_transport(config_path, settings, transport))
    }

    pub fn with_transport(config_path: PathBuf, settings: Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            config_path,
            settings,
            transport,
        }
    }
}

/// Flattens a lifecycle run into the command error convention.
pub(crate) fn into_command_result<T>(outcome: RunOutcome<T>) -> Result<T, String> {
    match outcome {
        RunOutcome::Settled(result) => result.map_err(|e| e.to_string()),
        RunOutcome::AlreadyPending => Err("request already in progress".to_string()),
        RunOutcome::Superseded => Err("request was superseded".to_string()),
    }
}
