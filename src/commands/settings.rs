use crate::commands::AppContext;
use crate::models::Settings;
use crate::utils::config::{apply_env_overrides, read_settings, write_settings};
use crate::utils::ui_state::{self, Theme};

pub fn get_settings(ctx: &AppContext) -> Result<Settings, String> {
    Ok(ctx.settings.clone())
}

/// Applies `key=value` updates (dotted keys such as `backend.data_url`) to the
/// file on disk, then returns the effective settings.
pub fn update_settings(ctx: &mut AppContext, updates: &[(String, String)]) -> Result<Settings, String> {
    let mut stored = read_settings(&ctx.config_path)?;
    for (key, value) in updates {
        apply_setting(&mut stored, key, value)?;
    }
    write_settings(&ctx.config_path, &stored)?;
    log::info!("saved {} setting(s) to {}", updates.len(), ctx.config_path.display());

    let mut effective = stored;
    apply_env_overrides(&mut effective);
    ui_state::init_from_settings(&effective.general);
    ctx.settings = effective.clone();
    Ok(effective)
}

pub fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> Result<(), String> {
    let value = value.trim();
    match key {
        "backend.prediction_url" => settings.backend.prediction_url = non_empty(key, value)?,
        "backend.data_url" => settings.backend.data_url = non_empty(key, value)?,
        "backend.request_timeout_secs" => {
            settings.backend.request_timeout_secs = match value {
                "" | "none" => None,
                secs => Some(secs.parse().map_err(|_| format!("{}: expected seconds, got `{}`", key, secs))?),
            }
        }
        "general.theme" => {
            let theme = Theme::parse(value).ok_or_else(|| format!("{}: unknown theme `{}`", key, value))?;
            settings.general.theme = theme.as_str().to_string();
        }
        "general.color_theme" => settings.general.color_theme = non_empty(key, value)?,
        "general.sidebar_expanded" => settings.general.sidebar_expanded = parse_bool(key, value)?,
        "general.notifications_enabled" => settings.general.notifications_enabled = parse_bool(key, value)?,
        "general.data_retention_days" => {
            settings.general.data_retention_days = value
                .parse()
                .map_err(|_| format!("{}: expected days, got `{}`", key, value))?
        }
        _ => return Err(format!("unknown setting `{}`", key)),
    }
    Ok(())
}

fn non_empty(key: &str, value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err(format!("{} cannot be empty", key));
    }
    Ok(value.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(format!("{}: expected true or false, got `{}`", key, value)),
    }
}
