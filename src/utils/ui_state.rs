use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::models::GeneralSettings;

static SIDEBAR_EXPANDED: AtomicBool = AtomicBool::new(true);
static THEME: AtomicU8 = AtomicU8::new(Theme::System as u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Theme {
    Light = 0,
    Dark = 1,
    System = 2,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Light,
            1 => Self::Dark,
            _ => Self::System,
        }
    }
}

pub fn init_from_settings(general: &GeneralSettings) {
    let theme = Theme::parse(&general.theme).unwrap_or_else(|| {
        log::warn!("unknown theme `{}`, using system", general.theme);
        Theme::System
    });
    set_theme(theme);
    SIDEBAR_EXPANDED.store(general.sidebar_expanded, Ordering::Relaxed);
}

pub fn theme() -> Theme {
    Theme::from_u8(THEME.load(Ordering::Relaxed))
}

pub fn set_theme(theme: Theme) {
    THEME.store(theme as u8, Ordering::Relaxed);
}

pub fn sidebar_expanded() -> bool {
    SIDEBAR_EXPANDED.load(Ordering::Relaxed)
}

/// Returns the new state.
pub fn toggle_sidebar() -> bool {
    !SIDEBAR_EXPANDED.fetch_xor(true, Ordering::Relaxed)
}
