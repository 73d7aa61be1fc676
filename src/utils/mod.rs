pub mod config;
pub mod ui_state;
