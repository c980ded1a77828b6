//! Configuration module for Quill.
//!
//! Handles translation defaults, driver array preferences and environment
//! variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, DriverSettings, Settings, SettingsError, TranslationSettings,
};
