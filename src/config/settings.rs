//! TOML-based configuration for Quill.
//!
//! Supports a config file (quill.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [translation]
//! dialect = "postgres"
//! in_list_array_binding = true
//!
//! [driver.preferred_array_elements]
//! smallint = "Integer"
//! varchar = "${QUILL_VARCHAR_ELEMENT}"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::sql::{Dialect, TranslationOptions};
use crate::types::{HostType, SqlTypeCode, WrapperOptions};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Translation defaults.
    pub translation: TranslationSettings,

    /// Driver preferences used when binding array parameters.
    pub driver: DriverSettings,
}

/// Translation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// Target dialect (ansi, hsql, postgres, mysql).
    pub dialect: String,

    /// Bind homogeneous IN lists as a single array parameter where the
    /// dialect allows it.
    pub in_list_array_binding: bool,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            dialect: Dialect::default().to_string(),
            in_list_array_binding: true,
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverSettings {
    /// Host element representation per SQL type code, e.g. `smallint = "Integer"`.
    /// Values support `${ENV_VAR}` expansion.
    pub preferred_array_elements: BTreeMap<String, String>,
}

impl DriverSettings {
    /// Build the driver context used by the array marshaller.
    pub fn to_wrapper_options(&self) -> Result<WrapperOptions, SettingsError> {
        let mut options = WrapperOptions::new();
        for (code, host) in &self.preferred_array_elements {
            let code = SqlTypeCode::from_str(code).map_err(SettingsError::InvalidConfig)?;
            let host = expand_env_vars(host)?;
            let host = HostType::parse(&host).map_err(|e| {
                SettingsError::InvalidConfig(format!("preferred element for {}: {}", code, e))
            })?;
            options = options.prefer(code, host);
        }
        Ok(options)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `QUILL_CONFIG`
    /// 2. `./quill.toml`
    /// 3. `~/.config/quill/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("QUILL_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("quill.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("quill").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// The configured dialect, with `${VAR}` expanded.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        let name = expand_env_vars(&self.translation.dialect)?;
        Dialect::from_str(&name).map_err(SettingsError::InvalidConfig)
    }

    pub fn translation_options(&self) -> TranslationOptions {
        TranslationOptions {
            in_list_array_binding: self.translation.in_list_array_binding,
        }
    }

    pub fn wrapper_options(&self) -> Result<WrapperOptions, SettingsError> {
        self.driver.to_wrapper_options()
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            // $VAR ends at the first non-alphanumeric, non-underscore char
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
