// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Deserialize;
use thiserror::Error;

/// Longest discoverability window the OS accepts, in seconds.
pub const MAX_DISCOVERABLE_DURATION: i64 = 60 * 60;

/// Reported when a configuration cannot be parsed or is inconsistent.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Plugin configuration. Every field has a default, so an empty JSON object
/// is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Request code tagging the enable dialog's activity result.
    pub enable_request_code: i32,
    /// Request code tagging the discoverability dialog's activity result.
    pub discoverability_request_code: i32,
    /// Request code tagging the location permission result.
    pub location_permission_request_code: i32,
    /// Permission that must be held before discovery may start.
    pub discovery_permission: String,
    /// Discoverability window used when the caller gives none, in seconds.
    pub default_discoverable_duration: u32,
    pub disable_prompt: PromptText,
    pub log: LogSettings,
}

impl Default for PluginConfig {
    fn default() -> Self {
        PluginConfig {
            enable_request_code: 5000,
            discoverability_request_code: 5001,
            location_permission_request_code: 6000,
            discovery_permission: String::from("android.permission.ACCESS_COARSE_LOCATION"),
            default_discoverable_duration: 300,
            disable_prompt: PromptText::default(),
            log: LogSettings::default(),
        }
    }
}

impl PluginConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PluginConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let codes = [
            self.enable_request_code,
            self.discoverability_request_code,
            self.location_permission_request_code,
        ];
        if codes[0] == codes[1] || codes[0] == codes[2] || codes[1] == codes[2]
        {
            return Err(ConfigError::Invalid(format!(
                "request codes must be distinct, got {:?}",
                codes
            )));
        }
        if i64::from(self.default_discoverable_duration)
            > MAX_DISCOVERABLE_DURATION
        {
            return Err(ConfigError::Invalid(format!(
                "default discoverable duration {} exceeds {} seconds",
                self.default_discoverable_duration, MAX_DISCOVERABLE_DURATION
            )));
        }
        if self.discovery_permission.trim().is_empty() {
            return Err(ConfigError::Invalid(String::from(
                "discovery permission must not be empty",
            )));
        }
        Ok(())
    }
}

/// Texts of the disable confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PromptText {
    pub title: String,
    pub message: String,
    pub confirm: String,
    pub cancel: String,
}

impl Default for PromptText {
    fn default() -> Self {
        PromptText {
            title: String::from("Disable Bluetooth"),
            message: String::from("Do you want to disable Bluetooth?"),
            confirm: String::from("Yes"),
            cancel: String::from("No"),
        }
    }
}

/// Console logging options, consumed by [`crate::logging::init`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub show_target: bool,
    pub show_thread_ids: bool,
    pub ansi_colors: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            level: String::from("info"),
            show_target: true,
            show_thread_ids: false,
            ansi_colors: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = PluginConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PluginConfig::default());
        assert_eq!(config.enable_request_code, 5000);
        assert_eq!(config.default_discoverable_duration, 300);
        assert_eq!(config.disable_prompt.title, "Disable Bluetooth");
    }

    #[test]
    fn partial_override() {
        let config = PluginConfig::from_json_str(
            r#"{
                "default_discoverable_duration": 120,
                "disable_prompt": { "confirm": "Disable" },
                "log": { "level": "debug" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.default_discoverable_duration, 120);
        assert_eq!(config.disable_prompt.confirm, "Disable");
        assert_eq!(config.disable_prompt.cancel, "No");
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn rejects_clashing_request_codes() {
        let err = PluginConfig::from_json_str(
            r#"{ "enable_request_code": 6000 }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_overlong_default_duration() {
        let err = PluginConfig::from_json_str(
            r#"{ "default_discoverable_duration": 3601 }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = PluginConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
