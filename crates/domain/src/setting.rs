//! Setting — a remotely configured key/value record.
//!
//! Two shapes live in the same store:
//! - **flat** settings: a plain string value under a key;
//! - **structured** settings: the value is a JSON [`SettingConfiguration`]
//!   document holding a list of labelled entries.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifier of the structured setting holding the minimum client version,
/// and key of the entry inside it.
pub const MIN_ALLOWED_APP_VERSION_SETTING: &str = "min_allowed_app_version_setting";

/// Flat key under which the minimum client version was stored by older
/// configurations.
pub const MIN_ALLOWED_APP_VERSION: &str = "min_allowed_app_version";

/// A row of the settings store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub identifier: String,
    pub value: String,
    pub setting_type: Option<String>,
    pub version: Option<String>,
    pub sync_status: Option<String>,
}

impl Setting {
    /// Create a structured setting whose value is the serialized `configuration`.
    ///
    /// # Errors
    ///
    /// Fails only if the configuration cannot be serialized.
    pub fn structured(
        identifier: impl Into<String>,
        configuration: &SettingConfiguration,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            identifier: identifier.into(),
            value: serde_json::to_string(configuration)?,
            setting_type: configuration.setting_type.clone(),
            version: configuration.server_version.map(|v| v.to_string()),
            sync_status: None,
        })
    }

    /// Parse the value as a [`SettingConfiguration`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedSetting`] when the value is not a
    /// configuration document.
    pub fn configuration(&self) -> Result<SettingConfiguration, ValidationError> {
        serde_json::from_str(&self.value).map_err(|_| ValidationError::MalformedSetting {
            identifier: self.identifier.clone(),
        })
    }
}

/// Structured setting document as delivered by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingConfiguration {
    pub identifier: String,
    #[serde(default)]
    pub settings: Vec<SettingEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<i64>,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub setting_type: Option<String>,
}

impl SettingConfiguration {
    /// Value of the first entry whose `key` matches.
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }
}

/// One labelled entry of a [`SettingConfiguration`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
