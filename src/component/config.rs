// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Component configuration records.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::types::ComponentId;

/// Configuration record of one component, as stored by the controller.
///
/// `type` selects the component driver from the device family's registry,
/// `configuration` holds the driver-specific settings.
///
/// # Examples
///
/// ```
/// use station_devices::component::ComponentConfig;
///
/// let config: ComponentConfig = serde_json::from_str(
///     r#"{"type": "inverter", "id": 3, "configuration": {"vc_count": 2, "vc_type": "VT"}}"#,
/// ).unwrap();
/// assert_eq!(config.component_type, "inverter");
/// assert_eq!(config.id().value(), 3);
/// assert_eq!(config.display_name(), "inverter 3");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Type tag resolved through the device's component registry.
    #[serde(rename = "type")]
    pub component_type: String,
    /// Numeric id, unique within the device.
    pub id: u32,
    /// Optional human readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Driver-specific settings.
    #[serde(default)]
    pub configuration: Value,
}

impl ComponentConfig {
    /// Creates a record with an empty driver configuration.
    #[must_use]
    pub fn new(component_type: impl Into<String>, id: u32) -> Self {
        Self {
            component_type: component_type.into(),
            id,
            name: None,
            configuration: Value::Object(serde_json::Map::new()),
        }
    }

    /// Sets the human readable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the driver-specific settings.
    #[must_use]
    pub fn with_configuration(mut self, configuration: Value) -> Self {
        self.configuration = configuration;
        self
    }

    /// Returns the typed component id.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        ComponentId::new(self.id)
    }

    /// Returns the configured name, or `"<type> <id>"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.component_type, self.id))
    }

    /// Deserializes the driver-specific settings.
    ///
    /// A missing (`null`) configuration is treated as an empty object, so
    /// drivers whose settings all have defaults accept it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidComponentConfig` if the settings do not
    /// match `C`.
    pub fn parse_configuration<C: DeserializeOwned>(&self) -> Result<C, ConfigError> {
        let value = match &self.configuration {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other.clone(),
        };
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidComponentConfig {
            component_type: self.component_type.clone(),
            message: e.to_string(),
        })
    }
}
