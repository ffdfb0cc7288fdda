// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device configuration records.

use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::transport::MODBUS_PORT;

/// Configuration record of one device.
///
/// # Examples
///
/// ```
/// use station_devices::device::DeviceConfig;
///
/// let config: DeviceConfig = serde_json::from_str(r#"{
///     "name": "Studer",
///     "type": "studer",
///     "id": 0,
///     "configuration": {"ip_address": "192.168.193.15"}
/// }"#).unwrap();
///
/// assert_eq!(config.endpoint().unwrap().to_string(), "192.168.193.15:502");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Human readable name, used in logs.
    pub name: String,
    /// Device family tag.
    #[serde(rename = "type")]
    pub device_type: String,
    /// Numeric device id.
    pub id: u32,
    /// Connection settings.
    pub configuration: DeviceSettings,
}

/// Connection settings of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// IP address of the Modbus-TCP endpoint.
    ///
    /// Must be an IPv4 or IPv6 literal. Host names are not resolved and are
    /// rejected by [`DeviceConfig::endpoint`].
    pub ip_address: String,
}

impl DeviceConfig {
    /// Creates a device configuration.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        device_type: impl Into<String>,
        id: u32,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            device_type: device_type.into(),
            id,
            configuration: DeviceSettings {
                ip_address: ip_address.into(),
            },
        }
    }

    /// Returns the Modbus-TCP endpoint the device's transport must bind to.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDeviceConfig` if the IP address is not an
    /// IP literal, host names included.
    pub fn endpoint(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.configuration.ip_address.parse().map_err(|_| {
            ConfigError::InvalidDeviceConfig(format!(
                "invalid IP address '{}' for device '{}'",
                self.configuration.ip_address, self.name
            ))
        })?;
        Ok(SocketAddr::new(ip, MODBUS_PORT))
    }
}
