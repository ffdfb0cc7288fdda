// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Studer solar charge controllers.
//!
//! An installation has one or more `VarioTrack` (VT) or `VarioString` (VS)
//! charge controllers, addressed as consecutive Modbus units. Their PV power
//! and produced energy are summed into one inverter state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::broker::Broker;
use crate::component::{Component, ComponentConfig, ComponentInfo};
use crate::error::{ConfigError, Error};
use crate::state::InverterState;
use crate::store::{PvValueStore, ValueStore};
use crate::transport::Transport;
use crate::types::ComponentKind;

/// Highest number of charge controllers on one Xcom bus.
pub const MAX_VC_COUNT: u8 = 15;

/// Charge controller model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VcType {
    /// `VarioString`.
    #[default]
    #[serde(rename = "VS")]
    VarioString,
    /// `VarioTrack`.
    #[serde(rename = "VT")]
    VarioTrack,
}

impl VcType {
    /// Unit address preceding the first controller of this model.
    #[must_use]
    pub const fn base_unit(&self) -> u8 {
        match self {
            Self::VarioString => 40,
            Self::VarioTrack => 20,
        }
    }

    /// Register holding the PV power in kW.
    #[must_use]
    pub const fn power_register(&self) -> u16 {
        match self {
            Self::VarioString => 20,
            Self::VarioTrack => 8,
        }
    }

    /// Register holding the produced energy in kWh.
    #[must_use]
    pub const fn energy_register(&self) -> u16 {
        match self {
            Self::VarioString => 62,
            Self::VarioTrack => 18,
        }
    }
}

/// Settings of a Studer inverter component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuderInverterConfig {
    /// Number of charge controllers, 1 to 15.
    #[serde(default = "default_vc_count")]
    pub vc_count: u8,
    /// Charge controller model.
    #[serde(default)]
    pub vc_type: VcType,
}

fn default_vc_count() -> u8 {
    1
}

impl Default for StuderInverterConfig {
    fn default() -> Self {
        Self {
            vc_count: default_vc_count(),
            vc_type: VcType::default(),
        }
    }
}

/// Returns the factory configuration record of a Studer inverter.
#[must_use]
pub fn default_config() -> ComponentConfig {
    ComponentConfig::new("inverter", 0)
        .with_name("Studer Wechselrichter")
        .with_configuration(serde_json::json!({"vc_count": 1, "vc_type": "VS"}))
}

/// Charge controllers of a Studer installation, reported as one PV inverter.
#[derive(Debug)]
pub struct StuderInverter<T, B> {
    info: ComponentInfo,
    settings: StuderInverterConfig,
    transport: Arc<T>,
    store: PvValueStore<B>,
}

impl<T: Transport, B: Broker> StuderInverter<T, B> {
    /// Creates the driver.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidComponentConfig` if the settings are
    /// malformed or `vc_count` is outside 1 to 15.
    pub fn new(config: &ComponentConfig, transport: Arc<T>, broker: B) -> Result<Self, ConfigError> {
        let settings: StuderInverterConfig = config.parse_configuration()?;
        if !(1..=MAX_VC_COUNT).contains(&settings.vc_count) {
            return Err(ConfigError::InvalidComponentConfig {
                component_type: config.component_type.clone(),
                message: format!(
                    "vc_count {} is out of range [1, {MAX_VC_COUNT}]",
                    settings.vc_count
                ),
            });
        }

        Ok(Self {
            info: ComponentInfo::new(config.id(), config.display_name(), ComponentKind::Inverter),
            settings,
            store: PvValueStore::new(broker, config.id()),
            transport,
        })
    }

    /// Returns the parsed settings.
    #[must_use]
    pub fn settings(&self) -> &StuderInverterConfig {
        &self.settings
    }

    /// Reads and sums all charge controllers.
    ///
    /// # Errors
    ///
    /// Returns an error if any controller cannot be read; no partial sum is
    /// reported.
    pub async fn read_state(&self) -> Result<InverterState, Error> {
        let vc_type = self.settings.vc_type;
        let mut power_kw = 0.0;
        let mut energy_kwh = 0.0;

        for offset in 1..=self.settings.vc_count {
            let unit = vc_type.base_unit() + offset;
            power_kw += f64::from(self.transport.read_f32(unit, vc_type.power_register()).await?);
            energy_kwh += f64::from(
                self.transport
                    .read_f32(unit, vc_type.energy_register())
                    .await?,
            );
        }

        Ok(InverterState::new(-power_kw * 1000.0, energy_kwh * 1000.0)?)
    }
}

impl<T: Transport, B: Broker> Component for StuderInverter<T, B> {
    fn info(&self) -> &ComponentInfo {
        &self.info
    }

    async fn update(&self) -> Result<(), Error> {
        let state = self.read_state().await?;
        tracing::debug!(component = %self.info.id, ?state, "Studer inverter read");
        self.store.set(&state).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBroker;
    use crate::transport::{MemoryTransport, decode};

    fn inverter(
        configuration: serde_json::Value,
        transport: MemoryTransport,
    ) -> Result<StuderInverter<MemoryTransport, MemoryBroker>, ConfigError> {
        StuderInverter::new(
            &ComponentConfig::new("inverter", 1).with_configuration(configuration),
            Arc::new(transport),
            MemoryBroker::new(),
        )
    }

    #[tokio::test]
    async fn sums_variotrack_units() {
        let transport = MemoryTransport::new();
        for (unit, power, energy) in [(21, 1.5_f32, 100.0_f32), (22, 2.0, 50.0)] {
            transport.set_registers(unit, 8, &decode::float32_registers(power));
            transport.set_registers(unit, 18, &decode::float32_registers(energy));
        }

        let inverter =
            inverter(serde_json::json!({"vc_count": 2, "vc_type": "VT"}), transport).unwrap();
        let state = inverter.read_state().await.unwrap();

        assert_eq!(state.power(), -3500.0);
        assert_eq!(state.counter(), 150_000.0);
    }

    #[tokio::test]
    async fn missing_unit_fails_whole_reading() {
        let transport = MemoryTransport::new();
        transport.set_registers(41, 20, &decode::float32_registers(1.0));
        transport.set_registers(41, 62, &decode::float32_registers(1.0));

        let inverter =
            inverter(serde_json::json!({"vc_count": 2, "vc_type": "VS"}), transport).unwrap();

        assert!(matches!(
            inverter.read_state().await,
            Err(Error::Transport(_))
        ));
    }

    #[test]
    fn defaults_when_settings_missing() {
        let inverter = StuderInverter::new(
            &ComponentConfig::new("inverter", 1).with_configuration(serde_json::Value::Null),
            Arc::new(MemoryTransport::new()),
            MemoryBroker::new(),
        )
        .unwrap();
        assert_eq!(inverter.settings(), &StuderInverterConfig::default());
    }

    #[test]
    fn rejects_vc_count_out_of_range() {
        let result = inverter(
            serde_json::json!({"vc_count": 0, "vc_type": "VS"}),
            MemoryTransport::new(),
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidComponentConfig { .. })
        ));
    }

    #[test]
    fn rejects_unknown_vc_type() {
        let result = inverter(
            serde_json::json!({"vc_count": 1, "vc_type": "XT"}),
            MemoryTransport::new(),
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidComponentConfig { .. })
        ));
    }
}
