// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Studer battery status processor.

use std::sync::Arc;

use crate::broker::Broker;
use crate::component::{Component, ComponentConfig, ComponentInfo};
use crate::error::Error;
use crate::state::BatState;
use crate::store::{BatValueStore, ValueStore};
use crate::transport::Transport;
use crate::types::ComponentKind;

/// Modbus unit of the battery status processor.
pub const UNIT: u8 = 60;
/// Battery power in W, positive while charging.
pub const POWER_REGISTER: u16 = 6;
/// State of charge in %.
pub const SOC_REGISTER: u16 = 4;
/// Energy charged into the battery in kWh.
pub const CHARGED_ENERGY_REGISTER: u16 = 14;
/// Energy discharged from the battery in kWh.
pub const DISCHARGED_ENERGY_REGISTER: u16 = 16;

/// Returns the factory configuration record of a Studer battery.
#[must_use]
pub fn default_config() -> ComponentConfig {
    ComponentConfig::new("bat", 0).with_name("Studer Speicher")
}

/// Battery of a Studer installation.
#[derive(Debug)]
pub struct StuderBat<T, B> {
    info: ComponentInfo,
    transport: Arc<T>,
    store: BatValueStore<B>,
}

impl<T: Transport, B: Broker> StuderBat<T, B> {
    /// Creates the driver; batteries take no settings.
    #[must_use]
    pub fn new(config: &ComponentConfig, transport: Arc<T>, broker: B) -> Self {
        Self {
            info: ComponentInfo::new(config.id(), config.display_name(), ComponentKind::Bat),
            store: BatValueStore::new(broker, config.id()),
            transport,
        }
    }

    /// Reads the battery registers.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails or the values do not form a valid state.
    pub async fn read_state(&self) -> Result<BatState, Error> {
        let power = self.transport.read_f32(UNIT, POWER_REGISTER).await?;
        let soc = self.transport.read_f32(UNIT, SOC_REGISTER).await?;
        let charged = self.transport.read_f32(UNIT, CHARGED_ENERGY_REGISTER).await?;
        let discharged = self
            .transport
            .read_f32(UNIT, DISCHARGED_ENERGY_REGISTER)
            .await?;

        Ok(BatState::new(
            f64::from(power),
            f64::from(soc),
            kwh_to_wh(charged),
            kwh_to_wh(discharged),
        )?)
    }
}

fn kwh_to_wh(value: f32) -> f64 {
    f64::from(value) * 1000.0
}

impl<T: Transport, B: Broker> Component for StuderBat<T, B> {
    fn info(&self) -> &ComponentInfo {
        &self.info
    }

    async fn update(&self) -> Result<(), Error> {
        let state = self.read_state().await?;
        tracing::debug!(component = %self.info.id, ?state, "Studer battery read");
        self.store.set(&state).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBroker;
    use crate::error::ValueError;
    use crate::transport::{MemoryTransport, decode};

    fn transport(soc: f32) -> MemoryTransport {
        let transport = MemoryTransport::new();
        transport.set_registers(UNIT, POWER_REGISTER, &decode::float32_registers(-1250.0));
        transport.set_registers(UNIT, SOC_REGISTER, &decode::float32_registers(soc));
        transport.set_registers(UNIT, CHARGED_ENERGY_REGISTER, &decode::float32_registers(12.5));
        transport.set_registers(
            UNIT,
            DISCHARGED_ENERGY_REGISTER,
            &decode::float32_registers(8.25),
        );
        transport
    }

    #[tokio::test]
    async fn reads_and_scales() {
        let bat = StuderBat::new(
            &default_config(),
            Arc::new(transport(64.0)),
            MemoryBroker::new(),
        );

        let state = bat.read_state().await.unwrap();

        assert_eq!(state.power(), -1250.0);
        assert_eq!(state.soc(), 64.0);
        assert_eq!(state.imported(), 12500.0);
        assert_eq!(state.exported(), 8250.0);
    }

    #[tokio::test]
    async fn invalid_soc_publishes_nothing() {
        let broker = MemoryBroker::new();
        let bat = StuderBat::new(&default_config(), Arc::new(transport(250.0)), broker.clone());

        let err = bat.update().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Value(ValueError::OutOfRange { field: "soc", .. })
        ));
        assert!(broker.publications().is_empty());
    }

    #[tokio::test]
    async fn update_publishes_state() {
        let broker = MemoryBroker::new();
        let bat = StuderBat::new(
            &ComponentConfig::new("bat", 3),
            Arc::new(transport(64.0)),
            broker.clone(),
        );

        bat.update().await.unwrap();

        assert_eq!(
            broker.last_payload("openWB/set/bat/3/get/imported").as_deref(),
            Some("12500.0")
        );
    }
}
