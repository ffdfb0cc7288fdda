// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Satellite chargepoint: energy meter plus EVSE.
//!
//! One update issues two reads: the whole meter block, then the EVSE vehicle
//! state register.
//!
//! Meter block layout (input registers, starting at 0):
//!
//! | offset | length | value | raw unit |
//! |---|---|---|---|
//! | 0 | 6 | voltage L1-L3, `u32` | mV |
//! | 6 | 6 | current L1-L3, `u32` | mA |
//! | 12 | 2 | total active power, `i32` | W |
//! | 14 | 3 | power factor L1-L3, `i16` | ‰ |
//! | 17 | 2 | imported energy, `u32` | Wh |
//! | 19 | 2 | exported energy, `u32` | Wh |

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::broker::Broker;
use crate::component::{Component, ComponentConfig, ComponentInfo};
use crate::error::{ConfigError, Error};
use crate::state::ChargepointState;
use crate::store::{ChargepointValueStore, ValueStore};
use crate::transport::{Transport, decode};
use crate::types::{ChargeState, ComponentKind, PlugState};

/// First register of the meter block.
pub const METER_BLOCK_START: u16 = 0;
/// Number of registers in the meter block.
pub const METER_BLOCK_LEN: u16 = 21;
/// EVSE register holding the vehicle state.
pub const VEHICLE_STATE_REGISTER: u16 = 1002;

/// Vehicle state value of an EVSE with a vehicle connected.
const VEHICLE_PLUGGED: u16 = 2;
/// Vehicle state value of an EVSE delivering energy.
const VEHICLE_CHARGING: u16 = 3;
/// Vehicle state value of an EVSE delivering energy with ventilation requested.
const VEHICLE_CHARGING_VENTILATED: u16 = 4;

/// Settings of a satellite chargepoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatellitChargepointConfig {
    /// Modbus unit of the energy meter.
    #[serde(default = "default_meter_unit")]
    pub meter_unit: u8,
    /// Modbus unit of the EVSE.
    #[serde(default = "default_evse_unit")]
    pub evse_unit: u8,
}

fn default_meter_unit() -> u8 {
    105
}

fn default_evse_unit() -> u8 {
    1
}

impl Default for SatellitChargepointConfig {
    fn default() -> Self {
        Self {
            meter_unit: default_meter_unit(),
            evse_unit: default_evse_unit(),
        }
    }
}

/// Returns the factory configuration record of a satellite chargepoint.
#[must_use]
pub fn default_config() -> ComponentConfig {
    ComponentConfig::new("chargepoint", 0)
        .with_name("Ladepunkt")
        .with_configuration(serde_json::json!({"meter_unit": 105, "evse_unit": 1}))
}

/// Chargepoint of a satellite controller.
#[derive(Debug)]
pub struct SatellitChargepoint<T, B> {
    info: ComponentInfo,
    settings: SatellitChargepointConfig,
    transport: Arc<T>,
    store: ChargepointValueStore<B>,
}

impl<T: Transport, B: Broker> SatellitChargepoint<T, B> {
    /// Creates the driver.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidComponentConfig` if the settings are malformed.
    pub fn new(config: &ComponentConfig, transport: Arc<T>, broker: B) -> Result<Self, ConfigError> {
        Ok(Self {
            info: ComponentInfo::new(
                config.id(),
                config.display_name(),
                ComponentKind::Chargepoint,
            ),
            settings: config.parse_configuration()?,
            store: ChargepointValueStore::new(broker, config.id()),
            transport,
        })
    }

    /// Returns the parsed settings.
    #[must_use]
    pub fn settings(&self) -> &SatellitChargepointConfig {
        &self.settings
    }

    /// Reads meter and EVSE and builds the chargepoint state.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails, the meter block has the wrong length,
    /// or the decoded values do not form a valid state.
    pub async fn read_state(&self) -> Result<ChargepointState, Error> {
        let meter = self
            .transport
            .read_exact(
                self.settings.meter_unit,
                METER_BLOCK_START,
                METER_BLOCK_LEN,
            )
            .await?;
        let vehicle_state = self
            .transport
            .read_u16(self.settings.evse_unit, VEHICLE_STATE_REGISTER)
            .await?;

        let voltages = [
            milli(decode::uint32(&meter[0..2])?),
            milli(decode::uint32(&meter[2..4])?),
            milli(decode::uint32(&meter[4..6])?),
        ];
        let currents = [
            milli(decode::uint32(&meter[6..8])?),
            milli(decode::uint32(&meter[8..10])?),
            milli(decode::uint32(&meter[10..12])?),
        ];
        let power = f64::from(decode::int32(&meter[12..14])?);
        let power_factors = [
            per_mille(decode::int16(&meter[14..15])?),
            per_mille(decode::int16(&meter[15..16])?),
            per_mille(decode::int16(&meter[16..17])?),
        ];
        let imported = f64::from(decode::uint32(&meter[17..19])?);
        let exported = f64::from(decode::uint32(&meter[19..21])?);

        Ok(ChargepointState::builder()
            .voltages(voltages)
            .currents(currents)
            .power_factors(power_factors)
            .imported(imported)
            .exported(exported)
            .power(power)
            .charge_state(ChargeState::from(
                (VEHICLE_CHARGING..=VEHICLE_CHARGING_VENTILATED).contains(&vehicle_state),
            ))
            .plug_state(PlugState::from(vehicle_state >= VEHICLE_PLUGGED))
            .build()?)
    }
}

fn milli(raw: u32) -> f64 {
    f64::from(raw) / 1000.0
}

fn per_mille(raw: i16) -> f64 {
    f64::from(raw) / 1000.0
}

impl<T: Transport, B: Broker> Component for SatellitChargepoint<T, B> {
    fn info(&self) -> &ComponentInfo {
        &self.info
    }

    async fn update(&self) -> Result<(), Error> {
        let state = self.read_state().await?;
        tracing::debug!(
            component = %self.info.id,
            power = state.power(),
            charge_state = %state.charge_state(),
            plug_state = %state.plug_state(),
            "Chargepoint read"
        );
        self.store.set(&state).await?;
        Ok(())
    }
}
