// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Satellite chargepoint controllers.
//!
//! A satellite exposes its energy meter and its EVSE as two Modbus units
//! behind one TCP endpoint. The only supported component type is
//! `chargepoint` ([`SatellitChargepoint`]).

pub mod chargepoint;

pub use chargepoint::{SatellitChargepoint, SatellitChargepointConfig};

use std::sync::Arc;

use super::{DeviceConfig, DeviceFamily, unsupported_type};
use crate::broker::Broker;
use crate::component::{Component, ComponentConfig, ComponentInfo};
use crate::error::{ConfigError, Error};
use crate::transport::Transport;

/// The satellite device family.
#[derive(Debug, Clone, Copy, Default)]
pub struct Satellit;

impl Satellit {
    /// Device `type` tag.
    pub const TYPE: &'static str = "satellit";

    /// Returns the factory configuration of a satellite.
    #[must_use]
    pub fn default_config() -> DeviceConfig {
        DeviceConfig::new("Satellit", Self::TYPE, 0, "192.168.193.16")
    }
}

/// A component of a satellite.
#[derive(Debug)]
pub enum SatellitComponent<T, B> {
    /// Chargepoint meter and EVSE.
    Chargepoint(SatellitChargepoint<T, B>),
}

impl<T: Transport, B: Broker> Component for SatellitComponent<T, B> {
    fn info(&self) -> &ComponentInfo {
        match self {
            Self::Chargepoint(chargepoint) => chargepoint.info(),
        }
    }

    async fn update(&self) -> Result<(), Error> {
        match self {
            Self::Chargepoint(chargepoint) => chargepoint.update().await,
        }
    }
}

impl<T: Transport, B: Broker> DeviceFamily<T, B> for Satellit {
    type Component = SatellitComponent<T, B>;

    const DEVICE_TYPE: &'static str = Self::TYPE;
    const SUPPORTED_TYPES: &'static [&'static str] = &["chargepoint"];

    fn create_component(
        config: &ComponentConfig,
        transport: Arc<T>,
        broker: B,
    ) -> Result<Self::Component, ConfigError> {
        match config.component_type.as_str() {
            "chargepoint" => Ok(SatellitComponent::Chargepoint(SatellitChargepoint::new(
                config, transport, broker,
            )?)),
            other => Err(unsupported_type(
                other,
                <Self as DeviceFamily<T, B>>::SUPPORTED_TYPES,
            )),
        }
    }
}
