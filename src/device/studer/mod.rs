// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Studer Innotec installations behind an Xcom-LAN Modbus gateway.
//!
//! Supported component types:
//!
//! - `bat`: battery status processor ([`StuderBat`])
//! - `inverter`: `VarioTrack`/`VarioString` solar charge controllers
//!   ([`StuderInverter`])

pub mod bat;
pub mod inverter;

pub use bat::StuderBat;
pub use inverter::{StuderInverter, StuderInverterConfig, VcType};

use std::sync::Arc;

use super::{DeviceConfig, DeviceFamily, unsupported_type};
use crate::broker::Broker;
use crate::component::{Component, ComponentConfig, ComponentInfo};
use crate::error::{ConfigError, Error};
use crate::transport::Transport;

/// The Studer device family.
#[derive(Debug, Clone, Copy, Default)]
pub struct Studer;

impl Studer {
    /// Device `type` tag.
    pub const TYPE: &'static str = "studer";

    /// Returns the factory configuration of a Studer device.
    #[must_use]
    pub fn default_config() -> DeviceConfig {
        DeviceConfig::new("Studer", Self::TYPE, 0, "192.168.193.15")
    }
}

/// A component of a Studer device.
#[derive(Debug)]
pub enum StuderComponent<T, B> {
    /// Battery.
    Bat(StuderBat<T, B>),
    /// Solar charge controllers.
    Inverter(StuderInverter<T, B>),
}

impl<T: Transport, B: Broker> Component for StuderComponent<T, B> {
    fn info(&self) -> &ComponentInfo {
        match self {
            Self::Bat(bat) => bat.info(),
            Self::Inverter(inverter) => inverter.info(),
        }
    }

    async fn update(&self) -> Result<(), Error> {
        match self {
            Self::Bat(bat) => bat.update().await,
            Self::Inverter(inverter) => inverter.update().await,
        }
    }
}

impl<T: Transport, B: Broker> DeviceFamily<T, B> for Studer {
    type Component = StuderComponent<T, B>;

    const DEVICE_TYPE: &'static str = Self::TYPE;
    const SUPPORTED_TYPES: &'static [&'static str] = &["bat", "inverter"];

    fn create_component(
        config: &ComponentConfig,
        transport: Arc<T>,
        broker: B,
    ) -> Result<Self::Component, ConfigError> {
        match config.component_type.as_str() {
            "bat" => Ok(StuderComponent::Bat(StuderBat::new(config, transport, broker))),
            "inverter" => Ok(StuderComponent::Inverter(StuderInverter::new(
                config, transport, broker,
            )?)),
            other => Err(unsupported_type(
                other,
                <Self as DeviceFamily<T, B>>::SUPPORTED_TYPES,
            )),
        }
    }
}
