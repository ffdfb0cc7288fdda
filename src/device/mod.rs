// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Devices and their update cycle.
//!
//! A [`Device`] owns one transport endpoint and the components behind it. The
//! device family `F` fixes which component types the device accepts; see
//! [`studer`] and [`satellit`] for the shipped families.
//!
//! One call to [`Device::update`] is one update cycle: every component is
//! updated once, in ascending id order, each inside its own
//! [`UpdateContext`]. A failing component is logged and skipped until the next
//! cycle; the cycle itself never fails.
//!
//! # Examples
//!
//! ```
//! use station_devices::broker::MemoryBroker;
//! use station_devices::component::ComponentConfig;
//! use station_devices::device::satellit::{self, Satellit};
//! use station_devices::device::Device;
//! use station_devices::transport::MemoryTransport;
//!
//! # async fn example() -> station_devices::Result<()> {
//! let transport = MemoryTransport::new();
//! let broker = MemoryBroker::new();
//!
//! let mut device: Device<Satellit, _, _> =
//!     Device::new(Satellit::default_config(), transport, broker.clone())?;
//! device.add_component(satellit::chargepoint::default_config())?;
//!
//! let report = device.update().await;
//! for failed in report.failed() {
//!     println!("{} failed: {:?}", failed.info.name, failed.outcome);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod report;
pub mod satellit;
pub mod studer;

pub use config::{DeviceConfig, DeviceSettings};
pub use report::{ComponentReport, UpdateReport};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::Instrument;

use crate::broker::Broker;
use crate::component::{Component, ComponentConfig, ComponentInfo, UpdateContext};
use crate::error::ConfigError;
use crate::transport::Transport;
use crate::types::ComponentId;

/// A family of devices sharing one closed set of component types.
///
/// `create_component` is the family's registry: it matches the record's type
/// tag against the supported types and builds the corresponding driver, bound
/// to the device's transport and broker.
pub trait DeviceFamily<T, B> {
    /// The component enum of this family.
    type Component: Component;

    /// Device `type` tag of this family.
    const DEVICE_TYPE: &'static str;

    /// Component `type` tags this family accepts.
    const SUPPORTED_TYPES: &'static [&'static str];

    /// Builds the component described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnsupportedComponentType` for a type tag outside
    /// [`SUPPORTED_TYPES`](Self::SUPPORTED_TYPES), or
    /// `ConfigError::InvalidComponentConfig` if the settings are malformed.
    fn create_component(
        config: &ComponentConfig,
        transport: Arc<T>,
        broker: B,
    ) -> Result<Self::Component, ConfigError>;
}

/// Builds the error for a component type outside a family's registry.
pub(crate) fn unsupported_type(component_type: &str, allowed: &[&'static str]) -> ConfigError {
    ConfigError::UnsupportedComponentType {
        component_type: component_type.to_string(),
        allowed: allowed.to_vec(),
    }
}

/// A field device: one transport endpoint plus its components.
///
/// Components are kept in ascending id order, which is also the order they are
/// updated in. [`update`](Self::update) takes `&mut self`, so update cycles of
/// one device can never overlap; different devices may be updated
/// concurrently.
pub struct Device<F, T, B>
where
    F: DeviceFamily<T, B>,
{
    config: DeviceConfig,
    transport: Arc<T>,
    broker: B,
    components: BTreeMap<ComponentId, F::Component>,
    span: tracing::Span,
}

impl<F, T, B> Device<F, T, B>
where
    F: DeviceFamily<T, B>,
    T: Transport,
    B: Broker + Clone,
{
    /// Creates a device without components.
    ///
    /// `transport` must be bound to [`DeviceConfig::endpoint`]; all components
    /// added later share it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDeviceConfig` if the configuration belongs
    /// to another device family or its IP address is invalid.
    pub fn new(config: DeviceConfig, transport: T, broker: B) -> Result<Self, ConfigError> {
        if config.device_type != F::DEVICE_TYPE {
            return Err(ConfigError::InvalidDeviceConfig(format!(
                "device type '{}' does not match '{}'",
                config.device_type,
                F::DEVICE_TYPE
            )));
        }
        let endpoint = config.endpoint()?;

        let span = tracing::info_span!(
            "device",
            name = %config.name,
            id = config.id,
            endpoint = %endpoint
        );

        Ok(Self {
            config,
            transport: Arc::new(transport),
            broker,
            components: BTreeMap::new(),
            span,
        })
    }

    /// Returns the device configuration.
    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Returns the device name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Adds the component described by `config`.
    ///
    /// A component with the same id replaces the existing one.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the type is not supported by this device
    /// family or its settings are invalid. The device is left unchanged.
    pub fn add_component(&mut self, config: ComponentConfig) -> Result<ComponentId, ConfigError> {
        let id = config.id();
        let component =
            F::create_component(&config, Arc::clone(&self.transport), self.broker.clone())?;

        let _entered = self.span.enter();
        if self.components.insert(id, component).is_some() {
            tracing::debug!(component = %id, "Replaced existing component");
        }
        tracing::debug!(
            component = %id,
            component_type = %config.component_type,
            "Component added"
        );
        Ok(id)
    }

    /// Removes a component, returning whether it existed.
    pub fn remove_component(&mut self, id: ComponentId) -> bool {
        self.components.remove(&id).is_some()
    }

    /// Returns the ids of all components in update order.
    #[must_use]
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.components.keys().copied().collect()
    }

    /// Returns the identity of all components in update order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.components.values().map(Component::info)
    }

    /// Returns the number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if no component is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Runs one update cycle over all components.
    ///
    /// Never fails. Component failures are logged and listed in the report.
    /// A device without components logs a warning and returns an inert report.
    pub async fn update(&mut self) -> UpdateReport {
        let span = self.span.clone();
        self.run_cycle().instrument(span).await
    }

    async fn run_cycle(&self) -> UpdateReport {
        let mut report = UpdateReport::start(&self.config.name);

        if self.components.is_empty() {
            tracing::warn!(
                device = %self.config.name,
                "No values read, no components configured"
            );
            return report.finish();
        }

        tracing::debug!(components = ?self.component_ids(), "Starting device update");

        for component in self.components.values() {
            let info = component.info();
            let outcome = UpdateContext::new(info).run(component.update()).await;
            report.record(info.clone(), outcome);
        }

        let report = report.finish();
        tracing::debug!(
            updated = report.updated_count(),
            failed = report.failed_count(),
            "Device update finished"
        );
        report
    }
}

impl<F, T, B> fmt::Debug for Device<F, T, B>
where
    F: DeviceFamily<T, B>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.config.name)
            .field("type", &self.config.device_type)
            .field("id", &self.config.id)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
