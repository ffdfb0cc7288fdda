// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Station Devices - polling framework for charging station field hardware.
//!
//! This library reads inverters, batteries and chargepoints over a shared
//! Modbus-TCP transport and publishes their state to an MQTT broker, one
//! topic per value.
//!
//! # Building Blocks
//!
//! - **Transport**: register reads against one endpoint ([`transport::Transport`])
//! - **Device**: owns the transport and the components behind it ([`Device`])
//! - **Component**: reads one unit and builds a validated state snapshot
//! - **Value store**: turns a snapshot into publications ([`store::ValueStore`])
//! - **Broker**: receives the publications ([`broker::Broker`])
//!
//! # Supported Device Families
//!
//! - `studer`: Studer battery (`bat`) and `VarioString`/`VarioTrack` charge
//!   controllers (`inverter`)
//! - `satellit`: satellite chargepoint with meter and EVSE (`chargepoint`)
//!
//! # Fault Isolation
//!
//! A component that fails to read or publish is logged and skipped; the other
//! components of the cycle still run. [`Device::update`] never fails and
//! returns an [`UpdateReport`] with one outcome per component.
//!
//! # Quick Start
//!
//! ```no_run
//! use station_devices::broker::MqttBroker;
//! use station_devices::device::studer::{self, Studer};
//! use station_devices::{ComponentConfig, Device};
//! # use station_devices::transport::MemoryTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let broker = MqttBroker::builder()
//!         .host("localhost")
//!         .port(1886)
//!         .build()
//!         .await?;
//!     # let transport = MemoryTransport::new();
//!
//!     let mut device: Device<Studer, _, _> =
//!         Device::new(Studer::default_config(), transport, broker)?;
//!     device.add_component(studer::bat::default_config())?;
//!     device.add_component(ComponentConfig::new("inverter", 1))?;
//!
//!     loop {
//!         let report = device.update().await;
//!         if !report.all_updated() {
//!             eprintln!("{} component(s) failed", report.failed_count());
//!         }
//!         tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//!     }
//! }
//! ```
//!
//! # Logging
//!
//! The library logs through [`tracing`]. Each device cycle runs inside a span
//! carrying the device name and id; install a subscriber in the application
//! to see the output.

pub mod broker;
pub mod component;
pub mod device;
pub mod error;
pub mod state;
pub mod store;
pub mod system;
pub mod transport;
pub mod types;

#[cfg(feature = "mqtt")]
pub use broker::{MqttBroker, MqttBrokerBuilder};
pub use broker::{Broker, MemoryBroker, Publication, QoS};
pub use component::{Component, ComponentConfig, ComponentInfo, ComponentOutcome, UpdateContext};
pub use device::{ComponentReport, Device, DeviceConfig, DeviceFamily, UpdateReport};
pub use error::{ConfigError, Error, PublishError, Result, TransportError, ValueError};
pub use state::{BatState, ChargepointState, InverterState};
pub use store::ValueStore;
pub use system::{RemoteChargepoint, SystemUpdater};
pub use transport::{MemoryTransport, Transport};
pub use types::{ChargeState, ComponentId, ComponentKind, PlugState};
