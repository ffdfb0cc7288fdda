// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Components and their configuration records.
//!
//! A component drives one physical unit behind a device's transport. Each
//! [`Component::update`] reads fresh registers, builds a state snapshot and
//! hands it to the component's value store; nothing is cached between cycles.
//!
//! Failures are returned, never swallowed: the [`UpdateContext`] a device
//! wraps around each update decides what happens to them.

mod config;
mod context;

pub use config::ComponentConfig;
pub use context::{ComponentOutcome, UpdateContext};

use serde::Serialize;

use crate::error::Error;
use crate::types::{ComponentId, ComponentKind};

/// Identity of a component, used in logs and update reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ComponentInfo {
    /// Device-unique id, also the entity number in published topics.
    pub id: ComponentId,
    /// Human readable name.
    pub name: String,
    /// What the component drives.
    pub kind: ComponentKind,
}

impl ComponentInfo {
    /// Creates component identity metadata.
    #[must_use]
    pub fn new(id: ComponentId, name: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }
}

/// A driver for one measurement or control unit of a device.
#[allow(async_fn_in_trait)]
pub trait Component {
    /// Returns the component's identity.
    fn info(&self) -> &ComponentInfo;

    /// Reads the unit and publishes one complete state snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, decoding, validating or publishing fails.
    /// No snapshot is published when reading or validation fails.
    async fn update(&self) -> Result<(), Error>;
}
