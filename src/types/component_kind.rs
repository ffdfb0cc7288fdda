// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Component kind tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of physical unit a component drives.
///
/// Besides identifying the component in logs, the kind selects the entity
/// segment of the topics its state is published under.
///
/// # Examples
///
/// ```
/// use station_devices::types::ComponentKind;
///
/// assert_eq!(ComponentKind::Bat.as_str(), "bat");
/// assert_eq!(ComponentKind::Inverter.topic_segment(), "pv");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Home or station battery storage.
    Bat,
    /// Photovoltaic inverter or charge controller.
    Inverter,
    /// Chargepoint with its own meter and EVSE.
    Chargepoint,
}

impl ComponentKind {
    /// Returns the tag used in configuration records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bat => "bat",
            Self::Inverter => "inverter",
            Self::Chargepoint => "chargepoint",
        }
    }

    /// Returns the entity segment of published topics.
    #[must_use]
    pub const fn topic_segment(&self) -> &'static str {
        match self {
            Self::Bat => "bat",
            Self::Inverter => "pv",
            Self::Chargepoint => "chargepoint",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
