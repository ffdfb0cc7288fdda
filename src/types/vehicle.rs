// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vehicle-facing chargepoint states.
//!
//! Both states go over the wire as JSON booleans, which is what consumers of
//! the `charge_state` and `plug_state` topics expect.

use std::fmt;

use serde::{Serialize, Serializer};

/// Whether a chargepoint is delivering energy to a vehicle.
///
/// # Examples
///
/// ```
/// use station_devices::types::ChargeState;
///
/// assert_eq!(ChargeState::from(true), ChargeState::Charging);
/// assert_eq!(serde_json::to_string(&ChargeState::Idle).unwrap(), "false");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChargeState {
    /// No energy flows to the vehicle.
    #[default]
    Idle,
    /// The vehicle is charging.
    Charging,
}

impl ChargeState {
    /// Returns `true` while charging.
    #[must_use]
    pub const fn is_charging(&self) -> bool {
        matches!(self, Self::Charging)
    }
}

impl From<bool> for ChargeState {
    fn from(value: bool) -> Self {
        if value { Self::Charging } else { Self::Idle }
    }
}

impl fmt::Display for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Charging => f.write_str("charging"),
        }
    }
}

impl Serialize for ChargeState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_charging())
    }
}

/// Whether a vehicle is connected to a chargepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlugState {
    /// No vehicle connected.
    #[default]
    Unplugged,
    /// A vehicle is connected.
    Plugged,
}

impl PlugState {
    /// Returns `true` if a vehicle is connected.
    #[must_use]
    pub const fn is_plugged(&self) -> bool {
        matches!(self, Self::Plugged)
    }
}

impl From<bool> for PlugState {
    fn from(value: bool) -> Self {
        if value { Self::Plugged } else { Self::Unplugged }
    }
}

impl fmt::Display for PlugState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unplugged => f.write_str("unplugged"),
            Self::Plugged => f.write_str("plugged"),
        }
    }
}

impl Serialize for PlugState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_plugged())
    }
}
