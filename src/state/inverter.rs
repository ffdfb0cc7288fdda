// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PV inverter state.

use serde::Serialize;

use super::{finite, non_negative};
use crate::error::ValueError;

/// State of a PV inverter or a group of charge controllers.
///
/// Generated power is reported as a negative value in W, the counter holds the
/// produced energy in Wh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InverterState {
    power: f64,
    counter: f64,
}

impl InverterState {
    /// Creates a validated inverter state.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if power is not finite or the counter is negative.
    pub fn new(power: f64, counter: f64) -> Result<Self, ValueError> {
        Ok(Self {
            power: finite("power", power)?,
            counter: non_negative("counter", counter)?,
        })
    }

    /// Power in W, negative while generating.
    #[must_use]
    pub fn power(&self) -> f64 {
        self.power
    }

    /// Produced energy in Wh.
    #[must_use]
    pub fn counter(&self) -> f64 {
        self.counter
    }
}
