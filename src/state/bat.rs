// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Battery storage state.

use serde::Serialize;

use super::{finite, in_range, non_negative};
use crate::error::ValueError;

/// State of a battery storage unit.
///
/// Power is positive while charging and negative while discharging. Energy
/// counters are in Wh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatState {
    power: f64,
    soc: f64,
    imported: f64,
    exported: f64,
}

impl BatState {
    /// Creates a validated battery state.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if a value is not finite, the state of charge is
    /// outside 0-100 %, or a counter is negative.
    pub fn new(power: f64, soc: f64, imported: f64, exported: f64) -> Result<Self, ValueError> {
        Ok(Self {
            power: finite("power", power)?,
            soc: in_range("soc", soc, 0.0, 100.0)?,
            imported: non_negative("imported", imported)?,
            exported: non_negative("exported", exported)?,
        })
    }

    /// Charging power in W.
    #[must_use]
    pub fn power(&self) -> f64 {
        self.power
    }

    /// State of charge in percent.
    #[must_use]
    pub fn soc(&self) -> f64 {
        self.soc
    }

    /// Energy charged into the battery in Wh.
    #[must_use]
    pub fn imported(&self) -> f64 {
        self.imported
    }

    /// Energy discharged from the battery in Wh.
    #[must_use]
    pub fn exported(&self) -> f64 {
        self.exported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_state() {
        let state = BatState::new(2500.0, 50.5, 1.0, 2.0).unwrap();
        assert_eq!(state.power(), 2500.0);
        assert_eq!(state.soc(), 50.5);
    }

    #[test]
    fn rejects_nan_power() {
        assert_eq!(
            BatState::new(f64::NAN, 50.0, 0.0, 0.0),
            Err(ValueError::NotFinite("power"))
        );
    }

    #[test]
    fn rejects_negative_counter() {
        assert!(matches!(
            BatState::new(0.0, 50.0, -1.0, 0.0),
            Err(ValueError::OutOfRange {
                field: "imported",
                ..
            })
        ));
    }
}
