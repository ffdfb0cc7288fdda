// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Chargepoint state.

use serde::Serialize;

use super::{finite, in_range, non_negative};
use crate::error::ValueError;
use crate::types::{ChargeState, PlugState};

/// Current above which a phase counts as in use, in A.
const PHASE_IN_USE_THRESHOLD: f64 = 1.0;

/// State of a chargepoint: meter readings plus vehicle status.
///
/// Built with [`ChargepointState::builder`]; every field must be provided.
///
/// # Examples
///
/// ```
/// use station_devices::state::ChargepointState;
/// use station_devices::types::{ChargeState, PlugState};
///
/// let state = ChargepointState::builder()
///     .voltages([230.1, 229.8, 231.0])
///     .currents([16.0, 15.9, 0.2])
///     .power_factors([0.98, 0.97, 1.0])
///     .imported(123.4)
///     .exported(0.0)
///     .power(7300.0)
///     .charge_state(ChargeState::Charging)
///     .plug_state(PlugState::Plugged)
///     .build()
///     .unwrap();
///
/// // Derived from the currents when not set explicitly
/// assert_eq!(state.phases_in_use(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargepointState {
    voltages: [f64; 3],
    currents: [f64; 3],
    power_factors: [f64; 3],
    imported: f64,
    exported: f64,
    power: f64,
    phases_in_use: u8,
    charge_state: ChargeState,
    plug_state: PlugState,
}

impl ChargepointState {
    /// Creates a builder for a chargepoint state.
    #[must_use]
    pub fn builder() -> ChargepointStateBuilder {
        ChargepointStateBuilder::default()
    }

    /// Per-phase voltages in V.
    #[must_use]
    pub fn voltages(&self) -> [f64; 3] {
        self.voltages
    }

    /// Per-phase currents in A.
    #[must_use]
    pub fn currents(&self) -> [f64; 3] {
        self.currents
    }

    /// Per-phase power factors.
    #[must_use]
    pub fn power_factors(&self) -> [f64; 3] {
        self.power_factors
    }

    /// Imported energy in Wh.
    #[must_use]
    pub fn imported(&self) -> f64 {
        self.imported
    }

    /// Exported energy in Wh.
    #[must_use]
    pub fn exported(&self) -> f64 {
        self.exported
    }

    /// Total active power over all phases in W.
    #[must_use]
    pub fn power(&self) -> f64 {
        self.power
    }

    /// Number of phases currently drawing current.
    #[must_use]
    pub fn phases_in_use(&self) -> u8 {
        self.phases_in_use
    }

    /// Whether the vehicle is charging.
    #[must_use]
    pub fn charge_state(&self) -> ChargeState {
        self.charge_state
    }

    /// Whether a vehicle is plugged in.
    #[must_use]
    pub fn plug_state(&self) -> PlugState {
        self.plug_state
    }
}

/// Builder for [`ChargepointState`].
#[derive(Debug, Clone, Default)]
pub struct ChargepointStateBuilder {
    voltages: Option<[f64; 3]>,
    currents: Option<[f64; 3]>,
    power_factors: Option<[f64; 3]>,
    imported: Option<f64>,
    exported: Option<f64>,
    power: Option<f64>,
    phases_in_use: Option<u8>,
    charge_state: Option<ChargeState>,
    plug_state: Option<PlugState>,
}

impl ChargepointStateBuilder {
    /// Sets per-phase voltages in V.
    #[must_use]
    pub fn voltages(mut self, voltages: [f64; 3]) -> Self {
        self.voltages = Some(voltages);
        self
    }

    /// Sets per-phase currents in A.
    #[must_use]
    pub fn currents(mut self, currents: [f64; 3]) -> Self {
        self.currents = Some(currents);
        self
    }

    /// Sets per-phase power factors.
    #[must_use]
    pub fn power_factors(mut self, power_factors: [f64; 3]) -> Self {
        self.power_factors = Some(power_factors);
        self
    }

    /// Sets imported energy in Wh.
    #[must_use]
    pub fn imported(mut self, imported: f64) -> Self {
        self.imported = Some(imported);
        self
    }

    /// Sets exported energy in Wh.
    #[must_use]
    pub fn exported(mut self, exported: f64) -> Self {
        self.exported = Some(exported);
        self
    }

    /// Sets total active power in W.
    #[must_use]
    pub fn power(mut self, power: f64) -> Self {
        self.power = Some(power);
        self
    }

    /// Overrides the number of phases in use (derived from currents otherwise).
    #[must_use]
    pub fn phases_in_use(mut self, phases: u8) -> Self {
        self.phases_in_use = Some(phases);
        self
    }

    /// Sets the charge state.
    #[must_use]
    pub fn charge_state(mut self, state: ChargeState) -> Self {
        self.charge_state = Some(state);
        self
    }

    /// Sets the plug state.
    #[must_use]
    pub fn plug_state(mut self, state: PlugState) -> Self {
        self.plug_state = Some(state);
        self
    }

    /// Validates all fields and builds the state.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::Missing` if a field was not set, and
    /// `NotFinite`/`OutOfRange` if a value is invalid (power factors must lie
    /// within -1..=1, energies must not be negative, at most 3 phases).
    pub fn build(self) -> Result<ChargepointState, ValueError> {
        let voltages = phases(
            "voltage",
            self.voltages.ok_or(ValueError::Missing("voltage"))?,
            finite,
        )?;
        let currents = phases(
            "current",
            self.currents.ok_or(ValueError::Missing("current"))?,
            finite,
        )?;
        let power_factors = phases(
            "power_factor",
            self.power_factors
                .ok_or(ValueError::Missing("power_factor"))?,
            |field, value| in_range(field, value, -1.0, 1.0),
        )?;
        let imported = non_negative(
            "imported",
            self.imported.ok_or(ValueError::Missing("imported"))?,
        )?;
        let exported = non_negative(
            "exported",
            self.exported.ok_or(ValueError::Missing("exported"))?,
        )?;
        let power = finite("power", self.power.ok_or(ValueError::Missing("power"))?)?;

        let phases_in_use = match self.phases_in_use {
            Some(count) if count > 3 => {
                return Err(ValueError::OutOfRange {
                    field: "phases_in_use",
                    min: 0.0,
                    max: 3.0,
                    actual: f64::from(count),
                });
            }
            Some(count) => count,
            None => count_phases_in_use(&currents),
        };

        Ok(ChargepointState {
            voltages,
            currents,
            power_factors,
            imported,
            exported,
            power,
            phases_in_use,
            charge_state: self
                .charge_state
                .ok_or(ValueError::Missing("charge_state"))?,
            plug_state: self.plug_state.ok_or(ValueError::Missing("plug_state"))?,
        })
    }
}

fn phases(
    field: &'static str,
    values: [f64; 3],
    check: impl Fn(&'static str, f64) -> Result<f64, ValueError>,
) -> Result<[f64; 3], ValueError> {
    for value in values {
        check(field, value)?;
    }
    Ok(values)
}

#[allow(clippy::cast_possible_truncation)]
fn count_phases_in_use(currents: &[f64; 3]) -> u8 {
    currents
        .iter()
        .filter(|current| current.abs() > PHASE_IN_USE_THRESHOLD)
        .count() as u8
}
