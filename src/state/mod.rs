// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Component state snapshots.
//!
//! A snapshot is the immutable result of one component update. Snapshots can
//! only be created through validating constructors, so a value that exists is
//! fully populated and safe to publish. A reading that fails validation yields
//! a [`ValueError`] instead of a partial snapshot.
//!
//! # Examples
//!
//! ```
//! use station_devices::state::BatState;
//!
//! let state = BatState::new(-1500.0, 64.0, 12000.0, 9000.0).unwrap();
//! assert_eq!(state.soc(), 64.0);
//!
//! assert!(BatState::new(0.0, 140.0, 0.0, 0.0).is_err());
//! ```

mod bat;
mod chargepoint;
mod inverter;

pub use bat::BatState;
pub use chargepoint::{ChargepointState, ChargepointStateBuilder};
pub use inverter::InverterState;

use crate::error::ValueError;

fn finite(field: &'static str, value: f64) -> Result<f64, ValueError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValueError::NotFinite(field))
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ValueError> {
    let value = finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValueError::OutOfRange {
            field,
            min,
            max,
            actual: value,
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ValueError> {
    in_range(field, value, 0.0, f64::MAX)
}
