// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity and value types shared by devices, components and stores.
//!
//! # Types
//!
//! - [`ComponentId`] - Device-unique numeric component identifier
//! - [`ComponentKind`] - The kind of physical unit a component drives
//! - [`ChargeState`] - Whether a chargepoint is currently charging
//! - [`PlugState`] - Whether a vehicle is plugged into a chargepoint

mod component_id;
mod component_kind;
mod vehicle;

pub use component_id::ComponentId;
pub use component_kind::ComponentKind;
pub use vehicle::{ChargeState, PlugState};
