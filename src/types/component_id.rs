// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Component identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a component within its device.
///
/// The id comes from the component's configuration record and doubles as the
/// entity number in published topics. Ordering follows the numeric value, which
/// is the order a device updates its components in.
///
/// # Examples
///
/// ```
/// use station_devices::types::ComponentId;
///
/// let id = ComponentId::new(7);
/// assert_eq!(id.value(), 7);
/// assert_eq!(id.to_string(), "component7");
/// assert!(ComponentId::new(2) < ComponentId::new(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(u32);

impl ComponentId {
    /// Creates a component identifier from its configured number.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the configured number.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component{}", self.0)
    }
}

impl From<u32> for ComponentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_numerically() {
        let mut ids = vec![ComponentId::new(10), ComponentId::new(2), ComponentId::new(7)];
        ids.sort();
        assert_eq!(
            ids,
            vec![ComponentId::new(2), ComponentId::new(7), ComponentId::new(10)]
        );
    }

    #[test]
    fn serializes_as_number() {
        let json = serde_json::to_string(&ComponentId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
