// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Update cycle reports.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::component::{ComponentInfo, ComponentOutcome};

/// Outcome of one component within an update cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentReport {
    /// The component's identity.
    pub info: ComponentInfo,
    /// What happened to it.
    pub outcome: ComponentOutcome,
}

/// Summary of one [`Device::update`](super::Device::update) cycle.
///
/// A report with no component entries is *inert*: the device had nothing to
/// update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    device: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    components: Vec<ComponentReport>,
}

impl UpdateReport {
    pub(crate) fn start(device: &str) -> Self {
        let now = Utc::now();
        Self {
            device: device.to_string(),
            started_at: now,
            finished_at: now,
            components: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, info: ComponentInfo, outcome: ComponentOutcome) {
        self.components.push(ComponentReport { info, outcome });
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Name of the updated device.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    /// When the cycle started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the cycle finished.
    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Per-component outcomes in update order.
    #[must_use]
    pub fn components(&self) -> &[ComponentReport] {
        &self.components
    }

    /// Returns `true` if the device had no components to update.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns `true` if no component failed.
    #[must_use]
    pub fn all_updated(&self) -> bool {
        self.components.iter().all(|c| c.outcome.is_updated())
    }

    /// Number of components updated successfully.
    #[must_use]
    pub fn updated_count(&self) -> usize {
        self.components
            .iter()
            .filter(|c| c.outcome.is_updated())
            .count()
    }

    /// Number of failed components.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.components.len() - self.updated_count()
    }

    /// Components whose update failed.
    pub fn failed(&self) -> impl Iterator<Item = &ComponentReport> {
        self.components.iter().filter(|c| !c.outcome.is_updated())
    }
}
