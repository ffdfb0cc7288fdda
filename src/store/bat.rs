// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Battery value store.

use super::{StatePublisher, ValueStore};
use crate::broker::Broker;
use crate::error::PublishError;
use crate::state::BatState;
use crate::types::{ComponentId, ComponentKind};

/// Publishes [`BatState`] snapshots to `openWB/set/bat/<id>/get/{power,soc,imported,exported}`.
#[derive(Debug, Clone)]
pub struct BatValueStore<B> {
    broker: B,
    id: ComponentId,
}

impl<B: Broker> BatValueStore<B> {
    /// Creates a store for the battery with number `id`.
    #[must_use]
    pub fn new(broker: B, id: ComponentId) -> Self {
        Self { broker, id }
    }
}

impl<B: Broker> ValueStore<BatState> for BatValueStore<B> {
    async fn set(&self, state: &BatState) -> Result<(), PublishError> {
        let mut publisher = StatePublisher::new(&self.broker, ComponentKind::Bat, self.id);
        publisher.field("power", &state.power()).await;
        publisher.field("soc", &state.soc()).await;
        publisher.field("imported", &state.imported()).await;
        publisher.field("exported", &state.exported()).await;
        publisher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBroker;

    #[tokio::test]
    async fn publishes_battery_fields() {
        let broker = MemoryBroker::new();
        let store = BatValueStore::new(broker.clone(), ComponentId::new(2));

        store
            .set(&BatState::new(-812.346, 71.0, 5000.0, 4200.0).unwrap())
            .await
            .unwrap();

        assert_eq!(broker.publications().len(), 4);
        assert_eq!(
            broker.last_payload("openWB/set/bat/2/get/power").as_deref(),
            Some("-812.35")
        );
        assert_eq!(
            broker.last_payload("openWB/set/bat/2/get/soc").as_deref(),
            Some("71.0")
        );
    }
}
