// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PV value store.

use super::{StatePublisher, ValueStore};
use crate::broker::Broker;
use crate::error::PublishError;
use crate::state::InverterState;
use crate::types::{ComponentId, ComponentKind};

/// Publishes [`InverterState`] snapshots to `openWB/set/pv/<id>/get/{power,counter}`.
#[derive(Debug, Clone)]
pub struct PvValueStore<B> {
    broker: B,
    id: ComponentId,
}

impl<B: Broker> PvValueStore<B> {
    /// Creates a store for the inverter with number `id`.
    #[must_use]
    pub fn new(broker: B, id: ComponentId) -> Self {
        Self { broker, id }
    }
}

impl<B: Broker> ValueStore<InverterState> for PvValueStore<B> {
    async fn set(&self, state: &InverterState) -> Result<(), PublishError> {
        let mut publisher = StatePublisher::new(&self.broker, ComponentKind::Inverter, self.id);
        publisher.field("power", &state.power()).await;
        publisher.field("counter", &state.counter()).await;
        publisher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBroker;

    #[tokio::test]
    async fn publishes_power_then_counter() {
        let broker = MemoryBroker::new();
        let store = PvValueStore::new(broker.clone(), ComponentId::new(3));

        store
            .set(&InverterState::new(-1520.456, 8000.0).unwrap())
            .await
            .unwrap();

        let publications = broker.publications();
        let topics: Vec<_> = publications.iter().map(|p| p.topic.as_str()).collect();
        assert_eq!(
            topics,
            vec!["openWB/set/pv/3/get/power", "openWB/set/pv/3/get/counter"]
        );
        assert_eq!(publications[0].payload_str(), Some("-1520.46"));
        assert_eq!(publications[1].payload_str(), Some("8000.0"));
        assert!(publications.iter().all(|p| p.retain));
    }

    #[tokio::test]
    async fn rejected_power_still_publishes_counter() {
        let broker = MemoryBroker::new();
        broker.reject_topic("openWB/set/pv/3/get/power");
        let store = PvValueStore::new(broker.clone(), ComponentId::new(3));

        let err = store
            .set(&InverterState::new(-10.0, 20.0).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Rejected(_)));
        assert_eq!(
            broker.last_payload("openWB/set/pv/3/get/counter").as_deref(),
            Some("20.0")
        );
    }
}
