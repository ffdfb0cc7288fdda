// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Chargepoint value store.

use super::{StatePublisher, ValueStore};
use crate::broker::Broker;
use crate::error::PublishError;
use crate::state::ChargepointState;
use crate::types::{ComponentId, ComponentKind};

/// Publishes [`ChargepointState`] snapshots of one chargepoint.
///
/// | field | topic suffix |
/// |---|---|
/// | voltages (V, per phase) | `voltage` |
/// | currents (A, per phase) | `current` |
/// | power factors (per phase) | `power_factor` |
/// | imported energy (Wh) | `counter` |
/// | exported energy (Wh) | `exported` |
/// | total power (W) | `power_all` |
/// | phases in use | `phases_in_use` |
/// | charge state | `charge_state` |
/// | plug state | `plug_state` |
#[derive(Debug, Clone)]
pub struct ChargepointValueStore<B> {
    broker: B,
    id: ComponentId,
}

impl<B: Broker> ChargepointValueStore<B> {
    /// Topic suffixes in publication order.
    pub const FIELDS: [&'static str; 9] = [
        "voltage",
        "current",
        "power_factor",
        "counter",
        "exported",
        "power_all",
        "phases_in_use",
        "charge_state",
        "plug_state",
    ];

    /// Creates a store for the chargepoint with number `id`.
    #[must_use]
    pub fn new(broker: B, id: ComponentId) -> Self {
        Self { broker, id }
    }

    /// Returns the chargepoint number.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }
}

impl<B: Broker> ValueStore<ChargepointState> for ChargepointValueStore<B> {
    async fn set(&self, state: &ChargepointState) -> Result<(), PublishError> {
        let mut publisher = StatePublisher::new(&self.broker, ComponentKind::Chargepoint, self.id);
        publisher.field("voltage", &state.voltages()).await;
        publisher.field("current", &state.currents()).await;
        publisher.field("power_factor", &state.power_factors()).await;
        publisher.field("counter", &state.imported()).await;
        publisher.field("exported", &state.exported()).await;
        publisher.field("power_all", &state.power()).await;
        publisher.field("phases_in_use", &state.phases_in_use()).await;
        publisher.field("charge_state", &state.charge_state()).await;
        publisher.field("plug_state", &state.plug_state()).await;
        publisher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBroker;
    use crate::types::{ChargeState, PlugState};

    fn state(imported: f64) -> ChargepointState {
        ChargepointState::builder()
            .voltages([230.0, 231.5, 229.0])
            .currents([16.0, 16.0, 0.0])
            .power_factors([0.99, 0.98, 1.0])
            .imported(imported)
            .exported(0.0)
            .power(7360.0)
            .charge_state(ChargeState::Charging)
            .plug_state(PlugState::Plugged)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn publishes_every_field_in_order() {
        let broker = MemoryBroker::new();
        let store = ChargepointValueStore::new(broker.clone(), ComponentId::new(7));

        store.set(&state(123.4)).await.unwrap();

        let topics: Vec<String> = broker
            .publications()
            .into_iter()
            .map(|publication| publication.topic)
            .collect();
        let expected: Vec<String> = ChargepointValueStore::<MemoryBroker>::FIELDS
            .iter()
            .map(|field| format!("openWB/set/chargepoint/7/get/{field}"))
            .collect();
        assert_eq!(topics, expected);
    }

    #[tokio::test]
    async fn imported_energy_goes_to_counter() {
        let broker = MemoryBroker::new();
        let store = ChargepointValueStore::new(broker.clone(), ComponentId::new(7));

        store.set(&state(123.4)).await.unwrap();
        store.set(&state(123.4)).await.unwrap();

        let counters: Vec<_> = broker
            .publications()
            .into_iter()
            .filter(|publication| publication.topic == "openWB/set/chargepoint/7/get/counter")
            .collect();
        assert_eq!(counters.len(), 2);
        assert!(counters.iter().all(|p| p.payload_str() == Some("123.4")));
    }

    #[tokio::test]
    async fn payload_encoding() {
        let broker = MemoryBroker::new();
        let store = ChargepointValueStore::new(broker.clone(), ComponentId::new(1));

        store.set(&state(0.0)).await.unwrap();

        let payload = |field: &str| {
            broker
                .last_payload(&format!("openWB/set/chargepoint/1/get/{field}"))
                .unwrap()
        };
        assert_eq!(payload("voltage"), "[230.0,231.5,229.0]");
        assert_eq!(payload("phases_in_use"), "2");
        assert_eq!(payload("charge_state"), "true");
        assert_eq!(payload("plug_state"), "true");
    }

    #[tokio::test]
    async fn rejected_field_does_not_stop_the_rest() {
        let broker = MemoryBroker::new();
        broker.reject_topic("openWB/set/chargepoint/1/get/voltage");
        let store = ChargepointValueStore::new(broker.clone(), ComponentId::new(1));

        let result = store.set(&state(1.0)).await;

        assert!(matches!(result, Err(PublishError::Rejected(_))));
        assert_eq!(broker.publications().len(), 8);
    }
}
