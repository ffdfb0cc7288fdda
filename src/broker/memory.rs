// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory broker that records publications.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Broker, Publication, QoS};
use crate::error::PublishError;

/// A [`Broker`] that keeps every publication in memory.
///
/// Clones share the same log. Topics can be marked as rejected to simulate a
/// broker refusing individual messages.
///
/// # Examples
///
/// ```
/// use station_devices::broker::{Broker, MemoryBroker, QoS};
///
/// # async fn example() -> Result<(), station_devices::error::PublishError> {
/// let broker = MemoryBroker::new();
/// broker.publish("openWB/set/bat/1/get/soc", b"55".to_vec(), QoS::AtLeastOnce, true).await?;
///
/// assert_eq!(broker.publications().len(), 1);
/// assert_eq!(broker.last_payload("openWB/set/bat/1/get/soc").as_deref(), Some("55"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    inner: Arc<Mutex<MemoryBrokerInner>>,
}

#[derive(Debug, Default)]
struct MemoryBrokerInner {
    publications: Vec<Publication>,
    rejected_topics: HashSet<String>,
}

impl MemoryBroker {
    /// Creates an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every publication on `topic` fail with `PublishError::Rejected`.
    pub fn reject_topic(&self, topic: impl Into<String>) {
        self.inner.lock().rejected_topics.insert(topic.into());
    }

    /// Returns all accepted publications in order.
    #[must_use]
    pub fn publications(&self) -> Vec<Publication> {
        self.inner.lock().publications.clone()
    }

    /// Removes and returns all accepted publications.
    pub fn take(&self) -> Vec<Publication> {
        std::mem::take(&mut self.inner.lock().publications)
    }

    /// Returns the payload most recently published on `topic`, as text.
    #[must_use]
    pub fn last_payload(&self, topic: &str) -> Option<String> {
        self.inner
            .lock()
            .publications
            .iter()
            .rev()
            .find(|publication| publication.topic == topic)
            .and_then(|publication| publication.payload_str().map(str::to_string))
    }
}

impl Broker for MemoryBroker {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
        retain: bool,
    ) -> Result<(), PublishError> {
        let mut inner = self.inner.lock();
        if inner.rejected_topics.contains(topic) {
            return Err(PublishError::Rejected(topic.to_string()));
        }
        inner.publications.push(Publication {
            topic: topic.to_string(),
            payload,
            qos,
            retain,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_in_order() {
        let broker = MemoryBroker::new();
        broker
            .publish("a", b"1".to_vec(), QoS::AtLeastOnce, true)
            .await
            .unwrap();
        broker
            .publish("b", b"2".to_vec(), QoS::AtMostOnce, false)
            .await
            .unwrap();

        let publications = broker.publications();
        assert_eq!(publications.len(), 2);
        assert_eq!(publications[0].topic, "a");
        assert_eq!(publications[1].qos, QoS::AtMostOnce);
        assert!(!publications[1].retain);
    }

    #[tokio::test]
    async fn rejected_topic_fails_without_recording() {
        let broker = MemoryBroker::new();
        broker.reject_topic("a");

        let result = broker.publish("a", b"1".to_vec(), QoS::AtLeastOnce, true).await;
        assert!(matches!(result, Err(PublishError::Rejected(topic)) if topic == "a"));
        assert!(broker.publications().is_empty());
    }

    #[tokio::test]
    async fn take_drains_log() {
        let broker = MemoryBroker::new();
        let handle = broker.clone();
        broker
            .publish("a", b"1".to_vec(), QoS::AtLeastOnce, true)
            .await
            .unwrap();

        assert_eq!(handle.take().len(), 1);
        assert!(broker.publications().is_empty());
    }

    #[tokio::test]
    async fn last_payload_wins() {
        let broker = MemoryBroker::new();
        broker
            .publish("a", b"1".to_vec(), QoS::AtLeastOnce, true)
            .await
            .unwrap();
        broker
            .publish("a", b"2".to_vec(), QoS::AtLeastOnce, true)
            .await
            .unwrap();

        assert_eq!(broker.last_payload("a").as_deref(), Some("2"));
        assert_eq!(broker.last_payload("missing"), None);
    }
}
