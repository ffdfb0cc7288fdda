// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broker capability for publishing state.
//!
//! Value stores hand their publications to a [`Broker`]. Two implementations
//! ship with the crate:
//!
//! - [`MqttBroker`]: a persistent MQTT connection (feature `mqtt`)
//! - [`MemoryBroker`]: records publications in memory, for simulations and tests
//!
//! Topic storage, persistence and delivery belong to the broker; this crate
//! only decides what gets published where.

mod memory;
#[cfg(feature = "mqtt")]
mod mqtt;

pub use memory::MemoryBroker;
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttBroker, MqttBrokerBuilder};

use serde::Serialize;

use crate::error::PublishError;

/// Delivery guarantee requested for a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum QoS {
    /// Fire and forget.
    AtMostOnce,
    /// Acknowledged delivery, possibly duplicated.
    #[default]
    AtLeastOnce,
    /// Acknowledged delivery without duplicates.
    ExactlyOnce,
}

impl QoS {
    /// Returns the MQTT level (0, 1 or 2).
    #[must_use]
    pub const fn level(&self) -> u8 {
        match self {
            Self::AtMostOnce => 0,
            Self::AtLeastOnce => 1,
            Self::ExactlyOnce => 2,
        }
    }
}

#[cfg(feature = "mqtt")]
impl From<QoS> for rumqttc::QoS {
    fn from(qos: QoS) -> Self {
        match qos {
            QoS::AtMostOnce => Self::AtMostOnce,
            QoS::AtLeastOnce => Self::AtLeastOnce,
            QoS::ExactlyOnce => Self::ExactlyOnce,
        }
    }
}

/// One message handed to a broker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Publication {
    /// Hierarchical topic string.
    pub topic: String,
    /// Encoded payload.
    pub payload: Vec<u8>,
    /// Requested delivery guarantee.
    pub qos: QoS,
    /// Whether the broker should retain the message for late subscribers.
    pub retain: bool,
}

impl Publication {
    /// Returns the payload as UTF-8 text, if it is valid UTF-8.
    #[must_use]
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Capability to publish messages to a publish/subscribe broker.
#[allow(async_fn_in_trait)]
pub trait Broker {
    /// Publishes `payload` on `topic`.
    ///
    /// # Errors
    ///
    /// Returns `PublishError` if the broker is unreachable or refuses the
    /// message.
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
        retain: bool,
    ) -> Result<(), PublishError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qos_levels() {
        assert_eq!(QoS::AtMostOnce.level(), 0);
        assert_eq!(QoS::AtLeastOnce.level(), 1);
        assert_eq!(QoS::ExactlyOnce.level(), 2);
        assert_eq!(QoS::default(), QoS::AtLeastOnce);
    }

    #[test]
    fn payload_as_text() {
        let publication = Publication {
            topic: "a/b".to_string(),
            payload: b"123.4".to_vec(),
            qos: QoS::AtLeastOnce,
            retain: true,
        };
        assert_eq!(publication.payload_str(), Some("123.4"));
    }
}
