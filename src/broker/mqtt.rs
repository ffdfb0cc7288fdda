// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT broker connection.
//!
//! One connection is usually shared by every device of a station: all value
//! stores publish through clones of the same [`MqttBroker`].
//!
//! # Examples
//!
//! ```no_run
//! use station_devices::broker::MqttBroker;
//!
//! # async fn example() -> Result<(), station_devices::error::PublishError> {
//! let broker = MqttBroker::builder()
//!     .host("localhost")
//!     .port(1886)
//!     .build()
//!     .await?;
//!
//! // Every clone publishes over the same connection
//! let for_second_device = broker.clone();
//! # drop(for_second_device);
//!
//! broker.disconnect().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet};
use tokio::sync::oneshot;
use uuid::Uuid;

use super::{Broker, QoS};
use crate::error::PublishError;

/// Capacity of the request queue between client and event loop.
const REQUEST_CAPACITY: usize = 64;

/// A persistent MQTT connection used to publish state.
#[derive(Clone)]
pub struct MqttBroker {
    client: AsyncClient,
    endpoint: Arc<(String, u16)>,
    connected: Arc<AtomicBool>,
}

impl std::fmt::Debug for MqttBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttBroker")
            .field("host", &self.host())
            .field("port", &self.port())
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl MqttBroker {
    /// Creates a builder for a broker connection.
    #[must_use]
    pub fn builder() -> MqttBrokerBuilder {
        MqttBrokerBuilder::default()
    }

    /// Returns whether the connection is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Broker host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.endpoint.0
    }

    /// Broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.endpoint.1
    }

    /// Disconnects from the broker. Later publications fail with
    /// `PublishError::NotConnected`.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be queued.
    pub async fn disconnect(&self) -> Result<(), PublishError> {
        self.connected.store(false, Ordering::Release);
        self.client.disconnect().await?;
        Ok(())
    }
}

impl Broker for MqttBroker {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
        retain: bool,
    ) -> Result<(), PublishError> {
        if !self.is_connected() {
            return Err(PublishError::NotConnected(format!(
                "{}:{}",
                self.host(),
                self.port()
            )));
        }

        self.client.publish(topic, qos.into(), retain, payload).await?;
        tracing::trace!(topic = %topic, qos = qos.level(), retain, "Queued publication");
        Ok(())
    }
}

/// Builder for [`MqttBroker`].
#[derive(Debug)]
pub struct MqttBrokerBuilder {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    connection_timeout: Duration,
}

impl Default for MqttBrokerBuilder {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            credentials: None,
            connection_timeout: Duration::from_secs(10),
        }
    }
}

impl MqttBrokerBuilder {
    /// Sets the broker host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets username and password.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets how long to wait for the broker's `ConnAck` (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Connects and waits until the broker accepts the session.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::NotConnected` if no host is set, the connection
    /// fails, or the broker does not answer within the connection timeout.
    pub async fn build(self) -> Result<MqttBroker, PublishError> {
        if self.host.is_empty() {
            return Err(PublishError::NotConnected(
                "MQTT broker host is required".to_string(),
            ));
        }

        let client_id = format!("station_devices_{}", Uuid::new_v4().simple());
        let mut options = MqttOptions::new(&client_id, &self.host, self.port);
        options.set_clean_session(true);
        if let Some((username, password)) = &self.credentials {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));
        let (connack_tx, connack_rx) = oneshot::channel();
        tokio::spawn(drive_event_loop(
            event_loop,
            Arc::clone(&connected),
            connack_tx,
        ));

        match tokio::time::timeout(self.connection_timeout, connack_rx).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                return Err(PublishError::NotConnected(format!(
                    "connection to {}:{} failed",
                    self.host, self.port
                )));
            }
            Err(_) => {
                return Err(PublishError::NotConnected(format!(
                    "no answer from {}:{} within {} ms",
                    self.host,
                    self.port,
                    self.connection_timeout.as_millis()
                )));
            }
        }

        tracing::info!(host = %self.host, port = self.port, %client_id, "Connected to MQTT broker");
        Ok(MqttBroker {
            client,
            endpoint: Arc::new((self.host, self.port)),
            connected,
        })
    }
}

/// Polls the event loop until the connection ends, tracking its state.
///
/// `connack` fires on the first accepted session; dropping it unanswered
/// tells the builder the connection failed.
async fn drive_event_loop(
    mut event_loop: EventLoop,
    connected: Arc<AtomicBool>,
    connack: oneshot::Sender<()>,
) {
    let mut connack = Some(connack);

    loop {
        let ended = match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                connected.store(true, Ordering::Release);
                if let Some(tx) = connack.take() {
                    let _ = tx.send(());
                }
                false
            }
            Ok(Event::Incoming(Packet::Disconnect) | Event::Outgoing(Outgoing::Disconnect)) => {
                tracing::debug!("MQTT session closed");
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::error!(error = %e, "MQTT connection lost");
                true
            }
        };

        if ended {
            connected.store(false, Ordering::Release);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = MqttBrokerBuilder::default();
        assert_eq!(builder.port, 1883);
        assert!(builder.host.is_empty());
        assert!(builder.credentials.is_none());
        assert_eq!(builder.connection_timeout, Duration::from_secs(10));
    }

    #[test]
    fn builder_chain() {
        let builder = MqttBroker::builder()
            .host("192.168.193.5")
            .port(1886)
            .credentials("openwb", "secret")
            .connection_timeout(Duration::from_secs(3));

        assert_eq!(builder.host, "192.168.193.5");
        assert_eq!(builder.port, 1886);
        assert_eq!(
            builder.credentials,
            Some(("openwb".to_string(), "secret".to_string()))
        );
        assert_eq!(builder.connection_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn missing_host_fails() {
        let result = MqttBroker::builder().build().await;
        assert!(matches!(result, Err(PublishError::NotConnected(_))));
    }

    #[test]
    fn qos_maps_to_rumqttc() {
        assert_eq!(rumqttc::QoS::from(QoS::AtMostOnce), rumqttc::QoS::AtMostOnce);
        assert_eq!(rumqttc::QoS::from(QoS::AtLeastOnce), rumqttc::QoS::AtLeastOnce);
        assert_eq!(rumqttc::QoS::from(QoS::ExactlyOnce), rumqttc::QoS::ExactlyOnce);
    }
}
