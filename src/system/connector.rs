// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connections to the brokers of remote controllers.

use crate::broker::Broker;
use crate::error::PublishError;

/// Opens short-lived broker connections to remote controllers.
#[allow(async_fn_in_trait)]
pub trait RemoteConnector {
    /// Broker handle of one remote controller.
    type Broker: Broker;

    /// Connects to the broker of the controller at `host`.
    ///
    /// # Errors
    ///
    /// Returns `PublishError` if the remote broker cannot be reached.
    async fn connect(&self, host: &str) -> Result<Self::Broker, PublishError>;

    /// Closes a connection opened by [`connect`](Self::connect).
    async fn release(&self, broker: Self::Broker) {
        drop(broker);
    }
}

#[cfg(feature = "mqtt")]
pub use mqtt::MqttConnector;

#[cfg(feature = "mqtt")]
mod mqtt {
    use std::time::Duration;

    use super::RemoteConnector;
    use crate::broker::MqttBroker;
    use crate::error::PublishError;

    /// Connects to remote controllers over MQTT.
    #[derive(Debug, Clone)]
    pub struct MqttConnector {
        port: u16,
        connection_timeout: Duration,
    }

    impl Default for MqttConnector {
        fn default() -> Self {
            Self {
                port: 1883,
                connection_timeout: Duration::from_secs(5),
            }
        }
    }

    impl MqttConnector {
        /// Creates a connector using port 1883.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Sets the broker port of remote controllers.
        #[must_use]
        pub fn port(mut self, port: u16) -> Self {
            self.port = port;
            self
        }

        /// Sets the connection timeout.
        #[must_use]
        pub fn connection_timeout(mut self, timeout: Duration) -> Self {
            self.connection_timeout = timeout;
            self
        }
    }

    impl RemoteConnector for MqttConnector {
        type Broker = MqttBroker;

        async fn connect(&self, host: &str) -> Result<MqttBroker, PublishError> {
            MqttBroker::builder()
                .host(host)
                .port(self.port)
                .connection_timeout(self.connection_timeout)
                .build()
                .await
        }

        async fn release(&self, broker: MqttBroker) {
            if let Err(e) = broker.disconnect().await {
                tracing::warn!(host = %broker.host(), error = %e, "Failed to disconnect from remote broker");
            }
        }
    }
}
