// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Software update of the controller and its external chargepoints.
//!
//! [`SystemUpdater::perform_update`] is a one-shot fan-out: it flags the update
//! on the local broker, asks every chargepoint that is connected as an
//! external controller to update itself, waits a grace period and runs the
//! restart command. There is no acknowledgement or rollback; failures are
//! logged and the remaining steps still run.

mod connector;

#[cfg(feature = "mqtt")]
pub use connector::MqttConnector;
pub use connector::RemoteConnector;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::broker::{Broker, QoS};
use crate::error::PublishError;
use crate::store::{NAMESPACE, STATE_QOS, encode_payload};

/// Time given to remote controllers before the local restart.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(15);

/// Command that restarts the local controller.
pub const DEFAULT_RESTART_COMMAND: &str = "./runs/atreboot.sh";

/// Release train remote controllers use for the stable channel.
pub const STABLE_RELEASE_TRAIN: &str = "stable17";

/// How a chargepoint is attached to this controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "selected", rename_all = "snake_case")]
pub enum ChargepointConnection {
    /// Another controller, reachable through its own broker.
    ExternalOpenwb {
        /// IP address of the remote controller.
        ip_address: String,
    },
    /// Hardware driven by this controller.
    Local,
}

/// A chargepoint known to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteChargepoint {
    /// Chargepoint number.
    pub number: u32,
    /// How the chargepoint is attached.
    pub connection: ChargepointConnection,
}

impl RemoteChargepoint {
    /// Creates a chargepoint attached as an external controller.
    #[must_use]
    pub fn external(number: u32, ip_address: impl Into<String>) -> Self {
        Self {
            number,
            connection: ChargepointConnection::ExternalOpenwb {
                ip_address: ip_address.into(),
            },
        }
    }

    /// Creates a locally driven chargepoint.
    #[must_use]
    pub fn local(number: u32) -> Self {
        Self {
            number,
            connection: ChargepointConnection::Local,
        }
    }
}

/// Maps the configured release train to the one remote controllers expect.
///
/// # Examples
///
/// ```
/// use station_devices::system::resolve_release_train;
///
/// assert_eq!(resolve_release_train("stable"), "stable17");
/// assert_eq!(resolve_release_train("nightly"), "nightly");
/// ```
#[must_use]
pub fn resolve_release_train(release_train: &str) -> &str {
    if release_train == "stable" {
        STABLE_RELEASE_TRAIN
    } else {
        release_train
    }
}

/// What a [`SystemUpdater::perform_update`] run did.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SystemUpdateReport {
    /// Release train sent to the remote controllers.
    pub release_train: String,
    /// Chargepoints whose controller was asked to update.
    pub triggered: Vec<u32>,
    /// Chargepoints whose controller could not be reached.
    pub failed: Vec<u32>,
    /// Whether the restart command ran successfully.
    pub restarted: bool,
}

/// Drives a controller update.
#[derive(Debug, Clone)]
pub struct SystemUpdater<B, R> {
    broker: B,
    connector: R,
    grace_period: Duration,
    restart_command: String,
}

impl<B: Broker, R: RemoteConnector> SystemUpdater<B, R> {
    /// Creates an updater publishing local flags to `broker` and reaching
    /// remote controllers through `connector`.
    #[must_use]
    pub fn new(broker: B, connector: R) -> Self {
        Self {
            broker,
            connector,
            grace_period: DEFAULT_GRACE_PERIOD,
            restart_command: DEFAULT_RESTART_COMMAND.to_string(),
        }
    }

    /// Sets the wait between triggering remote updates and restarting.
    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Sets the restart command.
    #[must_use]
    pub fn with_restart_command(mut self, command: impl Into<String>) -> Self {
        self.restart_command = command.into();
        self
    }

    /// Performs the update. Never fails; see the report for what happened.
    pub async fn perform_update(
        &self,
        release_train: &str,
        chargepoints: &[RemoteChargepoint],
    ) -> SystemUpdateReport {
        let train = resolve_release_train(release_train);
        let mut report = SystemUpdateReport {
            release_train: train.to_string(),
            ..SystemUpdateReport::default()
        };

        if let Err(e) = self.flag_update_in_progress().await {
            tracing::error!(error = %e, "Failed to publish update flags");
        }

        for chargepoint in chargepoints {
            let ChargepointConnection::ExternalOpenwb { ip_address } = &chargepoint.connection
            else {
                continue;
            };

            tracing::info!(chargepoint = chargepoint.number, host = %ip_address, "Triggering update");
            match self.trigger_remote(ip_address, train).await {
                Ok(()) => report.triggered.push(chargepoint.number),
                Err(e) => {
                    tracing::error!(
                        chargepoint = chargepoint.number,
                        host = %ip_address,
                        error = %e,
                        "Failed to trigger update"
                    );
                    report.failed.push(chargepoint.number);
                }
            }
        }

        tokio::time::sleep(self.grace_period).await;
        report.restarted = self.restart().await;
        report
    }

    async fn flag_update_in_progress(&self) -> Result<(), PublishError> {
        self.broker
            .publish(
                &format!("{NAMESPACE}/system/perform_update"),
                encode_payload(&false)?,
                STATE_QOS,
                true,
            )
            .await?;
        self.broker
            .publish(
                &format!("{NAMESPACE}/system/update_in_progress"),
                encode_payload(&true)?,
                STATE_QOS,
                true,
            )
            .await
    }

    async fn trigger_remote(&self, host: &str, train: &str) -> Result<(), PublishError> {
        let remote = self.connector.connect(host).await?;
        let result = async {
            remote
                .publish(
                    &format!("{NAMESPACE}/system/releaseTrain"),
                    train.as_bytes().to_vec(),
                    QoS::AtMostOnce,
                    false,
                )
                .await?;
            remote
                .publish(
                    &format!("{NAMESPACE}/system/PerformUpdate"),
                    b"1".to_vec(),
                    QoS::AtMostOnce,
                    false,
                )
                .await
        }
        .await;
        self.connector.release(remote).await;
        result
    }

    async fn restart(&self) -> bool {
        match tokio::process::Command::new(&self.restart_command)
            .status()
            .await
        {
            Ok(status) if status.success() => {
                tracing::info!(command = %self.restart_command, "Restart triggered");
                true
            }
            Ok(status) => {
                tracing::error!(command = %self.restart_command, %status, "Restart command failed");
                false
            }
            Err(e) => {
                tracing::error!(command = %self.restart_command, error = %e, "Restart command could not run");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::broker::MemoryBroker;

    /// Hands out one in-memory broker per known host.
    #[derive(Default)]
    struct FakeConnector {
        remotes: HashMap<String, MemoryBroker>,
    }

    impl FakeConnector {
        fn with_remote(mut self, host: &str) -> Self {
            self.remotes.insert(host.to_string(), MemoryBroker::new());
            self
        }
    }

    impl RemoteConnector for FakeConnector {
        type Broker = MemoryBroker;

        async fn connect(&self, host: &str) -> Result<MemoryBroker, PublishError> {
            self.remotes
                .get(host)
                .cloned()
                .ok_or_else(|| PublishError::NotConnected(host.to_string()))
        }
    }

    fn updater(
        broker: &MemoryBroker,
        connector: FakeConnector,
    ) -> SystemUpdater<MemoryBroker, FakeConnector> {
        SystemUpdater::new(broker.clone(), connector)
            .with_grace_period(Duration::ZERO)
            .with_restart_command("true")
    }

    #[tokio::test]
    async fn flags_update_locally() {
        let local = MemoryBroker::new();
        let report = updater(&local, FakeConnector::default())
            .perform_update("stable", &[])
            .await;

        assert_eq!(report.release_train, "stable17");
        assert!(report.restarted);
        assert_eq!(
            local.last_payload("openWB/set/system/perform_update").as_deref(),
            Some("false")
        );
        assert_eq!(
            local.last_payload("openWB/set/system/update_in_progress").as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn triggers_external_chargepoints_only() {
        let local = MemoryBroker::new();
        let connector = FakeConnector::default().with_remote("10.0.0.5");
        let remote = connector.remotes["10.0.0.5"].clone();

        let report = updater(&local, connector)
            .perform_update(
                "beta",
                &[
                    RemoteChargepoint::local(1),
                    RemoteChargepoint::external(2, "10.0.0.5"),
                ],
            )
            .await;

        assert_eq!(report.triggered, vec![2]);
        assert!(report.failed.is_empty());

        let publications = remote.publications();
        assert_eq!(publications.len(), 2);
        assert_eq!(publications[0].topic, "openWB/set/system/releaseTrain");
        assert_eq!(publications[0].payload_str(), Some("beta"));
        assert_eq!(publications[1].topic, "openWB/set/system/PerformUpdate");
        assert_eq!(publications[1].payload_str(), Some("1"));
        assert!(!publications[1].retain);
    }

    #[tokio::test]
    async fn unreachable_remote_does_not_stop_others() {
        let local = MemoryBroker::new();
        let connector = FakeConnector::default().with_remote("10.0.0.6");
        let remote = connector.remotes["10.0.0.6"].clone();

        let report = updater(&local, connector)
            .perform_update(
                "nightly",
                &[
                    RemoteChargepoint::external(3, "10.0.0.99"),
                    RemoteChargepoint::external(4, "10.0.0.6"),
                ],
            )
            .await;

        assert_eq!(report.failed, vec![3]);
        assert_eq!(report.triggered, vec![4]);
        assert_eq!(remote.publications().len(), 2);
        assert!(report.restarted);
    }

    #[tokio::test]
    async fn failing_restart_is_reported() {
        let local = MemoryBroker::new();
        let report = SystemUpdater::new(local, FakeConnector::default())
            .with_grace_period(Duration::ZERO)
            .with_restart_command("/nonexistent/restart-command")
            .perform_update("stable", &[])
            .await;

        assert!(!report.restarted);
    }

    #[test]
    fn connection_serde() {
        let chargepoint: RemoteChargepoint = serde_json::from_str(
            r#"{"number": 2, "connection": {"selected": "external_openwb", "ip_address": "10.0.0.5"}}"#,
        )
        .unwrap();
        assert_eq!(chargepoint, RemoteChargepoint::external(2, "10.0.0.5"));
    }
}
