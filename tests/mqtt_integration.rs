// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for MQTT publication using mockforge-mqtt.

#![cfg(feature = "mqtt")]

use std::time::Duration;

use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use station_devices::broker::{Broker, MqttBroker, QoS};
use station_devices::error::PublishError;
use tokio::time::sleep;

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to bind
    sleep(Duration::from_millis(500)).await;
}

async fn connect(port: u16) -> MqttBroker {
    MqttBroker::builder()
        .host("127.0.0.1")
        .port(port)
        .connection_timeout(Duration::from_secs(5))
        .build()
        .await
        .expect("connect to mock broker")
}

// ============================================================================
// MqttBroker Connection Tests
// ============================================================================

mod broker_connection {
    use super::*;

    #[tokio::test]
    async fn connect_to_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker = connect(port).await;

        assert!(broker.is_connected());
        assert_eq!(broker.host(), "127.0.0.1");
        assert_eq!(broker.port(), port);
    }

    #[tokio::test]
    async fn connect_to_closed_port_times_out() {
        let port = get_test_port();

        let result = MqttBroker::builder()
            .host("127.0.0.1")
            .port(port)
            .connection_timeout(Duration::from_millis(500))
            .build()
            .await;

        assert!(matches!(result, Err(PublishError::NotConnected(_))));
    }

    #[tokio::test]
    async fn publish_after_disconnect_fails() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker = connect(port).await;
        broker.disconnect().await.unwrap();

        let result = broker
            .publish("openWB/set/bat/1/get/soc", b"50".to_vec(), QoS::AtLeastOnce, true)
            .await;
        assert!(matches!(result, Err(PublishError::NotConnected(_))));
    }
}

// ============================================================================
// Device Update Over MQTT
// ============================================================================

mod device_update {
    use super::*;
    use station_devices::device::Device;
    use station_devices::device::studer::{self, Studer};
    use station_devices::transport::{MemoryTransport, decode};

    #[tokio::test]
    async fn studer_bat_publishes_through_mqtt() {
        let port = get_test_port();
        start_mock_broker(port).await;
        let broker = connect(port).await;

        let transport = MemoryTransport::new();
        transport.set_registers(60, 6, &decode::float32_registers(-250.0));
        transport.set_registers(60, 4, &decode::float32_registers(80.0));
        transport.set_registers(60, 14, &decode::float32_registers(1.5));
        transport.set_registers(60, 16, &decode::float32_registers(0.5));

        let mut device: Device<Studer, _, _> =
            Device::new(Studer::default_config(), transport, broker).unwrap();
        device.add_component(studer::bat::default_config()).unwrap();

        let report = device.update().await;

        assert!(report.all_updated(), "failed: {:?}", report.failed().collect::<Vec<_>>());
        assert_eq!(report.updated_count(), 1);
    }
}

// ============================================================================
// System Update Over MQTT
// ============================================================================

mod system_update {
    use super::*;
    use station_devices::system::{MqttConnector, RemoteChargepoint, SystemUpdater};

    #[tokio::test]
    async fn triggers_remote_controller() {
        let port = get_test_port();
        start_mock_broker(port).await;
        let local = connect(port).await;

        let connector = MqttConnector::new()
            .port(port)
            .connection_timeout(Duration::from_secs(5));
        let report = SystemUpdater::new(local, connector)
            .with_grace_period(Duration::ZERO)
            .with_restart_command("true")
            .perform_update("stable", &[RemoteChargepoint::external(2, "127.0.0.1")])
            .await;

        assert_eq!(report.release_train, "stable17");
        assert_eq!(report.triggered, vec![2]);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn unreachable_remote_is_reported() {
        let port = get_test_port();
        start_mock_broker(port).await;
        let local = connect(port).await;

        let connector = MqttConnector::new()
            .port(get_test_port())
            .connection_timeout(Duration::from_millis(500));
        let report = SystemUpdater::new(local, connector)
            .with_grace_period(Duration::ZERO)
            .with_restart_command("true")
            .perform_update("beta", &[RemoteChargepoint::external(5, "127.0.0.1")])
            .await;

        assert!(report.triggered.is_empty());
        assert_eq!(report.failed, vec![5]);
        assert!(report.restarted);
    }
}
