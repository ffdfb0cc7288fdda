// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the station device framework.
//!
//! Configuration errors are the only ones that reach the caller of a
//! [`Device`](crate::Device). Transport, publish and value errors are returned
//! by components and contained by the update context.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Device or component configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reading from the field bus failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Publishing state to the broker failed.
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),

    /// A decoded reading does not form a valid state snapshot.
    #[error("value error: {0}")]
    Value(#[from] ValueError),
}

/// Errors raised while setting up devices and components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The component `type` is not part of the device's registry.
    #[error(
        "unsupported component type '{component_type}', allowed values: {}",
        allowed.join(",")
    )]
    UnsupportedComponentType {
        /// The type tag found in the configuration record.
        component_type: String,
        /// The type tags the device family accepts.
        allowed: Vec<&'static str>,
    },

    /// The type-specific part of a component configuration is malformed.
    #[error("invalid configuration for component type '{component_type}': {message}")]
    InvalidComponentConfig {
        /// The component type whose configuration was rejected.
        component_type: String,
        /// Description of the problem.
        message: String,
    },

    /// The device configuration is malformed.
    #[error("invalid device configuration: {0}")]
    InvalidDeviceConfig(String),
}

/// Errors reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint did not answer in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The connection to the endpoint could not be used.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The endpoint answered with an unexpected number of registers.
    #[error("malformed response: expected {expected} registers, got {actual}")]
    MalformedResponse {
        /// Number of registers requested.
        expected: usize,
        /// Number of registers received.
        actual: usize,
    },

    /// The endpoint answered with a Modbus exception.
    #[error("unit {unit} answered with exception code {code}")]
    Exception {
        /// Unit address that raised the exception.
        unit: u8,
        /// Modbus exception code.
        code: u8,
    },
}

/// Errors related to publishing state to the broker.
#[derive(Debug, Error)]
pub enum PublishError {
    /// MQTT client rejected the request.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// The value could not be encoded as JSON.
    #[error("failed to encode payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The broker refused the publication.
    #[error("publication rejected: {0}")]
    Rejected(String),

    /// The broker connection is down or could not be established.
    #[error("broker is not connected: {0}")]
    NotConnected(String),
}

/// Errors raised when a decoded reading violates a state invariant.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A required field was never set.
    #[error("missing value for {0}")]
    Missing(&'static str),

    /// A value is NaN or infinite.
    #[error("{0} is not a finite number")]
    NotFinite(&'static str),

    /// A value is outside the allowed range.
    #[error("{field} value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
        /// The value that was decoded.
        actual: f64,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
