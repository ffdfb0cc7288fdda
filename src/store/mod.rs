// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broker-backed value stores.
//!
//! A value store translates one state snapshot into a fixed, ordered set of
//! publications. Every field is published on every update (full refresh), to
//! a topic that only depends on the entity kind, the entity number and the
//! field name:
//!
//! ```text
//! openWB/set/<kind>/<id>/get/<field>
//! ```
//!
//! Payloads are JSON. Floating point values are rounded to two decimal digits
//! before encoding. All state topics are published retained with
//! [`QoS::AtLeastOnce`].
//!
//! Fields are published independently. A field the broker refuses is logged
//! and the remaining fields are still pushed; [`ValueStore::set`] then reports
//! the first failure.

mod bat;
mod chargepoint;
mod pv;

pub use bat::BatValueStore;
pub use chargepoint::ChargepointValueStore;
pub use pv::PvValueStore;

use serde::Serialize;
use serde_json::{Number, Value};

use crate::broker::{Broker, QoS};
use crate::error::PublishError;
use crate::types::{ComponentId, ComponentKind};

/// Topic prefix of all state publications.
pub const NAMESPACE: &str = "openWB/set";

/// Delivery guarantee used for state topics.
pub const STATE_QOS: QoS = QoS::AtLeastOnce;

/// Decimal digits floating point values are rounded to.
const DIGITS: i32 = 2;

/// Publishes state snapshots of one entity.
#[allow(async_fn_in_trait)]
pub trait ValueStore<S> {
    /// Publishes every field of `state`.
    ///
    /// # Errors
    ///
    /// Returns the first `PublishError` if any field could not be published.
    /// The other fields have been published regardless.
    async fn set(&self, state: &S) -> Result<(), PublishError>;
}

/// Returns the topic a state field of an entity is published on.
///
/// # Examples
///
/// ```
/// use station_devices::store::state_topic;
/// use station_devices::types::{ComponentId, ComponentKind};
///
/// assert_eq!(
///     state_topic(ComponentKind::Chargepoint, ComponentId::new(7), "counter"),
///     "openWB/set/chargepoint/7/get/counter"
/// );
/// ```
#[must_use]
pub fn state_topic(kind: ComponentKind, id: ComponentId, field: &str) -> String {
    format!(
        "{NAMESPACE}/{}/{}/get/{field}",
        kind.topic_segment(),
        id.value()
    )
}

/// Encodes a value as a JSON payload, rounding floating point numbers.
///
/// # Errors
///
/// Returns `PublishError::Serialize` if the value cannot be represented as JSON.
///
/// # Examples
///
/// ```
/// use station_devices::store::encode_payload;
///
/// assert_eq!(encode_payload(&123.456_f64).unwrap(), b"123.46");
/// assert_eq!(encode_payload(&[230.0_f64, 229.5, 231.04]).unwrap(), b"[230.0,229.5,231.04]");
/// assert_eq!(encode_payload(&true).unwrap(), b"true");
/// ```
pub fn encode_payload<V: Serialize + ?Sized>(value: &V) -> Result<Vec<u8>, PublishError> {
    let value = round_floats(serde_json::to_value(value)?);
    Ok(serde_json::to_vec(&value)?)
}

fn round_floats(value: Value) -> Value {
    match value {
        Value::Number(number) if number.is_f64() => {
            let rounded = number
                .as_f64()
                .map(round_digits)
                .and_then(Number::from_f64);
            Value::Number(rounded.unwrap_or(number))
        }
        Value::Array(items) => Value::Array(items.into_iter().map(round_floats).collect()),
        other => other,
    }
}

fn round_digits(value: f64) -> f64 {
    let factor = 10_f64.powi(DIGITS);
    (value * factor).round() / factor
}

/// Publishes the fields of one snapshot, containing per-field failures.
pub(crate) struct StatePublisher<'a, B> {
    broker: &'a B,
    kind: ComponentKind,
    id: ComponentId,
    first_error: Option<PublishError>,
    failed: usize,
}

impl<'a, B: Broker> StatePublisher<'a, B> {
    pub(crate) fn new(broker: &'a B, kind: ComponentKind, id: ComponentId) -> Self {
        Self {
            broker,
            kind,
            id,
            first_error: None,
            failed: 0,
        }
    }

    pub(crate) async fn field<V: Serialize + ?Sized>(&mut self, field: &str, value: &V) {
        let topic = state_topic(self.kind, self.id, field);
        let result = match encode_payload(value) {
            Ok(payload) => self.broker.publish(&topic, payload, STATE_QOS, true).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!(topic = %topic, error = %e, "Failed to publish state field");
            self.failed += 1;
            self.first_error.get_or_insert(e);
        }
    }

    pub(crate) fn finish(self) -> Result<(), PublishError> {
        match self.first_error {
            Some(e) => {
                tracing::debug!(
                    kind = %self.kind,
                    id = self.id.value(),
                    failed = self.failed,
                    "State published incompletely"
                );
                Err(e)
            }
            None => Ok(()),
        }
    }
}
