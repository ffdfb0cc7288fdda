// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fault isolation around a single component update.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde::Serialize;

use super::ComponentInfo;
use crate::error::Error;

/// Result of one component update within a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum ComponentOutcome {
    /// State was read and published.
    Updated,
    /// The update failed; the message describes why.
    Failed(String),
}

impl ComponentOutcome {
    /// Returns `true` if the update succeeded.
    #[must_use]
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated)
    }
}

/// Boundary around exactly one component update.
///
/// Any error the update returns, and any panic it raises, is logged together
/// with the component's identity and turned into [`ComponentOutcome::Failed`]. The caller always
/// gets an outcome back and moves on; there are no retries within a cycle.
///
/// # Examples
///
/// ```
/// use station_devices::component::{ComponentInfo, ComponentOutcome, UpdateContext};
/// use station_devices::error::{Error, TransportError};
/// use station_devices::types::{ComponentId, ComponentKind};
///
/// # async fn example() {
/// let info = ComponentInfo::new(ComponentId::new(1), "Battery", ComponentKind::Bat);
///
/// let outcome = UpdateContext::new(&info)
///     .run(async { Err::<(), Error>(TransportError::Timeout(3000).into()) })
///     .await;
/// assert!(!outcome.is_updated());
/// # }
/// ```
#[derive(Debug)]
pub struct UpdateContext<'a> {
    info: &'a ComponentInfo,
}

impl<'a> UpdateContext<'a> {
    /// Creates a boundary for the component described by `info`.
    #[must_use]
    pub fn new(info: &'a ComponentInfo) -> Self {
        Self { info }
    }

    /// Runs `update` to completion and contains its failure.
    pub async fn run<F>(self, update: F) -> ComponentOutcome
    where
        F: Future<Output = Result<(), Error>>,
    {
        match AssertUnwindSafe(update).catch_unwind().await {
            Ok(Ok(())) => {
                tracing::debug!(
                    component = %self.info.id,
                    name = %self.info.name,
                    kind = %self.info.kind,
                    "Component updated"
                );
                ComponentOutcome::Updated
            }
            Ok(Err(e)) => {
                tracing::error!(
                    component = %self.info.id,
                    name = %self.info.name,
                    kind = %self.info.kind,
                    error = %e,
                    "Component update failed"
                );
                ComponentOutcome::Failed(e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(
                    component = %self.info.id,
                    name = %self.info.name,
                    kind = %self.info.kind,
                    panic = %message,
                    "Component update panicked"
                );
                ComponentOutcome::Failed(format!("component panicked: {message}"))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PublishError, TransportError};
    use crate::types::{ComponentId, ComponentKind};

    fn info() -> ComponentInfo {
        ComponentInfo::new(ComponentId::new(5), "Wallbox", ComponentKind::Chargepoint)
    }

    #[tokio::test]
    async fn success_is_updated() {
        let info = info();
        let outcome = UpdateContext::new(&info).run(async { Ok::<(), Error>(()) }).await;
        assert_eq!(outcome, ComponentOutcome::Updated);
    }

    #[tokio::test]
    async fn transport_failure_is_contained() {
        let info = info();
        let outcome = UpdateContext::new(&info)
            .run(async { Err::<(), Error>(TransportError::Timeout(3000).into()) })
            .await;
        assert_eq!(
            outcome,
            ComponentOutcome::Failed("transport error: request timed out after 3000 ms".to_string())
        );
    }

    #[tokio::test]
    async fn publish_failure_is_contained() {
        let info = info();
        let outcome = UpdateContext::new(&info)
            .run(async { Err::<(), Error>(PublishError::Rejected("t".to_string()).into()) })
            .await;
        assert!(!outcome.is_updated());
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let info = info();
        let readings: Vec<u16> = Vec::new();
        let outcome = UpdateContext::new(&info)
            .run(async {
                let _ = readings[3];
                Ok::<(), Error>(())
            })
            .await;

        match outcome {
            ComponentOutcome::Failed(message) => {
                assert!(message.starts_with("component panicked: "), "{message}");
                assert!(message.contains("index out of bounds"), "{message}");
            }
            ComponentOutcome::Updated => panic!("panic was not contained"),
        }
    }

    #[tokio::test]
    async fn panic_with_str_payload() {
        let info = info();
        let outcome = UpdateContext::new(&info)
            .run(async {
                let exhausted = true;
                if exhausted {
                    panic!("register map exhausted");
                }
                Ok::<(), Error>(())
            })
            .await;
        assert_eq!(
            outcome,
            ComponentOutcome::Failed("component panicked: register map exhausted".to_string())
        );
    }

    #[test]
    fn outcome_serialization() {
        let json = serde_json::to_string(&ComponentOutcome::Failed("boom".to_string())).unwrap();
        assert_eq!(json, r#"{"status":"failed","error":"boom"}"#);
        let json = serde_json::to_string(&ComponentOutcome::Updated).unwrap();
        assert_eq!(json, r#"{"status":"updated"}"#);
    }
}
