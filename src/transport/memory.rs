// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory register map transport.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use super::Transport;
use crate::error::TransportError;

/// Modbus exception code for an unmapped register.
const ILLEGAL_DATA_ADDRESS: u8 = 2;

/// A [`Transport`] backed by an in-memory register map.
///
/// Useful for simulating devices and for tests. Clones share the same register
/// map, so a handle kept outside a [`Device`](crate::Device) can change
/// readings between update cycles.
///
/// # Examples
///
/// ```
/// use station_devices::transport::{MemoryTransport, Transport};
///
/// # async fn example() -> Result<(), station_devices::error::TransportError> {
/// let transport = MemoryTransport::new();
/// transport.set_registers(1, 1002, &[3]);
///
/// assert_eq!(transport.read_u16(1, 1002).await?, 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<MemoryTransportInner>>,
}

#[derive(Debug, Default)]
struct MemoryTransportInner {
    registers: HashMap<(u8, u16), u16>,
    offline_units: HashSet<u8>,
    reads: usize,
}

impl MemoryTransport {
    /// Creates an empty register map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `values` in consecutive registers of `unit`, starting at `address`.
    pub fn set_registers(&self, unit: u8, address: u16, values: &[u16]) {
        let mut inner = self.inner.lock();
        for (offset, value) in (0u16..).zip(values) {
            inner
                .registers
                .insert((unit, address.wrapping_add(offset)), *value);
        }
    }

    /// Makes every read from `unit` time out until [`set_online`](Self::set_online).
    pub fn set_offline(&self, unit: u8) {
        self.inner.lock().offline_units.insert(unit);
    }

    /// Lets reads from `unit` succeed again.
    pub fn set_online(&self, unit: u8) {
        self.inner.lock().offline_units.remove(&unit);
    }

    /// Returns the number of read requests served so far, including failed ones.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.inner.lock().reads
    }
}

impl Transport for MemoryTransport {
    async fn read_input_registers(
        &self,
        unit: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError> {
        let mut inner = self.inner.lock();
        inner.reads += 1;

        if inner.offline_units.contains(&unit) {
            return Err(TransportError::Timeout(0));
        }

        (0..count)
            .map(|offset| {
                inner
                    .registers
                    .get(&(unit, address.wrapping_add(offset)))
                    .copied()
                    .ok_or(TransportError::Exception {
                        unit,
                        code: ILLEGAL_DATA_ADDRESS,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::decode;

    #[tokio::test]
    async fn reads_consecutive_registers() {
        let transport = MemoryTransport::new();
        transport.set_registers(3, 10, &[1, 2, 3]);

        let registers = transport.read_input_registers(3, 10, 3).await.unwrap();
        assert_eq!(registers, vec![1, 2, 3]);
        assert_eq!(transport.read_count(), 1);
    }

    #[tokio::test]
    async fn unmapped_register_is_exception() {
        let transport = MemoryTransport::new();
        transport.set_registers(3, 10, &[1]);

        let err = transport.read_input_registers(3, 10, 2).await.unwrap_err();
        assert_eq!(err, TransportError::Exception { unit: 3, code: 2 });
    }

    #[tokio::test]
    async fn offline_unit_times_out() {
        let transport = MemoryTransport::new();
        transport.set_registers(3, 10, &[1]);
        transport.set_offline(3);
        assert!(matches!(
            transport.read_u16(3, 10).await,
            Err(TransportError::Timeout(_))
        ));

        transport.set_online(3);
        assert_eq!(transport.read_u16(3, 10).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn typed_float_read() {
        let transport = MemoryTransport::new();
        transport.set_registers(60, 4, &decode::float32_registers(87.5));

        let soc = transport.read_f32(60, 4).await.unwrap();
        assert!((soc - 87.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn clones_share_registers() {
        let transport = MemoryTransport::new();
        let handle = transport.clone();
        handle.set_registers(1, 0, &[42]);

        assert_eq!(transport.read_u16(1, 0).await.unwrap(), 42);
    }
}
