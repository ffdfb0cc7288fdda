// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field bus transport capability.
//!
//! A device talks to its hardware through exactly one [`Transport`], bound to
//! one Modbus-TCP endpoint. The wire client itself lives outside this crate;
//! components only need register reads. Raw registers are decoded with the
//! helpers in [`decode`], and the typed read methods on [`Transport`] combine
//! both steps while checking the response length.
//!
//! [`MemoryTransport`] is a register-map backed implementation for
//! simulations and tests.

pub mod decode;
mod memory;

pub use memory::MemoryTransport;

use crate::error::TransportError;

/// TCP port Modbus endpoints listen on.
pub const MODBUS_PORT: u16 = 502;

/// Read access to the input registers of one Modbus-TCP endpoint.
///
/// Implementations block the calling task until the endpoint answers or the
/// transport-level timeout elapses. Timeouts and retries are the transport's
/// business; the framework only needs a read to either return registers or
/// fail.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Reads `count` consecutive input registers starting at `address` from
    /// the unit at `unit`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the endpoint cannot be reached, times out,
    /// or answers with an exception.
    async fn read_input_registers(
        &self,
        unit: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError>;

    /// Reads registers and checks that exactly `count` came back.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::MalformedResponse` on a length mismatch, or
    /// whatever the underlying read failed with.
    async fn read_exact(
        &self,
        unit: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError> {
        let registers = self.read_input_registers(unit, address, count).await?;
        if registers.len() != usize::from(count) {
            return Err(TransportError::MalformedResponse {
                expected: usize::from(count),
                actual: registers.len(),
            });
        }
        Ok(registers)
    }

    /// Reads an IEEE 754 single precision value spanning two registers.
    ///
    /// # Errors
    ///
    /// See [`read_exact`](Self::read_exact).
    async fn read_f32(&self, unit: u8, address: u16) -> Result<f32, TransportError> {
        let registers = self.read_exact(unit, address, 2).await?;
        decode::float32(&registers)
    }

    /// Reads an unsigned 16 bit value.
    ///
    /// # Errors
    ///
    /// See [`read_exact`](Self::read_exact).
    async fn read_u16(&self, unit: u8, address: u16) -> Result<u16, TransportError> {
        let registers = self.read_exact(unit, address, 1).await?;
        decode::uint16(&registers)
    }
}
