// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register decoding helpers.
//!
//! Multi-register values use big-endian word order (high word first), which
//! is what every supported device family uses. Each helper expects exactly the
//! number of registers its type occupies.

use crate::error::TransportError;

fn expect_len(registers: &[u16], expected: usize) -> Result<(), TransportError> {
    if registers.len() == expected {
        Ok(())
    } else {
        Err(TransportError::MalformedResponse {
            expected,
            actual: registers.len(),
        })
    }
}

fn join(registers: &[u16]) -> u32 {
    (u32::from(registers[0]) << 16) | u32::from(registers[1])
}

/// Decodes one unsigned 16 bit register.
///
/// # Errors
///
/// Returns `TransportError::MalformedResponse` unless exactly one register is given.
pub fn uint16(registers: &[u16]) -> Result<u16, TransportError> {
    expect_len(registers, 1)?;
    Ok(registers[0])
}

/// Decodes one signed 16 bit register.
///
/// # Errors
///
/// Returns `TransportError::MalformedResponse` unless exactly one register is given.
pub fn int16(registers: &[u16]) -> Result<i16, TransportError> {
    expect_len(registers, 1)?;
    Ok(i16::from_be_bytes(registers[0].to_be_bytes()))
}

/// Decodes an unsigned 32 bit value from two registers.
///
/// # Errors
///
/// Returns `TransportError::MalformedResponse` unless exactly two registers are given.
pub fn uint32(registers: &[u16]) -> Result<u32, TransportError> {
    expect_len(registers, 2)?;
    Ok(join(registers))
}

/// Decodes a signed 32 bit value from two registers.
///
/// # Errors
///
/// Returns `TransportError::MalformedResponse` unless exactly two registers are given.
pub fn int32(registers: &[u16]) -> Result<i32, TransportError> {
    expect_len(registers, 2)?;
    Ok(i32::from_be_bytes(join(registers).to_be_bytes()))
}

/// Decodes an IEEE 754 single precision value from two registers.
///
/// # Errors
///
/// Returns `TransportError::MalformedResponse` unless exactly two registers are given.
pub fn float32(registers: &[u16]) -> Result<f32, TransportError> {
    expect_len(registers, 2)?;
    Ok(f32::from_bits(join(registers)))
}

/// Splits an `f32` into the two registers [`float32`] decodes.
#[must_use]
pub fn float32_registers(value: f32) -> [u16; 2] {
    split(value.to_bits())
}

/// Splits a `u32` into the two registers [`uint32`] decodes.
#[must_use]
pub fn uint32_registers(value: u32) -> [u16; 2] {
    split(value)
}

/// Splits an `i32` into the two registers [`int32`] decodes.
#[must_use]
pub fn int32_registers(value: i32) -> [u16; 2] {
    split(u32::from_be_bytes(value.to_be_bytes()))
}

/// Encodes an `i16` as the register [`int16`] decodes.
#[must_use]
pub fn int16_register(value: i16) -> u16 {
    u16::from_be_bytes(value.to_be_bytes())
}

#[allow(clippy::cast_possible_truncation)]
fn split(value: u32) -> [u16; 2] {
    [(value >> 16) as u16, value as u16]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint32_high_word_first() {
        assert_eq!(uint32(&[0x0001, 0x0002]).unwrap(), 0x0001_0002);
        assert_eq!(uint32(&[0, 23000]).unwrap(), 23000);
    }

    #[test]
    fn int32_negative() {
        assert_eq!(int32(&[0xFFFF, 0xFFFF]).unwrap(), -1);
        assert_eq!(int32(&int32_registers(-4200)).unwrap(), -4200);
    }

    #[test]
    fn int16_negative() {
        assert_eq!(int16(&[0xFC18]).unwrap(), -1000);
        assert_eq!(int16_register(-1000), 0xFC18);
    }

    #[test]
    fn float32_known_bits() {
        // 1.5 = 0x3FC00000
        assert!((float32(&[0x3FC0, 0x0000]).unwrap() - 1.5).abs() < f32::EPSILON);
        assert_eq!(float32_registers(1.5), [0x3FC0, 0x0000]);
    }

    #[test]
    fn wrong_length_is_malformed() {
        let err = float32(&[0x3FC0]).unwrap_err();
        assert_eq!(
            err,
            TransportError::MalformedResponse {
                expected: 2,
                actual: 1
            }
        );
        assert!(uint16(&[]).is_err());
    }
}
