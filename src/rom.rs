//! [`DeviceId`]: the 64-bit ROM code every 1-Wire slave answers a search or
//! read with, decomposed into family code, serial number and CRC-8 (spec §3).

use crate::crc8;
use thiserror::Error;

/// CRC-8 mismatch converting raw bytes/an integer into a [`DeviceId`].
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("CRC-8 mismatch in device id")]
pub struct CrcMismatch;

/// A 64-bit 1-Wire device id: low byte is the family code, high byte is the
/// CRC-8 of the other seven bytes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DeviceId {
    pub family_code: u8,
    pub serial_number: [u8; 6],
    pub crc: u8,
}

impl TryFrom<[u8; 8]> for DeviceId {
    type Error = CrcMismatch;

    fn try_from(value: [u8; 8]) -> Result<Self, CrcMismatch> {
        if !crc8::check(&value) {
            return Err(CrcMismatch);
        }
        Ok(Self {
            family_code: value[0],
            serial_number: [value[1], value[2], value[3], value[4], value[5], value[6]],
            crc: value[7],
        })
    }
}

impl TryFrom<u64> for DeviceId {
    type Error = CrcMismatch;

    fn try_from(value: u64) -> Result<Self, CrcMismatch> {
        value.to_le_bytes().try_into()
    }
}

impl From<DeviceId> for [u8; 8] {
    fn from(value: DeviceId) -> Self {
        [
            value.family_code,
            value.serial_number[0],
            value.serial_number[1],
            value.serial_number[2],
            value.serial_number[3],
            value.serial_number[4],
            value.serial_number[5],
            value.crc,
        ]
    }
}

impl From<DeviceId> for u64 {
    fn from(value: DeviceId) -> Self {
        u64::from_le_bytes(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        assert_eq!(
            Ok(DeviceId {
                family_code: 0x28,
                serial_number: [0x00; 6],
                crc: 0x1E,
            }),
            DeviceId::try_from(0x1E_000000000000_28)
        );
        assert_eq!(
            Ok(DeviceId {
                family_code: 0x28,
                serial_number: [0xFF; 6],
                crc: 0xC,
            }),
            DeviceId::try_from(0x0C_FFFFFFFFFFFF_28)
        );
    }

    #[test]
    fn rejects_bad_crc() {
        assert_eq!(DeviceId::try_from(0x00_000000000000_28), Err(CrcMismatch));
    }
}
