//! Compact device identifier type for Tilt hydrometers.
//!
//! Tilt devices identify themselves with a fixed 16-byte token embedded in
//! the beacon payload, conventionally displayed as a dashed UUID. This module
//! provides a compact byte-array representation decoupled from any specific
//! Bluetooth library.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A Tilt device identifier stored as a compact 16-byte array.
///
/// Displays in the canonical dashed form, e.g.
/// `a495bb10-c5b1-4b44-b512-1370f02d74de`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceId(pub [u8; 16]);

impl DeviceId {
    /// The dashless form of the identifier (32 hex characters).
    pub fn simple(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11], b[12], b[13],
            b[14], b[15]
        )
    }
}

/// Errors returned when parsing a device identifier string.
#[derive(Error, Debug, PartialEq)]
pub enum ParseDeviceIdError {
    #[error("invalid device id: expected 32 hex characters, got {0}")]
    InvalidLength(usize),
    #[error("invalid device id: '{0}' is not valid hex")]
    InvalidHex(String),
}

impl FromStr for DeviceId {
    type Err = ParseDeviceIdError;

    /// Parse from either the dashed or the dashless form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex: String = s.chars().filter(|c| *c != '-').collect();
        if hex.len() != 32 {
            return Err(ParseDeviceIdError::InvalidLength(hex.len()));
        }

        let mut bytes = [0u8; 16];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| ParseDeviceIdError::InvalidHex(hex.clone()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| ParseDeviceIdError::InvalidHex(pair.to_string()))?;
        }

        Ok(DeviceId(bytes))
    }
}

impl From<[u8; 16]> for DeviceId {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 16] = [
        0xa4, 0x95, 0xbb, 0x10, 0xc5, 0xb1, 0x4b, 0x44, 0xb5, 0x12, 0x13, 0x70, 0xf0, 0x2d, 0x74,
        0xde,
    ];

    #[test]
    fn test_display_dashed() {
        let id = DeviceId(RED);
        assert_eq!(format!("{}", id), "a495bb10-c5b1-4b44-b512-1370f02d74de");
    }

    #[test]
    fn test_simple_form() {
        let id = DeviceId(RED);
        assert_eq!(id.simple(), "a495bb10c5b14b44b5121370f02d74de");
    }

    #[test]
    fn test_from_str_dashed() {
        let id: DeviceId = "a495bb10-c5b1-4b44-b512-1370f02d74de".parse().unwrap();
        assert_eq!(id.0, RED);
    }

    #[test]
    fn test_from_str_dashless() {
        let id: DeviceId = "a495bb10c5b14b44b5121370f02d74de".parse().unwrap();
        assert_eq!(id.0, RED);
    }

    #[test]
    fn test_from_str_invalid() {
        assert!(matches!(
            "a495bb10".parse::<DeviceId>(),
            Err(ParseDeviceIdError::InvalidLength(8))
        ));
        assert!(matches!(
            "zz95bb10c5b14b44b5121370f02d74de".parse::<DeviceId>(),
            Err(ParseDeviceIdError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_round_trip() {
        let id = DeviceId(RED);
        let parsed: DeviceId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
