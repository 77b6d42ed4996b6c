//! Tilt beacon payload decoder.
//!
//! Pure function from one advertisement event to a structured
//! [`SensorFrame`], or a rejection. The fast paths reject the overwhelming
//! majority of traffic (everything that is not a Tilt) before any field
//! extraction happens.

use crate::device_id::DeviceId;
use crate::scanner::Advertisement;
use thiserror::Error;

/// Minimum raw event size for a plausible Tilt advertisement (80 hex chars).
pub const MIN_ADVERTISEMENT_LEN: usize = 40;

/// The last six bytes of every Tilt device identifier, shared across all
/// colors. Cheap pre-filter: if these bytes are absent the event cannot be a
/// Tilt advertisement.
pub const TILT_ID_SUFFIX: [u8; 6] = [0x13, 0x70, 0xf0, 0x2d, 0x74, 0xde];

/// Offsets into the manufacturer-specific data value. Layout is the
/// iBeacon frame: 0x02 0x15, 16-byte identifier, major (temperature),
/// minor (gravity), tx-power.
const ID_RANGE: std::ops::Range<usize> = 2..18;
const TEMP_RANGE: std::ops::Range<usize> = 18..20;
const GRAVITY_RANGE: std::ops::Range<usize> = 20..22;
const TX_POWER_OFFSET: usize = 22;
const SUB_PAYLOAD_LEN: usize = 23;

/// One decoded Tilt beacon, consumed immediately and never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFrame {
    /// The 16-byte device-type identifier.
    pub device_id: DeviceId,
    /// Raw temperature code, big-endian. Unit conversion happens in the
    /// hydrometer since it depends on the device generation.
    pub temp_code: u16,
    /// Raw gravity code, big-endian.
    pub gravity_code: u16,
    /// Tx-power byte; newer Tilts reuse it for battery age.
    pub tx_power: u8,
    /// Signal strength from the advertisement event.
    pub rssi: i16,
}

/// Why an advertisement event was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Event carried no data at all
    #[error("advertisement has no raw data")]
    Empty,
    /// Too small to be a Tilt advertisement
    #[error("advertisement too small to be a Tilt ({0} bytes)")]
    TooShort(usize),
    /// The shared identifier suffix is absent; not a Tilt
    #[error("advertisement does not carry the Tilt identifier suffix")]
    MissingIdSuffix,
    /// No manufacturer-specific data field in the event
    #[error("advertisement has no manufacturer-specific data")]
    NoManufacturerData,
    /// Manufacturer data too short for the structured sub-payload
    #[error("manufacturer data truncated ({0} bytes, expected {SUB_PAYLOAD_LEN})")]
    Truncated(usize),
    /// The event carried no signal-strength field
    #[error("advertisement has no RSSI")]
    NoRssi,
}

impl DecodeError {
    /// True for the pre-filter rejections that simply mean "some other BLE
    /// device" rather than a malformed Tilt beacon. Logged at debug level;
    /// the rest are genuine decode failures and logged as errors.
    pub fn is_foreign(&self) -> bool {
        matches!(
            self,
            DecodeError::Empty | DecodeError::TooShort(_) | DecodeError::MissingIdSuffix
        )
    }
}

/// Decode one advertisement event into a [`SensorFrame`].
///
/// Failures are scoped to the event: the caller drops it and continues with
/// the next beacon.
pub fn decode(event: &Advertisement) -> Result<SensorFrame, DecodeError> {
    if event.raw.is_empty() {
        return Err(DecodeError::Empty);
    }
    if event.raw.len() < MIN_ADVERTISEMENT_LEN {
        return Err(DecodeError::TooShort(event.raw.len()));
    }
    if !event.raw.windows(TILT_ID_SUFFIX.len()).any(|w| w == TILT_ID_SUFFIX) {
        return Err(DecodeError::MissingIdSuffix);
    }

    let data = event
        .manufacturer_data
        .as_deref()
        .ok_or(DecodeError::NoManufacturerData)?;
    if data.len() < SUB_PAYLOAD_LEN {
        return Err(DecodeError::Truncated(data.len()));
    }

    let mut id = [0u8; 16];
    id.copy_from_slice(&data[ID_RANGE]);

    let temp_code = u16::from_be_bytes([data[TEMP_RANGE.start], data[TEMP_RANGE.start + 1]]);
    let gravity_code =
        u16::from_be_bytes([data[GRAVITY_RANGE.start], data[GRAVITY_RANGE.start + 1]]);
    let tx_power = data[TX_POWER_OFFSET];
    let rssi = event.rssi.ok_or(DecodeError::NoRssi)?;

    Ok(SensorFrame {
        device_id: DeviceId(id),
        temp_code,
        gravity_code,
        tx_power,
        rssi,
    })
}
