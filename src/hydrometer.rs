//! Per-device rolling state for a Tilt hydrometer.
//!
//! One [`TiltHydrometer`] exists per color for the lifetime of the process.
//! It consumes decoded sensor frames, classifies the device generation
//! (Classic vs Pro), tracks battery reporting, and keeps bounded smoothing
//! buffers with staleness detection.
//!
//! Gravity is carried as [`rust_decimal::Decimal`] end to end: downstream
//! consumers compare specific gravity to 3-4 significant decimal digits, and
//! binary floating point would drift across repeated averaging.

use crate::color::TiltColor;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default number of samples averaged to produce a smoothed reading.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 60;

/// Gravity codes at or above this value identify a Tilt Pro.
const PRO_GRAVITY_THRESHOLD: u16 = 5000;

/// Temperature code signalling that the gravity field carries the firmware
/// version instead of a reading.
const FIRMWARE_VERSION_SENTINEL: u16 = 999;

/// Tx-power byte signalling that this device reports battery age. Newer
/// Tilts alternate between this marker and the actual weeks-on-battery value
/// across successive beacons (a workaround for platforms that read the byte
/// as signed, where 197 appears as -59).
const BATTERY_MARKER: u8 = 197;

/// Rolling smoothed state for a single Tilt.
#[derive(Debug, Clone)]
pub struct TiltHydrometer {
    color: TiltColor,
    smoothing_window: usize,
    gravity_samples: VecDeque<Decimal>,
    temp_samples: VecDeque<Decimal>,
    /// `None` until the first reading is accepted, so a fresh instance
    /// reports expired.
    last_value_received: Option<Instant>,
    /// Most recent unit-converted readings straight off the device.
    raw_gravity: Decimal,
    raw_temp: Decimal,
    /// Calibrated readings. Calibration is currently a pass-through; the
    /// downstream collector applies any curves.
    gravity: Decimal,
    temp: Decimal,
    rssi: i16,
    /// Latches true on the first battery marker and never reverts.
    sends_battery: bool,
    weeks_on_battery: u8,
    firmware_version: u16,
    /// Latches true on the first Pro-range gravity code and never reverts;
    /// real devices do not change generation.
    tilt_pro: bool,
}

impl TiltHydrometer {
    pub fn new(color: TiltColor, smoothing_window: usize) -> Self {
        TiltHydrometer {
            color,
            smoothing_window,
            gravity_samples: VecDeque::with_capacity(smoothing_window),
            temp_samples: VecDeque::with_capacity(smoothing_window),
            last_value_received: None,
            raw_gravity: Decimal::ZERO,
            raw_temp: Decimal::ZERO,
            gravity: Decimal::ZERO,
            temp: Decimal::ZERO,
            rssi: 0,
            sends_battery: false,
            weeks_on_battery: 0,
            firmware_version: 0,
            tilt_pro: false,
        }
    }

    pub fn color(&self) -> TiltColor {
        self.color
    }

    pub fn raw_gravity(&self) -> Decimal {
        self.raw_gravity
    }

    pub fn raw_temp(&self) -> Decimal {
        self.raw_temp
    }

    pub fn rssi(&self) -> i16 {
        self.rssi
    }

    pub fn tilt_pro(&self) -> bool {
        self.tilt_pro
    }

    pub fn sends_battery(&self) -> bool {
        self.sends_battery
    }

    pub fn weeks_on_battery(&self) -> u8 {
        self.weeks_on_battery
    }

    pub fn firmware_version(&self) -> u16 {
        self.firmware_version
    }

    /// How long the device may stay silent before its cached readings are
    /// considered stale. Assumes roughly one accepted beacon per four
    /// broadcasts, so the horizon covers a full smoothing window at that
    /// duty cycle.
    fn cache_expiry(&self) -> Duration {
        Duration::from_secs_f64(self.smoothing_window as f64 * 1.2 * 4.0)
    }

    /// True when the device has not checked in recently and the cached data
    /// should no longer be trusted.
    pub fn expired(&self) -> bool {
        match self.last_value_received {
            None => true,
            Some(at) => at.elapsed() >= self.cache_expiry(),
        }
    }

    /// Ingest one decoded beacon.
    ///
    /// `gravity_code` and `temp_code` are the raw big-endian fields from the
    /// payload; unit conversion depends on the device generation.
    pub fn process_decoded_values(
        &mut self,
        gravity_code: u16,
        temp_code: u16,
        rssi: i16,
        tx_power: u8,
    ) {
        if temp_code == FIRMWARE_VERSION_SENTINEL {
            // Metadata beacon: the gravity field carries the firmware
            // version. Must not enter the smoothing buffers.
            self.firmware_version = gravity_code;
            return;
        }

        if gravity_code >= PRO_GRAVITY_THRESHOLD {
            self.tilt_pro = true;
            self.raw_gravity = Decimal::from(gravity_code) / Decimal::from(10_000);
            self.raw_temp = Decimal::from(temp_code) / Decimal::from(10);
        } else {
            // Classic-range reading; the Pro flag stays latched if set.
            self.raw_gravity = Decimal::from(gravity_code) / Decimal::from(1_000);
            self.raw_temp = Decimal::from(temp_code);
        }

        if tx_power == BATTERY_MARKER {
            self.sends_battery = true;
        } else if self.sends_battery {
            self.weeks_on_battery = tx_power;
        }

        // Calibration deferred to the collector; smooth the calibrated
        // values so a future calibration step lands in the right place.
        self.gravity = self.raw_gravity;
        self.temp = self.raw_temp;

        self.rssi = rssi;
        self.append_sample(self.gravity, self.temp);
    }

    fn append_sample(&mut self, gravity: Decimal, temp: Decimal) {
        if self.expired() {
            // Contact was lost for longer than the expiry horizon; stale
            // history must not be blended with fresh readings.
            self.gravity_samples.clear();
            self.temp_samples.clear();
        }

        self.last_value_received = Some(Instant::now());

        if self.gravity_samples.len() >= self.smoothing_window {
            self.gravity_samples.pop_front();
            self.temp_samples.pop_front();
        }
        self.gravity_samples.push_back(gravity);
        self.temp_samples.push_back(temp);
    }

    fn mean(samples: &VecDeque<Decimal>) -> Decimal {
        if samples.is_empty() {
            return Decimal::ZERO;
        }
        let sum = samples.iter().fold(Decimal::ZERO, |acc, v| acc + *v);
        sum / Decimal::from(samples.len())
    }

    /// Average gravity over the smoothing buffer, quantized to 4 decimal
    /// places for a Pro and 3 for a Classic.
    pub fn smoothed_gravity(&self) -> Decimal {
        let places = if self.tilt_pro { 4 } else { 3 };
        let mut value = Self::mean(&self.gravity_samples).round_dp(places);
        value.rescale(places);
        value
    }

    /// Average temperature over the smoothing buffer, quantized to 1 decimal
    /// place for a Pro and the nearest whole degree for a Classic.
    pub fn smoothed_temp(&self) -> Decimal {
        let places = if self.tilt_pro { 1 } else { 0 };
        let mut value = Self::mean(&self.temp_samples).round_dp(places);
        value.rescale(places);
        value
    }

    /// Immutable serializable view, the unit exchanged with forwarding
    /// targets.
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            color: self.color,
            raw_gravity: self.raw_gravity,
            raw_temp: self.raw_temp,
            rssi: self.rssi,
            tilt_pro: self.tilt_pro,
            sends_battery: self.sends_battery,
            weeks_on_battery: self.weeks_on_battery,
            firmware_version: self.firmware_version,
            smoothed_gravity: self.smoothed_gravity(),
            smoothed_temp: self.smoothed_temp(),
            smoothing_window: self.smoothing_window,
        }
    }
}

/// Serializable view of a [`TiltHydrometer`].
///
/// Field names match the wire format expected by the Fermentrack endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub color: TiltColor,
    pub raw_gravity: Decimal,
    pub raw_temp: Decimal,
    pub rssi: i16,
    pub tilt_pro: bool,
    pub sends_battery: bool,
    pub weeks_on_battery: u8,
    pub firmware_version: u16,
    pub smoothed_gravity: Decimal,
    pub smoothed_temp: Decimal,
    pub smoothing_window: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tilt() -> TiltHydrometer {
        TiltHydrometer::new(TiltColor::Red, DEFAULT_SMOOTHING_WINDOW)
    }

    #[test]
    fn test_initial_state() {
        let t = tilt();
        assert_eq!(t.color(), TiltColor::Red);
        assert_eq!(t.raw_gravity(), Decimal::ZERO);
        assert_eq!(t.raw_temp(), Decimal::ZERO);
        assert_eq!(t.rssi(), 0);
        assert!(!t.tilt_pro());
        assert!(!t.sends_battery());
        assert_eq!(t.weeks_on_battery(), 0);
        assert_eq!(t.firmware_version(), 0);
    }

    #[test]
    fn test_fresh_instance_is_expired() {
        assert!(tilt().expired());
    }

    #[test]
    fn test_not_expired_after_reading() {
        let mut t = tilt();
        t.process_decoded_values(1242, 72, -80, 0);
        assert!(!t.expired());
    }

    #[test]
    fn test_classic_conversion() {
        let mut t = tilt();
        t.process_decoded_values(1242, 72, -80, BATTERY_MARKER);
        assert_eq!(t.raw_gravity(), dec!(1.242));
        assert_eq!(t.raw_temp(), dec!(72));
        assert!(!t.tilt_pro());
        assert_eq!(t.rssi(), -80);
        assert!(t.sends_battery());
    }

    #[test]
    fn test_pro_conversion() {
        let mut t = tilt();
        t.process_decoded_values(12420, 720, -80, 50);
        assert_eq!(t.raw_gravity(), dec!(1.2420));
        assert_eq!(t.raw_temp(), dec!(72.0));
        assert!(t.tilt_pro());
        // 197 never seen, so 50 is not a battery age.
        assert!(!t.sends_battery());
        assert_eq!(t.weeks_on_battery(), 0);
    }

    #[test]
    fn test_pro_flag_is_sticky() {
        let mut t = tilt();
        t.process_decoded_values(12420, 720, -80, 0);
        assert!(t.tilt_pro());

        // An anomalous Classic-range reading must not demote the device.
        t.process_decoded_values(1242, 72, -80, 0);
        assert!(t.tilt_pro());
        assert_eq!(t.raw_gravity(), dec!(1.242));
    }

    #[test]
    fn test_firmware_version_beacon_not_buffered() {
        let mut t = tilt();
        t.process_decoded_values(23, 999, -80, 0);
        assert_eq!(t.firmware_version(), 23);
        assert!(t.expired());
        assert_eq!(t.smoothed_gravity(), Decimal::ZERO);
        assert_eq!(t.gravity_samples.len(), 0);
        assert_eq!(t.temp_samples.len(), 0);
    }

    #[test]
    fn test_battery_weeks_follow_marker() {
        let mut t = tilt();
        t.process_decoded_values(1242, 72, -80, BATTERY_MARKER);
        assert!(t.sends_battery());
        assert_eq!(t.weeks_on_battery(), 0);

        t.process_decoded_values(1242, 72, -80, 12);
        assert!(t.sends_battery());
        assert_eq!(t.weeks_on_battery(), 12);
    }

    #[test]
    fn test_no_battery_without_marker() {
        let mut t = tilt();
        t.process_decoded_values(1242, 72, -80, 12);
        assert!(!t.sends_battery());
        assert_eq!(t.weeks_on_battery(), 0);
    }

    #[test]
    fn test_smoothed_gravity_classic() {
        let mut t = tilt();
        for code in [1000, 2000, 3000] {
            t.process_decoded_values(code, 72, -80, 0);
        }
        assert_eq!(t.smoothed_gravity(), dec!(2.000));
    }

    #[test]
    fn test_smoothed_temp_classic_rounds_to_whole_degree() {
        let mut t = tilt();
        for code in [65, 68, 70] {
            t.process_decoded_values(1242, code, -80, 0);
        }
        // mean 67.666... rounds to 68
        assert_eq!(t.smoothed_temp(), dec!(68));
    }

    #[test]
    fn test_smoothed_temp_pro_keeps_one_decimal() {
        let mut t = tilt();
        for code in [650, 683, 701] {
            t.process_decoded_values(12420, code, -80, 0);
        }
        // mean of 65.0, 68.3, 70.1 is 67.8 exactly
        assert_eq!(t.smoothed_temp(), dec!(67.8));
    }

    #[test]
    fn test_smoothed_values_zero_when_empty() {
        let t = tilt();
        assert_eq!(t.smoothed_gravity(), dec!(0.000));
        assert_eq!(t.smoothed_temp(), dec!(0));
    }

    #[test]
    fn test_buffers_stay_in_lockstep_and_bounded() {
        let mut t = TiltHydrometer::new(TiltColor::Blue, 5);
        for code in 1000..1020 {
            t.process_decoded_values(code, 72, -80, 0);
        }
        assert_eq!(t.gravity_samples.len(), 5);
        assert_eq!(t.temp_samples.len(), 5);
        // Oldest evicted first: the buffer holds the last five readings.
        assert_eq!(t.gravity_samples.front().copied(), Some(dec!(1.015)));
        assert_eq!(t.gravity_samples.back().copied(), Some(dec!(1.019)));
    }

    #[test]
    fn test_expiry_clears_buffers_before_append() {
        let mut t = tilt();
        t.process_decoded_values(1000, 65, -80, 0);
        t.process_decoded_values(2000, 68, -80, 0);
        assert_eq!(t.gravity_samples.len(), 2);

        // Simulate losing contact for longer than the expiry horizon.
        t.last_value_received = None;
        t.process_decoded_values(3000, 70, -80, 0);

        assert_eq!(t.gravity_samples.len(), 1);
        assert_eq!(t.temp_samples.len(), 1);
        assert_eq!(t.smoothed_gravity(), dec!(3.000));
        assert!(!t.expired());
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut t = tilt();
        t.process_decoded_values(1242, 72, -80, BATTERY_MARKER);
        t.process_decoded_values(1242, 72, -80, 3);

        let json = serde_json::to_value(t.to_snapshot()).unwrap();
        assert_eq!(json["color"], "Red");
        assert_eq!(json["raw_gravity"], 1.242);
        assert_eq!(json["raw_temp"], 72.0);
        assert_eq!(json["rssi"], -80);
        assert_eq!(json["tilt_pro"], false);
        assert_eq!(json["sends_battery"], true);
        assert_eq!(json["weeks_on_battery"], 3);
        assert_eq!(json["firmware_version"], 0);
        assert_eq!(json["smoothed_gravity"], 1.242);
        assert_eq!(json["smoothed_temp"], 72.0);
        assert_eq!(json["smoothing_window"], 60);
    }
}
