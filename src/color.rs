//! Tilt color registry.
//!
//! Every Tilt hydrometer broadcasts one of eight fixed device identifiers,
//! one per color. This module maps decoded identifiers back to their color.
//! The set is a compile-time constant; lookup tables are built once at first
//! use and never change afterwards.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// The eight colors a Tilt hydrometer can ship as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TiltColor {
    Red,
    Green,
    Black,
    Purple,
    Orange,
    Blue,
    Yellow,
    Pink,
}

impl TiltColor {
    /// All known colors, in canonical order.
    pub const ALL: [TiltColor; 8] = [
        TiltColor::Red,
        TiltColor::Green,
        TiltColor::Black,
        TiltColor::Purple,
        TiltColor::Orange,
        TiltColor::Blue,
        TiltColor::Yellow,
        TiltColor::Pink,
    ];

    /// The dashed device identifier broadcast by Tilts of this color.
    pub fn device_uuid(self) -> &'static str {
        match self {
            TiltColor::Red => "a495bb10-c5b1-4b44-b512-1370f02d74de",
            TiltColor::Green => "a495bb20-c5b1-4b44-b512-1370f02d74de",
            TiltColor::Black => "a495bb30-c5b1-4b44-b512-1370f02d74de",
            TiltColor::Purple => "a495bb40-c5b1-4b44-b512-1370f02d74de",
            TiltColor::Orange => "a495bb50-c5b1-4b44-b512-1370f02d74de",
            TiltColor::Blue => "a495bb60-c5b1-4b44-b512-1370f02d74de",
            TiltColor::Yellow => "a495bb70-c5b1-4b44-b512-1370f02d74de",
            TiltColor::Pink => "a495bb80-c5b1-4b44-b512-1370f02d74de",
        }
    }
}

impl fmt::Display for TiltColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TiltColor::Red => "Red",
            TiltColor::Green => "Green",
            TiltColor::Black => "Black",
            TiltColor::Purple => "Purple",
            TiltColor::Orange => "Orange",
            TiltColor::Blue => "Blue",
            TiltColor::Yellow => "Yellow",
            TiltColor::Pink => "Pink",
        };
        write!(f, "{name}")
    }
}

/// Lookup table keyed by the dashed identifier form.
static BY_UUID: LazyLock<HashMap<&'static str, TiltColor>> = LazyLock::new(|| {
    TiltColor::ALL
        .iter()
        .map(|&color| (color.device_uuid(), color))
        .collect()
});

/// Lookup table keyed by the dashless identifier form.
static BY_UUID_NO_DASH: LazyLock<HashMap<String, TiltColor>> = LazyLock::new(|| {
    TiltColor::ALL
        .iter()
        .map(|&color| (color.device_uuid().replace('-', ""), color))
        .collect()
});

/// Resolve a device identifier (dashed or dashless) to its Tilt color.
///
/// Returns `None` for identifiers that do not belong to any known Tilt.
pub fn lookup(identifier: &str) -> Option<TiltColor> {
    BY_UUID
        .get(identifier)
        .copied()
        .or_else(|| BY_UUID_NO_DASH.get(identifier).copied())
}
