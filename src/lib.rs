//! `tiltbridge-jr` library.
//!
//! Listens for Tilt hydrometer beacons, maintains smoothed per-color state,
//! and forwards the fleet to a Fermentrack endpoint at a bounded rate.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing, logging setup,
//! and process exit codes. The core "business logic" lives in [`crate::app`]
//! where it can be tested deterministically with an injected advertisement
//! source and an injected transport.

pub mod app;
pub mod color;
pub mod decoder;
pub mod device_id;
pub mod fleet;
pub mod hydrometer;
pub mod scanner;
pub mod target;
pub mod throttle;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use app::{AdvertisementSource, HciSource, Options, RunError};
pub use color::{TiltColor, lookup};
pub use decoder::{DecodeError, SensorFrame, decode};
pub use device_id::DeviceId;
pub use fleet::Fleet;
pub use hydrometer::{DEFAULT_SMOOTHING_WINDOW, Snapshot, TiltHydrometer};
pub use scanner::{Advertisement, ScanError};
pub use target::fermentrack::FermentrackTarget;
pub use target::{HttpTransport, Transport};
pub use throttle::{SendWindow, parse_duration};
