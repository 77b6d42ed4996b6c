//! Core application runner (business logic) for `tiltbridge-jr`.
//!
//! This module is intentionally decoupled from CLI parsing and process exit
//! codes so it can be tested deterministically with an injected
//! advertisement source and transport.

use crate::color;
use crate::decoder;
use crate::fleet::Fleet;
use crate::hydrometer::DEFAULT_SMOOTHING_WINDOW;
use crate::scanner::{Advertisement, ScanError};
use crate::target::fermentrack::FermentrackTarget;
use crate::throttle::parse_duration;
use clap::Parser;
use log::{debug, error, info};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Configuration for the core run loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Forward readings to a legacy Fermentrack endpoint.
    #[arg(long)]
    pub enable_fermentrack: bool,

    /// Target URL of the Fermentrack endpoint.
    #[arg(long)]
    pub fermentrack_url: Option<String>,

    /// Minimum time between sends to Fermentrack.
    /// Accepts duration with suffix: 3s, 1m, 500ms, 2h.
    /// Without suffix, value is interpreted as seconds.
    #[arg(long, value_parser = parse_duration, default_value = "3s")]
    pub send_interval: Duration,

    /// Number of samples averaged to produce smoothed readings.
    #[arg(long, default_value_t = DEFAULT_SMOOTHING_WINDOW)]
    pub smoothing_window: usize,

    /// Bluetooth HCI device number to scan on (0 = hci0).
    #[arg(long, default_value_t = 0)]
    pub device: u16,

    /// Verbose output, log accepted readings and dropped beacons
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Advertisement source abstraction to enable deterministic unit tests
/// without Bluetooth hardware.
pub trait AdvertisementSource: Send + Sync {
    fn start(
        &self,
        device: u16,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<Advertisement>, ScanError>> + Send + '_>>;
}

/// Real source that reads from the raw HCI socket backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct HciSource;

impl AdvertisementSource for HciSource {
    fn start(
        &self,
        device: u16,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<Advertisement>, ScanError>> + Send + '_>>
    {
        Box::pin(async move { crate::scanner::start_scan(device).await })
    }
}

/// Run the core processing loop: decode beacons, update the fleet, and let
/// the forwarding target consider a dispatch after every accepted event.
///
/// Every failure past startup is event-scoped: malformed beacons and unknown
/// devices are logged and dropped, and the loop continues with the next
/// advertisement.
pub async fn run(
    options: &Options,
    source: &dyn AdvertisementSource,
    target: &mut FermentrackTarget,
) -> Result<(), RunError> {
    let mut fleet = Fleet::new(options.smoothing_window);
    let mut events = source.start(options.device).await?;

    while let Some(event) = events.recv().await {
        let frame = match decoder::decode(&event) {
            Ok(frame) => frame,
            Err(e) if e.is_foreign() => {
                debug!("{e}");
                continue;
            }
            Err(e) => {
                error!("{e}");
                continue;
            }
        };

        let Some(tilt_color) = color::lookup(&frame.device_id.to_string()) else {
            error!("Unable to find a Tilt color for UUID {}", frame.device_id);
            continue;
        };

        fleet.get_mut(tilt_color).process_decoded_values(
            frame.gravity_code,
            frame.temp_code,
            frame.rssi,
            frame.tx_power,
        );

        info!(
            "Found Tilt: {} - Temp: {}, Gravity: {}, RSSI: {}, TX Pwr: {}",
            tilt_color, frame.temp_code, frame.gravity_code, frame.rssi, frame.tx_power
        );

        target.process(&fleet).await;
    }

    Ok(())
}
