//! BLE advertisement source.
//!
//! The scanner owns the radio plumbing and nothing else: it configures
//! passive LE scanning on a raw HCI socket and hands each received
//! advertising report to the pipeline as an [`Advertisement`]. All
//! Tilt-specific interpretation happens in [`crate::decoder`].

pub mod hci;

use thiserror::Error;
use tokio::sync::mpsc;

/// Channel buffer size for advertisement events.
pub const ADVERTISEMENT_CHANNEL_BUFFER_SIZE: usize = 100;

/// One received advertisement event.
#[derive(Debug, Clone, PartialEq)]
pub struct Advertisement {
    /// The raw HCI event bytes as read from the socket.
    pub raw: Vec<u8>,
    /// The manufacturer-specific data value (bytes after the 2-byte company
    /// identifier), when the report carries one.
    pub manufacturer_data: Option<Vec<u8>>,
    /// Signal strength reported alongside the advertisement.
    pub rssi: Option<i16>,
}

/// Error type for scanner operations.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Bluetooth/adapter related error
    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
}

/// Start scanning for advertisements on the given HCI device.
///
/// # Arguments
/// * `device` - HCI device number (0 = hci0)
///
/// # Returns
/// A receiver of raw advertisement events. Runs until the process exits.
pub async fn start_scan(device: u16) -> Result<mpsc::Receiver<Advertisement>, ScanError> {
    hci::start_scan(device).await
}
