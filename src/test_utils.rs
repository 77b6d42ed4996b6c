//! Shared helpers for unit tests: canned Tilt advertisements and a
//! recording fake transport.

use crate::scanner::Advertisement;
use crate::target::{Transport, TransportError, TransportResponse};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// The Red Tilt device identifier as raw bytes.
pub const RED_UUID: [u8; 16] = [
    0xa4, 0x95, 0xbb, 0x10, 0xc5, 0xb1, 0x4b, 0x44, 0xb5, 0x12, 0x13, 0x70, 0xf0, 0x2d, 0x74, 0xde,
];

/// The Green Tilt device identifier as raw bytes.
pub const GREEN_UUID: [u8; 16] = [
    0xa4, 0x95, 0xbb, 0x20, 0xc5, 0xb1, 0x4b, 0x44, 0xb5, 0x12, 0x13, 0x70, 0xf0, 0x2d, 0x74, 0xde,
];

/// The 23-byte iBeacon manufacturer data value for a Tilt beacon.
pub fn tilt_manufacturer_data(uuid: [u8; 16], temp: u16, gravity: u16, tx_power: u8) -> Vec<u8> {
    let mut data = vec![0x02, 0x15];
    data.extend_from_slice(&uuid);
    data.extend_from_slice(&temp.to_be_bytes());
    data.extend_from_slice(&gravity.to_be_bytes());
    data.push(tx_power);
    data
}

/// A complete raw HCI LE advertising report packet for a Tilt beacon.
pub fn tilt_packet(uuid: [u8; 16], temp: u16, gravity: u16, tx_power: u8, rssi: i8) -> Vec<u8> {
    let mfg = tilt_manufacturer_data(uuid, temp, gravity, tx_power);

    // AD structures: flags + manufacturer-specific data (company id 0x004C)
    let mut ad_data = vec![0x02, 0x01, 0x04];
    ad_data.push(3 + mfg.len() as u8); // length byte covers type + company id + value
    ad_data.push(0xFF);
    ad_data.extend_from_slice(&[0x4C, 0x00]);
    ad_data.extend_from_slice(&mfg);

    // num_reports + event_type + addr_type + addr + data_len + data + rssi
    let mut report = vec![0x01, 0x00, 0x00];
    report.extend_from_slice(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
    report.push(ad_data.len() as u8);
    report.extend_from_slice(&ad_data);
    report.push(rssi as u8);

    // HCI event header: packet type + LE meta event + param len + subevent
    let mut packet = vec![0x04, 0x3E, (report.len() + 1) as u8, 0x02];
    packet.extend_from_slice(&report);
    packet
}

/// A decoded-to-event view of a Tilt beacon, as the scanner would hand it to
/// the pipeline.
pub fn tilt_advertisement(
    uuid: [u8; 16],
    temp: u16,
    gravity: u16,
    tx_power: u8,
    rssi: i16,
) -> Advertisement {
    Advertisement {
        raw: tilt_packet(uuid, temp, gravity, tx_power, rssi as i8),
        manufacturer_data: Some(tilt_manufacturer_data(uuid, temp, gravity, tx_power)),
        rssi: Some(rssi),
    }
}

/// Shared record of every (url, body) pair posted through a [`FakeTransport`].
pub type PostLog = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

/// Transport double that records posts and answers with a canned response.
pub struct FakeTransport {
    posts: PostLog,
    response: Box<dyn Fn() -> Result<TransportResponse, TransportError> + Send + Sync>,
}

impl FakeTransport {
    /// A transport that always answers HTTP 200.
    pub fn ok() -> (Self, PostLog) {
        Self::with(|| {
            Ok(TransportResponse {
                status: 200,
                body: String::new(),
            })
        })
    }

    /// A transport that always answers the given status and body.
    pub fn error_status(status: u16, body: &str) -> (Self, PostLog) {
        let body = body.to_string();
        Self::with(move || {
            Ok(TransportResponse {
                status,
                body: body.clone(),
            })
        })
    }

    pub fn with(
        response: impl Fn() -> Result<TransportResponse, TransportError> + Send + Sync + 'static,
    ) -> (Self, PostLog) {
        let posts: PostLog = Arc::new(Mutex::new(Vec::new()));
        let transport = FakeTransport {
            posts: Arc::clone(&posts),
            response: Box::new(response),
        };
        (transport, posts)
    }
}

impl Transport for FakeTransport {
    fn post(
        &self,
        url: String,
        body: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + '_>> {
        self.posts.lock().unwrap().push((url, body));
        let result = (self.response)();
        Box::pin(async move { result })
    }
}
