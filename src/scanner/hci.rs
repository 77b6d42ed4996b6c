//! Raw HCI socket backend.
//!
//! Uses raw Linux HCI sockets to receive BLE advertisements without the
//! BlueZ daemon, matching how Tilt repeaters are usually deployed (a bare
//! container with direct adapter access). Requires CAP_NET_RAW and
//! CAP_NET_ADMIN capabilities or root privileges.

use super::{ADVERTISEMENT_CHANNEL_BUFFER_SIZE, Advertisement, ScanError};
use libc::{AF_BLUETOOTH, SOCK_CLOEXEC, SOCK_RAW, c_int, c_void, sockaddr, socklen_t};
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use tokio::io::unix::AsyncFd;
use tokio::sync::mpsc;

// HCI protocol constants
const BTPROTO_HCI: c_int = 1;
const HCI_FILTER: c_int = 2;

// HCI packet types
const HCI_EVENT_PKT: u8 = 0x04;

// HCI events
const EVT_LE_META_EVENT: u8 = 0x3E;

// LE Meta event sub-events
const EVT_LE_ADVERTISING_REPORT: u8 = 0x02;

// HCI commands
const OGF_LE_CTL: u16 = 0x08;
const OCF_LE_SET_SCAN_PARAMETERS: u16 = 0x000B;
const OCF_LE_SET_SCAN_ENABLE: u16 = 0x000C;

// Scan types
const LE_SCAN_PASSIVE: u8 = 0x00;

// Own address type
const LE_PUBLIC_ADDRESS: u8 = 0x00;

// Filter policy
const FILTER_POLICY_ACCEPT_ALL: u8 = 0x00;

// AD types
const AD_TYPE_MANUFACTURER_DATA: u8 = 0xFF;

/// HCI socket address structure
#[repr(C)]
struct SockaddrHci {
    hci_family: u16,
    hci_dev: u16,
    hci_channel: u16,
}

/// HCI filter structure for raw sockets
#[repr(C)]
struct HciFilter {
    type_mask: u32,
    event_mask: [u32; 2],
    opcode: u16,
}

impl HciFilter {
    fn new() -> Self {
        Self {
            type_mask: 0,
            event_mask: [0, 0],
            opcode: 0,
        }
    }

    fn set_ptype(&mut self, ptype: u8) {
        self.type_mask |= 1 << (ptype as u32);
    }

    fn set_event(&mut self, event: u8) {
        let bit = event as usize;
        self.event_mask[bit / 32] |= 1 << (bit % 32);
    }
}

/// LE Set Scan Parameters command
#[repr(C, packed)]
struct LeSetScanParametersCmd {
    scan_type: u8,
    interval: u16,
    window: u16,
    own_address_type: u8,
    filter_policy: u8,
}

/// LE Set Scan Enable command
#[repr(C, packed)]
struct LeSetScanEnableCmd {
    enable: u8,
    filter_dup: u8,
}

/// Create an HCI command packet
fn hci_command_packet(ogf: u16, ocf: u16, params: &[u8]) -> Vec<u8> {
    let opcode = (ogf << 10) | ocf;
    let mut packet = Vec::with_capacity(4 + params.len());
    packet.push(0x01); // HCI command packet type
    packet.push((opcode & 0xFF) as u8);
    packet.push((opcode >> 8) as u8);
    packet.push(params.len() as u8);
    packet.extend_from_slice(params);
    packet
}

/// Open a raw HCI socket
fn open_hci_socket() -> Result<OwnedFd, ScanError> {
    // SOCK_NONBLOCK is required for AsyncFd to work properly
    let fd = unsafe {
        libc::socket(
            AF_BLUETOOTH,
            SOCK_RAW | SOCK_CLOEXEC | libc::SOCK_NONBLOCK,
            BTPROTO_HCI,
        )
    };

    if fd < 0 {
        return Err(ScanError::Bluetooth(format!(
            "Failed to create HCI socket: {}. Is there a bluetooth adapter attached?",
            io::Error::last_os_error()
        )));
    }

    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Bind HCI socket to a device
fn bind_hci_socket(fd: &OwnedFd, dev_id: u16) -> Result<(), ScanError> {
    let addr = SockaddrHci {
        hci_family: AF_BLUETOOTH as u16,
        hci_dev: dev_id,
        hci_channel: 0, // HCI_CHANNEL_RAW
    };

    let ret = unsafe {
        libc::bind(
            fd.as_raw_fd(),
            &addr as *const SockaddrHci as *const sockaddr,
            mem::size_of::<SockaddrHci>() as socklen_t,
        )
    };

    if ret < 0 {
        return Err(ScanError::Bluetooth(format!(
            "Failed to bind HCI socket to hci{}: {}",
            dev_id,
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

/// Set HCI socket filter
fn set_hci_filter(fd: &OwnedFd) -> Result<(), ScanError> {
    let mut filter = HciFilter::new();
    filter.set_ptype(HCI_EVENT_PKT);
    filter.set_event(EVT_LE_META_EVENT);

    let ret = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            0, // SOL_HCI
            HCI_FILTER,
            &filter as *const HciFilter as *const c_void,
            mem::size_of::<HciFilter>() as socklen_t,
        )
    };

    if ret < 0 {
        return Err(ScanError::Bluetooth(format!(
            "Failed to set HCI filter: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

/// Send an HCI command
fn send_hci_command(fd: &OwnedFd, packet: &[u8]) -> Result<(), ScanError> {
    let ret = unsafe {
        libc::write(
            fd.as_raw_fd(),
            packet.as_ptr() as *const c_void,
            packet.len(),
        )
    };

    if ret < 0 {
        return Err(ScanError::Bluetooth(format!(
            "Failed to send HCI command: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

/// Configure LE scanning parameters
fn configure_le_scan(fd: &OwnedFd) -> Result<(), ScanError> {
    // Set scan parameters: passive scan, 10ms interval, 10ms window
    let params = LeSetScanParametersCmd {
        scan_type: LE_SCAN_PASSIVE,
        interval: 0x0010, // 10ms in 0.625ms units
        window: 0x0010,   // 10ms in 0.625ms units
        own_address_type: LE_PUBLIC_ADDRESS,
        filter_policy: FILTER_POLICY_ACCEPT_ALL,
    };

    let params_bytes = unsafe {
        std::slice::from_raw_parts(
            &params as *const LeSetScanParametersCmd as *const u8,
            mem::size_of::<LeSetScanParametersCmd>(),
        )
    };

    let packet = hci_command_packet(OGF_LE_CTL, OCF_LE_SET_SCAN_PARAMETERS, params_bytes);
    send_hci_command(fd, &packet)?;

    // Enable scanning; duplicates are wanted since every beacon is a sample
    let enable = LeSetScanEnableCmd {
        enable: 0x01,
        filter_dup: 0x00,
    };

    let enable_bytes = unsafe {
        std::slice::from_raw_parts(
            &enable as *const LeSetScanEnableCmd as *const u8,
            mem::size_of::<LeSetScanEnableCmd>(),
        )
    };

    let packet = hci_command_packet(OGF_LE_CTL, OCF_LE_SET_SCAN_ENABLE, enable_bytes);
    send_hci_command(fd, &packet)?;

    Ok(())
}

/// Parse an LE advertising report into an [`Advertisement`].
///
/// Extracts the manufacturer-specific data value and the trailing RSSI byte
/// of the first report. Returns `None` for packets that are not structurally
/// complete advertising reports.
fn parse_advertising_report(data: &[u8]) -> Option<Advertisement> {
    // Minimum size for an advertising report
    if data.len() < 12 {
        return None;
    }

    // Skip HCI header (packet type + event code + param len + subevent)
    let report = &data[4..];

    // Number of reports; we process the first per event
    let num_reports = report[0] as usize;
    if num_reports == 0 {
        return None;
    }

    // Layout: num_reports(1) + event_type(1) + addr_type(1) + addr(6) +
    // data_len(1) + data + rssi(1)
    if report.len() < 10 {
        return None;
    }
    let data_len = report[9] as usize;
    if report.len() < 10 + data_len {
        return None;
    }

    let ad_data = &report[10..10 + data_len];
    let rssi = report
        .get(10 + data_len)
        .map(|&byte| i16::from(byte as i8));

    // Walk AD structures to find manufacturer-specific data
    let mut manufacturer_data = None;
    let mut offset = 0;
    while offset + 2 <= ad_data.len() {
        let len = ad_data[offset] as usize;
        if len == 0 || offset + 1 + len > ad_data.len() {
            break;
        }

        let ad_type = ad_data[offset + 1];
        if ad_type == AD_TYPE_MANUFACTURER_DATA && len >= 3 {
            // Strip the 2-byte little-endian company identifier; the decoder
            // works on the value that follows it.
            manufacturer_data = Some(ad_data[offset + 4..offset + 1 + len].to_vec());
            break;
        }

        offset += 1 + len;
    }

    Some(Advertisement {
        raw: data.to_vec(),
        manufacturer_data,
        rssi,
    })
}

/// Start scanning for advertisements using raw HCI sockets.
///
/// Opens a raw HCI socket on the given device, configures passive LE
/// scanning, and forwards every advertising report through the returned
/// channel. Runs indefinitely until interrupted.
pub async fn start_scan(device: u16) -> Result<mpsc::Receiver<Advertisement>, ScanError> {
    // Open and configure HCI socket for receiving events
    let fd = open_hci_socket()?;
    bind_hci_socket(&fd, device)?;
    set_hci_filter(&fd)?;

    // We need a separate socket for sending commands (bound to specific device)
    let cmd_fd = open_hci_socket()?;
    bind_hci_socket(&cmd_fd, device)?;
    configure_le_scan(&cmd_fd)?;

    let (tx, rx) = mpsc::channel(ADVERTISEMENT_CHANNEL_BUFFER_SIZE);

    // Wrap in AsyncFd for async I/O
    let async_fd = AsyncFd::new(fd)
        .map_err(|e| ScanError::Bluetooth(format!("Failed to create async fd: {}", e)))?;

    // Spawn a task to read and forward HCI events
    tokio::spawn(async move {
        let _cmd_fd = cmd_fd; // Keep command socket alive
        let mut buf = [0u8; 258]; // Max HCI event size

        loop {
            // Wait for the socket to be readable
            let mut guard = match async_fd.readable().await {
                Ok(guard) => guard,
                Err(_) => break,
            };

            // Drain all available packets before waiting again
            loop {
                let n = match guard.try_io(|inner| {
                    let ret = unsafe {
                        libc::read(
                            inner.as_raw_fd(),
                            buf.as_mut_ptr() as *mut c_void,
                            buf.len(),
                        )
                    };
                    if ret < 0 {
                        Err(io::Error::last_os_error())
                    } else {
                        Ok(ret as usize)
                    }
                }) {
                    Ok(Ok(n)) if n > 0 => n,
                    Ok(Ok(_)) => break,  // EOF or empty read
                    Ok(Err(_)) => break, // Read error
                    Err(_) => break,     // WouldBlock - no more data
                };

                // Forward LE advertising reports
                if n >= 4
                    && buf[0] == HCI_EVENT_PKT
                    && buf[1] == EVT_LE_META_EVENT
                    && buf[3] == EVT_LE_ADVERTISING_REPORT
                    && let Some(event) = parse_advertising_report(&buf[..n])
                {
                    let _ = tx.send(event).await;
                }
            }
        }
    });

    Ok(rx)
}
