//! Rate-limited forwarding to a legacy Fermentrack endpoint.
//!
//! Called on every decoded-beacon event; dispatches the current non-expired
//! fleet as JSON no more than once per send interval. Transport failures are
//! contained here: they are logged, they advance the rate-limit timer, and
//! nothing propagates back into the ingestion path.

use crate::fleet::Fleet;
use crate::target::Transport;
use crate::throttle::SendWindow;
use log::{error, info};
use std::time::Duration;

/// Minimum time between dispatches to Fermentrack.
pub const SEND_FREQUENCY: Duration = Duration::from_secs(3);

/// Shortest target URL considered usable (`http://` plus a host).
const MIN_URL_LEN: usize = 12;

/// Forwarding target for the legacy Fermentrack HTTP API.
pub struct FermentrackTarget {
    enabled: bool,
    target_url: Option<String>,
    window: SendWindow,
    transport: Box<dyn Transport>,
}

impl FermentrackTarget {
    /// Build the target and log its configuration state once.
    ///
    /// An enabled target with a missing or malformed URL becomes a permanent
    /// no-op rather than an error; the condition is logged here at startup.
    pub fn new(
        enabled: bool,
        target_url: Option<String>,
        send_interval: Duration,
        transport: Box<dyn Transport>,
    ) -> Self {
        let target = FermentrackTarget {
            enabled,
            target_url,
            window: SendWindow::new(send_interval),
            transport,
        };

        if !target.enabled {
            info!("Logging to Fermentrack is disabled");
        } else if let Some(url) = target.valid_url() {
            info!("Logging to Fermentrack is enabled, with target URL {url}");
        } else {
            error!("Logging to Fermentrack is enabled, but the target URL is invalid");
        }

        target
    }

    fn valid_url(&self) -> Option<&str> {
        self.target_url
            .as_deref()
            .filter(|url| url.len() >= MIN_URL_LEN)
    }

    /// Consider sending the current fleet state downstream.
    ///
    /// No-op while disabled, misconfigured, or inside the send window.
    /// Otherwise posts `{"tilts": [...], "tiltbridge_junior": true}` with all
    /// non-expired readings. Every dispatch attempt, failed or not, resets
    /// the window so an unreachable endpoint is not hammered.
    pub async fn process(&mut self, fleet: &Fleet) {
        if !self.enabled {
            return;
        }
        let Some(url) = self.valid_url() else {
            return;
        };
        if !self.window.ready() {
            return;
        }

        let snapshots = fleet.snapshots();
        let sent = snapshots.len();
        let body = serde_json::json!({
            "tilts": snapshots,
            "tiltbridge_junior": true,
        });

        match self.transport.post(url.to_string(), body).await {
            Err(e) => error!("{e}"),
            Ok(response) if !response.is_success() => {
                error!("Error sending data to Fermentrack: {}", response.body);
            }
            Ok(_) => info!("Sent {sent} Tilt(s) to Fermentrack"),
        }
        self.window.mark_sent();
    }

    /// Shift the rate window into the past so the next call is eligible.
    #[cfg(test)]
    pub(crate) fn backdate_window(&mut self, by: Duration) {
        self.window.backdate(by);
    }
}
