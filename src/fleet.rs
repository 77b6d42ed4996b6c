//! The fleet of Tilt hydrometers tracked by this process.
//!
//! One [`TiltHydrometer`] per color, created eagerly at startup. The fleet is
//! the explicit context object threaded through the event loop; forwarding
//! targets read it, the ingestion path writes it.

use crate::color::TiltColor;
use crate::hydrometer::{Snapshot, TiltHydrometer};
use std::collections::BTreeMap;

/// All tracked hydrometers, keyed by color.
#[derive(Debug)]
pub struct Fleet {
    smoothing_window: usize,
    tilts: BTreeMap<TiltColor, TiltHydrometer>,
}

impl Fleet {
    /// Create a fleet with one hydrometer per known color.
    pub fn new(smoothing_window: usize) -> Self {
        let tilts = TiltColor::ALL
            .iter()
            .map(|&color| (color, TiltHydrometer::new(color, smoothing_window)))
            .collect();
        Fleet {
            smoothing_window,
            tilts,
        }
    }

    pub fn get(&self, color: TiltColor) -> Option<&TiltHydrometer> {
        self.tilts.get(&color)
    }

    /// Mutable access to the hydrometer for a color.
    ///
    /// The mapping is total over [`TiltColor::ALL`]; the entry fallback only
    /// exists to keep that invariant without a panic path.
    pub fn get_mut(&mut self, color: TiltColor) -> &mut TiltHydrometer {
        let window = self.smoothing_window;
        self.tilts
            .entry(color)
            .or_insert_with(|| TiltHydrometer::new(color, window))
    }

    /// Serializable views of every non-expired hydrometer, in color order.
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.tilts
            .values()
            .filter(|tilt| !tilt.expired())
            .map(TiltHydrometer::to_snapshot)
            .collect()
    }
}
