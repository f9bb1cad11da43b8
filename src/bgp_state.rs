//! Per-AS BGP state and the two primitives that operate on it: `receive`
//! (stage the best candidate per prefix) and `process_queue` (drain staged
//! candidates into the RIB).

use std::collections::HashMap;

use crate::announcement::Announcement;
use crate::shared::{Asn, PrefixId};

/// The routing state owned by a single AS.
#[derive(Debug, Default)]
pub struct BgpState {
    /// The currently installed route for each prefix.
    pub rib: HashMap<PrefixId, Announcement>,
    /// Staging area holding the best candidate received since the last
    /// drain. Always empty between phases.
    pub recv_queue: HashMap<PrefixId, Announcement>,
    pub is_rov: bool,
}

impl BgpState {
    pub fn new(is_rov: bool) -> Self {
        BgpState {
            rib: HashMap::new(),
            recv_queue: HashMap::new(),
            is_rov,
        }
    }

    /// Stages an incoming announcement addressed to `self_asn`. Drops it
    /// silently if `self_asn` already appears anywhere in the path (the
    /// route has already looped through this AS) or if this AS runs ROV
    /// and the announcement is `rov_invalid`. Otherwise keeps only the
    /// single best candidate per prefix, comparing against whatever is
    /// already staged since the last drain, or failing that, against the
    /// currently installed RIB entry — a candidate that can't beat what's
    /// already installed never gets the chance to unconditionally
    /// overwrite it at the next `process_queue`.
    pub fn receive(&mut self, self_asn: Asn, ann: Announcement) {
        if self.is_rov && ann.rov_invalid {
            return;
        }
        if ann.as_path.contains(&self_asn) {
            return;
        }

        match self.recv_queue.entry(ann.prefix_id) {
            std::collections::hash_map::Entry::Vacant(slot) => {
                if let Some(installed) = self.rib.get(&ann.prefix_id) {
                    if !ann.is_preferred_over(installed) {
                        return;
                    }
                }
                slot.insert(ann);
            }
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                if ann.is_preferred_over(slot.get()) {
                    slot.insert(ann);
                }
            }
        }
    }

    /// Installs every staged candidate into the RIB, prepending `self_asn`
    /// to the path unless it's already the head, then clears the queue.
    pub fn process_queue(&mut self, self_asn: Asn) {
        for (prefix_id, mut ann) in self.recv_queue.drain() {
            if ann.as_path.first() != Some(&self_asn) {
                ann.as_path.insert(0, self_asn);
            }
            self.rib.insert(prefix_id, ann);
        }
    }
}
