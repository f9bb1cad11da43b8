//! The announcement value and its preference order.

use crate::shared::{Asn, ExportRel, PrefixId};

/// An immutable route record. Cheap to clone: the only heap allocation is
/// the `as_path` vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub prefix_id: PrefixId,
    /// Most-recent AS first.
    pub as_path: Vec<Asn>,
    /// The ASN this holder received the route from (or the origin itself).
    pub next_hop: Asn,
    pub rel: ExportRel,
    pub rov_invalid: bool,
}

impl Announcement {
    /// Builds the self-originated announcement seeded into an origin's RIB.
    pub fn origin(prefix_id: PrefixId, origin_asn: Asn, rov_invalid: bool) -> Self {
        Announcement {
            prefix_id,
            as_path: vec![origin_asn],
            next_hop: origin_asn,
            rel: ExportRel::Origin,
            rov_invalid,
        }
    }

    /// Returns a copy of this announcement as exported by `sender` with the
    /// given export tag — `next_hop` becomes the sender, `rel` becomes
    /// `export_rel`. Used by the propagation engine when sending to
    /// neighbours; the receiving side prepends its own ASN on drain.
    pub fn exported_by(&self, sender: Asn, export_rel: ExportRel) -> Self {
        Announcement {
            prefix_id: self.prefix_id,
            as_path: self.as_path.clone(),
            next_hop: sender,
            rel: export_rel,
            rov_invalid: self.rov_invalid,
        }
    }

    /// The preference key used to pick the better of two candidates for the
    /// same prefix: higher `rel` wins, then strictly shorter path, then
    /// numerically smaller `next_hop`. A strict total order — never compare
    /// announcements for different prefixes with it.
    fn preference_key(&self) -> (ExportRel, std::cmp::Reverse<usize>, std::cmp::Reverse<Asn>) {
        (
            self.rel,
            std::cmp::Reverse(self.as_path.len()),
            std::cmp::Reverse(self.next_hop),
        )
    }

    /// True iff `self` is strictly preferred over `other` per spec.md §3's
    /// preference order.
    pub fn is_preferred_over(&self, other: &Announcement) -> bool {
        self.preference_key() > other.preference_key()
    }
}
