//! Small shared types used across the crate: ASN/PrefixID aliases and the
//! two relationship vocabularies — the CAIDA edge kind used while loading
//! the graph, and the export-priority tag carried on announcements.

use std::fmt;

/// An Autonomous System Number.
pub type Asn = u32;

/// A dense, append-only index into the prefix dictionary.
pub type PrefixId = u32;

/// The business-relationship kind of a CAIDA input line. Stored only
/// transiently while loading; the graph itself keeps provider/customer/peer
/// edge lists rather than a tagged edge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    /// `ASN1` is a customer of `ASN2`.
    CustomerToProvider,
    /// `ASN1` is a provider of `ASN2`.
    ProviderToCustomer,
    /// `ASN1` and `ASN2` peer with each other.
    PeerToPeer,
}

impl RelationshipKind {
    /// Maps the CAIDA `-1/0/1` type column onto a relationship kind.
    pub fn from_caida_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(Self::CustomerToProvider),
            0 => Some(Self::ProviderToCustomer),
            1 => Some(Self::PeerToPeer),
            _ => None,
        }
    }
}

/// The export-relationship tag carried on every announcement, recording how
/// the current holder learned the route. Declaration order is priority
/// order: later variants are strictly preferred (`Origin > Cust > Peer >
/// Prov`), matching spec.md's `ORIGIN(3) > CUST(2) > PEER(1) > PROV(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ExportRel {
    Prov = 0,
    Peer = 1,
    Cust = 2,
    Origin = 3,
}

impl fmt::Display for ExportRel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportRel::Prov => "PROV",
            ExportRel::Peer => "PEER",
            ExportRel::Cust => "CUST",
            ExportRel::Origin => "ORIGIN",
        };
        write!(f, "{s}")
    }
}
