//! Gao-Rexford inter-domain route propagation over an AS relationship
//! graph: load a CAIDA `as-rel` snapshot, seed origin announcements, run the
//! UP/PEER/DOWN fixed-point, and emit the resulting RIBs.

pub mod announcement;
pub mod as_graph;
pub mod bgp_state;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod graph_loader;
pub mod scenario;
pub mod shared;

pub use announcement::Announcement;
pub use as_graph::{AsGraph, AsNode};
pub use bgp_state::BgpState;
pub use error::{SimError, SimResult};
pub use scenario::PrefixDict;
pub use shared::{Asn, ExportRel, PrefixId, RelationshipKind};
