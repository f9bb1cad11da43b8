//! Writes the final RIB state as CSV: `asn,prefix,as_path`, one row per
//! installed route, in node-index order.

use std::io::Write;
use std::sync::Mutex;

use crate::as_graph::AsGraph;
use crate::bgp_state::BgpState;
use crate::error::SimError;
use crate::scenario::PrefixDict;

/// Writes every RIB entry across `states` to `writer` as CSV. AS paths are
/// hyphen-joined with the emitting AS (most recent hop) first, mirroring
/// `Announcement::as_path`'s ordering.
pub fn write_results<W: Write>(
    writer: W,
    graph: &AsGraph,
    states: &[Mutex<BgpState>],
    prefixes: &PrefixDict,
) -> Result<(), SimError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["asn", "prefix", "as_path"])
        .map_err(csv_to_sim_error)?;

    for (idx, node) in graph.iter().enumerate() {
        let state = states[idx].lock().unwrap();
        for ann in state.rib.values() {
            let Some(prefix) = prefixes.get(ann.prefix_id) else {
                continue;
            };
            let path = ann
                .as_path
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join("-");
            csv_writer
                .write_record([node.asn.to_string(), prefix.to_string(), path])
                .map_err(csv_to_sim_error)?;
        }
    }

    csv_writer.flush().map_err(|source| SimError::Io {
        path: "<stdout>".into(),
        source,
    })?;

    Ok(())
}

fn csv_to_sim_error(err: csv::Error) -> SimError {
    SimError::Io {
        path: "<output>".into(),
        source: std::io::Error::other(err),
    }
}
