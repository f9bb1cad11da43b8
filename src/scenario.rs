//! Loads the two scenario inputs: the set of ROV-enabled ASNs and the
//! announcements to seed into origin RIBs.

use std::fs::File;
use std::path::Path;

use log::debug;

use crate::announcement::Announcement;
use crate::as_graph::AsGraph;
use crate::bgp_state::BgpState;
use crate::error::SimError;
use crate::shared::{Asn, PrefixId};
use std::collections::HashMap;
use std::sync::Mutex;

/// An append-only dictionary mapping opaque prefix strings to dense indices.
#[derive(Debug, Default)]
pub struct PrefixDict {
    to_id: HashMap<String, PrefixId>,
    to_string: Vec<String>,
}

impl PrefixDict {
    pub fn new() -> Self {
        PrefixDict::default()
    }

    pub fn intern(&mut self, prefix: &str) -> PrefixId {
        if let Some(&id) = self.to_id.get(prefix) {
            return id;
        }
        let id = self.to_string.len() as PrefixId;
        self.to_string.push(prefix.to_string());
        self.to_id.insert(prefix.to_string(), id);
        id
    }

    pub fn get(&self, id: PrefixId) -> Option<&str> {
        self.to_string.get(id as usize).map(String::as_str)
    }
}

/// Reads one ASN per line, `#` comments and blanks skipped, a malformed line
/// soft-skipped rather than aborting the load.
pub fn load_rov_asns(path: &Path) -> Result<Vec<Asn>, SimError> {
    let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut asns = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse::<Asn>() {
            Ok(asn) => asns.push(asn),
            Err(_) => debug!("skipping malformed ROV asn on line {}: {:?}", lineno + 1, line),
        }
    }
    Ok(asns)
}

/// Reads the announcements CSV (header `asn,prefix,rov_invalid`) and seeds
/// an origin announcement directly into each named AS's RIB, overwriting
/// any prior entry for that prefix. Unknown ASNs and malformed rows are
/// soft-skipped. `rov_invalid` is true iff the column reads `True`, `true`,
/// or `1`.
pub fn seed_announcements(
    path: &Path,
    graph: &AsGraph,
    states: &[Mutex<BgpState>],
    prefixes: &mut PrefixDict,
) -> Result<(), SimError> {
    let file = File::open(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    for (rowno, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                debug!("skipping malformed announcement row {}: {e}", rowno + 1);
                continue;
            }
        };
        if record.len() < 3 {
            debug!("skipping short announcement row {}", rowno + 1);
            continue;
        }

        let asn_field = record[0].trim();
        let prefix_field = record[1].trim();
        let rov_field = record[2].trim();

        let Ok(origin_asn) = asn_field.parse::<Asn>() else {
            debug!("skipping announcement row {} with bad asn {:?}", rowno + 1, asn_field);
            continue;
        };
        let Some(idx) = graph.node_index(origin_asn) else {
            debug!("skipping announcement for unknown asn {origin_asn}");
            continue;
        };

        let rov_invalid = matches!(rov_field, "True" | "true" | "1");
        let prefix_id = prefixes.intern(prefix_field);
        let ann = Announcement::origin(prefix_id, origin_asn, rov_invalid);

        let mut state = states[idx].lock().unwrap();
        state.rib.insert(prefix_id, ann);
    }

    Ok(())
}
