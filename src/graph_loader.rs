//! Streaming loader for CAIDA `as-rel` files: `ASN1|ASN2|T` lines, bz2
//! compressed, read a buffer at a time so the decompressed text is never
//! materialized in full.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bzip2::read::BzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::as_graph::AsGraph;
use crate::error::SimError;
use crate::shared::{Asn, RelationshipKind};

/// Loads the AS graph from a bz2-compressed CAIDA relationship file.
///
/// Lines are `ASN1|ASN2|type[|...]`, `type` one of `-1` (ASN1 customer of
/// ASN2), `0` (ASN1 provider of ASN2), `1` (peers). Blank lines and `#`
/// comments are skipped. A line that fails to parse is logged and skipped
/// rather than aborting the whole load. The decompressed size isn't known
/// up front, so progress is a spinner ticking per line rather than a bar.
pub fn load_caida_graph(path: &Path) -> Result<AsGraph, SimError> {
    let file = File::open(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // BufReader pulls fixed-size chunks from the decompressor and hands out
    // whole lines regardless of where a chunk boundary falls mid-line.
    let decoder = BzDecoder::new(file);
    let reader = BufReader::new(decoder);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} loading AS graph... {pos} lines")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    let mut graph = AsGraph::new();
    let mut relationships = 0usize;

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| SimError::Decompress {
            path: path.to_path_buf(),
            source,
        })?;
        if parse_line(&mut graph, &line) {
            relationships += 1;
        } else if !line.trim().is_empty() && !line.trim_start().starts_with('#') {
            debug!("skipping malformed line {}: {:?}", lineno + 1, line);
        }
        spinner.inc(1);
    }
    spinner.finish_and_clear();

    debug!(
        "loaded {} nodes, {} relationships from {}",
        graph.len(),
        relationships,
        path.display()
    );

    Ok(graph)
}

/// Parses one CAIDA line into the graph. Returns `true` if it contributed an
/// edge, `false` if it was blank, a comment, or malformed.
fn parse_line(graph: &mut AsGraph, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return false;
    }

    let mut fields = line.split('|');
    let (Some(asn1), Some(asn2), Some(code)) = (fields.next(), fields.next(), fields.next())
    else {
        return false;
    };

    let Ok(asn1) = asn1.trim().parse::<Asn>() else {
        return false;
    };
    let Ok(asn2) = asn2.trim().parse::<Asn>() else {
        return false;
    };
    let Ok(code) = code.trim().parse::<i8>() else {
        return false;
    };
    let Some(kind) = RelationshipKind::from_caida_code(code) else {
        return false;
    };

    let idx1 = graph.get_or_insert(asn1);
    let idx2 = graph.get_or_insert(asn2);

    match kind {
        RelationshipKind::CustomerToProvider => graph.add_provider_customer_edge(idx2, idx1),
        RelationshipKind::ProviderToCustomer => graph.add_provider_customer_edge(idx1, idx2),
        RelationshipKind::PeerToPeer => graph.add_peer_edge(idx1, idx2),
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_bz2(path: &Path, text: &str) {
        use bzip2::write::BzEncoder;
        use bzip2::Compression;

        let file = File::create(path).unwrap();
        let mut encoder = BzEncoder::new(file, Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn loads_customer_provider_and_peer_edges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("as-rel.txt.bz2");
        write_bz2(
            &path,
            "# comment\n1|2|-1\n3|4|0\n5|6|1\n\n",
        );

        let graph = load_caida_graph(&path).unwrap();
        assert_eq!(graph.len(), 6);

        let one = graph.node_index(1).unwrap();
        let two = graph.node_index(2).unwrap();
        assert!(graph.node(two).customers.contains(&one));
        assert!(graph.node(one).providers.contains(&two));

        let three = graph.node_index(3).unwrap();
        let four = graph.node_index(4).unwrap();
        assert!(graph.node(three).customers.contains(&four));

        let five = graph.node_index(5).unwrap();
        let six = graph.node_index(6).unwrap();
        assert!(graph.node(five).peers.contains(&six));
        assert!(graph.node(six).peers.contains(&five));
    }

    #[test]
    fn skips_malformed_lines_without_failing_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("as-rel.txt.bz2");
        write_bz2(&path, "1|2|-1\nnot a valid line\n7|8|1\n");

        let graph = load_caida_graph(&path).unwrap();
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn handles_a_line_split_across_the_decompressor_read_buffer() {
        // Many short lines force BufReader to refill its buffer mid-line at
        // some point; every line must still come out intact.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("as-rel.txt.bz2");
        let mut text = String::new();
        for asn in 1..2000u32 {
            text.push_str(&format!("{}|{}|-1\n", asn, asn + 1));
        }
        write_bz2(&path, &text);

        let graph = load_caida_graph(&path).unwrap();
        assert_eq!(graph.len(), 2000);
    }

    #[test]
    fn missing_file_is_a_precondition_error() {
        let err = load_caida_graph(Path::new("/nonexistent/path/as-rel.txt.bz2"));
        assert!(matches!(err, Err(SimError::Io { .. })));
    }
}
