//! The three-phase Gao-Rexford propagation engine: UP (customer to
//! provider, rank ascending), PEER (sideways, once), DOWN (provider to
//! customer, rank descending).
//!
//! Each phase step drains staged candidates into the RIB in parallel (writes
//! are disjoint, one `Mutex<BgpState>` per node) and then sends from the
//! freshly updated RIB to neighbours sequentially, so two senders never race
//! to stage a candidate into the same target's queue.

use std::sync::Mutex;

use log::debug;

use crate::as_graph::AsGraph;
use crate::bgp_state::BgpState;
use crate::shared::ExportRel;

/// Runs the UP / PEER / DOWN propagation over `graph`, draining and sending
/// through `states` (one entry per node, same indexing as `graph`).
/// `num_threads` is clamped to `[1, 16]` and to the number of available
/// cores, matching the reference engine's worker cap.
pub fn run(graph: &AsGraph, states: &[Mutex<BgpState>], num_threads: usize) {
    let threads = num_threads.clamp(1, 16).min(num_cpus::get());

    debug!("running propagation with {threads} worker threads");

    // Phase 1: UP. Ranks ascend from the customer-less leaves toward the
    // tier-1 core; a rank's drain must happen before its send because a
    // node can only forward what process_queue just installed. The tag
    // carried on the announcement records the *receiver's* relationship to
    // the sender, not the direction of travel: a provider receiving from a
    // customer tags the route CUST.
    for rank_indices in &graph.ranks {
        drain_parallel(rank_indices, graph, states, threads);
        for &idx in rank_indices {
            send_to(graph, states, idx, &graph.node(idx).providers, ExportRel::Cust);
        }
    }

    // Phase 2: PEER. Every node sends once to its peers, then every node
    // drains once. No rank ordering applies — peers are a single flat pass.
    let all_indices: Vec<usize> = (0..graph.len()).collect();
    for &idx in &all_indices {
        send_to(graph, states, idx, &graph.node(idx).peers, ExportRel::Peer);
    }
    drain_parallel(&all_indices, graph, states, threads);

    // Phase 3: DOWN. Ranks descend from the core back out to the leaves. A
    // customer receiving from its provider tags the route PROV.
    for rank_indices in graph.ranks.iter().rev() {
        for &idx in rank_indices {
            send_to(graph, states, idx, &graph.node(idx).customers, ExportRel::Prov);
        }
        drain_parallel(rank_indices, graph, states, threads);
    }
}

/// Installs every staged candidate at each index in `indices` into its RIB,
/// splitting the work into contiguous chunks across `threads` worker
/// threads. Falls back to sequential execution for small or single-threaded
/// workloads.
fn drain_parallel(indices: &[usize], graph: &AsGraph, states: &[Mutex<BgpState>], threads: usize) {
    if indices.is_empty() {
        return;
    }
    if threads <= 1 || indices.len() < 2 {
        for &idx in indices {
            drain_one(graph, states, idx);
        }
        return;
    }

    let worker_count = threads.min(indices.len());
    let chunk_size = indices.len().div_ceil(worker_count);

    std::thread::scope(|scope| {
        for chunk in indices.chunks(chunk_size) {
            scope.spawn(move || {
                for &idx in chunk {
                    drain_one(graph, states, idx);
                }
            });
        }
    });
}

fn drain_one(graph: &AsGraph, states: &[Mutex<BgpState>], idx: usize) {
    let asn = graph.node(idx).asn;
    let mut state = states[idx].lock().unwrap();
    state.process_queue(asn);
}

/// Sends every RIB entry at `from_idx` to each node in `targets`, tagged
/// with `rel`. Run sequentially within a phase step so concurrent sends
/// never race to stage a candidate into the same target's queue.
fn send_to(graph: &AsGraph, states: &[Mutex<BgpState>], from_idx: usize, targets: &[usize], rel: ExportRel) {
    if targets.is_empty() {
        return;
    }
    let from_asn = graph.node(from_idx).asn;
    let outgoing: Vec<_> = {
        let state = states[from_idx].lock().unwrap();
        state.rib.values().cloned().collect()
    };

    for &target_idx in targets {
        let target_asn = graph.node(target_idx).asn;
        let mut target_state = states[target_idx].lock().unwrap();
        for ann in &outgoing {
            target_state.receive(target_asn, ann.exported_by(from_asn, rel));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announcement::Announcement;

    fn build_states(graph: &AsGraph, rov_asns: &[u32]) -> Vec<Mutex<BgpState>> {
        graph
            .iter()
            .map(|n| Mutex::new(BgpState::new(rov_asns.contains(&n.asn))))
            .collect()
    }

    /// S1: a provider chain 1 -> 2 -> 3 (1 provides 2, 2 provides 3), AS 3
    /// originates a prefix. The route should propagate up to every node.
    #[test]
    fn provider_chain_propagates_route_up_to_every_node() {
        let mut graph = AsGraph::new();
        let one = graph.get_or_insert(1);
        let two = graph.get_or_insert(2);
        let three = graph.get_or_insert(3);
        graph.add_provider_customer_edge(one, two);
        graph.add_provider_customer_edge(two, three);
        graph.assign_ranks();

        let states = build_states(&graph, &[]);
        states[three]
            .lock()
            .unwrap()
            .rib
            .insert(0, Announcement::origin(0, 3, false));

        run(&graph, &states, 1);

        assert!(states[one].lock().unwrap().rib.contains_key(&0));
        assert!(states[two].lock().unwrap().rib.contains_key(&0));
        let ann = &states[one].lock().unwrap().rib[&0];
        assert_eq!(ann.as_path, vec![1, 2, 3]);
    }

    /// S2: two peers both export the same prefix further to a shared
    /// customer; the customer must pick exactly one via the preference
    /// order, not merge or duplicate both.
    #[test]
    fn peer_tie_break_keeps_exactly_one_route() {
        let mut graph = AsGraph::new();
        let customer = graph.get_or_insert(1);
        let peer_a = graph.get_or_insert(2);
        let peer_b = graph.get_or_insert(3);
        graph.add_provider_customer_edge(peer_a, customer);
        graph.add_provider_customer_edge(peer_b, customer);
        graph.add_peer_edge(peer_a, peer_b);
        graph.assign_ranks();

        let states = build_states(&graph, &[]);
        states[peer_a]
            .lock()
            .unwrap()
            .rib
            .insert(0, Announcement::origin(0, 2, false));
        states[peer_b]
            .lock()
            .unwrap()
            .rib
            .insert(0, Announcement::origin(0, 3, false));

        run(&graph, &states, 1);

        let customer_rib = &states[customer].lock().unwrap().rib;
        assert_eq!(customer_rib.len(), 1);
        // Peer 2's route wins: same PEER relationship, same path length,
        // smaller next_hop (2 < 3).
        assert_eq!(customer_rib[&0].next_hop, 2);
    }

    /// S3: a ROV-enabled provider must drop an invalid route arriving from
    /// its customer rather than install and re-export it.
    #[test]
    fn rov_enabled_node_drops_invalid_route_from_customer() {
        let mut graph = AsGraph::new();
        let provider = graph.get_or_insert(1);
        let customer = graph.get_or_insert(2);
        graph.add_provider_customer_edge(provider, customer);
        graph.assign_ranks();

        let states = build_states(&graph, &[1]);
        states[customer]
            .lock()
            .unwrap()
            .rib
            .insert(0, Announcement::origin(0, 2, true));

        run(&graph, &states, 1);

        assert!(!states[provider].lock().unwrap().rib.contains_key(&0));
    }

    /// S5: a provider cycle must never reach the engine — callers are
    /// expected to call `AsGraph::check_for_cycles` first. This test
    /// documents that expectation rather than exercising `run` directly.
    #[test]
    fn cycle_is_rejected_before_propagation_would_run() {
        let mut graph = AsGraph::new();
        let one = graph.get_or_insert(1);
        let two = graph.get_or_insert(2);
        graph.add_provider_customer_edge(one, two);
        graph.add_provider_customer_edge(two, one);
        assert!(graph.check_for_cycles().is_err());
    }

    #[test]
    fn multi_threaded_run_matches_single_threaded_run() {
        let mut graph = AsGraph::new();
        let one = graph.get_or_insert(1);
        let two = graph.get_or_insert(2);
        let three = graph.get_or_insert(3);
        graph.add_provider_customer_edge(one, two);
        graph.add_provider_customer_edge(two, three);
        graph.assign_ranks();

        let seed = |states: &[Mutex<BgpState>]| {
            states[three]
                .lock()
                .unwrap()
                .rib
                .insert(0, Announcement::origin(0, 3, false));
        };

        let single = build_states(&graph, &[]);
        seed(&single);
        run(&graph, &single, 1);

        let multi = build_states(&graph, &[]);
        seed(&multi);
        run(&graph, &multi, 4);

        assert_eq!(
            single[one].lock().unwrap().rib[&0].as_path,
            multi[one].lock().unwrap().rib[&0].as_path
        );
    }
}
