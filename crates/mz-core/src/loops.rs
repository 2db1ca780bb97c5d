//! Loop injection
//!
//! Adds extra connections between adjacent rooms that the spanning tree left
//! apart, closest pairs first, up to a density-derived budget.

use serde::Serialize;

use crate::diagnostics::GenerationDiagnostics;
use crate::graph::{RoomGraph, RoomId};
use crate::rng::MazeRng;

/// Independent acceptance probability of each candidate
pub const LOOP_ACCEPT_CHANCE: f64 = 0.5;

/// Loop budget for a graph with `edges` connections
pub fn target_loop_count(edges: usize, density: f32) -> usize {
    (edges as f32 * density.max(0.0)).round() as usize
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoopReport {
    pub target: usize,
    pub added: usize,
    /// Accepted candidates refused by connection validation
    pub rejected: usize,
    pub candidates: usize,
}

/// Adjacent, unconnected pairs sorted by center distance, then by ids
pub fn loop_candidates(graph: &RoomGraph) -> Vec<(RoomId, RoomId)> {
    let mut pairs: Vec<(f32, RoomId, RoomId)> = Vec::new();
    for node in graph.nodes() {
        for other in graph.adjacent_rooms(node.id) {
            if other <= node.id || graph.are_connected(node.id, other) {
                continue;
            }
            let Some(far) = graph.node(other) else {
                continue;
            };
            pairs.push((node.footprint.center_distance(&far.footprint), node.id, other));
        }
    }
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
    pairs.into_iter().map(|(_, a, b)| (a, b)).collect()
}

/// Add loop connections to `graph`.
///
/// The budget is computed from the edge count before any loop is added, so
/// the number of loop edges never exceeds `target`.
pub fn inject_loops(
    graph: &mut RoomGraph,
    density: f32,
    rng: &mut MazeRng,
    diag: &mut GenerationDiagnostics,
) -> LoopReport {
    let candidates = loop_candidates(graph);
    let mut report = LoopReport {
        target: target_loop_count(graph.connections().len(), density),
        candidates: candidates.len(),
        ..LoopReport::default()
    };
    diag.loop_target = report.target;

    for (a, b) in candidates {
        if report.added >= report.target {
            break;
        }
        if !rng.chance(LOOP_ACCEPT_CHANCE) {
            continue;
        }
        match graph.connect(a, b, false, true) {
            Ok(_) => report.added += 1,
            Err(err) => {
                log::warn!("loop {a} <-> {b} rejected: {err}");
                report.rejected += 1;
                diag.rejected_loops += 1;
            }
        }
    }
    log::debug!(
        "loops: {} of {} added from {} candidates",
        report.added,
        report.target,
        report.candidates
    );
    report
}
