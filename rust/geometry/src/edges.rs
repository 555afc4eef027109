// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outline edges for wireframe rendering.

use crate::compaction::VertexId;

/// Directed edge between two compact vertex ids.
pub type Edge = (VertexId, VertexId);

/// Builds the directed boundary edges of one face ring.
///
/// Walks `(ring[i], ring[i + 1])` around the ring (wrapping at the end). When
/// the reverse of an edge is already in the list, the first such occurrence
/// is removed and the edge is dropped; otherwise the edge is appended. The
/// output order depends on this sequential scan and must stay stable.
pub fn deduplicate_edges(ring: &[VertexId]) -> Vec<Edge> {
    let m = ring.len();
    let mut edges: Vec<Edge> = Vec::with_capacity(m);

    for i in 0..m {
        let a = ring[i];
        let b = ring[(i + 1) % m];

        match edges.iter().position(|&e| e == (b, a)) {
            Some(pos) => {
                edges.remove(pos);
            }
            None => edges.push((a, b)),
        }
    }

    edges
}

/// Flattens per-face edge lists into a line index buffer (`a0, b0, a1, b1, ...`).
pub fn flatten_edges<'a>(lists: impl IntoIterator<Item = &'a Vec<Edge>>) -> Vec<VertexId> {
    lists
        .into_iter()
        .flat_map(|edges| edges.iter().flat_map(|&(a, b)| [a, b]))
        .collect()
}
