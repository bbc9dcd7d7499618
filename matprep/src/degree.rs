//! Bounded-distance vertex degrees over a halo-extended local subgraph.

use crate::error::{try_filled, try_with_capacity, Error, Result};
use crate::graph::Vertex;
use crate::overlap::{ExtendedSubgraph, OwnershipRange, PartitionedGraph, StorageFormat};

const UNVISITED: usize = usize::MAX;

/// For each owned vertex, counts the distinct vertices within `distance`
/// hops of it, excluding the vertex itself.
///
/// `extended` must already contain every vertex within `distance` hops of
/// the owned range. Entry `k` of the result belongs to global vertex
/// `range.start() + k`.
pub fn compute_degrees(
    extended: &ExtendedSubgraph,
    range: OwnershipRange,
    distance: u32,
) -> Result<Vec<usize>> {
    if extended.format != StorageFormat::Aij {
        return Err(Error::UnsupportedFormat {
            format: extended.format,
        });
    }
    if distance == 0 {
        return Err(Error::InvalidDistance);
    }
    extended.check_covers(range)?;

    let graph = &extended.graph;
    let ln = graph.nrows();
    let mut degrees = try_filled(range.len(), 0usize)?;

    // marked[v] is the root that last discovered v, hops[v] the shortest
    // hop count at which that root has reached it so far
    let mut marked = try_filled(ln, UNVISITED)?;
    let mut hops = try_filled(ln, 0u32)?;
    let mut stack: Vec<(Vertex, u32)> = try_with_capacity(ln)?;

    for (root, &global) in extended.global_ids.iter().enumerate() {
        let slot = match range.local(global) {
            Some(slot) => slot,
            None => continue,
        };
        debug_assert!(stack.is_empty());
        marked[root] = root;
        hops[root] = 0;

        let mut degree = 0;
        for &w in graph.neighbors(root as Vertex) {
            if visit(w, 1, root, &mut marked, &mut hops, &mut stack) {
                degree += 1;
            }
        }
        while let Some((v, hop)) = stack.pop() {
            if hop > hops[v as usize] || hop >= distance {
                continue;
            }
            for &w in graph.neighbors(v) {
                if visit(w, hop + 1, root, &mut marked, &mut hops, &mut stack) {
                    degree += 1;
                }
            }
        }
        degrees[slot] = degree;
    }

    Ok(degrees)
}

/// Pushes `w` reached at `hop` from `root`. Returns whether this is the
/// first time `root` reaches `w`.
fn visit(
    w: Vertex,
    hop: u32,
    root: usize,
    marked: &mut [usize],
    hops: &mut [u32],
    stack: &mut Vec<(Vertex, u32)>,
) -> bool {
    let ix = w as usize;
    if marked[ix] != root {
        marked[ix] = root;
        hops[ix] = hop;
        stack.push((w, hop));
        true
    } else {
        if hop < hops[ix] {
            // a shorter path, so its neighborhood now reaches further
            hops[ix] = hop;
            stack.push((w, hop));
        }
        false
    }
}

/// Extends the owned rows by `distance` and counts degrees on the result.
pub fn graph_degrees<G: PartitionedGraph + ?Sized>(graph: &G, distance: u32) -> Result<Vec<usize>> {
    if distance == 0 {
        return Err(Error::InvalidDistance);
    }
    let extended = graph.extend_overlap(distance)?;
    compute_degrees(&extended, graph.ownership_range(), distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SparseGraph;
    use crate::overlap::LocalPartition;

    fn cycle(n: usize) -> SparseGraph {
        let n = n as Vertex;
        SparseGraph::from_edges(n as usize, (0..n).map(|v| (v, (v + 1) % n))).unwrap()
    }

    #[test]
    fn cycle_degrees() {
        let g = cycle(8);
        let part = LocalPartition::whole(&g).unwrap();
        assert_eq!(graph_degrees(&part, 1).unwrap(), vec![2; 8]);
        assert_eq!(graph_degrees(&part, 2).unwrap(), vec![4; 8]);
        assert_eq!(graph_degrees(&part, 3).unwrap(), vec![6; 8]);
        assert_eq!(graph_degrees(&part, 4).unwrap(), vec![7; 8]);
        assert_eq!(graph_degrees(&part, 9).unwrap(), vec![7; 8]);
    }

    #[test]
    fn shorter_path_found_late_still_expands() {
        // the stack walks 0-5-3-4 before 0-1-4, so 4 is first reached at
        // hop 3; 6 sits behind 4 and is only three hops from 0
        let g = SparseGraph::from_edges(
            7,
            vec![(0, 1), (0, 5), (5, 3), (3, 4), (1, 4), (4, 6)],
        )
        .unwrap();
        let part = LocalPartition::whole(&g).unwrap();
        let degrees = graph_degrees(&part, 3).unwrap();
        assert_eq!(degrees[0], 5);
        assert_eq!(degrees[2], 0);
    }

    #[test]
    fn diagonal_entries_do_not_count() {
        // star with explicit self loops stored on every row
        let g = SparseGraph::square(vec![0, 3, 5, 7], vec![0, 1, 2, 0, 1, 0, 2]).unwrap();
        let part = LocalPartition::whole(&g).unwrap();
        assert_eq!(graph_degrees(&part, 1).unwrap(), vec![2, 1, 1]);
        assert_eq!(graph_degrees(&part, 2).unwrap(), vec![2, 2, 2]);
    }

    #[test]
    fn partial_ownership() {
        let g = cycle(10);
        let part = LocalPartition::new(&g, OwnershipRange::new(3, 6).unwrap()).unwrap();
        assert_eq!(graph_degrees(&part, 2).unwrap(), vec![4, 4, 4]);
    }

    #[test]
    fn rejects_blocked_storage_and_zero_distance() {
        let g = cycle(4);
        let part = LocalPartition::whole(&g).unwrap();
        let mut ext = part.extend_overlap(1).unwrap();
        ext.format = StorageFormat::Baij { block_size: 2 };
        assert!(matches!(
            compute_degrees(&ext, part.ownership_range(), 1),
            Err(Error::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            graph_degrees(&part, 0),
            Err(Error::InvalidDistance)
        ));
    }

    #[test]
    fn rejects_halo_missing_owned_vertices() {
        // rows 0 and 1 of the path 0-1-2, but all three vertices owned
        let sub = SparseGraph::square(vec![0, 1, 2], vec![1, 0]).unwrap();
        let ext = ExtendedSubgraph::new(StorageFormat::Aij, sub, vec![0, 1]).unwrap();
        let range = OwnershipRange::new(0, 3).unwrap();
        assert!(matches!(
            compute_degrees(&ext, range, 1),
            Err(Error::OwnershipOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_repeated_global_ids() {
        let g = cycle(3);
        let part = LocalPartition::whole(&g).unwrap();
        let mut ext = part.extend_overlap(1).unwrap();
        ext.global_ids = vec![0, 1, 1];
        assert!(matches!(
            compute_degrees(&ext, OwnershipRange::new(0, 2).unwrap(), 1),
            Err(Error::UnsortedGlobalIds { index: 2 })
        ));
    }
}
