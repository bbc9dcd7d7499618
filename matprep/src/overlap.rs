//! Ownership ranges and halo-extended local subgraphs.
//!
//! A rank owns a contiguous range of global rows. Bounded-distance queries
//! need the rows within `distance` hops of the owned set as well; the
//! [`PartitionedGraph`] trait is the seam through which a graph store hands
//! over that extended subgraph. [`LocalPartition`] answers it in-process
//! from a whole graph, which is all a single process needs.

use std::convert::TryFrom;

use crate::error::{try_filled, try_with_capacity, Error, Result};
use crate::graph::{SparseGraph, Vertex};

/// Contiguous global ids `[start, end)` owned by the local rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnershipRange {
    start: Vertex,
    end: Vertex,
}

impl OwnershipRange {
    pub fn new(start: Vertex, end: Vertex) -> Result<Self> {
        if start > end {
            return Err(Error::OwnershipOutOfRange {
                start: start as usize,
                end: end as usize,
                nrows: 0,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Vertex {
        self.start
    }

    pub fn end(&self) -> Vertex {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, global: Vertex) -> bool {
        self.start <= global && global < self.end
    }

    /// Local index of an owned global id.
    pub fn local(&self, global: Vertex) -> Option<usize> {
        if self.contains(global) {
            Some((global - self.start) as usize)
        } else {
            None
        }
    }

    pub fn globals(&self) -> std::ops::Range<Vertex> {
        self.start..self.end
    }

    /// Splits `[0, nglobal)` into `nparts` contiguous ranges whose sizes
    /// differ by at most one, larger ranges first.
    pub fn split(nglobal: Vertex, nparts: u32) -> Vec<Self> {
        let nparts = nparts.max(1);
        let base = nglobal / nparts;
        let extra = nglobal % nparts;
        let mut start = 0;
        (0..nparts)
            .map(|p| {
                let end = start + base + if p < extra { 1 } else { 0 };
                let range = Self { start, end };
                start = end;
                range
            })
            .collect()
    }
}

/// Storage layout of a local submatrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageFormat {
    /// Compressed rows, one column per stored value.
    Aij,
    /// Blocked compressed rows.
    Baij { block_size: u32 },
    /// Blocked compressed rows, upper triangle only.
    Sbaij { block_size: u32 },
}

/// A local submatrix over the owned rows and their halo.
///
/// Row/column `i` of `graph` is global vertex `global_ids[i]`;
/// `global_ids` is sorted ascending.
#[derive(Clone, Debug)]
pub struct ExtendedSubgraph {
    pub format: StorageFormat,
    pub graph: SparseGraph,
    pub global_ids: Vec<Vertex>,
}

impl ExtendedSubgraph {
    pub fn new(format: StorageFormat, graph: SparseGraph, global_ids: Vec<Vertex>) -> Result<Self> {
        if global_ids.len() != graph.nrows() {
            return Err(Error::LengthMismatch {
                what: "global_ids",
                expected: graph.nrows(),
                got: global_ids.len(),
            });
        }
        if graph.ncols() != graph.nrows() {
            return Err(Error::LengthMismatch {
                what: "extended columns",
                expected: graph.nrows(),
                got: graph.ncols(),
            });
        }
        check_ascending(&global_ids)?;
        Ok(Self {
            format,
            graph,
            global_ids,
        })
    }

    /// Checks that `global_ids` is strictly ascending and that every vertex
    /// of `range` occurs in it.
    pub fn check_covers(&self, range: OwnershipRange) -> Result<()> {
        check_ascending(&self.global_ids)?;
        let owned = self
            .global_ids
            .iter()
            .filter(|&&g| range.contains(g))
            .count();
        if owned != range.len() {
            return Err(Error::OwnershipOutOfRange {
                start: range.start as usize,
                end: range.end as usize,
                nrows: owned,
            });
        }
        Ok(())
    }
}

fn check_ascending(global_ids: &[Vertex]) -> Result<()> {
    match global_ids.windows(2).position(|s| s[0] >= s[1]) {
        Some(index) => Err(Error::UnsortedGlobalIds { index: index + 1 }),
        None => Ok(()),
    }
}

/// The distributed store's view of a graph, from one rank.
pub trait PartitionedGraph {
    fn ownership_range(&self) -> OwnershipRange;

    /// Stored entries in owned global row `global_row`.
    fn row_nonzeros(&self, global_row: Vertex) -> usize;

    /// The owned rows together with every vertex within `distance` hops,
    /// as an induced local submatrix.
    fn extend_overlap(&self, distance: u32) -> Result<ExtendedSubgraph>;
}

/// A rank's share of a whole in-memory graph.
pub struct LocalPartition<'a> {
    graph: &'a SparseGraph,
    range: OwnershipRange,
}

impl<'a> LocalPartition<'a> {
    pub fn new(graph: &'a SparseGraph, range: OwnershipRange) -> Result<Self> {
        if range.end as usize > graph.nrows()
            || graph.ncols() != graph.nrows()
        {
            return Err(Error::OwnershipOutOfRange {
                start: range.start as usize,
                end: range.end as usize,
                nrows: graph.nrows(),
            });
        }
        Ok(Self { graph, range })
    }

    /// The whole graph owned by one rank.
    pub fn whole(graph: &'a SparseGraph) -> Result<Self> {
        let n = Vertex::try_from(graph.nrows()).map_err(|_| Error::OwnershipOutOfRange {
            start: 0,
            end: graph.nrows(),
            nrows: graph.nrows(),
        })?;
        Self::new(graph, OwnershipRange::new(0, n)?)
    }

    pub fn graph(&self) -> &SparseGraph {
        self.graph
    }
}

impl<'a> PartitionedGraph for LocalPartition<'a> {
    fn ownership_range(&self) -> OwnershipRange {
        self.range
    }

    fn row_nonzeros(&self, global_row: Vertex) -> usize {
        self.graph.row_nonzeros(global_row)
    }

    fn extend_overlap(&self, distance: u32) -> Result<ExtendedSubgraph> {
        let n = self.graph.nrows();

        // grow the owned set one level at a time
        let mut member = try_filled(n, false)?;
        let mut frontier: Vec<Vertex> = self.range.globals().collect();
        for &v in &frontier {
            member[v as usize] = true;
        }
        for _ in 0..distance {
            let mut next = Vec::new();
            for &v in &frontier {
                for &w in self.graph.neighbors(v) {
                    if !member[w as usize] {
                        member[w as usize] = true;
                        next.push(w);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        let global_ids: Vec<Vertex> = (0..n as Vertex).filter(|&v| member[v as usize]).collect();
        const NOT_LOCAL: Vertex = Vertex::MAX;
        let mut to_local = try_filled(n, NOT_LOCAL)?;
        for (i, &g) in global_ids.iter().enumerate() {
            to_local[g as usize] = i as Vertex;
        }

        // induced submatrix; ids are ascending so rows stay sorted
        let mut row_start = try_with_capacity(global_ids.len() + 1)?;
        let mut col_index = Vec::new();
        row_start.push(0);
        for &g in &global_ids {
            col_index.extend(
                self.graph
                    .neighbors(g)
                    .iter()
                    .map(|&w| to_local[w as usize])
                    .filter(|&l| l != NOT_LOCAL),
            );
            row_start.push(col_index.len());
        }

        let graph = SparseGraph::square(row_start, col_index)?;
        ExtendedSubgraph::new(StorageFormat::Aij, graph, global_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> SparseGraph {
        SparseGraph::from_edges(n, (1..n as Vertex).map(|v| (v - 1, v))).unwrap()
    }

    #[test]
    fn split_covers_everything() {
        let parts = OwnershipRange::split(10, 3);
        assert_eq!(
            parts,
            vec![
                OwnershipRange::new(0, 4).unwrap(),
                OwnershipRange::new(4, 7).unwrap(),
                OwnershipRange::new(7, 10).unwrap()
            ]
        );
        assert_eq!(parts[1].local(5), Some(1));
        assert_eq!(parts[1].local(7), None);
    }

    #[test]
    fn extends_by_distance() {
        let g = path(10);
        let part = LocalPartition::new(&g, OwnershipRange::new(4, 6).unwrap()).unwrap();
        let ext = part.extend_overlap(2).unwrap();
        assert_eq!(ext.format, StorageFormat::Aij);
        assert_eq!(ext.global_ids, vec![2, 3, 4, 5, 6, 7]);
        // local 0 is global 2, whose neighbor 1 is outside the halo
        assert_eq!(ext.graph.neighbors(0), &[1]);
        assert_eq!(ext.graph.neighbors(2), &[1, 3]);
    }

    #[test]
    fn rejects_range_past_graph() {
        let g = path(3);
        assert!(matches!(
            LocalPartition::new(&g, OwnershipRange::new(1, 4).unwrap()),
            Err(Error::OwnershipOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_reversed_range() {
        assert!(matches!(
            OwnershipRange::new(5, 3),
            Err(Error::OwnershipOutOfRange { start: 5, end: 3, .. })
        ));
        let empty = OwnershipRange::new(3, 3).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
    }

    #[test]
    fn extended_ids_must_ascend_and_cover() {
        let g = path(3);
        assert!(matches!(
            ExtendedSubgraph::new(StorageFormat::Aij, g, vec![0, 1, 1]),
            Err(Error::UnsortedGlobalIds { index: 2 })
        ));

        let sub = SparseGraph::square(vec![0, 1, 2], vec![1, 0]).unwrap();
        let ext = ExtendedSubgraph::new(StorageFormat::Aij, sub, vec![0, 1]).unwrap();
        assert!(ext.check_covers(OwnershipRange::new(0, 2).unwrap()).is_ok());
        assert!(matches!(
            ext.check_covers(OwnershipRange::new(0, 3).unwrap()),
            Err(Error::OwnershipOutOfRange { nrows: 2, .. })
        ));
    }
}
