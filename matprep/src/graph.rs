//! Compressed sparse row storage for graphs and symmetric matrix patterns.

use std::iter;

use itertools::Itertools;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use rayon::slice::ParallelSlice;

use crate::error::{try_filled, try_with_capacity, Error, Result};

/// Vertex, row, and column ids.
pub type Vertex = u32;

/// A compact adjacency list intended for sparse graphs and sparse matrix
/// patterns.
///
/// Row `i` is the half-open slice `col_index[row_start[i]..row_start[i+1]]`.
/// Columns lie in `[0, ncols)`; for square local patterns `ncols == nrows`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseGraph {
    row_start: Vec<usize>,
    col_index: Vec<Vertex>,
    ncols: usize,
}

impl SparseGraph {
    /// Validates and wraps compressed-row storage.
    ///
    /// `row_start.len()` should be one greater than the number of rows,
    /// start at zero, never decrease, and end at `col_index.len()`.
    pub fn new(row_start: Vec<usize>, col_index: Vec<Vertex>, ncols: usize) -> Result<Self> {
        if row_start.first().copied() != Some(0) {
            return Err(Error::MalformedRowStart { row: 0 });
        }
        if let Some((row, _)) = row_start
            .par_windows(2)
            .enumerate()
            .find_first(|(_, s)| s[0] > s[1])
        {
            return Err(Error::MalformedRowStart { row });
        }
        let nnz = row_start[row_start.len() - 1];
        if nnz != col_index.len() {
            return Err(Error::LengthMismatch {
                what: "col_index",
                expected: nnz,
                got: col_index.len(),
            });
        }
        let nrows = row_start.len() - 1;
        let bad_col = (0..nrows).into_par_iter().find_map_first(|row| {
            col_index[row_start[row]..row_start[row + 1]]
                .iter()
                .copied()
                .find(|&c| c as usize >= ncols)
                .map(|c| Error::ColumnOutOfRange {
                    row,
                    col: c as usize,
                    ncols,
                })
        });
        if let Some(e) = bad_col {
            return Err(e);
        }
        Ok(Self {
            row_start,
            col_index,
            ncols,
        })
    }

    /// Square pattern, `ncols == nrows`.
    pub fn square(row_start: Vec<usize>, col_index: Vec<Vertex>) -> Result<Self> {
        let n = row_start.len().saturating_sub(1);
        Self::new(row_start, col_index, n)
    }

    /// Builds the symmetric adjacency of an undirected edge list over
    /// `nvertices` vertices. Both directions are stored, each row sorted,
    /// duplicates and self loops dropped.
    pub fn from_edges<I>(nvertices: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Vertex, Vertex)>,
    {
        let mut directed = Vec::new();
        for (u, v) in edges {
            if u as usize >= nvertices || v as usize >= nvertices {
                return Err(Error::ColumnOutOfRange {
                    row: u as usize,
                    col: v as usize,
                    ncols: nvertices,
                });
            }
            if u != v {
                directed.extend(iter::once((u, v)).chain(iter::once((v, u))));
            }
        }

        let nrows_plus_one = nvertices
            .checked_add(1)
            .ok_or(Error::OutOfMemory { len: nvertices })?;
        let mut row_start = try_filled(nrows_plus_one, 0usize)?;
        let mut col_index = try_with_capacity(directed.len())?;
        for (u, v) in directed.into_iter().sorted().dedup() {
            row_start[u as usize + 1] += 1;
            col_index.push(v);
        }
        let mut cumsum = 0;
        for offset in row_start.iter_mut() {
            cumsum += *offset;
            *offset = cumsum;
        }
        Self::new(row_start, col_index, nvertices)
    }

    pub fn neighbors(&self, v: Vertex) -> &[Vertex] {
        let v = v as usize;
        let lo = self.row_start[v];
        let hi = self.row_start[v + 1];
        &self.col_index[lo..hi]
    }

    pub fn row_nonzeros(&self, v: Vertex) -> usize {
        let v = v as usize;
        self.row_start[v + 1] - self.row_start[v]
    }

    pub fn nrows(&self) -> usize {
        self.row_start.len() - 1
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.col_index.len()
    }

    pub fn row_start(&self) -> &[usize] {
        &self.row_start
    }

    pub fn col_index(&self) -> &[Vertex] {
        &self.col_index
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<Vertex>) {
        (self.row_start, self.col_index)
    }

    /// Iterates over stored `(row, col)` pairs in storage order.
    pub fn entries(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        (0..self.nrows()).flat_map(move |row| {
            let row = row as Vertex;
            self.neighbors(row).iter().map(move |&col| (row, col))
        })
    }

    /// Upper-triangular-only storage of a symmetric square pattern: keeps
    /// entries with `col >= row`, optionally inserting every diagonal entry.
    pub fn upper_triangle(&self, with_diagonal: bool) -> Self {
        let n = self.nrows();
        let mut row_start = Vec::with_capacity(n + 1);
        let mut col_index = Vec::with_capacity(self.nnz() / 2 + n);
        row_start.push(0);
        for row in 0..n as Vertex {
            let upper = self.neighbors(row).iter().copied().filter(|&c| c >= row);
            if with_diagonal {
                col_index.push(row);
                col_index.extend(upper.filter(|&c| c != row));
            } else {
                col_index.extend(upper);
            }
            row_start.push(col_index.len());
        }
        Self {
            row_start,
            col_index,
            ncols: self.ncols,
        }
    }

    pub fn is_upper_triangular(&self) -> bool {
        self.entries().all(|(row, col)| row <= col)
    }

    /// Whether every stored `(row, col)` satisfies `perm[row] <= perm[col]`.
    pub fn is_upper_triangular_under(&self, perm: &[Vertex]) -> bool {
        self.entries()
            .all(|(row, col)| perm[row as usize] <= perm[col as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_row_start() {
        assert!(matches!(
            SparseGraph::square(vec![1, 2], vec![0, 0]),
            Err(Error::MalformedRowStart { row: 0 })
        ));
        assert!(matches!(
            SparseGraph::square(vec![0, 2, 1, 2], vec![0, 1]),
            Err(Error::MalformedRowStart { row: 1 })
        ));
        assert!(matches!(
            SparseGraph::square(vec![0, 1, 3], vec![0, 1]),
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[test]
    fn rejects_column_out_of_range() {
        let err = SparseGraph::square(vec![0, 1, 2], vec![1, 2]).unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnOutOfRange {
                row: 1,
                col: 2,
                ncols: 2
            }
        ));
    }

    #[test]
    fn from_edges_symmetrizes() {
        let g = SparseGraph::from_edges(4, vec![(0, 1), (1, 0), (2, 1), (3, 3)]).unwrap();
        assert_eq!(g.row_start(), &[0, 1, 3, 4, 4]);
        assert_eq!(g.col_index(), &[1, 0, 2, 1]);
        assert_eq!(g.row_nonzeros(1), 2);
        assert_eq!(g.neighbors(3), &[] as &[Vertex]);
    }

    #[test]
    fn from_edges_reports_oversized_vertex_counts() {
        assert!(matches!(
            SparseGraph::from_edges(usize::MAX, vec![]),
            Err(Error::OutOfMemory { .. })
        ));
        assert!(matches!(
            SparseGraph::from_edges(usize::MAX / 4, vec![]),
            Err(Error::OutOfMemory { .. })
        ));
    }

    #[test]
    fn upper_triangle_keeps_one_of_each_pair() {
        let g = SparseGraph::from_edges(3, vec![(0, 1), (1, 2), (0, 2)]).unwrap();
        let u = g.upper_triangle(true);
        assert_eq!(u.row_start(), &[0, 3, 5, 6]);
        assert_eq!(u.col_index(), &[0, 1, 2, 1, 2, 2]);
        assert!(u.is_upper_triangular());
        assert!(!u.is_upper_triangular_under(&[2, 1, 0]));

        let strict = g.upper_triangle(false);
        assert_eq!(strict.nnz(), 3);
    }
}
