//! Symmetric reordering of upper-triangular storage.
//!
//! A symmetric matrix stored upper-triangular-only keeps one of `(i, j)` and
//! `(j, i)` for each off-diagonal pair. Under a new ordering `perm` some of
//! those entries would land in the strict lower triangle. [`reorder`] moves
//! each such entry to the row of its column (swapping row and column) so
//! that every stored `(row, col)` satisfies `perm[row] <= perm[col]`.
//!
//! The rows themselves are not renumbered and no values are touched: the
//! result carries the new pattern and a map saying where each stored value
//! must move, which [`Reordering::permute_values`] applies.
//!
//! `perm` must be an involution, `perm == perm^-1`, so that `P A P^T`
//! stays symmetric and representable by relocating entries alone.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use crate::error::{try_filled, Error, Result};
use crate::graph::{SparseGraph, Vertex};
use crate::permute::{follow_cycles, Permutation};

/// New storage layout for a symmetrically reordered matrix.
#[derive(Clone, Debug)]
pub struct Reordering {
    /// Upper triangular with respect to `perm`, same rows and nonzeros as
    /// the input.
    pub graph: SparseGraph,
    /// `value_map[old_slot]` is the slot the value stored at `old_slot`
    /// moves to.
    pub value_map: Vec<usize>,
    /// Row permutation, shared with `col_perm`.
    pub row_perm: Arc<Permutation>,
    pub col_perm: Arc<Permutation>,
}

impl Reordering {
    /// Rearranges the numeric values parallel to the input's `col_index`
    /// into the new slot order.
    pub fn permute_values<T>(&self, values: &mut [T]) -> Result<()> {
        if values.len() != self.value_map.len() {
            return Err(Error::LengthMismatch {
                what: "values",
                expected: self.value_map.len(),
                got: values.len(),
            });
        }
        let mut map = self.value_map.clone();
        follow_cycles(&mut map, values);
        Ok(())
    }
}

/// Computes the storage layout that keeps `graph` upper triangular under
/// the symmetric permutation `perm`.
///
/// Fails before touching anything if `perm` is not an involution over the
/// rows of `graph`.
pub fn reorder(graph: &SparseGraph, perm: &Arc<Permutation>) -> Result<Reordering> {
    let mbs = graph.nrows();
    if perm.len() != mbs {
        return Err(Error::LengthMismatch {
            what: "permutation",
            expected: mbs,
            got: perm.len(),
        });
    }
    if graph.ncols() != mbs {
        return Err(Error::LengthMismatch {
            what: "columns",
            expected: mbs,
            got: graph.ncols(),
        });
    }
    if let Some(index) = perm.first_asymmetry() {
        return Err(Error::AsymmetricPermutation { index });
    }

    let start = Instant::now();
    let nnz = graph.nnz();
    let mut ai = graph.row_start().to_vec();
    let mut aj = graph.col_index().to_vec();

    // Phase 1: choose the row r[j] each nonzero is stored in, swapping row
    // and column for entries that would fall into the lower triangle.
    let mut r = try_filled(nnz, 0usize)?;
    let mut nzr = try_filled(mbs, 0usize)?;
    for i in 0..mbs {
        for j in ai[i]..ai[i + 1] {
            let k = aj[j] as usize;
            let row = if perm[k] < perm[i] {
                aj[j] = i as Vertex;
                k
            } else {
                i
            };
            r[j] = row;
            nzr[row] += 1;
        }
    }

    // Phase 2: new row pointers, then the destination slot of every
    // nonzero. Diagonals take the first slot of their row, off-diagonals
    // fill from the back, walking the nonzeros in reverse.
    for i in 0..mbs {
        ai[i + 1] = ai[i] + nzr[i];
        nzr[i] = ai[i + 1];
    }
    let mut diagonal = try_filled(mbs, false)?;
    for j in (0..nnz).rev() {
        let i = r[j];
        if aj[j] as usize == i {
            if diagonal[i] {
                return Err(Error::DuplicateDiagonal { row: i });
            }
            diagonal[i] = true;
            r[j] = ai[i];
        } else {
            nzr[i] -= 1;
            r[j] = nzr[i];
        }
    }
    let value_map = r.clone();

    // Phase 3: move the columns into their slots.
    follow_cycles(&mut r, &mut aj);

    let graph = SparseGraph::square(ai, aj)?;
    debug_assert!(graph.is_upper_triangular_under(perm.as_slice()));

    println!(
        "{}",
        json!({
            "reorder_rows": mbs,
            "reorder_nnz": nnz,
            "reorder_time": format!("{:.0?}", Instant::now().duration_since(start)),
        })
    );

    Ok(Reordering {
        graph,
        value_map,
        row_perm: Arc::clone(perm),
        col_perm: Arc::clone(perm),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(row_start: Vec<usize>, col_index: Vec<Vertex>) -> SparseGraph {
        SparseGraph::square(row_start, col_index).unwrap()
    }

    fn perm(map: Vec<Vertex>) -> Arc<Permutation> {
        Arc::new(Permutation::new(map).unwrap())
    }

    #[test]
    fn four_vertex_swap_pairs() {
        let g = upper(vec![0, 2, 3, 4, 4], vec![0, 1, 1, 2]);
        let p = perm(vec![1, 0, 3, 2]);
        let out = reorder(&g, &p).unwrap();

        // (0, 1) moves to row 1 as column 0, behind row 1's diagonal
        assert_eq!(out.graph.row_start(), &[0, 1, 3, 4, 4]);
        assert_eq!(out.graph.col_index(), &[0, 1, 0, 2]);
        assert_eq!(out.value_map, vec![0, 2, 1, 3]);
        assert!(Arc::ptr_eq(&out.row_perm, &out.col_perm));
        assert!(Arc::ptr_eq(&out.row_perm, &p));

        let mut values = vec![10.0, 11.0, 12.0, 13.0];
        out.permute_values(&mut values).unwrap();
        assert_eq!(values, vec![10.0, 12.0, 11.0, 13.0]);
    }

    #[test]
    fn identity_keeps_layout_with_diagonal_first() {
        let g = upper(vec![0, 3, 5, 6], vec![0, 1, 2, 1, 2, 2]);
        let out = reorder(&g, &Arc::new(Permutation::identity(3).unwrap())).unwrap();
        assert_eq!(out.graph, g);
        assert_eq!(out.value_map, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn reversal_moves_everything_below_the_diagonal() {
        let g = upper(vec![0, 3, 5, 6], vec![0, 1, 2, 1, 2, 2]);
        let p = perm(vec![2, 1, 0]);
        let out = reorder(&g, &p).unwrap();
        assert_eq!(out.graph.row_start(), &[0, 1, 3, 6]);
        assert_eq!(out.graph.col_index(), &[0, 1, 0, 2, 0, 1]);
        assert_eq!(out.value_map, vec![0, 2, 4, 1, 5, 3]);
        assert!(out.graph.is_upper_triangular_under(p.as_slice()));
    }

    #[test]
    fn rejects_rotation_without_output() {
        let g = upper(vec![0, 2, 3, 3], vec![0, 1, 2]);
        let before = g.clone();
        assert!(matches!(
            reorder(&g, &perm(vec![1, 2, 0])),
            Err(Error::AsymmetricPermutation { index: 0 })
        ));
        assert_eq!(g, before);
    }

    #[test]
    fn rejects_wrong_length_and_duplicate_diagonals() {
        let g = upper(vec![0, 1, 2], vec![0, 1]);
        assert!(matches!(
            reorder(&g, &perm(vec![0, 1, 2])),
            Err(Error::LengthMismatch { .. })
        ));

        let dup = upper(vec![0, 2, 2], vec![0, 0]);
        assert!(matches!(
            reorder(&dup, &perm(vec![0, 1])),
            Err(Error::DuplicateDiagonal { row: 0 })
        ));
    }

    #[test]
    fn lower_entries_move_up_under_identity() {
        // row 1 stores (1, 0) below the diagonal
        let g = upper(vec![0, 1, 3], vec![0, 0, 1]);
        let p = Arc::new(Permutation::identity(2).unwrap());
        let out = reorder(&g, &p).unwrap();
        assert_eq!(out.graph.row_start(), &[0, 2, 3]);
        assert_eq!(out.graph.col_index(), &[0, 1, 1]);
        assert_eq!(out.value_map, vec![0, 1, 2]);
        assert!(out.graph.is_upper_triangular());
    }

    #[test]
    fn empty_matrix() {
        let g = upper(vec![0], vec![]);
        let out = reorder(&g, &perm(vec![])).unwrap();
        assert_eq!(out.graph.nrows(), 0);
        assert!(out.value_map.is_empty());
    }
}
