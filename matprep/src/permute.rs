//! Permutations of `[0, n)` and their in-place application.

use std::convert::TryFrom;

use crate::error::{try_filled, Error, Result};
use crate::graph::Vertex;

/// A validated bijection on `[0, n)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    map: Vec<Vertex>,
}

impl Permutation {
    /// Checks that `map` hits every index in `[0, map.len())` exactly once.
    pub fn new(map: Vec<Vertex>) -> Result<Self> {
        let mut hit = try_filled(map.len(), false)?;
        for (index, &value) in map.iter().enumerate() {
            let value = value as usize;
            if value >= map.len() || hit[value] {
                return Err(Error::NotAPermutation { index, value });
            }
            hit[value] = true;
        }
        Ok(Self { map })
    }

    pub fn identity(n: usize) -> Result<Self> {
        let n = Vertex::try_from(n).map_err(|_| Error::NotAPermutation {
            index: n,
            value: n,
        })?;
        Ok(Self {
            map: (0..n).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn as_slice(&self) -> &[Vertex] {
        &self.map
    }

    pub fn into_inner(self) -> Vec<Vertex> {
        self.map
    }

    pub fn inverse(&self) -> Result<Self> {
        let mut inv = try_filled(self.map.len(), 0 as Vertex)?;
        for (i, &p) in self.map.iter().enumerate() {
            inv[p as usize] = i as Vertex;
        }
        Ok(Self { map: inv })
    }

    /// First index `i` with `perm[perm[i]] != i`, if any.
    pub fn first_asymmetry(&self) -> Option<usize> {
        self.map
            .iter()
            .enumerate()
            .find(|&(i, &p)| self.map[p as usize] as usize != i)
            .map(|(i, _)| i)
    }

    /// Whether the permutation is its own inverse.
    pub fn is_involution(&self) -> bool {
        self.first_asymmetry().is_none()
    }
}

impl std::ops::Index<usize> for Permutation {
    type Output = Vertex;

    fn index(&self, i: usize) -> &Vertex {
        &self.map[i]
    }
}

/// Inverse of a position map: `invert_map(map)[map[j]] == j`.
pub fn invert_map(map: &[usize]) -> Result<Vec<usize>> {
    let mut inv = try_filled(map.len(), usize::MAX)?;
    for (j, &m) in map.iter().enumerate() {
        if m >= map.len() || inv[m] != usize::MAX {
            return Err(Error::NotAPermutation { index: j, value: m });
        }
        inv[m] = j;
    }
    Ok(inv)
}

/// Moves `data[j]` to `data[map[j]]` for every `j`, following the cycles of
/// `map` with one swap per element moved.
///
/// `map` must be a bijection on `[0, data.len())`; otherwise nothing is
/// moved and an error is returned. On success `map` is left as the
/// identity.
pub fn permute_in_place<T>(map: &mut [usize], data: &mut [T]) -> Result<()> {
    if map.len() != data.len() {
        return Err(Error::LengthMismatch {
            what: "position map",
            expected: data.len(),
            got: map.len(),
        });
    }
    let mut hit = try_filled(map.len(), false)?;
    for (j, &m) in map.iter().enumerate() {
        if m >= map.len() || hit[m] {
            return Err(Error::NotAPermutation { index: j, value: m });
        }
        hit[m] = true;
    }
    follow_cycles(map, data);
    Ok(())
}

/// [`permute_in_place`] for maps already known to be bijections.
pub(crate) fn follow_cycles<T>(map: &mut [usize], data: &mut [T]) {
    debug_assert_eq!(map.len(), data.len());
    for j in 0..map.len() {
        // invariant: data[j] currently holds the element bound for map[j]
        while map[j] != j {
            let k = map[j];
            map[j] = map[k];
            map[k] = k;
            data.swap(j, k);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_bijections() {
        assert!(matches!(
            Permutation::new(vec![0, 2, 2]),
            Err(Error::NotAPermutation { index: 2, value: 2 })
        ));
        assert!(matches!(
            Permutation::new(vec![0, 3, 1]),
            Err(Error::NotAPermutation { index: 1, value: 3 })
        ));
    }

    #[test]
    fn involutions() {
        let rotate = Permutation::new(vec![1, 2, 0]).unwrap();
        assert!(!rotate.is_involution());
        assert_eq!(rotate.first_asymmetry(), Some(0));
        assert_eq!(rotate.inverse().unwrap().as_slice(), &[2, 0, 1]);

        let swaps = Permutation::new(vec![1, 0, 3, 2, 4]).unwrap();
        assert!(swaps.is_involution());
        assert_eq!(swaps.inverse().unwrap(), swaps);
        assert!(Permutation::identity(0).unwrap().is_involution());
    }

    #[test]
    fn cycles_move_each_element_to_its_destination() {
        let mut data = vec!['a', 'b', 'c', 'd', 'e', 'f'];
        let dest = vec![3, 0, 4, 1, 2, 5];
        let mut map = dest.clone();
        permute_in_place(&mut map, &mut data).unwrap();
        assert_eq!(data, vec!['b', 'd', 'e', 'a', 'c', 'f']);
        assert_eq!(map, (0..6).collect::<Vec<_>>());

        // and back again through the inverse
        let mut inv = invert_map(&dest).unwrap();
        permute_in_place(&mut inv, &mut data).unwrap();
        assert_eq!(data, vec!['a', 'b', 'c', 'd', 'e', 'f']);
    }

    #[test]
    fn bad_maps_move_nothing() {
        let mut data = vec!['a', 'b'];
        assert!(matches!(
            permute_in_place(&mut vec![1, 1], &mut data),
            Err(Error::NotAPermutation { index: 1, value: 1 })
        ));
        assert!(matches!(
            permute_in_place(&mut vec![2, 0], &mut data),
            Err(Error::NotAPermutation { index: 0, value: 2 })
        ));
        assert!(matches!(
            permute_in_place(&mut vec![0], &mut data),
            Err(Error::LengthMismatch { .. })
        ));
        assert_eq!(data, vec!['a', 'b']);
    }

    #[test]
    fn invert_map_rejects_repeats() {
        assert!(invert_map(&[1, 1]).is_err());
        assert_eq!(invert_map(&[2, 0, 1]).unwrap(), vec![1, 2, 0]);
    }
}
