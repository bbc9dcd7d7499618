//! Error types for matprep.

use std::path::PathBuf;

use thiserror::Error;

use crate::overlap::StorageFormat;

/// Result type alias using matprep's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong in preprocessing.
///
/// All failures are synchronous and leave the caller's inputs untouched.
#[derive(Error, Debug)]
pub enum Error {
    /// The local submatrix is not stored in compressed-row (AIJ) form.
    #[error("degree computation requires AIJ storage, got {format:?}")]
    UnsupportedFormat { format: StorageFormat },

    /// `row_start` does not begin at zero or decreases at `row`.
    #[error("row pointers malformed at row {row}")]
    MalformedRowStart { row: usize },

    #[error("column {col} in row {row} out of range for {ncols} columns")]
    ColumnOutOfRange { row: usize, col: usize, ncols: usize },

    #[error("length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("distance must be at least 1")]
    InvalidDistance,

    /// `value` at `index` is out of range or repeated.
    #[error("not a permutation: entry {index} maps to {value}")]
    NotAPermutation { index: usize, value: usize },

    /// Extended-subgraph global ids repeat or descend at `index`.
    #[error("global ids not strictly ascending at {index}")]
    UnsortedGlobalIds { index: usize },

    #[error("row {row} stores its diagonal more than once")]
    DuplicateDiagonal { row: usize },

    #[error("ownership range {start}..{end} invalid for {nrows} rows")]
    OwnershipOutOfRange { start: usize, end: usize, nrows: usize },

    /// The permutation handed to `reorder` is not its own inverse.
    #[error("non-symmetric permutation at index {index}, use a symmetric permutation or general storage")]
    AsymmetricPermutation { index: usize },

    #[error("out of memory: failed to reserve {len} elements")]
    OutOfMemory { len: usize },

    #[error("read file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse vertex {word:?} in file {path:?}")]
    Parse { path: PathBuf, word: String },
}

/// Allocates a working buffer of `len` copies of `value`, reporting
/// allocation failure instead of aborting.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory { len })?;
    v.resize(len, value);
    Ok(v)
}

/// Like [`try_filled`] but empty, with room for `len` elements.
pub(crate) fn try_with_capacity<T>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory { len })?;
    Ok(v)
}
