//! Efficient, parallel, line-by-line reads over sequences of text files
//! containing words separated by a common delimiter.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use bstr::ByteSlice;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::error::{Error, Result};

const BUFSIZE: usize = 64 * 1024;

/// An iterator over byte slices separated by a delimiter.
/// The iterated-over slices won't contain the delimiter, but may be empty.
#[derive(Clone)]
pub struct DelimIter<'a> {
    bytes: &'a [u8],
    pos: usize,
    delim: u8,
}

impl<'a> DelimIter<'a> {
    pub fn new(bytes: &[u8], delim: u8) -> DelimIter<'_> {
        DelimIter {
            bytes,
            pos: 0,
            delim,
        }
    }
}

impl<'a> Iterator for DelimIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.pos == self.bytes.len() {
            None
        } else {
            let start = self.pos;
            let bytes = &self.bytes[start..];
            let (end, new_pos) = match bytes.find_byte(self.delim) {
                None => (bytes.len(), bytes.len()),
                Some(next_word) => (next_word, next_word + 1),
            };
            self.pos = start + new_pos;
            Some(&bytes[..end])
        }
    }
}

/// A `Scanner` provides line-level access to underlying files of words,
/// where words are delimited with a specified delimiter.
///
/// Lines that start with the delimiter or have repeat delimiters will have
/// empty words being iterated over.
pub struct Scanner {
    paths: Vec<PathBuf>,
    delimiter: u8,
}

impl Scanner {
    pub fn new(paths: Vec<PathBuf>, delimiter: u8) -> Self {
        Self { paths, delimiter }
    }

    /// Fold over the lines of every file, one file per task, yielding each
    /// file's result.
    ///
    /// `fold` receives the file's path for error reporting. The first read
    /// or fold error ends that file's fold.
    pub(crate) fn fold<'a, U, Id, Fold>(
        &'a self,
        id: Id,
        fold: Fold,
    ) -> impl ParallelIterator<Item = Result<U>> + 'a
    where
        U: Send,
        Id: Fn(usize) -> U + Sync + Send + 'a,
        Fold: Fn(U, &PathBuf, DelimIter<'_>) -> Result<U> + Sync + Send + 'a,
    {
        let delim = self.delimiter;
        self.paths.par_iter().enumerate().map(move |(i, path)| {
            let io_err = |source| Error::Io {
                path: path.clone(),
                source,
            };
            let file = File::open(path).map_err(io_err)?;
            let reader = BufReader::with_capacity(BUFSIZE, file);
            let mut acc = id(i);
            for line in reader.split(b'\n') {
                let line = line.map_err(io_err)?;
                acc = fold(acc, path, DelimIter::new(&line, delim))?;
            }
            Ok(acc)
        })
    }
}
