//! Helper functions for dealing with text data files in
//! a "SIMple SVMlight" (simsvm) format, i.e.,
//! <target> <feature> <feature>...
//! where target and features are non-negative integers.
//!
//! For graph files the target is a vertex and the features its neighbors.

use std::path::Path;

use crate::error::{Error, Result};
use crate::graph::Vertex;
use crate::scanner::DelimIter;

/// Given a [`DelimIter`] pointing to the front of a line in a
/// simsvm file, this wrapper is a convenient iterator over
/// just the features in that line.
#[derive(Clone)]
pub struct SimSvmLineIter<'a> {
    path: &'a Path,
    target: &'a [u8],
    iter: DelimIter<'a>,
}

/// `None` for a blank line.
pub fn parse<'a>(path: &'a Path, mut iter: DelimIter<'a>) -> Option<SimSvmLineIter<'a>> {
    let target = iter.next().filter(|w| !w.is_empty())?;
    Some(SimSvmLineIter { path, target, iter })
}

fn parse_word(path: &Path, word: &[u8]) -> Result<Vertex> {
    std::str::from_utf8(word)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::Parse {
            path: path.to_path_buf(),
            word: String::from_utf8_lossy(word).into_owned(),
        })
}

impl<'a> Iterator for SimSvmLineIter<'a> {
    type Item = Result<Vertex>;

    fn next(&mut self) -> Option<Result<Vertex>> {
        let path = self.path;
        // repeated delimiters leave empty words behind
        self.iter
            .by_ref()
            .find(|w| !w.is_empty())
            .map(|word| parse_word(path, word))
    }
}

impl<'a> SimSvmLineIter<'a> {
    pub fn target(&self) -> Result<Vertex> {
        parse_word(self.path, self.target)
    }
}
