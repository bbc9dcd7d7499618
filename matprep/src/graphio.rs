//! Simple graph format reader.
//!
//! Each line is `<vertex> <neighbor> <neighbor>...`. Edges may be listed
//! from either end or both; the result is the symmetric, deduplicated
//! adjacency over `0..=max id`.

use std::time::Instant;

use rayon::iter::ParallelIterator;
use serde_json::json;

use crate::error::Result;
use crate::graph::{SparseGraph, Vertex};
use crate::{simsvm, Scanner};

/// Reads the files behind a scanner into an in-memory graph.
pub fn read(scanner: &Scanner) -> Result<SparseGraph> {
    let edge_start = Instant::now();
    let shards: Vec<Vec<(Vertex, Vertex)>> = scanner
        .fold(
            |_| Vec::new(),
            |mut edges, path, words| {
                let line = match simsvm::parse(path, words) {
                    Some(line) => line,
                    None => return Ok(edges),
                };
                let target = line.target()?;
                // isolated vertices still need to be counted
                edges.push((target, target));
                for neighbor in line {
                    edges.push((target, neighbor?));
                }
                Ok(edges)
            },
        )
        .collect::<Result<_>>()?;
    let edge_time = format!("{:.0?}", Instant::now().duration_since(edge_start));

    let nvertices = shards
        .iter()
        .flatten()
        .map(|&(u, v)| u.max(v) as usize + 1)
        .max()
        .unwrap_or(0);

    let build_start = Instant::now();
    let graph = SparseGraph::from_edges(nvertices, shards.into_iter().flatten())?;
    let build_time = format!("{:.0?}", Instant::now().duration_since(build_start));

    println!(
        "{}",
        json!({
            "edge_time": edge_time,
            "build_time": build_time,
            "nvertices": graph.nrows(),
            "nedges": graph.nnz() / 2,
        })
    );

    Ok(graph)
}
