//! Reorders the upper-triangular storage of a provided graph's
//! adjacency matrix under a random symmetric permutation and checks the
//! result.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use rand::seq::SliceRandom;
use serde_json::json;
use structopt::StructOpt;

use matprep::graph::Vertex;
use matprep::permute::Permutation;
use matprep::reorder::reorder;
use matprep::{graphio, seeded_rng, Scanner};

/// Reads simplified graph format files.
///
/// Stores the symmetric adjacency (plus diagonal) upper-triangular-only and
/// relocates its entries for a random involution.
#[derive(Debug, StructOpt)]
#[structopt(name = "reorder", about = "Symmetric reordering of a graph matrix.")]
struct Opt {
    /// Simple graph format graph files in adjacency list form.
    #[structopt(long)]
    graph: Vec<PathBuf>,

    /// Fraction of vertices that take part in a transposition.
    #[structopt(long, default_value = "1.0")]
    swap_fraction: f64,

    /// Permutation sampling seed.
    #[structopt(long, default_value = "0")]
    seed: u64,
}

fn main() -> matprep::Result<()> {
    let opt = Opt::from_args();

    let graph = graphio::read(&Scanner::new(opt.graph, b' '))?;
    let upper = graph.upper_triangle(true);

    // pair up a shuffled prefix of the vertices into disjoint swaps
    let n = upper.nrows();
    let mut rng = seeded_rng(opt.seed);
    let mut order: Vec<Vertex> = (0..n as Vertex).collect();
    order.shuffle(&mut rng);
    let nswapped = ((n as f64 * opt.swap_fraction.max(0.0).min(1.0)) as usize) & !1;
    let mut map: Vec<Vertex> = (0..n as Vertex).collect();
    for pair in order[..nswapped].chunks(2) {
        map[pair[0] as usize] = pair[1];
        map[pair[1] as usize] = pair[0];
    }
    let perm = Arc::new(Permutation::new(map)?);

    let reorder_start = Instant::now();
    let result = reorder(&upper, &perm)?;
    let reorder_duration = Instant::now().duration_since(reorder_start);

    let mut values: Vec<usize> = (0..upper.nnz()).collect();
    result.permute_values(&mut values)?;
    let values_moved = values.iter().enumerate().filter(|&(j, &v)| j != v).count();

    println!(
        "{}",
        json!({
            "nvertices": n,
            "nnz": upper.nnz(),
            "nswapped": nswapped,
            "values_moved": values_moved,
            "reorder_duration": format!("{:.0?}", reorder_duration),
        })
    );

    assert_eq!(result.graph.nnz(), upper.nnz());
    assert!(result.graph.is_upper_triangular_under(perm.as_slice()));
    Ok(())
}
