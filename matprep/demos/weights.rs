//! Computes coloring weights over a provided graph stored in simple
//! graph format across sharded input files, splitting the vertices
//! among a number of emulated ranks.

use std::path::PathBuf;
use std::time::Instant;

use serde_json::json;
use structopt::StructOpt;

use matprep::degree::graph_degrees;
use matprep::overlap::{LocalPartition, OwnershipRange};
use matprep::weights::{create_weights, DegreeSource, WeightConfig, WeightPolicy};
use matprep::{graphio, seeded_rng, Scanner, SummaryStats};

/// Reads simplified graph format files.
///
/// Weighs and orders the vertices owned by each emulated rank.
#[derive(Debug, StructOpt)]
#[structopt(name = "weights", about = "Compute coloring weights.")]
struct Opt {
    /// Simple graph format graph files in adjacency list form.
    #[structopt(long)]
    graph: Vec<PathBuf>,

    /// Weight policy: natural, random, or lf.
    #[structopt(long, default_value = "lf")]
    policy: WeightPolicy,

    /// Hop distance for degree computation.
    #[structopt(long, default_value = "1")]
    distance: u32,

    /// Degree used by the lf policy: row or distance.
    #[structopt(long, default_value = "row")]
    degree_source: DegreeSource,

    /// Number of contiguous ownership ranges to split vertices into.
    #[structopt(long, default_value = "1")]
    nparts: u32,

    /// Random perturbation seed.
    #[structopt(long, default_value = "0")]
    seed: u64,
}

fn main() -> matprep::Result<()> {
    let opt = Opt::from_args();

    let load_graph_start = Instant::now();
    let graph = graphio::read(&Scanner::new(opt.graph, b' '))?;
    println!(
        "{}",
        json!({
            "load_graph_duration":
                format!("{:.0?}", Instant::now().duration_since(load_graph_start))
        })
    );

    let config = WeightConfig {
        policy: opt.policy,
        distance: opt.distance,
        degree_source: opt.degree_source,
    };

    let nglobal = graph.nrows() as u32;
    for (rank, range) in OwnershipRange::split(nglobal, opt.nparts)
        .into_iter()
        .enumerate()
    {
        let part = LocalPartition::new(&graph, range)?;
        let mut rng = seeded_rng(opt.seed + rank as u64);

        let degrees_start = Instant::now();
        let degrees = graph_degrees(&part, config.distance)?;
        let degrees_time = Instant::now().duration_since(degrees_start);

        let weights = create_weights(&part, &config, &mut rng)?;
        let first = weights.local_perm.first().map(|&k| range.start() as usize + k);
        println!(
            "{}",
            json!({
                "rank": rank,
                "start": range.start(),
                "end": range.end(),
                "first_vertex": first,
                "degrees": SummaryStats::from(degrees.iter().map(|&d| d as f64)).map(|s| s.to_map()),
                "degrees_duration": format!("{:.0?}", degrees_time),
            })
        );
    }

    Ok(())
}
