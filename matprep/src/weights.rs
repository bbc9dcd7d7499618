//! Per-vertex weights and initial local orderings for coloring.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use ordered_float::OrderedFloat;
use rand::Rng;
use serde_json::json;

use crate::degree::graph_degrees;
use crate::error::{try_filled, Result};
use crate::overlap::PartitionedGraph;
use crate::SummaryStats;

/// How vertices are weighted and ordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightPolicy {
    /// Weight is the global index, order is the identity.
    Natural,
    /// Weight is a random value, ascending order.
    Random,
    /// Weight is a degree plus a random perturbation, descending order.
    LargestFirst,
}

/// Which degree [`WeightPolicy::LargestFirst`] weighs vertices by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegreeSource {
    /// Stored entries in the vertex's row.
    RowNonzeros,
    /// Distinct vertices within the configured distance.
    Distance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightConfig {
    pub policy: WeightPolicy,
    /// Hop count for the distance degrees, at least 1.
    pub distance: u32,
    pub degree_source: DegreeSource,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            policy: WeightPolicy::LargestFirst,
            distance: 1,
            degree_source: DegreeSource::RowNonzeros,
        }
    }
}

/// Unrecognized policy or degree source name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName(String);

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown name {:?}", self.0)
    }
}

impl std::error::Error for UnknownName {}

impl FromStr for WeightPolicy {
    type Err = UnknownName;

    fn from_str(s: &str) -> std::result::Result<Self, UnknownName> {
        match s {
            "natural" => Ok(Self::Natural),
            "random" => Ok(Self::Random),
            "lf" | "largest-first" => Ok(Self::LargestFirst),
            _ => Err(UnknownName(s.to_string())),
        }
    }
}

impl FromStr for DegreeSource {
    type Err = UnknownName;

    fn from_str(s: &str) -> std::result::Result<Self, UnknownName> {
        match s {
            "row" => Ok(Self::RowNonzeros),
            "distance" => Ok(Self::Distance),
            _ => Err(UnknownName(s.to_string())),
        }
    }
}

/// Weights for the owned vertices and an ordering of them.
///
/// `weights[k]` belongs to global vertex `start + k`; `local_perm` is a
/// permutation of `0..n` listing local indices in policy order.
#[derive(Clone, Debug, PartialEq)]
pub struct Weights {
    pub weights: Vec<f64>,
    pub local_perm: Vec<usize>,
}

/// Weighs and orders the owned vertices of `graph` under `config`.
///
/// Every policy draws exactly one value from `rng` per owned vertex in
/// ascending order; natural discards its draws so the stream advances the
/// same way whichever policy is chosen.
pub fn create_weights<G, R>(graph: &G, config: &WeightConfig, rng: &mut R) -> Result<Weights>
where
    G: PartitionedGraph + ?Sized,
    R: Rng,
{
    let start = Instant::now();
    let weights = match config.policy {
        WeightPolicy::Natural => natural(graph, rng)?,
        WeightPolicy::Random => random(graph, rng)?,
        WeightPolicy::LargestFirst => largest_first(graph, config, rng)?,
    };

    let mut record = json!({
        "weight_policy": format!("{:?}", config.policy),
        "weight_nvertices": weights.weights.len(),
        "weight_time": format!("{:.0?}", Instant::now().duration_since(start)),
    });
    if let Some(stats) = SummaryStats::from(weights.weights.iter().copied()) {
        record["weights"] = json!(stats.to_map());
    }
    println!("{}", record);

    Ok(weights)
}

fn natural<G, R>(graph: &G, rng: &mut R) -> Result<Weights>
where
    G: PartitionedGraph + ?Sized,
    R: Rng,
{
    let range = graph.ownership_range();
    let mut weights = try_filled(range.len(), 0.0)?;
    let mut local_perm = try_filled(range.len(), 0)?;
    for (k, global) in range.globals().enumerate() {
        let _: f64 = rng.gen();
        weights[k] = f64::from(global);
        local_perm[k] = k;
    }
    Ok(Weights {
        weights,
        local_perm,
    })
}

fn random<G, R>(graph: &G, rng: &mut R) -> Result<Weights>
where
    G: PartitionedGraph + ?Sized,
    R: Rng,
{
    let n = graph.ownership_range().len();
    let mut weights = try_filled(n, 0.0)?;
    for w in weights.iter_mut() {
        *w = rng.gen::<f64>().abs();
    }
    let local_perm = ascending(&weights)?;
    Ok(Weights {
        weights,
        local_perm,
    })
}

fn largest_first<G, R>(graph: &G, config: &WeightConfig, rng: &mut R) -> Result<Weights>
where
    G: PartitionedGraph + ?Sized,
    R: Rng,
{
    let range = graph.ownership_range();
    let degrees = graph_degrees(graph, config.distance)?;
    if let Some(stats) = SummaryStats::from(degrees.iter().map(|&d| d as f64)) {
        println!(
            "{}",
            json!({
                "degree_distance": config.distance,
                "degrees": stats.to_map(),
            })
        );
    }

    // the random term only breaks ties between equal degrees
    let mut weights = try_filled(range.len(), 0.0)?;
    for (k, global) in range.globals().enumerate() {
        let degree = match config.degree_source {
            DegreeSource::RowNonzeros => graph.row_nonzeros(global),
            DegreeSource::Distance => degrees[k],
        };
        weights[k] = degree as f64 + rng.gen::<f64>().abs();
    }
    let mut local_perm = ascending(&weights)?;
    local_perm.reverse();
    Ok(Weights {
        weights,
        local_perm,
    })
}

/// Indices sorting `weights` ascending, ties kept in index order.
fn ascending(weights: &[f64]) -> Result<Vec<usize>> {
    let mut perm = try_filled(weights.len(), 0)?;
    for (k, p) in perm.iter_mut().enumerate() {
        *p = k;
    }
    perm.sort_by_key(|&k| OrderedFloat(weights[k]));
    Ok(perm)
}
