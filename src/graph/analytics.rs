//! Graph analytics: degree rankings, centrality, and components.
//!
//! All rankings are sorted by score desc with a stable sort, so handles
//! with equal scores keep the graph's node insertion order.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;

use super::MentionGraph;

/// One handle with its score in a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub handle: String,
    pub score: T,
}

impl<T> Ranked<T> {
    pub fn new(handle: impl Into<String>, score: T) -> Self {
        Self {
            handle: handle.into(),
            score,
        }
    }
}

// ---------------------------------------------------------------------------
// Weighted degree
// ---------------------------------------------------------------------------

/// Sum of incoming edge weights per handle ("most mentioned").
pub fn weighted_in_degree(graph: &MentionGraph) -> Vec<Ranked<u64>> {
    weighted_degree(graph, Direction::Incoming)
}

/// Sum of outgoing edge weights per handle ("most active mentioners").
pub fn weighted_out_degree(graph: &MentionGraph) -> Vec<Ranked<u64>> {
    weighted_degree(graph, Direction::Outgoing)
}

fn weighted_degree(graph: &MentionGraph, direction: Direction) -> Vec<Ranked<u64>> {
    let g = graph.graph();
    let mut results: Vec<Ranked<u64>> = g
        .node_indices()
        .map(|idx| {
            let score: u64 = g.edges_directed(idx, direction).map(|e| *e.weight()).sum();
            Ranked::new(g[idx].as_str(), score)
        })
        .collect();
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}

// ---------------------------------------------------------------------------
// Degree centrality
// ---------------------------------------------------------------------------

/// Outcome of a degree centrality computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Centrality {
    /// Scores sorted desc.
    Computed(Vec<Ranked<f64>>),
    /// The graph has too few nodes for the normalization to be defined.
    Unavailable { node_count: usize },
}

impl Centrality {
    /// Scores if computed, `None` otherwise.
    pub fn scores(&self) -> Option<&[Ranked<f64>]> {
        match self {
            Centrality::Computed(scores) => Some(scores),
            Centrality::Unavailable { .. } => None,
        }
    }
}

/// Degree centrality: unweighted in-degree plus out-degree over `N - 1`.
///
/// Reciprocal mentions count both edges, so a score can exceed 1. Graphs
/// with one node or none yield [`Centrality::Unavailable`].
pub fn degree_centrality(graph: &MentionGraph) -> Centrality {
    let g = graph.graph();
    let n = g.node_count();
    if n <= 1 {
        return Centrality::Unavailable { node_count: n };
    }
    let denom = (n - 1) as f64;

    let mut results: Vec<Ranked<f64>> = g
        .node_indices()
        .map(|idx| {
            let degree = g.edges_directed(idx, Direction::Incoming).count()
                + g.edges_directed(idx, Direction::Outgoing).count();
            Ranked::new(g[idx].as_str(), degree as f64 / denom)
        })
        .collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Centrality::Computed(results)
}

/// Truncate a ranking to its first `n` entries.
pub fn top<T>(mut ranking: Vec<Ranked<T>>, n: usize) -> Vec<Ranked<T>> {
    ranking.truncate(n);
    ranking
}

// ---------------------------------------------------------------------------
// Weakly connected components
// ---------------------------------------------------------------------------

/// Weakly connected components as node index lists, largest first.
///
/// Members keep insertion order; equal-size components keep the order of
/// their first member.
pub fn weakly_connected_components(graph: &MentionGraph) -> Vec<Vec<NodeIndex>> {
    let g = graph.graph();
    let mut sets = UnionFind::new(g.node_count());
    for edge in g.edge_references() {
        sets.union(edge.source().index(), edge.target().index());
    }

    let mut slot: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<NodeIndex>> = Vec::new();
    for idx in g.node_indices() {
        let root = sets.find(idx.index());
        let i = *slot.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[i].push(idx);
    }

    components.sort_by(|a, b| b.len().cmp(&a.len()));
    components
}

/// Handles of the largest weakly connected component, `None` for an empty graph.
pub fn largest_component(graph: &MentionGraph) -> Option<Vec<String>> {
    let g = graph.graph();
    weakly_connected_components(graph)
        .into_iter()
        .next()
        .map(|members| members.into_iter().map(|idx| g[idx].clone()).collect())
}
