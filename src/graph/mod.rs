//! Mention graph: who @-mentions whom across stored tweets.
//!
//! - [`MentionGraph`]: weighted directed graph over lower-cased handles,
//!   backed by `petgraph` with a handle → node index map
//! - [`MentionCounter`]: the same (author, mentioned) counts kept in
//!   first-seen order
//! - [`build_mention_graph`]: single pass over records producing both
//!
//! Rankings live in [`analytics`], file output in [`export`].

pub mod analytics;
pub mod export;
pub mod layout;
pub mod mention;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::record::Record;

pub use mention::{extract_mentions, normalize_handle};

/// Directed mention graph. Edge weight = number of mentions.
///
/// Nodes are created lazily by [`MentionGraph::add_mention`], so every node
/// participates in at least one edge. Parallel edges never exist; repeated
/// mentions bump the weight of the existing edge.
#[derive(Debug, Clone, Default)]
pub struct MentionGraph {
    graph: DiGraph<String, u64>,
    node_index: HashMap<String, NodeIndex>,
}

impl MentionGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a node exists for the given handle, returning its NodeIndex.
    fn ensure_node(&mut self, handle: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(handle) {
            return idx;
        }
        let idx = self.graph.add_node(handle.to_string());
        self.node_index.insert(handle.to_string(), idx);
        idx
    }

    /// Record one mention of `target` by `source`.
    ///
    /// Callers are responsible for filtering self-mentions and empty
    /// handles; [`build_mention_graph`] does.
    pub fn add_mention(&mut self, source: &str, target: &str) {
        let s = self.ensure_node(source);
        let t = self.ensure_node(target);
        match self.graph.find_edge(s, t) {
            Some(edge) => self.graph[edge] += 1,
            None => {
                self.graph.add_edge(s, t, 1);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn has_node(&self, handle: &str) -> bool {
        self.node_index.contains_key(handle)
    }

    /// Weight of the edge `source → target`, if present.
    pub fn edge_weight(&self, source: &str, target: &str) -> Option<u64> {
        let s = *self.node_index.get(source)?;
        let t = *self.node_index.get(target)?;
        self.graph.find_edge(s, t).map(|e| self.graph[e])
    }

    /// Handles in node insertion order.
    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// All edges as `(source, target, weight)`, in edge insertion order.
    pub fn edges(&self) -> Vec<(&str, &str, u64)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].as_str(),
                    self.graph[e.target()].as_str(),
                    *e.weight(),
                )
            })
            .collect()
    }

    /// Sum of all edge weights, i.e. the number of accepted mentions.
    pub fn total_weight(&self) -> u64 {
        self.graph.edge_weights().sum()
    }

    /// Handles that mention `handle`.
    pub fn mentioned_by(&self, handle: &str) -> Vec<&str> {
        self.neighbors(handle, Direction::Incoming)
    }

    /// Handles that `handle` mentions.
    pub fn mentions_of(&self, handle: &str) -> Vec<&str> {
        self.neighbors(handle, Direction::Outgoing)
    }

    fn neighbors(&self, handle: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_index.get(handle) else {
            return vec![];
        };
        self.graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].as_str())
            .collect()
    }

    /// Borrow the underlying petgraph graph.
    pub fn graph(&self) -> &DiGraph<String, u64> {
        &self.graph
    }
}

impl PartialEq for MentionGraph {
    /// Same node set, same edge set, same weights; insertion order ignored.
    fn eq(&self, other: &Self) -> bool {
        let nodes = |g: &MentionGraph| g.handles().map(str::to_string).collect::<BTreeSet<_>>();
        let edges = |g: &MentionGraph| {
            g.edges()
                .into_iter()
                .map(|(s, t, w)| ((s.to_string(), t.to_string()), w))
                .collect::<BTreeMap<_, _>>()
        };
        nodes(self) == nodes(other) && edges(self) == edges(other)
    }
}

impl Eq for MentionGraph {}

/// Counts per (author, mentioned) pair, iterated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionCounter {
    entries: Vec<((String, String), u64)>,
    index: HashMap<(String, String), usize>,
}

impl MentionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to the count for `(author, mentioned)`.
    pub fn increment(&mut self, author: &str, mentioned: &str) {
        let key = (author.to_string(), mentioned.to_string());
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    /// Count for a pair; zero if never seen.
    pub fn get(&self, author: &str, mentioned: &str) -> u64 {
        self.index
            .get(&(author.to_string(), mentioned.to_string()))
            .map(|&i| self.entries[i].1)
            .unwrap_or(0)
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// `((author, mentioned), count)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, u64)> {
        self.entries
            .iter()
            .map(|((a, m), c)| (a.as_str(), m.as_str(), *c))
    }

    /// The `n` most frequent pairs, count desc; ties keep first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<(&str, &str, u64)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by(|a, b| b.2.cmp(&a.2));
        pairs.truncate(n);
        pairs
    }
}

/// Build the mention graph and pair counter from records in one pass.
///
/// Author and mentioned handles are lower-cased. Records without an author
/// contribute nothing; self-mentions are dropped.
pub fn build_mention_graph<'a, I>(records: I) -> (MentionGraph, MentionCounter)
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut graph = MentionGraph::new();
    let mut counter = MentionCounter::new();

    for record in records {
        let author = record
            .author
            .as_deref()
            .map(normalize_handle)
            .unwrap_or_default();
        if author.is_empty() {
            continue;
        }
        let text = record.text.as_deref().unwrap_or_default();

        for mentioned in extract_mentions(text) {
            if mentioned.is_empty() || mentioned == author {
                continue;
            }
            counter.increment(&author, &mentioned);
            graph.add_mention(&author, &mentioned);
        }
    }

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        mentions = counter.total(),
        "built mention graph"
    );
    (graph, counter)
}
