//! Text report for the mention network analysis.

use std::fmt;

use crate::graph::analytics::{self, Centrality, Ranked};
use crate::graph::{MentionCounter, MentionGraph};

/// Printed when no record produced a mention edge.
pub const NO_EDGES_MESSAGE: &str =
    "No mention edges found in tweets. Consider using co-occurrence or adding referenced tweets data.";

/// Summary statistics and top-N rankings for one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Where the records came from, for the header line.
    pub source: String,
    pub records_loaded: usize,
    pub node_count: usize,
    pub edge_count: usize,
    /// Accepted mention occurrences (sum of edge weights).
    pub mention_count: u64,
    /// Distinct (author, mentioned) pairs.
    pub pair_count: usize,
    pub top: usize,
    pub in_degree: Vec<Ranked<u64>>,
    pub out_degree: Vec<Ranked<u64>>,
    pub centrality: Centrality,
}

impl AnalysisReport {
    /// Rank `graph` and keep the first `top` entries of each ranking.
    ///
    /// Rankings are left empty for an empty graph.
    pub fn new(
        source: impl Into<String>,
        records_loaded: usize,
        graph: &MentionGraph,
        counter: &MentionCounter,
        top: usize,
    ) -> Self {
        let (in_degree, out_degree, centrality) = if graph.is_empty() {
            (vec![], vec![], Centrality::Unavailable { node_count: 0 })
        } else {
            let centrality = match analytics::degree_centrality(graph) {
                Centrality::Computed(scores) => Centrality::Computed(analytics::top(scores, top)),
                unavailable => unavailable,
            };
            (
                analytics::top(analytics::weighted_in_degree(graph), top),
                analytics::top(analytics::weighted_out_degree(graph), top),
                centrality,
            )
        };

        Self {
            source: source.into(),
            records_loaded,
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            mention_count: counter.total(),
            pair_count: counter.len(),
            top,
            in_degree,
            out_degree,
            centrality,
        }
    }

    /// Whether the graph had no nodes (no rankings were computed).
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Loaded {} tweets from {}", self.records_loaded, self.source)?;
        writeln!(f, "Graph nodes: {}, edges: {}", self.node_count, self.edge_count)?;

        if self.is_empty() {
            return writeln!(f, "{NO_EDGES_MESSAGE}");
        }

        writeln!(
            f,
            "Mentions: {} across {} author/mention pairs",
            self.mention_count, self.pair_count
        )?;

        writeln!(f, "\nTop {} most-mentioned users (in-degree):", self.top)?;
        for r in &self.in_degree {
            writeln!(f, "  {}: {}", r.handle, r.score)?;
        }

        writeln!(f, "\nTop {} most-active mentioners (out-degree):", self.top)?;
        for r in &self.out_degree {
            writeln!(f, "  {}: {}", r.handle, r.score)?;
        }

        match &self.centrality {
            Centrality::Computed(scores) => {
                writeln!(f, "\nTop {} by degree centrality:", self.top)?;
                for r in scores {
                    writeln!(f, "  {}: {:.4}", r.handle, r.score)?;
                }
            }
            Centrality::Unavailable { node_count } => {
                writeln!(
                    f,
                    "\nDegree centrality unavailable for a graph with {node_count} node(s)."
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_mention_graph;
    use crate::record::Record;

    fn tweet(id: &str, author: &str, text: &str) -> Record {
        Record::new(id).with_author(author).with_text(text)
    }

    #[test]
    fn renders_rankings() {
        let records = vec![
            tweet("1", "a", "hi @B and @b"),
            tweet("2", "b", "thanks @A"),
        ];
        let (graph, counter) = build_mention_graph(&records);
        let report = AnalysisReport::new("tweet_collection", records.len(), &graph, &counter, 1);
        let text = report.to_string();

        assert!(text.starts_with("Loaded 2 tweets from tweet_collection\nGraph nodes: 2, edges: 2\n"));
        assert!(text.contains("Mentions: 3 across 2 author/mention pairs"));
        assert!(text.contains("Top 1 most-mentioned users (in-degree):\n  b: 2\n"));
        assert!(text.contains("Top 1 most-active mentioners (out-degree):\n  a: 2\n"));
        assert!(text.contains("Top 1 by degree centrality:\n  a: 2.0000\n"));
        assert!(!text.contains(NO_EDGES_MESSAGE));
    }

    #[test]
    fn empty_graph_prints_message_only() {
        let records = vec![tweet("1", "a", "nothing to see")];
        let (graph, counter) = build_mention_graph(&records);
        let report = AnalysisReport::new("tweet_collection", 1, &graph, &counter, 10);

        assert!(report.is_empty());
        assert!(report.in_degree.is_empty());
        let text = report.to_string();
        assert!(text.contains("Graph nodes: 0, edges: 0"));
        assert!(text.contains(NO_EDGES_MESSAGE));
        assert!(!text.contains("Top "));
    }

    #[test]
    fn rankings_truncated_to_top() {
        let records = vec![tweet("1", "hub", "@a @b @c @d @e")];
        let (graph, counter) = build_mention_graph(&records);
        let report = AnalysisReport::new("t", 1, &graph, &counter, 3);
        assert_eq!(report.in_degree.len(), 3);
        assert_eq!(report.out_degree.len(), 3);
        assert_eq!(report.centrality.scores().map(|s| s.len()), Some(3));
        assert_eq!(report.out_degree[0], Ranked::new("hub", 5));
    }
}
