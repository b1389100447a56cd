// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # tweetnet
//!
//! Fetch tweets into an embedded document store and analyze who @-mentions
//! whom.
//!
//! ## Architecture
//!
//! - **Search** (`search`): Twitter v2 recent search over `ureq`, with
//!   exponential backoff on HTTP 429
//! - **Store** (`store`): tweet collection in `redb`, upserted by tweet id
//! - **Mention graph** (`graph`): `petgraph` digraph with weighted edges,
//!   degree rankings, GraphML/DOT/SVG export
//! - **Report** (`report`): the text summary `tweetnet analyze` prints
//!
//! ## Library usage
//!
//! ```
//! use tweetnet::graph::{analytics, build_mention_graph};
//! use tweetnet::record::Record;
//!
//! let records = vec![
//!     Record::new("1").with_author("a").with_text("hi @B and @b"),
//!     Record::new("2").with_author("b").with_text("thanks @A"),
//! ];
//! let (graph, _counter) = build_mention_graph(&records);
//! assert_eq!(graph.edge_weight("a", "b"), Some(2));
//!
//! let most_mentioned = analytics::top(analytics::weighted_in_degree(&graph), 1);
//! assert_eq!(most_mentioned[0].handle, "b");
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod graph;
pub mod record;
pub mod report;
pub mod search;
pub mod store;
