//! The three units behind the CLI: fetch, analyze, verify.
//!
//! Each takes its collaborators explicitly so it can run against a
//! temporary store and a scripted search transport.

use std::path::{Path, PathBuf};

use crate::error::{ExportError, ExportResult, StoreResult, TweetNetResult};
use crate::graph::export::{self, GraphFormat};
use crate::graph::{MentionCounter, MentionGraph, build_mention_graph};
use crate::record::Projection;
use crate::report::AnalysisReport;
use crate::search::{SearchClient, SearchTransport, Sleeper};
use crate::store::{TweetStore, UpsertStats};

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// What a fetch run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    pub fetched: usize,
    pub stats: UpsertStats,
}

/// Fetch tweets for `query` and upsert them into the store at `store_location`.
///
/// The store is only opened when there is something to write.
pub fn fetch<T: SearchTransport, S: Sleeper>(
    client: &SearchClient<T, S>,
    store_location: &str,
    table: &str,
    query: &str,
    max_results: u32,
) -> TweetNetResult<FetchOutcome> {
    tracing::info!(query, max_results, "fetching tweets");
    let records = client.fetch(query, max_results)?;
    tracing::info!(count = records.len(), "fetched tweets");

    if records.is_empty() {
        tracing::info!("no tweets to store");
        return Ok(FetchOutcome {
            fetched: 0,
            stats: UpsertStats::default(),
        });
    }

    let store = TweetStore::open_location(store_location, table)?;
    let stats = store.upsert_all(&records)?;
    tracing::info!(inserted = stats.inserted, updated = stats.updated, "store complete");
    Ok(FetchOutcome {
        fetched: records.len(),
        stats,
    })
}

// ---------------------------------------------------------------------------
// Analyze
// ---------------------------------------------------------------------------

/// Graph, pair counts, and report from one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub graph: MentionGraph,
    pub counter: MentionCounter,
    pub report: AnalysisReport,
}

/// Load every stored tweet and build the mention graph and report.
pub fn analyze(store: &TweetStore, top: usize) -> StoreResult<Analysis> {
    let records = store.records_projected(&Projection::mention_graph())?;
    tracing::debug!(count = records.len(), table = store.table_name(), "loaded tweets");

    let (graph, counter) = build_mention_graph(&records);
    let report = AnalysisReport::new(store.table_name(), records.len(), &graph, &counter, top);
    Ok(Analysis {
        graph,
        counter,
        report,
    })
}

/// Result of the optional image step of [`save`].
#[derive(Debug)]
pub enum ImageOutcome {
    NotRequested,
    Rendered(PathBuf),
    Failed(ExportError),
}

/// Result of [`save`].
#[derive(Debug)]
pub struct SavedGraph {
    pub path: PathBuf,
    pub format: GraphFormat,
    pub image: ImageOutcome,
}

/// Write the graph file, then try the image if one was asked for.
///
/// A graph-file failure is an error; an image failure is reported in
/// [`ImageOutcome::Failed`] for the caller to decide on.
pub fn save(graph: &MentionGraph, path: &Path, image: Option<&Path>) -> ExportResult<SavedGraph> {
    let format = export::write_graph(graph, path)?;
    let image = match image {
        None => ImageOutcome::NotRequested,
        Some(image_path) => match export::render_image(graph, image_path) {
            Ok(()) => ImageOutcome::Rendered(image_path.to_path_buf()),
            Err(e) => ImageOutcome::Failed(e),
        },
    };
    Ok(SavedGraph {
        path: path.to_path_buf(),
        format,
        image,
    })
}

// ---------------------------------------------------------------------------
// Verify
// ---------------------------------------------------------------------------

/// Number of stored tweets.
pub fn verify(store: &TweetStore) -> StoreResult<u64> {
    store.count()
}
