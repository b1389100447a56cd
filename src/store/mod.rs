//! Keyed record store for ingested tweets.
//!
//! - [`TweetStore`] — ACID-durable document collection backed by redb,
//!   keyed by tweet id with upsert semantics.
//!
//! The store location comes from configuration as either a plain
//! filesystem path or a `redb://` URI.

pub mod durable;

use std::path::PathBuf;

use crate::error::StoreError;

pub use crate::error::StoreResult;
pub use durable::TweetStore;

/// Default table (collection) name.
pub const DEFAULT_TABLE: &str = "tweet_collection";

const REDB_SCHEME: &str = "redb://";

/// Counts of what an upsert batch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertStats {
    /// Records whose id was not yet stored.
    pub inserted: usize,
    /// Records that replaced an existing document with the same id.
    pub updated: usize,
}

impl std::fmt::Display for UpsertStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inserted: {}, updated: {}", self.inserted, self.updated)
    }
}

/// Whether a single upsert created or replaced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Resolve a store location (path or `redb://` URI) to a database file path.
pub fn resolve_location(location: &str) -> StoreResult<PathBuf> {
    let location = location.trim();
    let path = match location.strip_prefix(REDB_SCHEME) {
        Some(rest) => rest,
        None if location.contains("://") => {
            return Err(StoreError::UnsupportedLocation {
                location: location.to_string(),
            });
        }
        None => location,
    };
    if path.is_empty() {
        return Err(StoreError::UnsupportedLocation {
            location: location.to_string(),
        });
    }
    Ok(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_path_location() {
        assert_eq!(
            resolve_location("data/tweets.redb").unwrap(),
            PathBuf::from("data/tweets.redb")
        );
    }

    #[test]
    fn redb_uri_location() {
        assert_eq!(
            resolve_location("redb:///var/lib/tweets.redb").unwrap(),
            PathBuf::from("/var/lib/tweets.redb")
        );
    }

    #[test]
    fn foreign_scheme_rejected() {
        let err = resolve_location("mongodb://localhost:27017").unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedLocation { .. }));
    }

    #[test]
    fn empty_location_rejected() {
        assert!(resolve_location("redb://").is_err());
        assert!(resolve_location("  ").is_err());
    }

    #[test]
    fn upsert_stats_display() {
        let stats = UpsertStats {
            inserted: 3,
            updated: 1,
        };
        assert_eq!(stats.to_string(), "inserted: 3, updated: 1");
    }
}
