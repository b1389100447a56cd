//! ACID-durable tweet collection backed by redb.
//!
//! Records are bincode-encoded and stored under their tweet id. All writes
//! go through transactions; reads use MVCC snapshots.

use std::path::Path;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition, TableError};

use crate::error::StoreError;
use crate::record::{Projection, Record};

use super::{StoreResult, UpsertOutcome, UpsertStats};

/// Tweet collection stored in a single redb table.
pub struct TweetStore {
    db: Database,
    table: String,
}

impl TweetStore {
    /// Open or create the store at `path`, using the given table name.
    pub fn open(path: &Path, table: &str) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io { source: e })?;
        }
        let db = Database::create(path).map_err(|e| StoreError::Redb {
            message: format!("failed to open redb at {}: {e}", path.display()),
        })?;
        tracing::debug!(path = %path.display(), table, "opened tweet store");
        Ok(Self {
            db,
            table: table.to_string(),
        })
    }

    /// Open the store at a configured location (path or `redb://` URI).
    pub fn open_location(location: &str, table: &str) -> StoreResult<Self> {
        let path = super::resolve_location(location)?;
        Self::open(&path, table)
    }

    /// Name of the backing table.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    fn definition(&self) -> TableDefinition<'_, &'static str, &'static [u8]> {
        TableDefinition::new(&self.table)
    }

    /// Insert or replace one record keyed by its id.
    pub fn upsert(&self, record: &Record) -> StoreResult<UpsertOutcome> {
        let stats = self.upsert_all(std::slice::from_ref(record))?;
        Ok(if stats.inserted == 1 {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        })
    }

    /// Upsert a batch of records in one write transaction.
    ///
    /// A record whose id is already stored replaces the stored document
    /// (last write wins); the collection never holds two documents per id.
    pub fn upsert_all(&self, records: &[Record]) -> StoreResult<UpsertStats> {
        let mut stats = UpsertStats::default();
        let txn = self.db.begin_write().map_err(|e| StoreError::Redb {
            message: format!("begin_write failed: {e}"),
        })?;
        {
            let mut table = txn
                .open_table(self.definition())
                .map_err(|e| StoreError::Redb {
                    message: format!("open_table failed: {e}"),
                })?;
            for record in records {
                let bytes = encode(record)?;
                let existed = table
                    .insert(record.id.as_str(), bytes.as_slice())
                    .map_err(|e| StoreError::Redb {
                        message: format!("insert failed: {e}"),
                    })?
                    .is_some();
                if existed {
                    stats.updated += 1;
                } else {
                    stats.inserted += 1;
                }
            }
        }
        txn.commit().map_err(|e| StoreError::Redb {
            message: format!("commit failed: {e}"),
        })?;
        Ok(stats)
    }

    /// Read a record by id. Returns `Ok(None)` if the id isn't stored.
    pub fn get(&self, id: &str) -> StoreResult<Option<Record>> {
        let txn = self.db.begin_read().map_err(|e| StoreError::Redb {
            message: format!("begin_read failed: {e}"),
        })?;
        let table = match txn.open_table(self.definition()) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => {
                return Err(StoreError::Redb {
                    message: format!("open_table failed: {e}"),
                });
            }
        };
        let guard = table.get(id).map_err(|e| StoreError::Redb {
            message: format!("get failed: {e}"),
        })?;
        guard.map(|value| decode(id, value.value())).transpose()
    }

    /// Fetch every stored record, ordered by id.
    pub fn records(&self) -> StoreResult<Vec<Record>> {
        let txn = self.db.begin_read().map_err(|e| StoreError::Redb {
            message: format!("begin_read failed: {e}"),
        })?;
        let table = match txn.open_table(self.definition()) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(vec![]),
            Err(e) => {
                return Err(StoreError::Redb {
                    message: format!("open_table failed: {e}"),
                });
            }
        };
        let iter = table.iter().map_err(|e| StoreError::Redb {
            message: format!("iter failed: {e}"),
        })?;
        let mut records = Vec::new();
        for entry in iter {
            let (key, value) = entry.map_err(|e| StoreError::Redb {
                message: format!("iteration failed: {e}"),
            })?;
            records.push(decode(key.value(), value.value())?);
        }
        Ok(records)
    }

    /// Fetch every stored record, keeping only the projected fields.
    pub fn records_projected(&self, projection: &Projection) -> StoreResult<Vec<Record>> {
        Ok(self
            .records()?
            .into_iter()
            .map(|r| projection.apply(r))
            .collect())
    }

    /// Number of stored documents.
    pub fn count(&self) -> StoreResult<u64> {
        let txn = self.db.begin_read().map_err(|e| StoreError::Redb {
            message: format!("begin_read failed: {e}"),
        })?;
        match txn.open_table(self.definition()) {
            Ok(table) => table.len().map_err(|e| StoreError::Redb {
                message: format!("len failed: {e}"),
            }),
            Err(TableError::TableDoesNotExist(_)) => Ok(0),
            Err(e) => Err(StoreError::Redb {
                message: format!("open_table failed: {e}"),
            }),
        }
    }
}

impl std::fmt::Debug for TweetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweetStore")
            .field("table", &self.table)
            .finish()
    }
}

fn encode(record: &Record) -> StoreResult<Vec<u8>> {
    bincode::serialize(record).map_err(|e| StoreError::Serialization {
        id: record.id.clone(),
        message: e.to_string(),
    })
}

fn decode(id: &str, bytes: &[u8]) -> StoreResult<Record> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization {
        id: id.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> TweetStore {
        TweetStore::open(&dir.path().join("tweets.redb"), "tweet_collection").unwrap()
    }

    #[test]
    fn empty_store_counts_zero() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.records().unwrap().is_empty());
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn upsert_same_id_keeps_one_document() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let first = Record::new("42").with_text("first").with_metric("like_count", 1);
        let second = Record::new("42")
            .with_text("second")
            .with_author("alice")
            .with_metric("like_count", 9);

        assert_eq!(store.upsert(&first).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(store.upsert(&second).unwrap(), UpsertOutcome::Updated);

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("42").unwrap(), Some(second));
    }

    #[test]
    fn upsert_all_reports_stats() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store.upsert(&Record::new("1")).unwrap();
        let stats = store
            .upsert_all(&[Record::new("1"), Record::new("2"), Record::new("3")])
            .unwrap();
        assert_eq!(
            stats,
            UpsertStats {
                inserted: 2,
                updated: 1
            }
        );
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn records_projected_drops_metrics() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store
            .upsert(&Record::new("1").with_author("a").with_metric("reply_count", 2))
            .unwrap();

        let records = store
            .records_projected(&Projection::new(&[Field::Author]))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].author.as_deref(), Some("a"));
        assert!(records[0].metrics.is_empty());
    }

    #[test]
    fn persistence_across_reopens() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir);
            store.upsert(&Record::new("9").with_text("kept")).unwrap();
        }
        let store = open_store(&dir);
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(
            store.get("9").unwrap().and_then(|r| r.text),
            Some("kept".to_string())
        );
    }

    #[test]
    fn open_location_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let location = format!("redb://{}", dir.path().join("nested/db.redb").display());
        let store = TweetStore::open_location(&location, "tweets").unwrap();
        assert_eq!(store.table_name(), "tweets");
        assert!(dir.path().join("nested/db.redb").exists());
    }
}
