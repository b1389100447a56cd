//! The stored tweet record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One ingested tweet, keyed by its tweet id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Tweet id; the store's primary key.
    pub id: String,
    /// Tweet body.
    pub text: Option<String>,
    /// Author handle (username), joined from the search response's user table.
    pub author: Option<String>,
    /// Creation timestamp as reported by the API (RFC 3339).
    pub created_at: Option<String>,
    /// Public engagement metrics (`retweet_count`, `like_count`, ...).
    pub metrics: BTreeMap<String, u64>,
}

impl Record {
    /// Create a record with only an id; other fields empty.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: None,
            author: None,
            created_at: None,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: u64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }
}

/// A record field that can be selected in a [`Projection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Text,
    Author,
    CreatedAt,
    Metrics,
}

/// A field subset to keep when reading records back from the store.
///
/// The id is always kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<Field>,
}

impl Projection {
    pub fn new(fields: &[Field]) -> Self {
        Self {
            fields: fields.to_vec(),
        }
    }

    /// Fields the mention graph reads.
    pub fn mention_graph() -> Self {
        Self::new(&[Field::Author, Field::Text, Field::CreatedAt])
    }

    pub fn includes(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Clear every field of `record` not selected by this projection.
    pub fn apply(&self, mut record: Record) -> Record {
        if !self.includes(Field::Text) {
            record.text = None;
        }
        if !self.includes(Field::Author) {
            record.author = None;
        }
        if !self.includes(Field::CreatedAt) {
            record.created_at = None;
        }
        if !self.includes(Field::Metrics) {
            record.metrics.clear();
        }
        record
    }
}
