use std::collections::HashSet;

use serde_json::{Map, Value};

/// Field carrying the unique post identifier.
pub const ID_FIELD: &str = "id_str";
/// Field carrying the full post text.
pub const TEXT_FIELD: &str = "full_text";
/// Field carrying the author's numeric identifier.
pub const AUTHOR_ID_FIELD: &str = "user_id_str";

/// One post object as returned by the backend.
///
/// Only the identifier is guaranteed; every other field is whatever the
/// backend sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    id: String,
    fields: Map<String, Value>,
}

impl RawRecord {
    /// Wraps a JSON object, rejecting anything without a string identifier.
    pub fn from_object(fields: Map<String, Value>) -> Option<Self> {
        let id = fields.get(ID_FIELD)?.as_str()?.to_string();
        Some(Self { id, fields })
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned().and_then(Self::from_object)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn has_text(&self) -> bool {
        self.fields.contains_key(TEXT_FIELD)
    }

    pub fn author_id(&self) -> Option<&str> {
        self.fields.get(AUTHOR_ID_FIELD).and_then(Value::as_str)
    }
}

/// Insertion-ordered, identifier-unique collection of records.
///
/// The identifier set only grows; the first record seen for an identifier is
/// the one kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<RawRecord>,
    ids: HashSet<String>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the identifier was not present before.
    pub fn insert(&mut self, record: RawRecord) -> bool {
        if self.ids.contains(record.id()) {
            return false;
        }
        self.ids.insert(record.id().to_string());
        self.records.push(record);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of distinct identifiers in `records` that this set has not seen.
    pub fn count_new(&self, records: &[RawRecord]) -> usize {
        records
            .iter()
            .filter(|record| !self.contains(record.id()))
            .map(RawRecord::id)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawRecord> {
        self.records.iter()
    }

    /// Records that carry full text and were written by `author_id`.
    ///
    /// The author check is best effort: it relies on the backend keeping its
    /// author field name stable, and exists to drop quoted or reposted content
    /// from other accounts that the page walk also picks up.
    pub fn into_authored_by(self, author_id: &str) -> Vec<RawRecord> {
        self.records
            .into_iter()
            .filter(|record| record.has_text() && record.author_id() == Some(author_id))
            .collect()
    }
}
