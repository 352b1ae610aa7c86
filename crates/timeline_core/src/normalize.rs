use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::{RawRecord, TEXT_FIELD};

/// Sensitivity flag of a post; `NoData` when the backend omitted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    Flagged(bool),
    NoData,
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sensitivity::Flagged(true) => write!(f, "true"),
            Sensitivity::Flagged(false) => write!(f, "false"),
            Sensitivity::NoData => write!(f, "No data"),
        }
    }
}

impl Serialize for Sensitivity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedPost {
    pub id: String,
    pub text: String,
    pub created_at: String,
    pub retweet_count: u64,
    pub favorite_count: u64,
    pub reply_count: u64,
    pub quote_count: u64,
    pub retweeted: bool,
    pub is_quote_status: bool,
    pub possibly_sensitive: Sensitivity,
    pub url: String,
    pub username: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("record {id} is missing required field `{field}`")]
pub struct MalformedRecordError {
    pub id: String,
    pub field: &'static str,
}

/// Projects raw records of one user into [`NormalizedPost`]s.
#[derive(Debug, Clone)]
pub struct Normalizer {
    site_base: String,
    username: String,
}

impl Normalizer {
    pub fn new(site_base: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            site_base: site_base.into().trim_end_matches('/').to_string(),
            username: username.into(),
        }
    }

    pub fn normalize(&self, record: &RawRecord) -> Result<NormalizedPost, MalformedRecordError> {
        let id = record.id().to_string();
        let possibly_sensitive = match record.get("possibly_sensitive").and_then(Value::as_bool) {
            Some(flag) => Sensitivity::Flagged(flag),
            None => Sensitivity::NoData,
        };

        Ok(NormalizedPost {
            text: string_field(record, TEXT_FIELD)?,
            created_at: string_field(record, "created_at")?,
            retweet_count: count_field(record, "retweet_count")?,
            favorite_count: count_field(record, "favorite_count")?,
            reply_count: count_field(record, "reply_count")?,
            quote_count: count_field(record, "quote_count")?,
            retweeted: flag_field(record, "retweeted")?,
            is_quote_status: flag_field(record, "is_quote_status")?,
            possibly_sensitive,
            url: format!("{}/{}/status/{}", self.site_base, self.username, id),
            username: self.username.clone(),
            id,
        })
    }
}

fn missing(record: &RawRecord, field: &'static str) -> MalformedRecordError {
    MalformedRecordError {
        id: record.id().to_string(),
        field,
    }
}

fn string_field(record: &RawRecord, field: &'static str) -> Result<String, MalformedRecordError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(record, field))
}

fn count_field(record: &RawRecord, field: &'static str) -> Result<u64, MalformedRecordError> {
    record
        .get(field)
        .and_then(Value::as_u64)
        .ok_or_else(|| missing(record, field))
}

fn flag_field(record: &RawRecord, field: &'static str) -> Result<bool, MalformedRecordError> {
    record
        .get(field)
        .and_then(Value::as_bool)
        .ok_or_else(|| missing(record, field))
}
