// Commits API response types.
// Defines the commit record served by the commits JSON endpoint.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;

/// One entry of a repository's history as served by the commits endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    pub author: String,
    pub message: String,
    /// Unix timestamp in seconds.
    pub date: i64,
}

impl Commit {
    /// Commit time as a UTC datetime, if the timestamp is in range.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date, 0)
    }
}

/// Parse a raw response body into the commit sequence, preserving source order.
pub fn parse_commits(body: &[u8]) -> Result<Vec<Commit>> {
    let commits: Vec<Commit> = serde_json::from_slice(body)?;
    Ok(commits)
}
