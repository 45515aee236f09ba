// Data models — Rust structs that map to database rows.
//
// These are the types that flow between the history recorder, the web
// handlers and the storage backend. They're separate from the database
// queries so other modules can use them without depending on rusqlite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::Verdict;

/// Timestamp layout stored in the `scans.scanned_at` column.
/// Fixed-width so lexical order matches chronological order.
pub const SCANNED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A registered user that scans can be attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub created_at: String,
}

/// Returned (inside `anyhow::Error`) when registering an email that already
/// belongs to a user. Callers `downcast_ref` it to answer 409.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTaken {
    pub email: String,
}

impl std::fmt::Display for EmailTaken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Email already registered: {}", self.email)
    }
}

impl std::error::Error for EmailTaken {}

/// A scan ready to be written, built from a finished ScoreResult.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScan {
    pub content_type: String,
    /// At most 500 characters of the scored content
    pub content_snippet: String,
    pub verdict: Verdict,
    pub trust_score: u8,
    /// Explanation, plus " | Flags: ..." when keywords matched
    pub details: String,
    pub scanned_at: DateTime<Utc>,
}

/// One row of a user's scan history, in its wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub content_type: String,
    pub snippet: String,
    pub verdict: String,
    pub score: u8,
    /// `YYYY-MM-DD HH:MM`
    pub date: String,
}

/// Aggregate counts for `vericheck status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub users: i64,
    pub scans: i64,
    pub safe: i64,
    pub suspicious: i64,
    pub high_risk: i64,
}
