// Database trait — backend-agnostic async interface for history storage.
//
// Implementor: SqliteDatabase (wraps rusqlite behind a tokio Mutex).
// All methods are async so a native async backend could slot in behind
// the same interface without touching callers.
//
// The trait mirrors the free functions in queries.rs, which stay usable
// against a bare Connection in tests.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{HistoryEntry, NewScan, ScanStats, User};

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Users ---

    /// Register a user. Fails if the email is already taken.
    async fn create_user(&self, full_name: &str, email: &str) -> Result<User>;

    /// Look up a user by email (case-insensitive).
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    // --- Scan history ---

    /// Append a scan to a user's history and return its row ID.
    async fn persist_scan(&self, user_id: i64, scan: &NewScan) -> Result<i64>;

    /// Most recent scans for a user, newest first. `limit` is capped at
    /// HISTORY_PAGE_SIZE.
    async fn fetch_history(&self, user_id: i64, limit: u32) -> Result<Vec<HistoryEntry>>;

    /// User and scan counts, with scans split by verdict.
    async fn scan_stats(&self) -> Result<ScanStats>;
}
