// SqliteDatabase — rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{HistoryEntry, NewScan, ScanStats, User};
use super::traits::Database;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Fresh in-memory database with the schema applied.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        super::schema::create_tables(&conn)?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn create_user(&self, full_name: &str, email: &str) -> Result<User> {
        let conn = self.conn.lock().await;
        super::queries::create_user(&conn, full_name, email)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().await;
        super::queries::find_user_by_email(&conn, email)
    }

    async fn persist_scan(&self, user_id: i64, scan: &NewScan) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::insert_scan(&conn, user_id, scan)
    }

    async fn fetch_history(&self, user_id: i64, limit: u32) -> Result<Vec<HistoryEntry>> {
        let conn = self.conn.lock().await;
        super::queries::get_history(&conn, user_id, limit)
    }

    async fn scan_stats(&self) -> Result<ScanStats> {
        let conn = self.conn.lock().await;
        super::queries::get_scan_stats(&conn)
    }
}
