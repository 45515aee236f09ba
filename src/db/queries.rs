// Database queries — typed functions for reading and writing data.
//
// Each function takes a &Connection and returns typed results.
// No raw SQL leaks outside this module.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{EmailTaken, HistoryEntry, NewScan, ScanStats, User, SCANNED_AT_FORMAT};
use super::HISTORY_PAGE_SIZE;

// --- Users ---

/// Insert a new user. The email column is unique (case-insensitive), so a
/// second registration for the same address fails with [`EmailTaken`].
pub fn create_user(conn: &Connection, full_name: &str, email: &str) -> Result<User> {
    match conn.execute(
        "INSERT INTO users (full_name, email) VALUES (?1, ?2)",
        params![full_name, email],
    ) {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            return Err(EmailTaken {
                email: email.to_string(),
            }
            .into());
        }
        Err(e) => {
            return Err(anyhow::Error::new(e).context(format!("Failed to register {email}")));
        }
    }

    let id = conn.last_insert_rowid();
    let user = conn.query_row(
        "SELECT id, full_name, email, created_at FROM users WHERE id = ?1",
        params![id],
        row_to_user,
    )?;
    Ok(user)
}

/// Find a user by email, ignoring case.
pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let mut stmt =
        conn.prepare("SELECT id, full_name, email, created_at FROM users WHERE email = ?1")?;
    let result = stmt.query_row(params![email], row_to_user).optional()?;
    Ok(result)
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

// --- Scans ---

/// Append a scan to a user's history.
pub fn insert_scan(conn: &Connection, user_id: i64, scan: &NewScan) -> Result<i64> {
    conn.execute(
        "INSERT INTO scans
            (user_id, content_type, content_snippet, verdict, trust_score, details, scanned_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user_id,
            scan.content_type,
            scan.content_snippet,
            scan.verdict.as_str(),
            scan.trust_score,
            scan.details,
            scan.scanned_at.format(SCANNED_AT_FORMAT).to_string(),
        ],
    )
    .with_context(|| format!("Failed to save scan for user {user_id}"))?;
    Ok(conn.last_insert_rowid())
}

/// Most recent scans for a user, newest first.
///
/// Rows written in the same second keep insertion order via the id
/// tie-break.
pub fn get_history(conn: &Connection, user_id: i64, limit: u32) -> Result<Vec<HistoryEntry>> {
    let limit = limit.min(HISTORY_PAGE_SIZE);
    let mut stmt = conn.prepare(
        "SELECT content_type, content_snippet, verdict, trust_score,
                strftime('%Y-%m-%d %H:%M', scanned_at)
         FROM scans
         WHERE user_id = ?1
         ORDER BY scanned_at DESC, id DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![user_id, limit], |row| {
        Ok(HistoryEntry {
            content_type: row.get(0)?,
            snippet: row.get(1)?,
            verdict: row.get(2)?,
            score: row.get(3)?,
            date: row.get(4)?,
        })
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

/// User and scan totals, with scans split by verdict.
pub fn get_scan_stats(conn: &Connection) -> Result<ScanStats> {
    let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;

    let mut stats = ScanStats {
        users,
        ..ScanStats::default()
    };

    let mut stmt = conn.prepare("SELECT verdict, COUNT(*) FROM scans GROUP BY verdict")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    for row in rows {
        let (verdict, count) = row?;
        stats.scans += count;
        match verdict.as_str() {
            "Safe" => stats.safe += count,
            "Suspicious" => stats.suspicious += count,
            "High Risk" => stats.high_risk += count,
            _ => {}
        }
    }
    Ok(stats)
}
