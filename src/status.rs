// System status display — DB stats, verdict distribution, active rule table.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::db::Database;
use crate::scoring::RuleSet;

/// Display system status to the terminal.
pub async fn show(
    db: &Arc<dyn Database>,
    db_path: &str,
    rules: &RuleSet,
    rules_origin: &str,
) -> Result<()> {
    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_path, file_size);

    let stats = db.scan_stats().await?;
    println!("Users: {}", stats.users);
    if stats.scans == 0 {
        println!("Scans: none recorded yet");
        println!("  Run `vericheck analyze --email <you>` to record one");
    } else {
        println!(
            "Scans: {} total ({} safe, {} suspicious, {} high risk)",
            stats.scans, stats.safe, stats.suspicious, stats.high_risk
        );
    }

    println!(
        "Rules: {} trusted domains, {} suspicious keywords ({})",
        rules.trusted_domains().len(),
        rules.suspicious_keywords().len(),
        rules_origin
    );

    Ok(())
}

/// Whether `vericheck init` has been run for this database path.
pub fn is_initialized(db_path: &str) -> bool {
    Path::new(db_path).exists()
}

/// Status line for an uninitialized install.
pub fn show_uninitialized(db_path: &str) {
    println!("Database: not initialized ({db_path})");
    println!("\nRun `vericheck init` to set up the database.");
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
