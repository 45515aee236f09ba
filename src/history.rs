// Scan history recording — the best-effort step that runs after scoring.
//
// The score is already computed and handed back before anything here runs.
// Every failure (unknown email, locked database, constraint error) is logged
// and swallowed so storage problems can never change what the caller sees.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::db::models::NewScan;
use crate::db::{Database, SNIPPET_MAX_CHARS};
use crate::scoring::{ScoreInput, ScoreResult};

/// Build the stored form of a finished evaluation.
///
/// The snippet is cut at a character boundary, never mid-codepoint.
pub fn build_scan(input: &ScoreInput, result: &ScoreResult, at: DateTime<Utc>) -> NewScan {
    NewScan {
        content_type: input.content_type.as_str().to_string(),
        content_snippet: input.content.chars().take(SNIPPET_MAX_CHARS).collect(),
        verdict: result.verdict,
        trust_score: result.score,
        details: details_for(result),
        scanned_at: at,
    }
}

/// Explanation, with matched flags appended when there are any.
pub fn details_for(result: &ScoreResult) -> String {
    if result.flags.is_empty() {
        result.explanation.clone()
    } else {
        format!("{} | Flags: {}", result.explanation, result.flags.join(", "))
    }
}

/// Attribute a scan to the user owning `email`.
///
/// Returns `true` if a row was written. Unknown emails and storage errors
/// return `false` after logging.
pub async fn record_scan(
    db: &dyn Database,
    email: &str,
    input: &ScoreInput,
    result: &ScoreResult,
) -> bool {
    let user = match db.find_user_by_email(email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!(email = %email, "No user for email, scan not recorded");
            return false;
        }
        Err(e) => {
            warn!(error = %e, email = %email, "User lookup failed, scan not recorded");
            return false;
        }
    };

    let scan = build_scan(input, result, Utc::now());
    match db.persist_scan(user.id, &scan).await {
        Ok(id) => {
            info!(scan_id = id, email = %email, verdict = %result.verdict, "Saved scan");
            true
        }
        Err(e) => {
            warn!(error = %e, email = %email, "Failed to save scan");
            false
        }
    }
}

/// Record a batch of scans for one user, in slice order.
///
/// Every row shares one timestamp and rows are inserted one after another,
/// so newest-first history lists the batch in reverse input order. Returns
/// the number of rows written; failures are logged and skipped.
pub async fn record_batch(
    db: &dyn Database,
    email: &str,
    scans: &[(ScoreInput, ScoreResult)],
) -> usize {
    let user = match db.find_user_by_email(email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(email = %email, "No user for email, batch not recorded");
            return 0;
        }
        Err(e) => {
            warn!(error = %e, email = %email, "User lookup failed, batch not recorded");
            return 0;
        }
    };

    let user_id = user.id;
    let at = Utc::now();
    stream::iter(scans)
        .then(move |(input, result)| {
            let scan = build_scan(input, result, at);
            async move { db.persist_scan(user_id, &scan).await }
        })
        .filter_map(|saved| async move {
            match saved {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "Failed to save scan");
                    None
                }
            }
        })
        .count()
        .await
}

/// Fire-and-forget variant of [`record_scan`] on a detached tokio task.
pub fn spawn_record(db: Arc<dyn Database>, email: String, input: ScoreInput, result: ScoreResult) {
    tokio::spawn(async move {
        record_scan(db.as_ref(), &email, &input, &result).await;
    });
}
