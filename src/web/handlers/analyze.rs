// POST /api/analyze — score a URL, message or job posting.
//
// Response: the ScoreResult as JSON. Never fails on content; see
// scoring::wire for how odd input is decoded. When an email is given the
// scan is saved on a detached task after the result is computed.

use axum::extract::State;
use axum::Json;

use crate::history::spawn_record;
use crate::scoring::wire::ScanRequest;
use crate::scoring::{evaluate, ScoreResult};
use crate::web::AppState;

pub async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<ScanRequest>,
) -> Json<ScoreResult> {
    let (input, email) = body.into_parts();

    let rules = state.rules.current();
    let result = evaluate(&input, &rules);

    tracing::debug!(
        content_type = %input.content_type,
        score = result.score,
        verdict = %result.verdict,
        "Scored content"
    );

    if let Some(email) = email {
        spawn_record(state.db.clone(), email, input, result.clone());
    }

    Json(result)
}
