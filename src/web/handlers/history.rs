// POST /api/history — a user's most recent scans, newest first.
//
// Request: { "email": "...", "limit"?: n }  (limit capped at 10)
// A missing or unknown email yields an empty list, as does a storage error
// (logged); the dashboard treats "no history" and "history unavailable" alike.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::db::models::HistoryEntry;
use crate::db::HISTORY_PAGE_SIZE;
use crate::web::AppState;

#[derive(Deserialize, Default)]
pub struct HistoryRequest {
    pub email: Option<String>,
    pub limit: Option<u32>,
}

pub async fn get_history(
    State(state): State<AppState>,
    Json(body): Json<HistoryRequest>,
) -> Json<Vec<HistoryEntry>> {
    let Some(email) = body.email.filter(|e| !e.trim().is_empty()) else {
        return Json(Vec::new());
    };
    let limit = body.limit.unwrap_or(HISTORY_PAGE_SIZE);

    let user = match state.db.find_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Json(Vec::new()),
        Err(e) => {
            tracing::error!(error = %e, email = %email, "DB error resolving user");
            return Json(Vec::new());
        }
    };

    match state.db.fetch_history(user.id, limit).await {
        Ok(entries) => Json(entries),
        Err(e) => {
            tracing::error!(error = %e, email = %email, "DB error fetching history");
            Json(Vec::new())
        }
    }
}
