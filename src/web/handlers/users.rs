// POST /api/users — register a user that scans can be attributed to.
//
// Request: { "name": "...", "email": "..." }
// 201 on success, 400 when a field is missing, 409 when the email exists.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::db::models::EmailTaken;
use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Response {
    let name = body.name.trim();
    let email = body.email.trim();
    if name.is_empty() || email.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "Missing fields");
    }

    // The unique index decides duplicates, so concurrent registrations of
    // one address still end in exactly one 201.
    match state.db.create_user(name, email).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "message": "User created", "id": user.id })),
        )
            .into_response(),
        Err(e) if e.downcast_ref::<EmailTaken>().is_some() => {
            api_error(StatusCode::CONFLICT, "Email already registered")
        }
        Err(e) => {
            tracing::error!(error = %e, "DB error creating user");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}
