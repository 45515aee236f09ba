// Admin auth middleware — static bearer token for rule management.
//
// Only POST /api/rules/reload sits behind this. The token comes from
// VERICHECK_ADMIN_TOKEN; when it is unset the admin routes are closed.
//
// Auth check:
//   Authorization: Bearer <token> → constant-time compare → allow

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use super::AppState;

/// Axum middleware: reject requests without the admin bearer token.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.config.require_admin_token().is_err() {
        return super::api_error(StatusCode::FORBIDDEN, "Admin API disabled");
    }

    let provided = bearer_token(&request).unwrap_or("");
    if !constant_time_eq(provided, &state.config.admin_token) {
        return super::api_error(StatusCode::UNAUTHORIZED, "Authentication required");
    }

    next.run(request).await
}

/// Extract the token from an `Authorization: Bearer ...` header.
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
