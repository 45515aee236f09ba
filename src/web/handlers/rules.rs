// Rule table handlers.
//
// GET  /api/rules        — the active rule table
// POST /api/rules/reload — re-read VERICHECK_RULES_PATH and swap it in (admin)
//
// A failed reload leaves the previous table in place.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info};

use crate::scoring::RuleSet;
use crate::web::{api_error, AppState};

pub async fn get_rules(State(state): State<AppState>) -> impl IntoResponse {
    let rules = state.rules.current();
    Json(serde_json::json!({
        "trusted_domains": rules.trusted_domains(),
        "suspicious_keywords": rules.suspicious_keywords(),
    }))
}

pub async fn reload_rules(State(state): State<AppState>) -> Response {
    let path = match state.config.require_rules_path() {
        Ok(path) => path.clone(),
        Err(e) => return api_error(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let loaded = tokio::task::spawn_blocking(move || RuleSet::from_json_file(&path)).await;
    let rules = match loaded {
        Ok(Ok(rules)) => rules,
        Ok(Err(e)) => {
            let reason = format!("{e:#}");
            error!(error = %reason, "Rule reload failed, keeping current rules");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load rule file");
        }
        Err(e) => {
            error!(error = %e, "Rule reload task failed");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load rule file");
        }
    };

    let domains = rules.trusted_domains().len();
    let keywords = rules.suspicious_keywords().len();
    state.rules.replace(rules);
    info!(domains, keywords, "Rule table reloaded");

    Json(serde_json::json!({
        "message": "Rules reloaded",
        "trusted_domains": domains,
        "suspicious_keywords": keywords,
    }))
    .into_response()
}
