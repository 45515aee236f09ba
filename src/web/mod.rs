// Web server — Axum JSON API in front of the scoring engine.
//
// Scoring requests are answered from the in-memory rule table; history is
// written afterwards on a detached task so the database never sits on the
// request path of /api/analyze.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::db::Database;
use crate::scoring::SharedRules;

pub mod auth;
pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub rules: Arc<SharedRules>,
    pub config: Arc<Config>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(
    config: Config,
    db: Arc<dyn Database>,
    rules: Arc<SharedRules>,
    port: u16,
    bind: &str,
) -> Result<()> {
    let state = AppState {
        db,
        rules,
        config: Arc::new(config),
    };

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("VeriCheck API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    // Admin routes (require the bearer token)
    let admin_api = Router::new()
        .route("/api/rules/reload", post(handlers::rules::reload_rules))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let public_api = Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(handlers::analyze::analyze))
        .route("/api/history", post(handlers::history::get_history))
        .route("/api/users", post(handlers::users::register))
        .route("/api/rules", get(handlers::rules::get_rules));

    Router::new()
        .merge(admin_api)
        .merge(public_api)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe — always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::db::sqlite::SqliteDatabase;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            db: Arc::new(SqliteDatabase::in_memory().unwrap()),
            rules: Arc::new(SharedRules::default()),
            config: Arc::new(Config {
                admin_token: "letmein".to_string(),
                ..Config::default()
            }),
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn analyze_returns_full_result_shape() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(post_json(
                "/api/analyze",
                json!({ "type": "url", "data": "http://randomsite.biz" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["verdict"], "Suspicious");
        assert_eq!(body["score"], 60);
        assert_eq!(body["breakdown"], json!({ "language": 100, "source": 0, "risk": 0 }));
        assert_eq!(body["flags"], json!([]));
        assert_eq!(body["source_type"], "Insecure (HTTP)");
        assert!(body["explanation"].as_str().unwrap().contains("HTTP"));
    }

    #[tokio::test]
    async fn analyze_non_string_data_is_passthrough() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(post_json("/api/analyze", json!({ "type": "text", "data": 42 })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["score"], 100);
        assert_eq!(body["source_type"], "Unknown");
    }

    #[tokio::test]
    async fn analyze_non_string_type_is_passthrough() {
        for body in [
            json!({ "type": 5, "data": "http://randomsite.biz" }),
            json!({ "type": ["url"], "data": "http://randomsite.biz" }),
        ] {
            let resp = build_router(test_state())
                .oneshot(post_json("/api/analyze", body))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);

            let body = body_json(resp).await;
            assert_eq!(body["score"], 100);
            assert_eq!(body["verdict"], "Safe");
            assert_eq!(body["source_type"], "Unknown");
            assert_eq!(body["explanation"], "Analysis complete.");
        }
    }

    #[tokio::test]
    async fn analyze_non_string_email_still_scores() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(post_json(
                "/api/analyze",
                json!({ "type": "text", "data": "hi", "email": 42 }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["score"], 90);
        assert_eq!(body["breakdown"]["language"], 30);
    }

    #[tokio::test]
    async fn analyze_with_unknown_email_still_scores() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(post_json(
                "/api/analyze",
                json!({ "type": "text", "data": "hi", "email": "ghost@example.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["score"], 90);
    }

    #[tokio::test]
    async fn analyze_records_history_for_known_user() {
        let state = test_state();
        state.db.create_user("Ana", "ana@example.com").await.unwrap();
        let app = build_router(state.clone());

        let resp = app
            .clone()
            .oneshot(post_json(
                "/api/analyze",
                json!({ "type": "job", "data": "No experience needed, easy money from home!", "email": "ana@example.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        // The write happens on a detached task; give it a moment.
        let mut entries = Value::Null;
        for _ in 0..50 {
            let resp = app
                .clone()
                .oneshot(post_json("/api/history", json!({ "email": "ana@example.com" })))
                .await
                .unwrap();
            entries = body_json(resp).await;
            if entries.as_array().is_some_and(|a| !a.is_empty()) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        let entries = entries.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["type"], "job");
        assert_eq!(entries[0]["verdict"], "Suspicious");
        assert_eq!(entries[0]["score"], 50);
    }

    #[tokio::test]
    async fn history_for_unknown_email_is_empty() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(post_json("/api/history", json!({ "email": "nobody@example.com" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!([]));
    }

    #[tokio::test]
    async fn register_then_duplicate_conflicts() {
        let app = build_router(test_state());
        let body = json!({ "name": "Ana", "email": "ana@example.com" });

        let resp = app
            .clone()
            .oneshot(post_json("/api/users", body.clone()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app.oneshot(post_json("/api/users", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn concurrent_duplicate_registrations_conflict() {
        let app = build_router(test_state());
        let body = json!({ "name": "Ana", "email": "ana@example.com" });

        let attempts = (0..4).map(|_| {
            let app = app.clone();
            let body = body.clone();
            tokio::spawn(async move {
                app.oneshot(post_json("/api/users", body))
                    .await
                    .unwrap()
                    .status()
            })
        });
        let mut statuses = Vec::new();
        for attempt in attempts.collect::<Vec<_>>() {
            statuses.push(attempt.await.unwrap());
        }

        let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
        let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
        assert_eq!(created, 1);
        assert_eq!(conflicts, 3);
    }

    #[tokio::test]
    async fn register_missing_fields_rejected() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(post_json("/api/users", json!({ "email": "ana@example.com" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rules_listing() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::get("/api/rules").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["trusted_domains"][0], "bbc.com");
        assert_eq!(body["suspicious_keywords"][0], "easy money");
    }

    #[tokio::test]
    async fn reload_requires_token() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::post("/api/rules/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn reload_without_rule_file_keeps_rules() {
        let state = test_state();
        let app = build_router(state.clone());
        let resp = app
            .oneshot(
                Request::post("/api/rules/reload")
                    .header(header::AUTHORIZATION, "Bearer letmein")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(*state.rules.current(), crate::scoring::RuleSet::default());
    }

    #[tokio::test]
    async fn reload_swaps_in_rule_file() {
        let path = std::env::temp_dir().join(format!(
            "vericheck-reload-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{"trusted_domains": ["example.org"], "suspicious_keywords": ["gift card"]}"#,
        )
        .unwrap();

        let mut state = test_state();
        state.config = Arc::new(Config {
            rules_path: Some(path.clone()),
            admin_token: "letmein".to_string(),
            ..Config::default()
        });
        let app = build_router(state.clone());

        let resp = app
            .clone()
            .oneshot(
                Request::post("/api/rules/reload")
                    .header(header::AUTHORIZATION, "Bearer letmein")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.rules.current().suspicious_keywords(), ["gift card"]);

        let resp = app
            .oneshot(post_json(
                "/api/analyze",
                json!({ "type": "text", "data": "Pay the fee with a Gift Card today" }),
            ))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["flags"], json!(["gift card"]));
        assert_eq!(body["score"], 75);

        let _ = std::fs::remove_file(&path);
    }
}
