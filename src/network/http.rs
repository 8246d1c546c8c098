//! HTTP API
//!
//! Axum router serving the round-state API consumed by the browser front end.
//! Every handler validates the request shape, calls exactly one engine
//! operation and serializes the returned public snapshot; engine errors map
//! to `400 {"error": ...}` and unknown paths to `404 {"error": "not found"}`.
//! CORS is permissive (the miniapp is served from a different origin).

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::game::{EngineError, PublicRound, RoundEngine};
use crate::network::protocol::{ErrorBody, JoinRequest};
use crate::DEFAULT_STAKE;

/// Shared state for all handlers. Cloned per request; cheap via `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The one engine instance, shared with the bot surface.
    pub engine: Arc<RoundEngine>,
}

/// Build the API router.
pub fn create_router(engine: Arc<RoundEngine>) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/join", post(post_join))
        .route("/api/lock", post(post_lock))
        .route("/api/roll", post(post_roll))
        .route("/api/reset", post(post_reset))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(AppState { engine })
}

type ApiResult = Result<Json<PublicRound>, (StatusCode, Json<ErrorBody>)>;

fn bad_request(err: EngineError) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(err)))
}

/// `GET /api/state`
async fn get_state(State(state): State<AppState>) -> Json<PublicRound> {
    Json(state.engine.snapshot().await)
}

/// `POST /api/join`
///
/// The body is optional and loosely shaped; missing fields fall back to
/// defaults, a missing or non-positive `user_id` is rejected by the engine.
async fn post_join(State(state): State<AppState>, body: Option<Json<JoinRequest>>) -> ApiResult {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let user_id = req.user_id.unwrap_or(0);
    let username = req
        .username
        .unwrap_or_else(|| format!("user_{user_id}"));
    let stake = req.stake.unwrap_or(DEFAULT_STAKE);

    state
        .engine
        .join(user_id, username, stake)
        .await
        .map(Json)
        .map_err(bad_request)
}

/// `POST /api/lock`
async fn post_lock(State(state): State<AppState>) -> ApiResult {
    state.engine.lock().await.map(Json).map_err(bad_request)
}

/// `POST /api/roll`
async fn post_roll(State(state): State<AppState>) -> ApiResult {
    state.engine.roll().await.map(Json).map_err(bad_request)
}

/// `POST /api/reset`
async fn post_reset(State(state): State<AppState>) -> ApiResult {
    state.engine.reset().await.map(Json).map_err(bad_request)
}

/// Any unrouted path.
async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("not found")))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        create_router(Arc::new(RoundEngine::new()))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_state_returns_public_snapshot() {
        let response = test_router()
            .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["round_id"], 1);
        assert_eq!(json["status"], "collecting");
        assert_eq!(json["commit"], serde_json::Value::Null);
        assert_eq!(json["reveal"], serde_json::Value::Null);
        assert_eq!(json["pot"], 0.0);
    }

    #[tokio::test]
    async fn test_join_with_stake_and_defaults() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(post_json("/api/join", r#"{"user_id": 7, "stake": 60}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["players"][0]["id"], 7);
        assert_eq!(json["players"][0]["username"], "user_7");
        assert_eq!(json["players"][0]["dice"], "D12");
        assert_eq!(json["pot"], 60.0);
    }

    #[tokio::test]
    async fn test_join_rejects_missing_user_id() {
        let response = test_router()
            .oneshot(post_json("/api/join", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "user_id required");
    }

    #[tokio::test]
    async fn test_join_rejects_non_positive_stake() {
        let response = test_router()
            .oneshot(post_json("/api/join", r#"{"user_id": 7, "stake": -1}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "stake must be positive");
    }

    #[tokio::test]
    async fn test_lock_requires_two_players() {
        let router = test_router();
        router
            .clone()
            .oneshot(post_json("/api/join", r#"{"user_id": 1}"#))
            .await
            .unwrap();

        let response = router
            .oneshot(post_json("/api/lock", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "need at least 2 players");
    }

    #[tokio::test]
    async fn test_roll_while_collecting_fails() {
        let response = test_router()
            .oneshot(post_json("/api/roll", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "not ready for rolling");
    }

    #[tokio::test]
    async fn test_full_round_over_http() {
        let router = test_router();
        for (id, stake) in [(101, 5.0), (202, 60.0)] {
            let body = format!(r#"{{"user_id": {id}, "stake": {stake}}}"#);
            let response = router
                .clone()
                .oneshot(post_json("/api/join", &body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = router
            .clone()
            .oneshot(post_json("/api/lock", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "locking");
        assert!(json["commit"].is_string());
        assert_eq!(json["reveal"], serde_json::Value::Null);

        let response = router
            .clone()
            .oneshot(post_json("/api/roll", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["reveal"].is_string());
        assert_eq!(json["rolls"].as_object().unwrap().len(), 2);

        let response = router
            .oneshot(post_json("/api/reset", ""))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["round_id"], 2);
        assert_eq!(json["status"], "collecting");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = test_router()
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "not found");
    }
}
