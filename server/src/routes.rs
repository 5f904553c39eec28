use crate::AppState;
use crate::error::ServiceError;
use crate::store::PoolStore;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use pool_api::standings::{Standings, compute_standings};
use pool_api::wire::InsertedId;
use pool_api::{PredictionRecord, ResultRecord, Stored};

pub fn build_router<S: PoolStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/api/scores", get(scores::<S>))
        .route("/api/predictions", post(submit_prediction::<S>))
        .route("/api/results", post(submit_result::<S>))
        .route("/api/results/latest", get(latest_result::<S>))
        .with_state(state)
}

/// Recomputed from the stored documents on every request.
async fn scores<S: PoolStore>(State(state): State<AppState<S>>) -> Result<Json<Standings>, ServiceError> {
    let predictions: Vec<PredictionRecord> = state
        .store
        .find_all_predictions()
        .await
        .map_err(ServiceError::Scoring)?
        .into_iter()
        .map(|stored| stored.record)
        .collect();

    let current = if predictions.is_empty() {
        None
    } else {
        state.store.find_latest_result().await.map_err(ServiceError::Scoring)?
    };
    if let Some(result) = &current {
        info!("scoring {} predictions against result {}", predictions.len(), result.id);
    }

    let standings = compute_standings(&predictions, current.as_ref().map(|r| &r.record))?;
    Ok(Json(standings))
}

async fn submit_prediction<S: PoolStore>(
    State(state): State<AppState<S>>,
    Json(prediction): Json<PredictionRecord>,
) -> Result<(StatusCode, Json<InsertedId>), ServiceError> {
    let name = prediction.user.display_name().to_string();
    let id = state
        .store
        .insert_prediction(prediction)
        .await
        .map_err(|source| ServiceError::Persist { what: "prediction", source })?;
    info!("saved prediction {id} for {name}");
    Ok((StatusCode::CREATED, Json(InsertedId { id })))
}

async fn submit_result<S: PoolStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(result): Json<ResultRecord>,
) -> Result<(StatusCode, Json<InsertedId>), ServiceError> {
    authorize(state.admin_token.as_deref(), &headers)?;

    let unknown = result.rounds.unknown_keys();
    if !unknown.is_empty() {
        warn!("rejected result with unknown matchup keys: {}", unknown.join(", "));
        return Err(ServiceError::UnknownKeys(unknown));
    }

    let id = state
        .store
        .insert_result(result)
        .await
        .map_err(|source| ServiceError::Persist { what: "result", source })?;
    info!("saved result {id}");
    Ok((StatusCode::CREATED, Json(InsertedId { id })))
}

async fn latest_result<S: PoolStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Stored<ResultRecord>>, ServiceError> {
    let latest = state.store.find_latest_result().await.map_err(ServiceError::LoadResult)?;
    latest.map(Json).ok_or(ServiceError::NoResult)
}

/// Result posting is an operator action. With no token configured it is open.
fn authorize(expected: Option<&str>, headers: &HeaderMap) -> Result<(), ServiceError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);
    if presented == Some(expected) {
        Ok(())
    } else {
        warn!("result post rejected: missing or wrong admin token");
        Err(ServiceError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonlStore, MemoryStore, StoreError, StoreResult};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn app(store: Arc<MemoryStore>, admin_token: Option<&str>) -> Router {
        build_router(AppState { store, admin_token: admin_token.map(str::to_string) })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(request).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_req(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn bracket(name: &str, winner: &str, games: Value) -> Value {
        json!({
            "user": { "name": name, "email": format!("{name}@example.com") },
            "playInSelections": { "east": { "seven": "Heat", "eight": "Hawks" } },
            "rounds": { "firstRound": { "east-0": { "winner": winner, "games": games } } }
        })
    }

    #[tokio::test]
    async fn scores_are_empty_without_predictions() {
        let (status, json) = send(app(Arc::default(), None), get_req("/api/scores")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "scores": [], "standings": [] }));
    }

    #[tokio::test]
    async fn scores_report_missing_results_as_not_found() {
        let store = Arc::new(MemoryStore::new());
        for name in ["Ann", "Bo"] {
            let (status, _) = send(
                app(store.clone(), None),
                post_req("/api/predictions", bracket(name, "Celtics", json!(5)), None),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, json) = send(app(store, None), get_req("/api/scores")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "No results found");
    }

    #[tokio::test]
    async fn full_flow_ranks_users() {
        let store = Arc::new(MemoryStore::new());
        send(app(store.clone(), None), post_req("/api/predictions", bracket("Ann", "Celtics", json!(7)), None)).await;
        send(app(store.clone(), None), post_req("/api/predictions", bracket("Bo", "Celtics", json!("4-1")), None)).await;
        let result = json!({ "rounds": { "firstRound": { "east-0": { "winner": "Celtics", "games": 5 } } } });
        let (status, json) = send(app(store.clone(), None), post_req("/api/results", result, None)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(json["id"].is_string());

        let (status, json) = send(app(store, None), get_req("/api/scores")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["standings"], json!([{ "name": "Bo", "points": 2 }, { "name": "Ann", "points": 1 }]));
        assert_eq!(json["scores"][0]["user"], "Ann");
        assert_eq!(json["scores"][1]["details"]["firstRound"][0]["gamesMatch"], true);
    }

    #[tokio::test]
    async fn results_require_token_when_configured() {
        let store = Arc::new(MemoryStore::new());
        let result = json!({ "rounds": {} });

        let (status, json) = send(app(store.clone(), Some("s3cret")), post_req("/api/results", result.clone(), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Administrator credential required");

        let (status, _) = send(app(store.clone(), Some("s3cret")), post_req("/api/results", result.clone(), Some("nope"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(app(store, Some("s3cret")), post_req("/api/results", result, Some("s3cret"))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn results_with_unknown_keys_are_rejected() {
        let result = json!({ "rounds": { "semifinals": { "east-semi-7": { "winner": "Knicks" } } } });
        let (status, json) = send(app(Arc::default(), None), post_req("/api/results", result, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"], "semifinals/east-semi-7");
    }

    #[tokio::test]
    async fn latest_result_round_trips() {
        let store = Arc::new(MemoryStore::new());
        let (status, _) = send(app(store.clone(), None), get_req("/api/results/latest")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let result = json!({ "rounds": { "finals": { "finals": { "winner": "Celtics", "mvp": "J. Brown" } } } });
        send(app(store.clone(), None), post_req("/api/results", result, None)).await;
        let (status, json) = send(app(store, None), get_req("/api/results/latest")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rounds"]["finals"]["finals"]["mvp"], "J. Brown");
        assert!(json["createdAt"].is_string());
    }

    #[tokio::test]
    async fn file_store_flow_ignores_client_envelope_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let router = build_router(AppState::new(JsonlStore::open(tmp.path()).await.unwrap(), None));

        let mut ann = bracket("Ann", "Celtics", json!(5));
        ann["id"] = json!("client-side-id");
        ann["createdAt"] = json!("2020-01-01T00:00:00Z");
        ann["source"] = json!("kiosk");
        let (status, json) = send(router.clone(), post_req("/api/predictions", ann, None)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_ne!(json["id"], "client-side-id");

        let (status, _) =
            send(router.clone(), post_req("/api/predictions", bracket("Bo", "Knicks", json!("4-2")), None)).await;
        assert_eq!(status, StatusCode::CREATED);

        let result = json!({
            "id": "spoofed",
            "rounds": { "firstRound": { "east-0": { "winner": "Celtics", "games": "4-1" } } }
        });
        let (status, _) = send(router.clone(), post_req("/api/results", result, None)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, json) = send(router.clone(), get_req("/api/scores")).await;
        assert_eq!(status, StatusCode::OK, "body: {json}");
        assert_eq!(json["standings"], json!([{ "name": "Ann", "points": 2 }, { "name": "Bo", "points": 0 }]));

        let (_, json) = send(router, get_req("/api/results/latest")).await;
        assert_ne!(json["id"], "spoofed");

        let reopened = JsonlStore::open(tmp.path()).await.unwrap();
        let stored = reopened.find_all_predictions().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].record.extra["source"], "kiosk");
        assert!(!stored[0].record.extra.contains_key("id"));
    }

    struct BrokenStore;

    impl PoolStore for BrokenStore {
        async fn find_all_predictions(&self) -> StoreResult<Vec<Stored<PredictionRecord>>> {
            Err(StoreError::Io(std::io::Error::other("connection refused")))
        }

        async fn find_latest_result(&self) -> StoreResult<Option<Stored<ResultRecord>>> {
            Err(StoreError::Io(std::io::Error::other("connection refused")))
        }

        async fn insert_prediction(&self, _record: PredictionRecord) -> StoreResult<String> {
            Err(StoreError::Io(std::io::Error::other("write rejected")))
        }

        async fn insert_result(&self, _record: ResultRecord) -> StoreResult<String> {
            Err(StoreError::Io(std::io::Error::other("write rejected")))
        }
    }

    #[tokio::test]
    async fn store_failures_surface_as_server_errors() {
        let broken = || build_router(AppState { store: Arc::new(BrokenStore), admin_token: None });

        let (status, json) = send(broken(), get_req("/api/scores")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to calculate scores");
        assert_eq!(json["details"], "io error: connection refused");

        let (status, json) = send(broken(), post_req("/api/predictions", bracket("Ann", "Celtics", json!(5)), None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to save prediction");
    }
}
