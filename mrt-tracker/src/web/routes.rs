//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use futures::future::join_all;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::network::{LineId, NetworkError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/status", get(status))
        .route("/v1/position", get(positions))
        .route("/v1/position/:line", get(line_position))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: state.version.to_string(),
    })
}

/// Every line's positions, or the packed board frame when `format` names
/// the board layout.
async fn positions(State(state): State<AppState>, Query(query): Query<PositionQuery>) -> Response {
    if query.format.as_deref() == Some(&*state.board_format) {
        let board = state.cache.read_board().await;
        return Json(BoardResult::from(board)).into_response();
    }

    let snapshots = join_all(LineId::ALL.map(|id| state.cache.read_line(id))).await;
    let lines: Vec<LineResult> = LineId::ALL
        .into_iter()
        .zip(snapshots)
        .map(|(id, snapshot)| LineResult::from_snapshot(id, snapshot))
        .collect();
    Json(lines).into_response()
}

async fn line_position(
    State(state): State<AppState>,
    Path(line): Path<String>,
) -> Result<Json<LineResult>, AppError> {
    let id: LineId = line.parse()?;
    let snapshot = state.cache.read_line(id).await;
    Ok(Json(LineResult::from_snapshot(id, snapshot)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound { message: String },
}

impl From<NetworkError> for AppError {
    fn from(e: NetworkError) -> Self {
        AppError::NotFound {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use crate::board::PackedFrame;
    use crate::cache::PositionCache;
    use crate::model::Position;
    use crate::network::Network;

    async fn serve(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn state() -> AppState {
        let network = Network::singapore().unwrap();
        AppState::new(Arc::new(PositionCache::new(&network)), "dev_v1", "abc123")
    }

    #[tokio::test]
    async fn health_and_status() {
        let base = serve(state()).await;

        let health = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(health.text().await.unwrap(), "ok");

        let status: StatusResponse = reqwest::get(format!("{base}/v1/status"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status.version, "abc123");
    }

    #[tokio::test]
    async fn default_listing_covers_every_line_in_order() {
        let state = state();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        state
            .cache
            .publish_line(LineId::Cg2, "__*_*".parse::<Position>().unwrap(), at)
            .await
            .unwrap();
        let base = serve(state).await;

        // Unknown formats fall back to the listing.
        for url in [format!("{base}/v1/position"), format!("{base}/v1/position?format=v9")] {
            let lines: Vec<LineResult> = reqwest::get(url).await.unwrap().json().await.unwrap();

            let names: Vec<_> = lines.iter().map(|l| l.line.as_str()).collect();
            assert_eq!(names, ["ns1", "ns2", "ew1", "ew2", "cg1", "cg2"]);
            assert_eq!(lines[0].positions.len(), 53);
            assert_eq!(lines[0].last_updated, 0);
            assert_eq!(lines[5].positions, "__*_*");
            assert_eq!(lines[5].last_updated, 1_709_281_800_000);
        }
    }

    #[tokio::test]
    async fn board_format() {
        let state = state();
        state.cache.publish_board(PackedFrame::default(), Utc::now()).await;
        let base = serve(state).await;

        let response = reqwest::get(format!("{base}/v1/position?format=dev_v1"))
            .await
            .unwrap();
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "application/json"
        );

        let board: BoardResult = response.json().await.unwrap();
        assert_eq!(board.data, vec!["0".repeat(32); 3]);
        assert!(board.last_updated > 0);
    }

    #[tokio::test]
    async fn single_line() {
        let base = serve(state()).await;

        let line: LineResult = reqwest::get(format!("{base}/v1/position/ew2"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(line.line, "ew2");
        assert_eq!(line.positions.len(), 65);

        let missing = reqwest::get(format!("{base}/v1/position/dt1")).await.unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
        let body: serde_json::Value = missing.json().await.unwrap();
        assert_eq!(body["error"], "unknown line: dt1");
    }
}
