//! Axum HTTP API for the guessing game.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check with the live session count |
//! | POST | `/api/simulate-battle` | Simulate a matchup and open a battle session |
//! | POST | `/api/submit-guess` | Score a win-rate guess against a session |

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

use crate::error::{EngineError, ErrorKind};
use crate::scoring::ScoreResult;
use crate::service::{BattleService, GuessRequest, SimulateRequest, SimulateResponse};

pub type AppState = Arc<BattleService>;

pub fn create_router(service: Arc<BattleService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/api/simulate-battle", post(handle_simulate_battle))
        .route("/api/submit-guess", post(handle_submit_guess))
        .layer(cors)
        .with_state(service)
}

/// Engine error rendered as `{ "error": <kind>, "message": <text> }`.
#[derive(Debug)]
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::UnknownCreature | ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::NoLegalMoves => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InvalidOptions | ErrorKind::InvalidGuess => StatusCode::BAD_REQUEST,
        ErrorKind::SimulationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        if status.is_server_error() {
            error!(kind = kind.as_str(), error = %self.0, "request failed");
        } else {
            warn!(kind = kind.as_str(), error = %self.0, "request rejected");
        }
        let body = serde_json::json!({
            "error": kind.as_str(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

async fn handle_health_check(State(service): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "activeSessions": service.store().len(),
    }))
}

async fn handle_simulate_battle(
    State(service): State<AppState>,
    payload: Result<Json<SimulateRequest>, JsonRejection>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| EngineError::InvalidOptions(rejection.body_text()))?;
    let response = service.simulate_battle(&request).await?;
    Ok(Json(response))
}

async fn handle_submit_guess(
    State(service): State<AppState>,
    payload: Result<Json<GuessRequest>, JsonRejection>,
) -> Result<Json<ScoreResult>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| EngineError::InvalidGuess(rejection.body_text()))?;
    let result = service.submit_guess(&request.battle_id, request.guessed_win_rate)?;
    Ok(Json(result))
}
