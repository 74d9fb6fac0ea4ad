//! HTTP API endpoints.
//!
//! Thin JSON wrappers around `AppState`; clients poll `GET /api/rooms/{id}`
//! for the current snapshot.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::error::GameError;
use crate::protocol::*;
use crate::state::{AppState, ConfirmOutcome, RoomRoster, RoomSnapshot};
use crate::types::{Clue, RoundResult, Vote};

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match &self {
            GameError::RoomNotFound(_) | GameError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            GameError::PhaseViolation(_)
            | GameError::EliminatedPlayer(_)
            | GameError::CapacityExceeded { .. }
            | GameError::DuplicateVote(_) => StatusCode::CONFLICT,
            GameError::Unauthorized(_) => StatusCode::FORBIDDEN,
            GameError::MalformedInput(_) => StatusCode::BAD_REQUEST,
        };
        tracing::debug!(code = self.code(), "Request rejected: {}", self);
        let body = ErrorBody {
            code: self.code().to_string(),
            msg: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, GameError>;

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/rooms", post(create_room))
        .route("/api/rooms/{room_id}", get(get_state))
        .route("/api/rooms/{room_id}/join", post(join_room))
        .route("/api/rooms/{room_id}/clues", post(submit_clue))
        .route("/api/rooms/{room_id}/votes", post(submit_vote))
        .route("/api/rooms/{room_id}/confirm", post(confirm))
        .route("/api/rooms/{room_id}/force", post(force))
        .route("/api/rooms/{room_id}/vote-phase", post(request_vote_phase))
        .route("/api/rooms/{room_id}/results", post(compute_and_reveal_results))
        .with_state(state)
}

/// POST /api/rooms
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomRoster>), GameError> {
    let roster = state.create_room(&req.names).await?;
    Ok((StatusCode::CREATED, Json(roster)))
}

/// POST /api/rooms/{room_id}/join
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(req): Json<JoinRequest>,
) -> ApiResult<JoinResponse> {
    let (player, roster) = state.join_room(&room_id, &req.name).await?;
    Ok(Json(JoinResponse::new(player, roster)))
}

/// GET /api/rooms/{room_id}?player_id=
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> ApiResult<RoomSnapshot> {
    let snapshot = state
        .get_state(&room_id, query.player_id.as_deref())
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/rooms/{room_id}/clues
pub async fn submit_clue(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(req): Json<ClueRequest>,
) -> ApiResult<Clue> {
    let clue = state.submit_clue(&room_id, &req.player_id, &req.text).await?;
    Ok(Json(clue))
}

/// POST /api/rooms/{room_id}/votes
pub async fn submit_vote(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> ApiResult<Vote> {
    let vote = state
        .submit_vote(&room_id, &req.voter_id, &req.target_id)
        .await?;
    Ok(Json(vote))
}

/// POST /api/rooms/{room_id}/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(req): Json<ActionRequest>,
) -> ApiResult<ConfirmOutcome> {
    let outcome = state.confirm(&room_id, &req.player_id, req.action).await?;
    Ok(Json(outcome))
}

/// POST /api/rooms/{room_id}/force
pub async fn force(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(req): Json<ActionRequest>,
) -> ApiResult<ConfirmOutcome> {
    let outcome = state.force(&room_id, &req.player_id, req.action).await?;
    Ok(Json(outcome))
}

/// POST /api/rooms/{room_id}/vote-phase
pub async fn request_vote_phase(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, GameError> {
    state.request_vote_phase(&room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/rooms/{room_id}/results
pub async fn compute_and_reveal_results(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> ApiResult<RoundResult> {
    let result = state.compute_and_reveal_results(&room_id).await?;
    Ok(Json(result))
}
