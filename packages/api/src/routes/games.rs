use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::models::{
    game::GameResult,
    requests::{CreateGameRequest, GameResponse, MoveResult, SubmitMoveRequest},
};
use tracing::{debug, error};

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{game_id}", get(get_game))
        .route("/games/{game_id}/connect", post(connect))
        .route("/games/{game_id}/moves", post(submit_move))
        .route("/games/{game_id}/leave", post(leave_game))
        .route("/games/{game_id}/winner", get(get_winner))
}

async fn create_game(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(payload): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    let game = state
        .game_service
        .create_game(&authenticated_user.user_id, &payload.opponent_id)
        .await
        .map_err(|e| {
            error!(
                "Failed to create game for {}: {}",
                authenticated_user.user_id, e
            );
            ApiError::from(e)
        })?;

    Ok((StatusCode::CREATED, Json(GameResponse::from(game))))
}

async fn list_games(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<Vec<GameResponse>>, ApiError> {
    let games = state
        .game_service
        .history(&authenticated_user.user_id)
        .await?;

    Ok(Json(games.into_iter().map(GameResponse::from).collect()))
}

async fn get_game(
    State(state): State<AppState>,
    _authenticated_user: AuthenticatedUser,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let game = state.game_service.get_game(&game_id).await?;
    Ok(Json(GameResponse::from(game)))
}

async fn connect(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let game = state
        .game_service
        .connect(&game_id, &authenticated_user.user_id)
        .await?;
    Ok(Json(GameResponse::from(game)))
}

async fn submit_move(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(game_id): Path<String>,
    Json(payload): Json<SubmitMoveRequest>,
) -> Result<Json<MoveResult>, ApiError> {
    let result = state
        .game_service
        .submit_move(&game_id, &authenticated_user.user_id, &payload.value)
        .await
        .map_err(|e| {
            error!(
                "Move from {} in game {} rejected: {}",
                authenticated_user.user_id, game_id, e
            );
            ApiError::from(e)
        })?;

    debug!(
        "Move from {} in game {} handled: {:?}",
        authenticated_user.user_id, game_id, result
    );
    Ok(Json(result))
}

async fn leave_game(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(game_id): Path<String>,
) -> Result<Json<GameResult>, ApiError> {
    let result = state
        .game_service
        .leave(&game_id, &authenticated_user.user_id)
        .await?;
    Ok(Json(result))
}

async fn get_winner(
    State(state): State<AppState>,
    _authenticated_user: AuthenticatedUser,
    Path(game_id): Path<String>,
) -> Result<Json<GameResult>, ApiError> {
    let result = state.game_service.get_winner(&game_id).await?;
    Ok(Json(result))
}
