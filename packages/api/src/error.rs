use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::models::errors::GameError;
use shared::models::requests::ErrorResponse;
use shared::services::errors::{
    auth_service_errors::AuthServiceError, game_service_errors::GameServiceError,
};

#[derive(Debug)]
pub enum ApiError {
    GameService(GameServiceError),
    AuthService(AuthServiceError),
}

impl From<GameServiceError> for ApiError {
    fn from(error: GameServiceError) -> Self {
        ApiError::GameService(error)
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(error: AuthServiceError) -> Self {
        ApiError::AuthService(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::GameService(GameServiceError::ValidationError(_)) => StatusCode::BAD_REQUEST,
            ApiError::GameService(GameServiceError::GameNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::GameService(GameServiceError::ConcurrentModification) => StatusCode::CONFLICT,
            ApiError::GameService(GameServiceError::RepositoryError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            ApiError::GameService(GameServiceError::Rules(
                GameError::InvalidMove(_) | GameError::InvalidRoster(_),
            )) => StatusCode::BAD_REQUEST,
            ApiError::GameService(GameServiceError::Rules(GameError::InvalidParticipant(_))) => {
                StatusCode::FORBIDDEN
            }
            ApiError::GameService(GameServiceError::Rules(
                GameError::GameNotStarted
                | GameError::GameAlreadyOver
                | GameError::MoveAlreadySubmitted(_),
            )) => StatusCode::CONFLICT,

            ApiError::AuthService(
                AuthServiceError::MissingCredentials
                | AuthServiceError::InvalidToken
                | AuthServiceError::ExpiredToken,
            ) => StatusCode::UNAUTHORIZED,
            ApiError::AuthService(AuthServiceError::ValidationError(_)) => StatusCode::BAD_REQUEST,
            ApiError::AuthService(AuthServiceError::JwtError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::GameService(err) => err.to_string(),
            ApiError::AuthService(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Storage details stay in the logs.
        let error = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.message()
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::game::Role;
    use shared::repositories::errors::game_repository_errors::GameRepositoryError;

    fn status_of(error: impl Into<ApiError>) -> StatusCode {
        error.into().status()
    }

    #[test]
    fn test_game_errors_map_to_statuses() {
        assert_eq!(
            status_of(GameServiceError::GameNotFound("g".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(GameServiceError::ConcurrentModification),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(GameServiceError::Rules(GameError::InvalidMove("0".to_string()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(GameServiceError::Rules(GameError::InvalidParticipant(
                "mallory".to_string()
            ))),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(GameServiceError::Rules(GameError::MoveAlreadySubmitted(
                Role::PlayerOne
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(GameServiceError::RepositoryError(
                GameRepositoryError::DynamoDb("down".to_string())
            )),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_errors_map_to_unauthorized() {
        assert_eq!(
            status_of(AuthServiceError::MissingCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthServiceError::ExpiredToken),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let response = ApiError::from(GameServiceError::RepositoryError(
            GameRepositoryError::DynamoDb("table missing".to_string()),
        ))
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
