use crate::models::errors::GameError;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[derive(Debug)]
pub enum GameServiceError {
    RepositoryError(GameRepositoryError),
    Rules(GameError),
    GameNotFound(String),
    ConcurrentModification,
    ValidationError(String),
}

impl std::fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameServiceError::RepositoryError(err) => {
                write!(f, "Repository error: {}", err)
            }
            GameServiceError::Rules(err) => write!(f, "{}", err),
            GameServiceError::GameNotFound(game_id) => write!(f, "Game {} not found", game_id),
            GameServiceError::ConcurrentModification => {
                write!(f, "Game was modified concurrently, retry the request")
            }
            GameServiceError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<GameRepositoryError> for GameServiceError {
    fn from(err: GameRepositoryError) -> Self {
        match err {
            GameRepositoryError::Conflict(_) => GameServiceError::ConcurrentModification,
            other => GameServiceError::RepositoryError(other),
        }
    }
}

impl From<GameError> for GameServiceError {
    fn from(err: GameError) -> Self {
        GameServiceError::Rules(err)
    }
}
