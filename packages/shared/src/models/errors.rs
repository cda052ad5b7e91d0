use crate::models::game::Role;

/// Rule violations raised by the game state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    GameNotStarted,
    GameAlreadyOver,
    InvalidParticipant(String),
    InvalidMove(String),
    MoveAlreadySubmitted(Role),
    InvalidRoster(String),
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::GameNotStarted => write!(f, "Game has not started yet"),
            GameError::GameAlreadyOver => write!(f, "Game is already over"),
            GameError::InvalidParticipant(user_id) => {
                write!(f, "User {} is not a participant of this game", user_id)
            }
            GameError::InvalidMove(msg) => write!(f, "Invalid move: {}", msg),
            GameError::MoveAlreadySubmitted(role) => {
                write!(f, "{} already submitted a move this round", role)
            }
            GameError::InvalidRoster(msg) => write!(f, "Invalid roster: {}", msg),
        }
    }
}

impl std::error::Error for GameError {}
