use serde::{Deserialize, Serialize};

use crate::models::game::Game;
use crate::models::round::Round;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateGameRequest {
    pub opponent_id: String,
}

/// Move text as typed by the player: a number or the fold sentinel.
#[derive(Debug, Deserialize, Serialize)]
pub struct SubmitMoveRequest {
    pub value: String,
}

/// Result of a move submission. `Ignored` means the game had already
/// ended and nothing changed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MoveResult {
    Applied { round: Round },
    Ignored,
}

/// Game record together with its rounds, for history views.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameResponse {
    #[serde(flatten)]
    pub game: Game,
    pub rounds: Vec<Round>,
}

impl From<Game> for GameResponse {
    fn from(mut game: Game) -> Self {
        let rounds = std::mem::take(&mut game.rounds);
        GameResponse { game, rounds }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
