use serde::{Deserialize, Serialize};

use crate::models::game::{Role, Winner};
use crate::models::round::Round;

/// Structured record of a committed state change, with a payload snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    RoundCreated {
        round: Round,
    },
    RoundUpdated {
        round: Round,
    },
    PlayerLeft {
        game_id: String,
        user_id: String,
        role: Role,
    },
    GameOver {
        game_id: String,
        winner: Winner,
        player_1_wins: u8,
        player_2_wins: u8,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::RoundCreated { .. } => "round_created",
            GameEvent::RoundUpdated { .. } => "round_updated",
            GameEvent::PlayerLeft { .. } => "player_left",
            GameEvent::GameOver { .. } => "game_over",
        }
    }

    pub fn game_id(&self) -> &str {
        match self {
            GameEvent::RoundCreated { round } | GameEvent::RoundUpdated { round } => &round.game_id,
            GameEvent::PlayerLeft { game_id, .. } | GameEvent::GameOver { game_id, .. } => game_id,
        }
    }
}
