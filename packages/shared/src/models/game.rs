use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::errors::GameError;
use crate::models::events::GameEvent;
use crate::models::round::{PlayerMove, Round, TargetGenerator};

pub const NUMBER_OF_ROUNDS: u8 = 5;

/// A player's fixed seat within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "player_1")]
    PlayerOne,
    #[serde(rename = "player_2")]
    PlayerTwo,
}

impl Role {
    pub fn opponent(self) -> Role {
        match self {
            Role::PlayerOne => Role::PlayerTwo,
            Role::PlayerTwo => Role::PlayerOne,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::PlayerOne => write!(f, "player_1"),
            Role::PlayerTwo => write!(f, "player_2"),
        }
    }
}

/// Outcome of a round or of a whole game. `None` is a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    #[serde(rename = "player_1")]
    PlayerOne,
    #[serde(rename = "player_2")]
    PlayerTwo,
    #[serde(rename = "none")]
    None,
}

impl Winner {
    pub fn role(self) -> Option<Role> {
        match self {
            Winner::PlayerOne => Some(Role::PlayerOne),
            Winner::PlayerTwo => Some(Role::PlayerTwo),
            Winner::None => None,
        }
    }
}

impl From<Role> for Winner {
    fn from(role: Role) -> Self {
        match role {
            Role::PlayerOne => Winner::PlayerOne,
            Role::PlayerTwo => Winner::PlayerTwo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    ConnectingPlayers,
    GameStarted,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub role: Role,
    pub connected: bool,
}

impl Participant {
    fn new(user_id: &str, role: Role) -> Self {
        Participant {
            user_id: user_id.to_string(),
            role,
            connected: false,
        }
    }
}

/// The two seats of a game, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub player_1: Participant,
    pub player_2: Participant,
}

impl Roster {
    pub fn new(player_1_id: &str, player_2_id: &str) -> Result<Self, GameError> {
        if player_1_id.is_empty() || player_2_id.is_empty() {
            return Err(GameError::InvalidRoster(
                "Player IDs cannot be empty".to_string(),
            ));
        }
        if player_1_id == player_2_id {
            return Err(GameError::InvalidRoster(
                "A player cannot play against themselves".to_string(),
            ));
        }

        Ok(Roster {
            player_1: Participant::new(player_1_id, Role::PlayerOne),
            player_2: Participant::new(player_2_id, Role::PlayerTwo),
        })
    }

    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        if self.player_1.user_id == user_id {
            Some(Role::PlayerOne)
        } else if self.player_2.user_id == user_id {
            Some(Role::PlayerTwo)
        } else {
            None
        }
    }

    pub fn participant(&self, role: Role) -> &Participant {
        match role {
            Role::PlayerOne => &self.player_1,
            Role::PlayerTwo => &self.player_2,
        }
    }

    fn participant_mut(&mut self, role: Role) -> &mut Participant {
        match role {
            Role::PlayerOne => &mut self.player_1,
            Role::PlayerTwo => &mut self.player_2,
        }
    }

    pub fn all_connected(&self) -> bool {
        self.player_1.connected && self.player_2.connected
    }
}

/// Answer to "who won?". Callers match on the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum GameResult {
    InProgress,
    Won { winner: Participant },
    NoWinner,
}

/// A storage write produced by a transition. The boundary applies all
/// writes of one transition atomically.
#[derive(Debug, Clone, PartialEq)]
pub enum GameWrite {
    /// `expected_version` of `None` means the game must not exist yet.
    PutGame {
        game: Game,
        expected_version: Option<u64>,
    },
    /// `expected_version` of `None` means the round must not exist yet.
    PutRound {
        round: Round,
        expected_version: Option<u64>,
    },
    /// History entry linking a participant to a game.
    PutPlayerGame(PlayerGame),
}

/// One row of a participant's game history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGame {
    pub user_id: String,
    pub game_id: String,
    pub created_at: DateTime<Utc>,
}

/// New game snapshot plus the writes and events that commit it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub game: Game,
    pub round: Option<Round>,
    pub writes: Vec<GameWrite>,
    pub events: Vec<GameEvent>,
}

impl Transition {
    fn unchanged(game: Game) -> Self {
        Transition {
            game,
            round: None,
            writes: vec![],
            events: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub status: GameStatus,
    pub current_round: u8,
    pub winner: Option<Winner>,
    pub roster: Roster,
    /// Stored as separate round records, never inside the game record.
    #[serde(skip)]
    pub rounds: Vec<Round>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    pub fn new(player_1_id: &str, player_2_id: &str) -> Result<Self, GameError> {
        let roster = Roster::new(player_1_id, player_2_id)?;
        let now = Utc::now();

        Ok(Game {
            game_id: Uuid::new_v4().to_string(),
            status: GameStatus::ConnectingPlayers,
            current_round: 1,
            winner: None,
            roster,
            rounds: vec![],
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Writes that persist a freshly created game and its history entries.
    pub fn creation_writes(&self) -> Vec<GameWrite> {
        let mut writes = vec![GameWrite::PutGame {
            game: self.clone(),
            expected_version: None,
        }];
        for participant in [&self.roster.player_1, &self.roster.player_2] {
            writes.push(GameWrite::PutPlayerGame(PlayerGame {
                user_id: participant.user_id.clone(),
                game_id: self.game_id.clone(),
                created_at: self.created_at,
            }));
        }
        writes
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn round(&self, round_id: u8) -> Option<&Round> {
        self.rounds.iter().find(|round| round.round_id == round_id)
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.round(self.current_round)
    }

    /// Round wins per player. Draws and unresolved rounds count for nobody.
    pub fn score(&self) -> (u8, u8) {
        self.rounds
            .iter()
            .fold((0, 0), |(player_1, player_2), round| match round.winner() {
                Some(Winner::PlayerOne) => (player_1 + 1, player_2),
                Some(Winner::PlayerTwo) => (player_1, player_2 + 1),
                _ => (player_1, player_2),
            })
    }

    /// Marks a participant as connected; the game starts once both are.
    pub fn connect(&self, user_id: &str) -> Result<Transition, GameError> {
        let role = self
            .roster
            .role_of(user_id)
            .ok_or_else(|| GameError::InvalidParticipant(user_id.to_string()))?;

        match self.status {
            GameStatus::GameOver => return Err(GameError::GameAlreadyOver),
            GameStatus::GameStarted => return Ok(Transition::unchanged(self.clone())),
            GameStatus::ConnectingPlayers => {}
        }
        if self.roster.participant(role).connected {
            return Ok(Transition::unchanged(self.clone()));
        }

        let mut next = self.clone();
        next.roster.participant_mut(role).connected = true;
        if next.roster.all_connected() {
            next.status = GameStatus::GameStarted;
        }

        Ok(self.transition(next, None, vec![]))
    }

    /// Applies one player's move to the current round.
    ///
    /// Returns `Ok(None)` when the game is already over: the move is
    /// ignored and nothing is written. Otherwise the round for
    /// `current_round` is created or completed, and once it resolves the
    /// game either advances to the next round or finishes.
    pub fn processing(
        &self,
        player_move: PlayerMove,
        targets: &dyn TargetGenerator,
    ) -> Result<Option<Transition>, GameError> {
        match self.status {
            GameStatus::GameOver => return Ok(None),
            GameStatus::ConnectingPlayers => return Err(GameError::GameNotStarted),
            GameStatus::GameStarted => {}
        }

        let role = self
            .roster
            .role_of(&player_move.user_id)
            .ok_or_else(|| GameError::InvalidParticipant(player_move.user_id.clone()))?;

        let mut next = self.clone();
        let round_id = next.current_round;

        let (index, expected_version) =
            match next.rounds.iter().position(|r| r.round_id == round_id) {
                Some(index) => (index, Some(next.rounds[index].version)),
                None => {
                    next.rounds.push(Round::new(&next.game_id, round_id));
                    (next.rounds.len() - 1, None)
                }
            };
        next.rounds[index].record_move(role, player_move, targets)?;
        if expected_version.is_some() {
            next.rounds[index].version += 1;
        }
        let round = next.rounds[index].clone();

        let mut events = vec![if expected_version.is_none() {
            GameEvent::RoundCreated {
                round: round.clone(),
            }
        } else {
            GameEvent::RoundUpdated {
                round: round.clone(),
            }
        }];

        if round.is_resolved() {
            if round_id >= NUMBER_OF_ROUNDS {
                events.push(next.game_over());
            } else {
                next.current_round += 1;
            }
        }

        Ok(Some(self.transition(
            next,
            Some((round, expected_version)),
            events,
        )))
    }

    /// Ends the game at once; the player who stays wins. Leaving a game
    /// that is already over changes nothing.
    pub fn leave(&self, user_id: &str) -> Result<Transition, GameError> {
        let role = self
            .roster
            .role_of(user_id)
            .ok_or_else(|| GameError::InvalidParticipant(user_id.to_string()))?;

        if self.is_over() {
            return Ok(Transition::unchanged(self.clone()));
        }

        let mut next = self.clone();
        let mut events = vec![GameEvent::PlayerLeft {
            game_id: self.game_id.clone(),
            user_id: user_id.to_string(),
            role,
        }];
        events.push(next.finish(role.opponent().into()));

        Ok(self.transition(next, None, events))
    }

    pub fn who_is_winner(&self) -> GameResult {
        match self.winner.map(Winner::role) {
            None => GameResult::InProgress,
            Some(None) => GameResult::NoWinner,
            Some(Some(role)) => GameResult::Won {
                winner: self.roster.participant(role).clone(),
            },
        }
    }

    fn game_over(&mut self) -> GameEvent {
        let (player_1_wins, player_2_wins) = self.score();
        let winner = match player_1_wins.cmp(&player_2_wins) {
            Ordering::Greater => Winner::PlayerOne,
            Ordering::Less => Winner::PlayerTwo,
            Ordering::Equal => Winner::None,
        };
        self.finish(winner)
    }

    fn finish(&mut self, winner: Winner) -> GameEvent {
        let (player_1_wins, player_2_wins) = self.score();
        self.winner = Some(winner);
        self.status = GameStatus::GameOver;

        GameEvent::GameOver {
            game_id: self.game_id.clone(),
            winner,
            player_1_wins,
            player_2_wins,
        }
    }

    /// Bumps the version and builds the conditional writes. A round write
    /// carries the round version it was computed from.
    fn transition(
        &self,
        mut next: Game,
        round: Option<(Round, Option<u64>)>,
        events: Vec<GameEvent>,
    ) -> Transition {
        next.version = self.version + 1;
        next.updated_at = Utc::now();

        let mut writes = Vec::with_capacity(2);
        if let Some((round, expected_version)) = &round {
            writes.push(GameWrite::PutRound {
                round: round.clone(),
                expected_version: *expected_version,
            });
        }
        writes.push(GameWrite::PutGame {
            game: next.clone(),
            expected_version: Some(self.version),
        });

        Transition {
            game: next,
            round: round.map(|(round, _)| round),
            writes,
            events,
        }
    }
}
