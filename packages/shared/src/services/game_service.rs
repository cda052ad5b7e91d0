use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    models::{
        game::{Game, GameResult, Transition},
        requests::MoveResult,
        round::{MoveValue, PlayerMove, RandomTarget, TargetGenerator},
    },
    repositories::game_repository::GameRepository,
    services::{
        errors::game_service_errors::GameServiceError,
        event_sink::{GameEventSink, TracingEventSink},
    },
};

#[derive(Clone)]
pub struct GameService {
    repository: Arc<dyn GameRepository + Send + Sync>,
    events: Arc<dyn GameEventSink>,
    targets: Arc<dyn TargetGenerator>,
}

impl GameService {
    pub fn new(repository: Arc<dyn GameRepository + Send + Sync>) -> Self {
        GameService {
            repository,
            events: Arc::new(TracingEventSink),
            targets: Arc::new(RandomTarget),
        }
    }

    pub fn with_collaborators(
        repository: Arc<dyn GameRepository + Send + Sync>,
        events: Arc<dyn GameEventSink>,
        targets: Arc<dyn TargetGenerator>,
    ) -> Self {
        GameService {
            repository,
            events,
            targets,
        }
    }

    pub async fn create_game(
        &self,
        player_1_id: &str,
        player_2_id: &str,
    ) -> Result<Game, GameServiceError> {
        require("Player ID", player_1_id)?;
        require("Opponent ID", player_2_id)?;

        let game = Game::new(player_1_id, player_2_id)?;
        self.repository.commit(&game.creation_writes()).await?;

        info!(
            "Created game {} between {} and {}",
            game.game_id, player_1_id, player_2_id
        );
        Ok(game)
    }

    pub async fn get_game(&self, game_id: &str) -> Result<Game, GameServiceError> {
        require("Game ID", game_id)?;
        self.repository
            .get_game(game_id)
            .await?
            .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))
    }

    pub async fn connect(&self, game_id: &str, user_id: &str) -> Result<Game, GameServiceError> {
        require("User ID", user_id)?;
        let game = self.get_game(game_id).await?;

        let transition = self.apply(game.connect(user_id)?).await?;
        debug!(
            "User {} connected to game {} (status {:?})",
            user_id, game_id, transition.game.status
        );
        Ok(transition.game)
    }

    /// Applies a move typed by `user_id`. A game that is already over
    /// yields `MoveResult::Ignored` and nothing is written.
    pub async fn submit_move(
        &self,
        game_id: &str,
        user_id: &str,
        value: &str,
    ) -> Result<MoveResult, GameServiceError> {
        require("User ID", user_id)?;
        let value: MoveValue = value.parse()?;
        let game = self.get_game(game_id).await?;

        debug!(
            "Processing move {} from {} in game {} round {}",
            value, user_id, game_id, game.current_round
        );

        let Some(transition) =
            game.processing(PlayerMove::new(user_id, value), self.targets.as_ref())?
        else {
            info!(
                "Ignoring move from {} in game {}: status = game_over",
                user_id, game_id
            );
            return Ok(MoveResult::Ignored);
        };

        let transition = self.apply(transition).await?;
        Ok(transition
            .round
            .map_or(MoveResult::Ignored, |round| MoveResult::Applied { round }))
    }

    pub async fn leave(&self, game_id: &str, user_id: &str) -> Result<GameResult, GameServiceError> {
        require("User ID", user_id)?;
        let game = self.get_game(game_id).await?;

        let transition = self.apply(game.leave(user_id)?).await?;
        info!("User {} left game {}", user_id, game_id);
        Ok(transition.game.who_is_winner())
    }

    pub async fn get_winner(&self, game_id: &str) -> Result<GameResult, GameServiceError> {
        let game = self.get_game(game_id).await?;
        Ok(game.who_is_winner())
    }

    /// Past and running games of a participant, newest first.
    pub async fn history(&self, user_id: &str) -> Result<Vec<Game>, GameServiceError> {
        require("User ID", user_id)?;
        let games = self.repository.list_games_for_user(user_id).await?;
        debug!("Found {} games for {}", games.len(), user_id);
        Ok(games)
    }

    /// Commits the transition's writes, then publishes its events.
    async fn apply(&self, transition: Transition) -> Result<Transition, GameServiceError> {
        if !transition.writes.is_empty() {
            self.repository
                .commit(&transition.writes)
                .await
                .map_err(|e| {
                    error!(
                        "Failed to commit game {}: {}",
                        transition.game.game_id, e
                    );
                    GameServiceError::from(e)
                })?;
        }

        for event in &transition.events {
            self.events.record(event);
        }

        Ok(transition)
    }
}

fn require(name: &str, value: &str) -> Result<(), GameServiceError> {
    if value.trim().is_empty() {
        return Err(GameServiceError::ValidationError(format!(
            "{} cannot be empty",
            name
        )));
    }
    Ok(())
}
