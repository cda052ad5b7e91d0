use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::{AttributeValue, Put, TransactWriteItem};
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, from_items, to_item};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::game::{Game, GameWrite, PlayerGame};
use crate::models::round::Round;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Loads the game record together with its rounds, ordered by round id.
    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameRepositoryError>;

    /// Applies all writes of one transition atomically.
    async fn commit(&self, writes: &[GameWrite]) -> Result<(), GameRepositoryError>;

    /// Every game the user plays in, newest first.
    async fn list_games_for_user(&self, user_id: &str) -> Result<Vec<Game>, GameRepositoryError>;
}

pub struct DynamoDbGameRepository {
    pub client: Client,
    pub games_table: String,
    pub rounds_table: String,
    pub player_games_table: String,
}

impl DynamoDbGameRepository {
    pub fn new(
        client: Client,
        games_table: &str,
        rounds_table: &str,
        player_games_table: &str,
    ) -> Self {
        Self {
            client,
            games_table: games_table.to_string(),
            rounds_table: rounds_table.to_string(),
            player_games_table: player_games_table.to_string(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(
            client,
            &config.games_table,
            &config.rounds_table,
            &config.player_games_table,
        )
    }

    fn transact_item(&self, write: &GameWrite) -> Result<TransactWriteItem, GameRepositoryError> {
        let put = match write {
            GameWrite::PutGame {
                game,
                expected_version,
            } => {
                let item = to_item(game)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                let put = Put::builder().table_name(&self.games_table).set_item(Some(item));

                match expected_version {
                    Some(version) => put
                        .condition_expression("#version = :expected_version")
                        .expression_attribute_names("#version", "version")
                        .expression_attribute_values(
                            ":expected_version",
                            AttributeValue::N(version.to_string()),
                        ),
                    None => put.condition_expression("attribute_not_exists(game_id)"),
                }
            }
            GameWrite::PutRound {
                round,
                expected_version,
            } => {
                let item = to_item(round)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                let put = Put::builder()
                    .table_name(&self.rounds_table)
                    .set_item(Some(item));

                match expected_version {
                    Some(version) => put
                        .condition_expression("#version = :expected_version")
                        .expression_attribute_names("#version", "version")
                        .expression_attribute_values(
                            ":expected_version",
                            AttributeValue::N(version.to_string()),
                        ),
                    None => put.condition_expression("attribute_not_exists(round_id)"),
                }
            }
            GameWrite::PutPlayerGame(entry) => {
                let item = to_item(entry)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                Put::builder()
                    .table_name(&self.player_games_table)
                    .set_item(Some(item))
            }
        };

        let put = put
            .build()
            .map_err(|e| GameRepositoryError::Transaction(e.to_string()))?;

        Ok(TransactWriteItem::builder().put(put).build())
    }

    async fn get_rounds(&self, game_id: &str) -> Result<Vec<Round>, GameRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.rounds_table)
            .key_condition_expression("game_id = :game_id")
            .expression_attribute_values(":game_id", AttributeValue::S(game_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        let mut rounds: Vec<Round> = match output.items {
            Some(items) => {
                from_items(items).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?
            }
            None => vec![],
        };
        rounds.sort_by_key(|round| round.round_id);

        Ok(rounds)
    }
}

#[async_trait]
impl GameRepository for DynamoDbGameRepository {
    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.games_table)
            .key("game_id", AttributeValue::S(game_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        let Some(item) = output.item else {
            return Ok(None);
        };

        let mut game: Game =
            from_item(item).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        game.rounds = self.get_rounds(game_id).await?;

        Ok(Some(game))
    }

    async fn commit(&self, writes: &[GameWrite]) -> Result<(), GameRepositoryError> {
        if writes.is_empty() {
            return Ok(());
        }

        let transact_items = writes
            .iter()
            .map(|write| self.transact_item(write))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Committing {} writes", transact_items.len());

        let result = self
            .client
            .transact_write_items()
            .set_transact_items(Some(transact_items))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                // A failed version condition cancels the whole transaction.
                if let SdkError::ServiceError(service_err) = &e {
                    if let TransactWriteItemsError::TransactionCanceledException(cancelled) =
                        service_err.err()
                    {
                        let condition_failed = cancelled
                            .cancellation_reasons()
                            .iter()
                            .any(|reason| reason.code() == Some("ConditionalCheckFailed"));
                        if condition_failed {
                            return Err(GameRepositoryError::Conflict(
                                "game was modified concurrently".to_string(),
                            ));
                        }
                    }
                }
                Err(GameRepositoryError::Transaction(e.to_string()))
            }
        }
    }

    async fn list_games_for_user(&self, user_id: &str) -> Result<Vec<Game>, GameRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.player_games_table)
            .key_condition_expression("user_id = :user_id")
            .expression_attribute_values(":user_id", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        let entries: Vec<PlayerGame> = match output.items {
            Some(items) => {
                from_items(items).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?
            }
            None => vec![],
        };

        let mut games = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.get_game(&entry.game_id).await? {
                Some(game) => games.push(game),
                None => warn!(
                    "History entry for {} points at missing game {}",
                    user_id, entry.game_id
                ),
            }
        }
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(games)
    }
}
