use lambda_http::{run, tracing, Error};
use std::env::set_var;
use std::sync::Arc;

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use shared::config::Config;
use shared::repositories::game_repository::DynamoDbGameRepository;
use shared::services::auth_service::AuthService;
use shared::services::game_service::GameService;

#[tokio::main]
async fn main() -> Result<(), Error> {
    set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");

    // required to enable CloudWatch error logging by the runtime
    tracing::init_default_subscriber();

    let config = Config::from_env()?;

    // Set up services
    let aws_config = aws_config::load_from_env().await;
    let client = aws_sdk_dynamodb::Client::new(&aws_config);

    let game_repository = Arc::new(DynamoDbGameRepository::from_config(client, &config));
    let game_service = Arc::new(GameService::new(game_repository));
    let auth_service = Arc::new(AuthService::from_config(&config));

    let app_state = state::AppState {
        auth_service,
        game_service,
    };

    tracing::info!(
        "Starting game API (games table {}, rounds table {})",
        config.games_table, config.rounds_table
    );
    run(routes::router(app_state)).await
}
