pub mod games;
pub mod health;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    // TODO: restrict origins to the deployed frontend domain
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .merge(games::routes())
        .layer(cors)
        .with_state(state)
}
