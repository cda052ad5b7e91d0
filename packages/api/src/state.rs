use std::sync::Arc;

use axum::extract::FromRef;
use shared::services::auth_service::AuthService;
use shared::services::game_service::GameService;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub game_service: Arc<GameService>,
}
