pub mod auth_service;
pub mod errors;
pub mod event_sink;
pub mod game_service;
