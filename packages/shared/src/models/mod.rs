pub mod auth;
pub mod errors;
pub mod events;
pub mod game;
pub mod requests;
pub mod round;
