use tracing::{error, info};

#[cfg(test)]
use mockall::automock;

use crate::models::events::GameEvent;

/// Append-only sink for committed game events.
#[cfg_attr(test, automock)]
pub trait GameEventSink: Send + Sync {
    fn record(&self, event: &GameEvent);
}

/// Writes each event as a structured log line carrying a JSON snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl GameEventSink for TracingEventSink {
    fn record(&self, event: &GameEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => info!(
                event = event.name(),
                game_id = event.game_id(),
                payload = %payload,
                "Game event"
            ),
            Err(e) => error!(
                "Failed to serialize {} event for game {}: {}",
                event.name(),
                event.game_id(),
                e
            ),
        }
    }
}
