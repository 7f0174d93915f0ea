//! Host-owned objects exposed to plugins.

use crate::bus::EventBus;
use crate::error::ServerError;
use crate::types::{LogLevel, PlayerId};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// A connected player as seen by plugins.
///
/// The host owns the player model. Plugins hold `Arc<dyn Player>` handles
/// taken from events and may read experience state or call the mutators
/// below. Mutators fail with [`ServerError::PlayerOffline`] once the session
/// is gone.
///
/// Level and progress are views over the host's experience curve. Setting
/// both to zero clears the player's experience; [`Player::give_exp`] then
/// re-levels according to that curve.
pub trait Player: Send + Sync {
    fn id(&self) -> PlayerId;

    fn name(&self) -> String;

    /// Remote address of the player's connection.
    fn address(&self) -> SocketAddr;

    /// Current experience level.
    fn exp_level(&self) -> i32;

    /// Total experience points accumulated across all levels.
    fn total_exp(&self) -> i32;

    /// Progress towards the next level, in `[0.0, 1.0)`.
    fn exp_progress(&self) -> f32;

    fn set_exp_level(&self, level: i32) -> Result<(), ServerError>;

    /// Sets progress towards the next level. Must be in `[0.0, 1.0)`.
    fn set_exp_progress(&self, progress: f32) -> Result<(), ServerError>;

    /// Grants experience points, levelling the player up as needed.
    fn give_exp(&self, amount: i32) -> Result<(), ServerError>;

    /// Sends a chat message to this player only.
    fn send_message(&self, message: &str) -> Result<(), ServerError>;

    /// Shows a transient popup above the player's hotbar.
    fn send_popup(&self, message: &str) -> Result<(), ServerError>;
}

impl std::fmt::Debug for dyn Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("exp_level", &self.exp_level())
            .field("total_exp", &self.total_exp())
            .finish()
    }
}

/// Server services available to plugins.
///
/// A context is handed to every lifecycle hook. Plugins keep a clone of the
/// `Arc` when their handlers need to broadcast or log.
pub trait ServerContext: Send + Sync {
    /// The event bus shared by the host and all plugins.
    fn events(&self) -> Arc<EventBus>;

    /// Logs a message through the server's logging pipeline.
    fn log(&self, level: LogLevel, message: &str);

    /// Sends a chat message to every online player.
    fn broadcast_message(&self, message: &str);

    /// Private data directory for the given plugin. May not exist yet.
    fn data_folder(&self, plugin_name: &str) -> PathBuf;
}
