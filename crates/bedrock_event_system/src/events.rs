//! Events the host dispatches to plugins.

use crate::context::Player;
use std::any::Any;
use std::sync::Arc;

/// Marker trait for anything that can travel over the [`crate::EventBus`].
///
/// Events are dispatched by reference, so they only need to be `Send + Sync`
/// and `'static`. The `Debug` bound keeps events loggable.
pub trait Event: Any + Send + Sync + std::fmt::Debug {
    /// Stable, human-readable name of this event type.
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// Name of this event instance's type.
    fn event_name(&self) -> &'static str
    where
        Self: Sized,
    {
        Self::type_name()
    }

    fn as_any(&self) -> &dyn Any;
}

macro_rules! impl_event {
    ($($event:ident),* $(,)?) => {
        $(
            impl Event for $event {
                fn type_name() -> &'static str {
                    stringify!($event)
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

/// Fired after a player has spawned into the world.
#[derive(Debug, Clone)]
pub struct PlayerJoinEvent {
    pub player: Arc<dyn Player>,
}

/// Fired when a player leaves the server, before the session is dropped.
#[derive(Debug, Clone)]
pub struct PlayerQuitEvent {
    pub player: Arc<dyn Player>,
}

/// Fired when a player has died.
#[derive(Debug, Clone)]
pub struct PlayerDeathEvent {
    /// The player who died.
    pub player: Arc<dyn Player>,
    /// Damage cause reported by the world, if known.
    pub cause: Option<String>,
    /// The vanilla death message, if one was produced.
    pub death_message: Option<String>,
}

impl PlayerDeathEvent {
    /// Best available description of why the player died.
    pub fn describe_cause(&self) -> String {
        self.cause
            .as_deref()
            .or(self.death_message.as_deref())
            .unwrap_or("Unknown")
            .to_string()
    }
}

/// Why the server finished loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerLoadType {
    Startup,
    Reload,
}

/// Fired once every plugin has been enabled.
#[derive(Debug, Clone)]
pub struct ServerLoadEvent {
    pub load_type: ServerLoadType,
}

impl_event!(PlayerJoinEvent, PlayerQuitEvent, PlayerDeathEvent, ServerLoadEvent);
