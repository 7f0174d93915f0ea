//! Error types shared by the host and its plugins.

/// Errors raised while dispatching events.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Handler execution failed during event processing
    #[error("Handler execution error: {0}")]
    HandlerExecution(String),
    /// Handler panicked while processing an event
    #[error("Handler panicked: {0}")]
    HandlerPanicked(String),
    /// Handler was handed an event of a type it does not accept
    #[error("Event type mismatch for handler {0}")]
    TypeMismatch(String),
}

/// Errors that can occur during plugin lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Plugin initialization failed during load or enable
    #[error("Plugin initialization failed: {0}")]
    InitializationFailed(String),
}

/// Errors returned by host-owned objects when a plugin acts on them.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The player is no longer connected
    #[error("Player {0} is offline")]
    PlayerOffline(String),
    /// Internal server error (invalid state, rejected mutation, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}
