//! # Bedrock Event System
//!
//! The plugin-facing API of a Bedrock dedicated server host. Plugins compile
//! against this crate only; the host implements the traits and drives the
//! lifecycle.
//!
//! ## Key pieces
//!
//! - **[`EventBus`]**: typed, synchronous, priority-ordered event dispatch
//! - **[`Player`] / [`ServerContext`]**: host-owned objects plugins act on
//! - **[`SimplePlugin`] / [`PluginManager`]**: load, enable, disable
//! - **[`local`]**: an in-memory host for tests and tooling
//!
//! ## Example
//!
//! ```rust,no_run
//! use bedrock_event_system::*;
//! use std::sync::Arc;
//!
//! struct Greeter;
//!
//! #[async_trait::async_trait]
//! impl SimplePlugin for Greeter {
//!     fn name(&self) -> &str { "greeter" }
//!     fn version(&self) -> &str { "1.0.0" }
//!
//!     async fn on_enable(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
//!         context.events().on("greet", EventPriority::Normal, |event: &PlayerJoinEvent| {
//!             event
//!                 .player
//!                 .send_message("Welcome!")
//!                 .map_err(|e| EventError::HandlerExecution(e.to_string()))
//!         });
//!         Ok(())
//!     }
//! }
//! ```

pub mod bus;
pub mod context;
pub mod error;
pub mod events;
pub mod local;
pub mod logging;
pub mod plugin;
pub mod types;

pub use bus::{EventBus, EventHandler, EventPriority, EventSystemStats, TypedEventHandler};
pub use context::{Player, ServerContext};
pub use error::{EventError, PluginError, ServerError};
pub use events::{
    Event, PlayerDeathEvent, PlayerJoinEvent, PlayerQuitEvent, ServerLoadEvent, ServerLoadType,
};
pub use plugin::{PluginInfo, PluginManager, PluginState, SimplePlugin};
pub use types::{ColorFormat, LogLevel, PlayerId};

/// Plugin API version implemented by this host.
pub const API_VERSION: &str = "0.5";
