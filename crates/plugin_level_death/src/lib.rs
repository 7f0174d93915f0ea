//! # Level Death Penalty
//!
//! Takes a percentage of a player's experience away when they die. The
//! percentage comes either from a single level threshold (`OPTION1`) or from a
//! table of level ranges (`OPTION2`), read from the plugin's config file.
//!
//! The plugin also greets joining players with their level and logs quits and
//! server-load notifications.

pub mod config;
pub mod handlers;
pub mod penalty;

use bedrock_event_system::{ColorFormat, LogLevel, PluginError, ServerContext, SimplePlugin};
use config::DeathPenaltyConfig;
use std::sync::Arc;

pub const PLUGIN_NAME: &str = "level_death_penalty";

/// Prepended to every log line and broadcast the plugin emits.
pub const LOG_PREFIX: &str = "[LevelDeathPenalty]";

pub struct LevelDeathPenalty {
    config: Option<Arc<DeathPenaltyConfig>>,
}

impl LevelDeathPenalty {
    pub fn new() -> Self {
        Self { config: None }
    }

    /// The parsed configuration, once the plugin has been enabled.
    pub fn config(&self) -> Option<&DeathPenaltyConfig> {
        self.config.as_deref()
    }
}

impl Default for LevelDeathPenalty {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SimplePlugin for LevelDeathPenalty {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    async fn on_load(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        context.log(LogLevel::Info, &format!("{} Plugin loading...", LOG_PREFIX));
        Ok(())
    }

    async fn on_enable(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        context.log(LogLevel::Info, &format!("{} Plugin enabled!", LOG_PREFIX));
        context.broadcast_message(&format!(
            "{}{} XP Loss System Active!",
            ColorFormat::GREEN,
            LOG_PREFIX
        ));

        let data_folder = context.data_folder(self.name());
        let config = DeathPenaltyConfig::load(&data_folder).await.map_err(|e| {
            PluginError::InitializationFailed(format!("{} Invalid config: {}", LOG_PREFIX, e))
        })?;

        match serde_json::to_string(&config) {
            Ok(json) => context.log(
                LogLevel::Info,
                &format!("{} Active penalty rule: {}", LOG_PREFIX, json),
            ),
            Err(e) => context.log(
                LogLevel::Warn,
                &format!("{} Could not serialize config: {}", LOG_PREFIX, e),
            ),
        }

        let config = Arc::new(config);
        handlers::register_handlers(&context.events(), context.clone(), config.clone());
        self.config = Some(config);
        Ok(())
    }

    async fn on_disable(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        context.log(LogLevel::Info, &format!("{} Plugin disabled!", LOG_PREFIX));
        Ok(())
    }
}
