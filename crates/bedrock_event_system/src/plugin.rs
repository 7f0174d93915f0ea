//! Plugin lifecycle: the trait plugins implement and the manager that drives it.
//!
//! # Lifecycle
//!
//! 1. **Load**: `on_load()` is called on every registered plugin.
//! 2. **Enable**: `on_enable()` is called on every loaded plugin. Plugins
//!    read their configuration and register event handlers here.
//! 3. **Operation**: the host emits events; enabled plugins react.
//! 4. **Disable**: `on_disable()` is called for cleanup on shutdown.
//!
//! A plugin failing any phase is logged and marked [`PluginState::Failed`];
//! the host and the other plugins keep running.

use crate::context::ServerContext;
use crate::error::PluginError;
use crate::events::{ServerLoadEvent, ServerLoadType};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

/// High-level plugin interface.
#[async_trait]
pub trait SimplePlugin: Send + Sync + 'static {
    /// Unique, stable plugin name. Also names the plugin's data folder.
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Host API version the plugin was written against.
    fn api_version(&self) -> &str {
        crate::API_VERSION
    }

    async fn on_load(&mut self, _context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called once every plugin has loaded. Register event handlers here.
    async fn on_enable(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError>;

    async fn on_disable(&mut self, _context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Where a managed plugin is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Registered,
    Loaded,
    Enabled,
    Disabled,
    Failed,
}

struct ManagedPlugin {
    plugin: Box<dyn SimplePlugin>,
    state: PluginState,
}

/// Summary of one managed plugin.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub api_version: String,
    pub state: PluginState,
}

/// Drives registered plugins through their lifecycle.
pub struct PluginManager {
    context: Arc<dyn ServerContext>,
    plugins: Vec<ManagedPlugin>,
}

impl PluginManager {
    pub fn new(context: Arc<dyn ServerContext>) -> Self {
        Self {
            context,
            plugins: Vec::new(),
        }
    }

    /// Adds a plugin. Duplicate names are rejected.
    pub fn register(&mut self, plugin: Box<dyn SimplePlugin>) -> Result<(), PluginError> {
        if self.plugins.iter().any(|p| p.plugin.name() == plugin.name()) {
            return Err(PluginError::InitializationFailed(format!(
                "a plugin named '{}' is already registered",
                plugin.name()
            )));
        }

        if plugin.api_version() != crate::API_VERSION {
            warn!(
                "Plugin '{}' targets API {} but host provides {}",
                plugin.name(),
                plugin.api_version(),
                crate::API_VERSION
            );
        }

        self.plugins.push(ManagedPlugin {
            plugin,
            state: PluginState::Registered,
        });
        Ok(())
    }

    /// Calls `on_load` on every registered plugin. Returns how many loaded.
    pub async fn load_all(&mut self) -> usize {
        let mut loaded = 0;
        for managed in self
            .plugins
            .iter_mut()
            .filter(|p| p.state == PluginState::Registered)
        {
            let name = managed.plugin.name().to_string();
            match managed.plugin.on_load(self.context.clone()).await {
                Ok(()) => {
                    managed.state = PluginState::Loaded;
                    loaded += 1;
                    info!("Loaded plugin {} v{}", name, managed.plugin.version());
                }
                Err(e) => {
                    managed.state = PluginState::Failed;
                    error!("Failed to load plugin {}: {}", name, e);
                }
            }
        }
        loaded
    }

    /// Calls `on_enable` on every loaded plugin. Returns how many enabled.
    pub async fn enable_all(&mut self) -> usize {
        let mut enabled = 0;
        for managed in self
            .plugins
            .iter_mut()
            .filter(|p| p.state == PluginState::Loaded)
        {
            let name = managed.plugin.name().to_string();
            match managed.plugin.on_enable(self.context.clone()).await {
                Ok(()) => {
                    managed.state = PluginState::Enabled;
                    enabled += 1;
                    info!("Enabled plugin {}", name);
                }
                Err(e) => {
                    managed.state = PluginState::Failed;
                    error!("Failed to enable plugin {}: {}", name, e);
                }
            }
        }
        enabled
    }

    /// Loads and enables everything, then announces [`ServerLoadEvent`].
    pub async fn start(&mut self) -> usize {
        self.load_all().await;
        let enabled = self.enable_all().await;
        self.context.events().emit(&ServerLoadEvent {
            load_type: ServerLoadType::Startup,
        });
        enabled
    }

    /// Calls `on_disable` on every enabled plugin, in reverse order.
    pub async fn disable_all(&mut self) {
        for managed in self
            .plugins
            .iter_mut()
            .rev()
            .filter(|p| p.state == PluginState::Enabled)
        {
            let name = managed.plugin.name().to_string();
            if let Err(e) = managed.plugin.on_disable(self.context.clone()).await {
                // Shutdown errors are logged but don't prevent unloading.
                error!("Error while disabling plugin {}: {}", name, e);
            }
            managed.state = PluginState::Disabled;
            info!("Disabled plugin {}", name);
        }
    }

    pub fn plugin_state(&self, name: &str) -> Option<PluginState> {
        self.plugins
            .iter()
            .find(|p| p.plugin.name() == name)
            .map(|p| p.state)
    }

    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.plugins
            .iter()
            .map(|p| PluginInfo {
                name: p.plugin.name().to_string(),
                version: p.plugin.version().to_string(),
                api_version: p.plugin.api_version().to_string(),
                state: p.state,
            })
            .collect()
    }
}
