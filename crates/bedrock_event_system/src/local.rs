//! In-memory host used for tests and local tooling.
//!
//! [`LocalServer`] implements [`ServerContext`] by recording broadcasts
//! instead of sending them. [`LocalPlayer`] implements [`Player`] with the
//! vanilla experience curve and records every message and popup it receives.

use crate::bus::EventBus;
use crate::context::{Player, ServerContext};
use crate::error::ServerError;
use crate::types::{LogLevel, PlayerId};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Experience points needed to advance from `level` to `level + 1`.
pub fn exp_to_next_level(level: i32) -> i32 {
    match level {
        l if l <= 15 => 2 * l + 7,
        l if l <= 30 => 5 * l - 38,
        l => 9 * l - 158,
    }
}

/// Total experience points contained in `level` whole levels.
pub fn exp_for_level(level: i32) -> i32 {
    (0..level.max(0)).map(exp_to_next_level).sum()
}

pub struct LocalServer {
    events: Arc<EventBus>,
    plugins_folder: PathBuf,
    broadcasts: Mutex<Vec<String>>,
}

impl LocalServer {
    /// Creates a server whose plugin data folders live under `plugins_folder`.
    pub fn new(plugins_folder: impl AsRef<Path>) -> Self {
        Self {
            events: Arc::new(EventBus::new()),
            plugins_folder: plugins_folder.as_ref().to_path_buf(),
            broadcasts: Mutex::new(Vec::new()),
        }
    }

    /// Every message broadcast so far, oldest first.
    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().clone()
    }

    pub fn clear_broadcasts(&self) {
        self.broadcasts.lock().clear();
    }
}

impl ServerContext for LocalServer {
    fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => error!("{}", message),
            LogLevel::Warn => warn!("{}", message),
            LogLevel::Info => info!("{}", message),
            LogLevel::Debug => debug!("{}", message),
            LogLevel::Trace => trace!("{}", message),
        }
    }

    fn broadcast_message(&self, message: &str) {
        debug!("Broadcasting message: {} bytes", message.len());
        self.broadcasts.lock().push(message.to_string());
    }

    fn data_folder(&self, plugin_name: &str) -> PathBuf {
        self.plugins_folder.join(plugin_name)
    }
}

#[derive(Debug)]
struct ExperienceState {
    level: i32,
    /// Points earned inside the current level.
    points: i32,
}

impl ExperienceState {
    fn total(&self) -> i32 {
        exp_for_level(self.level).saturating_add(self.points)
    }
}

pub struct LocalPlayer {
    id: PlayerId,
    name: String,
    address: SocketAddr,
    online: Mutex<bool>,
    experience: Mutex<ExperienceState>,
    messages: Mutex<Vec<String>>,
    popups: Mutex<Vec<String>>,
}

impl LocalPlayer {
    pub fn new(name: &str, address: SocketAddr) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.to_string(),
            address,
            online: Mutex::new(true),
            experience: Mutex::new(ExperienceState { level: 0, points: 0 }),
            messages: Mutex::new(Vec::new()),
            popups: Mutex::new(Vec::new()),
        }
    }

    /// Creates a player holding exactly `total_exp` experience points.
    pub fn with_total_exp(name: &str, address: SocketAddr, total_exp: i32) -> Self {
        let player = Self::new(name, address);
        player.add_points(total_exp);
        player
    }

    /// Creates a player at `level` with the given total experience, for
    /// setting up states that do not follow the vanilla curve.
    pub fn with_state(name: &str, address: SocketAddr, level: i32, total_exp: i32) -> Self {
        let player = Self::new(name, address);
        {
            let mut exp = player.experience.lock();
            exp.level = level.max(0);
            exp.points = total_exp - exp_for_level(exp.level);
        }
        player
    }

    pub fn set_online(&self, online: bool) {
        *self.online.lock() = online;
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn popups(&self) -> Vec<String> {
        self.popups.lock().clone()
    }

    fn ensure_online(&self) -> Result<(), ServerError> {
        if *self.online.lock() {
            Ok(())
        } else {
            Err(ServerError::PlayerOffline(self.name.clone()))
        }
    }

    fn add_points(&self, amount: i32) {
        let mut exp = self.experience.lock();
        exp.points = exp.points.saturating_add(amount).max(0);
        while exp.points >= exp_to_next_level(exp.level) {
            exp.points -= exp_to_next_level(exp.level);
            exp.level += 1;
        }
    }
}

impl Player for LocalPlayer {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn address(&self) -> SocketAddr {
        self.address
    }

    fn exp_level(&self) -> i32 {
        self.experience.lock().level
    }

    fn total_exp(&self) -> i32 {
        self.experience.lock().total()
    }

    fn exp_progress(&self) -> f32 {
        let exp = self.experience.lock();
        exp.points as f32 / exp_to_next_level(exp.level) as f32
    }

    fn set_exp_level(&self, level: i32) -> Result<(), ServerError> {
        self.ensure_online()?;
        if level < 0 {
            return Err(ServerError::Internal(format!("invalid level {}", level)));
        }
        let mut exp = self.experience.lock();
        let progress = exp.points as f32 / exp_to_next_level(exp.level) as f32;
        exp.level = level;
        exp.points = (progress * exp_to_next_level(level) as f32) as i32;
        Ok(())
    }

    fn set_exp_progress(&self, progress: f32) -> Result<(), ServerError> {
        self.ensure_online()?;
        if !(0.0..1.0).contains(&progress) {
            return Err(ServerError::Internal(format!("invalid progress {}", progress)));
        }
        let mut exp = self.experience.lock();
        exp.points = (progress * exp_to_next_level(exp.level) as f32) as i32;
        Ok(())
    }

    fn give_exp(&self, amount: i32) -> Result<(), ServerError> {
        self.ensure_online()?;
        self.add_points(amount);
        Ok(())
    }

    fn send_message(&self, message: &str) -> Result<(), ServerError> {
        self.ensure_online()?;
        self.messages.lock().push(message.to_string());
        Ok(())
    }

    fn send_popup(&self, message: &str) -> Result<(), ServerError> {
        self.ensure_online()?;
        self.popups.lock().push(message.to_string());
        Ok(())
    }
}
