//! Shared identifier and formatting types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connected player.
///
/// The host assigns one per session. Plugins should treat it as opaque and
/// use it only for comparisons, map keys and logging.
///
/// ```rust
/// use bedrock_event_system::PlayerId;
///
/// let player_id = PlayerId::new();
/// println!("Player ID: {}", player_id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Creates a new random player ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a player ID from its hyphenated string form.
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bedrock text formatting codes.
///
/// Each constant is the section sign followed by the format character, ready
/// to be concatenated into chat, popup and broadcast text.
pub struct ColorFormat;

impl ColorFormat {
    pub const BLACK: &'static str = "\u{a7}0";
    pub const DARK_BLUE: &'static str = "\u{a7}1";
    pub const DARK_GREEN: &'static str = "\u{a7}2";
    pub const DARK_AQUA: &'static str = "\u{a7}3";
    pub const DARK_RED: &'static str = "\u{a7}4";
    pub const DARK_PURPLE: &'static str = "\u{a7}5";
    pub const GOLD: &'static str = "\u{a7}6";
    pub const GRAY: &'static str = "\u{a7}7";
    pub const DARK_GRAY: &'static str = "\u{a7}8";
    pub const BLUE: &'static str = "\u{a7}9";
    pub const GREEN: &'static str = "\u{a7}a";
    pub const AQUA: &'static str = "\u{a7}b";
    pub const RED: &'static str = "\u{a7}c";
    pub const LIGHT_PURPLE: &'static str = "\u{a7}d";
    pub const YELLOW: &'static str = "\u{a7}e";
    pub const WHITE: &'static str = "\u{a7}f";
    pub const BOLD: &'static str = "\u{a7}l";
    pub const ITALIC: &'static str = "\u{a7}o";
    pub const RESET: &'static str = "\u{a7}r";

    /// Removes every formatting code from `text`.
    pub fn strip(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\u{a7}' {
                chars.next();
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// Severity for messages routed through [`crate::ServerContext::log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Critical errors that may affect system stability
    Error,
    /// Warning conditions that should be investigated
    Warn,
    /// General informational messages
    Info,
    /// Detailed information for debugging
    Debug,
    /// Very detailed trace information
    Trace,
}
