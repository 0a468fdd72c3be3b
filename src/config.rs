//! Frontend configuration.
//!
//! Everything here is presentation policy — window geometry, pacing mode,
//! whether the debug overlay starts enabled. Timing contracts (tick
//! period, sample rate, buffer size) are constants, not configuration:
//! changing them would alter emulation determinism.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{FrontendError, Result};

/// Default window width in pixels.
pub const DEFAULT_WIDTH: usize = 330;
/// Default window height in pixels.
pub const DEFAULT_HEIGHT: usize = 410;

/// How the scheduler waits out the remainder of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacingMode {
    /// Busy-wait until the deadline: minimal jitter, one core spent.
    Spin,
    /// Sleep until the deadline: cheap, at the scheduler's mercy.
    Sleep,
}

/// Run-time configuration, optionally loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window width in pixels.
    pub window_width: usize,
    /// Window height in pixels.
    pub window_height: usize,
    /// Tick pacing strategy.
    pub pacing: PacingMode,
    /// Start with the audio debug overlay enabled.
    pub debug_overlay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window_width: DEFAULT_WIDTH,
            window_height: DEFAULT_HEIGHT,
            pacing: PacingMode::Spin,
            debug_overlay: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file; absent fields keep their
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(file)
            .map_err(|e| FrontendError::Config(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.window_width, DEFAULT_WIDTH);
        assert_eq!(config.window_height, DEFAULT_HEIGHT);
        assert_eq!(config.pacing, PacingMode::Spin);
        assert!(!config.debug_overlay);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"pacing": "sleep"}"#).unwrap();
        assert_eq!(config.pacing, PacingMode::Sleep);
        assert_eq!(config.window_width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_round_trip() {
        let mut config = Config::default();
        config.window_width = 660;
        config.debug_overlay = true;
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.window_width, 660);
        assert!(back.debug_overlay);
        assert_eq!(back.pacing, PacingMode::Spin);
    }
}
