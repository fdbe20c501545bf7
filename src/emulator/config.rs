// Configuration management
//
// Handles emulator configuration, settings persistence, and speed control.

use crate::debug::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default configuration file path
pub const CONFIG_FILE: &str = "nesemu.toml";

/// Errors that can occur while loading or saving the configuration
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error
    Io(io::Error),

    /// The file is not valid TOML for `EmulatorConfig`
    Parse(toml::de::Error),

    /// The configuration could not be serialized
    Serialize(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid configuration: {}", e),
            ConfigError::Serialize(e) => write!(f, "Failed to serialize configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

/// Emulator configuration
///
/// Stores all user-configurable settings for the emulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Emulation settings
    pub emulation: EmulationConfig,

    /// Video settings
    pub video: VideoConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Emulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulationConfig {
    /// Speed multiplier applied to `run_milliseconds`
    pub speed: SpeedMode,

    /// Log a nestest-format line before every instruction
    pub trace: bool,
}

/// Video configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Screenshot directory
    pub screenshot_directory: PathBuf,

    /// Include timestamp in screenshot file names
    pub timestamped_screenshots: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        VideoConfig {
            screenshot_directory: PathBuf::from("screenshots"),
            timestamped_screenshots: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level written
    pub level: LogLevel,

    /// Optional file receiving every log entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Entries kept in the in-memory trace buffer (0 = unlimited)
    pub buffer_size: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            file: None,
            buffer_size: 10000,
        }
    }
}

/// Speed mode for emulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedMode {
    /// Normal speed (1x)
    #[default]
    Normal,

    /// Fast forward 2x
    FastForward2x,

    /// Fast forward 4x
    FastForward4x,

    /// Slow motion (0.5x)
    SlowMotion,

    /// Paused (0x)
    Paused,
}

impl SpeedMode {
    /// Get the speed multiplier
    ///
    /// # Returns
    ///
    /// The speed multiplier (1.0 = normal speed)
    pub fn multiplier(self) -> f64 {
        match self {
            SpeedMode::Normal => 1.0,
            SpeedMode::FastForward2x => 2.0,
            SpeedMode::FastForward4x => 4.0,
            SpeedMode::SlowMotion => 0.5,
            SpeedMode::Paused => 0.0,
        }
    }
}

impl EmulatorConfig {
    /// Load configuration from `path` or create the default
    ///
    /// When the file is missing or invalid, the default configuration is
    /// returned and written to `path` (write failures are logged, not
    /// returned).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nesemu::emulator::EmulatorConfig;
    ///
    /// let config = EmulatorConfig::load_or_default("nesemu.toml");
    /// ```
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("using default configuration ({}): {}", path.display(), e);
                let config = Self::default();
                if let Err(e) = config.save(path) {
                    log::warn!("could not write {}: {}", path.display(), e);
                }
                config
            }
        }
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
