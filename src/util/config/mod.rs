//! STOP configuration system
//!
//! User-level configuration for the VM limits and logging.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments (--verbose, --config)
//! 2. User-level (~/.config/stop/config.toml)
//! 3. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use stop::util::config::load_config;
//!
//! // Missing config file yields defaults
//! let config = load_config(None).unwrap();
//! assert_eq!(config.vm.stack_size, 1024);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::util::logger::LogLevel;
use crate::vm::{VMConfig, CALL_STACK_SIZE, STACK_SIZE};

/// Configuration for STOP
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StopConfig {
    /// VM settings
    #[serde(default)]
    pub vm: VmSection,
    /// Log settings
    #[serde(default)]
    pub log: LogSection,
}

/// VM configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VmSection {
    /// Operand stack capacity
    #[serde(default = "default_stack_size")]
    pub stack_size: usize,
    /// Call stack capacity
    #[serde(default = "default_call_stack_size")]
    pub call_stack_size: usize,
    /// Trace every executed instruction
    #[serde(default)]
    pub trace_execution: bool,
}

fn default_stack_size() -> usize {
    STACK_SIZE
}

fn default_call_stack_size() -> usize {
    CALL_STACK_SIZE
}

impl Default for VmSection {
    fn default() -> Self {
        Self {
            stack_size: STACK_SIZE,
            call_stack_size: CALL_STACK_SIZE,
            trace_execution: false,
        }
    }
}

impl From<&VmSection> for VMConfig {
    fn from(section: &VmSection) -> Self {
        Self {
            stack_size: section.stack_size,
            call_stack_size: section.call_stack_size,
            trace_execution: section.trace_execution,
        }
    }
}

impl StopConfig {
    /// Effective log level
    ///
    /// `--verbose` lowers the level to at least debug. Instruction tracing is
    /// emitted at trace level, so `trace_execution` lowers it to trace.
    pub fn log_level(
        &self,
        verbose: bool,
    ) -> LogLevel {
        if self.vm.trace_execution {
            return LogLevel::Trace;
        }
        if verbose {
            self.log.level.min(LogLevel::Debug)
        } else {
            self.log.level
        }
    }
}

/// Log configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LogSection {
    /// Log level used when --verbose is not given
    #[serde(default)]
    pub level: LogLevel,
}

/// Get the user config directory
pub fn get_config_dir() -> Option<PathBuf> {
    // Try XDG config directory on Unix
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("stop"));
    }

    // Fallback to ~/.config/stop
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("stop"));
    }

    // On Windows, try %APPDATA%
    if let Ok(appdata) = std::env::var("APPDATA") {
        return Some(PathBuf::from(appdata).join("stop"));
    }

    None
}

/// Get the user config file path (~/.config/stop/config.toml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load configuration
///
/// An explicit path must exist. Without one, the user-level file is used
/// when present and defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<StopConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match get_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(StopConfig::default()),
        },
    };

    let content = fs::read_to_string(&path).map_err(ConfigError::IoError)?;
    parse_config(&content)
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<StopConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::ParseError)
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Config parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
