//! TOML-based configuration for the host emulator.
//!
//! The file has three sections:
//!
//! ```toml
//! [host]
//! log_level = "info"
//! packet_size = 32
//!
//! [storage]
//! store_path = "viable.bin"
//! definition_path = "keyboard.json.xz"
//!
//! [viable]
//! keyboard_uid = [1, 2, 3, 4, 5, 6, 7, 8]
//! build_stamp = "2026-10-19-08:30:00"
//!
//! [viable.capacities]
//! combo = 32
//! ```
//!
//! `[viable]` is the core's [`ViableConfig`], the same fields a firmware build
//! would fix at compile time.
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, so an empty
//! file (or none at all) yields a working emulator.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use viable_core::ViableConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The packet size cannot carry a wrapped Viable header.
    #[error("packet_size {0} is too small (minimum {MIN_PACKET_SIZE})")]
    PacketSize(usize),
}

/// Smallest packet that still fits a wrapped bootstrap reply.
pub const MIN_PACKET_SIZE: usize = 32;

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level host configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HostConfig {
    #[serde(default)]
    pub host: HostSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub viable: ViableConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostSection {
    /// `tracing` log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Size of one raw-HID packet.  Shorter input lines are zero-padded.
    #[serde(default = "default_packet_size")]
    pub packet_size: usize,
}

/// Where the persistent region and the keyboard definition live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSection {
    /// File backing the persistent region.  Created on first run.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Blob served by the definition commands.  None serves an empty one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_path: Option<PathBuf>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_packet_size() -> usize {
    32
}
fn default_store_path() -> PathBuf {
    PathBuf::from("viable.bin")
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            packet_size: default_packet_size(),
        }
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            definition_path: None,
        }
    }
}

impl HostConfig {
    /// Parses TOML text and checks the host section.
    ///
    /// The `[viable]` section is validated later, when the device is built.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML, [`ConfigError::PacketSize`]
    /// for a packet too small to carry a wrapped reply.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: HostConfig = toml::from_str(content)?;
        if cfg.host.packet_size < MIN_PACKET_SIZE {
            return Err(ConfigError::PacketSize(cfg.host.packet_size));
        }
        Ok(cfg)
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Loads `HostConfig` from `path`, returning `HostConfig::default()` if the
/// file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<HostConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => HostConfig::from_toml(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HostConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
