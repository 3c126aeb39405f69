//! Build configuration of a Viable device.
//!
//! On a keyboard these values are compile-time constants; here they are a
//! plain serde struct so the host emulator can load them from TOML.  Every
//! field has a default, so an empty `[viable]` table is a valid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::layout::MAX_FRAGMENT_INSTANCES;
use crate::storage::{BuildStamp, Capacities, MagicError};

/// Errors from validating a [`ViableConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ViableConfigError {
    #[error("invalid build stamp: {0}")]
    BuildStamp(#[from] MagicError),

    #[error("fragment instance count {0} exceeds the maximum of {MAX_FRAGMENT_INSTANCES}")]
    TooManyFragments(u8),
}

/// Top-level device configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViableConfig {
    /// Entry counts of the variable-length tables.
    #[serde(default)]
    pub capacities: Capacities,
    /// Number of fragment instances on this keyboard (0 to 21).
    #[serde(default)]
    pub fragment_instances: u8,
    /// Opaque 8-byte keyboard identifier reported by get-info.
    #[serde(default)]
    pub keyboard_uid: [u8; 8],
    /// Lifetime of a client session id.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u16,
    /// Firmware build time, `YYYY-MM-DD-HH:MM:SS`.  Changing it invalidates
    /// the persistent region on next init.
    #[serde(default = "default_build_stamp")]
    pub build_stamp: String,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub defaults: SettingsDefaults,
}

impl Default for ViableConfig {
    fn default() -> Self {
        Self {
            capacities: Capacities::default(),
            fragment_instances: 0,
            keyboard_uid: [0; 8],
            session_ttl_secs: default_session_ttl_secs(),
            build_stamp: default_build_stamp(),
            features: FeatureFlags::default(),
            defaults: SettingsDefaults::default(),
        }
    }
}

impl ViableConfig {
    /// Checks cross-field constraints and parses the build stamp.
    ///
    /// # Errors
    ///
    /// Returns [`ViableConfigError`] for a malformed stamp or too many
    /// fragment instances.
    pub fn validate(&self) -> Result<BuildStamp, ViableConfigError> {
        if self.fragment_instances as usize > MAX_FRAGMENT_INSTANCES {
            return Err(ViableConfigError::TooManyFragments(self.fragment_instances));
        }
        Ok(BuildStamp::parse(&self.build_stamp)?)
    }
}

/// Optional firmware features that change what the device reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureFlags {
    #[serde(default)]
    pub caps_word: bool,
    #[serde(default)]
    pub layer_lock: bool,
    #[serde(default = "default_true")]
    pub one_shot: bool,
    /// Mouse keys; when off, QSIDs 9 to 17 are not registered.
    #[serde(default)]
    pub mouse_keys: bool,
    /// NKRO support; controls the NKRO bit after a settings reset.
    #[serde(default = "default_true")]
    pub nkro: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            caps_word: false,
            layer_lock: false,
            one_shot: true,
            mouse_keys: false,
            nkro: true,
        }
    }
}

impl FeatureFlags {
    pub const CAPS_WORD: u8 = 1 << 0;
    pub const LAYER_LOCK: u8 = 1 << 1;
    pub const ONE_SHOT: u8 = 1 << 2;

    /// The feature byte of the get-info reply.
    pub fn info_byte(&self) -> u8 {
        let mut flags = 0;
        if self.caps_word {
            flags |= Self::CAPS_WORD;
        }
        if self.layer_lock {
            flags |= Self::LAYER_LOCK;
        }
        if self.one_shot {
            flags |= Self::ONE_SHOT;
        }
        flags
    }
}

/// Factory values of the QMK settings record and the one-shot table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsDefaults {
    #[serde(default = "default_tapping_term")]
    pub tapping_term: u16,
    #[serde(default = "default_combo_term")]
    pub combo_term: u16,
    #[serde(default = "default_oneshot_timeout")]
    pub oneshot_timeout: u16,
    #[serde(default = "default_oneshot_tap_toggle")]
    pub oneshot_tap_toggle: u8,
    #[serde(default = "default_auto_shift_timeout")]
    pub auto_shift_timeout: u16,
    #[serde(default = "default_tap_code_delay")]
    pub tap_code_delay: u16,
    #[serde(default = "default_tap_hold_caps_delay")]
    pub tap_hold_caps_delay: u16,
    #[serde(default = "default_tapping_toggle")]
    pub tapping_toggle: u8,
    /// Defaults to `tapping_term` when absent.
    #[serde(default)]
    pub quick_tap_term: Option<u16>,
    #[serde(default = "default_leader_timeout")]
    pub leader_timeout: u16,
    #[serde(default)]
    pub permissive_hold: bool,
    #[serde(default)]
    pub hold_on_other_key: bool,
    #[serde(default)]
    pub retro_tapping: bool,
    #[serde(default)]
    pub chordal_hold: bool,
    #[serde(default)]
    pub mouse_keys: MouseKeyDefaults,
}

impl Default for SettingsDefaults {
    fn default() -> Self {
        Self {
            tapping_term: default_tapping_term(),
            combo_term: default_combo_term(),
            oneshot_timeout: default_oneshot_timeout(),
            oneshot_tap_toggle: default_oneshot_tap_toggle(),
            auto_shift_timeout: default_auto_shift_timeout(),
            tap_code_delay: default_tap_code_delay(),
            tap_hold_caps_delay: default_tap_hold_caps_delay(),
            tapping_toggle: default_tapping_toggle(),
            quick_tap_term: None,
            leader_timeout: default_leader_timeout(),
            permissive_hold: false,
            hold_on_other_key: false,
            retro_tapping: false,
            chordal_hold: false,
            mouse_keys: MouseKeyDefaults::default(),
        }
    }
}

/// Mouse-key tuning defaults (QMK's stock values).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MouseKeyDefaults {
    pub delay: u16,
    pub interval: u16,
    pub move_delta: u16,
    pub max_speed: u16,
    pub time_to_max: u16,
    pub wheel_delay: u16,
    pub wheel_interval: u16,
    pub wheel_max_speed: u16,
    pub wheel_time_to_max: u16,
}

impl Default for MouseKeyDefaults {
    fn default() -> Self {
        Self {
            delay: 10,
            interval: 16,
            move_delta: 8,
            max_speed: 10,
            time_to_max: 30,
            wheel_delay: 10,
            wheel_interval: 80,
            wheel_max_speed: 8,
            wheel_time_to_max: 40,
        }
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

pub const DEFAULT_BUILD_STAMP: &str = "2025-01-01-00:00:00";

fn default_true() -> bool {
    true
}
fn default_session_ttl_secs() -> u16 {
    120
}
fn default_build_stamp() -> String {
    DEFAULT_BUILD_STAMP.to_string()
}
fn default_tapping_term() -> u16 {
    200
}
fn default_combo_term() -> u16 {
    50
}
fn default_oneshot_timeout() -> u16 {
    5000
}
fn default_oneshot_tap_toggle() -> u8 {
    5
}
fn default_auto_shift_timeout() -> u16 {
    175
}
fn default_tap_code_delay() -> u16 {
    10
}
fn default_tap_hold_caps_delay() -> u16 {
    80
}
fn default_tapping_toggle() -> u8 {
    5
}
fn default_leader_timeout() -> u16 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = ViableConfig::default();
        let stamp = config.validate().unwrap();
        assert_eq!(stamp.to_string(), DEFAULT_BUILD_STAMP);
    }

    #[test]
    fn test_validate_rejects_too_many_fragments() {
        let config = ViableConfig {
            fragment_instances: 22,
            ..ViableConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ViableConfigError::TooManyFragments(22)
        );
    }

    #[test]
    fn test_info_byte_sets_enabled_features() {
        let flags = FeatureFlags {
            caps_word: true,
            layer_lock: false,
            one_shot: true,
            ..FeatureFlags::default()
        };
        assert_eq!(flags.info_byte(), FeatureFlags::CAPS_WORD | FeatureFlags::ONE_SHOT);
    }

    #[test]
    fn test_defaults_match_firmware_values() {
        let d = SettingsDefaults::default();
        assert_eq!(d.tapping_term, 200);
        assert_eq!(d.combo_term, 50);
        assert_eq!(d.oneshot_timeout, 5000);
        assert_eq!(d.oneshot_tap_toggle, 5);
        assert_eq!(d.auto_shift_timeout, 175);
        assert_eq!(d.leader_timeout, 300);
        assert_eq!(d.quick_tap_term, None);
    }
}
