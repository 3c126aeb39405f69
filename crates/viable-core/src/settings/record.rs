//! The 42-byte QMK settings record.
//!
//! Layout (little-endian, packed):
//! ```text
//!  0 auto_shift_timeout:2        22 combo_term:2
//!  2 osk_timeout:2               24 tapping_term:2
//!  4 mousekey_delay:2            26 grave_esc_override:1
//!  6 mousekey_interval:2         27 auto_shift:1
//!  8 mousekey_move_delta:2       28 osk_tap_toggle:1
//! 10 mousekey_max_speed:2        29 tapping_v2:1
//! 12 mousekey_time_to_max:2      30 tap_code_delay:2
//! 14 mousekey_wheel_delay:2      32 tap_hold_caps_delay:2
//! 16 mousekey_wheel_interval:2   34 tapping_toggle:1
//! 18 mousekey_wheel_max_speed:2  35 leader_flags:1
//! 20 mousekey_wheel_time_to_max:2 36 quick_tap_term:2
//!                                38 flow_tap_term:2
//!                                40 leader_timeout:2
//! ```

use serde::{Deserialize, Serialize};

use crate::config::SettingsDefaults;
use crate::domain::entries::{read_u16, write_u16};
use crate::storage::layout::QMK_SETTINGS_SIZE;

/// Byte offsets of every field in the record.
pub mod offsets {
    pub const AUTO_SHIFT_TIMEOUT: u8 = 0;
    pub const OSK_TIMEOUT: u8 = 2;
    pub const MOUSEKEY_DELAY: u8 = 4;
    pub const MOUSEKEY_INTERVAL: u8 = 6;
    pub const MOUSEKEY_MOVE_DELTA: u8 = 8;
    pub const MOUSEKEY_MAX_SPEED: u8 = 10;
    pub const MOUSEKEY_TIME_TO_MAX: u8 = 12;
    pub const MOUSEKEY_WHEEL_DELAY: u8 = 14;
    pub const MOUSEKEY_WHEEL_INTERVAL: u8 = 16;
    pub const MOUSEKEY_WHEEL_MAX_SPEED: u8 = 18;
    pub const MOUSEKEY_WHEEL_TIME_TO_MAX: u8 = 20;
    pub const COMBO_TERM: u8 = 22;
    pub const TAPPING_TERM: u8 = 24;
    pub const GRAVE_ESC_OVERRIDE: u8 = 26;
    pub const AUTO_SHIFT: u8 = 27;
    pub const OSK_TAP_TOGGLE: u8 = 28;
    pub const TAPPING_V2: u8 = 29;
    pub const TAP_CODE_DELAY: u8 = 30;
    pub const TAP_HOLD_CAPS_DELAY: u8 = 32;
    pub const TAPPING_TOGGLE: u8 = 34;
    pub const LEADER_FLAGS: u8 = 35;
    pub const QUICK_TAP_TERM: u8 = 36;
    pub const FLOW_TAP_TERM: u8 = 38;
    pub const LEADER_TIMEOUT: u8 = 40;
}

/// Bits of the `tapping_v2` byte.
pub mod tapping_bits {
    pub const PERMISSIVE_HOLD: u8 = 0;
    pub const HOLD_ON_OTHER_KEY: u8 = 1;
    pub const RETRO_TAPPING: u8 = 2;
    pub const CHORDAL_HOLD: u8 = 3;
}

/// Bits of the `leader_flags` byte.
pub mod leader_bits {
    pub const PER_KEY_TIMING: u8 = 0;
}

/// Decoded QMK settings record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QmkSettings {
    pub auto_shift_timeout: u16,
    pub osk_timeout: u16,
    pub mousekey_delay: u16,
    pub mousekey_interval: u16,
    pub mousekey_move_delta: u16,
    pub mousekey_max_speed: u16,
    pub mousekey_time_to_max: u16,
    pub mousekey_wheel_delay: u16,
    pub mousekey_wheel_interval: u16,
    pub mousekey_wheel_max_speed: u16,
    pub mousekey_wheel_time_to_max: u16,
    pub combo_term: u16,
    pub tapping_term: u16,
    pub grave_esc_override: u8,
    pub auto_shift: u8,
    pub osk_tap_toggle: u8,
    pub tapping_v2: u8,
    pub tap_code_delay: u16,
    pub tap_hold_caps_delay: u16,
    pub tapping_toggle: u8,
    pub leader_flags: u8,
    pub quick_tap_term: u16,
    pub flow_tap_term: u16,
    pub leader_timeout: u16,
}

impl QmkSettings {
    /// Factory record.  Mouse-key fields stay zero unless `mouse_keys` is set.
    pub fn factory(defaults: &SettingsDefaults, mouse_keys: bool) -> Self {
        let mut tapping_v2 = 0u8;
        for (enabled, bit) in [
            (defaults.permissive_hold, tapping_bits::PERMISSIVE_HOLD),
            (defaults.hold_on_other_key, tapping_bits::HOLD_ON_OTHER_KEY),
            (defaults.retro_tapping, tapping_bits::RETRO_TAPPING),
            (defaults.chordal_hold, tapping_bits::CHORDAL_HOLD),
        ] {
            if enabled {
                tapping_v2 |= 1 << bit;
            }
        }

        let mut settings = Self {
            auto_shift_timeout: defaults.auto_shift_timeout,
            osk_timeout: defaults.oneshot_timeout,
            combo_term: defaults.combo_term,
            tapping_term: defaults.tapping_term,
            osk_tap_toggle: defaults.oneshot_tap_toggle,
            tapping_v2,
            tap_code_delay: defaults.tap_code_delay,
            tap_hold_caps_delay: defaults.tap_hold_caps_delay,
            tapping_toggle: defaults.tapping_toggle,
            quick_tap_term: defaults.quick_tap_term.unwrap_or(defaults.tapping_term),
            leader_timeout: defaults.leader_timeout,
            ..Self::default()
        };

        if mouse_keys {
            let mk = &defaults.mouse_keys;
            settings.mousekey_delay = mk.delay;
            settings.mousekey_interval = mk.interval;
            settings.mousekey_move_delta = mk.move_delta;
            settings.mousekey_max_speed = mk.max_speed;
            settings.mousekey_time_to_max = mk.time_to_max;
            settings.mousekey_wheel_delay = mk.wheel_delay;
            settings.mousekey_wheel_interval = mk.wheel_interval;
            settings.mousekey_wheel_max_speed = mk.wheel_max_speed;
            settings.mousekey_wheel_time_to_max = mk.wheel_time_to_max;
        }
        settings
    }

    pub fn from_bytes(b: &[u8; QMK_SETTINGS_SIZE]) -> Self {
        use offsets::*;
        let u16_at = |off: u8| read_u16(b, off as usize);
        let u8_at = |off: u8| b[off as usize];
        Self {
            auto_shift_timeout: u16_at(AUTO_SHIFT_TIMEOUT),
            osk_timeout: u16_at(OSK_TIMEOUT),
            mousekey_delay: u16_at(MOUSEKEY_DELAY),
            mousekey_interval: u16_at(MOUSEKEY_INTERVAL),
            mousekey_move_delta: u16_at(MOUSEKEY_MOVE_DELTA),
            mousekey_max_speed: u16_at(MOUSEKEY_MAX_SPEED),
            mousekey_time_to_max: u16_at(MOUSEKEY_TIME_TO_MAX),
            mousekey_wheel_delay: u16_at(MOUSEKEY_WHEEL_DELAY),
            mousekey_wheel_interval: u16_at(MOUSEKEY_WHEEL_INTERVAL),
            mousekey_wheel_max_speed: u16_at(MOUSEKEY_WHEEL_MAX_SPEED),
            mousekey_wheel_time_to_max: u16_at(MOUSEKEY_WHEEL_TIME_TO_MAX),
            combo_term: u16_at(COMBO_TERM),
            tapping_term: u16_at(TAPPING_TERM),
            grave_esc_override: u8_at(GRAVE_ESC_OVERRIDE),
            auto_shift: u8_at(AUTO_SHIFT),
            osk_tap_toggle: u8_at(OSK_TAP_TOGGLE),
            tapping_v2: u8_at(TAPPING_V2),
            tap_code_delay: u16_at(TAP_CODE_DELAY),
            tap_hold_caps_delay: u16_at(TAP_HOLD_CAPS_DELAY),
            tapping_toggle: u8_at(TAPPING_TOGGLE),
            leader_flags: u8_at(LEADER_FLAGS),
            quick_tap_term: u16_at(QUICK_TAP_TERM),
            flow_tap_term: u16_at(FLOW_TAP_TERM),
            leader_timeout: u16_at(LEADER_TIMEOUT),
        }
    }

    pub fn to_bytes(&self) -> [u8; QMK_SETTINGS_SIZE] {
        use offsets::*;
        let mut b = [0u8; QMK_SETTINGS_SIZE];
        for (off, value) in [
            (AUTO_SHIFT_TIMEOUT, self.auto_shift_timeout),
            (OSK_TIMEOUT, self.osk_timeout),
            (MOUSEKEY_DELAY, self.mousekey_delay),
            (MOUSEKEY_INTERVAL, self.mousekey_interval),
            (MOUSEKEY_MOVE_DELTA, self.mousekey_move_delta),
            (MOUSEKEY_MAX_SPEED, self.mousekey_max_speed),
            (MOUSEKEY_TIME_TO_MAX, self.mousekey_time_to_max),
            (MOUSEKEY_WHEEL_DELAY, self.mousekey_wheel_delay),
            (MOUSEKEY_WHEEL_INTERVAL, self.mousekey_wheel_interval),
            (MOUSEKEY_WHEEL_MAX_SPEED, self.mousekey_wheel_max_speed),
            (MOUSEKEY_WHEEL_TIME_TO_MAX, self.mousekey_wheel_time_to_max),
            (COMBO_TERM, self.combo_term),
            (TAPPING_TERM, self.tapping_term),
            (TAP_CODE_DELAY, self.tap_code_delay),
            (TAP_HOLD_CAPS_DELAY, self.tap_hold_caps_delay),
            (QUICK_TAP_TERM, self.quick_tap_term),
            (FLOW_TAP_TERM, self.flow_tap_term),
            (LEADER_TIMEOUT, self.leader_timeout),
        ] {
            write_u16(&mut b, off as usize, value);
        }
        for (off, value) in [
            (GRAVE_ESC_OVERRIDE, self.grave_esc_override),
            (AUTO_SHIFT, self.auto_shift),
            (OSK_TAP_TOGGLE, self.osk_tap_toggle),
            (TAPPING_V2, self.tapping_v2),
            (TAPPING_TOGGLE, self.tapping_toggle),
            (LEADER_FLAGS, self.leader_flags),
        ] {
            b[off as usize] = value;
        }
        b
    }

    fn tapping_bit(&self, bit: u8) -> bool {
        self.tapping_v2 & (1 << bit) != 0
    }

    pub fn permissive_hold(&self) -> bool {
        self.tapping_bit(tapping_bits::PERMISSIVE_HOLD)
    }

    pub fn hold_on_other_key(&self) -> bool {
        self.tapping_bit(tapping_bits::HOLD_ON_OTHER_KEY)
    }

    pub fn retro_tapping(&self) -> bool {
        self.tapping_bit(tapping_bits::RETRO_TAPPING)
    }

    pub fn chordal_hold(&self) -> bool {
        self.tapping_bit(tapping_bits::CHORDAL_HOLD)
    }

    pub fn leader_per_key_timing(&self) -> bool {
        self.leader_flags & (1 << leader_bits::PER_KEY_TIMING) != 0
    }
}
