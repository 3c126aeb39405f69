//! Tap-hold timing resolution.
//!
//! Every timing value and tap-hold behavior is resolved through the same
//! chain, highest priority first:
//!
//! 1. the keyboard's [`BehaviorOverrides`] (returns `None` to defer),
//! 2. a per-entry custom term, where the table has one,
//! 3. the global value from the settings record.

use crate::domain::ComboEntry;
use crate::keycode::Keycode;
use crate::settings::QmkSettings;

/// Keyboard-specific overrides consulted before any stored setting.
///
/// Every method defaults to `None`, meaning "use the stored setting".  A
/// `Some(0)` from a term method also defers, since a zero-length term is
/// never meaningful.
pub trait BehaviorOverrides {
    fn tapping_term(&self, _keycode: Keycode) -> Option<u16> {
        None
    }

    fn combo_term(&self, _index: usize, _combo: &ComboEntry) -> Option<u16> {
        None
    }

    fn quick_tap_term(&self, _keycode: Keycode) -> Option<u16> {
        None
    }

    fn permissive_hold(&self, _keycode: Keycode) -> Option<bool> {
        None
    }

    fn hold_on_other_key(&self, _keycode: Keycode) -> Option<bool> {
        None
    }

    fn retro_tapping(&self, _keycode: Keycode) -> Option<bool> {
        None
    }

    fn chordal_hold(&self, _keycode: Keycode) -> Option<bool> {
        None
    }
}

/// Defers everything to the stored settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl BehaviorOverrides for NoOverrides {}

fn positive(term: Option<u16>) -> Option<u16> {
    term.filter(|&t| t > 0)
}

/// Resolves a term: override, then per-entry custom term, then global.
pub fn resolve_term(override_term: Option<u16>, custom_term: Option<u16>, global: u16) -> u16 {
    positive(override_term)
        .or(positive(custom_term))
        .unwrap_or(global)
}

/// Resolves a tap-hold flag: override, then the stored bit.
pub fn resolve_flag(override_flag: Option<bool>, stored: bool) -> bool {
    override_flag.unwrap_or(stored)
}

/// The tap-hold behaviors derived from settings plus overrides.
pub struct TapHold<'a> {
    pub settings: &'a QmkSettings,
    pub overrides: &'a dyn BehaviorOverrides,
}

impl TapHold<'_> {
    pub fn quick_tap_term(&self, keycode: Keycode) -> u16 {
        resolve_term(
            self.overrides.quick_tap_term(keycode),
            None,
            self.settings.quick_tap_term,
        )
    }

    pub fn permissive_hold(&self, keycode: Keycode) -> bool {
        resolve_flag(
            self.overrides.permissive_hold(keycode),
            self.settings.permissive_hold(),
        )
    }

    pub fn hold_on_other_key(&self, keycode: Keycode) -> bool {
        resolve_flag(
            self.overrides.hold_on_other_key(keycode),
            self.settings.hold_on_other_key(),
        )
    }

    pub fn retro_tapping(&self, keycode: Keycode) -> bool {
        resolve_flag(
            self.overrides.retro_tapping(keycode),
            self.settings.retro_tapping(),
        )
    }

    pub fn chordal_hold(&self, keycode: Keycode) -> bool {
        resolve_flag(
            self.overrides.chordal_hold(keycode),
            self.settings.chordal_hold(),
        )
    }
}
