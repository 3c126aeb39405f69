//! Tap-dance engine.
//!
//! The key processing layer counts taps and tells the engine three things:
//! a tap happened ([`TapDanceEngine::on_each_tap`]), the dance resolved
//! ([`TapDanceEngine::on_dance_finished`]), and the dance key was released
//! after resolving ([`TapDanceEngine::on_reset`]).
//!
//! # Resolution (for beginners)
//!
//! When the tapping term runs out (or another key interrupts), the dance is
//! classified into a [`DanceStep`] and the matching action is *pressed*.  It
//! stays pressed until reset, so holding a tap-dance key on its second tap can
//! hold down a modifier.  The keycode pressed at finish is remembered per
//! slot and released at reset, which keeps press/release balanced even if
//! the entry was rewritten in between.

use tracing::debug;

use crate::actions::KeyActions;
use crate::domain::TapDanceEntry;
use crate::keycode::Keycode;
use crate::storage::{Storage, StoreError, ViableStore};

/// Tap counter snapshot supplied by the key processing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DanceState {
    pub count: u8,
    /// The dance key is still held.
    pub pressed: bool,
    /// Another key was pressed during the dance.
    pub interrupted: bool,
}

/// How a finished dance is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanceStep {
    SingleTap,
    SingleHold,
    DoubleTap,
    DoubleHold,
    /// Two taps where the second was interrupted: two separate taps.
    DoubleSingleTap,
    MoreTaps,
}

impl DanceStep {
    pub fn resolve(state: &DanceState) -> Self {
        match state.count {
            1 if state.interrupted || !state.pressed => DanceStep::SingleTap,
            1 => DanceStep::SingleHold,
            2 if state.interrupted => DanceStep::DoubleSingleTap,
            2 if state.pressed => DanceStep::DoubleHold,
            2 => DanceStep::DoubleTap,
            _ => DanceStep::MoreTaps,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct DanceSlot {
    step: Option<DanceStep>,
    held: Option<Keycode>,
}

fn some(kc: Keycode) -> Option<Keycode> {
    (!kc.is_none()).then_some(kc)
}

/// Cached tap-dance table plus per-slot resolution state.
#[derive(Debug, Default)]
pub struct TapDanceEngine {
    entries: Vec<TapDanceEntry>,
    slots: Vec<DanceSlot>,
}

impl TapDanceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-reads the table.  In-flight dances keep their held keycode.
    pub fn reload<S: Storage>(&mut self, store: &ViableStore<S>) -> Result<(), StoreError> {
        self.entries = store.entries::<TapDanceEntry>()?;
        self.slots.resize(self.entries.len(), DanceSlot::default());
        debug!(
            enabled = self.entries.iter().filter(|e| e.custom_term.enabled()).count(),
            "tap dance table reloaded"
        );
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, index: usize) -> Option<&TapDanceEntry> {
        self.entries.get(index)
    }

    fn enabled(&self, index: usize) -> Option<TapDanceEntry> {
        self.entries
            .get(index)
            .copied()
            .filter(|e| e.custom_term.enabled())
    }

    /// The per-entry term, if the entry is enabled and sets one.
    pub fn custom_term(&self, index: usize) -> Option<u16> {
        self.enabled(index)
            .map(|e| e.custom_term.term_ms())
            .filter(|&t| t > 0)
    }

    /// The step cached by the last finish, cleared by reset.
    pub fn pending_step(&self, index: usize) -> Option<DanceStep> {
        self.slots.get(index).and_then(|s| s.step)
    }

    /// Called on every tap.  A third tap emits `on_tap` three times, and every
    /// tap after that emits one more.
    pub fn on_each_tap(&self, index: usize, state: &DanceState, actions: &mut dyn KeyActions) {
        let Some(entry) = self.enabled(index) else {
            return;
        };
        let Some(kc) = some(entry.on_tap) else {
            return;
        };
        match state.count {
            3 => {
                for _ in 0..3 {
                    actions.tap(kc);
                }
            }
            n if n > 3 => actions.tap(kc),
            _ => {}
        }
    }

    /// Called once when the dance resolves.  Presses the branch's action and
    /// remembers it for [`Self::on_reset`].
    pub fn on_dance_finished(
        &mut self,
        index: usize,
        state: &DanceState,
        actions: &mut dyn KeyActions,
    ) {
        let Some(entry) = self.enabled(index) else {
            return;
        };
        let step = DanceStep::resolve(state);
        let on_tap = some(entry.on_tap);
        let on_hold = some(entry.on_hold);

        let held = match step {
            DanceStep::SingleTap => on_tap,
            DanceStep::SingleHold => on_hold.or(on_tap),
            DanceStep::DoubleTap => match (some(entry.on_double_tap), on_tap) {
                (Some(kc), _) => Some(kc),
                (None, Some(tap)) => {
                    actions.tap(tap);
                    Some(tap)
                }
                (None, None) => None,
            },
            DanceStep::DoubleHold => match (some(entry.on_tap_hold), on_tap) {
                (Some(kc), _) => Some(kc),
                (None, Some(tap)) => {
                    actions.tap(tap);
                    on_hold.or(Some(tap))
                }
                (None, None) => on_hold,
            },
            DanceStep::DoubleSingleTap => {
                if let Some(tap) = on_tap {
                    actions.tap(tap);
                }
                on_tap
            }
            DanceStep::MoreTaps => None,
        };

        if let Some(kc) = held {
            actions.press(kc);
        }
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = DanceSlot {
                step: Some(step),
                held,
            };
        }
        debug!(index, ?step, "tap dance finished");
    }

    /// Called when the dance ends.  Releases whatever finish pressed.
    pub fn on_reset(&mut self, index: usize, actions: &mut dyn KeyActions) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        let finished = std::mem::take(slot);
        if let Some(kc) = finished.held {
            actions.release(kc);
        }
    }
}
