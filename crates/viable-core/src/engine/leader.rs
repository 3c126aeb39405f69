//! Leader key engine.
//!
//! After the leader key, up to five keys are collected.  The session ends
//! when the leader timeout passes or the fifth key arrives; the collected
//! sequence is then compared against the leader table and the first enabled
//! entry with exactly that sequence fires its output as a tap.
//!
//! Entries are tried in declaration order and the first exact match wins.
//! A shorter entry never shadows a longer one (lengths must be equal), but
//! two entries with the same sequence resolve to the earlier slot.

use tracing::debug;

use crate::actions::KeyActions;
use crate::domain::{LeaderEntry, LEADER_SEQUENCE_LEN};
use crate::keycode::Keycode;
use crate::settings::QmkSettings;
use crate::storage::{Storage, StoreError, ViableStore};

/// An in-progress leader sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderSession {
    keys: Vec<Keycode>,
    timer: u32,
}

impl LeaderSession {
    pub fn keys(&self) -> &[Keycode] {
        &self.keys
    }
}

#[derive(Debug)]
pub struct LeaderEngine {
    entries: Vec<LeaderEntry>,
    timeout_ms: u16,
    per_key_timing: bool,
    session: Option<LeaderSession>,
}

impl Default for LeaderEngine {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            timeout_ms: 300,
            per_key_timing: false,
            session: None,
        }
    }
}

impl LeaderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-reads the table and picks up the timeout and per-key timing flag
    /// from `settings`.
    pub fn reload<S: Storage>(
        &mut self,
        store: &ViableStore<S>,
        settings: &QmkSettings,
    ) -> Result<(), StoreError> {
        self.entries = store.entries::<LeaderEntry>()?;
        self.apply_settings(settings);
        debug!(
            enabled = self.entries.iter().filter(|e| e.options.enabled()).count(),
            timeout_ms = self.timeout_ms,
            "leader table reloaded"
        );
        Ok(())
    }

    pub fn apply_settings(&mut self, settings: &QmkSettings) {
        self.timeout_ms = settings.leader_timeout;
        self.per_key_timing = settings.leader_per_key_timing();
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn timeout_ms(&self) -> u16 {
        self.timeout_ms
    }

    pub fn session(&self) -> Option<&LeaderSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Output of the first enabled, non-empty entry whose sequence equals
    /// `keys`.
    pub fn find_match(&self, keys: &[Keycode]) -> Option<Keycode> {
        self.entries
            .iter()
            .filter(|e| e.options.enabled())
            .find(|e| !e.keys().is_empty() && e.keys() == keys)
            .map(|e| e.output)
    }

    /// Leader key pressed.  Restarts any session already in progress.
    pub fn start(&mut self, now_ms: u32) {
        self.session = Some(LeaderSession {
            keys: Vec::with_capacity(LEADER_SEQUENCE_LEN),
            timer: now_ms,
        });
    }

    fn expired(&self, session: &LeaderSession, now_ms: u32) -> bool {
        now_ms.wrapping_sub(session.timer) > u32::from(self.timeout_ms)
    }

    /// Feeds a key into the active session.  Returns `false` (key not
    /// consumed) when no session is active.
    pub fn add_key(&mut self, keycode: Keycode, now_ms: u32, actions: &mut dyn KeyActions) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        if self.expired(session, now_ms) {
            self.end(actions);
            return false;
        }

        let per_key_timing = self.per_key_timing;
        let full = match self.session.as_mut() {
            Some(session) => {
                session.keys.push(keycode);
                if per_key_timing {
                    session.timer = now_ms;
                }
                session.keys.len() >= LEADER_SEQUENCE_LEN
            }
            None => false,
        };
        if full {
            self.end(actions);
        }
        true
    }

    /// Ends the session if its window has passed.  Call periodically.
    pub fn tick(&mut self, now_ms: u32, actions: &mut dyn KeyActions) {
        let timed_out = self
            .session
            .as_ref()
            .is_some_and(|s| self.expired(s, now_ms));
        if timed_out {
            self.end(actions);
        }
    }

    /// Ends the session and fires the matching output, if any.
    pub fn end(&mut self, actions: &mut dyn KeyActions) -> Option<Keycode> {
        let session = self.session.take()?;
        let output = self.find_match(&session.keys);
        match output {
            Some(kc) => {
                debug!(keys = session.keys.len(), output = %kc, "leader sequence matched");
                actions.tap(kc);
            }
            None => debug!(keys = session.keys.len(), "leader sequence unmatched"),
        }
        output
    }
}
