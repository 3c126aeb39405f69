//! Fragments: modular physical components (finger modules, thumb clusters).
//!
//! A build declares how many fragment instances the keyboard has (at most
//! [`MAX_FRAGMENT_INSTANCES`]).  For each instance the keyboard may detect
//! which fragment is attached, and the user may persist a selection.  Both
//! reports use a fixed 21-byte list where unused slots read
//! [`FRAGMENT_ID_NONE`].

use thiserror::Error;
use tracing::debug;

use crate::storage::layout::MAX_FRAGMENT_INSTANCES;
use crate::storage::{Storage, StoreError, ViableStore};

/// Fragment id meaning "nothing detected / nothing selected".
pub const FRAGMENT_ID_NONE: u8 = 0xFF;

/// Hardware detection hook.  Keyboards with detect pins implement this.
pub trait FragmentDetector {
    /// Fragment id attached at `instance`, or [`FRAGMENT_ID_NONE`].
    fn detect(&self, instance: u8) -> u8;
}

/// Detector for keyboards without detection hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFragments;

impl FragmentDetector for NoFragments {
    fn detect(&self, _instance: u8) -> u8 {
        FRAGMENT_ID_NONE
    }
}

/// Detector returning a fixed list; handy for hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct FixedFragments(pub Vec<u8>);

impl FragmentDetector for FixedFragments {
    fn detect(&self, instance: u8) -> u8 {
        self.0
            .get(usize::from(instance))
            .copied()
            .unwrap_or(FRAGMENT_ID_NONE)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FragmentError {
    #[error("selection payload has {0} bytes, need {needed}", needed = MAX_FRAGMENT_INSTANCES + 1)]
    Short(usize),

    #[error("selection count {0} exceeds {max}", max = MAX_FRAGMENT_INSTANCES)]
    TooMany(u8),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FragmentError {
    /// Status byte sent back to the client.
    pub fn status(&self) -> u8 {
        match self {
            FragmentError::Short(_) => 1,
            FragmentError::TooMany(_) => 2,
            FragmentError::Store(_) => 0xFF,
        }
    }
}

/// Count plus one id per slot, as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentReport {
    pub count: u8,
    pub ids: [u8; MAX_FRAGMENT_INSTANCES],
}

impl FragmentReport {
    /// Writes `[count][ids..21]` to the front of `out`.
    pub fn write_to(&self, out: &mut [u8]) {
        if let Some((first, rest)) = out.split_first_mut() {
            *first = self.count;
            let n = rest.len().min(MAX_FRAGMENT_INSTANCES);
            rest[..n].copy_from_slice(&self.ids[..n]);
        }
    }
}

fn report(count: u8, id_at: impl Fn(u8) -> u8) -> FragmentReport {
    let mut ids = [FRAGMENT_ID_NONE; MAX_FRAGMENT_INSTANCES];
    for (i, slot) in ids.iter_mut().enumerate().take(usize::from(count)) {
        *slot = id_at(i as u8);
    }
    FragmentReport { count, ids }
}

/// What the detector sees on each of the first `count` instances.
pub fn detected(count: u8, detector: &dyn FragmentDetector) -> FragmentReport {
    report(count, |i| detector.detect(i))
}

/// The persisted selection for each of the first `count` instances.
pub fn selections<S: Storage>(
    count: u8,
    store: &ViableStore<S>,
) -> Result<FragmentReport, StoreError> {
    let stored = store.fragment_selections()?;
    Ok(report(count, |i| stored[usize::from(i)]))
}

/// Persists selections from a `[count][ids..21]` payload.
///
/// Only the first `count` slots are written; the rest keep their stored
/// value.
pub fn set_selections<S: Storage>(
    payload: &[u8],
    store: &mut ViableStore<S>,
) -> Result<(), FragmentError> {
    if payload.len() < MAX_FRAGMENT_INSTANCES + 1 {
        return Err(FragmentError::Short(payload.len()));
    }
    let count = payload[0];
    if usize::from(count) > MAX_FRAGMENT_INSTANCES {
        return Err(FragmentError::TooMany(count));
    }

    let mut stored = store.fragment_selections()?;
    let n = usize::from(count);
    stored[..n].copy_from_slice(&payload[1..=n]);
    store.set_fragment_selections(&stored)?;
    debug!(count, "fragment selections updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Capacities, Layout, MemoryStorage};

    fn store() -> ViableStore<MemoryStorage> {
        let layout = Layout::new(Capacities::default());
        ViableStore::new(MemoryStorage::new(layout.total_size()), layout).unwrap()
    }

    #[test]
    fn test_default_detector_reports_none() {
        let report = detected(3, &NoFragments);

        assert_eq!(report.count, 3);
        assert!(report.ids.iter().all(|&id| id == FRAGMENT_ID_NONE));
    }

    #[test]
    fn test_unused_slots_report_none() {
        let report = detected(2, &FixedFragments(vec![4, 7, 9]));
        assert_eq!(&report.ids[..3], &[4, 7, FRAGMENT_ID_NONE]);
    }

    #[test]
    fn test_set_then_get_selections() {
        let mut store = store();
        let mut payload = [0u8; 22];
        payload[0] = 2;
        payload[1] = 5;
        payload[2] = 6;
        payload[3] = 99;

        set_selections(&payload, &mut store).unwrap();
        let report = selections(3, &store).unwrap();

        assert_eq!(&report.ids[..4], &[5, 6, 0, FRAGMENT_ID_NONE]);
    }

    #[test]
    fn test_short_payload_is_rejected() {
        let mut store = store();
        let err = set_selections(&[1, 2, 3], &mut store).unwrap_err();
        assert_eq!(err.status(), 1);
    }

    #[test]
    fn test_count_above_max_is_rejected_without_writing() {
        let mut store = store();
        let mut payload = [1u8; 22];
        payload[0] = 22;

        let err = set_selections(&payload, &mut store).unwrap_err();

        assert_eq!(err, FragmentError::TooMany(22));
        assert_eq!(err.status(), 2);
        assert_eq!(store.fragment_selections().unwrap(), [0u8; 21]);
    }

    #[test]
    fn test_report_layout_on_wire() {
        let report = detected(1, &FixedFragments(vec![3]));
        let mut out = [0u8; 22];

        report.write_to(&mut out);

        assert_eq!(out[0], 1);
        assert_eq!(out[1], 3);
        assert_eq!(out[2], FRAGMENT_ID_NONE);
    }
}
