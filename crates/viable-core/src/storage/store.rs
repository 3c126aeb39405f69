//! Typed access to the persistent region.

use tracing::debug;

use super::layout::{Layout, Table, MAGIC_SIZE, MAX_FRAGMENT_INSTANCES, QMK_SETTINGS_SIZE};
use super::magic::BuildStamp;
use super::{check_bounds, Storage, StoreError};
use crate::domain::{OneShotSettings, TableEntry};

/// The persistent store: exclusive owner of the byte region.
///
/// Engines keep RAM copies of what they load from here; after any write the
/// caller must reload the affected engine before the next key event.
#[derive(Debug)]
pub struct ViableStore<S> {
    storage: S,
    layout: Layout,
}

impl<S: Storage> ViableStore<S> {
    /// Wraps `storage`, which must be at least `layout.total_size()` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RegionTooSmall`] if the medium cannot hold the
    /// layout.
    pub fn new(storage: S, layout: Layout) -> Result<Self, StoreError> {
        if storage.len() < layout.total_size() {
            return Err(StoreError::RegionTooSmall {
                needed: layout.total_size(),
                available: storage.len(),
            });
        }
        Ok(Self { storage, layout })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn entry_offset(&self, table: Table, index: usize) -> Result<usize, StoreError> {
        self.layout
            .entry_offset(table, index)
            .ok_or(StoreError::IndexOutOfRange {
                table,
                index,
                capacity: self.layout.count(table),
            })
    }

    // ── Raw entry access ─────────────────────────────────────────────────────

    /// Copies record `index` of `table` into the front of `buf`.
    ///
    /// # Errors
    ///
    /// [`StoreError::IndexOutOfRange`] past capacity (the medium is not
    /// read), [`StoreError::OutOfBounds`] if `buf` is shorter than one record.
    pub fn read_entry_bytes(
        &self,
        table: Table,
        index: usize,
        buf: &mut [u8],
    ) -> Result<(), StoreError> {
        let offset = self.entry_offset(table, index)?;
        let size = table.entry_size();
        check_bounds(0, size, buf.len())?;
        self.storage.read(offset, &mut buf[..size])
    }

    /// Writes the first record-size bytes of `data` to record `index`.
    ///
    /// # Errors
    ///
    /// [`StoreError::IndexOutOfRange`] past capacity (the medium is not
    /// touched), [`StoreError::OutOfBounds`] if `data` is too short.
    pub fn write_entry_bytes(
        &mut self,
        table: Table,
        index: usize,
        data: &[u8],
    ) -> Result<(), StoreError> {
        let offset = self.entry_offset(table, index)?;
        let size = table.entry_size();
        check_bounds(0, size, data.len())?;
        self.storage.write(offset, &data[..size])
    }

    // ── Typed entry access ───────────────────────────────────────────────────

    pub fn get<E: TableEntry>(&self, index: usize) -> Result<E, StoreError> {
        let mut buf = vec![0u8; E::SIZE];
        self.read_entry_bytes(E::TABLE, index, &mut buf)?;
        Ok(E::decode(&buf))
    }

    pub fn set<E: TableEntry>(&mut self, index: usize, entry: &E) -> Result<(), StoreError> {
        let mut buf = vec![0u8; E::SIZE];
        entry.encode(&mut buf);
        self.write_entry_bytes(E::TABLE, index, &buf)
    }

    /// Every record of `E`'s table, in index order.
    pub fn entries<E: TableEntry>(&self) -> Result<Vec<E>, StoreError> {
        let span = self.layout.span(E::TABLE);
        let mut buf = vec![0u8; span.len];
        self.storage.read(span.offset, &mut buf)?;
        Ok(buf.chunks_exact(E::SIZE).map(E::decode).collect())
    }

    // ── Fixed tables ─────────────────────────────────────────────────────────

    pub fn one_shot(&self) -> Result<OneShotSettings, StoreError> {
        self.get(0)
    }

    pub fn set_one_shot(&mut self, settings: &OneShotSettings) -> Result<(), StoreError> {
        self.set(0, settings)
    }

    pub fn magic(&self) -> Result<[u8; MAGIC_SIZE], StoreError> {
        let mut magic = [0u8; MAGIC_SIZE];
        self.storage
            .read(self.layout.span(Table::Magic).offset, &mut magic)?;
        Ok(magic)
    }

    /// Returns `true` if the stored magic matches `stamp`.
    pub fn is_stamped(&self, stamp: &BuildStamp) -> Result<bool, StoreError> {
        Ok(self.magic()? == stamp.bytes())
    }

    /// Marks the region as valid for `stamp`.
    pub fn stamp(&mut self, stamp: &BuildStamp) -> Result<(), StoreError> {
        self.storage
            .write(self.layout.span(Table::Magic).offset, &stamp.bytes())
    }

    /// The raw QMK settings record.
    pub fn settings_record(&self) -> Result<[u8; QMK_SETTINGS_SIZE], StoreError> {
        let mut record = [0u8; QMK_SETTINGS_SIZE];
        self.storage
            .read(self.layout.span(Table::QmkSettings).offset, &mut record)?;
        Ok(record)
    }

    pub fn write_settings_record(
        &mut self,
        record: &[u8; QMK_SETTINGS_SIZE],
    ) -> Result<(), StoreError> {
        self.storage
            .write(self.layout.span(Table::QmkSettings).offset, record)
    }

    /// Persisted fragment selections, one byte per instance.
    pub fn fragment_selections(&self) -> Result<[u8; MAX_FRAGMENT_INSTANCES], StoreError> {
        let mut selections = [0u8; MAX_FRAGMENT_INSTANCES];
        self.storage
            .read(self.layout.span(Table::Fragments).offset, &mut selections)?;
        Ok(selections)
    }

    pub fn set_fragment_selections(
        &mut self,
        selections: &[u8; MAX_FRAGMENT_INSTANCES],
    ) -> Result<(), StoreError> {
        self.storage
            .write(self.layout.span(Table::Fragments).offset, selections)
    }

    // ── Bulk clears ──────────────────────────────────────────────────────────

    /// Zeroes every entry table and the one-shot record (everything before the
    /// magic).  Settings, magic and fragments are left alone.
    pub fn clear_tables(&mut self) -> Result<(), StoreError> {
        let end = self.layout.span(Table::Magic).offset;
        debug!(bytes = end, "clearing entry tables");
        self.zero(0, end)
    }

    /// Zeroes the whole region, magic included.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        let end = self.layout.total_size();
        debug!(bytes = end, "clearing persistent region");
        self.zero(0, end)
    }

    fn zero(&mut self, offset: usize, len: usize) -> Result<(), StoreError> {
        if len == 0 {
            return Ok(());
        }
        self.storage.write(offset, &vec![0u8; len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ComboEntry, CustomTerm, LeaderEntry, TapDanceEntry};
    use crate::keycode::hid::*;
    use crate::keycode::Keycode;
    use crate::storage::{Capacities, MemoryStorage};

    fn store(caps: u8) -> ViableStore<MemoryStorage> {
        let layout = Layout::new(Capacities {
            tap_dance: caps,
            combo: caps,
            key_override: caps,
            alt_repeat_key: caps,
            leader: caps,
        });
        let storage = MemoryStorage::new(layout.total_size());
        ViableStore::new(storage, layout).unwrap()
    }

    #[test]
    fn test_new_rejects_small_medium() {
        let layout = Layout::new(Capacities::default());
        let err = ViableStore::new(MemoryStorage::new(10), layout).unwrap_err();
        assert!(matches!(err, StoreError::RegionTooSmall { available: 10, .. }));
    }

    #[test]
    fn test_set_then_get_returns_same_entry() {
        let mut store = store(4);
        let combo = ComboEntry {
            input: [KC_J, KC_K, Keycode::NO, Keycode::NO],
            output: KC_ESCAPE,
            custom_term: CustomTerm::new(true, 30),
        };

        store.set(2, &combo).unwrap();

        assert_eq!(store.get::<ComboEntry>(2).unwrap(), combo);
        assert_eq!(store.get::<ComboEntry>(1).unwrap(), ComboEntry::default());
    }

    #[test]
    fn test_out_of_range_set_does_not_touch_medium() {
        let mut store = store(2);

        let err = store.set(2, &TapDanceEntry::default()).unwrap_err();

        assert_eq!(
            err,
            StoreError::IndexOutOfRange {
                table: Table::TapDance,
                index: 2,
                capacity: 2
            }
        );
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_tables_do_not_overlap() {
        let mut store = store(1);
        let td = TapDanceEntry {
            on_tap: KC_A,
            custom_term: CustomTerm::new(true, 0),
            ..TapDanceEntry::default()
        };
        store.set(0, &td).unwrap();
        store
            .set(
                0,
                &LeaderEntry {
                    output: KC_B,
                    ..LeaderEntry::default()
                },
            )
            .unwrap();

        assert_eq!(store.get::<TapDanceEntry>(0).unwrap(), td);
        assert_eq!(store.get::<ComboEntry>(0).unwrap(), ComboEntry::default());
    }

    #[test]
    fn test_entries_returns_full_table() {
        let mut store = store(3);
        store
            .set(
                1,
                &TapDanceEntry {
                    on_tap: KC_Q,
                    ..TapDanceEntry::default()
                },
            )
            .unwrap();

        let all = store.entries::<TapDanceEntry>().unwrap();

        assert_eq!(all.len(), 3);
        assert_eq!(all[1].on_tap, KC_Q);
    }

    #[test]
    fn test_stamp_marks_region_valid() {
        let mut store = store(1);
        let stamp = BuildStamp::parse("2025-06-01-12:00:00").unwrap();
        assert!(!store.is_stamped(&stamp).unwrap());

        store.stamp(&stamp).unwrap();

        assert!(store.is_stamped(&stamp).unwrap());
    }

    #[test]
    fn test_clear_tables_keeps_magic_and_fragments() {
        let mut store = store(1);
        let stamp = BuildStamp::parse("2025-06-01-12:00:00").unwrap();
        store.stamp(&stamp).unwrap();
        store.set_fragment_selections(&[3; MAX_FRAGMENT_INSTANCES]).unwrap();
        store
            .set_one_shot(&OneShotSettings {
                timeout: 1,
                tap_toggle: 2,
            })
            .unwrap();

        store.clear_tables().unwrap();

        assert_eq!(store.one_shot().unwrap(), OneShotSettings::default());
        assert!(store.is_stamped(&stamp).unwrap());
        assert_eq!(store.fragment_selections().unwrap(), [3; MAX_FRAGMENT_INSTANCES]);
    }

    #[test]
    fn test_clear_all_zeroes_everything() {
        let mut store = store(1);
        store.set_fragment_selections(&[3; MAX_FRAGMENT_INSTANCES]).unwrap();

        store.clear_all().unwrap();

        assert!(store.storage().as_bytes().iter().all(|&b| b == 0));
    }
}
