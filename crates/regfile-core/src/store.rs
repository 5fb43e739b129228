//! Current register values and the per-step pulse auto-clear rule.

use crate::RegisterTable;

/// A write accepted on the current step, committed at the end of the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct StoreWrite {
    /// Table index of the written register.
    pub index: usize,
    /// Value to store.
    pub value: u32,
}

/// Mutable value array, indexed like the [`RegisterTable`] it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterStore {
    values: Box<[u32]>,
}

impl RegisterStore {
    /// Creates a store holding the table defaults.
    #[must_use]
    pub fn new(table: &RegisterTable) -> Self {
        Self {
            values: table.defaults().into(),
        }
    }

    /// Current value at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u32> {
        self.values.get(index).copied()
    }

    /// All current values in table order.
    #[must_use]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Computes the value register `index` holds after this step.
    ///
    /// A write on this step wins, otherwise pulse registers fall back to
    /// their default and every other register keeps its value.
    #[must_use]
    pub fn next_value(
        &self,
        table: &RegisterTable,
        index: usize,
        write: Option<StoreWrite>,
    ) -> Option<u32> {
        let current = self.get(index)?;
        let descriptor = table.descriptor(index)?;

        Some(match write {
            Some(write) if write.index == index => write.value,
            _ if descriptor.mode.is_pulse() => table.default_value(index).unwrap_or(current),
            _ => current,
        })
    }

    /// Advances the store by one step.
    ///
    /// Calls `on_clear(index, value)` for every pulse register that fell back
    /// to its default on this step while holding a different value.
    pub fn commit_step<F>(
        &mut self,
        table: &RegisterTable,
        write: Option<StoreWrite>,
        mut on_clear: F,
    ) where
        F: FnMut(usize, u32),
    {
        for index in 0..self.values.len() {
            let Some(next) = self.next_value(table, index, write) else {
                continue;
            };
            let is_write = write.is_some_and(|write| write.index == index);
            let cleared = !is_write && next != self.values[index];
            self.values[index] = next;
            if cleared {
                on_clear(index, next);
            }
        }
    }

    /// Restores every register to its default value.
    pub fn reset(&mut self, table: &RegisterTable) {
        self.values.copy_from_slice(table.defaults());
    }
}

#[cfg(test)]
mod tests {
    use super::{RegisterStore, StoreWrite};
    use crate::{RegisterDescriptor, RegisterMode, RegisterTable};

    fn commit(
        store: &mut RegisterStore,
        table: &RegisterTable,
        write: Option<StoreWrite>,
    ) -> Vec<usize> {
        let mut cleared = Vec::new();
        store.commit_step(table, write, |index, _| cleared.push(index));
        cleared
    }

    fn table() -> RegisterTable {
        RegisterTable::from_entries([
            (RegisterDescriptor::new(0x0, RegisterMode::ReadWrite), 3),
            (RegisterDescriptor::new(0x4, RegisterMode::WriteOnlyPulse), 0),
            (RegisterDescriptor::new(0x8, RegisterMode::ReadFabricWritePulse), 0x10),
        ])
        .expect("valid table")
    }

    #[test]
    fn starts_at_defaults() {
        let table = table();
        let store = RegisterStore::new(&table);
        assert_eq!(store.values(), &[3, 0, 0x10]);
    }

    #[test]
    fn ordinary_register_holds_written_value() {
        let table = table();
        let mut store = RegisterStore::new(&table);

        commit(&mut store, &table, Some(StoreWrite { index: 0, value: 9 }));
        assert_eq!(store.get(0), Some(9));

        for _ in 0..4 {
            commit(&mut store, &table, None);
        }
        assert_eq!(store.get(0), Some(9));
    }

    #[test]
    fn pulse_register_is_visible_for_one_step() {
        let table = table();
        let mut store = RegisterStore::new(&table);

        let cleared = commit(&mut store, &table, Some(StoreWrite { index: 1, value: 7 }));
        assert!(cleared.is_empty());
        assert_eq!(store.get(1), Some(7));

        let cleared = commit(&mut store, &table, None);
        assert_eq!(cleared, vec![1]);
        assert_eq!(store.get(1), Some(0));

        let cleared = commit(&mut store, &table, None);
        assert!(cleared.is_empty());
        assert_eq!(store.get(1), Some(0));
    }

    #[test]
    fn clear_callback_reports_default_value() {
        let table = table();
        let mut store = RegisterStore::new(&table);
        store.commit_step(&table, Some(StoreWrite { index: 2, value: 4 }), |_, _| {
            panic!("a written register is not cleared");
        });

        let mut cleared = Vec::new();
        store.commit_step(&table, None, |index, value| cleared.push((index, value)));
        assert_eq!(cleared, vec![(2, 0x10)]);
    }

    #[test]
    fn store_without_pulse_registers_never_clears() {
        let table = RegisterTable::from_entries([
            (RegisterDescriptor::new(0x0, RegisterMode::ReadWrite), 1),
            (RegisterDescriptor::new(0x4, RegisterMode::ReadOnly), 2),
        ])
        .expect("valid table");
        let mut store = RegisterStore::new(&table);

        let mut calls = 0;
        store.commit_step(&table, Some(StoreWrite { index: 0, value: 5 }), |_, _| {
            calls += 1;
        });
        store.commit_step(&table, None, |_, _| calls += 1);
        assert_eq!(calls, 0);
        assert_eq!(store.values(), &[5, 2]);
    }

    #[test]
    fn back_to_back_pulse_writes_keep_latest_value() {
        let table = table();
        let mut store = RegisterStore::new(&table);

        commit(&mut store, &table, Some(StoreWrite { index: 2, value: 1 }));
        commit(&mut store, &table, Some(StoreWrite { index: 2, value: 2 }));
        assert_eq!(store.get(2), Some(2));
        commit(&mut store, &table, None);
        assert_eq!(store.get(2), Some(0x10));
    }

    #[test]
    fn next_value_follows_write_then_pulse_then_hold() {
        let table = table();
        let mut store = RegisterStore::new(&table);
        commit(&mut store, &table, Some(StoreWrite { index: 1, value: 5 }));

        let write = Some(StoreWrite { index: 0, value: 1 });
        assert_eq!(store.next_value(&table, 0, write), Some(1));
        assert_eq!(store.next_value(&table, 1, write), Some(0));
        assert_eq!(store.next_value(&table, 2, write), Some(0x10));
        assert_eq!(store.next_value(&table, 3, write), None);
    }

    #[test]
    fn reset_restores_defaults() {
        let table = table();
        let mut store = RegisterStore::new(&table);
        commit(&mut store, &table, Some(StoreWrite { index: 0, value: 99 }));

        store.reset(&table);

        assert_eq!(store, RegisterStore::new(&table));
    }
}
