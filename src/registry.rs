//! Insertion-ordered identifier registries
//!
//! Paraver numbers threads and IRQ lines by first occurrence in the trace:
//! the first new key seen gets id 1, the next id 2, and ids are never
//! reassigned. The registry models exactly that rule on top of an
//! insertion-ordered map.

use std::hash::Hash;

use indexmap::IndexMap;

/// Identity assigned to a registered key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Dense 1-based id in first-occurrence order
    pub paraver_id: u32,
    /// Display name for the `.row` legend
    pub name: String,
}

/// First-occurrence-ordered map from an OS identifier to a Paraver identity
#[derive(Debug, Clone)]
pub struct Registry<K> {
    entries: IndexMap<K, RegistryEntry>,
}

impl<K: Hash + Eq + Copy> Registry<K> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Register `key` if unseen, assigning the next dense paraver id.
    /// Returns whether the entry was newly created.
    pub fn insert_if_absent(&mut self, key: K, name: &str) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        let paraver_id = self.entries.len() as u32 + 1;
        self.entries.insert(
            key,
            RegistryEntry {
                paraver_id,
                name: name.to_string(),
            },
        );
        true
    }

    /// Paraver id for `key`, if registered
    pub fn paraver_id(&self, key: K) -> Option<u32> {
        self.entries.get(&key).map(|entry| entry.paraver_id)
    }

    /// Entries in assignment order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &RegistryEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Hash + Eq + Copy> Default for Registry<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// OS thread id (0 = swapper/idle) to Paraver application identity
pub type ThreadRegistry = Registry<i64>;

/// IRQ line number to Paraver resource-row identity
pub type IrqRegistry = Registry<i64>;
