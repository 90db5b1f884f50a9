//! Per-node extension state.
//!
//! Extensions hand state from `condition` to `process_node` and on to the
//! post-phase hooks by parking it on the node. Keys are typed, so a record is
//! always read back as the type it was stored with.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// A typed key into a [`DataTable`], scoped by extension name.
pub struct DataKey<T> {
    extension: &'static str,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DataKey<T> {
    /// Declares a key. Usually a `const` next to the record type.
    #[must_use]
    pub const fn new(extension: &'static str, key: &'static str) -> Self {
        Self {
            extension,
            key,
            _marker: PhantomData,
        }
    }

    /// Owning extension.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        self.extension
    }

    fn slot(&self) -> (&'static str, &'static str) {
        (self.extension, self.key)
    }
}

impl<T> Clone for DataKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DataKey<T> {}

/// Side-table of extension records attached to one node.
#[derive(Default)]
pub struct DataTable {
    entries: HashMap<(&'static str, &'static str), Box<dyn Any>>,
}

impl DataTable {
    /// Stores `value`, replacing any previous record under the key.
    pub fn set<T: Any>(&mut self, key: DataKey<T>, value: T) {
        let _ = self.entries.insert(key.slot(), Box::new(value));
    }

    /// Reads a record.
    pub fn get<T: Any>(&self, key: DataKey<T>) -> Option<&T> {
        self.entries.get(&key.slot())?.downcast_ref()
    }

    /// Mutably reads a record.
    pub fn get_mut<T: Any>(&mut self, key: DataKey<T>) -> Option<&mut T> {
        self.entries.get_mut(&key.slot())?.downcast_mut()
    }

    /// Removes and returns a record.
    pub fn take<T: Any>(&mut self, key: DataKey<T>) -> Option<T> {
        let boxed = self.entries.remove(&key.slot())?;
        boxed.downcast().ok().map(|value| *value)
    }

    /// Whether a record exists under the key.
    pub fn has<T: Any>(&self, key: DataKey<T>) -> bool {
        self.get(key).is_some()
    }

    /// Drops every record owned by `extension`.
    pub fn clear_extension(&mut self, extension: &str) {
        self.entries.retain(|(owner, _), _| *owner != extension);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.entries.keys().map(|(ext, key)| format!("{ext}.{key}")))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNT: DataKey<u32> = DataKey::new("test", "count");
    const LABEL: DataKey<String> = DataKey::new("other", "label");

    #[test]
    fn test_typed_round_trip() {
        let mut table = DataTable::default();
        table.set(COUNT, 3);
        *table.get_mut(COUNT).unwrap() += 1;
        assert_eq!(table.get(COUNT), Some(&4));
        assert_eq!(table.take(COUNT), Some(4));
        assert!(!table.has(COUNT));
    }

    #[test]
    fn test_clear_extension_keeps_others() {
        let mut table = DataTable::default();
        table.set(COUNT, 1);
        table.set(LABEL, "x".to_string());
        table.clear_extension("test");
        assert!(!table.has(COUNT));
        assert!(table.has(LABEL));
    }
}
