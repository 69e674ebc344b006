use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// What an [`KeyedStore::upsert`] did to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    /// The key was present with an equal value.
    Reasserted,
    /// The key was present with a different value, which has been replaced.
    Overridden,
}

/// A map in which later values replace earlier ones, and which reports whether that happened.
///
/// Iteration is in key order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyedStore<Key, Value> {
    entries: BTreeMap<Key, Value>,
}

impl<Key, Value> Default for KeyedStore<Key, Value> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<Key: Ord, Value: PartialEq> KeyedStore<Key, Value> {
    pub fn upsert(&mut self, key: Key, value: Value) -> Upsert {
        match self.entries.entry(key) {
            Entry::Vacant(entry) => {
                let _ = entry.insert(value);
                Upsert::Inserted
            }
            Entry::Occupied(mut entry) => {
                if *entry.get() == value {
                    Upsert::Reasserted
                } else {
                    let _ = entry.insert(value);
                    Upsert::Overridden
                }
            }
        }
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Key, &mut Value)> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_distinguishes_reassertion_from_override() {
        let mut store = KeyedStore::default();

        assert_eq!(Upsert::Inserted, store.upsert((0, 1), 2));
        assert_eq!(Upsert::Reasserted, store.upsert((0, 1), 2));
        assert_eq!(Some(&2), store.get(&(0, 1)));

        assert_eq!(Upsert::Overridden, store.upsert((0, 1), 3));
        assert_eq!(Some(&3), store.get(&(0, 1)));
        assert_eq!(1, store.len());
    }

    #[test]
    fn iteration_is_in_key_order() {
        let mut store = KeyedStore::default();
        let _ = store.upsert(3, "c");
        let _ = store.upsert(1, "a");
        let _ = store.upsert(2, "b");

        assert_eq!(
            vec!["a", "b", "c"],
            store.iter().map(|(_, value)| *value).collect::<Vec<_>>()
        );
    }
}
