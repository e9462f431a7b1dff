//! Direct-mapped computed table.

use std::cell::Cell;

use crate::utils::MyHash;

struct Entry<K, V> {
    key: K,
    value: V,
}

/// Lossy memo for operation results: a colliding insert evicts the old entry.
pub struct Cache<K, V> {
    data: Vec<Option<Entry<K, V>>>,
    bitmask: u64,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<K, V> Cache<K, V> {
    /// Create a new cache with `2^bits` slots.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");

        let size = 1 << bits;
        Self {
            data: std::iter::repeat_with(|| None).take(size).collect(),
            bitmask: (size - 1) as u64,
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    pub fn misses(&self) -> usize {
        self.misses.get()
    }
}

impl<K, V> Cache<K, V>
where
    K: MyHash + Eq,
{
    fn slot(&self, key: &K) -> usize {
        (key.hash() & self.bitmask) as usize
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        match &self.data[self.slot(key)] {
            Some(entry) if &entry.key == key => {
                self.hits.set(self.hits.get() + 1);
                Some(&entry.value)
            }
            _ => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        let index = self.slot(&key);
        self.data[index] = Some(Entry { key, value });
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::utils::pairing2;

    #[derive(Debug, Eq, PartialEq)]
    struct Key(u64, u64);

    impl MyHash for Key {
        fn hash(&self) -> u64 {
            pairing2(self.0, self.1)
        }
    }

    #[test]
    fn test_cache() {
        let mut cache = Cache::new(3);

        cache.insert(Key(1, 2), 3);
        cache.insert(Key(2, 3), 1);
        cache.insert(Key(1, 3), 2);

        assert_eq!(cache.get(&Key(1, 2)), Some(&3));
        assert_eq!(cache.get(&Key(2, 3)), Some(&1));
        assert_eq!(cache.get(&Key(1, 3)), Some(&2));
        assert_eq!(cache.get(&Key(2, 1)), None);
        assert_eq!(cache.get(&Key(3, 3)), None);
        assert_eq!(cache.hits(), 3);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_collision_evicts() {
        let mut cache = Cache::new(0);
        cache.insert(Key(1, 1), 'a');
        cache.insert(Key(2, 2), 'b');
        assert_eq!(cache.get(&Key(1, 1)), None);
        assert_eq!(cache.get(&Key(2, 2)), Some(&'b'));
    }
}
