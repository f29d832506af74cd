use std::cmp::min;
use std::ops::Index;

use crate::utils::MyHash;

/// Chain links are stored shifted by one so that `0` terminates a chain.
const NIL: usize = 0;

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    next: usize,
}

/// Append-only hash-consing table.
///
/// Values are stored densely in insertion order and never removed, so the
/// index returned by [`put`][Table::put] is stable for the table's
/// lifetime. Lookup walks a per-bucket chain.
#[derive(Debug, Clone)]
pub struct Table<T> {
    data: Vec<Entry<T>>,

    buckets: Vec<usize>,
    bitmask: u64,
}

impl<T> Table<T> {
    /// Create a new table with `2^bits` buckets (at most `2^24`).
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Table bits should be in the range 0..=31");

        let buckets_bits = min(bits, 24);
        let buckets_size = 1 << buckets_bits;
        let buckets = vec![NIL; buckets_size];
        let bitmask = (buckets_size - 1) as u64;

        Self {
            data: Vec::new(),
            buckets,
            bitmask,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of buckets.
    pub fn buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        &self.data[index].value
    }

    /// Iterate over the stored values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter().map(|e| &e.value)
    }

    /// Length of the longest bucket chain.
    pub fn max_chain(&self) -> usize {
        self.buckets
            .iter()
            .map(|&head| {
                let mut len = 0;
                let mut link = head;
                while link != NIL {
                    len += 1;
                    link = self.data[link - 1].next;
                }
                len
            })
            .max()
            .unwrap_or(0)
    }
}

impl<T> Table<T>
where
    T: MyHash + Eq,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Find the index of a stored value equal to `value`.
    pub fn find(&self, value: &T) -> Option<usize> {
        let mut link = self.buckets[self.bucket_index(value)];
        while link != NIL {
            let entry = &self.data[link - 1];
            if &entry.value == value {
                return Some(link - 1);
            }
            link = entry.next;
        }
        None
    }

    /// Put a value into the table.
    ///
    /// Returns the index of the equal value already stored, or of the newly
    /// appended one, together with a flag telling whether it was created.
    pub fn put(&mut self, value: T) -> (usize, bool) {
        let bucket_index = self.bucket_index(&value);
        let mut link = self.buckets[bucket_index];

        if link == NIL {
            // Create new entry and put it into the bucket.
            let i = self.add(value);
            self.buckets[bucket_index] = i + 1;
            return (i, true);
        }

        loop {
            let index = link - 1;

            if self.data[index].value == value {
                // The value already exists.
                return (index, false);
            }

            let next = self.data[index].next;

            if next == NIL {
                // Create new entry and append it to the bucket.
                let i = self.add(value);
                self.data[index].next = i + 1;
                return (i, true);
            } else {
                // Go to the next entry in the bucket.
                link = next;
            }
        }
    }

    fn add(&mut self, value: T) -> usize {
        self.data.push(Entry { value, next: NIL });
        self.data.len() - 1
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
    struct Item(i32);

    impl MyHash for Item {
        fn hash(&self) -> u64 {
            self.0.unsigned_abs() as u64
        }
    }

    #[test]
    fn test_put() {
        let mut table = Table::new(2);
        let (index1, created1) = table.put(Item(5));
        let (index2, created2) = table.put(Item(-5));
        assert!(created1 && created2);
        assert_ne!(index1, index2);
        assert_eq!(table[index1], Item(5));
        assert_eq!(table[index2], Item(-5));
        assert_eq!(table.max_chain(), 2);
    }

    #[test]
    fn test_put_existing() {
        let mut table = Table::new(2);
        let (index, _) = table.put(Item(3));
        table.put(Item(7));
        assert_eq!(table.put(Item(3)), (index, false));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_find() {
        let mut table = Table::new(0);
        assert_eq!(table.buckets(), 1);
        table.put(Item(1));
        table.put(Item(2));
        assert_eq!(table.find(&Item(2)), Some(1));
        assert_eq!(table.find(&Item(9)), None);
        assert_eq!(table.iter().copied().collect::<Vec<_>>(), vec![Item(1), Item(2)]);
    }
}
