use crate::engine::core::table::HashTable;

/// Iterator over `(key, values)` pairs of a [`HashTable`].
///
/// Starts before the first bucket; each step either follows the current
/// chain or moves on to the next bucket's head.
pub struct Cursor<'a> {
    table: &'a HashTable,
    bucket: usize,
    next: Option<usize>,
    remaining: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(table: &'a HashTable) -> Self {
        Self {
            table,
            bucket: 0,
            next: None,
            remaining: table.entries.len(),
        }
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        loop {
            if let Some(idx) = self.next {
                let entry = &table.entries[idx];
                self.next = entry.next;
                self.remaining -= 1;
                return Some((&*entry.key, &*entry.values));
            }
            if self.bucket >= table.buckets.len() {
                return None;
            }
            self.next = table.buckets[self.bucket].head;
            self.bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Cursor<'_> {}

impl std::iter::FusedIterator for Cursor<'_> {}
