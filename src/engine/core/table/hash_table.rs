use tracing::{debug, info};

use crate::engine::core::table::Cursor;
use crate::engine::core::try_zeroed;
use crate::engine::errors::AggrError;
use crate::engine::schema::Schema;
use crate::shared::hash::hash_key_bytes;

/// Opaque reference to an entry, valid for the table that issued it.
/// Entries are never removed, so a handle stays valid until the table is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(usize);

#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) key: Box<[u8]>,
    pub(crate) values: Box<[u8]>,
    pub(crate) next: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Chain {
    pub(crate) head: Option<usize>,
    tail: Option<usize>,
}

/// Occupancy figures, mostly useful for judging the bucket count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub entries: usize,
    pub occupied_buckets: usize,
    pub longest_chain: usize,
}

/// Fixed-size table of singly linked chains keyed by packed key bytes.
///
/// Entries live in one arena and chains link them by index, in insertion
/// order. The bucket count never changes after construction.
#[derive(Debug)]
pub struct HashTable {
    pub(crate) buckets: Vec<Chain>,
    pub(crate) entries: Vec<Entry>,
    value_size: usize,
}

impl HashTable {
    pub fn with_buckets(bucket_count: usize, value_size: usize) -> Result<Self, AggrError> {
        if bucket_count == 0 {
            return Err(AggrError::InvalidBucketCount);
        }
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(bucket_count)
            .map_err(|_| AggrError::OutOfMemory {
                what: "bucket array",
            })?;
        buckets.resize(bucket_count, Chain::default());

        Ok(Self {
            buckets,
            entries: Vec::new(),
            value_size,
        })
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn bucket_of(&self, key: &[u8]) -> usize {
        (hash_key_bytes(key) % self.buckets.len() as u64) as usize
    }

    pub fn find(&self, key: &[u8]) -> Option<EntryHandle> {
        self.find_in_bucket(self.bucket_of(key), key)
            .map(EntryHandle)
    }

    fn find_in_bucket(&self, bucket: usize, key: &[u8]) -> Option<usize> {
        let mut cursor = self.buckets[bucket].head;
        while let Some(idx) = cursor {
            let entry = &self.entries[idx];
            if *entry.key == *key {
                return Some(idx);
            }
            cursor = entry.next;
        }
        None
    }

    /// Returns the entry stored under `key`, creating it with a zeroed value
    /// buffer on first sight. The flag is `true` when the entry is new.
    ///
    /// On allocation failure the table is left exactly as it was.
    pub fn lookup_or_create(&mut self, key: &[u8]) -> Result<(EntryHandle, bool), AggrError> {
        let bucket = self.bucket_of(key);
        if let Some(idx) = self.find_in_bucket(bucket, key) {
            return Ok((EntryHandle(idx), false));
        }

        self.entries
            .try_reserve(1)
            .map_err(|_| AggrError::OutOfMemory { what: "table entry" })?;
        let mut owned_key = try_zeroed(key.len(), "entry key buffer")?;
        owned_key.copy_from_slice(key);
        let values = try_zeroed(self.value_size, "entry value buffer")?;

        let idx = self.entries.len();
        self.entries.push(Entry {
            key: owned_key.into_boxed_slice(),
            values: values.into_boxed_slice(),
            next: None,
        });

        let chain = &mut self.buckets[bucket];
        match chain.tail {
            Some(tail) => self.entries[tail].next = Some(idx),
            None => chain.head = Some(idx),
        }
        chain.tail = Some(idx);

        debug!(target: "flow_aggr::table", bucket, entry = idx, "Created entry");
        Ok((EntryHandle(idx), true))
    }

    pub fn key(&self, handle: EntryHandle) -> &[u8] {
        &self.entries[handle.0].key
    }

    pub fn values(&self, handle: EntryHandle) -> &[u8] {
        &self.entries[handle.0].values
    }

    pub fn values_mut(&mut self, handle: EntryHandle) -> &mut [u8] {
        &mut self.entries[handle.0].values
    }

    /// Folds `incoming` into the entry's stored values, field by field, with
    /// each field's bound aggregate function.
    ///
    /// Both the schema layout and `incoming` must match the table's value
    /// width; otherwise nothing is touched.
    pub fn combine_into(
        &mut self,
        handle: EntryHandle,
        schema: &Schema,
        incoming: &[u8],
    ) -> Result<(), AggrError> {
        if schema.value_size() != self.value_size {
            return Err(AggrError::BufferSize {
                expected: self.value_size,
                found: schema.value_size(),
            });
        }
        if incoming.len() != schema.value_size() {
            return Err(AggrError::BufferSize {
                expected: schema.value_size(),
                found: incoming.len(),
            });
        }
        let stored = &mut self.entries[handle.0].values;
        for field in schema.value_fields() {
            if let Some(binding) = field.binding() {
                binding.combine(&mut stored[field.range()], &incoming[field.range()])?;
            }
        }
        Ok(())
    }

    /// Walks every entry, bucket by bucket, each chain in insertion order.
    pub fn iter(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    pub fn stats(&self) -> TableStats {
        let mut stats = TableStats {
            entries: self.entries.len(),
            ..TableStats::default()
        };
        for chain in &self.buckets {
            let mut len = 0;
            let mut cursor = chain.head;
            while let Some(idx) = cursor {
                len += 1;
                cursor = self.entries[idx].next;
            }
            if len > 0 {
                stats.occupied_buckets += 1;
                stats.longest_chain = stats.longest_chain.max(len);
            }
        }
        stats
    }

    /// Releases every entry and then the bucket array. Consumes the table,
    /// so it can only happen once.
    pub fn clear(mut self) -> TableStats {
        let stats = self.stats();
        self.entries.clear();
        self.entries.shrink_to_fit();
        self.buckets.clear();
        self.buckets.shrink_to_fit();
        info!(
            target: "flow_aggr::table",
            entries = stats.entries,
            occupied_buckets = stats.occupied_buckets,
            longest_chain = stats.longest_chain,
            "Released hash table"
        );
        stats
    }
}
