use std::marker::PhantomData;

use tracing::{debug, info};

use crate::engine::core::pack::{FieldExtractor, RecordPacker};
use crate::engine::core::table::{Cursor, HashTable, TableStats};
use crate::engine::errors::AggrError;
use crate::engine::schema::{FieldDescriptor, Schema, compile};
use crate::shared::config::AggregatorConfig;

/// Outcome of a batch ingest that skips rejected records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub rejected: usize,
}

/// Groups records by their packed key fields and keeps one running
/// aggregate per group.
///
/// Single-threaded: the scratch buffers are reused by every `ingest`, so an
/// instance must not be shared between threads that ingest concurrently.
/// Run one instance per worker and merge the results instead.
pub struct Aggregator<R: ?Sized, E> {
    schema: Schema,
    packer: RecordPacker,
    table: HashTable,
    extractor: E,
    _record: PhantomData<fn(&R)>,
}

impl<R, E> Aggregator<R, E>
where
    R: ?Sized,
    E: FieldExtractor<R>,
{
    /// Compiles the schema and allocates the table and scratch buffers.
    /// Nothing is returned unless every step succeeded.
    pub fn setup(
        descriptors: &[FieldDescriptor],
        bucket_count: usize,
        extractor: E,
    ) -> Result<Self, AggrError> {
        let schema = compile(descriptors)?;
        let table = HashTable::with_buckets(bucket_count, schema.value_size())?;
        let packer = RecordPacker::for_schema(&schema)?;

        info!(
            target: "flow_aggr::aggregator",
            bucket_count,
            key_size = schema.key_size(),
            value_size = schema.value_size(),
            "Aggregator ready"
        );

        Ok(Self {
            schema,
            packer,
            table,
            extractor,
            _record: PhantomData,
        })
    }

    /// Builds an aggregator from the `[aggregator]` configuration section.
    pub fn from_config(config: &AggregatorConfig, extractor: E) -> Result<Self, AggrError> {
        Self::setup(&config.fields, config.bucket_count, extractor)
    }

    /// Folds one record into its group.
    ///
    /// A record whose fields cannot all be extracted is rejected as a whole:
    /// it neither creates an entry nor changes an existing one.
    pub fn ingest(&mut self, record: &R) -> Result<(), AggrError> {
        if let Err(err) = self.packer.pack(record, &self.schema, &self.extractor) {
            debug!(target: "flow_aggr::aggregator", error = %err, "Rejected record");
            return Err(err);
        }

        let (handle, created) = self.table.lookup_or_create(self.packer.key())?;
        if created {
            // The first record is the baseline; zero is no identity for min/max.
            self.table
                .values_mut(handle)
                .copy_from_slice(self.packer.values());
        } else {
            self.table
                .combine_into(handle, &self.schema, self.packer.values())?;
        }
        Ok(())
    }

    /// Ingests every record, counting per-record rejections and stopping at
    /// the first error that is not tied to a single record.
    pub fn ingest_all<'r, I>(&mut self, records: I) -> Result<IngestReport, AggrError>
    where
        R: 'r,
        I: IntoIterator<Item = &'r R>,
    {
        let mut report = IngestReport::default();
        for record in records {
            match self.ingest(record) {
                Ok(()) => report.accepted += 1,
                Err(err) if err.is_per_record() => report.rejected += 1,
                Err(err) => {
                    err.log_error();
                    return Err(err);
                }
            }
        }
        if report.rejected > 0 {
            debug!(
                target: "flow_aggr::aggregator",
                accepted = report.accepted,
                rejected = report.rejected,
                "Batch ingested with rejections"
            );
        }
        Ok(report)
    }
}

impl<R: ?Sized, E> Aggregator<R, E> {
    /// `(key, values)` for every group, in bucket order.
    pub fn iterate(&self) -> Cursor<'_> {
        self.table.iter()
    }

    /// All groups ordered by their key bytes.
    pub fn sorted_entries(&self) -> Vec<(&[u8], &[u8])> {
        let mut entries: Vec<(&[u8], &[u8])> = self.table.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn stats(&self) -> TableStats {
        self.table.stats()
    }

    /// Releases the table, its entries and the scratch buffers.
    pub fn teardown(self) -> TableStats {
        let Self {
            schema,
            packer,
            table,
            ..
        } = self;
        let stats = table.clear();
        drop(packer);
        drop(schema);
        info!(
            target: "flow_aggr::aggregator",
            groups = stats.entries,
            "Aggregator torn down"
        );
        stats
    }
}
