use crate::engine::core::pack::FieldExtractor;
use crate::engine::core::try_zeroed;
use crate::engine::errors::AggrError;
use crate::engine::schema::{CompiledField, Schema};

/// Reusable scratch buffers that one record at a time is packed into.
///
/// After a failed `pack` the buffers hold a mix of old and new bytes; they
/// are only meaningful after `pack` returned `Ok`.
#[derive(Debug)]
pub struct RecordPacker {
    key: Vec<u8>,
    values: Vec<u8>,
}

impl RecordPacker {
    pub fn for_schema(schema: &Schema) -> Result<Self, AggrError> {
        Ok(Self {
            key: try_zeroed(schema.key_size(), "scratch key buffer")?,
            values: try_zeroed(schema.value_size(), "scratch value buffer")?,
        })
    }

    /// Extracts every declared field of `record`, keys first, and writes
    /// each value at its compiled offset.
    pub fn pack<R, E>(&mut self, record: &R, schema: &Schema, extractor: &E) -> Result<(), AggrError>
    where
        R: ?Sized,
        E: FieldExtractor<R>,
    {
        write_fields(&mut self.key, schema.key_fields(), record, extractor)?;
        write_fields(&mut self.values, schema.value_fields(), record, extractor)
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }
}

fn write_fields<R, E>(
    buf: &mut [u8],
    fields: &[CompiledField],
    record: &R,
    extractor: &E,
) -> Result<(), AggrError>
where
    R: ?Sized,
    E: FieldExtractor<R>,
{
    for field in fields {
        let value = extractor
            .extract(record, field.id())
            .map_err(|source| AggrError::FieldExtractionFailed {
                field: field.id(),
                source,
            })?;

        let found = value.field_type();
        if found != field.field_type() {
            return Err(AggrError::ValueTypeMismatch {
                field: field.id(),
                expected: field.field_type(),
                found,
            });
        }

        value.encode_into(&mut buf[field.range()])?;
    }
    Ok(())
}
