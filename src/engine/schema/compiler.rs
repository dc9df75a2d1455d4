use std::collections::HashSet;

use tracing::debug;

use crate::engine::core::aggregate::AggregateBinding;
use crate::engine::errors::AggrError;
use crate::engine::schema::types::{CompiledField, FieldDescriptor, FieldRole, Schema};
use crate::engine::types::FieldId;

/// Compiles descriptors into dense key and value layouts.
///
/// Fields keep their declared order inside each layout; offsets are the
/// running sum of the sizes that precede them in the same layout.
pub fn compile(descriptors: &[FieldDescriptor]) -> Result<Schema, AggrError> {
    if descriptors.is_empty() {
        return Err(AggrError::EmptySchema);
    }

    let mut seen: HashSet<(FieldId, FieldRole)> = HashSet::with_capacity(descriptors.len());
    let mut key_fields = Vec::new();
    let mut value_fields = Vec::new();
    let mut key_size = 0usize;
    let mut value_size = 0usize;

    for desc in descriptors {
        if !seen.insert((desc.id, desc.role)) {
            return Err(AggrError::DuplicateFieldId(desc.id));
        }

        let size = desc.field_type.size_of();
        match desc.role {
            FieldRole::Key => {
                key_fields.push(CompiledField {
                    id: desc.id,
                    field_type: desc.field_type,
                    size,
                    offset: key_size,
                    binding: None,
                });
                key_size += size;
            }
            FieldRole::Aggregate(function) => {
                let binding = AggregateBinding::new(function, desc.field_type).ok_or(
                    AggrError::InvalidFunctionForType {
                        field: desc.id,
                        function,
                        field_type: desc.field_type,
                    },
                )?;
                value_fields.push(CompiledField {
                    id: desc.id,
                    field_type: desc.field_type,
                    size,
                    offset: value_size,
                    binding: Some(binding),
                });
                value_size += size;
            }
        }
    }

    if key_fields.is_empty() {
        return Err(AggrError::NoKeyFields);
    }
    if value_fields.is_empty() {
        return Err(AggrError::NoValueFields);
    }

    debug!(
        target: "flow_aggr::schema",
        key_fields = key_fields.len(),
        key_size,
        value_fields = value_fields.len(),
        value_size,
        "Compiled aggregation schema"
    );

    Ok(Schema {
        key_fields,
        key_size,
        value_fields,
        value_size,
    })
}
