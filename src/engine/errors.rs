use thiserror::Error;
use tracing::{debug, error, warn};

use crate::engine::schema::AggregateFunction;
use crate::engine::types::{FieldId, FieldType};

/// Failure reported by a caller-supplied field extractor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("field not present in record")]
    NotFound,

    #[error("invalid field value: {0}")]
    Invalid(String),
}

/// Errors surfaced by schema compilation, record ingestion and table growth.
#[derive(Debug, Error)]
pub enum AggrError {
    #[error("Schema cannot be empty")]
    EmptySchema,

    #[error("Schema declares no key fields")]
    NoKeyFields,

    #[error("Schema declares no aggregate fields")]
    NoValueFields,

    #[error("Function {function} is not supported for field {field} of type {field_type}")]
    InvalidFunctionForType {
        field: FieldId,
        function: AggregateFunction,
        field_type: FieldType,
    },

    #[error("Field {0} declared twice with the same role")]
    DuplicateFieldId(FieldId),

    #[error("Bucket count must be greater than zero")]
    InvalidBucketCount,

    #[error("Unknown field type: {0}")]
    UnknownType(String),

    #[error("Out of memory while allocating {what}")]
    OutOfMemory { what: &'static str },

    #[error("Extraction of field {field} failed: {source}")]
    FieldExtractionFailed {
        field: FieldId,
        #[source]
        source: ExtractError,
    },

    #[error("Field {field} declared as {expected} but extractor returned {found}")]
    ValueTypeMismatch {
        field: FieldId,
        expected: FieldType,
        found: FieldType,
    },

    #[error("Function {function} cannot combine values of type {field_type}")]
    UnsupportedTypeForFunction {
        function: AggregateFunction,
        field_type: FieldType,
    },

    #[error("Slot for {field_type} must be {expected} bytes, got {found}")]
    SlotSize {
        field_type: FieldType,
        expected: usize,
        found: usize,
    },

    #[error("Packed buffer must be {expected} bytes, got {found}")]
    BufferSize { expected: usize, found: usize },
}

impl AggrError {
    /// True for errors that reject a single record and leave the engine usable.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            AggrError::FieldExtractionFailed { .. } | AggrError::ValueTypeMismatch { .. }
        )
    }

    pub fn log_error(&self) {
        match self {
            AggrError::FieldExtractionFailed { field, source } => {
                warn!("Record rejected, field {} not extracted: {}", field, source);
            }
            AggrError::ValueTypeMismatch { .. } => {
                warn!("Record rejected: {}", self);
            }
            AggrError::OutOfMemory { what } => {
                error!("Allocation failed: {}", what);
            }
            AggrError::UnsupportedTypeForFunction { .. }
            | AggrError::SlotSize { .. }
            | AggrError::BufferSize { .. } => {
                error!("Internal aggregation error: {}", self);
                debug!("Internal aggregation error details: {:?}", self);
            }
            _ => {
                error!("Aggregator configuration error: {}", self);
                debug!("Configuration error details: {:?}", self);
            }
        }
    }
}
