pub mod engine;
pub mod logging;
pub mod shared;

pub use engine::aggregator::{Aggregator, IngestReport};
pub use engine::core::pack::FieldExtractor;
pub use engine::errors::{AggrError, ExtractError};
pub use engine::schema::{AggregateFunction, FieldDescriptor, FieldRole, Schema};
pub use engine::types::{FieldId, FieldType, TypedValue};

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
pub mod test_helpers;
