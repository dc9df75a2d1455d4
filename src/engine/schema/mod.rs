pub mod compiler;
pub mod types;

pub use compiler::compile;
pub use types::{AggregateFunction, CompiledField, FieldDescriptor, FieldRole, Schema};
