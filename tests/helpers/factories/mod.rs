pub mod flow_record_factory;
pub mod schema_factory;

pub use flow_record_factory::{FlowRecord, FlowRecordFactory, extract_field};
pub use schema_factory::SchemaFactory;

#[cfg(test)]
mod flow_record_factory_test;
