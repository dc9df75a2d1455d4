use super::flow_record_factory::ie;
use crate::engine::schema::{AggregateFunction, FieldDescriptor, Schema, compile};
use crate::engine::types::FieldType;

/// Builds descriptor lists; defaults to `protocol -> sum(octets)`.
pub struct SchemaFactory {
    descriptors: Vec<FieldDescriptor>,
}

impl SchemaFactory {
    pub fn new() -> Self {
        Self {
            descriptors: vec![
                FieldDescriptor::key(ie::PROTOCOL_IDENTIFIER, FieldType::U8),
                FieldDescriptor::aggregate(
                    ie::OCTET_DELTA_COUNT,
                    FieldType::U64,
                    AggregateFunction::Sum,
                ),
            ],
        }
    }

    pub fn empty() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    pub fn with_key(mut self, id: u64, field_type: FieldType) -> Self {
        self.descriptors.push(FieldDescriptor::key(id, field_type));
        self
    }

    pub fn with_aggregate(
        mut self,
        id: u64,
        field_type: FieldType,
        function: AggregateFunction,
    ) -> Self {
        self.descriptors
            .push(FieldDescriptor::aggregate(id, field_type, function));
        self
    }

    pub fn descriptors(self) -> Vec<FieldDescriptor> {
        self.descriptors
    }

    pub fn create(self) -> Schema {
        compile(&self.descriptors).expect("factory schema must compile")
    }
}
