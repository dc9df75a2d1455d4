use crate::engine::errors::ExtractError;
use crate::engine::types::{FieldId, TypedValue};
use std::collections::HashMap;

/// Well-known IPFIX element ids used across tests.
pub mod ie {
    pub const OCTET_DELTA_COUNT: u64 = 1;
    pub const PACKET_DELTA_COUNT: u64 = 2;
    pub const PROTOCOL_IDENTIFIER: u64 = 4;
    pub const TCP_CONTROL_BITS: u64 = 6;
    pub const SOURCE_TRANSPORT_PORT: u64 = 7;
    pub const SOURCE_IPV4_ADDRESS: u64 = 8;
    pub const DESTINATION_TRANSPORT_PORT: u64 = 11;
    pub const DESTINATION_IPV4_ADDRESS: u64 = 12;
    pub const FLOW_START_NANOSECONDS: u64 = 156;
    pub const MAX_LATENCY: u64 = 9001;
}

/// In-memory stand-in for a decoded IPFIX data record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowRecord {
    pub fields: HashMap<FieldId, TypedValue>,
}

/// Extractor used by tests: looks the field up by id.
pub fn extract_field(record: &FlowRecord, field: FieldId) -> Result<TypedValue, ExtractError> {
    record
        .fields
        .get(&field)
        .cloned()
        .ok_or(ExtractError::NotFound)
}

pub struct FlowRecordFactory {
    fields: HashMap<FieldId, TypedValue>,
}

impl FlowRecordFactory {
    pub fn new() -> Self {
        let mut fields = HashMap::new();
        fields.insert(FieldId(ie::PROTOCOL_IDENTIFIER), TypedValue::U8(6));
        fields.insert(FieldId(ie::OCTET_DELTA_COUNT), TypedValue::U64(0));
        Self { fields }
    }

    pub fn with(mut self, id: u64, value: TypedValue) -> Self {
        self.fields.insert(FieldId(id), value);
        self
    }

    pub fn without(mut self, id: u64) -> Self {
        self.fields.remove(&FieldId(id));
        self
    }

    pub fn create(self) -> FlowRecord {
        FlowRecord {
            fields: self.fields,
        }
    }

    /// `count` records sharing all fields except the byte counter, which
    /// takes a random value in 0..1000.
    pub fn create_list(self, count: usize) -> Vec<FlowRecord> {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|_| {
                let mut fields = self.fields.clone();
                fields.insert(
                    FieldId(ie::OCTET_DELTA_COUNT),
                    TypedValue::U64(rng.gen_range(0..1000)),
                );
                FlowRecord { fields }
            })
            .collect()
    }
}
