pub use super::factories::{FlowRecordFactory, SchemaFactory};

pub struct Factory;

impl Factory {
    pub fn flow_record() -> FlowRecordFactory {
        FlowRecordFactory::new()
    }

    pub fn schema() -> SchemaFactory {
        SchemaFactory::new()
    }
}
