use crate::engine::errors::ExtractError;
use crate::engine::types::{FieldId, TypedValue};
use crate::test_helpers::factories::flow_record_factory::ie;
use crate::test_helpers::factories::extract_field;
use crate::test_helpers::factory::Factory;

#[test]
fn flow_record_factory_defaults_and_overrides() {
    let record = Factory::flow_record()
        .with(ie::SOURCE_TRANSPORT_PORT, TypedValue::U16(80))
        .without(ie::OCTET_DELTA_COUNT)
        .create();

    assert_eq!(
        extract_field(&record, FieldId(ie::PROTOCOL_IDENTIFIER)),
        Ok(TypedValue::U8(6))
    );
    assert_eq!(
        extract_field(&record, FieldId(ie::SOURCE_TRANSPORT_PORT)),
        Ok(TypedValue::U16(80))
    );
    assert_eq!(
        extract_field(&record, FieldId(ie::OCTET_DELTA_COUNT)),
        Err(ExtractError::NotFound)
    );
}

#[test]
fn flow_record_factory_creates_lists() {
    let records = Factory::flow_record().create_list(5);
    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r.fields.len() == 2));
}
