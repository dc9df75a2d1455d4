use crate::engine::errors::ExtractError;
use crate::engine::types::{FieldId, TypedValue};

/// Reads one typed field out of an opaque record.
///
/// Called once per declared field per ingested record, keys first, then
/// values, in declaration order. Implementations must not depend on call
/// order or keep state between calls.
pub trait FieldExtractor<R: ?Sized> {
    fn extract(&self, record: &R, field: FieldId) -> Result<TypedValue, ExtractError>;
}

impl<R, F> FieldExtractor<R> for F
where
    R: ?Sized,
    F: Fn(&R, FieldId) -> Result<TypedValue, ExtractError>,
{
    #[inline]
    fn extract(&self, record: &R, field: FieldId) -> Result<TypedValue, ExtractError> {
        self(record, field)
    }
}
