use std::ops::BitOr;

use crate::engine::errors::AggrError;
use crate::engine::schema::AggregateFunction;
use crate::engine::types::FieldType;

/// A (function, type) pair that passed validation.
///
/// Can only be obtained through [`AggregateBinding::new`], which refuses
/// unsupported pairs, so combining through a binding never hits the
/// unsupported path in [`combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateBinding {
    function: AggregateFunction,
    field_type: FieldType,
}

impl AggregateBinding {
    pub fn new(function: AggregateFunction, field_type: FieldType) -> Option<Self> {
        supports(function, field_type).then_some(Self {
            function,
            field_type,
        })
    }

    pub fn function(&self) -> AggregateFunction {
        self.function
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    #[inline]
    pub fn combine(&self, existing: &mut [u8], incoming: &[u8]) -> Result<(), AggrError> {
        combine(self.function, self.field_type, existing, incoming)
    }
}

/// Whether `function` has a meaning for values of `field_type`.
pub fn supports(function: AggregateFunction, field_type: FieldType) -> bool {
    let integer = field_type.is_unsigned() || field_type.is_signed();
    match function {
        AggregateFunction::Sum => integer || field_type == FieldType::Double,
        AggregateFunction::Min | AggregateFunction::Max => {
            integer || matches!(field_type, FieldType::Double | FieldType::TimestampNanos)
        }
        AggregateFunction::BitwiseOr => {
            field_type.is_unsigned() || field_type == FieldType::Boolean
        }
    }
}

/// Fold `incoming` into `existing`, both packed slots of `field_type`.
pub fn combine(
    function: AggregateFunction,
    field_type: FieldType,
    existing: &mut [u8],
    incoming: &[u8],
) -> Result<(), AggrError> {
    let width = field_type.size_of();
    for len in [existing.len(), incoming.len()] {
        if len != width {
            return Err(AggrError::SlotSize {
                field_type,
                expected: width,
                found: len,
            });
        }
    }

    use AggregateFunction::{BitwiseOr, Max, Min, Sum};
    match (function, field_type) {
        (Sum, FieldType::U8) => sum::<u8>(existing, incoming),
        (Sum, FieldType::U16) => sum::<u16>(existing, incoming),
        (Sum, FieldType::U32) => sum::<u32>(existing, incoming),
        (Sum, FieldType::U64) => sum::<u64>(existing, incoming),
        (Sum, FieldType::I8) => sum::<i8>(existing, incoming),
        (Sum, FieldType::I16) => sum::<i16>(existing, incoming),
        (Sum, FieldType::I32) => sum::<i32>(existing, incoming),
        (Sum, FieldType::I64) => sum::<i64>(existing, incoming),
        (Sum, FieldType::Double) => sum::<f64>(existing, incoming),

        (Min, FieldType::U8) => min::<u8>(existing, incoming),
        (Min, FieldType::U16) => min::<u16>(existing, incoming),
        (Min, FieldType::U32) => min::<u32>(existing, incoming),
        (Min, FieldType::U64 | FieldType::TimestampNanos) => min::<u64>(existing, incoming),
        (Min, FieldType::I8) => min::<i8>(existing, incoming),
        (Min, FieldType::I16) => min::<i16>(existing, incoming),
        (Min, FieldType::I32) => min::<i32>(existing, incoming),
        (Min, FieldType::I64) => min::<i64>(existing, incoming),
        (Min, FieldType::Double) => min::<f64>(existing, incoming),

        (Max, FieldType::U8) => max::<u8>(existing, incoming),
        (Max, FieldType::U16) => max::<u16>(existing, incoming),
        (Max, FieldType::U32) => max::<u32>(existing, incoming),
        (Max, FieldType::U64 | FieldType::TimestampNanos) => max::<u64>(existing, incoming),
        (Max, FieldType::I8) => max::<i8>(existing, incoming),
        (Max, FieldType::I16) => max::<i16>(existing, incoming),
        (Max, FieldType::I32) => max::<i32>(existing, incoming),
        (Max, FieldType::I64) => max::<i64>(existing, incoming),
        (Max, FieldType::Double) => max::<f64>(existing, incoming),

        (BitwiseOr, FieldType::U8) => or::<u8>(existing, incoming),
        (BitwiseOr, FieldType::U16) => or::<u16>(existing, incoming),
        (BitwiseOr, FieldType::U32) => or::<u32>(existing, incoming),
        (BitwiseOr, FieldType::U64) => or::<u64>(existing, incoming),
        // Booleans are stored as 0/1, so OR-ing the byte keeps them canonical.
        (BitwiseOr, FieldType::Boolean) => or::<u8>(existing, incoming),

        (function, field_type) => {
            return Err(AggrError::UnsupportedTypeForFunction {
                function,
                field_type,
            });
        }
    }
    Ok(())
}

/// Native numeric view of a packed slot.
trait Slot: Copy + PartialOrd {
    fn load(src: &[u8]) -> Self;
    fn store(self, dst: &mut [u8]);
    fn accumulate(self, other: Self) -> Self;
}

macro_rules! int_slot {
    ($($t:ty),*) => {
        $(
            impl Slot for $t {
                #[inline]
                fn load(src: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(src);
                    <$t>::from_ne_bytes(buf)
                }

                #[inline]
                fn store(self, dst: &mut [u8]) {
                    dst.copy_from_slice(&self.to_ne_bytes());
                }

                #[inline]
                fn accumulate(self, other: Self) -> Self {
                    self.wrapping_add(other)
                }
            }
        )*
    };
}

int_slot!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Slot for f64 {
    #[inline]
    fn load(src: &[u8]) -> Self {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(src);
        f64::from_ne_bytes(buf)
    }

    #[inline]
    fn store(self, dst: &mut [u8]) {
        dst.copy_from_slice(&self.to_ne_bytes());
    }

    #[inline]
    fn accumulate(self, other: Self) -> Self {
        self + other
    }
}

#[inline]
fn sum<T: Slot>(existing: &mut [u8], incoming: &[u8]) {
    T::load(existing).accumulate(T::load(incoming)).store(existing);
}

#[inline]
fn min<T: Slot>(existing: &mut [u8], incoming: &[u8]) {
    let candidate = T::load(incoming);
    if candidate < T::load(existing) {
        candidate.store(existing);
    }
}

#[inline]
fn max<T: Slot>(existing: &mut [u8], incoming: &[u8]) {
    let candidate = T::load(incoming);
    if candidate > T::load(existing) {
        candidate.store(existing);
    }
}

#[inline]
fn or<T: Slot + BitOr<Output = T>>(existing: &mut [u8], incoming: &[u8]) {
    (T::load(existing) | T::load(incoming)).store(existing);
}
