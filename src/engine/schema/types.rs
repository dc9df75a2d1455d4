use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::engine::core::aggregate::AggregateBinding;
use crate::engine::errors::AggrError;
use crate::engine::types::{FieldId, FieldType, TypedValue};

/// Combine function applied to an aggregate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Min,
    Max,
    BitwiseOr,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 4] = [
        AggregateFunction::Sum,
        AggregateFunction::Min,
        AggregateFunction::Max,
        AggregateFunction::BitwiseOr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::BitwiseOr => "or",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a declared field is used for: part of the group key, or combined
/// into the running aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Key,
    Aggregate(AggregateFunction),
}

impl FieldRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldRole::Key => "key",
            FieldRole::Aggregate(f) => f.as_str(),
        }
    }
}

impl FromStr for FieldRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "key" => Ok(FieldRole::Key),
            "sum" | "total" => Ok(FieldRole::Aggregate(AggregateFunction::Sum)),
            "min" => Ok(FieldRole::Aggregate(AggregateFunction::Min)),
            "max" => Ok(FieldRole::Aggregate(AggregateFunction::Max)),
            "or" | "bitwise_or" => Ok(FieldRole::Aggregate(AggregateFunction::BitwiseOr)),
            other => Err(format!("unknown field role '{}'", other)),
        }
    }
}

impl Serialize for FieldRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Caller-supplied description of one input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub role: FieldRole,
}

impl FieldDescriptor {
    pub fn key(id: impl Into<FieldId>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            field_type,
            role: FieldRole::Key,
        }
    }

    pub fn aggregate(
        id: impl Into<FieldId>,
        field_type: FieldType,
        function: AggregateFunction,
    ) -> Self {
        Self {
            id: id.into(),
            field_type,
            role: FieldRole::Aggregate(function),
        }
    }
}

/// A descriptor resolved to its place inside a packed buffer.
///
/// Only the schema compiler builds these, so a value field always carries a
/// binding that was validated for its type.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledField {
    pub(crate) id: FieldId,
    pub(crate) field_type: FieldType,
    pub(crate) size: usize,
    pub(crate) offset: usize,
    pub(crate) binding: Option<AggregateBinding>,
}

impl CompiledField {
    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte range of this field inside its packed buffer.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.size
    }

    pub fn function(&self) -> Option<AggregateFunction> {
        self.binding.map(|b| b.function())
    }

    pub fn binding(&self) -> Option<AggregateBinding> {
        self.binding
    }
}

/// Compiled key and value layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub(crate) key_fields: Vec<CompiledField>,
    pub(crate) key_size: usize,
    pub(crate) value_fields: Vec<CompiledField>,
    pub(crate) value_size: usize,
}

impl Schema {
    pub fn key_fields(&self) -> &[CompiledField] {
        &self.key_fields
    }

    pub fn value_fields(&self) -> &[CompiledField] {
        &self.value_fields
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    pub fn key_field(&self, id: FieldId) -> Option<&CompiledField> {
        self.key_fields.iter().find(|f| f.id == id)
    }

    pub fn value_field(&self, id: FieldId, function: AggregateFunction) -> Option<&CompiledField> {
        self.value_fields
            .iter()
            .find(|f| f.id == id && f.function() == Some(function))
    }

    pub fn decode_key(&self, key: &[u8]) -> Result<Vec<TypedValue>, AggrError> {
        decode_layout(&self.key_fields, self.key_size, key)
    }

    pub fn decode_values(&self, values: &[u8]) -> Result<Vec<TypedValue>, AggrError> {
        decode_layout(&self.value_fields, self.value_size, values)
    }
}

fn decode_layout(
    fields: &[CompiledField],
    total: usize,
    buf: &[u8],
) -> Result<Vec<TypedValue>, AggrError> {
    if buf.len() != total {
        return Err(AggrError::BufferSize {
            expected: total,
            found: buf.len(),
        });
    }
    fields
        .iter()
        .map(|f| TypedValue::decode(f.field_type, &buf[f.range()]))
        .collect()
}
