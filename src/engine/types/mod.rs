use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::engine::errors::AggrError;

/// Width of the fixed slot used for string / octet-array fields.
/// Longer values are truncated, shorter ones zero-padded.
pub const STRING_SLOT_WIDTH: usize = 8;

/// Opaque identifier of a record field.
///
/// IPFIX information elements are addressed by an (enterprise, element) pair;
/// `FieldId::ipfix` packs both into the upper and lower halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u64);

impl FieldId {
    pub const fn new(raw: u64) -> Self {
        FieldId(raw)
    }

    pub const fn ipfix(enterprise: u32, element: u16) -> Self {
        FieldId(((enterprise as u64) << 32) | element as u64)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn enterprise(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub const fn element(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl From<u64> for FieldId {
    fn from(raw: u64) -> Self {
        FieldId(raw)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enterprise() == 0 {
            write!(f, "{}", self.0)
        } else {
            write!(f, "{}:{}", self.enterprise(), self.element())
        }
    }
}

/// Type catalog of everything the aggregator can store in a packed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Double,
    Boolean,
    MacAddress,
    String,
    IpAddress,
    TimestampNanos,
}

impl FieldType {
    pub const ALL: [FieldType; 14] = [
        FieldType::U8,
        FieldType::U16,
        FieldType::U32,
        FieldType::U64,
        FieldType::I8,
        FieldType::I16,
        FieldType::I32,
        FieldType::I64,
        FieldType::Double,
        FieldType::Boolean,
        FieldType::MacAddress,
        FieldType::String,
        FieldType::IpAddress,
        FieldType::TimestampNanos,
    ];

    /// Fixed width in bytes of the packed representation.
    pub const fn size_of(&self) -> usize {
        match self {
            FieldType::U8 | FieldType::I8 | FieldType::Boolean => 1,
            FieldType::U16 | FieldType::I16 => 2,
            FieldType::U32 | FieldType::I32 => 4,
            FieldType::U64 | FieldType::I64 | FieldType::Double | FieldType::TimestampNanos => 8,
            FieldType::MacAddress => 6,
            FieldType::String => STRING_SLOT_WIDTH,
            FieldType::IpAddress => 16,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::U8 => "unsigned8",
            FieldType::U16 => "unsigned16",
            FieldType::U32 => "unsigned32",
            FieldType::U64 => "unsigned64",
            FieldType::I8 => "signed8",
            FieldType::I16 => "signed16",
            FieldType::I32 => "signed32",
            FieldType::I64 => "signed64",
            FieldType::Double => "double",
            FieldType::Boolean => "boolean",
            FieldType::MacAddress => "macAddress",
            FieldType::String => "string",
            FieldType::IpAddress => "ipAddress",
            FieldType::TimestampNanos => "dateTimeNanoseconds",
        }
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            FieldType::U8 | FieldType::U16 | FieldType::U32 | FieldType::U64
        )
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            FieldType::I8 | FieldType::I16 | FieldType::I32 | FieldType::I64
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = AggrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "u8" | "uint8" | "unsigned8" => Ok(FieldType::U8),
            "u16" | "uint16" | "unsigned16" => Ok(FieldType::U16),
            "u32" | "uint32" | "unsigned32" => Ok(FieldType::U32),
            "u64" | "uint64" | "unsigned64" => Ok(FieldType::U64),
            "i8" | "int8" | "signed8" => Ok(FieldType::I8),
            "i16" | "int16" | "signed16" => Ok(FieldType::I16),
            "i32" | "int32" | "signed32" => Ok(FieldType::I32),
            "i64" | "int64" | "signed64" => Ok(FieldType::I64),
            "double" | "f64" | "float64" => Ok(FieldType::Double),
            "bool" | "boolean" => Ok(FieldType::Boolean),
            "mac" | "macaddress" => Ok(FieldType::MacAddress),
            "string" | "str" | "octetarray" => Ok(FieldType::String),
            "ip" | "ipaddress" | "ipv4address" | "ipv6address" => Ok(FieldType::IpAddress),
            "timestamp" | "datetimenanoseconds" => Ok(FieldType::TimestampNanos),
            _ => Err(AggrError::UnknownType(s.to_string())),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single extracted field value, tagged with its type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    Boolean(bool),
    MacAddress([u8; 6]),
    String(Vec<u8>),
    IpAddress(IpAddr),
    TimestampNanos(u64),
}

impl TypedValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            TypedValue::U8(_) => FieldType::U8,
            TypedValue::U16(_) => FieldType::U16,
            TypedValue::U32(_) => FieldType::U32,
            TypedValue::U64(_) => FieldType::U64,
            TypedValue::I8(_) => FieldType::I8,
            TypedValue::I16(_) => FieldType::I16,
            TypedValue::I32(_) => FieldType::I32,
            TypedValue::I64(_) => FieldType::I64,
            TypedValue::Double(_) => FieldType::Double,
            TypedValue::Boolean(_) => FieldType::Boolean,
            TypedValue::MacAddress(_) => FieldType::MacAddress,
            TypedValue::String(_) => FieldType::String,
            TypedValue::IpAddress(_) => FieldType::IpAddress,
            TypedValue::TimestampNanos(_) => FieldType::TimestampNanos,
        }
    }

    /// Writes the canonical representation into `dst`, which must be exactly
    /// `self.field_type().size_of()` bytes long. `dst` is left untouched on
    /// a length mismatch.
    pub fn encode_into(&self, dst: &mut [u8]) -> Result<(), AggrError> {
        let ty = self.field_type();
        if dst.len() != ty.size_of() {
            return Err(AggrError::SlotSize {
                field_type: ty,
                expected: ty.size_of(),
                found: dst.len(),
            });
        }
        match self {
            TypedValue::U8(v) => dst.copy_from_slice(&v.to_ne_bytes()),
            TypedValue::U16(v) => dst.copy_from_slice(&v.to_ne_bytes()),
            TypedValue::U32(v) => dst.copy_from_slice(&v.to_ne_bytes()),
            TypedValue::U64(v) => dst.copy_from_slice(&v.to_ne_bytes()),
            TypedValue::I8(v) => dst.copy_from_slice(&v.to_ne_bytes()),
            TypedValue::I16(v) => dst.copy_from_slice(&v.to_ne_bytes()),
            TypedValue::I32(v) => dst.copy_from_slice(&v.to_ne_bytes()),
            TypedValue::I64(v) => dst.copy_from_slice(&v.to_ne_bytes()),
            TypedValue::Double(v) => dst.copy_from_slice(&v.to_ne_bytes()),
            TypedValue::Boolean(v) => dst[0] = u8::from(*v),
            TypedValue::MacAddress(mac) => dst.copy_from_slice(mac),
            TypedValue::String(bytes) => {
                let n = bytes.len().min(dst.len());
                dst[..n].copy_from_slice(&bytes[..n]);
                dst[n..].fill(0);
            }
            TypedValue::IpAddress(addr) => {
                let v6 = match addr {
                    IpAddr::V4(v4) => v4.to_ipv6_mapped(),
                    IpAddr::V6(v6) => *v6,
                };
                dst.copy_from_slice(&v6.octets());
            }
            TypedValue::TimestampNanos(v) => dst.copy_from_slice(&v.to_ne_bytes()),
        }
        Ok(())
    }

    /// Reads a value of type `ty` back out of a packed slot.
    ///
    /// Not a perfect inverse of `encode_into`: trailing NUL bytes of a string
    /// are dropped with the padding, and an IPv6 address inside
    /// `::ffff:0:0/96` comes back as the IPv4 address it maps. Grouping is
    /// unaffected since keys compare the packed bytes.
    pub fn decode(ty: FieldType, src: &[u8]) -> Result<TypedValue, AggrError> {
        if src.len() != ty.size_of() {
            return Err(AggrError::SlotSize {
                field_type: ty,
                expected: ty.size_of(),
                found: src.len(),
            });
        }
        let value = match ty {
            FieldType::U8 => TypedValue::U8(src[0]),
            FieldType::U16 => TypedValue::U16(u16::from_ne_bytes([src[0], src[1]])),
            FieldType::U32 => TypedValue::U32(u32::from_ne_bytes(fixed(src))),
            FieldType::U64 => TypedValue::U64(u64::from_ne_bytes(fixed(src))),
            FieldType::I8 => TypedValue::I8(i8::from_ne_bytes([src[0]])),
            FieldType::I16 => TypedValue::I16(i16::from_ne_bytes([src[0], src[1]])),
            FieldType::I32 => TypedValue::I32(i32::from_ne_bytes(fixed(src))),
            FieldType::I64 => TypedValue::I64(i64::from_ne_bytes(fixed(src))),
            FieldType::Double => TypedValue::Double(f64::from_ne_bytes(fixed(src))),
            FieldType::Boolean => TypedValue::Boolean(src[0] != 0),
            FieldType::MacAddress => TypedValue::MacAddress(fixed(src)),
            FieldType::String => {
                let end = src.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
                TypedValue::String(src[..end].to_vec())
            }
            FieldType::IpAddress => {
                let v6 = Ipv6Addr::from(fixed::<16>(src));
                match v6.to_ipv4_mapped() {
                    Some(v4) => TypedValue::IpAddress(IpAddr::V4(v4)),
                    None => TypedValue::IpAddress(IpAddr::V6(v6)),
                }
            }
            FieldType::TimestampNanos => TypedValue::TimestampNanos(u64::from_ne_bytes(fixed(src))),
        };
        Ok(value)
    }

    pub fn ipv4(a: u8, b: u8, c: u8, d: u8) -> TypedValue {
        TypedValue::IpAddress(IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
    }
}

// Callers check the slice length before calling.
fn fixed<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&src[..N]);
    out
}
