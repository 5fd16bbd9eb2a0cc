use std::borrow::Cow;

use crate::error::SfoError;

/// Tag stored in [`IndexRecord::type_code`](super::IndexRecord::type_code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TypeCode {
    /// Raw bytes, not necessarily text.
    SpecialString = 0x0004,
    /// NUL-terminated UTF-8 text.
    Utf8String = 0x0204,
    /// Little-endian u32.
    UInt32 = 0x0404,
}

impl TypeCode {
    pub const ALL: [TypeCode; 3] = [TypeCode::SpecialString, TypeCode::Utf8String, TypeCode::UInt32];

    /// Name used by type metadata files.
    pub fn meta_name(self) -> &'static str {
        match self {
            TypeCode::SpecialString => "utf-8 Special Mode",
            TypeCode::Utf8String => "utf-8",
            TypeCode::UInt32 => "integer",
        }
    }

    pub fn from_meta_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.meta_name() == name)
    }

    pub fn is_string(self) -> bool {
        !matches!(self, TypeCode::UInt32)
    }
}

impl TryFrom<u16> for TypeCode {
    type Error = SfoError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            0x0004 => Ok(TypeCode::SpecialString),
            0x0204 => Ok(TypeCode::Utf8String),
            0x0404 => Ok(TypeCode::UInt32),
            _ => Err(SfoError::UnknownTypeCode(code)),
        }
    }
}

impl From<TypeCode> for u16 {
    fn from(code: TypeCode) -> u16 {
        code as u16
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Stored without NUL padding; inner NULs are kept.
    StringSpecial(Vec<u8>),
    /// Stored without its NUL terminator.
    StringUtf8(Vec<u8>),
    UInt32(u32),
}

impl Value {
    pub fn type_code(&self) -> TypeCode {
        match self {
            Value::StringSpecial(_) => TypeCode::SpecialString,
            Value::StringUtf8(_) => TypeCode::Utf8String,
            Value::UInt32(_) => TypeCode::UInt32,
        }
    }

    /// Bytes written to the data table, before padding or termination.
    pub fn payload_len(&self) -> usize {
        match self {
            Value::StringSpecial(b) | Value::StringUtf8(b) => b.len(),
            Value::UInt32(_) => 4,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::StringSpecial(b) | Value::StringUtf8(b) => Some(b),
            Value::UInt32(_) => None,
        }
    }

    pub fn as_str_lossy(&self) -> Option<Cow<'_, str>> {
        self.as_bytes().map(String::from_utf8_lossy)
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::UInt32(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt32(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::StringUtf8(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::StringUtf8(s.into_bytes())
    }
}
