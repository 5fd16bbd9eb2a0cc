use std::fmt;

use thiserror::Error;

/// The part of the file that was being read when the input ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Header,
    IndexTable,
    Padding,
    NameTable,
    DataTable,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Header => "header",
            Region::IndexTable => "index table",
            Region::Padding => "index table padding",
            Region::NameTable => "name table",
            Region::DataTable => "data table",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SfoError {
    #[error("truncated input while reading the {region}")]
    TruncatedInput { region: Region },

    #[error("index table overlaps the name table: name_table_start=0x{name_table_start:X}, required at least 0x{required:X}")]
    NegativePadding { name_table_start: u32, required: u64 },

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("unknown type code 0x{0:04X}")]
    UnknownTypeCode(u16),

    #[error("unsupported parameter type: {0:?}")]
    UnsupportedType(String),

    #[error("no type metadata for parameter {0:?}")]
    MissingTypeMetadata(String),

    #[error("parameter name {0} is not UTF-8 and cannot be keyed in type metadata")]
    NonUtf8Name(String),

    #[error("duplicate parameter name {0:?}")]
    DuplicateName(String),

    #[error("parameter {name:?} does not fit its allocation: needs {needed} bytes, size is {size}")]
    SizeMismatch { name: String, needed: u64, size: u32 },

    #[error("parameter {name:?} is declared as {declared} but holds a {actual} value")]
    TypeMismatch {
        name: String,
        declared: &'static str,
        actual: &'static str,
    },

    #[error("type metadata: {0}")]
    Metadata(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SfoError {
    /// Maps a failed fixed-size read to [`SfoError::TruncatedInput`] when the
    /// input simply ran out.
    pub(crate) fn from_read(err: binrw::Error, region: Region) -> Self {
        if err.is_eof() {
            SfoError::TruncatedInput { region }
        } else {
            err.into()
        }
    }
}

impl From<binrw::Error> for SfoError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(e) => SfoError::Io(e),
            other => SfoError::InvalidLayout(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SfoError>;
