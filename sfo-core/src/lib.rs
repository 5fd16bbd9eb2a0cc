//! sfo-core
//!
//! Reader and writer for SFO ("System Object File") parameter containers.
//!
//! An SFO file is a flat blob made of four regions: a 20-byte header, an index
//! table with one 16-byte record per parameter, a table of NUL-terminated names
//! and a table of NUL-padded values. [`decode`] turns such a blob into a
//! [`Document`]; [`encode`] writes a [`Document`] back, using a [`TypeLookup`]
//! to decide how much space every value gets.

pub mod dump;
pub mod error;
pub mod format;
pub mod meta;

pub use error::{Region, Result, SfoError};
pub use format::{
    decode, decode_layout, encode, Document, Entry, Header, IndexRecord, Layout, TypeCode, Value,
};
pub use meta::{ParamType, ParamTypes, TypeLookup};
