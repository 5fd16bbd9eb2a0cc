//! SFO container layout, reading and writing.
//!
//! Layout (all integers little-endian):
//! - 0x00: header, 20 bytes
//!     - [4] signature
//!     - [4] version bytes
//!     - u32 name_table_start
//!     - u32 data_table_start
//!     - u32 n_params
//! - 0x14: index table, n_params * 16 bytes
//!     - u16 name_offset (relative to name_table_start)
//!     - u16 type_code
//!     - u32 data_len
//!     - u32 data_max_len
//!     - u32 data_offset (relative to data_table_start)
//! - padding up to name_table_start
//! - name_table_start: NUL-terminated names
//! - data_table_start: values, each NUL-padded to its data_max_len

mod document;
mod header;
mod reader;
mod value;
mod writer;

pub use document::Document;
pub use header::{Header, IndexRecord, HEADER_SIZE, INDEX_RECORD_SIZE};
pub use reader::{decode, decode_layout, Entry, Layout};
pub use value::{TypeCode, Value};
pub use writer::encode;

/// Strip NUL padding from the end of a name or string value.
pub(crate) fn trim_trailing_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}
