use std::io::{self, Cursor, Read, Write};

use binrw::BinWrite;
use byteorder::{LittleEndian, WriteBytesExt};

use super::{Document, Header, IndexRecord, TypeCode, Value, HEADER_SIZE, INDEX_RECORD_SIZE};
use crate::error::{Result, SfoError};
use crate::meta::TypeLookup;

/// A parameter with its index record resolved, ready to be laid out.
struct Slot<'a> {
    name: &'a [u8],
    value: &'a Value,
    record: IndexRecord,
}

/// Encode a [`Document`] into an SFO buffer.
///
/// Parameters are written in ascending byte-wise name order regardless of
/// the document's order. Every parameter needs an entry in `types`; its
/// `size` becomes the value's allocation in the data table.
pub fn encode<T: TypeLookup + ?Sized>(doc: &Document, types: &T) -> Result<Vec<u8>> {
    let params = doc.sorted();

    let name_table_start = HEADER_SIZE + INDEX_RECORD_SIZE * params.len();
    let name_table_bytes: usize = params.iter().map(|(name, _)| name.len() + 1).sum();
    let data_table_start = name_table_start + name_table_bytes;

    // Resolve everything up front so a bad parameter leaves no partial output.
    let mut slots = Vec::with_capacity(params.len());
    let mut name_offset = 0usize;
    let mut data_offset = 0u64;
    for (name, value) in params {
        let record = plan_record(name, value, types, name_offset, data_offset)?;
        name_offset += name.len() + 1;
        data_offset += record.data_max_len as u64;
        slots.push(Slot {
            name,
            value,
            record,
        });
    }
    // Offsets are 32-bit, so the whole file has to stay addressable by them.
    layout_u32(data_table_start as u64 + data_offset, "file size")?;

    let header = Header {
        signature: doc.signature,
        version: doc.version,
        name_table_start: layout_u32(name_table_start, "name_table_start")?,
        data_table_start: layout_u32(data_table_start, "data_table_start")?,
        n_params: layout_u32(slots.len(), "n_params")?,
    };
    log::debug!(
        "writing sfo: n_params={} name_table_start=0x{:X} data_table_start=0x{:X} data_bytes=0x{:X}",
        header.n_params,
        header.name_table_start,
        header.data_table_start,
        data_offset
    );

    let mut out = Cursor::new(Vec::with_capacity(data_table_start));
    header.write(&mut out)?;
    for slot in &slots {
        slot.record.write(&mut out)?;
    }
    for slot in &slots {
        out.write_all(slot.name)?;
        out.write_u8(0)?;
    }
    for slot in &slots {
        write_value(&mut out, slot)?;
    }

    Ok(out.into_inner())
}

fn plan_record<T: TypeLookup + ?Sized>(
    name: &[u8],
    value: &Value,
    types: &T,
    name_offset: usize,
    data_offset: u64,
) -> Result<IndexRecord> {
    let display_name = || String::from_utf8_lossy(name).into_owned();

    // The reader strips trailing NULs from names, so these could not come back.
    if name.last() == Some(&0) {
        return Err(SfoError::InvalidLayout(format!(
            "parameter name {:?} ends in a NUL byte",
            display_name()
        )));
    }

    let ty = types
        .param_type(name)
        .ok_or_else(|| SfoError::MissingTypeMetadata(display_name()))?;
    let code = ty.type_code()?;
    if code != value.type_code() {
        return Err(SfoError::TypeMismatch {
            name: display_name(),
            declared: code.meta_name(),
            actual: value.type_code().meta_name(),
        });
    }

    let payload = value.payload_len() as u64;
    let size_error = |needed| SfoError::SizeMismatch {
        name: display_name(),
        needed,
        size: ty.size,
    };
    if code == TypeCode::UInt32 && ty.size != 4 {
        return Err(size_error(4));
    }
    if payload > ty.size as u64 {
        return Err(size_error(payload));
    }

    let data_len = if ty.fixed_length {
        ty.size as u64
    } else if code.is_string() {
        // room for the terminator
        payload + 1
    } else {
        payload
    };
    if data_len > ty.size as u64 {
        return Err(size_error(data_len));
    }

    let record = IndexRecord {
        name_offset: u16::try_from(name_offset).map_err(|_| {
            SfoError::InvalidLayout(format!(
                "name table too large: offset 0x{:X} for {:?}",
                name_offset,
                display_name()
            ))
        })?,
        type_code: code.into(),
        data_len: data_len as u32,
        data_max_len: ty.size,
        data_offset: layout_u32(data_offset, "data_offset")?,
    };
    log::trace!("{:?}: {:?}", display_name(), record);
    Ok(record)
}

fn write_value<W: Write>(out: &mut W, slot: &Slot<'_>) -> Result<()> {
    match slot.value {
        Value::StringSpecial(bytes) | Value::StringUtf8(bytes) => {
            out.write_all(bytes)?;
            let padding = slot.record.data_max_len as u64 - bytes.len() as u64;
            io::copy(&mut io::repeat(0).take(padding), out)?;
        }
        Value::UInt32(v) => out.write_u32::<LittleEndian>(*v)?,
    }
    Ok(())
}

fn layout_u32<N>(n: N, field: &str) -> Result<u32>
where
    N: Copy + std::fmt::Display + TryInto<u32>,
{
    n.try_into()
        .map_err(|_| SfoError::InvalidLayout(format!("{field} does not fit in 32 bits: {n}")))
}
