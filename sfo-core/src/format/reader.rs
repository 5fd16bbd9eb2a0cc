use std::io::Cursor;
use std::iter;

use binrw::BinRead;
use byteorder::{ByteOrder, LittleEndian};

use super::{trim_trailing_nul, Document, Header, IndexRecord, TypeCode, Value};
use crate::error::{Region, Result, SfoError};

/// One parameter as it sits in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub record: IndexRecord,
    /// Name with its NUL padding removed.
    pub name: Vec<u8>,
    pub value: Value,
}

/// Structural view of a decoded file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub header: Header,
    pub entries: Vec<Entry>,
}

impl Layout {
    /// Collapse into a [`Document`], rejecting repeated names.
    pub fn into_document(self) -> Result<Document> {
        Document::from_params(
            self.header.signature,
            self.header.version,
            self.entries.into_iter().map(|e| (e.name, e.value)),
        )
    }
}

/// Decode an SFO buffer into a [`Document`].
pub fn decode(bytes: &[u8]) -> Result<Document> {
    decode_layout(bytes)?.into_document()
}

/// Decode an SFO buffer, keeping the header and index records.
pub fn decode_layout(bytes: &[u8]) -> Result<Layout> {
    let mut cur = Cursor::new(bytes);

    let header = Header::read(&mut cur).map_err(|e| SfoError::from_read(e, Region::Header))?;
    log::debug!(
        "sfo header: version={} name_table_start=0x{:X} data_table_start=0x{:X} n_params={}",
        header.version_string(),
        header.name_table_start,
        header.data_table_start,
        header.n_params
    );

    let padding = header.index_padding().ok_or(SfoError::NegativePadding {
        name_table_start: header.name_table_start,
        required: header.min_name_table_start(),
    })?;
    let name_table_bytes = header.name_table_bytes().ok_or_else(|| {
        SfoError::InvalidLayout(format!(
            "data table (0x{:X}) starts before name table (0x{:X})",
            header.data_table_start, header.name_table_start
        ))
    })?;

    // Don't trust n_params for the allocation before the table is known to fit.
    if header.min_name_table_start() > bytes.len() as u64 {
        return Err(SfoError::TruncatedInput {
            region: Region::IndexTable,
        });
    }
    let records = (0..header.n_params)
        .map(|_| IndexRecord::read(&mut cur).map_err(|e| SfoError::from_read(e, Region::IndexTable)))
        .collect::<Result<Vec<_>>>()?;

    // The filler carries no meaning, it only has to be present.
    let filler = region(bytes, cur.position(), padding, Region::Padding)?;
    if filler.iter().any(|&b| b != 0) {
        log::warn!("index table padding holds non-zero bytes: {:02X?}", filler);
    } else if padding > 0 {
        log::trace!("skipping {} bytes of index table padding", padding);
    }

    let names = read_names(bytes, &header, &records, name_table_bytes)?;

    let mut entries = Vec::with_capacity(records.len());
    let mut data_pos = header.data_table_start as u64;
    for (record, name) in records.into_iter().zip(names) {
        if record.data_len > record.data_max_len {
            return Err(SfoError::InvalidLayout(format!(
                "parameter {:?}: data_len {} exceeds data_max_len {}",
                String::from_utf8_lossy(&name),
                record.data_len,
                record.data_max_len
            )));
        }
        let expected_offset = data_pos - header.data_table_start as u64;
        if record.data_offset as u64 != expected_offset {
            log::warn!(
                "parameter {:?}: data_offset 0x{:X} disagrees with sequential position 0x{:X}",
                String::from_utf8_lossy(&name),
                record.data_offset,
                expected_offset
            );
        }

        let slot = region(bytes, data_pos, record.data_max_len as u64, Region::DataTable)?;
        let value = decode_value(record.type_code, &slot[..record.data_len as usize])?;
        log::trace!("{:?} = {:?}", String::from_utf8_lossy(&name), value);

        data_pos += record.data_max_len as u64;
        entries.push(Entry {
            record,
            name,
            value,
        });
    }

    Ok(Layout { header, entries })
}

/// Name lengths come from the gap to the next record's offset; the last name
/// runs to the end of the name table.
fn read_names(
    bytes: &[u8],
    header: &Header,
    records: &[IndexRecord],
    name_table_bytes: u32,
) -> Result<Vec<Vec<u8>>> {
    let ends = records
        .iter()
        .skip(1)
        .map(|r| r.name_offset as u32)
        .chain(iter::once(name_table_bytes));

    records
        .iter()
        .zip(ends)
        .map(|(record, end)| {
            let start = record.name_offset as u32;
            let len = end.checked_sub(start).ok_or_else(|| {
                SfoError::InvalidLayout(format!(
                    "name offsets out of order: 0x{:X} followed by 0x{:X}",
                    start, end
                ))
            })?;
            let raw = region(
                bytes,
                header.name_table_start as u64 + start as u64,
                len as u64,
                Region::NameTable,
            )?;
            Ok(trim_trailing_nul(raw).to_vec())
        })
        .collect()
}

fn decode_value(type_code: u16, raw: &[u8]) -> Result<Value> {
    // Both string kinds drop their NUL padding; the terminator the writer
    // appends must not leak into the value.
    let value = match TypeCode::try_from(type_code)? {
        TypeCode::SpecialString => Value::StringSpecial(trim_trailing_nul(raw).to_vec()),
        TypeCode::Utf8String => Value::StringUtf8(trim_trailing_nul(raw).to_vec()),
        TypeCode::UInt32 => {
            if raw.len() != 4 {
                return Err(SfoError::InvalidLayout(format!(
                    "integer value stored in {} bytes",
                    raw.len()
                )));
            }
            Value::UInt32(LittleEndian::read_u32(raw))
        }
    };
    Ok(value)
}

fn region(bytes: &[u8], start: u64, len: u64, region: Region) -> Result<&[u8]> {
    let end = start
        .checked_add(len)
        .filter(|&end| end <= bytes.len() as u64)
        .ok_or(SfoError::TruncatedInput { region })?;
    Ok(&bytes[start as usize..end as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_int_file() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"\0PSF\x01\x01\x00\x00");
        bytes.extend_from_slice(&36u32.to_le_bytes());
        bytes.extend_from_slice(&48u32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&0x0404u16.to_le_bytes());
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(b"VAL\0\0\0\0\0\0\0\0\0");
        bytes.extend_from_slice(b"\x2a\x00\x00\x00");
        bytes
    }

    #[test]
    fn layout_keeps_records() {
        let layout = decode_layout(&one_int_file()).unwrap();
        assert_eq!(layout.header.n_params, 1);
        assert_eq!(layout.entries.len(), 1);
        assert_eq!(layout.entries[0].record.type_code, 0x0404);
        assert_eq!(layout.entries[0].name, b"VAL");
        assert_eq!(layout.entries[0].value, Value::UInt32(42));
    }

    #[test]
    fn truncated_data_table() {
        let mut bytes = one_int_file();
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            decode_layout(&bytes),
            Err(SfoError::TruncatedInput {
                region: Region::DataTable
            })
        ));
    }

    #[test]
    fn truncated_header() {
        assert!(matches!(
            decode_layout(b"\0PSF\x01\x01"),
            Err(SfoError::TruncatedInput {
                region: Region::Header
            })
        ));
    }

    #[test]
    fn huge_param_count_is_truncation_not_allocation() {
        let mut bytes = one_int_file();
        bytes[16..20].copy_from_slice(&0x0100_0000u32.to_le_bytes());
        bytes[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        bytes[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            decode_layout(&bytes),
            Err(SfoError::TruncatedInput {
                region: Region::IndexTable
            })
        ));
    }

    #[test]
    fn non_zero_padding_is_tolerated() {
        let mut bytes = one_int_file();
        // move the name table back four bytes to open a padding gap
        bytes[8..12].copy_from_slice(&40u32.to_le_bytes());
        bytes[36..40].copy_from_slice(b"\xAA\xBB\xCC\xDD");
        bytes[40..48].copy_from_slice(b"VAL\0\0\0\0\0");

        let layout = decode_layout(&bytes).unwrap();
        assert_eq!(layout.entries[0].name, b"VAL");
        assert_eq!(layout.entries[0].value, Value::UInt32(42));
    }

    #[test]
    fn strings_drop_nul_padding() {
        assert_eq!(
            decode_value(0x0004, b"AB\0\0").unwrap(),
            Value::StringSpecial(b"AB".to_vec())
        );
        assert_eq!(
            decode_value(0x0004, b"A\0B").unwrap(),
            Value::StringSpecial(b"A\0B".to_vec())
        );
        assert_eq!(
            decode_value(0x0204, b"AB\0\0").unwrap(),
            Value::StringUtf8(b"AB".to_vec())
        );
    }

    #[test]
    fn short_integer_is_rejected() {
        assert!(matches!(
            decode_value(0x0404, b"\x01\x02"),
            Err(SfoError::InvalidLayout(_))
        ));
    }
}
