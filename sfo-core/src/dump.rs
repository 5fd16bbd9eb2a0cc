//! Human-readable rendering of decoded files.

use std::fmt;

use crate::format::{Document, Layout, Value};

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::StringSpecial(b) | Value::StringUtf8(b) => {
                write!(f, "{}", String::from_utf8_lossy(b).escape_debug())
            }
            Value::UInt32(v) => write!(f, "{v} (0x{v:08X})"),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SFO File Signature: {}", self.signature.escape_ascii())?;
        writeln!(f, "SFO File Version: {}", self.version_string())?;
        for (name, value) in self.iter() {
            writeln!(f, "{}: {}", String::from_utf8_lossy(name), value)?;
        }
        Ok(())
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        writeln!(f, "signature:        {}", h.signature.escape_ascii())?;
        writeln!(f, "version:          {}", h.version_string())?;
        writeln!(f, "name_table_start: 0x{:X}", h.name_table_start)?;
        writeln!(f, "data_table_start: 0x{:X}", h.data_table_start)?;
        writeln!(f, "n_params:         {}", h.n_params)?;
        for (i, e) in self.entries.iter().enumerate() {
            let r = &e.record;
            writeln!(
                f,
                "[{i:3}] name_off=0x{:04X} type=0x{:04X} len={:<4} max={:<4} data_off=0x{:06X} {}",
                r.name_offset,
                r.type_code,
                r.data_len,
                r.data_max_len,
                r.data_offset,
                String::from_utf8_lossy(&e.name),
            )?;
        }
        Ok(())
    }
}
