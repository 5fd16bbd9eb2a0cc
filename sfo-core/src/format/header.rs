use binrw::{BinRead, BinWrite};
use itertools::Itertools;

pub const HEADER_SIZE: usize = 20;
pub const INDEX_RECORD_SIZE: usize = 16;

#[derive(BinRead, BinWrite, Clone, Debug, PartialEq, Eq)]
#[brw(little)]
pub struct Header {
    pub signature: [u8; 4],
    pub version: [u8; 4],
    pub name_table_start: u32,
    pub data_table_start: u32,
    pub n_params: u32,
}

impl Header {
    /// Bytes taken by the index table.
    pub fn index_table_bytes(&self) -> u64 {
        INDEX_RECORD_SIZE as u64 * self.n_params as u64
    }

    /// Where the name table would start with no padding after the index table.
    pub fn min_name_table_start(&self) -> u64 {
        HEADER_SIZE as u64 + self.index_table_bytes()
    }

    /// Filler between the index table and the name table.
    /// `None` when the two regions overlap.
    pub fn index_padding(&self) -> Option<u64> {
        (self.name_table_start as u64).checked_sub(self.min_name_table_start())
    }

    /// `None` when the data table starts before the name table.
    pub fn name_table_bytes(&self) -> Option<u32> {
        self.data_table_start.checked_sub(self.name_table_start)
    }

    pub fn version_string(&self) -> String {
        self.version.iter().join(".")
    }
}

/// One entry of the index (definition) table.
#[derive(BinRead, BinWrite, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[brw(little)]
pub struct IndexRecord {
    pub name_offset: u16,
    pub type_code: u16,
    /// Meaningful bytes of the value.
    pub data_len: u32,
    /// Bytes allocated to the value in the data table.
    pub data_max_len: u32,
    pub data_offset: u32,
}
