use crate::{Error, Result};

/// An 8-byte name field as it appears in section headers and symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawName {
    /// The name itself, NUL padded on the right.
    Inline([u8; 8]),
    /// Byte offset of a NUL-terminated name in the string table.
    Offset(u32),
}

impl RawName {
    /// A field whose first four bytes are zero holds a string table offset in
    /// its last four.
    pub fn from_bytes(field: [u8; 8]) -> Self {
        if field[..4] == [0; 4] {
            let offset = (u32::from(field[7]) << 24)
                | (u32::from(field[6]) << 16)
                | (u32::from(field[5]) << 8)
                | u32::from(field[4]);
            RawName::Offset(offset)
        } else {
            RawName::Inline(field)
        }
    }

    pub fn resolve(self, string_table: &[u8]) -> Result<String> {
        match self {
            RawName::Inline(field) => {
                let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
                Ok(String::from_utf8_lossy(&field[..end]).into_owned())
            }
            RawName::Offset(offset) => {
                let corrupt = || Error::CorruptStringTable {
                    offset,
                    size: string_table.len(),
                };
                let tail = string_table.get(offset as usize..).ok_or_else(corrupt)?;
                let len = tail.iter().position(|&b| b == 0).ok_or_else(corrupt)?;
                Ok(String::from_utf8_lossy(&tail[..len]).into_owned())
            }
        }
    }
}

/// Resolves a raw 8-byte name field against the string table.
pub fn resolve_name(string_table: &[u8], field: [u8; 8]) -> Result<String> {
    RawName::from_bytes(field).resolve(string_table)
}
