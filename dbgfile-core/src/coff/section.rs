use std::io;

use byteorder::{ReadBytesExt, LE};

use crate::source::{SectionData, SectionReader};
use crate::Result;

/// A decoded section header with its name already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    pub name: String,
    pub physical_address: u32,
    pub virtual_address: u32,
    /// Size of the section in target words.
    pub size: u32,
    /// File offset of the section's raw data.
    pub raw_data_offset: u32,
    pub relocation_offset: u32,
    pub num_relocations: u32,
    pub flags: SectionFlags,
    pub memory_page: u16,
}

impl SectionHeader {
    /// Size of the header body that follows the 8-byte name field.
    pub const BODY_SIZE: usize = 40;

    pub fn parse(name: String, body: &[u8; Self::BODY_SIZE]) -> Result<Self> {
        let mut cur = &body[..];
        let physical_address = cur.read_u32::<LE>()?;
        let virtual_address = cur.read_u32::<LE>()?;
        let size = cur.read_u32::<LE>()?;
        let raw_data_offset = cur.read_u32::<LE>()?;
        let relocation_offset = cur.read_u32::<LE>()?;
        let _reserved = cur.read_u32::<LE>()?;
        let num_relocations = cur.read_u32::<LE>()?;
        let _reserved = cur.read_u32::<LE>()?;
        let flags = SectionFlags(cur.read_u32::<LE>()?);
        let _reserved = cur.read_u16::<LE>()?;
        let memory_page = cur.read_u16::<LE>()?;

        Ok(Self {
            name,
            physical_address,
            virtual_address,
            size,
            raw_data_offset,
            relocation_offset,
            num_relocations,
            flags,
            memory_page,
        })
    }
}

/// Section type and attribute bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionFlags(pub u32);

impl SectionFlags {
    /// Regular section: allocated, relocated, loaded.
    pub const REG: Self = Self(0x0000_0000);
    /// Dummy section: relocated, not allocated, not loaded.
    pub const DSECT: Self = Self(0x0000_0001);
    /// Allocated and relocated but not loaded.
    pub const NOLOAD: Self = Self(0x0000_0002);
    pub const GROUP: Self = Self(0x0000_0004);
    pub const PAD: Self = Self(0x0000_0008);
    /// Relocated and loaded but not allocated.
    pub const COPY: Self = Self(0x0000_0010);
    pub const TEXT: Self = Self(0x0000_0020);
    pub const DATA: Self = Self(0x0000_0040);
    pub const BSS: Self = Self(0x0000_0080);
    pub const BLOCK: Self = Self(0x0000_1000);
    pub const PASS: Self = Self(0x0000_2000);
    pub const CLINK: Self = Self(0x0000_4000);
    pub const VECTOR: Self = Self(0x0000_8000);
    pub const PADDED: Self = Self(0x0001_0000);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A COFF section: its header plus a view of its raw data.
#[derive(Debug, Clone)]
pub struct Section {
    pub header: SectionHeader,
    data: SectionData,
}

impl Section {
    pub(crate) fn new(header: SectionHeader, data: SectionData) -> Self {
        Self { header, data }
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// Reads from the section's raw data at `off`, relative to its start.
    pub fn read_at(&self, buf: &mut [u8], off: u64) -> io::Result<usize> {
        self.data.read_at(buf, off)
    }

    /// Returns a new reader with its own cursor at the start of the section.
    pub fn open(&self) -> SectionReader {
        self.data.open()
    }

    pub fn data(&self) -> &SectionData {
        &self.data
    }
}
