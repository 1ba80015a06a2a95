use std::fmt;

use byteorder::{ReadBytesExt, LE};

use crate::{Error, Result};

/// The TI-COFF file header, found at offset 0.
///
/// Reference: TI SPRAAO8, "Common Object File Format".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Format version id (0x00C2 for COFF2).
    pub version: u16,

    /// Number of section headers following the optional header.
    pub num_sections: u16,

    /// Seconds since the Unix epoch at link time.
    pub timestamp: u32,

    /// File offset of the symbol table.
    pub symbol_table_offset: u32,

    /// Number of 18-byte slots in the symbol table, auxiliary slots included.
    pub num_symbol_table_entries: u32,

    /// Size of the optional header; zero when there is none.
    pub optional_header_size: u16,

    pub flags: FileFlags,

    /// Device family this file was built for. Doubles as the format
    /// signature, since TI-COFF has no magic number.
    pub target_id: TargetId,
}

impl FileHeader {
    pub const SIZE: usize = 22;

    /// Decodes the header and checks the target id.
    ///
    /// An unknown target id is reported as [`Error::InvalidFormat`].
    pub fn parse(buf: &[u8; Self::SIZE]) -> Result<Self> {
        let mut cur = &buf[..];
        let version = cur.read_u16::<LE>()?;
        let num_sections = cur.read_u16::<LE>()?;
        let timestamp = cur.read_u32::<LE>()?;
        let symbol_table_offset = cur.read_u32::<LE>()?;
        let num_symbol_table_entries = cur.read_u32::<LE>()?;
        let optional_header_size = cur.read_u16::<LE>()?;
        let flags = FileFlags(cur.read_u16::<LE>()?);
        let raw_target = cur.read_u16::<LE>()?;

        let target_id = TargetId::from_raw(raw_target).ok_or_else(|| Error::InvalidFormat {
            format: "TI-COFF",
            reason: format!("unknown target ID {raw_target:#06x}"),
        })?;

        Ok(Self {
            version,
            num_sections,
            timestamp,
            symbol_table_offset,
            num_symbol_table_entries,
            optional_header_size,
            flags,
            target_id,
        })
    }

    /// File offset where the string table begins: right after the last
    /// symbol table slot.
    pub fn string_table_offset(&self) -> u64 {
        u64::from(self.symbol_table_offset)
            + u64::from(self.num_symbol_table_entries) * super::SYMBOL_SLOT_SIZE as u64
    }
}

/// File header flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileFlags(pub u16);

impl FileFlags {
    /// Relocation information was stripped.
    pub const RELFLG: Self = Self(0x0001);
    /// The file is relocatable and executable.
    pub const EXEC: Self = Self(0x0002);
    /// Line numbers were stripped.
    pub const LNNO: Self = Self(0x0004);
    /// Local symbols were stripped.
    pub const LSYMS: Self = Self(0x0008);
    pub const LITTLE: Self = Self(0x0100);
    pub const BIG: Self = Self(0x0200);
    /// Duplicate symbols were removed.
    pub const SYMMERGE: Self = Self(0x1000);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Device families a TI-COFF file may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TargetId {
    Tms470 = 0x0097,
    Tms320C5400 = 0x0098,
    Tms320C6000 = 0x0099,
    Tms320C5500 = 0x009C,
    Tms320C2800 = 0x009D,
    Msp430 = 0x00A0,
    Tms320C5500Plus = 0x00A1,
}

impl TargetId {
    pub const ALL: [TargetId; 7] = [
        TargetId::Tms470,
        TargetId::Tms320C5400,
        TargetId::Tms320C6000,
        TargetId::Tms320C5500,
        TargetId::Tms320C2800,
        TargetId::Msp430,
        TargetId::Tms320C5500Plus,
    ];

    pub fn from_raw(raw: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.raw() == raw)
    }

    pub fn raw(self) -> u16 {
        self as u16
    }

    /// Device family name as printed by TI tools.
    pub fn family(self) -> &'static str {
        match self {
            TargetId::Tms470 => "TMS470",
            TargetId::Tms320C5400 => "TMS320C5400",
            TargetId::Tms320C6000 => "TMS320C6000",
            TargetId::Tms320C5500 => "TMS320C5500",
            TargetId::Tms320C2800 => "TMS320C2800",
            TargetId::Msp430 => "MSP430",
            TargetId::Tms320C5500Plus => "TMS320C5500+",
        }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#06X})", self.family(), self.raw())
    }
}

/// Optional header describing the loadable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalFileHeader {
    /// Conventionally [`OptionalFileHeader::MAGIC`].
    pub magic: u16,
    pub version: u16,
    pub executable_code_size: u32,
    pub initialized_data_size: u32,
    pub uninitialized_data_size: u32,
    pub entry_point: u32,
    pub code_start: u32,
    pub data_start: u32,
}

impl OptionalFileHeader {
    pub const SIZE: usize = 28;
    pub const MAGIC: u16 = 0x0108;

    pub fn parse(buf: &[u8; Self::SIZE]) -> Result<Self> {
        let mut cur = &buf[..];
        Ok(Self {
            magic: cur.read_u16::<LE>()?,
            version: cur.read_u16::<LE>()?,
            executable_code_size: cur.read_u32::<LE>()?,
            initialized_data_size: cur.read_u32::<LE>()?,
            uninitialized_data_size: cur.read_u32::<LE>()?,
            entry_point: cur.read_u32::<LE>()?,
            code_start: cur.read_u32::<LE>()?,
            data_start: cur.read_u32::<LE>()?,
        })
    }
}
