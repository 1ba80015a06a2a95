use std::fmt;

use byteorder::{ReadBytesExt, LE};

use super::strtab::resolve_name;
use super::SYMBOL_SLOT_SIZE;
use crate::{Error, Result};

/// A symbol table entry with its name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub value: u32,
    /// One-based section index; zero and negative values are special.
    pub section_number: i16,
    pub storage_class: StorageClass,
    pub num_aux_entries: u8,
    /// Present iff `num_aux_entries == 1`.
    pub aux: Option<AuxiliaryEntry>,
}

impl Symbol {
    /// Size of the data this symbol describes, when an auxiliary entry
    /// records it.
    pub fn size(&self) -> Option<u32> {
        self.aux.map(|aux| aux.size)
    }

    fn parse(slot: &[u8; SYMBOL_SLOT_SIZE], string_table: &[u8]) -> Result<Self> {
        let mut field = [0u8; 8];
        field.copy_from_slice(&slot[..8]);
        let name = resolve_name(string_table, field)?;

        let mut cur = &slot[8..];
        let value = cur.read_u32::<LE>()?;
        let section_number = cur.read_i16::<LE>()?;
        let _reserved = cur.read_u16::<LE>()?;
        let storage_class = StorageClass(cur.read_u8()?);
        let num_aux_entries = cur.read_u8()?;

        Ok(Self {
            name,
            value,
            section_number,
            storage_class,
            num_aux_entries,
            aux: None,
        })
    }
}

/// The slot following a symbol whose auxiliary count is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxiliaryEntry {
    pub size: u32,
    pub num_relocations: u16,
    pub num_line_numbers: u16,
}

impl AuxiliaryEntry {
    fn parse(slot: &[u8; SYMBOL_SLOT_SIZE]) -> Result<Self> {
        let mut cur = &slot[..];
        Ok(Self {
            size: cur.read_u32::<LE>()?,
            num_relocations: cur.read_u16::<LE>()?,
            num_line_numbers: cur.read_u16::<LE>()?,
        })
    }
}

/// Linker role of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StorageClass(pub u8);

impl StorageClass {
    pub const C_NULL: Self = Self(0);
    pub const C_AUTO: Self = Self(1);
    /// External definition.
    pub const C_EXT: Self = Self(2);
    pub const C_STAT: Self = Self(3);
    pub const C_REG: Self = Self(4);
    /// External reference.
    pub const C_EXTREF: Self = Self(5);
    pub const C_LABEL: Self = Self(6);
    /// Undefined label.
    pub const C_ULABEL: Self = Self(7);
    pub const C_MOS: Self = Self(8);
    pub const C_ARG: Self = Self(9);
    pub const C_STRTAG: Self = Self(10);
    pub const C_MOU: Self = Self(11);
    pub const C_UNTAG: Self = Self(12);
    pub const C_TPDEF: Self = Self(13);
    /// Undefined static.
    pub const C_USTATIC: Self = Self(14);
    pub const C_ENTAG: Self = Self(15);
    pub const C_MOE: Self = Self(16);
    pub const C_REGPARM: Self = Self(17);
    pub const C_FIELD: Self = Self(18);
    /// Tentative external definition.
    pub const C_UEXT: Self = Self(19);
    /// Static load time label.
    pub const C_STATLAB: Self = Self(20);
    /// External load time label.
    pub const C_EXTLAB: Self = Self(21);
    /// Last declared parameter of a variadic function.
    pub const C_VARARG: Self = Self(27);
    pub const C_BLOCK: Self = Self(100);
    pub const C_FCN: Self = Self(101);
    pub const C_EOS: Self = Self(102);
    pub const C_FILE: Self = Self(103);
    pub const C_LINE: Self = Self(104);

    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "C_NULL",
            1 => "C_AUTO",
            2 => "C_EXT",
            3 => "C_STAT",
            4 => "C_REG",
            5 => "C_EXTREF",
            6 => "C_LABEL",
            7 => "C_ULABEL",
            8 => "C_MOS",
            9 => "C_ARG",
            10 => "C_STRTAG",
            11 => "C_MOU",
            12 => "C_UNTAG",
            13 => "C_TPDEF",
            14 => "C_USTATIC",
            15 => "C_ENTAG",
            16 => "C_MOE",
            17 => "C_REGPARM",
            18 => "C_FIELD",
            19 => "C_UEXT",
            20 => "C_STATLAB",
            21 => "C_EXTLAB",
            27 => "C_VARARG",
            100 => "C_BLOCK",
            101 => "C_FCN",
            102 => "C_EOS",
            103 => "C_FILE",
            104 => "C_LINE",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name().unwrap_or("Unknown"), self.0)
    }
}

#[derive(Debug)]
enum SlotState {
    AwaitingPrimary,
    /// The previous slot was a symbol that owns the next slot.
    AwaitingAuxiliary(Symbol),
}

/// Folds 18-byte symbol table slots into symbols.
///
/// Every slot counts against the header's entry count, but auxiliary slots
/// attach to the preceding symbol instead of producing one.
#[derive(Debug)]
pub(crate) struct SymbolTableBuilder<'a> {
    string_table: &'a [u8],
    state: SlotState,
    symbols: Vec<Symbol>,
}

impl<'a> SymbolTableBuilder<'a> {
    pub(crate) fn new(string_table: &'a [u8], num_slots: u32) -> Self {
        Self {
            string_table,
            state: SlotState::AwaitingPrimary,
            symbols: Vec::with_capacity(num_slots.min(4096) as usize),
        }
    }

    pub(crate) fn push_slot(&mut self, slot: &[u8; SYMBOL_SLOT_SIZE]) -> Result<()> {
        match std::mem::replace(&mut self.state, SlotState::AwaitingPrimary) {
            SlotState::AwaitingPrimary => {
                let symbol = Symbol::parse(slot, self.string_table)?;
                match symbol.num_aux_entries {
                    0 => self.symbols.push(symbol),
                    1 => self.state = SlotState::AwaitingAuxiliary(symbol),
                    n => {
                        log::warn!(
                            "symbol {:?} declares {n} auxiliary entries; only one is supported",
                            symbol.name
                        );
                        self.symbols.push(symbol);
                    }
                }
            }
            SlotState::AwaitingAuxiliary(mut symbol) => {
                let aux = AuxiliaryEntry::parse(slot)?;
                log::trace!("symbol {:?} has auxiliary size {}", symbol.name, aux.size);
                symbol.aux = Some(aux);
                self.symbols.push(symbol);
            }
        }
        Ok(())
    }

    /// Ends the table. `end_offset` is the file offset just past the last
    /// declared slot, reported if an auxiliary slot is still owed.
    pub(crate) fn finish(self, end_offset: u64) -> Result<Vec<Symbol>> {
        match self.state {
            SlotState::AwaitingPrimary => Ok(self.symbols),
            SlotState::AwaitingAuxiliary(_) => Err(Error::truncated(
                "auxiliary symbol entry",
                end_offset,
                SYMBOL_SLOT_SIZE,
            )),
        }
    }
}
