use goblin::elf::{Elf, Sym};

use crate::coff;

/// A symbol of a debug file, independent of its container format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub value: u64,
    /// Size of the object the symbol names, zero when unknown.
    pub size: u64,
}

impl Symbol {
    pub(crate) fn from_goblin_sym(sym: &Sym, elf: &Elf) -> Self {
        Symbol {
            name: elf.strtab.get_at(sym.st_name).unwrap_or("").to_string(),
            value: sym.st_value,
            size: sym.st_size,
        }
    }

    pub(crate) fn from_coff(symbol: &coff::Symbol) -> Self {
        Symbol {
            name: symbol.name.clone(),
            value: u64::from(symbol.value),
            size: symbol.size().map_or(0, u64::from),
        }
    }
}
