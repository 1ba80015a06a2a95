use std::io;
use std::sync::Arc;

use goblin::elf::section_header::SHT_NOBITS;
use goblin::elf::{Elf, SectionHeader};

use crate::coff;
use crate::source::{ByteSource, SectionData, SectionReader};

/// A section of a debug file, independent of its container format.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub address: u64,
    pub size: u64,
    data: SectionData,
}

impl Section {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reads from the section contents at `off`, relative to the section
    /// start. Never moves any reader's cursor.
    pub fn read_at(&self, buf: &mut [u8], off: u64) -> io::Result<usize> {
        self.data.read_at(buf, off)
    }

    /// Returns a new reader over the section contents with its own cursor.
    pub fn open(&self) -> SectionReader {
        self.data.open()
    }

    /// Reads the whole section into memory.
    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        self.data.to_vec()
    }

    pub(crate) fn from_goblin_sh(
        source: &Arc<dyn ByteSource>,
        sh: &SectionHeader,
        elf: &Elf,
    ) -> Self {
        let name = elf.shdr_strtab.get_at(sh.sh_name).unwrap_or("").to_string();
        // .bss and friends occupy no file space.
        let data = if sh.sh_type == SHT_NOBITS {
            SectionData::empty(Arc::clone(source))
        } else if sh.sh_offset.checked_add(sh.sh_size).is_none() {
            log::warn!(
                "section {name:?} range {:#x}+{:#x} overflows, reading it as empty",
                sh.sh_offset,
                sh.sh_size
            );
            SectionData::empty(Arc::clone(source))
        } else {
            SectionData::new(Arc::clone(source), sh.sh_offset, sh.sh_size)
        };

        Section {
            name,
            address: sh.sh_addr,
            size: sh.sh_size,
            data,
        }
    }

    pub(crate) fn from_coff(section: &coff::Section) -> Self {
        Section {
            name: section.header.name.clone(),
            address: u64::from(section.header.physical_address),
            size: u64::from(section.header.size),
            data: section.data().clone(),
        }
    }
}
