//! In-memory builders for TI-COFF and ELF images used by the integration
//! tests.

#![allow(dead_code)]

pub const FILE_HEADER_SIZE: usize = 22;
pub const OPTIONAL_HEADER_SIZE: usize = 28;
pub const SECTION_HEADER_SIZE: usize = 48;
pub const SLOT_SIZE: usize = 18;

#[derive(Debug, Clone)]
pub struct CoffSection {
    pub name: String,
    pub address: u32,
    pub flags: u32,
    pub page: u16,
    pub data: Vec<u8>,
}

impl CoffSection {
    pub fn new(name: &str, address: u32, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            address,
            flags: 0x20,
            page: 0,
            data: data.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoffSymbol {
    pub name: String,
    pub value: u32,
    pub section: i16,
    pub class: u8,
    /// Size recorded in an auxiliary entry, if any.
    pub aux_size: Option<u32>,
}

impl CoffSymbol {
    pub fn new(name: &str, value: u32, section: i16, class: u8) -> Self {
        Self {
            name: name.to_string(),
            value,
            section,
            class,
            aux_size: None,
        }
    }

    pub fn with_aux(mut self, size: u32) -> Self {
        self.aux_size = Some(size);
        self
    }
}

/// Description of a TI-COFF image; `build` lays it out byte by byte.
#[derive(Debug, Clone)]
pub struct CoffImage {
    pub target_id: u16,
    pub flags: u16,
    pub entry_point: Option<u32>,
    pub sections: Vec<CoffSection>,
    pub symbols: Vec<CoffSymbol>,
}

impl Default for CoffImage {
    fn default() -> Self {
        Self {
            target_id: 0x00A0,
            flags: 0x0102,
            entry_point: None,
            sections: Vec::new(),
            symbols: Vec::new(),
        }
    }
}

impl CoffImage {
    pub fn sample() -> Self {
        Self {
            entry_point: Some(0xC000),
            sections: vec![
                CoffSection::new(".text", 0xC000, &[0x31, 0x40, 0x00, 0x04, 0xB2, 0x40]),
                CoffSection::new(".data", 0x0200, b"hello"),
                CoffSection::new(".debug_info", 0, &[1, 2, 3, 4, 5, 6, 7, 8]),
            ],
            symbols: vec![
                CoffSymbol::new(".text", 0xC000, 1, 3).with_aux(6),
                CoffSymbol::new("_c_int00", 0xC000, 1, 2),
                CoffSymbol::new("a_rather_long_symbol", 0x0200, 2, 2).with_aux(5),
                CoffSymbol::new("main", 0xC004, 1, 2),
            ],
            ..Self::default()
        }
    }

    pub fn header_end(&self) -> usize {
        FILE_HEADER_SIZE + self.entry_point.map_or(0, |_| OPTIONAL_HEADER_SIZE)
    }

    pub fn section_header_offset(&self, index: usize) -> usize {
        self.header_end() + index * SECTION_HEADER_SIZE
    }

    /// Overwrites the size and raw data offset of section `index` in a
    /// built image.
    pub fn patch_section_range(&self, bytes: &mut [u8], index: usize, offset: u32, size: u32) {
        let body = self.section_header_offset(index) + 8;
        bytes[body + 8..body + 12].copy_from_slice(&size.to_le_bytes());
        bytes[body + 12..body + 16].copy_from_slice(&offset.to_le_bytes());
    }

    pub fn num_slots(&self) -> u32 {
        self.symbols
            .iter()
            .map(|s| if s.aux_size.is_some() { 2 } else { 1 })
            .sum()
    }

    pub fn symbol_table_offset(&self) -> usize {
        self.section_header_offset(self.sections.len())
            + self.sections.iter().map(|s| s.data.len()).sum::<usize>()
    }

    pub fn build(&self) -> Vec<u8> {
        let mut strtab = vec![0u8; 4];
        let symtab_offset = self.symbol_table_offset();

        let mut out = Vec::new();
        out.extend_from_slice(&0x00C2u16.to_le_bytes());
        out.extend_from_slice(&(self.sections.len() as u16).to_le_bytes());
        out.extend_from_slice(&0x5F00_0000u32.to_le_bytes());
        out.extend_from_slice(&(symtab_offset as u32).to_le_bytes());
        out.extend_from_slice(&self.num_slots().to_le_bytes());
        let opt_size = self.entry_point.map_or(0u16, |_| OPTIONAL_HEADER_SIZE as u16);
        out.extend_from_slice(&opt_size.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.target_id.to_le_bytes());

        if let Some(entry) = self.entry_point {
            out.extend_from_slice(&0x0108u16.to_le_bytes());
            out.extend_from_slice(&0x0001u16.to_le_bytes());
            for value in [0x100u32, 0x20, 0x40, entry, 0xC000, 0x0200] {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }

        let mut data_offset = self.section_header_offset(self.sections.len());
        for section in &self.sections {
            out.extend_from_slice(&name_field(&section.name, &mut strtab));
            let body = [
                section.address,
                section.address,
                section.data.len() as u32,
                data_offset as u32,
                0,
                0,
                0,
                0,
                section.flags,
            ];
            for value in body {
                out.extend_from_slice(&value.to_le_bytes());
            }
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(&section.page.to_le_bytes());
            data_offset += section.data.len();
        }

        for section in &self.sections {
            out.extend_from_slice(&section.data);
        }
        assert_eq!(out.len(), symtab_offset);

        for symbol in &self.symbols {
            out.extend_from_slice(&name_field(&symbol.name, &mut strtab));
            out.extend_from_slice(&symbol.value.to_le_bytes());
            out.extend_from_slice(&symbol.section.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.push(symbol.class);
            out.push(u8::from(symbol.aux_size.is_some()));
            if let Some(size) = symbol.aux_size {
                let mut aux = [0u8; SLOT_SIZE];
                aux[..4].copy_from_slice(&size.to_le_bytes());
                aux[4..6].copy_from_slice(&1u16.to_le_bytes());
                out.extend_from_slice(&aux);
            }
        }

        let strtab_len = strtab.len() as u32;
        strtab[..4].copy_from_slice(&strtab_len.to_le_bytes());
        out.extend_from_slice(&strtab);
        out
    }
}

/// Inline names up to 8 bytes, string table references beyond.
fn name_field(name: &str, strtab: &mut Vec<u8>) -> [u8; 8] {
    let mut field = [0u8; 8];
    if name.len() <= 8 {
        field[..name.len()].copy_from_slice(name.as_bytes());
    } else {
        let offset = strtab.len() as u32;
        strtab.extend_from_slice(name.as_bytes());
        strtab.push(0);
        field[4..].copy_from_slice(&offset.to_le_bytes());
    }
    field
}

#[derive(Debug, Clone)]
pub struct ElfSymbol {
    pub name: String,
    pub value: u64,
    pub size: u64,
}

/// A little-endian ELF64 relocatable file with `.text`, `.bss`, `.symtab`,
/// `.strtab` and `.shstrtab`.
#[derive(Debug, Clone)]
pub struct ElfImage {
    pub machine: u16,
    /// `e_version`; its low half overlaps the TI-COFF target id field.
    pub version: u32,
    pub text: Vec<u8>,
    pub text_addr: u64,
    pub bss_size: u64,
    pub symbols: Vec<ElfSymbol>,
}

impl ElfImage {
    pub fn sample() -> Self {
        Self {
            machine: 0x3E,
            version: 1,
            text: vec![0x55, 0x48, 0x89, 0xE5, 0x5D, 0xC3],
            text_addr: 0x1000,
            bss_size: 0x40,
            symbols: vec![
                ElfSymbol {
                    name: "main".to_string(),
                    value: 0x1000,
                    size: 6,
                },
                ElfSymbol {
                    name: "counter".to_string(),
                    value: 0x2000,
                    size: 8,
                },
            ],
        }
    }

    /// Overwrites `sh_offset` and `sh_size` of section `index` in a built
    /// image.
    pub fn patch_section_range(bytes: &mut [u8], index: usize, offset: u64, size: u64) {
        let mut shoff = [0u8; 8];
        shoff.copy_from_slice(&bytes[40..48]);
        let header = u64::from_le_bytes(shoff) as usize + index * 64;
        bytes[header + 24..header + 32].copy_from_slice(&offset.to_le_bytes());
        bytes[header + 32..header + 40].copy_from_slice(&size.to_le_bytes());
    }

    pub fn build(&self) -> Vec<u8> {
        const EHDR: usize = 64;
        const SHDR: usize = 64;
        const SYM: usize = 24;

        let mut shstrtab = vec![0u8];
        let mut shname = |name: &str| {
            let at = shstrtab.len() as u32;
            shstrtab.extend_from_slice(name.as_bytes());
            shstrtab.push(0);
            at
        };
        let text_name = shname(".text");
        let bss_name = shname(".bss");
        let symtab_name = shname(".symtab");
        let strtab_name = shname(".strtab");
        let shstrtab_name = shname(".shstrtab");

        let mut strtab = vec![0u8];
        let mut symtab = vec![0u8; SYM];
        for sym in &self.symbols {
            let at = strtab.len() as u32;
            strtab.extend_from_slice(sym.name.as_bytes());
            strtab.push(0);
            symtab.extend_from_slice(&at.to_le_bytes());
            symtab.push(0x12); // STB_GLOBAL | STT_FUNC
            symtab.push(0);
            symtab.extend_from_slice(&1u16.to_le_bytes());
            symtab.extend_from_slice(&sym.value.to_le_bytes());
            symtab.extend_from_slice(&sym.size.to_le_bytes());
        }

        let text_off = EHDR;
        let symtab_off = align8(text_off + self.text.len());
        let strtab_off = symtab_off + symtab.len();
        let shstrtab_off = strtab_off + strtab.len();
        let shoff = align8(shstrtab_off + shstrtab.len());

        let mut out = vec![0x7F, b'E', b'L', b'F', 2, 1, 1, 0];
        out.resize(16, 0);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&self.machine.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes());
        out.extend_from_slice(&(shoff as u64).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(EHDR as u16).to_le_bytes());
        out.extend_from_slice(&56u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&(SHDR as u16).to_le_bytes());
        out.extend_from_slice(&6u16.to_le_bytes());
        out.extend_from_slice(&5u16.to_le_bytes());
        assert_eq!(out.len(), EHDR);

        out.extend_from_slice(&self.text);
        out.resize(symtab_off, 0);
        out.extend_from_slice(&symtab);
        out.extend_from_slice(&strtab);
        out.extend_from_slice(&shstrtab);
        out.resize(shoff, 0);

        let headers = [
            SectionHeader::default(),
            SectionHeader {
                name: text_name,
                kind: 1,
                flags: 0x6,
                addr: self.text_addr,
                offset: text_off as u64,
                size: self.text.len() as u64,
                align: 16,
                ..SectionHeader::default()
            },
            SectionHeader {
                name: bss_name,
                kind: 8,
                flags: 0x3,
                addr: 0x2000,
                offset: symtab_off as u64,
                size: self.bss_size,
                align: 8,
                ..SectionHeader::default()
            },
            SectionHeader {
                name: symtab_name,
                kind: 2,
                offset: symtab_off as u64,
                size: symtab.len() as u64,
                link: 4,
                info: 1,
                align: 8,
                entsize: SYM as u64,
                ..SectionHeader::default()
            },
            SectionHeader {
                name: strtab_name,
                kind: 3,
                offset: strtab_off as u64,
                size: strtab.len() as u64,
                align: 1,
                ..SectionHeader::default()
            },
            SectionHeader {
                name: shstrtab_name,
                kind: 3,
                offset: shstrtab_off as u64,
                size: shstrtab.len() as u64,
                align: 1,
                ..SectionHeader::default()
            },
        ];
        for header in headers {
            header.write(&mut out);
        }
        out
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct SectionHeader {
    name: u32,
    kind: u32,
    flags: u64,
    addr: u64,
    offset: u64,
    size: u64,
    link: u32,
    info: u32,
    align: u64,
    entsize: u64,
}

impl SectionHeader {
    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.name.to_le_bytes());
        out.extend_from_slice(&self.kind.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.addr.to_le_bytes());
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.size.to_le_bytes());
        out.extend_from_slice(&self.link.to_le_bytes());
        out.extend_from_slice(&self.info.to_le_bytes());
        out.extend_from_slice(&self.align.to_le_bytes());
        out.extend_from_slice(&self.entsize.to_le_bytes());
    }
}

fn align8(n: usize) -> usize {
    (n + 7) & !7
}
