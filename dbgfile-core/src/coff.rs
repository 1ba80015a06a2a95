//! TI-COFF object file decoding.
//!
//! Layout, all little-endian:
//!
//! ```text
//! file header          22 bytes
//! optional header      28 bytes, iff optional_header_size > 0
//! section headers      48 bytes each (8-byte name + 40-byte body)
//! ... raw section data, relocations ...
//! symbol table         18 bytes per slot, auxiliary slots included
//! string table         everything after the symbol table
//! ```

pub mod header;
pub mod section;
pub mod strtab;
pub mod symbol;

use std::io;
use std::path::Path;
use std::sync::Arc;

pub use header::{FileFlags, FileHeader, OptionalFileHeader, TargetId};
pub use section::{Section, SectionFlags, SectionHeader};
pub use strtab::{resolve_name, RawName};
pub use symbol::{AuxiliaryEntry, StorageClass, Symbol};

use crate::source::{self, ByteSource, SectionData};
use crate::{Error, Result};

use symbol::SymbolTableBuilder;

/// Size of one symbol table slot, primary or auxiliary.
pub const SYMBOL_SLOT_SIZE: usize = 18;

const SECTION_NAME_SIZE: usize = 8;
const SECTION_HEADER_SIZE: usize = SECTION_NAME_SIZE + SectionHeader::BODY_SIZE;

/// A decoded TI-COFF file.
#[derive(Debug, Clone)]
pub struct File {
    pub header: FileHeader,
    pub optional_header: Option<OptionalFileHeader>,
    /// Sections in on-disk order.
    pub sections: Vec<Section>,
    /// Symbols in on-disk order, auxiliary slots folded in.
    pub symbols: Vec<Symbol>,
}

impl File {
    /// Opens and decodes the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse(source::open_path(path.as_ref())?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::parse(Arc::new(bytes))
    }

    /// Decodes a TI-COFF file from `source`.
    ///
    /// Fails with [`Error::InvalidFormat`] if the target id is unknown, which
    /// is the only way to tell that the input is not TI-COFF at all.
    pub fn parse(source: Arc<dyn ByteSource>) -> Result<Self> {
        let header = FileHeader::parse(&read_record(&*source, 0, "file header")?)?;
        log::debug!(
            "TI-COFF header: target {}, {} sections, {} symbol slots",
            header.target_id,
            header.num_sections,
            header.num_symbol_table_entries
        );

        let mut offset = FileHeader::SIZE as u64;
        let optional_header = if header.optional_header_size > 0 {
            let buf = read_record(&*source, offset, "optional file header")?;
            offset += OptionalFileHeader::SIZE as u64;
            Some(OptionalFileHeader::parse(&buf)?)
        } else {
            None
        };

        let string_table = read_string_table(&*source, header.string_table_offset())?;

        let mut sections = Vec::with_capacity(usize::from(header.num_sections));
        for _ in 0..header.num_sections {
            let buf: [u8; SECTION_HEADER_SIZE] = read_record(&*source, offset, "section header")?;
            offset += SECTION_HEADER_SIZE as u64;

            let (name_field, body) = buf.split_at(SECTION_NAME_SIZE);
            let mut field = [0u8; SECTION_NAME_SIZE];
            field.copy_from_slice(name_field);
            let mut body_buf = [0u8; SectionHeader::BODY_SIZE];
            body_buf.copy_from_slice(body);

            let name = resolve_name(&string_table, field)?;
            let section_header = SectionHeader::parse(name, &body_buf)?;
            log::trace!(
                "section {:?}: {} bytes at {:#x}",
                section_header.name,
                section_header.size,
                section_header.raw_data_offset
            );

            let data = SectionData::new(
                Arc::clone(&source),
                u64::from(section_header.raw_data_offset),
                u64::from(section_header.size),
            );
            sections.push(Section::new(section_header, data));
        }

        let symbols = read_symbols(&*source, &header, &string_table)?;
        log::debug!(
            "decoded {} sections and {} symbols",
            sections.len(),
            symbols.len()
        );

        Ok(Self {
            header,
            optional_header,
            sections,
            symbols,
        })
    }

    /// Returns the first section called `name`.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    /// Entry point from the optional header, if there is one.
    pub fn entry_point(&self) -> Option<u32> {
        self.optional_header.map(|h| h.entry_point)
    }
}

fn read_symbols(
    source: &dyn ByteSource,
    header: &FileHeader,
    string_table: &[u8],
) -> Result<Vec<Symbol>> {
    let start = u64::from(header.symbol_table_offset);
    let mut builder = SymbolTableBuilder::new(string_table, header.num_symbol_table_entries);

    for i in 0..u64::from(header.num_symbol_table_entries) {
        let offset = start + i * SYMBOL_SLOT_SIZE as u64;
        let slot = read_record(source, offset, "symbol table entry")?;
        builder.push_slot(&slot)?;
    }

    builder.finish(header.string_table_offset())
}

/// Reads everything from `offset` to the end of the source. Starting at or
/// past the end gives an empty table.
fn read_string_table(source: &dyn ByteSource, offset: u64) -> Result<Vec<u8>> {
    let len = source.len()?;
    if offset >= len {
        return Ok(Vec::new());
    }
    let size = usize::try_from(len - offset)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "string table too large"))?;
    let mut table = vec![0u8; size];
    source
        .read_exact_at(&mut table, offset)
        .map_err(|e| read_error(e, "string table", offset, size))?;
    Ok(table)
}

fn read_record<const N: usize>(
    source: &dyn ByteSource,
    offset: u64,
    context: &'static str,
) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    source
        .read_exact_at(&mut buf, offset)
        .map_err(|e| read_error(e, context, offset, N))?;
    Ok(buf)
}

fn read_error(e: io::Error, context: &'static str, offset: u64, expected: usize) -> Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::truncated(context, offset, expected),
        _ => Error::Io(e),
    }
}
