use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use goblin::elf::header::ELFMAG;
use goblin::elf::Elf;

use crate::coff;
use crate::header::coff::CoffHeader;
use crate::header::Header;
use crate::source::{self, ByteSource};
use crate::{DetectionFailure, Error, Result, Section, Symbol};

/// Container format of a debug file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileType {
    #[default]
    Unknown,
    Elf,
    Coff,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileType::Unknown => "Unknown",
            FileType::Elf => "ELF",
            FileType::Coff => "TI-COFF",
        })
    }
}

/// A debug file in any supported format.
#[derive(Debug)]
pub struct File {
    pub file_type: FileType,
    pub header: Box<dyn Header>,
    pub sections: Vec<Section>,
    pub symbols: Vec<Symbol>,
}

impl File {
    /// Opens the file at `path` and detects its format.
    ///
    /// The handle is shared by every section of the result and closed once
    /// the last of them is dropped, including when detection fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = source::open_path(path.as_ref())?;
        log::debug!("opened {}", path.as_ref().display());
        Self::parse(source)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::parse(Arc::new(bytes))
    }

    /// Decodes `source` as ELF, or failing that as TI-COFF.
    ///
    /// The first decoder to succeed wins. When neither does, the error lists
    /// both failures in the order they were tried.
    pub fn parse(source: Arc<dyn ByteSource>) -> Result<Self> {
        let elf_err = match Self::parse_elf(&source) {
            Ok(file) => return Ok(file),
            Err(e) => e,
        };
        log::debug!("not ELF: {elf_err}");

        let coff_err = match Self::parse_coff(&source) {
            Ok(file) => return Ok(file),
            Err(e) => e,
        };
        log::debug!("not TI-COFF: {coff_err}");

        Err(Error::UnsupportedFileType {
            failures: vec![
                DetectionFailure {
                    file_type: FileType::Elf,
                    error: elf_err,
                },
                DetectionFailure {
                    file_type: FileType::Coff,
                    error: coff_err,
                },
            ],
        })
    }

    fn parse_elf(source: &Arc<dyn ByteSource>) -> Result<Self> {
        // Check the magic before pulling the whole file into memory.
        let mut magic = [0u8; 4];
        let n = source.read_at(&mut magic, 0)?;
        if n < magic.len() || &magic != ELFMAG {
            let found = u64::from(u32::from_le_bytes(magic));
            return Err(goblin::error::Error::BadMagic(found).into());
        }

        let len = usize::try_from(source.len()?)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "file too large"))?;
        let mut buf = vec![0u8; len];
        source.read_exact_at(&mut buf, 0)?;
        let elf = Elf::parse(&buf)?;

        let has_sections = elf.header.e_shnum > 0 && elf.header.e_shoff != 0;
        if has_sections {
            log::info!("ELF has {} section headers", elf.section_headers.len());
        } else {
            log::warn!("ELF has no section headers");
        }

        let sections = elf
            .section_headers
            .iter()
            .map(|sh| Section::from_goblin_sh(source, sh, &elf))
            .collect();

        // Index 0 is the reserved null symbol.
        let symbols = elf
            .syms
            .iter()
            .skip(1)
            .map(|sym| Symbol::from_goblin_sym(&sym, &elf))
            .collect();

        Ok(Self {
            file_type: FileType::Elf,
            header: Box::new(elf.header),
            sections,
            symbols,
        })
    }

    fn parse_coff(source: &Arc<dyn ByteSource>) -> Result<Self> {
        let coff = coff::File::parse(Arc::clone(source))?;
        Ok(Self::from(coff))
    }

    /// Returns the first section called `name`.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

impl From<coff::File> for File {
    fn from(coff: coff::File) -> Self {
        File {
            file_type: FileType::Coff,
            header: Box::new(CoffHeader {
                file: coff.header,
                optional: coff.optional_header,
            }),
            sections: coff.sections.iter().map(Section::from_coff).collect(),
            symbols: coff.symbols.iter().map(Symbol::from_coff).collect(),
        }
    }
}
