use crate::coff::{FileFlags, FileHeader, OptionalFileHeader};
use crate::header::Header;

/// TI-COFF file header together with its optional header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoffHeader {
    pub file: FileHeader,
    pub optional: Option<OptionalFileHeader>,
}

impl Header for CoffHeader {
    fn entry_point(&self) -> Option<u64> {
        self.optional.map(|h| u64::from(h.entry_point))
    }

    fn machine(&self) -> u16 {
        self.file.target_id.raw()
    }

    fn format_name(&self) -> &'static str {
        "TI-COFF"
    }

    fn is_executable(&self) -> bool {
        self.file.flags.contains(FileFlags::EXEC)
    }
}
