use goblin::elf::header::{Header as ElfHeader, ET_EXEC};

use crate::header::Header;

/// goblin already decodes both ELF classes, so its header is used as is.
impl Header for ElfHeader {
    fn entry_point(&self) -> Option<u64> {
        (self.e_entry != 0).then_some(self.e_entry)
    }

    fn machine(&self) -> u16 {
        self.e_machine
    }

    fn format_name(&self) -> &'static str {
        "ELF"
    }

    fn is_executable(&self) -> bool {
        self.e_type == ET_EXEC
    }
}
