pub mod coff;
pub mod elf;

/// What a debug file's header says about the program it describes, in
/// terms both container formats can answer.
pub trait Header: std::fmt::Debug + Send + Sync {
    /// Program entry address. `None` for relocatable objects and for TI-COFF
    /// files without an optional header.
    fn entry_point(&self) -> Option<u64>;

    /// `e_machine` for ELF, the raw target id for TI-COFF.
    fn machine(&self) -> u16;

    /// "ELF" or "TI-COFF".
    fn format_name(&self) -> &'static str;

    fn is_executable(&self) -> bool;
}
