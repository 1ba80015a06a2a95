//! Uniform section and symbol access for ELF and TI-COFF object files.
//!
//! [`File::open`] detects the container format (ELF first, then TI-COFF)
//! and exposes the same [`Section`] and [`Symbol`] types for both. The
//! [`coff`] module can also be used on its own.

pub mod binary;
pub mod coff;
mod error;
pub mod header;
pub mod sections;
pub mod source;
pub mod symbols;

pub use binary::*;
pub use error::{DetectionFailure, Error, Result};
pub use sections::*;
pub use source::{ByteSource, SectionData, SectionReader};
pub use symbols::*;
