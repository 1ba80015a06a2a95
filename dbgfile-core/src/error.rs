use std::fmt;
use std::io;

use crate::FileType;

/// Error type of this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The input does not carry the signature of the expected format.
    ///
    /// This is the normal outcome of probing a file with the wrong decoder.
    #[error("not a {format} file: {reason}")]
    InvalidFormat {
        format: &'static str,
        reason: String,
    },

    /// Fewer bytes were available than a fixed-size record requires.
    #[error("truncated data: {context} needs {expected} bytes at offset {offset:#x}")]
    TruncatedData {
        context: &'static str,
        offset: u64,
        expected: usize,
    },

    /// A name referenced the string table out of range, or the string was
    /// not NUL terminated.
    #[error("corrupt string table: bad reference {offset:#x} (table size: {size})")]
    CorruptStringTable { offset: u32, size: usize },

    /// Error from the [goblin] crate while decoding ELF.
    #[error(transparent)]
    Elf(#[from] goblin::error::Error),

    /// Read failure of the underlying byte source.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// No decoder recognized the input. Failures are listed in the order
    /// the decoders were tried.
    #[error("unsupported debug file type ({})", DisplayFailures(.failures))]
    UnsupportedFileType { failures: Vec<DetectionFailure> },
}

impl Error {
    /// Returns true if this error only says "wrong format", as opposed to
    /// a damaged file or a failing read.
    pub fn is_invalid_format(&self) -> bool {
        match self {
            Error::InvalidFormat { .. } => true,
            Error::Elf(goblin::error::Error::BadMagic(_)) => true,
            Error::UnsupportedFileType { failures } => {
                failures.iter().all(|f| f.error.is_invalid_format())
            }
            _ => false,
        }
    }

    pub(crate) fn truncated(context: &'static str, offset: u64, expected: usize) -> Self {
        Error::TruncatedData {
            context,
            offset,
            expected,
        }
    }
}

/// One decoder's reason for rejecting the input.
#[derive(Debug)]
pub struct DetectionFailure {
    pub file_type: FileType,
    pub error: Error,
}

struct DisplayFailures<'a>(&'a [DetectionFailure]);

impl fmt::Display for DisplayFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", failure.file_type, failure.error)?;
        }
        Ok(())
    }
}

/// Result type of this crate.
pub type Result<T> = core::result::Result<T, Error>;
