use thiserror::Error;

use crate::format::Format;

/// Failures surfaced by loading, section lookup and gadget scanning.
///
/// Classification never produces one of these; it resolves to `Unknown`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("empty file")]
    EmptyFile,

    #[error("header read error: file is shorter than an ELF64 header")]
    HeaderRead,

    #[error("not an ELF file")]
    NotElf,

    #[error("unsupported ELF class {0} (only ELF64 supported)")]
    UnsupportedClass(u8),

    #[error("unsupported format {0} (only ELF supported)")]
    UnsupportedFormat(Format),

    #[error("no section headers")]
    NoSectionHeaders,

    #[error("section header table at {offset:#x} ({count} entries) lies outside the file")]
    SectionTableOutOfBounds { offset: u64, count: u16 },

    #[error("section header string table (index {index}) lies outside the file")]
    StringTableOutOfBounds { index: u16 },

    #[error("no code section found")]
    NoCodeSection,

    #[error("section {name} ({offset:#x}+{size:#x}) lies outside the file")]
    SectionOutOfBounds { name: &'static str, offset: u64, size: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
