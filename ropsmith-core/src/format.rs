use std::fmt;

use goblin::elf::header::{ELFMAG, SELFMAG};
use goblin::mach::header::{MH_CIGAM, MH_CIGAM_64, MH_MAGIC, MH_MAGIC_64};

use crate::reader::read_scalar;

/// Container format of an executable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    #[default]
    Unknown,
    Elf,
    Pe,
    MachO,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Elf => "ELF",
            Format::Pe => "PE",
            Format::MachO => "Mach-O",
            Format::Unknown => "N/A",
        };
        f.write_str(name)
    }
}

const DOS_MAGIC: &[u8; 2] = b"MZ";

/// Single-architecture Mach-O magics as they read from a little-endian
/// view of the first four bytes.
pub(crate) const MACHO_MAGICS: [u32; 4] = [MH_MAGIC, MH_MAGIC_64, MH_CIGAM, MH_CIGAM_64];

/// A first word that is all zero or all one bits is a blank or corrupt
/// buffer and never a container magic.
pub(crate) fn is_degenerate_magic(magic: u32) -> bool {
    magic == 0 || magic == u32::MAX
}

/// Classifies `data` by its leading magic bytes.
pub fn detect_format(data: &[u8]) -> Format {
    if data.len() < 4 {
        return Format::Unknown;
    }

    if data[..SELFMAG] == ELFMAG[..] {
        return Format::Elf;
    }

    if data.starts_with(DOS_MAGIC) {
        return Format::Pe;
    }

    let Some(magic) = read_scalar::<u32>(data, 0) else {
        return Format::Unknown;
    };

    if is_degenerate_magic(magic) {
        log::warn!("Degenerate leading word {magic:#010x}; not classifying");
        return Format::Unknown;
    }

    if MACHO_MAGICS.contains(&magic) {
        Format::MachO
    } else {
        Format::Unknown
    }
}
