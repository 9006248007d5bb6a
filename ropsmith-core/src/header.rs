pub mod elf;
pub mod macho;
pub mod pe;

use std::fmt;

use crate::format::Format;

/// Address width declared by an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Bitness {
    #[default]
    Unknown,
    Bits32,
    Bits64,
}

/// Byte order of multi-byte header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    #[default]
    Unknown,
    Little,
    Big,
}

/// Target CPU family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Architecture {
    #[default]
    Unknown,
    X86,
    Amd64,
    Arm,
    AArch64,
    RiscV,
    Mips,
}

impl fmt::Display for Bitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bitness::Bits32 => "32-bit",
            Bitness::Bits64 => "64-bit",
            Bitness::Unknown => "N/A",
        })
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endianness::Little => "LSB",
            Endianness::Big => "MSB",
            Endianness::Unknown => "N/A",
        })
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Architecture::X86 => "x86",
            Architecture::Amd64 => "x86_64",
            Architecture::Arm => "arm",
            Architecture::AArch64 => "aarch64",
            Architecture::RiscV => "riscv",
            Architecture::Mips => "mips",
            Architecture::Unknown => "N/A",
        })
    }
}

/// Read-only view over the header of one container format.
///
/// Implementations never fail: anything they cannot establish from the
/// buffer is reported as the `Unknown` variant.
pub trait Header: fmt::Debug + Send + Sync {
    /// Returns the container format this view interprets.
    fn format(&self) -> Format;

    /// Returns the declared address width.
    fn bitness(&self) -> Bitness;

    /// Returns the byte order of the header fields.
    fn endianness(&self) -> Endianness;

    /// Returns the target CPU family.
    fn architecture(&self) -> Architecture;
}

/// The four classification dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Classification {
    pub format: Format,
    pub bitness: Bitness,
    pub endianness: Endianness,
    pub architecture: Architecture,
}

/// Picks the header view for `format` over `data`.
pub fn header_for(format: Format, data: &[u8]) -> Option<Box<dyn Header + '_>> {
    match format {
        Format::Elf => Some(Box::new(elf::ElfHeader::new(data))),
        Format::Pe => Some(Box::new(pe::PeHeader::new(data))),
        Format::MachO => Some(Box::new(macho::MachHeader::new(data))),
        Format::Unknown => None,
    }
}

/// Derives bitness, byte order and architecture of `data` read as `format`.
pub fn inspect(format: Format, data: &[u8]) -> Classification {
    let Some(header) = header_for(format, data) else {
        return Classification::default();
    };

    let classification = Classification {
        format: header.format(),
        bitness: header.bitness(),
        endianness: header.endianness(),
        architecture: header.architecture(),
    };
    log::debug!("Inspected {} header: {classification:?}", header.format());
    classification
}

/// Maps a raw machine identifier through one of the static tables.
pub(crate) fn lookup_arch<K: PartialEq + Copy>(table: &[(K, Architecture)], key: K) -> Architecture {
    table
        .iter()
        .find(|(id, _)| *id == key)
        .map(|(_, arch)| *arch)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_inspects_to_unknown() {
        assert_eq!(inspect(Format::Unknown, b"\x7fELF\x02\x01\x01\x00"), Classification::default());
    }

    #[test]
    fn tokens() {
        assert_eq!(Bitness::Bits32.to_string(), "32-bit");
        assert_eq!(Bitness::Bits64.to_string(), "64-bit");
        assert_eq!(Endianness::Little.to_string(), "LSB");
        assert_eq!(Endianness::Big.to_string(), "MSB");
        let archs: Vec<String> = [
            Architecture::X86,
            Architecture::Amd64,
            Architecture::Arm,
            Architecture::AArch64,
            Architecture::RiscV,
            Architecture::Mips,
            Architecture::Unknown,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(archs, ["x86", "x86_64", "arm", "aarch64", "riscv", "mips", "N/A"]);
    }

    #[test]
    fn table_lookup_defaults_to_unknown() {
        let table = [(1u16, Architecture::X86), (2, Architecture::Arm)];
        assert_eq!(lookup_arch(&table, 2), Architecture::Arm);
        assert_eq!(lookup_arch(&table, 9), Architecture::Unknown);
    }
}
