use goblin::pe::header::{
    COFF_MACHINE_ARM, COFF_MACHINE_ARM64, COFF_MACHINE_ARMNT, COFF_MACHINE_MIPS16,
    COFF_MACHINE_MIPSFPU, COFF_MACHINE_MIPSFPU16, COFF_MACHINE_R4000, COFF_MACHINE_THUMB,
    COFF_MACHINE_WCEMIPSV2, COFF_MACHINE_X86, COFF_MACHINE_X86_64,
};
use goblin::pe::optional_header::{MAGIC_32, MAGIC_64};

use crate::format::Format;
use crate::header::{lookup_arch, Architecture, Bitness, Endianness, Header};
use crate::reader::ByteReader;

/// COFF `Machine` values we know how to name.
static PE_MACHINES: &[(u16, Architecture)] = &[
    (COFF_MACHINE_X86, Architecture::X86),
    (COFF_MACHINE_X86_64, Architecture::Amd64),
    (COFF_MACHINE_ARM, Architecture::Arm),
    (COFF_MACHINE_THUMB, Architecture::Arm),
    (COFF_MACHINE_ARMNT, Architecture::Arm),
    (COFF_MACHINE_ARM64, Architecture::AArch64),
    (COFF_MACHINE_R4000, Architecture::Mips),
    (COFF_MACHINE_WCEMIPSV2, Architecture::Mips),
    (COFF_MACHINE_MIPS16, Architecture::Mips),
    (COFF_MACHINE_MIPSFPU, Architecture::Mips),
    (COFF_MACHINE_MIPSFPU16, Architecture::Mips),
];

/// Location of `e_lfanew` in the DOS stub.
const E_LFANEW_OFFSET: usize = 0x3C;
const DOS_HEADER_SIZE: usize = 0x40;
/// `Machine` follows the 4-byte `PE\0\0` signature.
const MACHINE_OFFSET: usize = 4;
/// Optional-header magic: signature (4) + COFF file header (20).
const OPTIONAL_MAGIC_OFFSET: usize = 0x18;

/// Classification view over a PE image.
///
/// PE is little-endian by definition, so every field here is read as
/// little-endian regardless of host order.
#[derive(Debug, Clone, Copy)]
pub struct PeHeader<'a> {
    reader: ByteReader<'a>,
}

impl<'a> PeHeader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(data),
        }
    }

    /// Offset of the NT headers, if the DOS stub names one inside the buffer.
    fn nt_headers_offset(&self) -> Option<usize> {
        if self.reader.len() < DOS_HEADER_SIZE {
            return None;
        }
        let offset = usize::try_from(self.reader.read::<u32>(E_LFANEW_OFFSET)?).ok()?;
        if offset.checked_add(6)? > self.reader.len() {
            log::debug!("e_lfanew {offset:#x} points past the end of the image");
            return None;
        }
        Some(offset)
    }
}

impl Header for PeHeader<'_> {
    fn format(&self) -> Format {
        Format::Pe
    }

    fn bitness(&self) -> Bitness {
        let magic = self
            .nt_headers_offset()
            .and_then(|nt| self.reader.read::<u16>(nt.checked_add(OPTIONAL_MAGIC_OFFSET)?));
        match magic {
            Some(MAGIC_32) => Bitness::Bits32,
            Some(MAGIC_64) => Bitness::Bits64,
            _ => Bitness::Unknown,
        }
    }

    fn endianness(&self) -> Endianness {
        Endianness::Little
    }

    fn architecture(&self) -> Architecture {
        self.nt_headers_offset()
            .and_then(|nt| self.reader.read::<u16>(nt + MACHINE_OFFSET))
            .map(|machine| lookup_arch(PE_MACHINES, machine))
            .unwrap_or_default()
    }
}
