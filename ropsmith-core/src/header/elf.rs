use goblin::elf::header::{
    EI_CLASS, EI_DATA, ELFCLASS32, ELFCLASS64, ELFDATA2LSB, ELFDATA2MSB, EM_386, EM_AARCH64,
    EM_ARM, EM_MIPS, EM_RISCV, EM_X86_64,
};
use goblin::elf64::header::SIZEOF_EHDR;

use crate::format::Format;
use crate::header::{lookup_arch, Architecture, Bitness, Endianness, Header};
use crate::reader::ByteReader;

/// `e_machine` values we know how to name.
static ELF_MACHINES: &[(u16, Architecture)] = &[
    (EM_386, Architecture::X86),
    (EM_X86_64, Architecture::Amd64),
    (EM_ARM, Architecture::Arm),
    (EM_AARCH64, Architecture::AArch64),
    (EM_RISCV, Architecture::RiscV),
    (EM_MIPS, Architecture::Mips),
];

const E_MACHINE_OFFSET: usize = 0x12;

/// Classification view over the identification bytes of an ELF image.
#[derive(Debug, Clone, Copy)]
pub struct ElfHeader<'a> {
    reader: ByteReader<'a>,
}

impl<'a> ElfHeader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(data),
        }
    }
}

impl Header for ElfHeader<'_> {
    fn format(&self) -> Format {
        Format::Elf
    }

    fn bitness(&self) -> Bitness {
        if self.reader.len() < 6 {
            return Bitness::Unknown;
        }
        match self.reader.read::<u8>(EI_CLASS) {
            Some(ELFCLASS32) => Bitness::Bits32,
            Some(ELFCLASS64) => Bitness::Bits64,
            _ => Bitness::Unknown,
        }
    }

    fn endianness(&self) -> Endianness {
        if self.reader.len() < 8 {
            return Endianness::Unknown;
        }
        match self.reader.read::<u8>(EI_DATA) {
            Some(ELFDATA2LSB) => Endianness::Little,
            Some(ELFDATA2MSB) => Endianness::Big,
            _ => Endianness::Unknown,
        }
    }

    fn architecture(&self) -> Architecture {
        if self.reader.len() < 0x14 {
            return Architecture::Unknown;
        }
        self.reader
            .read_ordered::<u16>(E_MACHINE_OFFSET, self.endianness())
            .map(|machine| lookup_arch(ELF_MACHINES, machine))
            .unwrap_or_default()
    }
}

/// The fixed-size `Elf64_Ehdr` at the start of every 64-bit ELF file.
///
/// Only the fields needed to reach the section table are decoded, in the
/// byte order named by `e_ident[EI_DATA]`.
#[derive(Debug, Clone, Copy)]
pub struct Elf64Ehdr {
    /// Magic, class, data encoding, version and padding.
    pub e_ident: [u8; 16],
    /// File offset of the section header table.
    pub e_shoff: u64,
    /// Number of section header records.
    pub e_shnum: u16,
    /// Index of the section holding section names.
    pub e_shstrndx: u16,
}

impl Elf64Ehdr {
    pub const SIZE: usize = SIZEOF_EHDR;

    /// Decodes the header, or `None` if `data` is shorter than a full header.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let reader = ByteReader::new(data);
        let ident = reader.bytes(0, 16)?;
        if reader.len() < Self::SIZE {
            return None;
        }

        let order = match ident[EI_DATA] {
            ELFDATA2MSB => Endianness::Big,
            ELFDATA2LSB => Endianness::Little,
            other => {
                log::warn!("Unknown ELF data encoding {other}; assuming little endian");
                Endianness::Little
            }
        };

        let mut e_ident = [0u8; 16];
        e_ident.copy_from_slice(ident);

        Some(Elf64Ehdr {
            e_ident,
            e_shoff: reader.read_ordered(0x28, order)?,
            e_shnum: reader.read_ordered(0x3C, order)?,
            e_shstrndx: reader.read_ordered(0x3E, order)?,
        })
    }

    pub fn class(&self) -> u8 {
        self.e_ident[EI_CLASS]
    }

    /// Byte order the rest of the file is encoded in.
    pub fn endianness(&self) -> Endianness {
        if self.e_ident[EI_DATA] == ELFDATA2MSB {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }
}
