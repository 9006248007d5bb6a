use goblin::mach::cputype::{CPU_TYPE_ARM, CPU_TYPE_ARM64, CPU_TYPE_X86, CPU_TYPE_X86_64};
use goblin::mach::fat::{FAT_CIGAM, FAT_MAGIC, SIZEOF_FAT_ARCH};
use goblin::mach::header::{MH_CIGAM, MH_CIGAM_64, MH_MAGIC, MH_MAGIC_64};

use crate::format::{is_degenerate_magic, Format};
use crate::header::{lookup_arch, Architecture, Bitness, Endianness, Header};
use crate::reader::ByteReader;

/// `cputype` values we know how to name.
static MACHO_CPU_TYPES: &[(u32, Architecture)] = &[
    (CPU_TYPE_X86, Architecture::X86),
    (CPU_TYPE_X86_64, Architecture::Amd64),
    (CPU_TYPE_ARM, Architecture::Arm),
    (CPU_TYPE_ARM64, Architecture::AArch64),
];

/// Single-architecture magics, as read little-endian, with what they imply.
static THIN_MAGICS: &[(u32, Bitness, Endianness)] = &[
    (MH_MAGIC, Bitness::Bits32, Endianness::Little),
    (MH_MAGIC_64, Bitness::Bits64, Endianness::Little),
    (MH_CIGAM, Bitness::Bits32, Endianness::Big),
    (MH_CIGAM_64, Bitness::Bits64, Endianness::Big),
];

const FAT_MAGIC_ALT: u32 = 0xCAFE_D00D;

/// Multi-architecture magics, as read little-endian, with the byte order
/// of the `fat_header`/`fat_arch` fields that follow.
static FAT_MAGICS: &[(u32, Endianness)] = &[
    (FAT_MAGIC, Endianness::Little),
    (FAT_CIGAM, Endianness::Big),
    (FAT_MAGIC_ALT, Endianness::Little),
    (FAT_MAGIC_ALT.swap_bytes(), Endianness::Big),
];

const FAT_ARCHS_OFFSET: usize = 8;
const CPU_TYPE_OFFSET: usize = 4;

/// Classification view over a thin or fat Mach-O image.
#[derive(Debug, Clone, Copy)]
pub struct MachHeader<'a> {
    reader: ByteReader<'a>,
}

impl<'a> MachHeader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(data),
        }
    }

    fn magic(&self) -> Option<u32> {
        self.reader.read::<u32>(0)
    }

    fn thin(&self) -> Option<(Bitness, Endianness)> {
        let magic = self.magic()?;
        THIN_MAGICS
            .iter()
            .find(|(m, _, _)| *m == magic)
            .map(|(_, bits, order)| (*bits, *order))
    }

    fn fat_order(&self) -> Option<Endianness> {
        let magic = self.magic()?;
        FAT_MAGICS
            .iter()
            .find(|(m, _)| *m == magic)
            .map(|(_, order)| *order)
    }

    /// First `fat_arch` record whose `cputype` we can name.
    fn fat_architecture(&self, order: Endianness) -> Architecture {
        let Some(nfat_arch) = self.reader.read_ordered::<u32>(4, order) else {
            return Architecture::Unknown;
        };
        log::debug!("Fat Mach-O with {nfat_arch} architecture records");

        let mut offset = FAT_ARCHS_OFFSET;
        for _ in 0..nfat_arch {
            if self.reader.bytes(offset, SIZEOF_FAT_ARCH).is_none() {
                log::debug!("fat_arch record at {offset:#x} runs past the end of the image");
                break;
            }
            let Some(cputype) = self.reader.read_ordered::<u32>(offset, order) else {
                break;
            };
            let arch = lookup_arch(MACHO_CPU_TYPES, cputype);
            if arch != Architecture::Unknown {
                return arch;
            }
            offset += SIZEOF_FAT_ARCH;
        }
        Architecture::Unknown
    }
}

impl Header for MachHeader<'_> {
    fn format(&self) -> Format {
        Format::MachO
    }

    fn bitness(&self) -> Bitness {
        self.thin().map(|(bits, _)| bits).unwrap_or_default()
    }

    fn endianness(&self) -> Endianness {
        self.thin().map(|(_, order)| order).unwrap_or_default()
    }

    fn architecture(&self) -> Architecture {
        if let Some(order) = self.fat_order() {
            return self.fat_architecture(order);
        }

        match self.magic() {
            Some(magic) if !is_degenerate_magic(magic) => {}
            _ => return Architecture::Unknown,
        }

        self.reader
            .read_ordered::<u32>(CPU_TYPE_OFFSET, self.endianness())
            .map(|cputype| lookup_arch(MACHO_CPU_TYPES, cputype))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fat(records: &[u32]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&FAT_MAGIC.to_be_bytes());
        buf.extend_from_slice(&(records.len() as u32).to_be_bytes());
        for cputype in records {
            let mut record = [0u8; SIZEOF_FAT_ARCH];
            record[..4].copy_from_slice(&cputype.to_be_bytes());
            buf.extend_from_slice(&record);
        }
        buf
    }

    #[test]
    fn thin_64_little() {
        let mut buf = MH_MAGIC_64.to_le_bytes().to_vec();
        buf.extend_from_slice(&CPU_TYPE_ARM64.to_le_bytes());
        buf.extend_from_slice(&[0u8; 4]);
        let header = MachHeader::new(&buf);
        assert_eq!(header.bitness(), Bitness::Bits64);
        assert_eq!(header.endianness(), Endianness::Little);
        assert_eq!(header.architecture(), Architecture::AArch64);
    }

    #[test]
    fn thin_32_big() {
        let mut buf = MH_MAGIC.to_be_bytes().to_vec();
        buf.extend_from_slice(&CPU_TYPE_X86.to_be_bytes());
        let header = MachHeader::new(&buf);
        assert_eq!(header.bitness(), Bitness::Bits32);
        assert_eq!(header.endianness(), Endianness::Big);
        assert_eq!(header.architecture(), Architecture::X86);
    }

    #[test]
    fn fat_first_match_wins() {
        let buf = fat(&[CPU_TYPE_X86_64, CPU_TYPE_ARM64]);
        assert_eq!(MachHeader::new(&buf).architecture(), Architecture::Amd64);

        let buf = fat(&[CPU_TYPE_X86_64, 0xDEAD_BEEF]);
        assert_eq!(MachHeader::new(&buf).architecture(), Architecture::Amd64);
    }

    #[test]
    fn fat_skips_unknown_records() {
        let buf = fat(&[0x12, CPU_TYPE_ARM]);
        assert_eq!(MachHeader::new(&buf).architecture(), Architecture::Arm);
    }

    #[test]
    fn fat_count_larger_than_buffer_stops_early() {
        let mut buf = fat(&[0x12]);
        buf[4..8].copy_from_slice(&u32::MAX.to_be_bytes());
        assert_eq!(MachHeader::new(&buf).architecture(), Architecture::Unknown);
    }

    #[test]
    fn fat_truncated_record_is_not_read() {
        let mut buf = fat(&[CPU_TYPE_X86_64]);
        buf.truncate(FAT_ARCHS_OFFSET + SIZEOF_FAT_ARCH - 1);
        assert_eq!(MachHeader::new(&buf).architecture(), Architecture::Unknown);
    }

    #[test]
    fn fat_alternate_magic_little_endian_fields() {
        let mut buf = FAT_MAGIC_ALT.to_le_bytes().to_vec();
        buf.extend_from_slice(&1u32.to_le_bytes());
        let mut record = [0u8; SIZEOF_FAT_ARCH];
        record[..4].copy_from_slice(&CPU_TYPE_ARM64.to_le_bytes());
        buf.extend_from_slice(&record);
        assert_eq!(MachHeader::new(&buf).architecture(), Architecture::AArch64);
    }

    #[test]
    fn degenerate_magic() {
        let header = MachHeader::new(&[0u8; 16]);
        assert_eq!(header.architecture(), Architecture::Unknown);
        assert_eq!(header.bitness(), Bitness::Unknown);
        let header = MachHeader::new(&[0xFFu8; 16]);
        assert_eq!(header.architecture(), Architecture::Unknown);
        assert_eq!(header.endianness(), Endianness::Unknown);
    }
}
