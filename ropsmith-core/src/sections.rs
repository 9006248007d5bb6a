use goblin::elf::header::{ELFCLASS64, ELFMAG, SELFMAG};
use goblin::elf64::section_header::SIZEOF_SHDR;

use crate::error::{Error, Result};
use crate::header::elf::Elf64Ehdr;
use crate::header::Endianness;
use crate::reader::ByteReader;

/// Name of the section that holds executable code.
pub const CODE_SECTION_NAME: &str = ".text";

/// Location of a section inside an image buffer.
///
/// Holds offsets only; use [`SectionDescriptor::data`] to borrow the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDescriptor {
    pub name: &'static str,
    pub file_offset: u64,
    pub size: u64,
    pub virtual_address: u64,
}

impl SectionDescriptor {
    /// Borrows the section's bytes out of the image it was found in.
    pub fn data<'a>(&self, image: &'a [u8]) -> Result<&'a [u8]> {
        ByteReader::new(image)
            .bytes_at(self.file_offset, self.size)
            .ok_or_else(|| Error::SectionOutOfBounds {
                name: self.name,
                offset: self.file_offset,
                size: self.size,
            })
    }
}

/// One `Elf64_Shdr` record.
#[derive(Debug, Clone, Copy)]
struct Elf64Shdr {
    sh_name: u32,
    sh_addr: u64,
    sh_offset: u64,
    sh_size: u64,
}

impl Elf64Shdr {
    fn parse(record: &[u8], order: Endianness) -> Option<Self> {
        let reader = ByteReader::new(record);
        Some(Elf64Shdr {
            sh_name: reader.read_ordered(0x00, order)?,
            sh_addr: reader.read_ordered(0x10, order)?,
            sh_offset: reader.read_ordered(0x18, order)?,
            sh_size: reader.read_ordered(0x20, order)?,
        })
    }
}

/// Locates the code section of a 64-bit ELF image.
pub fn find_code_section(data: &[u8]) -> Result<SectionDescriptor> {
    if data.is_empty() {
        return Err(Error::EmptyFile);
    }

    let ehdr = Elf64Ehdr::parse(data).ok_or(Error::HeaderRead)?;
    if ehdr.e_ident[..SELFMAG] != ELFMAG[..] {
        return Err(Error::NotElf);
    }
    if ehdr.class() != ELFCLASS64 {
        return Err(Error::UnsupportedClass(ehdr.class()));
    }
    if ehdr.e_shoff == 0 || ehdr.e_shnum == 0 {
        return Err(Error::NoSectionHeaders);
    }

    let order = ehdr.endianness();
    let headers = section_headers(data, &ehdr, order)?;
    let strtab = section_names(data, &ehdr, &headers)?;

    let text = headers
        .iter()
        .find(|sh| name_at(strtab, sh.sh_name) == Some(CODE_SECTION_NAME.as_bytes()))
        .ok_or(Error::NoCodeSection)?;

    let section = SectionDescriptor {
        name: CODE_SECTION_NAME,
        file_offset: text.sh_offset,
        size: text.sh_size,
        virtual_address: text.sh_addr,
    };
    log::info!(
        "Found {} at offset {:#x}, size {:#x}, vaddr {:#x}",
        section.name,
        section.file_offset,
        section.size,
        section.virtual_address
    );
    Ok(section)
}

fn section_headers(data: &[u8], ehdr: &Elf64Ehdr, order: Endianness) -> Result<Vec<Elf64Shdr>> {
    let out_of_bounds = || Error::SectionTableOutOfBounds {
        offset: ehdr.e_shoff,
        count: ehdr.e_shnum,
    };

    let table_len = u64::from(ehdr.e_shnum) * SIZEOF_SHDR as u64;
    let table = ByteReader::new(data)
        .bytes_at(ehdr.e_shoff, table_len)
        .ok_or_else(out_of_bounds)?;

    table
        .chunks_exact(SIZEOF_SHDR)
        .map(|record| Elf64Shdr::parse(record, order).ok_or_else(out_of_bounds))
        .collect()
}

fn section_names<'a>(data: &'a [u8], ehdr: &Elf64Ehdr, headers: &[Elf64Shdr]) -> Result<&'a [u8]> {
    let index = ehdr.e_shstrndx;
    let shstr = headers
        .get(usize::from(index))
        .ok_or(Error::StringTableOutOfBounds { index })?;

    ByteReader::new(data)
        .bytes_at(shstr.sh_offset, shstr.sh_size)
        .ok_or(Error::StringTableOutOfBounds { index })
}

/// NUL-terminated name at `offset` in the string table.
fn name_at(strtab: &[u8], offset: u32) -> Option<&[u8]> {
    let rest = strtab.get(usize::try_from(offset).ok()?..)?;
    let end = memchr::memchr(0, rest).unwrap_or(rest.len());
    Some(&rest[..end])
}
