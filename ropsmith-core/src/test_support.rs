//! Synthetic images for tests.

use goblin::elf::header::{ELFCLASS64, ELFDATA2LSB, ELFDATA2MSB, EM_X86_64, ET_EXEC};
use goblin::elf::section_header::{SHF_ALLOC, SHF_EXECINSTR, SHT_PROGBITS, SHT_STRTAB};
use goblin::elf64::header::SIZEOF_EHDR;
use goblin::elf64::section_header::SIZEOF_SHDR;

struct SectionSpec {
    name: String,
    addr: u64,
    data: Vec<u8>,
}

/// Lays out a minimal ELF64 file: header, section bytes, the
/// section-name string table, then the section header table.
pub struct Elf64Builder {
    class: u8,
    big_endian: bool,
    machine: u16,
    sections: Vec<SectionSpec>,
}

impl Default for Elf64Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Elf64Builder {
    pub fn new() -> Self {
        Self {
            class: ELFCLASS64,
            big_endian: false,
            machine: EM_X86_64,
            sections: Vec::new(),
        }
    }

    /// Overrides `e_ident[EI_CLASS]` without changing the layout.
    pub fn class(mut self, class: u8) -> Self {
        self.class = class;
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn machine(mut self, machine: u16) -> Self {
        self.machine = machine;
        self
    }

    pub fn section(mut self, name: &str, addr: u64, data: &[u8]) -> Self {
        self.sections.push(SectionSpec {
            name: name.to_string(),
            addr,
            data: data.to_vec(),
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = vec![0u8; SIZEOF_EHDR];
        out[..4].copy_from_slice(b"\x7fELF");
        out[4] = self.class;
        out[5] = if self.big_endian { ELFDATA2MSB } else { ELFDATA2LSB };
        out[6] = 1;

        let w = Writer {
            big_endian: self.big_endian,
        };
        w.put16(&mut out, 0x10, ET_EXEC);
        w.put16(&mut out, 0x12, self.machine);
        w.put32(&mut out, 0x14, 1);
        w.put16(&mut out, 0x34, SIZEOF_EHDR as u16);
        w.put16(&mut out, 0x3A, SIZEOF_SHDR as u16);

        if self.sections.is_empty() {
            return out;
        }

        let mut offsets = Vec::with_capacity(self.sections.len());
        for section in &self.sections {
            offsets.push(out.len() as u64);
            out.extend_from_slice(&section.data);
        }

        let mut strtab = vec![0u8];
        let mut name_offsets = Vec::with_capacity(self.sections.len());
        for section in &self.sections {
            name_offsets.push(strtab.len() as u32);
            strtab.extend_from_slice(section.name.as_bytes());
            strtab.push(0);
        }
        let shstrtab_name = strtab.len() as u32;
        strtab.extend_from_slice(b".shstrtab\0");
        let strtab_offset = out.len() as u64;
        out.extend_from_slice(&strtab);

        let shoff = out.len() as u64;
        let shnum = self.sections.len() + 2;
        out.resize(out.len() + shnum * SIZEOF_SHDR, 0);

        for (i, section) in self.sections.iter().enumerate() {
            let base = shoff as usize + (i + 1) * SIZEOF_SHDR;
            w.put32(&mut out, base, name_offsets[i]);
            w.put32(&mut out, base + 0x04, SHT_PROGBITS);
            w.put64(&mut out, base + 0x08, u64::from(SHF_ALLOC | SHF_EXECINSTR));
            w.put64(&mut out, base + 0x10, section.addr);
            w.put64(&mut out, base + 0x18, offsets[i]);
            w.put64(&mut out, base + 0x20, section.data.len() as u64);
        }

        let base = shoff as usize + (shnum - 1) * SIZEOF_SHDR;
        w.put32(&mut out, base, shstrtab_name);
        w.put32(&mut out, base + 0x04, SHT_STRTAB);
        w.put64(&mut out, base + 0x18, strtab_offset);
        w.put64(&mut out, base + 0x20, strtab.len() as u64);

        w.put64(&mut out, 0x28, shoff);
        w.put16(&mut out, 0x3C, shnum as u16);
        w.put16(&mut out, 0x3E, (shnum - 1) as u16);
        out
    }
}

struct Writer {
    big_endian: bool,
}

impl Writer {
    fn put16(&self, out: &mut [u8], at: usize, v: u16) {
        let bytes = if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
        out[at..at + 2].copy_from_slice(&bytes);
    }

    fn put32(&self, out: &mut [u8], at: usize, v: u32) {
        let bytes = if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
        out[at..at + 4].copy_from_slice(&bytes);
    }

    fn put64(&self, out: &mut [u8], at: usize, v: u64) {
        let bytes = if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
        out[at..at + 8].copy_from_slice(&bytes);
    }
}
