use std::path::{Path, PathBuf};

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::format::{detect_format, Format};
use crate::gadgets::GadgetScan;
use crate::header::{inspect, Architecture, Bitness, Classification, Endianness};
use crate::sections::find_code_section;

/// Classifies `data`: container format first, then the header fields of
/// that format.
pub fn classify(data: &[u8]) -> Classification {
    inspect(detect_format(data), data)
}

/// An executable image loaded into memory.
///
/// The buffer is never modified and the classification is computed once
/// when the image is created.
#[derive(Debug)]
pub struct BinaryImage {
    path: PathBuf,
    data: Vec<u8>,
    classification: Classification,
}

impl BinaryImage {
    /// Reads the whole file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(&path)?;
        Self::from_bytes(path, data)
    }

    /// Wraps an already loaded buffer. `path` is only recorded for reporting.
    pub fn from_bytes<P: AsRef<Path>>(path: P, data: Vec<u8>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if data.is_empty() {
            log::warn!("{} is empty", path.display());
            return Err(Error::EmptyFile);
        }

        let classification = classify(&data);
        log::info!(
            "{}: {} {} {} {}",
            path.display(),
            classification.format,
            classification.bitness,
            classification.endianness,
            classification.architecture
        );

        Ok(Self {
            path,
            data,
            classification,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn format(&self) -> Format {
        self.classification.format
    }

    pub fn bitness(&self) -> Bitness {
        self.classification.bitness
    }

    pub fn endianness(&self) -> Endianness {
        self.classification.endianness
    }

    pub fn architecture(&self) -> Architecture {
        self.classification.architecture
    }

    /// Locates the code section and collects every return opcode in it.
    pub fn scan(&self, config: &ScanConfig) -> Result<GadgetScan<'_>> {
        if self.format() != Format::Elf {
            return Err(Error::UnsupportedFormat(self.format()));
        }

        let section = find_code_section(&self.data)?;
        let code = section.data(&self.data)?;
        Ok(GadgetScan::run(section, code, config.context_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Elf64Builder;
    use goblin::elf::header::EM_AARCH64;

    #[test]
    fn classifies_at_construction() {
        let bytes = Elf64Builder::new().section(".text", 0x401000, &[0xC3]).build();
        let image = BinaryImage::from_bytes("a.out", bytes).unwrap();
        assert_eq!(image.format(), Format::Elf);
        assert_eq!(image.bitness(), Bitness::Bits64);
        assert_eq!(image.endianness(), Endianness::Little);
        assert_eq!(image.architecture(), Architecture::Amd64);
        assert_eq!(image.path(), Path::new("a.out"));
    }

    #[test]
    fn empty_buffer_is_rejected() {
        assert!(matches!(
            BinaryImage::from_bytes("empty", Vec::new()),
            Err(Error::EmptyFile)
        ));
    }

    #[test]
    fn classification_is_deterministic() {
        let bytes = Elf64Builder::new()
            .big_endian()
            .machine(EM_AARCH64)
            .section(".text", 0, &[0xC3])
            .build();
        assert_eq!(classify(&bytes), classify(&bytes));
        let a = BinaryImage::from_bytes("a", bytes.clone()).unwrap();
        let b = BinaryImage::from_bytes("b", bytes).unwrap();
        assert_eq!(a.classification(), b.classification());
        assert_eq!(a.architecture(), Architecture::AArch64);
    }

    #[test]
    fn scan_reports_matches_relative_to_section() {
        let bytes = Elf64Builder::new()
            .section(".text", 0x401000, &[0x90, 0xC3, 0x90, 0xC3])
            .build();
        let image = BinaryImage::from_bytes("a.out", bytes).unwrap();
        let scan = image.scan(&ScanConfig { context_bytes: 1 }).unwrap();

        assert_eq!(scan.count(), 2);
        let text_offset = scan.section.file_offset;
        assert_eq!(scan.matches[0].file_offset, text_offset + 1);
        assert_eq!(scan.matches[0].virtual_address, 0x401001);
        assert_eq!(scan.matches[1].file_offset, text_offset + 3);
        assert_eq!(scan.matches[1].virtual_address, 0x401003);
        assert!(scan.matches.iter().all(|m| m.context == [0x90, 0xC3]));
    }

    #[test]
    fn scan_rejects_non_elf() {
        let image = BinaryImage::from_bytes("x.exe", b"MZ\x90\x00\x03\x00".to_vec()).unwrap();
        assert!(matches!(
            image.scan(&ScanConfig::default()),
            Err(Error::UnsupportedFormat(Format::Pe))
        ));
    }

    #[test]
    fn scan_rejects_elf32() {
        let bytes = Elf64Builder::new().class(1).section(".text", 0, &[0xC3]).build();
        let image = BinaryImage::from_bytes("elf32", bytes).unwrap();
        assert_eq!(image.bitness(), Bitness::Bits32);
        assert!(matches!(
            image.scan(&ScanConfig::default()),
            Err(Error::UnsupportedClass(1))
        ));
    }

    #[test]
    fn open_missing_file_is_io_error() {
        assert!(matches!(
            BinaryImage::open("/nonexistent/ropsmith/binary"),
            Err(Error::Io(_))
        ));
    }
}
