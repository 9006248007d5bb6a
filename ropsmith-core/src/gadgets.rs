use crate::sections::SectionDescriptor;

/// x86 near `ret`.
pub const RET_OPCODE: u8 = 0xC3;

/// One return opcode found in a code section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GadgetMatch<'a> {
    pub file_offset: u64,
    pub virtual_address: u64,
    /// Up to the requested number of bytes before the opcode, followed by
    /// the opcode itself.
    pub context: &'a [u8],
}

impl GadgetMatch<'_> {
    /// Number of bytes in the context window that precede the opcode.
    pub fn lead_in(&self) -> usize {
        self.context.len().saturating_sub(1)
    }
}

/// Every return opcode in `code`, in ascending offset order.
///
/// `file_offset` and `virtual_address` are the bases of `code` in the file
/// and in memory.
pub fn scan_returns(
    code: &[u8],
    file_offset: u64,
    virtual_address: u64,
    context_bytes: usize,
) -> Vec<GadgetMatch<'_>> {
    memchr::memchr_iter(RET_OPCODE, code)
        .map(|index| {
            let start = index - context_bytes.min(index);
            let local = index as u64;
            GadgetMatch {
                file_offset: file_offset.wrapping_add(local),
                virtual_address: virtual_address.wrapping_add(local),
                context: &code[start..=index],
            }
        })
        .collect()
}

/// Result of scanning one code section.
#[derive(Debug, Clone)]
pub struct GadgetScan<'a> {
    pub section: SectionDescriptor,
    pub matches: Vec<GadgetMatch<'a>>,
}

impl<'a> GadgetScan<'a> {
    /// Scans the bytes of `section`, which must already be borrowed out of
    /// the image it describes.
    pub fn run(section: SectionDescriptor, code: &'a [u8], context_bytes: usize) -> Self {
        let matches = scan_returns(code, section.file_offset, section.virtual_address, context_bytes);
        log::info!("Found {} return opcodes in {}", matches.len(), section.name);
        Self { section, matches }
    }

    pub fn count(&self) -> usize {
        self.matches.len()
    }
}
