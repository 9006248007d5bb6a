//! Property tests for classification: total, bounds-safe and deterministic.

use proptest::prelude::*;

use ropsmith_core::{classify, detect_format, inspect, Architecture, Bitness, Format};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    #[test]
    fn short_buffers_are_unknown(data in prop::collection::vec(any::<u8>(), 0..4)) {
        prop_assert_eq!(detect_format(&data), Format::Unknown);
    }

    #[test]
    fn classification_is_deterministic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        prop_assert_eq!(classify(&data), classify(&data));
    }

    /// Every format branch must stay in bounds whatever the buffer holds.
    #[test]
    fn inspect_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        for format in [Format::Elf, Format::Pe, Format::MachO, Format::Unknown] {
            let _ = inspect(format, &data);
        }
    }

    /// A Mach-O cputype at offset 4 never matters when the magic is blank.
    #[test]
    fn degenerate_prefix_is_unknown(
        fill in prop::sample::select(vec![0x00u8, 0xFF]),
        rest in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut data = vec![fill; 4];
        data.extend_from_slice(&rest);
        prop_assert_eq!(detect_format(&data), Format::Unknown);
        prop_assert_eq!(inspect(Format::MachO, &data).architecture, Architecture::Unknown);
    }

    /// `e_lfanew` pointing anywhere past the buffer yields nothing.
    #[test]
    fn pe_offset_past_end(e_lfanew in 0x3Bu32..=u32::MAX) {
        let mut data = vec![0u8; 0x40];
        data[..2].copy_from_slice(b"MZ");
        data[0x3C..0x40].copy_from_slice(&e_lfanew.to_le_bytes());
        let classification = inspect(Format::Pe, &data);
        prop_assert_eq!(classification.bitness, Bitness::Unknown);
        prop_assert_eq!(classification.architecture, Architecture::Unknown);
    }
}

#[test]
fn big_endian_elf64_amd64() {
    let mut data = vec![0u8; 0x40];
    data[..4].copy_from_slice(b"\x7fELF");
    data[4] = 2;
    data[5] = 2;
    data[0x12] = 0x00;
    data[0x13] = 0x3E;
    let classification = classify(&data);
    assert_eq!(classification.format, Format::Elf);
    assert_eq!(classification.bitness, Bitness::Bits64);
    assert_eq!(classification.architecture, Architecture::Amd64);
}

#[test]
fn fat_macho_first_record_wins() {
    let mut data = Vec::new();
    data.extend_from_slice(&[0xCA, 0xFE, 0xBA, 0xBE]);
    data.extend_from_slice(&2u32.to_be_bytes());
    let mut first = [0u8; 20];
    first[..4].copy_from_slice(&0x0100_0007u32.to_be_bytes());
    let second = [0xAB; 20];
    data.extend_from_slice(&first);
    data.extend_from_slice(&second);

    assert_eq!(detect_format(&data), Format::Unknown);
    assert_eq!(inspect(Format::MachO, &data).architecture, Architecture::Amd64);
}
