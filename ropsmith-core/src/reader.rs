use byteorder::{ByteOrder, LE};

use crate::header::Endianness;

/// Fixed-width unsigned integers that can be pulled out of an image buffer.
pub trait Scalar: Copy + Sized {
    const SIZE: usize;

    /// Decodes `bytes[..Self::SIZE]` as stored little-endian.
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Reverses the byte order; identity for single bytes.
    fn swap_byte_order(self) -> Self;
}

impl Scalar for u8 {
    const SIZE: usize = 1;

    fn from_le_slice(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn swap_byte_order(self) -> Self {
        self
    }
}

impl Scalar for u16 {
    const SIZE: usize = 2;

    fn from_le_slice(bytes: &[u8]) -> Self {
        LE::read_u16(bytes)
    }

    fn swap_byte_order(self) -> Self {
        self.swap_bytes()
    }
}

impl Scalar for u32 {
    const SIZE: usize = 4;

    fn from_le_slice(bytes: &[u8]) -> Self {
        LE::read_u32(bytes)
    }

    fn swap_byte_order(self) -> Self {
        self.swap_bytes()
    }
}

impl Scalar for u64 {
    const SIZE: usize = 8;

    fn from_le_slice(bytes: &[u8]) -> Self {
        LE::read_u64(bytes)
    }

    fn swap_byte_order(self) -> Self {
        self.swap_bytes()
    }
}

/// Bounds-checked view over an image buffer.
///
/// Every multi-byte field the classifiers and scanners look at goes
/// through here. Reads past the end yield `None`; callers decide whether
/// that means "unknown" or a hard failure.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads a `T` at `offset`, interpreting the stored bytes as little-endian.
    pub fn read<T: Scalar>(&self, offset: usize) -> Option<T> {
        self.bytes(offset, T::SIZE).map(T::from_le_slice)
    }

    /// Reads a `T` at `offset` in the given byte order.
    ///
    /// `Endianness::Unknown` is read as little-endian.
    pub fn read_ordered<T: Scalar>(&self, offset: usize, order: Endianness) -> Option<T> {
        let raw = self.read::<T>(offset)?;
        Some(match order {
            Endianness::Big => raw.swap_byte_order(),
            Endianness::Little | Endianness::Unknown => raw,
        })
    }

    /// Borrows `len` bytes starting at `offset`.
    pub fn bytes(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(len)?;
        self.data.get(offset..end)
    }

    /// Same as [`ByteReader::bytes`] but for offsets and sizes taken from
    /// 64-bit file fields.
    pub fn bytes_at(&self, offset: u64, len: u64) -> Option<&'a [u8]> {
        let offset = usize::try_from(offset).ok()?;
        let len = usize::try_from(len).ok()?;
        self.bytes(offset, len)
    }
}

/// Reads a `T` at `offset` of `data`, or `None` if it would run past the end.
pub fn read_scalar<T: Scalar>(data: &[u8], offset: usize) -> Option<T> {
    ByteReader::new(data).read(offset)
}

pub fn swap_byte_order<T: Scalar>(value: T) -> T {
    value.swap_byte_order()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_past_end_is_none() {
        let data = [0x01, 0x02, 0x03];
        assert_eq!(read_scalar::<u16>(&data, 1), Some(0x0302));
        assert_eq!(read_scalar::<u16>(&data, 2), None);
        assert_eq!(read_scalar::<u32>(&data, 0), None);
        assert_eq!(read_scalar::<u8>(&data, usize::MAX), None);
    }

    #[test]
    fn swap_reverses_bytes() {
        assert_eq!(swap_byte_order(0xABu8), 0xAB);
        assert_eq!(swap_byte_order(0x1234u16), 0x3412);
        assert_eq!(swap_byte_order(0x1122_3344u32), 0x4433_2211);
        assert_eq!(
            swap_byte_order(0x0102_0304_0506_0708u64),
            0x0807_0605_0403_0201
        );
    }

    #[test]
    fn ordered_read_swaps_only_for_big_endian() {
        let data = [0x00, 0x3E];
        let reader = ByteReader::new(&data);
        assert_eq!(reader.read_ordered::<u16>(0, Endianness::Little), Some(0x3E00));
        assert_eq!(reader.read_ordered::<u16>(0, Endianness::Unknown), Some(0x3E00));
        assert_eq!(reader.read_ordered::<u16>(0, Endianness::Big), Some(0x003E));
    }

    #[test]
    fn wide_offsets_do_not_wrap() {
        let data = [0u8; 8];
        let reader = ByteReader::new(&data);
        assert!(reader.bytes_at(u64::MAX, 1).is_none());
        assert!(reader.bytes(4, usize::MAX).is_none());
        assert_eq!(reader.bytes_at(4, 4).map(<[u8]>::len), Some(4));
    }
}
