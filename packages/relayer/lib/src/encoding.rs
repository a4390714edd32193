//! The canonical binary encoding of source chain entities, as consumed by
//! the destination bridge contract.
//!
//! Integers are little-endian. Variable-length integers use one byte below
//! `0xfd`, otherwise a `0xfd`/`0xfe`/`0xff` marker followed by a `u16`, `u32`
//! or `u64`.

use neo_apis::{Header, StateRoot, Witness};

/// An append-only little-endian byte writer.
#[derive(Debug, Default)]
pub struct BinWriter {
    buf: Vec<u8>,
}

impl BinWriter {
    /// Creates an empty writer.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Appends one byte.
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Appends a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a little-endian `u64`.
    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends raw bytes without a length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends a variable-length integer.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_var_int(&mut self, value: u64) {
        if value < 0xfd {
            self.write_u8(value as u8);
        } else if value <= u64::from(u16::MAX) {
            self.write_u8(0xfd);
            self.write_u16(value as u16);
        } else if value <= u64::from(u32::MAX) {
            self.write_u8(0xfe);
            self.write_u32(value as u32);
        } else {
            self.write_u8(0xff);
            self.write_u64(value);
        }
    }

    /// Appends a length-prefixed byte string.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_var_int(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    /// Consumes the writer, returning the bytes written.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Types with a canonical binary encoding.
pub trait CanonicalEncode {
    /// Appends the encoding of `self` to `writer`.
    fn encode_to(&self, writer: &mut BinWriter);

    /// Returns the encoding of `self`.
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut writer = BinWriter::new();
        self.encode_to(&mut writer);
        writer.into_bytes()
    }
}

impl CanonicalEncode for Witness {
    fn encode_to(&self, writer: &mut BinWriter) {
        writer.write_var_bytes(&self.invocation);
        writer.write_var_bytes(&self.verification);
    }
}

impl<T: CanonicalEncode> CanonicalEncode for [T] {
    fn encode_to(&self, writer: &mut BinWriter) {
        writer.write_var_int(self.len() as u64);
        for item in self {
            item.encode_to(writer);
        }
    }
}

impl CanonicalEncode for Header {
    fn encode_to(&self, writer: &mut BinWriter) {
        writer.write_u32(self.version);
        writer.write_bytes(self.prev_hash.as_le_slice());
        writer.write_bytes(self.merkle_root.as_le_slice());
        writer.write_u64(self.timestamp);
        writer.write_u64(self.nonce);
        writer.write_u32(self.index);
        writer.write_u8(self.primary_index);
        writer.write_bytes(self.next_consensus.as_le_slice());
        self.witnesses.encode_to(writer);
    }
}

impl CanonicalEncode for StateRoot {
    fn encode_to(&self, writer: &mut BinWriter) {
        writer.write_u8(self.version);
        writer.write_u32(self.index);
        writer.write_bytes(self.root_hash.as_le_slice());
        self.witnesses.encode_to(writer);
    }
}

#[cfg(test)]
mod tests {
    use neo_apis::{Uint160, Uint256};

    use super::*;

    fn var_int(value: u64) -> Vec<u8> {
        let mut writer = BinWriter::new();
        writer.write_var_int(value);
        writer.into_bytes()
    }

    #[test]
    fn var_int_boundaries() {
        assert_eq!(var_int(0), vec![0x00]);
        assert_eq!(var_int(0xfc), vec![0xfc]);
        assert_eq!(var_int(0xfd), vec![0xfd, 0xfd, 0x00]);
        assert_eq!(var_int(0xffff), vec![0xfd, 0xff, 0xff]);
        assert_eq!(var_int(0x1_0000), vec![0xfe, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(
            var_int(0x1_0000_0000),
            vec![0xff, 0, 0, 0, 0, 1, 0, 0, 0]
        );
    }

    #[test]
    fn header_layout() {
        let header = Header {
            hash: Uint256::ZERO,
            version: 0,
            prev_hash: Uint256::from_le_bytes([0x11; 32]),
            merkle_root: Uint256::from_le_bytes([0x22; 32]),
            timestamp: 0x0102_0304_0506_0708,
            nonce: 0x0a0b,
            index: 100,
            primary_index: 3,
            next_consensus: Uint160::from_le_bytes([0x33; 20]),
            witnesses: vec![Witness {
                invocation: vec![0xaa; 2],
                verification: vec![0xbb; 3],
            }],
        };
        let bytes = header.to_canonical_bytes();

        assert_eq!(bytes.len(), 4 + 32 + 32 + 8 + 8 + 4 + 1 + 20 + 1 + 3 + 4);
        assert_eq!(&bytes[..4], &[0, 0, 0, 0]);
        assert_eq!(&bytes[4..36], &[0x11; 32]);
        assert_eq!(&bytes[36..68], &[0x22; 32]);
        assert_eq!(&bytes[68..76], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(&bytes[76..84], &[0x0b, 0x0a, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[84..88], &[100, 0, 0, 0]);
        assert_eq!(bytes[88], 3);
        assert_eq!(&bytes[89..109], &[0x33; 20]);
        assert_eq!(&bytes[109..], &[1, 2, 0xaa, 0xaa, 3, 0xbb, 0xbb, 0xbb]);
    }

    #[test]
    fn state_root_layout() {
        let root = StateRoot {
            version: 0,
            index: 0x0102,
            root_hash: Uint256::from_le_bytes([0x44; 32]),
            witnesses: vec![
                Witness {
                    invocation: vec![1],
                    verification: vec![],
                },
                Witness::default(),
            ],
        };
        let bytes = root.to_canonical_bytes();

        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..5], &[0x02, 0x01, 0, 0]);
        assert_eq!(&bytes[5..37], &[0x44; 32]);
        assert_eq!(&bytes[37..], &[2, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn unwitnessed_state_root_has_zero_count() {
        let root = StateRoot {
            version: 0,
            index: 1,
            root_hash: Uint256::ZERO,
            witnesses: vec![],
        };
        assert_eq!(root.to_canonical_bytes().last(), Some(&0));
    }
}
