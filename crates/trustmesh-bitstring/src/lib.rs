//! # TrustMesh Bitstring
//!
//! The encoded bitstring at the heart of a Status List 2021 credential: a
//! bit per tracked credential, packed least-significant-bit first, gzipped,
//! and base64url-encoded without padding. A `0` bit means "not flagged"
//! for whichever purpose (revocation, suspension) the list was minted for.

use base64ct::Encoding as _;
use bitvec::order::Lsb0;
use bitvec::vec::BitVec;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read as _, Write as _};
use trustmesh_core::{Error, Result};

/// The minimum bitstring length required by the Status List 2021
/// specification, chosen so that individual credentials cannot be
/// correlated by the size of the list they appear in.
pub const MIN_LENGTH_BITS: usize = 131_072;

/// A Status List 2021 bitstring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitstring {
    bits: BitVec<u8, Lsb0>,
}

impl Bitstring {
    /// Creates a new all-zero bitstring with at least `MIN_LENGTH_BITS`
    /// bits, rounded up to `len` if `len` is larger.
    #[must_use]
    pub fn new(len: usize) -> Self {
        let len = len.max(MIN_LENGTH_BITS);
        Self { bits: BitVec::repeat(false, len) }
    }

    /// Number of bits in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns `true` if the list has zero bits (never true for a list
    /// built via [`Self::new`]).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Reads the bit at `index`.
    pub fn get(&self, index: usize) -> Result<bool> {
        self.bits.get(index).map(|b| *b).ok_or(Error::IndexOutOfRange(index))
    }

    /// Sets the bit at `index`.
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        if index >= self.bits.len() {
            return Err(Error::IndexOutOfRange(index));
        }
        self.bits.set(index, value);
        Ok(())
    }

    /// The first unset (available) index, if the list has capacity left.
    #[must_use]
    pub fn first_unset(&self) -> Option<usize> {
        self.bits.iter().position(|b| !*b)
    }

    /// Encodes the list as gzip + base64url-nopad, the wire format used
    /// inside a `StatusList2021Credential`'s `encodedList` field.
    #[must_use]
    pub fn encode(&self) -> String {
        let raw = self.bits.clone().into_vec();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).expect("writing to an in-memory buffer cannot fail");
        let gzipped = encoder.finish().expect("finishing an in-memory gzip stream cannot fail");
        base64ct::Base64UrlUnpadded::encode_string(&gzipped)
    }

    /// Decodes a list previously produced by [`Self::encode`].
    pub fn decode(encoded: &str) -> Result<Self> {
        let gzipped = base64ct::Base64UrlUnpadded::decode_vec(encoded)
            .map_err(|e| Error::InvalidStatusList(format!("invalid base64url: {e}")))?;
        let mut raw = Vec::new();
        GzDecoder::new(gzipped.as_slice())
            .read_to_end(&mut raw)
            .map_err(|e| Error::InvalidStatusList(format!("invalid gzip stream: {e}")))?;
        let bits = BitVec::<u8, Lsb0>::from_vec(raw);
        if bits.len() < MIN_LENGTH_BITS {
            return Err(Error::InvalidStatusList(format!(
                "decoded list has {} bits, minimum is {MIN_LENGTH_BITS}",
                bits.len()
            )));
        }
        Ok(Self { bits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_list_is_all_zero() {
        let list = Bitstring::new(MIN_LENGTH_BITS);
        assert!(!list.get(0).unwrap());
        assert!(!list.get(MIN_LENGTH_BITS - 1).unwrap());
    }

    #[test]
    fn set_then_roundtrip_through_wire_format() {
        let mut list = Bitstring::new(MIN_LENGTH_BITS);
        list.set(42, true).unwrap();
        let encoded = list.encode();
        let decoded = Bitstring::decode(&encoded).unwrap();
        assert!(decoded.get(42).unwrap());
        assert!(!decoded.get(41).unwrap());
        assert_eq!(decoded, list);
    }

    #[test]
    fn out_of_range_index_rejected() {
        let list = Bitstring::new(MIN_LENGTH_BITS);
        assert!(list.get(MIN_LENGTH_BITS).is_err());
    }

    #[test]
    fn first_unset_finds_gap() {
        let mut list = Bitstring::new(MIN_LENGTH_BITS);
        for i in 0..10 {
            list.set(i, true).unwrap();
        }
        assert_eq!(list.first_unset(), Some(10));
    }

    #[test]
    fn rejects_undersized_decoded_list() {
        let short = BitVec::<u8, Lsb0>::repeat(false, 8);
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&short.into_vec()).unwrap();
        let gzipped = encoder.finish().unwrap();
        let encoded = base64ct::Base64UrlUnpadded::encode_string(&gzipped);
        assert!(Bitstring::decode(&encoded).is_err());
    }
}
