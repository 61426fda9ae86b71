/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Content-addressed identity.
//!
//! A [`Fingerprint`] is the SHA-256 digest of a field's raw cell bytes
//! (little-endian `f64`, row-major), rendered as 64 lowercase hex characters.
//! Bit-identical fields always share a fingerprint.

use sha2::{Digest, Sha256};

use crate::error::{EsqetError, EsqetResult};
use crate::field::Field;

/// Length of the hex rendering.
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// 256-bit content fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint of a field's cell bytes.
    pub fn of_field(field: &Field) -> Self {
        let mut hasher = Sha256::new();
        for v in field.cells() {
            hasher.update(v.to_le_bytes());
        }
        Self(hasher.finalize().into())
    }

    /// Fingerprint of arbitrary bytes, e.g. the source image file.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> EsqetResult<Self> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out)
            .map_err(|e| EsqetError::Config(format!("invalid fingerprint {s:?}: {e}")))?;
        Ok(Self(out))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl core::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl core::str::FromStr for Fingerprint {
    type Err = EsqetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Fingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Fingerprint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_half_field_reference_digest() {
        let fp = Fingerprint::of_field(&Field::filled(32, 0.5));
        assert_eq!(
            fp.to_hex(),
            "724fd82b6293eee1b3a9441e439d026eeaca604d100d40bc2dff869f2f7a2895"
        );
    }

    #[test]
    fn test_field_digest_equals_byte_digest() {
        let field = Field::from_fn(8, |r, c| (r * 8 + c) as f64 / 64.0);
        assert_eq!(
            Fingerprint::of_field(&field),
            Fingerprint::of_bytes(&field.to_le_bytes())
        );
    }

    #[test]
    fn test_identical_fields_share_fingerprint() {
        let a = Field::from_fn(32, |r, c| ((r ^ c) % 7) as f64 / 7.0);
        let b = a.clone();
        assert_eq!(Fingerprint::of_field(&a), Fingerprint::of_field(&b));
    }

    #[test]
    fn test_one_bit_flip_changes_fingerprint() {
        let a = Field::filled(32, 0.5);
        let mut cells = a.cells().to_vec();
        cells[500] = f64::from_bits(cells[500].to_bits() ^ 1);
        let b = Field::new(32, cells).unwrap();
        assert_ne!(Fingerprint::of_field(&a), Fingerprint::of_field(&b));
    }

    #[test]
    fn test_hex_shape_and_round_trip() {
        let fp = Fingerprint::of_bytes(b"abc");
        let hex = fp.to_string();
        assert_eq!(hex.len(), FINGERPRINT_HEX_LEN);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(
            hex,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hex.parse::<Fingerprint>().unwrap(), fp);
    }

    #[test]
    fn test_bad_hex_rejected() {
        assert!(Fingerprint::from_hex("xyz").is_err());
        assert!(Fingerprint::from_hex(&"a".repeat(63)).is_err());
    }
}
