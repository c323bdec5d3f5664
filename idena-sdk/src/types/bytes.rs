use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

use crate::error::DecodeError;

/// A raw byte value with a few views used for keys, addresses and encoded values.
///
/// # Examples
/// ```
/// use idena_sdk::types::Bytes;
///
/// let value = Bytes::from_u64(1);
/// assert_eq!(value.to_hex(), "0100000000000000");
/// assert_eq!(value.to_u64(), Ok(1));
///
/// let key = Bytes::from("alice").prepend(b"b:");
/// assert_eq!(key.as_ref(), b"b:alice");
/// ```
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Renders every byte as two lowercase hex digits, without separators.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Same as [`Self::to_hex`] with a `0x` prefix.
    pub fn to_hex_prefixed(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    /// Interprets the buffer as a little-endian `u64`.
    ///
    /// # Errors
    ///
    /// The buffer must be exactly 8 bytes long.
    pub fn to_u64(&self) -> Result<u64, DecodeError> {
        let raw: [u8; 8] = self.0.as_slice().try_into().map_err(|_| DecodeError::Length {
            expected: 8,
            actual: self.0.len(),
        })?;
        Ok(u64::from_le_bytes(raw))
    }

    /// Encodes `value` as 8 little-endian bytes.
    pub fn from_u64(value: u64) -> Self {
        Self(value.to_le_bytes().to_vec())
    }

    /// Returns a new buffer holding `prefix` followed by `self`.
    pub fn prepend(&self, prefix: &[u8]) -> Self {
        let mut out = Vec::with_capacity(prefix.len() + self.0.len());
        out.extend_from_slice(prefix);
        out.extend_from_slice(&self.0);
        Self(out)
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Bytes {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl From<&str> for Bytes {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(value: Bytes) -> Self {
        value.0
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({})", self.to_hex_prefixed())
    }
}

impl Serialize for Bytes {
    fn serialize<S>(&self, serializer: S) -> Result<<S as Serializer>::Ok, <S as Serializer>::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex_prefixed())
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as Deserializer<'de>>::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s)
            .map(Self)
            .map_err(|err| serde::de::Error::custom(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex() {
        let bytes = Bytes::from(vec![0x00, 0x0f, 0xa0, 0xff]);
        assert_eq!(bytes.to_hex(), "000fa0ff");
        assert_eq!(bytes.to_hex_prefixed(), "0x000fa0ff");
        assert_eq!(Bytes::new().to_hex(), "");
    }

    #[test]
    fn test_u64() {
        for value in [0, 1, 7777777, u64::MAX] {
            let bytes = Bytes::from_u64(value);
            assert_eq!(bytes.len(), 8);
            assert_eq!(bytes.to_u64(), Ok(value));
        }
        assert_eq!(Bytes::from_u64(0x0102).as_ref(), &[2, 1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_to_u64_wrong_length() {
        assert_eq!(
            Bytes::from(vec![1, 2, 3]).to_u64(),
            Err(DecodeError::Length {
                expected: 8,
                actual: 3
            })
        );
        assert!(Bytes::from(vec![0; 9]).to_u64().is_err());
        assert!(Bytes::new().to_u64().is_err());
    }

    #[test]
    fn test_prepend() {
        let key = Bytes::from(vec![3, 4]);
        assert_eq!(key.prepend(&[1, 2]).as_ref(), &[1, 2, 3, 4]);
        assert_eq!(key.prepend(&[]).as_ref(), &[3, 4]);
        assert_eq!(Bytes::new().prepend(b"a:").as_ref(), b"a:");
        // the source buffer is left untouched
        assert_eq!(key.as_ref(), &[3, 4]);
    }

    #[test]
    fn test_serde() {
        let bytes = Bytes::from(vec![0xde, 0xad]);
        let json = serde_json::to_string(&bytes).unwrap();
        assert_eq!(json, "\"0xdead\"");
        assert_eq!(serde_json::from_str::<Bytes>(&json).unwrap(), bytes);
        assert_eq!(serde_json::from_str::<Bytes>("\"dead\"").unwrap(), bytes);
    }
}
