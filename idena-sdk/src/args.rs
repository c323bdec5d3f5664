//! Encoding of the argument blob passed to a cross-contract call.
//!
//! The first byte selects the format:
//!
//! * [`PLAIN_FORMAT`]: the rest of the blob is exactly one argument.
//! * [`STRUCTURED_FORMAT`]: the rest of the blob is a [`ProtoArgs`] message holding
//!   the ordered list of arguments.
//!
//! Caller and callee agree on the format of a method out-of-band; nothing here checks
//! the number or the types of the arguments.
use prost::Message;

use crate::error::DecodeError;
use crate::proto::ProtoArgs;
use crate::region::{self, RegionHandle};
use crate::types::{balance_from_bytes, balance_to_bytes, Address, Balance, Bytes};

pub const PLAIN_FORMAT: u8 = 0x0;
pub const STRUCTURED_FORMAT: u8 = 0x1;

/// An argument blob in one of the two formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Args {
    Plain(Vec<u8>),
    Structured(Vec<Vec<u8>>),
}

impl Args {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Args::Plain(value) => pack_plain(value),
            Args::Structured(values) => pack_structured(values),
        }
    }

    pub fn decode(blob: &[u8]) -> Result<Self, DecodeError> {
        match blob.first() {
            Some(&PLAIN_FORMAT) => Ok(Args::Plain(unpack_plain(blob)?.to_vec())),
            Some(&STRUCTURED_FORMAT) => Ok(Args::Structured(unpack_structured(blob)?)),
            Some(&other) => Err(DecodeError::UnknownFormat(other)),
            None => Err(DecodeError::EmptyArgs),
        }
    }

    /// Returns the arguments in call order.
    pub fn into_values(self) -> Vec<Vec<u8>> {
        match self {
            Args::Plain(value) => vec![value],
            Args::Structured(values) => values,
        }
    }
}

/// Packs exactly one argument.
pub fn pack_plain(value: &[u8]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(value.len() + 1);
    blob.push(PLAIN_FORMAT);
    blob.extend_from_slice(value);
    blob
}

/// Packs an ordered list of arguments.
pub fn pack_structured<A: AsRef<[u8]>>(values: &[A]) -> Vec<u8> {
    let message = ProtoArgs {
        args: values.iter().map(|value| value.as_ref().to_vec()).collect(),
    };
    let mut blob = Vec::with_capacity(message.encoded_len() + 1);
    blob.push(STRUCTURED_FORMAT);
    blob.extend(message.encode_to_vec());
    blob
}

/// Returns the single argument of a plain blob.
pub fn unpack_plain(blob: &[u8]) -> Result<&[u8], DecodeError> {
    match blob.split_first() {
        Some((&PLAIN_FORMAT, value)) => Ok(value),
        Some((&other, _)) => Err(DecodeError::UnknownFormat(other)),
        None => Err(DecodeError::EmptyArgs),
    }
}

/// Splits a structured blob into its arguments, preserving order.
pub fn unpack_structured(blob: &[u8]) -> Result<Vec<Vec<u8>>, DecodeError> {
    let payload = match blob.split_first() {
        Some((&STRUCTURED_FORMAT, payload)) => payload,
        Some((&other, _)) => return Err(DecodeError::UnknownFormat(other)),
        None => return Err(DecodeError::EmptyArgs),
    };
    Ok(ProtoArgs::decode(payload)?.args)
}

/// Returns the arguments of a blob in either format.
///
/// An empty blob is rejected with [`DecodeError::EmptyArgs`], like the host does. A
/// call without arguments still carries the format byte.
pub fn unpack(blob: &[u8]) -> Result<Vec<Vec<u8>>, DecodeError> {
    Args::decode(blob).map(Args::into_values)
}

/// A value that can be passed to, or returned from, an exported contract method.
pub trait Argument: Sized {
    fn from_arg(bytes: Vec<u8>) -> Result<Self, DecodeError>;

    fn to_arg(&self) -> Vec<u8>;
}

impl Argument for Vec<u8> {
    fn from_arg(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        Ok(bytes)
    }

    fn to_arg(&self) -> Vec<u8> {
        self.clone()
    }
}

impl Argument for Bytes {
    fn from_arg(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        Ok(Bytes::from(bytes))
    }

    fn to_arg(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl Argument for Address {
    fn from_arg(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        Address::try_from(bytes)
    }

    fn to_arg(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl Argument for u64 {
    fn from_arg(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        Bytes::from(bytes).to_u64()
    }

    fn to_arg(&self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }
}

impl Argument for String {
    fn from_arg(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)
    }

    fn to_arg(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Argument for Balance {
    fn from_arg(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        balance_from_bytes(&bytes)
    }

    fn to_arg(&self) -> Vec<u8> {
        balance_to_bytes(self)
    }
}

/// Decodes the argument the host placed in the region `raw`. The host passes the null
/// handle for a missing argument, which decodes like an empty value.
pub fn from_region<T: Argument>(raw: u32) -> Result<T, DecodeError> {
    let handle = RegionHandle::from_raw(raw);
    let bytes = if handle.is_null() {
        Vec::new()
    } else {
        region::take(handle)?
    };
    T::from_arg(bytes)
}

/// Places a return value in a region for the host and returns the raw handle.
pub fn into_region<T: Argument>(value: &T) -> u32 {
    region::store(&value.to_arg()).into_raw()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_layout() {
        assert_eq!(pack_plain(&[7, 8]), vec![0, 7, 8]);
        assert_eq!(pack_plain(&[]), vec![0]);
    }

    #[test]
    fn test_plain_round_trip() {
        for len in [0usize, 1, 8, 255, 4096] {
            let value: Vec<u8> = (0..len).map(|i| i as u8).collect();
            assert_eq!(unpack_plain(&pack_plain(&value)).unwrap(), value.as_slice());
        }
    }

    #[test]
    fn test_structured_layout() {
        let blob = pack_structured(&[vec![0xaau8], Vec::new()]);
        assert_eq!(blob, vec![1, 0x0a, 1, 0xaa, 0x0a, 0]);
    }

    #[test]
    fn test_structured_round_trip() {
        let long = vec![0x5a; 300];
        let values = vec![b"recipient".to_vec(), Vec::new(), long.clone(), vec![1]];
        let blob = pack_structured(&values);

        // 300 needs a two byte length
        assert!(blob.windows(3).any(|w| w == [0x0a, 0xac, 0x02]));
        assert_eq!(unpack_structured(&blob).unwrap(), values);
        assert_eq!(
            unpack_structured(&pack_structured::<Vec<u8>>(&[])).unwrap(),
            Vec::<Vec<u8>>::new()
        );
    }

    #[test]
    fn test_unpack_dispatch() {
        assert_eq!(unpack(&pack_plain(b"x")).unwrap(), vec![b"x".to_vec()]);
        assert_eq!(
            unpack(&pack_structured(&[b"a", b"b"])).unwrap(),
            vec![b"a".to_vec(), b"b".to_vec()]
        );
        assert_eq!(unpack(&[9, 1, 2]), Err(DecodeError::UnknownFormat(9)));
    }

    #[test]
    fn test_unpack_rejects_empty_blob() {
        assert_eq!(unpack(&[]), Err(DecodeError::EmptyArgs));
        assert_eq!(
            unpack(&pack_structured::<Vec<u8>>(&[])),
            Ok(Vec::<Vec<u8>>::new())
        );
    }

    #[test]
    fn test_args_enum() {
        let plain = Args::Plain(vec![1, 2]);
        assert_eq!(Args::decode(&plain.encode()).unwrap(), plain);

        let structured = Args::Structured(vec![vec![1], vec![2, 3]]);
        assert_eq!(Args::decode(&structured.encode()).unwrap(), structured);
        assert_eq!(Args::decode(&[]), Err(DecodeError::EmptyArgs));
    }

    #[test]
    fn test_format_mismatch() {
        assert_eq!(
            unpack_plain(&pack_structured(&[b"a"])),
            Err(DecodeError::UnknownFormat(STRUCTURED_FORMAT))
        );
        assert_eq!(
            unpack_structured(&pack_plain(b"a")),
            Err(DecodeError::UnknownFormat(PLAIN_FORMAT))
        );
    }

    #[test]
    fn test_malformed_structured() {
        // length runs past the end
        assert!(matches!(
            unpack_structured(&[1, 0x0a, 5, 1, 2]),
            Err(DecodeError::Proto(_))
        ));
        // unterminated length
        assert!(matches!(
            unpack_structured(&[1, 0x0a, 0x80]),
            Err(DecodeError::Proto(_))
        ));
        // fields other than `args` are skipped
        assert_eq!(
            unpack_structured(&[1, 0x12, 0, 0x0a, 1, 7]),
            Ok(vec![vec![7]])
        );
    }

    #[test]
    fn test_argument_impls() {
        assert_eq!(u64::from_arg(42u64.to_arg()), Ok(42));
        assert!(u64::from_arg(vec![1, 2]).is_err());

        let address = Address::from([9; 20]);
        assert_eq!(Address::from_arg(address.to_arg()), Ok(address));
        assert!(Address::from_arg(vec![9; 19]).is_err());

        assert_eq!(String::from_arg(b"inc".to_vec()), Ok("inc".to_string()));
        assert_eq!(String::from_arg(vec![0xff]), Err(DecodeError::Utf8));

        let amount = Balance::from(1_000_000u64);
        assert_eq!(Balance::from_arg(amount.to_arg()), Ok(amount));
    }

    #[test]
    fn test_region_arguments() {
        let raw = region::store(&5u64.to_arg()).into_raw();
        assert_eq!(from_region::<u64>(raw), Ok(5));
        // consumed
        assert!(from_region::<u64>(raw).is_err());

        assert_eq!(from_region::<Vec<u8>>(0), Ok(Vec::new()));
        assert!(from_region::<u64>(0).is_err());

        let raw = into_region(&Bytes::from("out"));
        assert_eq!(region::take(RegionHandle::from_raw(raw)).unwrap(), b"out".to_vec());
    }
}
