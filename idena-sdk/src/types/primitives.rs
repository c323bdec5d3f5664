use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Bytes;
use crate::error::DecodeError;

/// Length of an [`Address`] in bytes.
pub const ADDRESS_LEN: usize = 20;

type AddressArray = [u8; ADDRESS_LEN];

pub type Gas = u32;
pub type BlockNumber = u64;
pub type Epoch = u16;
/// Block time, unix seconds.
pub type TimeStamp = i64;

/// Account or contract address: 20 raw bytes, rendered as lowercase hex.
///
/// Host answers and storage keys carry the raw bytes. Text input is parsed with
/// [`str::parse`], with or without a `0x` prefix.
///
/// ```
/// use idena_sdk::types::Address;
///
/// let owner: Address = "0x00000000000000000000000000000000000000ff".parse().unwrap();
/// assert_eq!(owner.as_bytes()[19], 0xff);
/// assert_eq!(owner.to_hex(), "00000000000000000000000000000000000000ff");
/// assert!("0xff".parse::<Address>().is_err());
/// ```
#[derive(BorshSerialize, BorshDeserialize, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address(AddressArray);

impl Address {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Raw bytes as a [`Bytes`] buffer, e.g. to build storage keys.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_vec())
    }

    pub fn as_bytes(&self) -> &AddressArray {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

impl From<AddressArray> for Address {
    fn from(raw: AddressArray) -> Self {
        Self(raw)
    }
}

impl From<&AddressArray> for Address {
    fn from(raw: &AddressArray) -> Self {
        Self(*raw)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = DecodeError;

    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        <AddressArray>::try_from(raw)
            .map(Self)
            .map_err(|_| DecodeError::Length {
                expected: ADDRESS_LEN,
                actual: raw.len(),
            })
    }
}

impl TryFrom<Vec<u8>> for Address {
    type Error = DecodeError;

    fn try_from(raw: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(raw.as_slice())
    }
}

impl FromStr for Address {
    type Err = DecodeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let raw = hex::decode(digits).map_err(|_| DecodeError::Hex(text.to_owned()))?;
        Self::try_from(raw)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Validation state of an identity, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum IdentityState {
    Undefined,
    Invite,
    Candidate,
    Verified,
    Suspended,
    Killed,
    Zombie,
    Newbie,
    Human,
}

impl IdentityState {
    /// Returns `true` for the states that take part in validation.
    pub fn is_validated(&self) -> bool {
        matches!(
            self,
            IdentityState::Verified
                | IdentityState::Human
                | IdentityState::Newbie
                | IdentityState::Suspended
                | IdentityState::Zombie
        )
    }
}

impl TryFrom<u32> for IdentityState {
    type Error = DecodeError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Undefined,
            1 => Self::Invite,
            2 => Self::Candidate,
            3 => Self::Verified,
            4 => Self::Suspended,
            5 => Self::Killed,
            6 => Self::Zombie,
            7 => Self::Newbie,
            8 => Self::Human,
            other => return Err(DecodeError::Value(format!("unknown identity state {other}"))),
        })
    }
}

impl From<IdentityState> for u32 {
    fn from(state: IdentityState) -> u32 {
        state as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "5e1f7a9c0b3d2e4f6a8b0c1d2e3f4a5b6c7d8e9f";

    fn wallet() -> Address {
        WALLET.parse().unwrap()
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        assert_eq!(format!("0x{WALLET}").parse::<Address>(), Ok(wallet()));
        assert_eq!(wallet().to_hex(), WALLET);
        assert_eq!(wallet().to_string(), WALLET);
        assert_eq!(format!("{:?}", wallet()), format!("Address(0x{WALLET})"));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            WALLET[..38].parse::<Address>(),
            Err(DecodeError::Length {
                expected: 20,
                actual: 19
            })
        );
        assert!(format!("{WALLET}00").parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
        assert!(matches!("0xzz".parse::<Address>(), Err(DecodeError::Hex(_))));
    }

    #[test]
    fn test_from_host_bytes() {
        let raw = wallet().to_vec();
        assert_eq!(Address::try_from(raw.as_slice()), Ok(wallet()));
        assert_eq!(wallet().to_bytes().as_ref(), raw.as_slice());
        assert!(Address::try_from(raw[1..].to_vec()).is_err());
        assert!(Address::try_from(Vec::new()).is_err());
    }

    #[test]
    fn test_borsh_is_raw() {
        let encoded = wallet().try_to_vec().unwrap();

        assert_eq!(encoded, wallet().to_vec());
        assert_eq!(Address::try_from_slice(&encoded).unwrap(), wallet());
    }

    #[test]
    fn test_serde_as_hex() {
        let json = serde_json::to_string(&wallet()).unwrap();

        assert_eq!(json, format!("\"{WALLET}\""));
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), wallet());
        assert!(serde_json::from_str::<Address>("\"1122\"").is_err());
    }

    #[test]
    fn test_identity_state_codes() {
        assert_eq!(IdentityState::try_from(0), Ok(IdentityState::Undefined));
        assert_eq!(IdentityState::try_from(3), Ok(IdentityState::Verified));
        assert_eq!(IdentityState::try_from(8), Ok(IdentityState::Human));
        assert!(IdentityState::try_from(9).is_err());
        assert_eq!(u32::from(IdentityState::Newbie), 7);

        assert!(IdentityState::Human.is_validated());
        assert!(!IdentityState::Candidate.is_validated());
    }
}
