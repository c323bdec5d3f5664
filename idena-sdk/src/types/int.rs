use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uint::construct_uint;

use crate::error::DecodeError;

construct_uint! {
    /// 256-bit unsigned integer. JSON carries it as a decimal string, borsh as 4 LE words.
    #[derive(BorshDeserialize, BorshSerialize)]
    pub struct U256(4);
}

/// Amount of coins, e.g. a deposit attached to a promise or an account balance.
///
/// The host moves amounts as big-endian integers of at most 32 bytes.
pub type Balance = U256;

/// Largest encoded amount accepted by the host.
pub const MAX_BALANCE_BYTES: usize = 32;

/// Encodes `value` as a minimal big-endian integer. Zero is encoded as an empty buffer.
pub fn balance_to_bytes(value: &Balance) -> Vec<u8> {
    let mut raw = [0u8; MAX_BALANCE_BYTES];
    value.to_big_endian(&mut raw);
    let first = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
    raw[first..].to_vec()
}

/// Decodes a big-endian integer written by the host.
pub fn balance_from_bytes(bytes: &[u8]) -> Result<Balance, DecodeError> {
    if bytes.len() > MAX_BALANCE_BYTES {
        return Err(DecodeError::TooLarge(bytes.len()));
    }
    Ok(Balance::from_big_endian(bytes))
}

impl Serialize for U256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let digits = <String as Deserialize>::deserialize(deserializer)?;
        Self::from_dec_str(&digits).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_as_decimal_string() {
        let amounts = [
            U256::zero(),
            U256::from(7777777u64),
            U256::from(10u128.pow(18)),
            U256::from(u128::MAX),
            U256::max_value(),
        ];
        for amount in amounts {
            let json = serde_json::to_string(&amount).unwrap();
            assert_eq!(json, format!("\"{amount}\""));
            assert_eq!(serde_json::from_str::<U256>(&json).unwrap(), amount);
        }
        assert!(serde_json::from_str::<U256>("\"0x10\"").is_err());
        assert!(serde_json::from_str::<U256>("12").is_err());
    }

    #[test]
    fn test_balance_bytes() {
        assert_eq!(balance_to_bytes(&Balance::zero()), Vec::<u8>::new());
        assert_eq!(balance_to_bytes(&Balance::from(1u64)), vec![1]);
        assert_eq!(balance_to_bytes(&Balance::from(0x0100u64)), vec![1, 0]);
        assert_eq!(balance_to_bytes(&Balance::max_value()), vec![0xff; 32]);

        let one_idna = Balance::from(10u128.pow(18));
        assert_eq!(
            balance_from_bytes(&balance_to_bytes(&one_idna)),
            Ok(one_idna)
        );
        assert_eq!(balance_from_bytes(&[]), Ok(Balance::zero()));
        assert_eq!(balance_from_bytes(&[0, 0, 5]), Ok(Balance::from(5u64)));
    }

    #[test]
    fn test_balance_too_large() {
        assert_eq!(
            balance_from_bytes(&[1; 33]),
            Err(DecodeError::TooLarge(33))
        );
    }
}
