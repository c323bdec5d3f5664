use prost::Message;

use super::{balance_from_bytes, balance_to_bytes, Balance, IdentityState};
use crate::error::DecodeError;
use crate::proto::ProtoStateIdentity;

/// Identity of an address, as returned by [`crate::Host::identity`] and by
/// get-identity promises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub stake: Balance,
    /// Epoch the identity was born in.
    pub birthday: u32,
    pub state: IdentityState,
}

impl Identity {
    /// Decodes the protobuf record written by the host.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let proto = ProtoStateIdentity::decode(bytes)?;
        Ok(Self {
            stake: balance_from_bytes(&proto.stake)?,
            birthday: proto.birthday,
            state: IdentityState::try_from(proto.state)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        ProtoStateIdentity {
            stake: balance_to_bytes(&self.stake),
            birthday: self.birthday,
            state: self.state.into(),
        }
        .encode_to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_host_record() {
        // stake = 0x0100, birthday = 12, state = Human
        let bytes = [0x0a, 2, 1, 0, 0x18, 12, 0x20, 8];
        let identity = Identity::decode(&bytes).unwrap();

        assert_eq!(identity.stake, Balance::from(256u64));
        assert_eq!(identity.birthday, 12);
        assert_eq!(identity.state, IdentityState::Human);
        assert_eq!(Identity::decode(&identity.encode()), Ok(identity));
    }

    #[test]
    fn test_decode_missing_fields() {
        let identity = Identity::decode(&[]).unwrap();
        assert_eq!(identity.stake, Balance::zero());
        assert_eq!(identity.state, IdentityState::Undefined);
    }

    #[test]
    fn test_decode_rejects_bad_records() {
        // state 42 is unknown
        assert!(matches!(
            Identity::decode(&[0x20, 42]),
            Err(DecodeError::Value(_))
        ));
        // truncated stake
        assert!(matches!(
            Identity::decode(&[0x0a, 5, 1]),
            Err(DecodeError::Proto(_))
        ));
    }
}
