//! Basic types

mod bytes;
mod identity;
mod int;
mod primitives;
pub use bytes::Bytes;
pub use identity::Identity;
pub use int::{balance_from_bytes, balance_to_bytes, Balance, MAX_BALANCE_BYTES, U256};
pub use primitives::{
    Address, BlockNumber, Epoch, Gas, IdentityState, TimeStamp, ADDRESS_LEN,
};
