//! Typed views over the contract storage.
//!
//! Values are encoded with borsh: a `u64` takes 8 little-endian bytes and an
//! [`crate::types::Address`] its raw 20 bytes.
mod key_value;
mod persistent_map;

pub use self::key_value::KeyValue;
pub use self::persistent_map::{PersistentMap, ToKey};
