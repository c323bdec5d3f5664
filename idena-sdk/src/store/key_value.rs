//! A single named value in the contract storage.
use borsh::{BorshDeserialize, BorshSerialize};
use std::marker::PhantomData;

use super::persistent_map::{decode, encode};
use crate::env::Storage;
use crate::error::DecodeError;

/// A storage cell under a fixed key, typically contract configuration written once by
/// `deploy`.
pub struct KeyValue<V> {
    key: Box<[u8]>,
    _marker: PhantomData<fn() -> V>,
}

impl<V> KeyValue<V>
where
    V: BorshSerialize + BorshDeserialize,
{
    pub fn new(key: &[u8]) -> Self {
        Self {
            key: key.into(),
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn get<S: Storage + ?Sized>(&self, storage: &S) -> Result<Option<V>, DecodeError> {
        storage
            .storage_read(&self.key)
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Returns the stored value, or `default` if the cell is empty.
    pub fn get_or<S: Storage + ?Sized>(&self, storage: &S, default: V) -> Result<V, DecodeError> {
        Ok(self.get(storage)?.unwrap_or(default))
    }

    pub fn set<S: Storage + ?Sized>(&self, storage: &mut S, value: &V) {
        storage.storage_write(&self.key, &encode(value));
    }

    pub fn remove<S: Storage + ?Sized>(&self, storage: &mut S) {
        storage.storage_remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockHost;
    use crate::types::Address;

    #[test]
    fn test_cell() {
        let mut host = MockHost::new();
        let owner: KeyValue<Address> = KeyValue::new(b"o");
        let alice = Address::from([0xa1; 20]);

        assert_eq!(owner.get(&host), Ok(None));
        assert_eq!(owner.get_or(&host, Address::from([0; 20])), Ok(Address::from([0; 20])));

        owner.set(&mut host, &alice);
        assert_eq!(owner.get(&host), Ok(Some(alice)));
        assert_eq!(host.storage_read(b"o"), Some(alice.to_vec()));

        owner.remove(&mut host);
        assert_eq!(owner.get(&host), Ok(None));
    }

    #[test]
    fn test_wrong_length() {
        let mut host = MockHost::new();
        let tokens: KeyValue<u64> = KeyValue::new(b"tokens");
        host.storage_write(b"tokens", &[1; 9]);

        assert!(tokens.get(&host).is_err());
    }
}
