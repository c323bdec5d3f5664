//! A map that stores every entry directly in the contract storage.
use borsh::{BorshDeserialize, BorshSerialize};
use std::marker::PhantomData;

use crate::env::Storage;
use crate::error::DecodeError;
use crate::types::{Address, Bytes};

/// Raw encoding of a map key. The encoded key is appended to the map prefix as is.
pub trait ToKey {
    fn to_key(&self) -> Vec<u8>;
}

impl ToKey for Address {
    fn to_key(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl ToKey for str {
    fn to_key(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl ToKey for String {
    fn to_key(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl ToKey for [u8] {
    fn to_key(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl ToKey for Vec<u8> {
    fn to_key(&self) -> Vec<u8> {
        self.clone()
    }
}

impl ToKey for Bytes {
    fn to_key(&self) -> Vec<u8> {
        self.to_vec()
    }
}

macro_rules! impl_to_key_for_int {
    ($($ty:ty),*) => {
        $(
            impl ToKey for $ty {
                fn to_key(&self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }
            }
        )*
    };
}

impl_to_key_for_int!(u8, u16, u32, u64, u128);

const ERR_ELEMENT_SERIALIZATION: &str = "Cannot serialize element";

/// A map whose entries live under `prefix ++ key` in the contract storage.
///
/// Nothing is cached: every `set` and `delete` goes to the host at once, so a later
/// invocation, a continuation for instance, sees exactly what was written. Two maps with
/// distinct prefixes, neither a prefix of the other, never share an entry.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
///
/// use idena_sdk::env::Storage;
/// use idena_sdk::store::PersistentMap;
/// use idena_sdk::types::Address;
///
/// #[derive(Default)]
/// struct Memory(BTreeMap<Vec<u8>, Vec<u8>>);
///
/// impl Storage for Memory {
///     fn storage_read(&self, key: &[u8]) -> Option<Vec<u8>> {
///         self.0.get(key).cloned()
///     }
///     fn storage_write(&mut self, key: &[u8], value: &[u8]) {
///         self.0.insert(key.to_vec(), value.to_vec());
///     }
///     fn storage_remove(&mut self, key: &[u8]) {
///         self.0.remove(key);
///     }
/// }
///
/// let balances: PersistentMap<Address, u64> = PersistentMap::new(b"b:");
/// let mut storage = Memory::default();
/// let alice = Address::from([0xa1; 20]);
///
/// assert_eq!(balances.get(&storage, &alice, 0), Ok(0));
/// balances.set(&mut storage, &alice, &100);
/// assert_eq!(balances.get(&storage, &alice, 0), Ok(100));
/// ```
pub struct PersistentMap<K: ?Sized, V> {
    prefix: Box<[u8]>,
    _marker: PhantomData<fn(&K) -> V>,
}

impl<K, V> PersistentMap<K, V>
where
    K: ToKey + ?Sized,
    V: BorshSerialize + BorshDeserialize,
{
    /// Creates a new map. Uses `prefix` as a unique prefix for keys.
    pub fn new(prefix: &[u8]) -> Self {
        Self {
            prefix: prefix.into(),
            _marker: PhantomData,
        }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Storage key of the entry for `key`.
    pub fn storage_key(&self, key: &K) -> Vec<u8> {
        let encoded = key.to_key();
        let mut out = Vec::with_capacity(self.prefix.len() + encoded.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(&encoded);
        out
    }

    /// Returns the value stored for `key`, or `default` if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Value`] if the stored bytes are not a valid `V`.
    pub fn get<S: Storage + ?Sized>(
        &self,
        storage: &S,
        key: &K,
        default: V,
    ) -> Result<V, DecodeError> {
        Ok(self.get_opt(storage, key)?.unwrap_or(default))
    }

    /// Returns the value stored for `key`, if any.
    pub fn get_opt<S: Storage + ?Sized>(
        &self,
        storage: &S,
        key: &K,
    ) -> Result<Option<V>, DecodeError> {
        storage
            .storage_read(&self.storage_key(key))
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    pub fn contains_key<S: Storage + ?Sized>(&self, storage: &S, key: &K) -> bool {
        storage.storage_read(&self.storage_key(key)).is_some()
    }

    pub fn set<S: Storage + ?Sized>(&self, storage: &mut S, key: &K, value: &V) {
        storage.storage_write(&self.storage_key(key), &encode(value));
    }

    /// Removes the entry for `key`. Removing a missing entry does nothing.
    pub fn delete<S: Storage + ?Sized>(&self, storage: &mut S, key: &K) {
        storage.storage_remove(&self.storage_key(key));
    }
}

pub(crate) fn encode<V: BorshSerialize>(value: &V) -> Vec<u8> {
    value
        .try_to_vec()
        .unwrap_or_else(|_| crate::panic(ERR_ELEMENT_SERIALIZATION))
}

pub(crate) fn decode<V: BorshDeserialize>(bytes: &[u8]) -> Result<V, DecodeError> {
    V::try_from_slice(bytes).map_err(|err| DecodeError::Value(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockHost;

    #[test]
    fn test_key_layout() {
        let map: PersistentMap<str, u64> = PersistentMap::new(b"b:");
        assert_eq!(map.prefix(), b"b:");
        assert_eq!(map.storage_key("alice"), b"b:alice".to_vec());

        let by_address: PersistentMap<Address, u64> = PersistentMap::new(b"a");
        let key = by_address.storage_key(&Address::from([7; 20]));
        assert_eq!(key.len(), 21);
        assert_eq!(key[0], b'a');

        let by_number: PersistentMap<u32, u64> = PersistentMap::new(b"n");
        assert_eq!(by_number.storage_key(&1), vec![b'n', 1, 0, 0, 0]);
    }

    #[test]
    fn test_set_get_delete() {
        let mut host = MockHost::new();
        let map: PersistentMap<str, u64> = PersistentMap::new(b"b:");

        assert_eq!(map.get(&host, "alice", 5), Ok(5));
        assert_eq!(map.get_opt(&host, "alice"), Ok(None));
        assert!(!map.contains_key(&host, "alice"));

        map.set(&mut host, "alice", &7777777);
        assert_eq!(map.get(&host, "alice", 0), Ok(7777777));
        assert!(map.contains_key(&host, "alice"));
        // u64 values are stored as 8 little-endian bytes
        assert_eq!(
            host.storage_read(b"b:alice"),
            Some(7777777u64.to_le_bytes().to_vec())
        );

        map.delete(&mut host, "alice");
        assert_eq!(map.get(&host, "alice", 0), Ok(0));
        map.delete(&mut host, "alice");
    }

    #[test]
    fn test_namespace_isolation() {
        let mut host = MockHost::new();
        let balances: PersistentMap<str, u64> = PersistentMap::new(b"b:");
        let approvals: PersistentMap<str, u64> = PersistentMap::new(b"a:");

        balances.set(&mut host, "k", &1);
        approvals.set(&mut host, "k", &2);

        assert_eq!(balances.get(&host, "k", 0), Ok(1));
        assert_eq!(approvals.get(&host, "k", 0), Ok(2));

        approvals.delete(&mut host, "k");
        assert_eq!(balances.get(&host, "k", 0), Ok(1));
    }

    #[test]
    fn test_undecodable_value() {
        let mut host = MockHost::new();
        let map: PersistentMap<str, u64> = PersistentMap::new(b"b:");
        host.storage_write(b"b:alice", &[1, 2, 3]);

        assert!(matches!(
            map.get(&host, "alice", 0),
            Err(DecodeError::Value(_))
        ));
    }

    #[test]
    fn test_address_values() {
        let mut host = MockHost::new();
        let owners: PersistentMap<u64, Address> = PersistentMap::new(b"o:");
        let owner = Address::from([0xa1; 20]);

        owners.set(&mut host, &1, &owner);
        assert_eq!(owners.get_opt(&host, &1), Ok(Some(owner)));
        // addresses are stored as their raw 20 bytes
        assert_eq!(host.storage_read(&owners.storage_key(&1)), Some(vec![0xa1; 20]));
    }
}
