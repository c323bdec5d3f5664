//! The host environment a contract runs against.
//!
//! [`Host`] lists every primitive the VM exposes. On `wasm32` it is implemented by
//! [`Runtime`], which talks to the VM through `idena-sys`; natively tests use
//! [`MockHost`].
use crate::promise::PromiseIndex;
use crate::types::{Address, Balance, BlockNumber, Epoch, Gas, IdentityState, TimeStamp};

#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(target_arch = "wasm32")]
mod runtime;

#[cfg(any(test, feature = "mock"))]
pub use mock::{ContinuationRun, Event, MockHost, ScheduledPromise};
#[cfg(target_arch = "wasm32")]
pub use runtime::Runtime;

/// The global sorted key-value store of the contract.
pub trait Storage {
    /// Returns `None` if the key is not present.
    fn storage_read(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn storage_write(&mut self, key: &[u8], value: &[u8]);

    fn storage_remove(&mut self, key: &[u8]);
}

/// Primitives provided by the VM to the running contract.
pub trait Host: Storage {
    /// Writes a message to the debug channel.
    fn print(&mut self, message: &str);

    /// Aborts the transaction. Every storage change made so far is rolled back.
    fn panic(&mut self, message: &str) -> !;

    /// Adds an event to the transaction receipt. `args` is an argument blob.
    fn emit_event(&mut self, name: &str, args: &[u8]);

    fn block_timestamp(&self) -> TimeStamp;

    fn block_number(&self) -> BlockNumber;

    fn block_seed(&self) -> Vec<u8>;

    fn min_fee_per_gas(&self) -> Balance;

    fn network_size(&self) -> u64;

    fn epoch(&self) -> Epoch;

    /// Coins attached to the current call.
    fn pay_amount(&self) -> Balance;

    /// The account or contract that invoked the current method.
    fn caller(&self) -> Address;

    /// The signer of the transaction.
    fn original_caller(&self) -> Address;

    /// Address of the running contract.
    fn contract(&self) -> Address;

    /// Address of the running contract, read through `own_addr`, which newer hosts
    /// export in place of `contract`.
    fn own_address(&self) -> Address;

    fn balance(&self, address: &Address) -> Balance;

    /// Protobuf encoded identity, `None` if the address has none.
    fn identity(&self, address: &Address) -> Option<Vec<u8>>;

    fn identity_state(&self, address: &Address) -> IdentityState;

    /// Hash of the code of the running contract.
    fn code_hash(&self) -> Vec<u8>;

    /// Code of the running contract.
    fn code(&self) -> Vec<u8>;

    /// Address a contract with `code` gets when it is deployed with `args` and `nonce`.
    fn contract_address(&self, code: &[u8], args: &[u8], nonce: &[u8]) -> Address;

    /// Address a contract with `code_hash` gets when it is deployed with `args` and `nonce`.
    fn contract_address_by_hash(&self, code_hash: &[u8], args: &[u8], nonce: &[u8]) -> Address;

    fn create_call_function_promise(
        &mut self,
        contract: &Address,
        method: &str,
        args: &[u8],
        deposit: &Balance,
        gas_limit: Gas,
    ) -> PromiseIndex;

    fn create_deploy_contract_promise(
        &mut self,
        code: &[u8],
        args: &[u8],
        nonce: &[u8],
        deposit: &Balance,
        gas_limit: Gas,
    ) -> PromiseIndex;

    fn create_transfer_promise(&mut self, to: &Address, amount: &Balance);

    /// Settles with the value stored under `key` by `contract`.
    fn create_read_contract_data_promise(
        &mut self,
        contract: &Address,
        key: &[u8],
        gas_limit: Gas,
    ) -> PromiseIndex;

    /// Settles with the protobuf encoded identity of `address`.
    fn create_get_identity_promise(&mut self, address: &Address, gas_limit: Gas) -> PromiseIndex;

    fn promise_then(
        &mut self,
        promise: PromiseIndex,
        method: &str,
        args: &[u8],
        deposit: &Balance,
        gas_limit: Gas,
    );

    /// Settlement of the promise the current continuation is chained to. Outside of a
    /// continuation the host reports [`crate::promise::PromiseResult::Empty`].
    fn promise_result(&mut self) -> crate::promise::PromiseResult;
}
