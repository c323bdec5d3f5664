use idena_sys as sys;

use super::{Host, Storage};
use crate::promise::{PromiseIndex, PromiseResult, MAX_PROMISE_RESULT_SIZE};
use crate::region::{self, RegionHandle};
use crate::types::{
    balance_from_bytes, balance_to_bytes, Address, Balance, BlockNumber, Epoch, Gas,
    IdentityState, TimeStamp,
};

/// The host of a contract running inside the VM.
#[derive(Debug, Default, Clone, Copy)]
pub struct Runtime;

/// Region handed to the host for the duration of a single call.
struct Outgoing(RegionHandle);

impl Outgoing {
    fn new(data: &[u8]) -> Self {
        Self(region::store(data))
    }

    /// Empty values are passed as the null handle.
    fn optional(data: &[u8]) -> Self {
        if data.is_empty() {
            Self(RegionHandle::NULL)
        } else {
            Self::new(data)
        }
    }

    fn raw(&self) -> u32 {
        self.0.into_raw()
    }
}

impl Drop for Outgoing {
    fn drop(&mut self) {
        if !self.0.is_null() {
            region::release(self.0);
        }
    }
}

fn deposit(amount: &Balance) -> Outgoing {
    Outgoing::optional(&balance_to_bytes(amount))
}

/// Reads a region allocated through the `allocate` export and filled by the host.
fn incoming(raw: u32) -> Option<Vec<u8>> {
    let handle = RegionHandle::from_raw(raw);
    if handle.is_null() {
        return None;
    }
    Some(region::take(handle).unwrap_or_else(|_| crate::abort()))
}

fn expect_incoming(raw: u32) -> Vec<u8> {
    incoming(raw).unwrap_or_else(|| crate::abort())
}

fn expect_address(raw: u32) -> Address {
    Address::try_from(expect_incoming(raw)).unwrap_or_else(|_| crate::abort())
}

fn expect_balance(raw: u32) -> Balance {
    match incoming(raw) {
        Some(bytes) => balance_from_bytes(&bytes).unwrap_or_else(|_| crate::abort()),
        None => Balance::zero(),
    }
}

impl Storage for Runtime {
    fn storage_read(&self, key: &[u8]) -> Option<Vec<u8>> {
        let key = Outgoing::new(key);
        incoming(unsafe { sys::get_storage(key.raw()) })
    }

    fn storage_write(&mut self, key: &[u8], value: &[u8]) {
        let key = Outgoing::new(key);
        let value = Outgoing::new(value);
        unsafe { sys::set_storage(key.raw(), value.raw()) }
    }

    fn storage_remove(&mut self, key: &[u8]) {
        let key = Outgoing::new(key);
        unsafe { sys::remove_storage(key.raw()) }
    }
}

impl Host for Runtime {
    // `debug` is only linked by debug hosts.
    #[cfg(feature = "debug")]
    fn print(&mut self, message: &str) {
        let message = Outgoing::new(message.as_bytes());
        unsafe { sys::debug(message.raw()) }
    }

    #[cfg(not(feature = "debug"))]
    fn print(&mut self, _message: &str) {}

    fn panic(&mut self, message: &str) -> ! {
        let message = Outgoing::new(message.as_bytes());
        unsafe { sys::panic(message.raw()) }
    }

    fn emit_event(&mut self, name: &str, args: &[u8]) {
        let name = Outgoing::new(name.as_bytes());
        let args = Outgoing::optional(args);
        unsafe { sys::emit_event(name.raw(), args.raw()) }
    }

    fn block_timestamp(&self) -> TimeStamp {
        unsafe { sys::block_timestamp() }
    }

    fn block_number(&self) -> BlockNumber {
        unsafe { sys::block_number() }
    }

    fn block_seed(&self) -> Vec<u8> {
        expect_incoming(unsafe { sys::block_seed() })
    }

    fn min_fee_per_gas(&self) -> Balance {
        expect_balance(unsafe { sys::min_fee_per_gas() })
    }

    fn network_size(&self) -> u64 {
        unsafe { sys::network_size() }
    }

    fn epoch(&self) -> Epoch {
        Epoch::try_from(unsafe { sys::epoch() }).unwrap_or_else(|_| crate::abort())
    }

    fn pay_amount(&self) -> Balance {
        expect_balance(unsafe { sys::pay_amount() })
    }

    fn caller(&self) -> Address {
        expect_address(unsafe { sys::caller() })
    }

    fn original_caller(&self) -> Address {
        expect_address(unsafe { sys::original_caller() })
    }

    fn contract(&self) -> Address {
        expect_address(unsafe { sys::contract() })
    }

    fn own_address(&self) -> Address {
        expect_address(unsafe { sys::own_addr() })
    }

    fn balance(&self, address: &Address) -> Balance {
        let address = Outgoing::new(address.as_bytes());
        expect_balance(unsafe { sys::balance(address.raw()) })
    }

    fn identity(&self, address: &Address) -> Option<Vec<u8>> {
        let address = Outgoing::new(address.as_bytes());
        incoming(unsafe { sys::identity(address.raw()) })
    }

    fn identity_state(&self, address: &Address) -> IdentityState {
        let address = Outgoing::new(address.as_bytes());
        IdentityState::try_from(unsafe { sys::identity_state(address.raw()) })
            .unwrap_or_else(|_| crate::abort())
    }

    fn code_hash(&self) -> Vec<u8> {
        expect_incoming(unsafe { sys::code_hash() })
    }

    fn code(&self) -> Vec<u8> {
        expect_incoming(unsafe { sys::code() })
    }

    fn contract_address(&self, code: &[u8], args: &[u8], nonce: &[u8]) -> Address {
        let code = Outgoing::new(code);
        let args = Outgoing::optional(args);
        let nonce = Outgoing::optional(nonce);
        expect_address(unsafe { sys::contract_address(code.raw(), args.raw(), nonce.raw()) })
    }

    fn contract_address_by_hash(&self, code_hash: &[u8], args: &[u8], nonce: &[u8]) -> Address {
        let code_hash = Outgoing::new(code_hash);
        let args = Outgoing::new(args);
        let nonce = Outgoing::optional(nonce);
        expect_address(unsafe {
            sys::contract_address_by_hash(code_hash.raw(), args.raw(), nonce.raw())
        })
    }

    fn create_call_function_promise(
        &mut self,
        contract: &Address,
        method: &str,
        args: &[u8],
        deposit_amount: &Balance,
        gas_limit: Gas,
    ) -> PromiseIndex {
        let contract = Outgoing::new(contract.as_bytes());
        let method = Outgoing::new(method.as_bytes());
        let args = Outgoing::new(args);
        let deposit = deposit(deposit_amount);
        PromiseIndex::from_raw(unsafe {
            sys::create_call_function_promise(
                contract.raw(),
                method.raw(),
                args.raw(),
                deposit.raw(),
                gas_limit,
            )
        })
    }

    fn create_deploy_contract_promise(
        &mut self,
        code: &[u8],
        args: &[u8],
        nonce: &[u8],
        deposit_amount: &Balance,
        gas_limit: Gas,
    ) -> PromiseIndex {
        let code = Outgoing::new(code);
        let args = Outgoing::new(args);
        let nonce = Outgoing::optional(nonce);
        let deposit = deposit(deposit_amount);
        PromiseIndex::from_raw(unsafe {
            sys::create_deploy_contract_promise(
                code.raw(),
                args.raw(),
                nonce.raw(),
                deposit.raw(),
                gas_limit,
            )
        })
    }

    fn create_transfer_promise(&mut self, to: &Address, amount: &Balance) {
        let to = Outgoing::new(to.as_bytes());
        let amount = deposit(amount);
        unsafe { sys::create_transfer_promise(to.raw(), amount.raw()) }
    }

    fn create_read_contract_data_promise(
        &mut self,
        contract: &Address,
        key: &[u8],
        gas_limit: Gas,
    ) -> PromiseIndex {
        let contract = Outgoing::new(contract.as_bytes());
        let key = Outgoing::new(key);
        PromiseIndex::from_raw(unsafe {
            sys::create_read_contract_data_promise(contract.raw(), key.raw(), gas_limit)
        })
    }

    fn create_get_identity_promise(&mut self, address: &Address, gas_limit: Gas) -> PromiseIndex {
        let address = Outgoing::new(address.as_bytes());
        PromiseIndex::from_raw(unsafe { sys::create_get_identity_promise(address.raw(), gas_limit) })
    }

    fn promise_then(
        &mut self,
        promise: PromiseIndex,
        method: &str,
        args: &[u8],
        deposit_amount: &Balance,
        gas_limit: Gas,
    ) {
        let method = Outgoing::new(method.as_bytes());
        let args = Outgoing::new(args);
        let deposit = deposit(deposit_amount);
        unsafe {
            sys::promise_then(
                promise.into_raw(),
                method.raw(),
                args.raw(),
                deposit.raw(),
                gas_limit,
            )
        }
    }

    fn promise_result(&mut self) -> PromiseResult {
        let buffer = region::allocate(MAX_PROMISE_RESULT_SIZE);
        match unsafe { sys::promise_result(buffer.into_raw()) } {
            PromiseResult::STATUS_FAILED => {
                region::release(buffer);
                PromiseResult::Failed
            }
            PromiseResult::STATUS_EMPTY => {
                region::release(buffer);
                PromiseResult::Empty
            }
            PromiseResult::STATUS_VALUE => {
                PromiseResult::Value(region::take(buffer).unwrap_or_else(|_| crate::abort()))
            }
            _ => crate::abort(),
        }
    }
}
