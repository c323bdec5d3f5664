use std::fmt;

use crate::args::{self, Argument};
use crate::env::{Host, Storage};
use crate::error::{DecodeError, PromiseError};
use crate::promise::{Continuation, PromiseIndex, PromiseResult, Schedule};
use crate::types::{Address, Balance, Epoch, Gas, Identity};

/// State of one entry point invocation: the host it runs against and the promises it
/// has scheduled so far.
///
/// Nothing survives between invocations except what was written to storage, so a new
/// `Context` is created for every entry point, continuations included.
pub struct Context<H: Host> {
    host: H,
    schedule: Schedule,
    result_read: bool,
}

impl<H: Host> Context<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            schedule: Schedule::default(),
            result_read: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Writes a message to the host debug channel. Wasm builds only forward it with the
    /// `debug` feature, since hosts link `debug` for debug runs only.
    pub fn log(&mut self, message: &str) {
        #[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
        eprintln!("{}", message);

        self.host.print(message);
    }

    /// Aborts the transaction with `message`.
    pub fn panic(&mut self, message: &str) -> ! {
        self.host.panic(message)
    }

    /// Aborts the transaction with `message` unless `condition` holds.
    pub fn require(&mut self, condition: bool, message: &str) {
        if !condition {
            self.panic(message);
        }
    }

    /// Returns the value of `result`, or aborts the transaction with its error.
    pub fn unwrap_or_panic<T, E: fmt::Display>(&mut self, result: Result<T, E>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.panic(&err.to_string()),
        }
    }

    /// Decodes the entry point argument the host passed in the region `raw`, aborting the
    /// transaction if it is malformed.
    pub fn arg<T: Argument>(&mut self, raw: u32) -> T {
        let value = args::from_region(raw).map_err(|err| format!("invalid argument: {err}"));
        self.unwrap_or_panic(value)
    }

    pub fn caller(&self) -> Address {
        self.host.caller()
    }

    pub fn original_caller(&self) -> Address {
        self.host.original_caller()
    }

    pub fn contract(&self) -> Address {
        self.host.contract()
    }

    /// Address of the running contract as reported by `own_addr`.
    pub fn own_address(&self) -> Address {
        self.host.own_address()
    }

    /// Address a deployment of `code` with `args` and `nonce` ends up at.
    pub fn contract_address(&self, code: &[u8], args: &[u8], nonce: &[u8]) -> Address {
        self.host.contract_address(code, args, nonce)
    }

    pub fn epoch(&self) -> Epoch {
        self.host.epoch()
    }

    /// Coins attached to the current call.
    pub fn pay_amount(&self) -> Balance {
        self.host.pay_amount()
    }

    /// Identity of `address`, `None` if it has none.
    ///
    /// # Errors
    ///
    /// Fails if the host record is not a valid identity.
    pub fn identity(&self, address: &Address) -> Result<Option<Identity>, DecodeError> {
        self.host
            .identity(address)
            .map(|bytes| Identity::decode(&bytes))
            .transpose()
    }

    /// Adds the event `name` with an already packed argument blob to the receipt.
    pub fn emit_event(&mut self, name: &str, args: &[u8]) {
        self.host.emit_event(name, args)
    }

    /// Schedules a call of `method` on `contract` with an already packed argument blob.
    pub fn call_function(
        &mut self,
        contract: &Address,
        method: &str,
        args: &[u8],
        deposit: Balance,
        gas_limit: Gas,
    ) -> PromiseIndex {
        self.schedule
            .call_function(&mut self.host, contract, method, args, deposit, gas_limit)
    }

    /// Schedules the deployment of `code`. The new contract runs its `deploy` method with
    /// `args`.
    pub fn deploy_contract(
        &mut self,
        code: &[u8],
        args: &[u8],
        nonce: &[u8],
        deposit: Balance,
        gas_limit: Gas,
    ) -> PromiseIndex {
        self.schedule
            .deploy_contract(&mut self.host, code, args, nonce, deposit, gas_limit)
    }

    /// Schedules a read of the value `contract` stores under `key`. The continuation sees
    /// it as [`PromiseResult::Value`], or `Empty` if the key is missing.
    pub fn read_contract_data(
        &mut self,
        contract: &Address,
        key: &[u8],
        gas_limit: Gas,
    ) -> PromiseIndex {
        self.schedule
            .read_contract_data(&mut self.host, contract, key, gas_limit)
    }

    /// Schedules a lookup of the identity of `address`. The settled value decodes with
    /// [`Identity::decode`].
    pub fn get_identity(&mut self, address: &Address, gas_limit: Gas) -> PromiseIndex {
        self.schedule.get_identity(&mut self.host, address, gas_limit)
    }

    /// Schedules a transfer of `amount` from the contract balance.
    pub fn transfer(&mut self, to: &Address, amount: Balance) {
        self.schedule.transfer(&mut self.host, to, amount)
    }

    /// Chains `method` of this contract to `promise`.
    pub fn then(
        &mut self,
        promise: PromiseIndex,
        method: &str,
        args: &[u8],
        deposit: Balance,
        gas_limit: Gas,
    ) -> Result<(), PromiseError> {
        let continuation = Continuation {
            method: method.to_string(),
            args: args.to_vec(),
            deposit,
            gas_limit,
        };
        self.schedule.then(&mut self.host, promise, continuation)
    }

    /// Settlement of the promise this continuation is chained to.
    ///
    /// # Errors
    ///
    /// The result can be read once per invocation.
    pub fn promise_result(&mut self) -> Result<PromiseResult, PromiseError> {
        if self.result_read {
            return Err(PromiseError::ResultAlreadyRead);
        }
        self.result_read = true;
        Ok(self.host.promise_result())
    }

    /// Promises scheduled by this invocation.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }
}

impl<H: Host> Storage for Context<H> {
    fn storage_read(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.host.storage_read(key)
    }

    fn storage_write(&mut self, key: &[u8], value: &[u8]) {
        self.host.storage_write(key, value)
    }

    fn storage_remove(&mut self, key: &[u8]) {
        self.host.storage_remove(key)
    }
}
