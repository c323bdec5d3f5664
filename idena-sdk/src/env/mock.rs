use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use super::{Host, Storage};
use crate::error::PromiseError;
use crate::promise::{Continuation, PromiseAction, PromiseIndex, PromiseResult};
use crate::types::{
    Address, Balance, BlockNumber, Epoch, Gas, Identity, IdentityState, TimeStamp, ADDRESS_LEN,
};
use crate::Context;

const CALLER_ADDRESS: &[u8; 20] = b"mock_caller_address1";
const CONTRACT_ADDRESS: &[u8; 20] = b"mock_contract_addres";
const CONTRACT_CODE: &[u8] = b"mock contract code";

/// A promise recorded by [`MockHost`], with the continuation chained to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledPromise {
    /// `None` for transfers, which can't be chained.
    pub index: Option<PromiseIndex>,
    pub action: PromiseAction,
    pub deposit: Balance,
    pub gas_limit: Gas,
    pub continuation: Option<Continuation>,
}

/// An event emitted by a committed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub args: Vec<u8>,
}

/// Outcome of a continuation run by [`MockHost::run_continuations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationRun<R> {
    /// The settled promise the continuation is chained to.
    pub promise: PromiseIndex,
    pub method: String,
    pub outcome: Result<R, String>,
    /// Promises the continuation scheduled itself.
    pub scheduled: Vec<ScheduledPromise>,
}

/// In-memory host for native tests.
///
/// Every entry point runs through [`MockHost::invoke`], which behaves like one
/// transaction: the schedule starts empty and a panic rolls back every storage change
/// and every event. Once a promise of the committed schedule is settled with
/// [`MockHost::settle`], [`MockHost::run_continuations`] invokes its continuation
/// with that settlement as the promise result.
#[derive(Debug, Clone)]
pub struct MockHost {
    storage: BTreeMap<Vec<u8>, Vec<u8>>,
    messages: Vec<String>,
    events: Vec<Event>,
    scheduled: Vec<ScheduledPromise>,
    settlements: BTreeMap<PromiseIndex, PromiseResult>,
    promise_result: PromiseResult,
    caller: Address,
    original_caller: Address,
    contract: Address,
    code: Vec<u8>,
    block_timestamp: TimeStamp,
    block_number: BlockNumber,
    block_seed: Vec<u8>,
    min_fee_per_gas: Balance,
    network_size: u64,
    epoch: Epoch,
    pay_amount: Balance,
    balances: BTreeMap<Address, Balance>,
    identities: BTreeMap<Address, Identity>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            storage: BTreeMap::new(),
            messages: Vec::new(),
            events: Vec::new(),
            scheduled: Vec::new(),
            settlements: BTreeMap::new(),
            promise_result: PromiseResult::Empty,
            caller: Address::from(CALLER_ADDRESS),
            original_caller: Address::from(CALLER_ADDRESS),
            contract: Address::from(CONTRACT_ADDRESS),
            code: CONTRACT_CODE.to_vec(),
            block_timestamp: 0,
            block_number: 0,
            block_seed: vec![0; 32],
            min_fee_per_gas: Balance::zero(),
            network_size: 0,
            epoch: 0,
            pay_amount: Balance::zero(),
            balances: BTreeMap::new(),
            identities: BTreeMap::new(),
        }
    }
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `entry` as one transaction against this host.
    ///
    /// Returns the panic message as `Err` if the entry point panics. Storage and events
    /// are then restored to what they were before the call and nothing stays scheduled.
    pub fn invoke<R, F>(&mut self, entry: F) -> Result<R, String>
    where
        F: FnOnce(&mut Context<MockHost>) -> R,
    {
        self.settlements.clear();
        self.transaction(entry)
    }

    /// Promises scheduled by the last invocation, in creation order. After
    /// [`MockHost::run_continuations`], the promises that are still waiting for their
    /// settlement.
    pub fn scheduled(&self) -> &[ScheduledPromise] {
        &self.scheduled
    }

    /// Messages printed so far, including those of aborted invocations.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Events of the committed invocations.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn storage(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.storage
    }

    /// Settlement reported by `promise_result` to invocations that are not run as the
    /// continuation of a settled promise.
    pub fn set_promise_result(&mut self, result: PromiseResult) {
        self.promise_result = result;
    }

    /// Records how the scheduled promise `index` settles.
    ///
    /// # Errors
    ///
    /// The promise must be waiting in [`MockHost::scheduled`].
    pub fn settle(&mut self, index: PromiseIndex, result: PromiseResult) -> Result<(), PromiseError> {
        if !self
            .scheduled
            .iter()
            .any(|promise| promise.index == Some(index))
        {
            return Err(PromiseError::Unknown(index.into_raw()));
        }
        self.settlements.insert(index, result);
        Ok(())
    }

    /// Invokes, in creation order, the continuation of every settled promise. Inside
    /// `dispatch`, `promise_result` reports the settlement of that promise and of no
    /// other.
    ///
    /// Settled promises leave the schedule. Promises that are not settled yet stay in
    /// it and their continuations don't run.
    pub fn run_continuations<R, F>(&mut self, mut dispatch: F) -> Vec<ContinuationRun<R>>
    where
        F: FnMut(&mut Context<MockHost>, &Continuation) -> R,
    {
        let committed = std::mem::take(&mut self.scheduled);
        let fallback = self.promise_result.clone();
        let mut waiting = Vec::new();
        let mut runs = Vec::new();

        for promise in committed {
            let settled = promise
                .index
                .and_then(|index| self.settlements.remove(&index).map(|result| (index, result)));
            let Some((index, result)) = settled else {
                waiting.push(promise);
                continue;
            };
            let Some(continuation) = promise.continuation else {
                continue;
            };

            self.promise_result = result;
            let outcome = self.transaction(|ctx| dispatch(ctx, &continuation));
            runs.push(ContinuationRun {
                promise: index,
                method: continuation.method,
                outcome,
                scheduled: std::mem::take(&mut self.scheduled),
            });
        }

        self.promise_result = fallback;
        self.scheduled = waiting;
        runs
    }

    /// Sets both the caller and the signer of the transaction.
    pub fn set_caller(&mut self, caller: Address) {
        self.caller = caller;
        self.original_caller = caller;
    }

    pub fn set_original_caller(&mut self, original_caller: Address) {
        self.original_caller = original_caller;
    }

    pub fn set_contract(&mut self, contract: Address) {
        self.contract = contract;
    }

    pub fn set_code(&mut self, code: Vec<u8>) {
        self.code = code;
    }

    pub fn set_block(&mut self, number: BlockNumber, timestamp: TimeStamp, seed: Vec<u8>) {
        self.block_number = number;
        self.block_timestamp = timestamp;
        self.block_seed = seed;
    }

    pub fn set_min_fee_per_gas(&mut self, fee: Balance) {
        self.min_fee_per_gas = fee;
    }

    pub fn set_network_size(&mut self, size: u64) {
        self.network_size = size;
    }

    pub fn set_epoch(&mut self, epoch: Epoch) {
        self.epoch = epoch;
    }

    /// Coins attached to the calls invoked from now on.
    pub fn set_pay_amount(&mut self, amount: Balance) {
        self.pay_amount = amount;
    }

    pub fn set_balance(&mut self, address: Address, balance: Balance) {
        self.balances.insert(address, balance);
    }

    pub fn set_identity(&mut self, address: Address, identity: Identity) {
        self.identities.insert(address, identity);
    }

    /// Hash the host assigns to `code`.
    pub fn hash_code(code: &[u8]) -> Vec<u8> {
        blake3::hash(code).as_bytes().to_vec()
    }

    /// Address the contract deployed by the promise at `index` gets.
    pub fn deployed_address(&self, index: PromiseIndex) -> Option<Address> {
        self.scheduled
            .iter()
            .find(|promise| promise.index == Some(index))
            .and_then(|promise| match &promise.action {
                PromiseAction::DeployContract { code, args, nonce } => {
                    Some(self.contract_address(code, args, nonce))
                }
                _ => None,
            })
    }

    fn transaction<R, F>(&mut self, entry: F) -> Result<R, String>
    where
        F: FnOnce(&mut Context<MockHost>) -> R,
    {
        self.scheduled.clear();
        let snapshot = self.storage.clone();
        let events = self.events.len();
        let mut ctx = Context::new(std::mem::take(self));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry(&mut ctx)));
        *self = ctx.into_host();
        outcome.map_err(|payload| {
            self.storage = snapshot;
            self.events.truncate(events);
            self.scheduled.clear();
            panic_message(payload)
        })
    }

    fn schedule(
        &mut self,
        action: PromiseAction,
        deposit: &Balance,
        gas_limit: Gas,
        chainable: bool,
    ) -> PromiseIndex {
        let index = PromiseIndex::from_raw(self.scheduled.len() as u32);
        self.scheduled.push(ScheduledPromise {
            index: chainable.then_some(index),
            action,
            deposit: *deposit,
            gas_limit,
            continuation: None,
        });
        index
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    }
}

impl Storage for MockHost {
    fn storage_read(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.storage.get(key).cloned()
    }

    fn storage_write(&mut self, key: &[u8], value: &[u8]) {
        self.storage.insert(key.to_vec(), value.to_vec());
    }

    fn storage_remove(&mut self, key: &[u8]) {
        self.storage.remove(key);
    }
}

impl Host for MockHost {
    fn print(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn panic(&mut self, message: &str) -> ! {
        std::panic::panic_any(message.to_string())
    }

    fn emit_event(&mut self, name: &str, args: &[u8]) {
        self.events.push(Event {
            name: name.to_string(),
            args: args.to_vec(),
        });
    }

    fn block_timestamp(&self) -> TimeStamp {
        self.block_timestamp
    }

    fn block_number(&self) -> BlockNumber {
        self.block_number
    }

    fn block_seed(&self) -> Vec<u8> {
        self.block_seed.clone()
    }

    fn min_fee_per_gas(&self) -> Balance {
        self.min_fee_per_gas
    }

    fn network_size(&self) -> u64 {
        self.network_size
    }

    fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn pay_amount(&self) -> Balance {
        self.pay_amount
    }

    fn caller(&self) -> Address {
        self.caller
    }

    fn original_caller(&self) -> Address {
        self.original_caller
    }

    fn contract(&self) -> Address {
        self.contract
    }

    fn own_address(&self) -> Address {
        self.contract
    }

    fn balance(&self, address: &Address) -> Balance {
        self.balances.get(address).copied().unwrap_or_default()
    }

    fn identity(&self, address: &Address) -> Option<Vec<u8>> {
        self.identities.get(address).map(Identity::encode)
    }

    fn identity_state(&self, address: &Address) -> IdentityState {
        self.identities
            .get(address)
            .map(|identity| identity.state)
            .unwrap_or(IdentityState::Undefined)
    }

    fn code_hash(&self) -> Vec<u8> {
        Self::hash_code(&self.code)
    }

    fn code(&self) -> Vec<u8> {
        self.code.clone()
    }

    fn contract_address(&self, code: &[u8], args: &[u8], nonce: &[u8]) -> Address {
        self.contract_address_by_hash(&Self::hash_code(code), args, nonce)
    }

    fn contract_address_by_hash(&self, code_hash: &[u8], args: &[u8], nonce: &[u8]) -> Address {
        let mut hasher = blake3::Hasher::new();
        hasher.update(code_hash);
        hasher.update(args);
        hasher.update(nonce);
        let mut address = [0u8; ADDRESS_LEN];
        address.copy_from_slice(&hasher.finalize().as_bytes()[..ADDRESS_LEN]);
        Address::from(address)
    }

    fn create_call_function_promise(
        &mut self,
        contract: &Address,
        method: &str,
        args: &[u8],
        deposit: &Balance,
        gas_limit: Gas,
    ) -> PromiseIndex {
        let action = PromiseAction::CallFunction {
            contract: *contract,
            method: method.to_string(),
            args: args.to_vec(),
        };
        self.schedule(action, deposit, gas_limit, true)
    }

    fn create_deploy_contract_promise(
        &mut self,
        code: &[u8],
        args: &[u8],
        nonce: &[u8],
        deposit: &Balance,
        gas_limit: Gas,
    ) -> PromiseIndex {
        let action = PromiseAction::DeployContract {
            code: code.to_vec(),
            args: args.to_vec(),
            nonce: nonce.to_vec(),
        };
        self.schedule(action, deposit, gas_limit, true)
    }

    fn create_transfer_promise(&mut self, to: &Address, amount: &Balance) {
        let action = PromiseAction::Transfer {
            to: *to,
            amount: *amount,
        };
        self.schedule(action, amount, 0, false);
    }

    fn create_read_contract_data_promise(
        &mut self,
        contract: &Address,
        key: &[u8],
        gas_limit: Gas,
    ) -> PromiseIndex {
        let action = PromiseAction::ReadContractData {
            contract: *contract,
            key: key.to_vec(),
        };
        self.schedule(action, &Balance::zero(), gas_limit, true)
    }

    fn create_get_identity_promise(&mut self, address: &Address, gas_limit: Gas) -> PromiseIndex {
        let action = PromiseAction::GetIdentity { address: *address };
        self.schedule(action, &Balance::zero(), gas_limit, true)
    }

    fn promise_then(
        &mut self,
        promise: PromiseIndex,
        method: &str,
        args: &[u8],
        deposit: &Balance,
        gas_limit: Gas,
    ) {
        let position = self
            .scheduled
            .iter()
            .position(|scheduled| scheduled.index == Some(promise));
        let Some(position) = position else {
            self.panic("invalid promise_idx")
        };
        if self.scheduled[position].continuation.is_some() {
            self.panic("promise is completed");
        }
        self.scheduled[position].continuation = Some(Continuation {
            method: method.to_string(),
            args: args.to_vec(),
            deposit: *deposit,
            gas_limit,
        });
    }

    fn promise_result(&mut self) -> PromiseResult {
        self.promise_result.clone()
    }
}
