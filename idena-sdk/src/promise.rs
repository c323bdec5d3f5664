//! Scheduling of cross-contract calls, deployments, transfers and reads of other
//! contracts' data.
//!
//! Scheduling returns control to the contract immediately: the host takes the whole
//! schedule when the top-level invocation returns and executes it in creation order.
//! A promise may get at most one continuation, a method of the scheduling contract that
//! the host invokes as a fresh entry point once the promise settles. Inside it,
//! [`crate::Context::promise_result`] describes the outcome of that promise and of no
//! other.
use crate::env::Host;
use crate::error::PromiseError;
use crate::types::{Address, Balance, Gas};

/// Capacity of the region the host copies a promise result value into.
pub const MAX_PROMISE_RESULT_SIZE: u32 = 64 * 1024;

/// Index of a call or deploy promise in the schedule of the current invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PromiseIndex(u32);

impl PromiseIndex {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn into_raw(self) -> u32 {
        self.0
    }
}

/// Settlement of the promise a continuation is chained to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromiseResult {
    Failed,
    Empty,
    Value(Vec<u8>),
}

impl PromiseResult {
    pub const STATUS_FAILED: u32 = 0;
    pub const STATUS_EMPTY: u32 = 1;
    pub const STATUS_VALUE: u32 = 2;

    pub fn status(&self) -> u32 {
        match self {
            PromiseResult::Failed => Self::STATUS_FAILED,
            PromiseResult::Empty => Self::STATUS_EMPTY,
            PromiseResult::Value(_) => Self::STATUS_VALUE,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, PromiseResult::Failed)
    }

    pub fn value(&self) -> Option<&[u8]> {
        match self {
            PromiseResult::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// What a scheduled promise does once the host executes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromiseAction {
    CallFunction {
        contract: Address,
        method: String,
        args: Vec<u8>,
    },
    DeployContract {
        code: Vec<u8>,
        args: Vec<u8>,
        nonce: Vec<u8>,
    },
    Transfer {
        to: Address,
        amount: Balance,
    },
    /// Settles with the value `contract` stores under `key`.
    ReadContractData {
        contract: Address,
        key: Vec<u8>,
    },
    /// Settles with the protobuf encoded identity of `address`.
    GetIdentity {
        address: Address,
    },
}

/// The method chained to a promise with `then`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub method: String,
    pub args: Vec<u8>,
    pub deposit: Balance,
    pub gas_limit: Gas,
}

#[derive(Debug)]
struct Link {
    index: PromiseIndex,
    continuation: Option<String>,
}

/// Promises created by the current invocation and the continuations chained to them.
#[derive(Debug, Default)]
pub struct Schedule {
    links: Vec<Link>,
}

impl Schedule {
    pub fn call_function<H: Host>(
        &mut self,
        host: &mut H,
        contract: &Address,
        method: &str,
        args: &[u8],
        deposit: Balance,
        gas_limit: Gas,
    ) -> PromiseIndex {
        let index = host.create_call_function_promise(contract, method, args, &deposit, gas_limit);
        self.push(index)
    }

    pub fn deploy_contract<H: Host>(
        &mut self,
        host: &mut H,
        code: &[u8],
        args: &[u8],
        nonce: &[u8],
        deposit: Balance,
        gas_limit: Gas,
    ) -> PromiseIndex {
        let index = host.create_deploy_contract_promise(code, args, nonce, &deposit, gas_limit);
        self.push(index)
    }

    pub fn read_contract_data<H: Host>(
        &mut self,
        host: &mut H,
        contract: &Address,
        key: &[u8],
        gas_limit: Gas,
    ) -> PromiseIndex {
        let index = host.create_read_contract_data_promise(contract, key, gas_limit);
        self.push(index)
    }

    pub fn get_identity<H: Host>(
        &mut self,
        host: &mut H,
        address: &Address,
        gas_limit: Gas,
    ) -> PromiseIndex {
        let index = host.create_get_identity_promise(address, gas_limit);
        self.push(index)
    }

    /// Transfers can't be chained, so they don't get an index.
    pub fn transfer<H: Host>(&mut self, host: &mut H, to: &Address, amount: Balance) {
        host.create_transfer_promise(to, &amount)
    }

    /// Chains `continuation` to `promise`.
    ///
    /// # Errors
    ///
    /// The promise must have been created by this invocation and must not have a
    /// continuation yet. The host is not called in that case.
    pub fn then<H: Host>(
        &mut self,
        host: &mut H,
        promise: PromiseIndex,
        continuation: Continuation,
    ) -> Result<(), PromiseError> {
        let link = self
            .links
            .iter_mut()
            .find(|link| link.index == promise)
            .ok_or(PromiseError::Unknown(promise.0))?;
        if link.continuation.is_some() {
            return Err(PromiseError::AlreadyChained(promise.0));
        }
        host.promise_then(
            promise,
            &continuation.method,
            &continuation.args,
            &continuation.deposit,
            continuation.gas_limit,
        );
        link.continuation = Some(continuation.method);
        Ok(())
    }

    /// Name of the continuation chained to `promise`, if any.
    pub fn continuation_of(&self, promise: PromiseIndex) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.index == promise)
            .and_then(|link| link.continuation.as_deref())
    }

    /// Number of chainable promises created so far.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn push(&mut self, index: PromiseIndex) -> PromiseIndex {
        self.links.push(Link {
            index,
            continuation: None,
        });
        index
    }
}
