//! Wallet of a shared fungible token.
//!
//! Every holder gets its own wallet contract, deployed from the same code with the
//! arguments `[owner, root]`, so the address of any wallet can be derived from its owner.
//! A transfer is a chain of two promises:
//!
//! 1. deploy the recipient wallet, then `_deploy_wallet_callback`, which debits the
//!    sender and
//! 2. calls `receive` on the recipient wallet, then `_send_tokens_callback`, which
//!    credits the tokens back if `receive` failed.
use idena_sdk::args::{pack_plain, pack_structured, Argument};
use idena_sdk::promise::PromiseResult;
use idena_sdk::store::KeyValue;
use idena_sdk::types::{Address, Balance, Gas};
use idena_sdk::{contract, log, Context, Host};

pub const DEPLOY_GAS_LIMIT: Gas = 450_000;
pub const DEPLOY_CALLBACK_GAS_LIMIT: Gas = 3_000_000;
pub const RECEIVE_GAS_LIMIT: Gas = 1_400_000;
pub const SEND_CALLBACK_GAS_LIMIT: Gas = 400_000;

pub struct Wallet {
    owner: KeyValue<Address>,
    root: KeyValue<Address>,
    tokens: KeyValue<u64>,
}

impl Default for Wallet {
    fn default() -> Self {
        Self {
            owner: KeyValue::new(b"o"),
            root: KeyValue::new(b"r"),
            tokens: KeyValue::new(b"tokens"),
        }
    }
}

/// Deploy arguments of the wallet owned by `owner`.
pub fn wallet_args(owner: &Address, root: &Address) -> Vec<u8> {
    pack_structured(&[owner.to_arg(), root.to_arg()])
}

#[contract]
impl Wallet {
    pub fn deploy<H: Host>(&self, ctx: &mut Context<H>, owner: Address, root: Address) {
        log!(ctx, "owner = {}", owner);
        log!(ctx, "root = {}", root);
        self.owner.set(ctx, &owner);
        self.root.set(ctx, &root);
    }

    pub fn get_balance<H: Host>(&self, ctx: &mut Context<H>) -> u64 {
        let tokens = self.tokens.get_or(ctx, 0);
        ctx.unwrap_or_panic(tokens)
    }

    /// Sends `amount` tokens to the wallet of `recipient`, deploying it if needed.
    pub fn transfer_to<H: Host>(&self, ctx: &mut Context<H>, recipient: Address, amount: u64) {
        let balance = self.get_balance(ctx);
        ctx.require(balance >= amount, "not enough tokens on account");
        ctx.require(amount > 0, "amount should be positive");
        let owner = self.owner(ctx);
        let caller = ctx.caller();
        ctx.require(caller == owner, "sender is not an owner");

        let root = self.root(ctx);
        let code = ctx.host().code();
        let promise = ctx.deploy_contract(
            &code,
            &wallet_args(&recipient, &root),
            &[],
            Balance::zero(),
            DEPLOY_GAS_LIMIT,
        );
        let chained = ctx.then(
            promise,
            "_deploy_wallet_callback",
            &pack_structured(&[recipient.to_arg(), amount.to_arg()]),
            Balance::zero(),
            DEPLOY_CALLBACK_GAS_LIMIT,
        );
        ctx.unwrap_or_panic(chained);
    }

    /// Credits tokens sent by the wallet of `sender_owner`.
    pub fn receive<H: Host>(&self, ctx: &mut Context<H>, amount: u64, sender_owner: Address) {
        let root = self.root(ctx);
        let required = wallet_address(ctx, &sender_owner, &root);
        let caller = ctx.caller();
        log!(ctx, "caller={} required caller={}", caller, required);
        ctx.require(caller == required, "sender is invalid");

        self.add_balance(ctx, amount);
        log!(ctx, "received {} tokens", amount);
    }

    pub fn _deploy_wallet_callback<H: Host>(
        &self,
        ctx: &mut Context<H>,
        recipient: Address,
        amount: u64,
    ) {
        let owner = self.owner(ctx);
        let root = self.root(ctx);

        let balance = self.get_balance(ctx);
        ctx.require(balance >= amount, "not enough tokens on account");
        self.tokens.set(ctx, &(balance - amount));

        let destination = wallet_address(ctx, &recipient, &root);
        let promise = ctx.call_function(
            &destination,
            "receive",
            &pack_structured(&[amount.to_arg(), owner.to_arg()]),
            Balance::zero(),
            RECEIVE_GAS_LIMIT,
        );
        let chained = ctx.then(
            promise,
            "_send_tokens_callback",
            &pack_plain(&amount.to_arg()),
            Balance::zero(),
            SEND_CALLBACK_GAS_LIMIT,
        );
        ctx.unwrap_or_panic(chained);
    }

    pub fn _send_tokens_callback<H: Host>(&self, ctx: &mut Context<H>, amount: u64) {
        let result = ctx.promise_result();
        if ctx.unwrap_or_panic(result) == PromiseResult::Failed {
            log!(ctx, "receive failed, returning {} tokens", amount);
            self.add_balance(ctx, amount);
        }
    }

    fn owner<H: Host>(&self, ctx: &mut Context<H>) -> Address {
        let owner = self.owner.get(ctx);
        match ctx.unwrap_or_panic(owner) {
            Some(owner) => owner,
            None => ctx.panic("owner is not set"),
        }
    }

    fn root<H: Host>(&self, ctx: &mut Context<H>) -> Address {
        let root = self.root.get(ctx);
        match ctx.unwrap_or_panic(root) {
            Some(root) => root,
            None => ctx.panic("root is not set"),
        }
    }

    fn add_balance<H: Host>(&self, ctx: &mut Context<H>, amount: u64) {
        let balance = self.get_balance(ctx);
        let credited = balance.checked_add(amount).ok_or("overflow");
        let credited = ctx.unwrap_or_panic(credited);
        self.tokens.set(ctx, &credited);
    }
}

/// Address of the wallet owned by `owner`, derived the way the host derives it at deploy.
fn wallet_address<H: Host>(ctx: &Context<H>, owner: &Address, root: &Address) -> Address {
    let host = ctx.host();
    host.contract_address_by_hash(&host.code_hash(), &wallet_args(owner, root), &[])
}
