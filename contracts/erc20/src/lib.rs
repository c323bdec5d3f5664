//! ERC20-style fungible token.
//!
//! The whole supply is minted to the account that deploys the contract. Balances are
//! kept under the `b:` prefix, allowances under `a:` keyed by `"<owner>:<spender>"` in
//! lowercase hex.
//!
//! `transfer_from` spends the allowance it uses: after moving `tokens`, the approval of
//! the caller drops by the same amount. Token samples that only check the allowance let
//! one approval be spent any number of times; here it can't be.
use idena_sdk::store::PersistentMap;
use idena_sdk::types::Address;
use idena_sdk::{contract, log, Context, Host};

pub const TOTAL_SUPPLY: u64 = 7777777;

pub struct Erc20 {
    balances: PersistentMap<Address, u64>,
    approvals: PersistentMap<str, u64>,
}

impl Default for Erc20 {
    fn default() -> Self {
        Self {
            balances: PersistentMap::new(b"b:"),
            approvals: PersistentMap::new(b"a:"),
        }
    }
}

fn approval_key(owner: &Address, spender: &Address) -> String {
    format!("{}:{}", owner.to_hex(), spender.to_hex())
}

#[contract]
impl Erc20 {
    pub fn deploy<H: Host>(&self, ctx: &mut Context<H>) {
        let owner = ctx.caller();
        self.balances.set(ctx, &owner, &TOTAL_SUPPLY);
        log!(ctx, "minted {} tokens to {}", TOTAL_SUPPLY, owner);
    }

    pub fn transfer<H: Host>(&self, ctx: &mut Context<H>, to: Address, tokens: u64) {
        let from = ctx.caller();
        log!(ctx, "transfer from: {} to: {} tokens: {}", from, to, tokens);
        self.move_tokens(ctx, &from, &to, tokens);
    }

    pub fn approve<H: Host>(&self, ctx: &mut Context<H>, spender: Address, tokens: u64) {
        let owner = ctx.caller();
        log!(ctx, "approve: {} spender: {} tokens: {}", owner, spender, tokens);
        self.approvals
            .set(ctx, &approval_key(&owner, &spender), &tokens);
    }

    /// Moves `tokens` from `from` to `to` on behalf of the caller, within the allowance
    /// `from` granted to it.
    pub fn transfer_from<H: Host>(
        &self,
        ctx: &mut Context<H>,
        from: Address,
        to: Address,
        tokens: u64,
    ) {
        let spender = ctx.caller();
        let key = approval_key(&from, &spender);
        let approved = self.approvals.get(ctx, &key, 0);
        let approved = ctx.unwrap_or_panic(approved);
        ctx.require(
            tokens <= approved,
            "not enough tokens approved to transfer",
        );

        self.move_tokens(ctx, &from, &to, tokens);
        self.approvals.set(ctx, &key, &(approved - tokens));
    }

    pub fn balance_of<H: Host>(&self, ctx: &mut Context<H>, owner: Address) -> u64 {
        self.balance(ctx, &owner)
    }

    pub fn allowance<H: Host>(&self, ctx: &mut Context<H>, owner: Address, spender: Address) -> u64 {
        let approved = self.approvals.get(ctx, &approval_key(&owner, &spender), 0);
        ctx.unwrap_or_panic(approved)
    }

    fn balance<H: Host>(&self, ctx: &mut Context<H>, owner: &Address) -> u64 {
        let balance = self.balances.get(ctx, owner, 0);
        ctx.unwrap_or_panic(balance)
    }

    fn move_tokens<H: Host>(&self, ctx: &mut Context<H>, from: &Address, to: &Address, tokens: u64) {
        let from_balance = self.balance(ctx, from);
        ctx.require(from_balance >= tokens, "not enough tokens on account");
        self.balances.set(ctx, from, &(from_balance - tokens));

        // read after the debit so a transfer to oneself is a no-op
        let to_balance = self.balance(ctx, to);
        let credited = to_balance
            .checked_add(tokens)
            .ok_or("overflow at the receiver side");
        let credited = ctx.unwrap_or_panic(credited);
        self.balances.set(ctx, to, &credited);
    }
}
