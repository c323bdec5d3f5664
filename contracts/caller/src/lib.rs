//! Caller of the cross-contract call example.
//!
//! `invoke(x, y)` schedules `inc(x)` on the configured contract and chains `_sum(y)`,
//! which adds `y` to the value `inc` returned.
use idena_sdk::args::{pack_plain, Argument};
use idena_sdk::promise::PromiseResult;
use idena_sdk::store::KeyValue;
use idena_sdk::types::{Address, Balance, Gas};
use idena_sdk::{contract, log, Context, Host};

pub const INC_GAS_LIMIT: Gas = 100_000;
pub const SUM_GAS_LIMIT: Gas = 100_000;

pub struct Caller {
    contract: KeyValue<Address>,
}

impl Default for Caller {
    fn default() -> Self {
        Self {
            contract: KeyValue::new(b"contract"),
        }
    }
}

#[contract]
impl Caller {
    /// Remembers the address of the contract exposing `inc`.
    pub fn deploy<H: Host>(&self, ctx: &mut Context<H>, function: Address) {
        log!(ctx, "deploy arg = {}", function);
        self.contract.set(ctx, &function);
    }

    pub fn invoke<H: Host>(&self, ctx: &mut Context<H>, x: u64, y: u64) {
        let target = self.contract.get(ctx);
        let Some(target) = ctx.unwrap_or_panic(target) else {
            ctx.panic("contract should be specified")
        };
        log!(ctx, "x={}, y={}, contract={}", x, y, target);

        let promise = ctx.call_function(
            &target,
            "inc",
            &pack_plain(&x.to_arg()),
            Balance::zero(),
            INC_GAS_LIMIT,
        );
        let chained = ctx.then(
            promise,
            "_sum",
            &pack_plain(&y.to_arg()),
            Balance::zero(),
            SUM_GAS_LIMIT,
        );
        ctx.unwrap_or_panic(chained);
    }

    pub fn _sum<H: Host>(ctx: &mut Context<H>, y: u64) -> u64 {
        let result = ctx.promise_result();
        let x = match ctx.unwrap_or_panic(result) {
            PromiseResult::Value(value) => u64::from_arg(value),
            _ => ctx.panic("promise result should be successful"),
        };
        let x = ctx.unwrap_or_panic(x);
        let sum = x.checked_add(y).ok_or("overflow");
        let sum = ctx.unwrap_or_panic(sum);
        log!(ctx, "x={}, y={}, sum={}", x, y, sum);
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idena_sdk::args::unpack;
    use idena_sdk::env::MockHost;
    use idena_sdk::promise::{Continuation, PromiseAction};

    fn function_address() -> Address {
        Address::from([0xf0; 20])
    }

    fn deployed() -> MockHost {
        let mut host = MockHost::new();
        host.invoke(|ctx| Caller::default().deploy(ctx, function_address()))
            .unwrap();
        host
    }

    #[test]
    fn test_invoke_schedules_inc_then_sum() {
        let mut host = deployed();
        host.invoke(|ctx| Caller::default().invoke(ctx, 2, 3))
            .unwrap();

        let scheduled = host.scheduled();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(
            scheduled[0].action,
            PromiseAction::CallFunction {
                contract: function_address(),
                method: "inc".to_string(),
                args: pack_plain(&2u64.to_le_bytes()),
            }
        );
        assert_eq!(scheduled[0].gas_limit, INC_GAS_LIMIT);

        let continuation = scheduled[0].continuation.as_ref().unwrap();
        assert_eq!(continuation.method, "_sum");
        assert_eq!(unpack(&continuation.args), Ok(vec![3u64.to_arg()]));
        assert_eq!(continuation.gas_limit, SUM_GAS_LIMIT);
    }

    #[test]
    fn test_invoke_without_contract() {
        let mut host = MockHost::new();
        assert_eq!(
            host.invoke(|ctx| Caller::default().invoke(ctx, 2, 3)),
            Err("contract should be specified".to_string())
        );
        assert!(host.scheduled().is_empty());
    }

    #[test]
    fn test_sum_continuation() {
        let mut host = deployed();
        // `inc(2)` settled with 3
        host.set_promise_result(PromiseResult::Value(3u64.to_arg()));

        assert_eq!(host.invoke(|ctx| Caller::_sum(ctx, 3)), Ok(6));
        assert!(host.scheduled().is_empty());
    }

    #[test]
    fn test_sum_after_failed_call() {
        let mut host = deployed();
        host.set_promise_result(PromiseResult::Failed);
        assert_eq!(
            host.invoke(|ctx| Caller::_sum(ctx, 3)),
            Err("promise result should be successful".to_string())
        );

        host.set_promise_result(PromiseResult::Empty);
        assert!(host.invoke(|ctx| Caller::_sum(ctx, 3)).is_err());
    }

    #[test]
    fn test_sum_runs_once_inc_settles() {
        let mut host = deployed();
        host.invoke(|ctx| Caller::default().invoke(ctx, 2, 3))
            .unwrap();
        let inc = host.scheduled()[0].index.unwrap();

        let dispatch = |ctx: &mut Context<MockHost>, continuation: &Continuation| {
            let args = unpack(&continuation.args).unwrap();
            let y = u64::from_arg(args[0].clone()).unwrap();
            Caller::_sum(ctx, y)
        };
        assert!(host.run_continuations(dispatch).is_empty());

        host.settle(inc, PromiseResult::Value(3u64.to_arg())).unwrap();
        let runs = host.run_continuations(dispatch);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].method, "_sum");
        assert_eq!(runs[0].outcome, Ok(6));
    }
}
