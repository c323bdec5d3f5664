//! Callee of the cross-contract call example.
use idena_sdk::{contract, log, Context, Host};

#[derive(Default)]
pub struct Function;

#[contract]
impl Function {
    pub fn deploy<H: Host>(_ctx: &mut Context<H>) {}

    pub fn inc<H: Host>(ctx: &mut Context<H>, x: u64) -> u64 {
        log!(ctx, "inc x={}", x);
        let next = x.checked_add(1).ok_or("overflow");
        ctx.unwrap_or_panic(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idena_sdk::env::MockHost;

    #[test]
    fn test_inc() {
        let mut host = MockHost::new();
        assert_eq!(host.invoke(|ctx| Function::inc(ctx, 1)), Ok(2));
        assert_eq!(host.messages(), ["inc x=1".to_string()]);
    }

    #[test]
    fn test_inc_overflow() {
        let mut host = MockHost::new();
        assert_eq!(
            host.invoke(|ctx| Function::inc(ctx, u64::MAX)),
            Err("overflow".to_string())
        );
    }
}
