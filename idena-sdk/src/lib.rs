//! Library for writing Idena wasm contracts.
//!
//! A contract is an `impl` block annotated with [`contract`]. Each public method becomes
//! an exported entry point that receives a [`Context`], reads and writes storage through
//! [`store`], and may schedule calls, deployments and transfers with continuations
//! (see [`promise`]).
//!
//! ```ignore
//! use idena_sdk::env::Host;
//! use idena_sdk::{contract, Context};
//!
//! #[derive(Default)]
//! pub struct Function;
//!
//! #[contract]
//! impl Function {
//!     pub fn inc<H: Host>(ctx: &mut Context<H>, x: u64) -> u64 {
//!         idena_sdk::log!(ctx, "inc {}", x);
//!         x + 1
//!     }
//! }
//! ```
pub use idena_sdk_macros::contract;
pub use idena_sys as sys;
use std::panic as std_panic;

pub mod args;
mod context;
pub mod env;
pub mod error;
pub mod promise;
pub mod proto;
pub mod region;
pub mod store;
pub mod types;

pub use context::Context;
pub use env::{Host, Storage};
pub use error::{DecodeError, PromiseError, RegionError};

/// Reserves a region for the host to write into.
#[cfg(target_arch = "wasm32")]
#[no_mangle]
pub extern "C" fn allocate(size: u32) -> u32 {
    region::allocate(size).into_raw()
}

/// Forwards a Rust panic to the host with its rendered message.
fn panic_hook_impl(info: &std_panic::PanicInfo) {
    panic(&info.to_string());
}

/// Installs the hook that turns Rust panics into host aborts. Called by every generated export.
pub fn setup_panic_hook() {
    std_panic::set_hook(Box::new(panic_hook_impl));
}

/// Aborts the transaction without a message. Used when the host breaks the calling
/// convention, e.g. hands back a malformed region.
pub fn abort() -> ! {
    #[cfg(target_arch = "wasm32")]
    unsafe {
        sys::panic(0)
    }
    #[cfg(not(target_arch = "wasm32"))]
    std::panic!("Mocked abort function called!");
}

/// Aborts the transaction with `message`.
pub fn panic(message: &str) -> ! {
    #[cfg(target_arch = "wasm32")]
    {
        <env::Runtime as env::Host>::panic(&mut env::Runtime, message)
    }
    #[cfg(not(target_arch = "wasm32"))]
    std::panic!("{}", message);
}

/// Formats a message and writes it to the host debug channel.
///
/// ```ignore
/// idena_sdk::log!(ctx, "owner = {}", owner);
/// ```
#[macro_export]
macro_rules! log {
    ($ctx:expr, $($arg:tt)*) => {
        $ctx.log(&::std::format!($($arg)*))
    };
}
