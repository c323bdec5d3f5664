//! Errors returned when bytes coming from the host or from storage can't be interpreted.
use thiserror::Error;

/// Failure to turn raw bytes into a typed value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("value is too large: {0} bytes")]
    TooLarge(usize),
    #[error("argument blob is empty")]
    EmptyArgs,
    #[error("unknown argument format {0:#04x}")]
    UnknownFormat(u8),
    #[error("malformed protobuf message: {0}")]
    Proto(#[from] prost::DecodeError),
    #[error("invalid utf-8")]
    Utf8,
    #[error("invalid hex string {0}")]
    Hex(String),
    #[error("cannot deserialize value: {0}")]
    Value(String),
    #[error(transparent)]
    Region(#[from] RegionError),
}

/// Misuse of a memory region handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("null region handle")]
    Null,
    #[error("region {0} is unknown or was already consumed")]
    Unknown(u32),
    #[error("region length {len} exceeds its capacity {capacity}")]
    Overflow { len: u32, capacity: u32 },
}

/// Misuse of the promise schedule of the current invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromiseError {
    #[error("promise {0} was not scheduled by this invocation")]
    Unknown(u32),
    #[error("promise {0} already has a continuation")]
    AlreadyChained(u32),
    #[error("promise result was already read")]
    ResultAlreadyRead,
}
