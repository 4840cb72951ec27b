//! Common types and errors shared across `osif-crypto` crates.

pub mod error;
pub mod types;

pub use error::CryptoError;
pub use types::{BackendKind, Block, EntropyMode, Key, SelfTestReport, BLOCK_LEN, KEY_LEN};
