//! Crypto adapter between a low-power mesh network stack and the platform's
//! cipher engine.
//!
//! The stack sees four entry points on [`OsifCrypto`]: `initialize_rng`,
//! `random_seed`, `initialize_aes`, and `encrypt_block`. Behind them, exactly
//! one [`Backend`] variant is selected from [`Config`] and driven through the
//! [`EngineAdapter`] lifecycle.
//!
//! # Security invariants
//!
//! - Key material is never cached, logged, or persisted past a single call.
//! - Failures are returned as [`CryptoError`] and are never paired with
//!   partial or zero-filled output.

pub mod backend;
pub mod config;
pub mod engine;
pub mod entropy;
pub mod facade;
pub mod platform;
pub mod selftest;
pub mod telemetry;

pub use backend::{Backend, BlockCipherBackend};
pub use common::{BackendKind, Block, CryptoError, EntropyMode, Key, BLOCK_LEN, KEY_LEN};
pub use config::Config;
pub use engine::EngineAdapter;
pub use entropy::EntropySource;
pub use facade::OsifCrypto;
