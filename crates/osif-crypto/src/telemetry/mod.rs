//! Structured logging setup.
//!
//! # Telemetry invariants
//!
//! - **No key material, plaintext, or ciphertext** appears in any event field.
//! - Log level is configurable via `OSIF_LOG_LEVEL` (default: `info`), and
//!   `RUST_LOG` overrides it when set.

pub mod init;

pub use init::init_telemetry;
