//! Seed generation for the host stack's internal PRNG.
//!
//! # Modes
//!
//! - [`EntropyMode::Secure`]: the platform declares a cryptographically
//!   secure entropy device; seeds come from it and a device failure is fatal.
//! - [`EntropyMode::BestEffort`]: no device is declared; seeds come from a
//!   non-cryptographic PRNG. This degraded mode is chosen once at startup and
//!   announced with a `warn` event. It is never entered silently.
//!
//! [`EntropyMode::Secure`]: common::EntropyMode::Secure
//! [`EntropyMode::BestEffort`]: common::EntropyMode::BestEffort

pub mod source;

pub use source::EntropySource;

use thiserror::Error;

/// Failure of a secure entropy device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntropyError {
    /// The device could not supply the requested bytes.
    #[error("entropy device unavailable: {0}")]
    Unavailable(String),
}

/// A cryptographically secure source of random bytes.
#[cfg_attr(test, mockall::automock)]
pub trait EntropyDevice: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError>;
}

/// The operating system CSPRNG, via `getrandom`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropyDevice for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        getrandom::fill(dest).map_err(|e| EntropyError::Unavailable(e.to_string()))
    }
}
