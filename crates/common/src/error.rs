//! Error type returned by every fallible crypto-adapter operation.

use thiserror::Error;

use crate::types::BackendKind;

/// Top-level crypto adapter error.
///
/// Every variant is fatal for the caller's security session: nothing in this
/// layer is retried, and no variant is ever paired with partial output. The
/// host stack (or its supervisor) decides whether to abort the process.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// No backend, an unknown backend, or more than one backend was configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The selected backend could not be made ready, or the power-on
    /// known-answer test failed.
    #[error("initialization failed ({backend}): {reason}")]
    Initialization {
        /// Backend that failed to come up.
        backend: BackendKind,
        /// Human-readable cause, never containing key material.
        reason: String,
    },

    /// An encryption was requested before `initialize_aes` completed.
    #[error("encryption requested before the AES engine was initialised")]
    NotInitialized,

    /// A key, plaintext, or output buffer was missing or not 16 bytes long.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The device or service reported a failure mid-operation.
    #[error("{backend} operation failed: {reason}")]
    BackendOperation {
        /// Backend that reported the failure.
        backend: BackendKind,
        /// Human-readable cause, never containing key material.
        reason: String,
    },

    /// The platform declared a secure entropy device and reading it failed.
    #[error("entropy device failure: {0}")]
    Entropy(String),
}

impl CryptoError {
    /// Returns `true` if the caller must tear down its security session.
    ///
    /// Masking any of these risks replayed keys, weak seeds, or corrupted
    /// ciphertext, so every variant is fatal.
    pub fn is_fatal(&self) -> bool {
        match self {
            CryptoError::Configuration(_)
            | CryptoError::Initialization { .. }
            | CryptoError::NotInitialized
            | CryptoError::InvalidArgument(_)
            | CryptoError::BackendOperation { .. }
            | CryptoError::Entropy(_) => true,
        }
    }

    /// Short machine-readable code for log fields and reports.
    pub fn code(&self) -> &'static str {
        match self {
            CryptoError::Configuration(_) => "configuration",
            CryptoError::Initialization { .. } => "initialization",
            CryptoError::NotInitialized => "not_initialized",
            CryptoError::InvalidArgument(_) => "invalid_argument",
            CryptoError::BackendOperation { .. } => "backend_operation",
            CryptoError::Entropy(_) => "entropy",
        }
    }
}
