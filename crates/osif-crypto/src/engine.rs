//! [`EngineAdapter`]: owns the configured backend and its one-time acquisition.
//!
//! # Lifecycle
//!
//! 1. The adapter starts `Uninitialized`, holding an unacquired [`Backend`].
//! 2. [`EngineAdapter::initialize`] acquires the device/service handle once
//!    and moves to `Ready`. A second call while `Ready` leaves the handle
//!    untouched.
//! 3. [`EngineAdapter::encrypt`] borrows the handle; it never changes state
//!    and is rejected with [`CryptoError::NotInitialized`] before step 2.
//!
//! Initialization takes `&mut self` and encryption `&self`, so an encrypt can
//! never overlap a (re-)initialization.

use common::{BackendKind, Block, CryptoError, Key};
use tracing::{debug, info};

use crate::backend::{Backend, BlockCipherBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Uninitialized,
    Ready,
}

/// The selected backend plus its lifecycle state.
#[derive(Debug)]
pub struct EngineAdapter {
    backend: Backend,
    state: EngineState,
}

impl EngineAdapter {
    /// Wrap a backend. Nothing is acquired until [`initialize`](Self::initialize).
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            state: EngineState::Uninitialized,
        }
    }

    /// The configured backend.
    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Returns `true` once the backend handle has been acquired.
    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    /// Acquire the backend handle.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Initialization`] if the device or service cannot
    /// be made ready. The adapter stays `Uninitialized`.
    pub fn initialize(&mut self) -> Result<(), CryptoError> {
        if self.is_ready() {
            debug!(backend = %self.kind(), "AES engine already initialised; keeping existing handle");
            return Ok(());
        }
        self.backend.acquire()?;
        self.state = EngineState::Ready;
        info!(backend = %self.kind(), "AES engine ready");
        Ok(())
    }

    /// Encrypt one block through the acquired backend.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::NotInitialized`] before [`initialize`](Self::initialize)
    /// and [`CryptoError::BackendOperation`] if the engine fails.
    pub fn encrypt(&self, key: &Key, plaintext: &Block) -> Result<Block, CryptoError> {
        if !self.is_ready() {
            return Err(CryptoError::NotInitialized);
        }
        self.backend.encrypt_block(key, plaintext)
    }
}
