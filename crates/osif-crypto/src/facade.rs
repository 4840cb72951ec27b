//! [`OsifCrypto`]: the only entry points the mesh stack calls.
//!
//! Startup order expected from the host stack:
//! 1. [`OsifCrypto::initialize_rng`] then [`OsifCrypto::random_seed`] to seed
//!    its internal PRNG.
//! 2. [`OsifCrypto::initialize_aes`] once, before any frame security runs.
//! 3. [`OsifCrypto::encrypt_block`] for every AES block thereafter.
//!
//! Every error returned here is fatal for the caller's security session.
//! Silently continuing after a cipher or entropy failure is not an option.

use common::{BackendKind, Block, CryptoError, EntropyMode, Key, BLOCK_LEN, KEY_LEN};
use tracing::{debug, info, trace};

use crate::backend::Backend;
use crate::config::Config;
use crate::engine::EngineAdapter;
use crate::entropy::EntropySource;
use crate::selftest;

/// Crypto services exposed to the network stack.
#[derive(Debug)]
pub struct OsifCrypto {
    engine: EngineAdapter,
    entropy: EntropySource,
    self_test: bool,
    aes_ready: bool,
}

impl OsifCrypto {
    /// Assemble the facade from explicit parts.
    pub fn new(backend: Backend, entropy: EntropySource, self_test: bool) -> Self {
        Self {
            engine: EngineAdapter::new(backend),
            entropy,
            self_test,
            aes_ready: false,
        }
    }

    /// Build the facade for `cfg` on the in-process platform models.
    ///
    /// The entropy mode is resolved here, once.
    pub fn from_config(cfg: &Config) -> Self {
        info!(
            backend = %cfg.crypto_backend,
            entropy_driver = cfg.entropy_driver,
            self_test = cfg.self_test,
            "configuring crypto adapter"
        );
        Self::new(
            Backend::emulated(cfg.crypto_backend),
            EntropySource::resolve(cfg.entropy_driver),
            cfg.self_test,
        )
    }

    /// The configured backend.
    pub fn backend(&self) -> BackendKind {
        self.engine.kind()
    }

    /// The entropy mode resolved at construction.
    pub fn entropy_mode(&self) -> EntropyMode {
        self.entropy.mode()
    }

    /// Returns `true` once `initialize_aes` has succeeded.
    pub fn is_aes_ready(&self) -> bool {
        self.aes_ready
    }

    /// Reserved for future entropy-device setup. Always succeeds.
    pub fn initialize_rng(&mut self) {
        trace!("initialize_rng: nothing to do");
    }

    /// A 32-bit seed for the stack's PRNG.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Entropy`] if the declared secure device fails.
    pub fn random_seed(&self) -> Result<u32, CryptoError> {
        self.entropy.seed()
    }

    /// Acquire the backend handle and, if configured, run the known-answer test.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Initialization`] if the backend cannot be made
    /// ready or the self-test disagrees with the published vectors.
    pub fn initialize_aes(&mut self) -> Result<(), CryptoError> {
        if self.aes_ready {
            debug!(backend = %self.engine.kind(), "initialize_aes called again; ignoring");
            return Ok(());
        }
        self.engine.initialize()?;

        // Encryption stays refused until the engine has also proven itself.
        if self.self_test {
            let vectors = selftest::run_known_answer(&self.engine)?;
            info!(backend = %self.engine.kind(), vectors, "AES known-answer test passed");
        }
        self.aes_ready = true;
        Ok(())
    }

    /// Encrypt one block on behalf of the host stack.
    ///
    /// Each buffer must be present and exactly 16 bytes. `out` is written only
    /// on success; on any error it is left untouched.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidArgument`] for a missing or wrongly sized buffer.
    /// - [`CryptoError::NotInitialized`] before `initialize_aes`.
    /// - [`CryptoError::BackendOperation`] if the engine fails.
    pub fn encrypt_block(
        &self,
        key: Option<&[u8]>,
        plaintext: Option<&[u8]>,
        out: Option<&mut [u8]>,
    ) -> Result<(), CryptoError> {
        let (Some(key), Some(plaintext), Some(out)) = (key, plaintext, out) else {
            return Err(CryptoError::InvalidArgument("NULL argument passed".into()));
        };

        let key = Key::try_from(key).map_err(|len| {
            CryptoError::InvalidArgument(format!("key must be {KEY_LEN} bytes, got {len}"))
        })?;
        let plaintext = Block::try_from(plaintext).map_err(|len| {
            CryptoError::InvalidArgument(format!("plaintext must be {BLOCK_LEN} bytes, got {len}"))
        })?;
        if out.len() != BLOCK_LEN {
            return Err(CryptoError::InvalidArgument(format!(
                "output must be {BLOCK_LEN} bytes, got {}",
                out.len()
            )));
        }

        let ciphertext = self.encrypt(&key, &plaintext)?;
        out.copy_from_slice(ciphertext.as_bytes());
        Ok(())
    }

    /// Typed single-block encryption.
    ///
    /// # Errors
    ///
    /// As [`encrypt_block`](Self::encrypt_block), minus argument validation.
    pub fn encrypt(&self, key: &Key, plaintext: &Block) -> Result<Block, CryptoError> {
        if !self.aes_ready {
            return Err(CryptoError::NotInitialized);
        }
        let result = self.engine.encrypt(key, plaintext);
        if let Err(e) = &result {
            debug!(backend = %self.engine.kind(), code = e.code(), "block encryption failed");
        }
        result
    }
}
