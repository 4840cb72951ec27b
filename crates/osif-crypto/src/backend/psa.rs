//! Encryption through a key-managing platform security service.
//!
//! # Key handling
//!
//! Each call imports the caller's key as a volatile AES-128 key restricted to
//! ECB without padding, runs one cipher operation, and destroys the key before
//! returning, whether or not the operation succeeded. No key identifier
//! outlives a single `encrypt_block` call.

use std::ops::BitOr;

use common::{BackendKind, Block, CryptoError, Key, BLOCK_LEN, KEY_LEN};
use thiserror::Error;
use tracing::{debug, error};

use super::{sealed, BlockCipherBackend};

/// Permitted usages of an imported key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(u32);

impl KeyUsage {
    pub const ENCRYPT: Self = Self(0x0000_0100);
    pub const DECRYPT: Self = Self(0x0000_0200);

    /// Returns `true` if every usage in `other` is permitted.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for KeyUsage {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Where an imported key lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLifetime {
    /// RAM only; gone on destroy or reset.
    Volatile,
    Persistent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Aes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherAlgorithm {
    EcbNoPadding,
}

/// Attributes attached to a key at import time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAttributes {
    pub usage: KeyUsage,
    pub lifetime: KeyLifetime,
    pub algorithm: CipherAlgorithm,
    pub key_type: KeyType,
    pub bits: u16,
}

impl KeyAttributes {
    /// Volatile AES-128 key usable for ECB encrypt/decrypt without padding.
    pub const fn aes128_ecb_volatile() -> Self {
        Self {
            usage: KeyUsage(KeyUsage::ENCRYPT.0 | KeyUsage::DECRYPT.0),
            lifetime: KeyLifetime::Volatile,
            algorithm: CipherAlgorithm::EcbNoPadding,
            key_type: KeyType::Aes,
            bits: (KEY_LEN * 8) as u16,
        }
    }
}

/// Identifier of a key resident in the security service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyId(pub u32);

/// Status codes returned by the security service.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PsaStatus {
    #[error("service not initialised")]
    BadState,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("not supported")]
    NotSupported,
    #[error("not permitted by key policy")]
    NotPermitted,
    #[error("invalid key handle")]
    InvalidHandle,
    #[error("output buffer too small")]
    BufferTooSmall,
    #[error("insufficient key slots")]
    InsufficientMemory,
    #[error("communication failure with secure processor")]
    CommunicationFailure,
}

/// Key-managing crypto service (PSA Crypto style).
#[cfg_attr(test, mockall::automock)]
pub trait SecurityService: Send + Sync {
    /// Bring the service up. Called once, from `acquire`.
    fn crypto_init(&self) -> Result<(), PsaStatus>;

    /// Import raw key material under `attributes`.
    fn import_key(&self, attributes: &KeyAttributes, material: &[u8]) -> Result<KeyId, PsaStatus>;

    /// Encrypt `input` into `output`, returning the number of bytes written.
    fn cipher_encrypt(
        &self,
        key: KeyId,
        algorithm: CipherAlgorithm,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, PsaStatus>;

    /// Destroy a key and wipe its material.
    fn destroy_key(&self, key: KeyId) -> Result<(), PsaStatus>;
}

/// Platform-security-service backend.
pub struct PlatformSecurityService {
    service: Box<dyn SecurityService>,
}

impl PlatformSecurityService {
    pub fn new(service: Box<dyn SecurityService>) -> Self {
        Self { service }
    }

    fn op_error(stage: &str, status: PsaStatus) -> CryptoError {
        CryptoError::BackendOperation {
            backend: BackendKind::PlatformSecurityService,
            reason: format!("{stage}: {status}"),
        }
    }
}

impl sealed::Sealed for PlatformSecurityService {}

impl BlockCipherBackend for PlatformSecurityService {
    fn kind(&self) -> BackendKind {
        BackendKind::PlatformSecurityService
    }

    fn acquire(&mut self) -> Result<(), CryptoError> {
        self.service
            .crypto_init()
            .map_err(|status| CryptoError::Initialization {
                backend: BackendKind::PlatformSecurityService,
                reason: format!("cannot initialise security service: {status}"),
            })?;
        debug!("security service initialised");
        Ok(())
    }

    fn encrypt_block(&self, key: &Key, plaintext: &Block) -> Result<Block, CryptoError> {
        let attributes = KeyAttributes::aes128_ecb_volatile();
        let key_id = self
            .service
            .import_key(&attributes, key.as_bytes())
            .map_err(|s| Self::op_error("key import", s))?;

        let mut out = Block::default();
        let written = self.service.cipher_encrypt(
            key_id,
            CipherAlgorithm::EcbNoPadding,
            plaintext.as_bytes(),
            out.as_bytes_mut(),
        );

        let destroyed = self.service.destroy_key(key_id);
        if let Err(status) = destroyed {
            error!(key_id = key_id.0, %status, "failed to destroy imported key");
        }

        let written = written.map_err(|s| Self::op_error("cipher encrypt", s))?;
        destroyed.map_err(|s| Self::op_error("key destroy", s))?;

        if written != BLOCK_LEN {
            return Err(CryptoError::BackendOperation {
                backend: BackendKind::PlatformSecurityService,
                reason: format!("short output: expected {BLOCK_LEN} bytes, got {written}"),
            });
        }
        Ok(out)
    }
}
