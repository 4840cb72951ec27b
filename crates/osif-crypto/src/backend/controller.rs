//! Encryption delegated to the radio controller's native AES primitive.

use common::{BackendKind, Block, CryptoError, Key};
use thiserror::Error;

use super::{sealed, BlockCipherBackend};

/// Failure reported by the radio controller, with its status code.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("controller encryption failed (code {0})")]
pub struct ControllerError(pub i32);

/// A radio controller exposing big-endian single-block AES-128.
///
/// Big-endian here means key, plaintext, and ciphertext use standard FIPS-197
/// byte order, so results are directly comparable with every other backend.
#[cfg_attr(test, mockall::automock)]
pub trait RadioController: Send + Sync {
    /// Encrypt `plaintext` under `key`.
    fn encrypt_be(&self, key: &Key, plaintext: &Block) -> Result<Block, ControllerError>;
}

/// Controller-crypto backend. Stateless from the adapter's point of view.
pub struct ControllerCrypto {
    controller: Box<dyn RadioController>,
}

impl ControllerCrypto {
    pub fn new(controller: Box<dyn RadioController>) -> Self {
        Self { controller }
    }
}

impl sealed::Sealed for ControllerCrypto {}

impl BlockCipherBackend for ControllerCrypto {
    fn kind(&self) -> BackendKind {
        BackendKind::ControllerCrypto
    }

    // The controller is brought up by the radio stack, not by us.
    fn acquire(&mut self) -> Result<(), CryptoError> {
        Ok(())
    }

    fn encrypt_block(&self, key: &Key, plaintext: &Block) -> Result<Block, CryptoError> {
        self.controller
            .encrypt_be(key, plaintext)
            .map_err(|e| CryptoError::BackendOperation {
                backend: BackendKind::ControllerCrypto,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_controller_output_through() {
        let mut ctl = MockRadioController::new();
        ctl.expect_encrypt_be()
            .times(1)
            .returning(|_, pt| Ok(Block::new(pt.into_bytes().map(|b| b ^ 0xFF))));
        let backend = ControllerCrypto::new(Box::new(ctl));
        let ct = backend
            .encrypt_block(&Key::new([0; 16]), &Block::new([0x0F; 16]))
            .unwrap();
        assert_eq!(ct, Block::new([0xF0; 16]));
    }

    #[test]
    fn controller_failure_is_backend_operation_error() {
        let mut ctl = MockRadioController::new();
        ctl.expect_encrypt_be()
            .returning(|_, _| Err(ControllerError(-12)));
        let backend = ControllerCrypto::new(Box::new(ctl));
        let err = backend
            .encrypt_block(&Key::new([0; 16]), &Block::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CryptoError::BackendOperation {
                backend: BackendKind::ControllerCrypto,
                ..
            }
        ));
        assert!(err.to_string().contains("-12"));
    }
}
