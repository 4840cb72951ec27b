//! Power-on known-answer test for the configured AES engine.

use common::{Block, CryptoError, Key, BLOCK_LEN, KEY_LEN};
use tracing::{debug, error};

use crate::engine::EngineAdapter;

/// A published AES-128 ECB test vector.
#[derive(Debug, Clone, Copy)]
pub struct KnownAnswer {
    pub name: &'static str,
    pub key: [u8; KEY_LEN],
    pub plaintext: [u8; BLOCK_LEN],
    pub ciphertext: [u8; BLOCK_LEN],
}

/// FIPS-197 and SP 800-38A AES-128 vectors.
pub const FIPS197_VECTORS: &[KnownAnswer] = &[
    KnownAnswer {
        name: "all-zero",
        key: [0x00; KEY_LEN],
        plaintext: [0x00; BLOCK_LEN],
        ciphertext: [
            0x66, 0xe9, 0x4b, 0xd4, 0xef, 0x8a, 0x2c, 0x3b, 0x88, 0x4c, 0xfa, 0x59, 0xca, 0x34,
            0x2b, 0x2e,
        ],
    },
    KnownAnswer {
        name: "fips197-appendix-b",
        key: [
            0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf,
            0x4f, 0x3c,
        ],
        plaintext: [
            0x32, 0x43, 0xf6, 0xa8, 0x88, 0x5a, 0x30, 0x8d, 0x31, 0x31, 0x98, 0xa2, 0xe0, 0x37,
            0x07, 0x34,
        ],
        ciphertext: [
            0x39, 0x25, 0x84, 0x1d, 0x02, 0xdc, 0x09, 0xfb, 0xdc, 0x11, 0x85, 0x97, 0x19, 0x6a,
            0x0b, 0x32,
        ],
    },
    KnownAnswer {
        name: "fips197-appendix-c1",
        key: [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ],
        plaintext: [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ],
        ciphertext: [
            0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4,
            0xc5, 0x5a,
        ],
    },
    KnownAnswer {
        name: "sp800-38a-ecb-block1",
        key: [
            0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf,
            0x4f, 0x3c,
        ],
        plaintext: [
            0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, 0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93,
            0x17, 0x2a,
        ],
        ciphertext: [
            0x3a, 0xd7, 0x7b, 0xb4, 0x0d, 0x7a, 0x36, 0x60, 0xa8, 0x9e, 0xca, 0xf3, 0x24, 0x66,
            0xef, 0x97,
        ],
    },
];

/// Run every vector through `engine`.
///
/// Returns the number of vectors checked.
///
/// # Errors
///
/// Propagates engine failures unchanged and turns the first mismatch into
/// [`CryptoError::Initialization`].
pub fn run_known_answer(engine: &EngineAdapter) -> Result<usize, CryptoError> {
    for v in FIPS197_VECTORS {
        let ct = engine.encrypt(&Key::new(v.key), &Block::new(v.plaintext))?;
        if ct.into_bytes() != v.ciphertext {
            error!(backend = %engine.kind(), vector = v.name, "known-answer test mismatch");
            return Err(CryptoError::Initialization {
                backend: engine.kind(),
                reason: format!("known-answer test {} failed", v.name),
            });
        }
        debug!(vector = v.name, "known-answer vector passed");
    }
    Ok(FIPS197_VECTORS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::controller::MockRadioController;
    use crate::backend::{Backend, ControllerCrypto};
    use common::BackendKind;

    #[test]
    fn every_emulated_backend_passes() {
        for kind in BackendKind::ALL {
            let mut engine = EngineAdapter::new(Backend::emulated(kind));
            engine.initialize().unwrap();
            assert_eq!(run_known_answer(&engine).unwrap(), FIPS197_VECTORS.len());
        }
    }

    #[test]
    fn wrong_ciphertext_fails_initialization() {
        let mut ctl = MockRadioController::new();
        ctl.expect_encrypt_be().returning(|_, _| Ok(Block::default()));
        let mut engine =
            EngineAdapter::new(Backend::ControllerCrypto(ControllerCrypto::new(Box::new(ctl))));
        engine.initialize().unwrap();
        let err = run_known_answer(&engine).unwrap_err();
        assert!(matches!(err, CryptoError::Initialization { .. }));
        assert!(err.to_string().contains("all-zero"));
    }

    #[test]
    fn uninitialised_engine_propagates_not_initialized() {
        let engine = EngineAdapter::new(Backend::emulated(BackendKind::SoftwareLibrary));
        assert!(matches!(
            run_known_answer(&engine),
            Err(CryptoError::NotInitialized)
        ));
    }
}
