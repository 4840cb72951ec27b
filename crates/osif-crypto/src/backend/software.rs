//! Portable in-process AES-128 ECB.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use common::{BackendKind, Block, CryptoError, Key};

use super::{sealed, BlockCipherBackend};

/// Software AES-128 backend. No session, no external device, cannot fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareLibrary;

impl SoftwareLibrary {
    /// Create the software backend.
    pub fn new() -> Self {
        Self
    }
}

impl sealed::Sealed for SoftwareLibrary {}

impl BlockCipherBackend for SoftwareLibrary {
    fn kind(&self) -> BackendKind {
        BackendKind::SoftwareLibrary
    }

    fn acquire(&mut self) -> Result<(), CryptoError> {
        Ok(())
    }

    fn encrypt_block(&self, key: &Key, plaintext: &Block) -> Result<Block, CryptoError> {
        Ok(aes128_ecb_encrypt(key, plaintext))
    }
}

/// Encrypt one block under `key` with AES-128.
///
/// The expanded key schedule lives only for this call and is zeroed on drop.
pub(crate) fn aes128_ecb_encrypt(key: &Key, input: &Block) -> Block {
    let cipher = Aes128::new(GenericArray::from_slice(key.as_bytes()));
    let mut buf = GenericArray::clone_from_slice(input.as_bytes());
    cipher.encrypt_block(&mut buf);

    let mut out = Block::default();
    out.as_bytes_mut().copy_from_slice(&buf);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selftest::FIPS197_VECTORS;

    #[test]
    fn matches_fips197_vectors() {
        let backend = SoftwareLibrary::new();
        for v in FIPS197_VECTORS {
            let ct = backend
                .encrypt_block(&Key::new(v.key), &Block::new(v.plaintext))
                .unwrap();
            assert_eq!(ct.into_bytes(), v.ciphertext, "vector {}", v.name);
        }
    }

    #[test]
    fn acquire_always_succeeds() {
        let mut backend = SoftwareLibrary::new();
        assert!(backend.acquire().is_ok());
        assert_eq!(backend.kind(), BackendKind::SoftwareLibrary);
    }
}
