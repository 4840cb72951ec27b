//! Model of a Bluetooth link-layer controller's AES-128 primitive.

use common::{Block, Key};

use crate::backend::software::aes128_ecb_encrypt;
use crate::backend::{ControllerError, RadioController};

/// Controller model computing `encrypt_be` in software.
#[derive(Debug, Default)]
pub struct EmulatedController;

impl EmulatedController {
    pub fn new() -> Self {
        Self
    }
}

impl RadioController for EmulatedController {
    fn encrypt_be(&self, key: &Key, plaintext: &Block) -> Result<Block, ControllerError> {
        Ok(aes128_ecb_encrypt(key, plaintext))
    }
}
