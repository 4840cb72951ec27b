//! Model of a PSA-style security service holding volatile AES keys.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use common::{BLOCK_LEN, KEY_LEN};

use crate::backend::psa::{
    CipherAlgorithm, KeyAttributes, KeyId, KeyLifetime, KeyType, KeyUsage,
};
use crate::backend::{PsaStatus, SecurityService};

/// Number of simultaneously resident volatile keys.
const KEY_SLOTS: usize = 4;

struct Slot {
    cipher: Aes128,
    attributes: KeyAttributes,
}

/// Volatile key store with a small fixed number of key slots.
pub struct VolatileKeyStore {
    initialised: AtomicBool,
    fail_init: bool,
    next_id: AtomicU32,
    slots: Mutex<HashMap<KeyId, Slot>>,
}

impl VolatileKeyStore {
    pub fn new() -> Self {
        Self {
            initialised: AtomicBool::new(false),
            fail_init: false,
            next_id: AtomicU32::new(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// A service whose secure processor never answers `crypto_init`.
    pub fn unreachable() -> Self {
        Self {
            fail_init: true,
            ..Self::new()
        }
    }

    /// Number of keys currently resident.
    pub fn resident_keys(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for VolatileKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityService for VolatileKeyStore {
    fn crypto_init(&self) -> Result<(), PsaStatus> {
        if self.fail_init {
            return Err(PsaStatus::CommunicationFailure);
        }
        self.initialised.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn import_key(&self, attributes: &KeyAttributes, material: &[u8]) -> Result<KeyId, PsaStatus> {
        if !self.initialised.load(Ordering::SeqCst) {
            return Err(PsaStatus::BadState);
        }
        if attributes.key_type != KeyType::Aes || attributes.lifetime != KeyLifetime::Volatile {
            return Err(PsaStatus::NotSupported);
        }
        if material.len() != KEY_LEN || usize::from(attributes.bits) != KEY_LEN * 8 {
            return Err(PsaStatus::InvalidArgument);
        }

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.len() >= KEY_SLOTS {
            return Err(PsaStatus::InsufficientMemory);
        }
        let id = KeyId(self.next_id.fetch_add(1, Ordering::SeqCst));
        slots.insert(
            id,
            Slot {
                cipher: Aes128::new(GenericArray::from_slice(material)),
                attributes: *attributes,
            },
        );
        Ok(id)
    }

    fn cipher_encrypt(
        &self,
        key: KeyId,
        algorithm: CipherAlgorithm,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, PsaStatus> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.get(&key).ok_or(PsaStatus::InvalidHandle)?;

        if slot.attributes.algorithm != algorithm || !slot.attributes.usage.contains(KeyUsage::ENCRYPT) {
            return Err(PsaStatus::NotPermitted);
        }
        if input.len() % BLOCK_LEN != 0 {
            return Err(PsaStatus::InvalidArgument);
        }
        if output.len() < input.len() {
            return Err(PsaStatus::BufferTooSmall);
        }

        for (src, dst) in input
            .chunks_exact(BLOCK_LEN)
            .zip(output.chunks_exact_mut(BLOCK_LEN))
        {
            let mut buf = GenericArray::clone_from_slice(src);
            slot.cipher.encrypt_block(&mut buf);
            dst.copy_from_slice(&buf);
        }
        Ok(input.len())
    }

    fn destroy_key(&self, key: KeyId) -> Result<(), PsaStatus> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .map(|_| ())
            .ok_or(PsaStatus::InvalidHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_store() -> VolatileKeyStore {
        let store = VolatileKeyStore::new();
        store.crypto_init().unwrap();
        store
    }

    #[test]
    fn import_before_init_is_bad_state() {
        let store = VolatileKeyStore::new();
        assert_eq!(
            store.import_key(&KeyAttributes::aes128_ecb_volatile(), &[0; 16]),
            Err(PsaStatus::BadState)
        );
    }

    #[test]
    fn unreachable_service_fails_init() {
        assert_eq!(
            VolatileKeyStore::unreachable().crypto_init(),
            Err(PsaStatus::CommunicationFailure)
        );
    }

    #[test]
    fn rejects_wrong_key_length() {
        let store = ready_store();
        assert_eq!(
            store.import_key(&KeyAttributes::aes128_ecb_volatile(), &[0; 15]),
            Err(PsaStatus::InvalidArgument)
        );
    }

    #[test]
    fn slots_are_bounded_and_reclaimed() {
        let store = ready_store();
        let attrs = KeyAttributes::aes128_ecb_volatile();
        let ids: Vec<KeyId> = (0..KEY_SLOTS)
            .map(|_| store.import_key(&attrs, &[7; 16]).unwrap())
            .collect();
        assert_eq!(
            store.import_key(&attrs, &[7; 16]),
            Err(PsaStatus::InsufficientMemory)
        );
        for id in ids {
            store.destroy_key(id).unwrap();
        }
        assert_eq!(store.resident_keys(), 0);
    }

    #[test]
    fn destroyed_key_cannot_be_used() {
        let store = ready_store();
        let id = store
            .import_key(&KeyAttributes::aes128_ecb_volatile(), &[1; 16])
            .unwrap();
        store.destroy_key(id).unwrap();
        let mut out = [0u8; 16];
        assert_eq!(
            store.cipher_encrypt(id, CipherAlgorithm::EcbNoPadding, &[0; 16], &mut out),
            Err(PsaStatus::InvalidHandle)
        );
        assert_eq!(store.destroy_key(id), Err(PsaStatus::InvalidHandle));
    }

    #[test]
    fn small_output_buffer_rejected() {
        let store = ready_store();
        let id = store
            .import_key(&KeyAttributes::aes128_ecb_volatile(), &[1; 16])
            .unwrap();
        let mut out = [0u8; 8];
        assert_eq!(
            store.cipher_encrypt(id, CipherAlgorithm::EcbNoPadding, &[0; 16], &mut out),
            Err(PsaStatus::BufferTooSmall)
        );
    }
}
