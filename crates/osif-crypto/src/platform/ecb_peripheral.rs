//! Model of an on-chip AES-ECB peripheral.
//!
//! Like the silicon it stands in for, the peripheral holds at most one open
//! session; a second `begin_session` before `free_session` reports
//! [`DeviceError::Busy`]. The session keeps the expanded key schedule, which
//! is wiped when the session is freed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use common::{Block, Key};

use crate::backend::hw_accel::{CipherCaps, CipherOp, SessionConfig, ECB_ENCRYPT_SESSION};
use crate::backend::{CipherDevice, DeviceError, SessionId};

const SUPPORTED_CAPS: CipherCaps = ECB_ENCRYPT_SESSION.caps;

/// Single-session AES-128 ECB encryption peripheral.
pub struct EcbPeripheral {
    ready: AtomicBool,
    next_id: AtomicU32,
    sessions: Mutex<HashMap<SessionId, Aes128>>,
}

impl EcbPeripheral {
    /// A probed, powered peripheral.
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
            next_id: AtomicU32::new(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// A peripheral whose driver failed to probe.
    pub fn unready() -> Self {
        let dev = Self::new();
        dev.ready.store(false, Ordering::SeqCst);
        dev
    }

    /// Number of sessions currently open.
    pub fn open_sessions(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for EcbPeripheral {
    fn default() -> Self {
        Self::new()
    }
}

impl CipherDevice for EcbPeripheral {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn begin_session(&self, key: &Key, config: SessionConfig) -> Result<SessionId, DeviceError> {
        if !self.is_ready() {
            return Err(DeviceError::NotReady);
        }
        // Encrypt-only block: no inverse cipher in the hardware.
        if !SUPPORTED_CAPS.contains(config.caps) || config.op != CipherOp::Encrypt {
            return Err(DeviceError::Unsupported);
        }

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if !sessions.is_empty() {
            return Err(DeviceError::Busy);
        }
        let id = SessionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        sessions.insert(id, Aes128::new(GenericArray::from_slice(key.as_bytes())));
        Ok(id)
    }

    fn block_op(
        &self,
        session: SessionId,
        input: &Block,
        output: &mut Block,
    ) -> Result<(), DeviceError> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let cipher = sessions
            .get(&session)
            .ok_or(DeviceError::UnknownSession(session))?;

        let mut buf = GenericArray::clone_from_slice(input.as_bytes());
        cipher.encrypt_block(&mut buf);
        output.as_bytes_mut().copy_from_slice(&buf);
        Ok(())
    }

    fn free_session(&self, session: SessionId) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session);
    }
}
