//! Dedicated AES-ECB accelerator driven through a cipher-session API.
//!
//! Every encryption opens a fresh session configured for a raw key,
//! synchronous operation and separate input/output buffers, runs exactly one
//! block operation, and frees the session again, including on failure.

use std::ops::BitOr;

use common::{BackendKind, Block, CryptoError, Key};
use thiserror::Error;
use tracing::debug;

use super::{sealed, BlockCipherBackend};

/// Capability flags requested when opening a cipher session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherCaps(u8);

impl CipherCaps {
    /// The key is passed as raw bytes rather than a key-store reference.
    pub const RAW_KEY: Self = Self(1 << 0);
    /// Input and output live in different buffers.
    pub const SEPARATE_IO_BUFS: Self = Self(1 << 1);
    /// The operation completes before the call returns.
    pub const SYNC_OPS: Self = Self(1 << 2);

    /// No capabilities.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns `true` if every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CipherCaps {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Block cipher algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherAlgo {
    Aes,
}

/// Block cipher mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    Ecb,
}

/// Direction of a cipher session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherOp {
    Encrypt,
    Decrypt,
}

/// Everything a session needs besides the key itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub caps: CipherCaps,
    pub algo: CipherAlgo,
    pub mode: CipherMode,
    pub op: CipherOp,
}

/// The only session shape this adapter ever opens.
pub const ECB_ENCRYPT_SESSION: SessionConfig = SessionConfig {
    caps: CipherCaps(
        CipherCaps::RAW_KEY.0 | CipherCaps::SEPARATE_IO_BUFS.0 | CipherCaps::SYNC_OPS.0,
    ),
    algo: CipherAlgo::Aes,
    mode: CipherMode::Ecb,
    op: CipherOp::Encrypt,
};

/// Opaque handle for an open cipher session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u32);

/// Errors reported by a cipher device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device has not finished probing or is powered down.
    #[error("device not ready")]
    NotReady,

    /// The device supports a single session and one is already open.
    #[error("device busy: a session is already open")]
    Busy,

    /// The requested capabilities, algorithm, or mode are not supported.
    #[error("unsupported session configuration")]
    Unsupported,

    /// The session handle does not refer to an open session.
    #[error("unknown session {0:?}")]
    UnknownSession(SessionId),

    /// Driver-level failure with a platform error code.
    #[error("device I/O error (code {0})")]
    Io(i32),
}

/// Session-oriented cipher device, e.g. an on-chip AES-ECB peripheral.
#[cfg_attr(test, mockall::automock)]
pub trait CipherDevice: Send + Sync {
    /// Readiness signal consumed once during acquisition.
    fn is_ready(&self) -> bool;

    /// Open a session bound to `key`.
    fn begin_session(&self, key: &Key, config: SessionConfig) -> Result<SessionId, DeviceError>;

    /// Process one block within an open session.
    fn block_op(
        &self,
        session: SessionId,
        input: &Block,
        output: &mut Block,
    ) -> Result<(), DeviceError>;

    /// Release a session and any key material the device copied into it.
    fn free_session(&self, session: SessionId);
}

/// Frees the wrapped session when dropped.
struct OpenSession<'d> {
    device: &'d dyn CipherDevice,
    id: SessionId,
}

impl Drop for OpenSession<'_> {
    fn drop(&mut self) {
        self.device.free_session(self.id);
    }
}

/// Hardware accelerator backend: owns the device handle.
pub struct HardwareAccelerator {
    device: Box<dyn CipherDevice>,
}

impl HardwareAccelerator {
    /// Wrap a cipher device. Readiness is checked later, in `acquire`.
    pub fn new(device: Box<dyn CipherDevice>) -> Self {
        Self { device }
    }

    fn op_error(stage: &str, err: DeviceError) -> CryptoError {
        CryptoError::BackendOperation {
            backend: BackendKind::HardwareAccelerator,
            reason: format!("{stage}: {err}"),
        }
    }
}

impl sealed::Sealed for HardwareAccelerator {}

impl BlockCipherBackend for HardwareAccelerator {
    fn kind(&self) -> BackendKind {
        BackendKind::HardwareAccelerator
    }

    fn acquire(&mut self) -> Result<(), CryptoError> {
        if !self.device.is_ready() {
            return Err(CryptoError::Initialization {
                backend: BackendKind::HardwareAccelerator,
                reason: "crypto driver not found or not ready".into(),
            });
        }
        debug!("cipher device ready");
        Ok(())
    }

    fn encrypt_block(&self, key: &Key, plaintext: &Block) -> Result<Block, CryptoError> {
        let id = self
            .device
            .begin_session(key, ECB_ENCRYPT_SESSION)
            .map_err(|e| Self::op_error("session init", e))?;
        let session = OpenSession {
            device: self.device.as_ref(),
            id,
        };

        let mut out = Block::default();
        self.device
            .block_op(session.id, plaintext, &mut out)
            .map_err(|e| Self::op_error("block operation", e))?;

        drop(session);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn key() -> Key {
        Key::new([0x11; 16])
    }

    #[test]
    fn ecb_session_requests_raw_sync_separate_buffers() {
        let caps = ECB_ENCRYPT_SESSION.caps;
        assert!(caps.contains(CipherCaps::RAW_KEY));
        assert!(caps.contains(CipherCaps::SYNC_OPS));
        assert!(caps.contains(CipherCaps::SEPARATE_IO_BUFS));
        assert!(!CipherCaps::empty().contains(CipherCaps::RAW_KEY));
        assert_eq!(
            CipherCaps::RAW_KEY | CipherCaps::SYNC_OPS | CipherCaps::SEPARATE_IO_BUFS,
            caps
        );
    }

    #[test]
    fn acquire_fails_when_device_not_ready() {
        let mut dev = MockCipherDevice::new();
        dev.expect_is_ready().return_const(false);
        let mut backend = HardwareAccelerator::new(Box::new(dev));
        let err = backend.acquire().unwrap_err();
        assert!(matches!(err, CryptoError::Initialization { .. }));
    }

    #[test]
    fn session_opened_used_and_freed() {
        let mut dev = MockCipherDevice::new();
        dev.expect_begin_session()
            .withf(|_, cfg| *cfg == ECB_ENCRYPT_SESSION)
            .times(1)
            .returning(|_, _| Ok(SessionId(7)));
        dev.expect_block_op()
            .withf(|id, _, _| *id == SessionId(7))
            .times(1)
            .returning(|_, _, out| {
                *out = Block::new([0xC3; 16]);
                Ok(())
            });
        dev.expect_free_session()
            .with(eq(SessionId(7)))
            .times(1)
            .return_const(());

        let backend = HardwareAccelerator::new(Box::new(dev));
        let ct = backend.encrypt_block(&key(), &Block::default()).unwrap();
        assert_eq!(ct, Block::new([0xC3; 16]));
    }

    #[test]
    fn block_op_failure_still_frees_session() {
        let mut dev = MockCipherDevice::new();
        dev.expect_begin_session().returning(|_, _| Ok(SessionId(1)));
        dev.expect_block_op()
            .returning(|_, _, _| Err(DeviceError::Io(-5)));
        dev.expect_free_session()
            .with(eq(SessionId(1)))
            .times(1)
            .return_const(());

        let backend = HardwareAccelerator::new(Box::new(dev));
        let err = backend.encrypt_block(&key(), &Block::default()).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::BackendOperation {
                backend: BackendKind::HardwareAccelerator,
                ..
            }
        ));
        assert!(err.to_string().contains("block operation"));
    }

    #[test]
    fn session_init_failure_skips_block_op() {
        let mut dev = MockCipherDevice::new();
        dev.expect_begin_session()
            .returning(|_, _| Err(DeviceError::Busy));
        dev.expect_block_op().never();
        dev.expect_free_session().never();

        let backend = HardwareAccelerator::new(Box::new(dev));
        let err = backend.encrypt_block(&key(), &Block::default()).unwrap_err();
        assert!(err.to_string().contains("session init"));
    }
}
