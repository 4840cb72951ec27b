//! The four interchangeable cipher engines and the tagged variant that holds
//! whichever one was configured.
//!
//! Every engine satisfies the same contract: synchronous, deterministic,
//! standard AES-128 ECB on exactly one 16-byte block. The set of engines is
//! closed: [`BlockCipherBackend`] is sealed, and [`Backend`] matches over all
//! four variants exhaustively.

pub mod controller;
pub mod hw_accel;
pub mod psa;
pub mod software;

pub use controller::{ControllerCrypto, ControllerError, RadioController};
pub use hw_accel::{CipherDevice, DeviceError, HardwareAccelerator, SessionId};
pub use psa::{PlatformSecurityService, PsaStatus, SecurityService};
pub use software::SoftwareLibrary;

use common::{BackendKind, Block, CryptoError, Key};

use crate::platform::{EcbPeripheral, EmulatedController, VolatileKeyStore};

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Single-block AES-128 encryption capability shared by every engine.
pub trait BlockCipherBackend: sealed::Sealed + Send + Sync {
    /// Which configured engine this is.
    fn kind(&self) -> BackendKind;

    /// Acquire the device/service handle or verify it is ready.
    ///
    /// Called exactly once by the engine adapter, before the first
    /// encryption.
    fn acquire(&mut self) -> Result<(), CryptoError>;

    /// Encrypt one block. The key is borrowed for this call only.
    fn encrypt_block(&self, key: &Key, plaintext: &Block) -> Result<Block, CryptoError>;
}

/// The configured engine.
pub enum Backend {
    HardwareAccelerator(HardwareAccelerator),
    ControllerCrypto(ControllerCrypto),
    SoftwareLibrary(SoftwareLibrary),
    PlatformSecurityService(PlatformSecurityService),
}

impl Backend {
    /// Build the engine for `kind` on top of the in-process platform models.
    pub fn emulated(kind: BackendKind) -> Self {
        match kind {
            BackendKind::HardwareAccelerator => Backend::HardwareAccelerator(
                HardwareAccelerator::new(Box::new(EcbPeripheral::new())),
            ),
            BackendKind::ControllerCrypto => Backend::ControllerCrypto(ControllerCrypto::new(
                Box::new(EmulatedController::new()),
            )),
            BackendKind::SoftwareLibrary => Backend::SoftwareLibrary(SoftwareLibrary::new()),
            BackendKind::PlatformSecurityService => Backend::PlatformSecurityService(
                PlatformSecurityService::new(Box::new(VolatileKeyStore::new())),
            ),
        }
    }

    fn inner(&self) -> &dyn BlockCipherBackend {
        match self {
            Backend::HardwareAccelerator(b) => b,
            Backend::ControllerCrypto(b) => b,
            Backend::SoftwareLibrary(b) => b,
            Backend::PlatformSecurityService(b) => b,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn BlockCipherBackend {
        match self {
            Backend::HardwareAccelerator(b) => b,
            Backend::ControllerCrypto(b) => b,
            Backend::SoftwareLibrary(b) => b,
            Backend::PlatformSecurityService(b) => b,
        }
    }
}

impl sealed::Sealed for Backend {}

impl BlockCipherBackend for Backend {
    fn kind(&self) -> BackendKind {
        self.inner().kind()
    }

    fn acquire(&mut self) -> Result<(), CryptoError> {
        self.inner_mut().acquire()
    }

    fn encrypt_block(&self, key: &Key, plaintext: &Block) -> Result<Block, CryptoError> {
        self.inner().encrypt_block(key, plaintext)
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Backend").field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selftest::FIPS197_VECTORS;

    #[test]
    fn emulated_backend_reports_its_kind() {
        for kind in BackendKind::ALL {
            assert_eq!(Backend::emulated(kind).kind(), kind);
        }
    }

    #[test]
    fn all_backends_agree_on_fips197_vectors() {
        let mut backends: Vec<Backend> = BackendKind::ALL
            .into_iter()
            .map(Backend::emulated)
            .collect();
        for b in &mut backends {
            b.acquire().unwrap();
        }

        for v in FIPS197_VECTORS {
            for b in &backends {
                let ct = b
                    .encrypt_block(&Key::new(v.key), &Block::new(v.plaintext))
                    .unwrap();
                assert_eq!(ct.into_bytes(), v.ciphertext, "{} on {}", v.name, b.kind());
            }
        }
    }

    #[test]
    fn debug_does_not_expose_internals() {
        let b = Backend::emulated(BackendKind::SoftwareLibrary);
        assert_eq!(format!("{b:?}"), "Backend(SoftwareLibrary)");
    }
}
