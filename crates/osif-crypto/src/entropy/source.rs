//! [`EntropySource`]: secure device with an explicit best-effort fallback.

use std::process;
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use common::{CryptoError, EntropyMode};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use tracing::{info, warn};

use super::{EntropyDevice, OsEntropy};

enum Generator {
    Secure(Box<dyn EntropyDevice>),
    BestEffort(Mutex<SmallRng>),
}

/// Supplies 32-bit seeds from the generator resolved at startup.
pub struct EntropySource {
    generator: Generator,
}

impl EntropySource {
    /// Resolve the generator once, from the platform's declaration.
    ///
    /// With `device_declared == false` the source falls back to a
    /// non-cryptographic PRNG and emits a `warn` event saying so.
    pub fn resolve(device_declared: bool) -> Self {
        if device_declared {
            info!(entropy_mode = "secure", "seeding from secure entropy device");
            Self::secure(Box::new(OsEntropy))
        } else {
            warn!(
                entropy_mode = "best_effort",
                "entropy driver required to generate cryptographically secure random numbers; \
                 falling back to a non-cryptographic generator"
            );
            Self::best_effort()
        }
    }

    /// Seed from the given secure device.
    pub fn secure(device: Box<dyn EntropyDevice>) -> Self {
        Self {
            generator: Generator::Secure(device),
        }
    }

    /// Seed from a non-cryptographic PRNG, itself seeded from the wall clock
    /// and process id.
    pub fn best_effort() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let seed = nanos ^ (u64::from(process::id()) << 32);
        Self {
            generator: Generator::BestEffort(Mutex::new(SmallRng::seed_from_u64(seed))),
        }
    }

    /// The mode this source was resolved to.
    pub fn mode(&self) -> EntropyMode {
        match self.generator {
            Generator::Secure(_) => EntropyMode::Secure,
            Generator::BestEffort(_) => EntropyMode::BestEffort,
        }
    }

    /// Produce a full-range 32-bit seed.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Entropy`] if the secure device fails. There is
    /// no fallback at this point: the mode was fixed at startup.
    pub fn seed(&self) -> Result<u32, CryptoError> {
        match &self.generator {
            Generator::Secure(device) => {
                let mut buf = [0u8; 4];
                device
                    .fill(&mut buf)
                    .map_err(|e| CryptoError::Entropy(e.to_string()))?;
                Ok(u32::from_ne_bytes(buf))
            }
            Generator::BestEffort(rng) => {
                Ok(rng.lock().unwrap_or_else(PoisonError::into_inner).next_u32())
            }
        }
    }
}

impl std::fmt::Debug for EntropySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropySource")
            .field("mode", &self.mode())
            .finish()
    }
}
