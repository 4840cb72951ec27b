//! Fixed-size buffers and selection enums exchanged between the host stack,
//! the engine adapter, and the backends.

use std::fmt;

use serde::{Deserialize, Serialize};

/// AES-128 key length in bytes.
pub const KEY_LEN: usize = 16;

/// AES block length in bytes.
pub const BLOCK_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// A caller-supplied AES-128 key, borrowed for the duration of one call.
///
/// The buffer is overwritten with zeroes on drop and is never printed, not
/// even in debug builds. It is deliberately not `Clone`.
pub struct Key([u8; KEY_LEN]);

impl Key {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes for handing to a cipher engine.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Key {
    type Error = usize;

    /// Copies `bytes` into a key; the error carries the offending length.
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; KEY_LEN] = bytes.try_into().map_err(|_| bytes.len())?;
        Ok(Self(arr))
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// One 16-byte plaintext or ciphertext block.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Block([u8; BLOCK_LEN]);

impl Block {
    /// Wrap raw block bytes.
    pub const fn new(bytes: [u8; BLOCK_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrow the block bytes.
    pub fn as_bytes(&self) -> &[u8; BLOCK_LEN] {
        &self.0
    }

    /// Mutably borrow the block bytes (used by engines writing output).
    pub fn as_bytes_mut(&mut self) -> &mut [u8; BLOCK_LEN] {
        &mut self.0
    }

    /// Consume the block, returning its bytes.
    pub fn into_bytes(self) -> [u8; BLOCK_LEN] {
        self.0
    }
}

impl TryFrom<&[u8]> for Block {
    type Error = usize;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; BLOCK_LEN] = bytes.try_into().map_err(|_| bytes.len())?;
        Ok(Self(arr))
    }
}

impl From<[u8; BLOCK_LEN]> for Block {
    fn from(bytes: [u8; BLOCK_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Block(")?;
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        f.write_str(")")
    }
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

/// The cipher engine chosen for the lifetime of a process.
///
/// Exactly one value is configured; the set is closed so that every `match`
/// over it is checked for exhaustiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Dedicated AES-ECB peripheral driven through a session API.
    HardwareAccelerator,
    /// The radio controller's built-in encryption primitive.
    ControllerCrypto,
    /// Portable in-process AES-128.
    SoftwareLibrary,
    /// Key-managing platform security service (PSA-style).
    PlatformSecurityService,
}

impl BackendKind {
    /// All variants, in declaration order.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::HardwareAccelerator,
        BackendKind::ControllerCrypto,
        BackendKind::SoftwareLibrary,
        BackendKind::PlatformSecurityService,
    ];

    /// The configuration name of this backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::HardwareAccelerator => "hardware_accelerator",
            BackendKind::ControllerCrypto => "controller_crypto",
            BackendKind::SoftwareLibrary => "software_library",
            BackendKind::PlatformSecurityService => "platform_security_service",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entropy
// ---------------------------------------------------------------------------

/// Which generator backs `random_seed`, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntropyMode {
    /// A cryptographically secure entropy device.
    Secure,
    /// Degraded-security mode: a non-cryptographic PRNG.
    BestEffort,
}

impl EntropyMode {
    /// Returns `true` for the degraded-security fallback.
    pub fn is_degraded(&self) -> bool {
        matches!(self, EntropyMode::BestEffort)
    }
}

// ---------------------------------------------------------------------------
// Self-test report
// ---------------------------------------------------------------------------

/// Outcome of the `osif-selftest` run, printed as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfTestReport {
    /// Overall status: `"ok"` or `"failed"`.
    pub status: String,
    /// Backend that was exercised.
    pub backend: BackendKind,
    /// Entropy mode resolved at startup.
    pub entropy: EntropyMode,
    /// Number of known-answer vectors that matched.
    pub vectors_passed: usize,
    /// Number of known-answer vectors run.
    pub vectors_total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_redacted_in_debug() {
        let key = Key::new([0xAB; KEY_LEN]);
        let s = format!("{key:?}");
        assert!(s.contains("REDACTED"));
        assert!(!s.to_lowercase().contains("ab"));
    }

    #[test]
    fn key_rejects_wrong_length() {
        assert_eq!(Key::try_from(&[0u8; 15][..]).unwrap_err(), 15);
        assert!(Key::try_from(&[0u8; KEY_LEN][..]).is_ok());
    }

    #[test]
    fn block_rejects_wrong_length() {
        assert_eq!(Block::try_from(&[0u8; 17][..]).unwrap_err(), 17);
    }

    #[test]
    fn block_debug_is_hex() {
        let mut bytes = [0u8; BLOCK_LEN];
        bytes[0] = 0x66;
        bytes[1] = 0xe9;
        assert!(format!("{:?}", Block::new(bytes)).starts_with("Block(66e9"));
    }

    #[test]
    fn backend_kind_names_match_serde() {
        for kind in BackendKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn unknown_backend_name_rejected() {
        assert!(serde_json::from_str::<BackendKind>("\"quantum\"").is_err());
    }

    #[test]
    fn self_test_report_serde() {
        let r = SelfTestReport {
            status: "ok".into(),
            backend: BackendKind::SoftwareLibrary,
            entropy: EntropyMode::BestEffort,
            vectors_passed: 3,
            vectors_total: 3,
        };
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"best_effort\""));
        let decoded: SelfTestReport = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.vectors_passed, 3);
    }
}
