//! Configuration loading and validation for the crypto adapter.
//!
//! Values are read from `OSIF_`-prefixed environment variables at startup.
//! Backend selection happens here, before any cipher code runs: a missing,
//! unknown, or multi-valued backend is rejected as
//! [`CryptoError::Configuration`].

use common::{BackendKind, CryptoError};
use serde::Deserialize;

/// Environment variable prefix, e.g. `OSIF_CRYPTO_BACKEND`.
pub const ENV_PREFIX: &str = "OSIF";

/// Validated adapter configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The single cipher engine for this process. **Required.**
    pub crypto_backend: BackendKind,

    /// Whether the platform declares a cryptographically secure entropy device.
    #[serde(default = "default_entropy_driver")]
    pub entropy_driver: bool,

    /// Run the FIPS-197 known-answer test during `initialize_aes`.
    #[serde(default = "default_self_test")]
    pub self_test: bool,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_entropy_driver() -> bool {
    true
}
fn default_self_test() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Configuration for `backend` with every other field at its default.
    pub fn for_backend(backend: BackendKind) -> Self {
        Self {
            crypto_backend: backend,
            entropy_driver: default_entropy_driver(),
            self_test: default_self_test(),
            log_level: default_log_level(),
        }
    }

    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Configuration`] if `OSIF_CRYPTO_BACKEND` is
    /// absent or does not name exactly one known backend, or if any other
    /// variable cannot be parsed.
    pub fn from_env() -> Result<Self, CryptoError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| {
                CryptoError::Configuration(format!(
                    "failed to build configuration from environment: {e}"
                ))
            })?;
        Self::from_config(cfg)
    }

    /// Deserialise and validate an already-built configuration.
    pub fn from_config(cfg: config::Config) -> Result<Self, CryptoError> {
        let c: Config = cfg.try_deserialize().map_err(|e| {
            CryptoError::Configuration(format!("failed to deserialise configuration: {e}"))
        })?;
        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<(), CryptoError> {
        if self.log_level.trim().is_empty() {
            return Err(CryptoError::Configuration(
                "LOG_LEVEL must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(pairs: &[(&str, &str)]) -> Result<Config, CryptoError> {
        let mut builder = config::Config::builder();
        for (k, v) in pairs {
            builder = builder.set_override(*k, *v).unwrap();
        }
        Config::from_config(builder.build().unwrap())
    }

    #[test]
    fn defaults_are_correct() {
        assert!(default_entropy_driver());
        assert!(default_self_test());
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn loads_each_backend_name() {
        for kind in BackendKind::ALL {
            let cfg = build(&[("crypto_backend", kind.as_str())]).unwrap();
            assert_eq!(cfg.crypto_backend, kind);
            assert!(cfg.entropy_driver);
        }
    }

    #[test]
    fn missing_backend_is_configuration_error() {
        let err = build(&[]).unwrap_err();
        assert!(matches!(err, CryptoError::Configuration(_)));
    }

    #[test]
    fn unknown_backend_is_configuration_error() {
        let err = build(&[("crypto_backend", "tpm")]).unwrap_err();
        assert!(matches!(err, CryptoError::Configuration(_)));
    }

    #[test]
    fn several_backends_is_configuration_error() {
        let err = build(&[(
            "crypto_backend",
            "software_library,hardware_accelerator",
        )])
        .unwrap_err();
        assert!(matches!(err, CryptoError::Configuration(_)));
    }

    #[test]
    fn entropy_driver_can_be_disabled() {
        let cfg = build(&[
            ("crypto_backend", "controller_crypto"),
            ("entropy_driver", "false"),
        ])
        .unwrap();
        assert!(!cfg.entropy_driver);
    }

    #[test]
    fn validate_rejects_empty_log_level() {
        let mut cfg = Config::for_backend(BackendKind::SoftwareLibrary);
        cfg.log_level = "  ".into();
        assert!(cfg.validate().is_err());
    }
}
