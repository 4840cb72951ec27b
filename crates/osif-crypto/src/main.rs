//! `osif-selftest` — power-on check of the configured crypto adapter.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from `OSIF_*` environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Build the adapter and run the stack-facing startup calls:
//!    `initialize_rng`, `random_seed`, `initialize_aes`.
//! 4. Run the FIPS-197 known-answer suite and print a JSON report.
//!
//! Exits non-zero on any failure.

use anyhow::{Context, Result};
use common::{Block, Key, SelfTestReport};
use osif_crypto::selftest::FIPS197_VECTORS;
use osif_crypto::{telemetry, Config, OsifCrypto};
use tracing::{error, info};

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = %cfg.crypto_backend,
        "osif-selftest starting"
    );

    // -----------------------------------------------------------------------
    // 3. Stack startup calls
    // -----------------------------------------------------------------------
    let mut crypto = OsifCrypto::from_config(&cfg);
    crypto.initialize_rng();
    crypto.random_seed().context("random_seed failed")?;
    crypto.initialize_aes().context("initialize_aes failed")?;

    // -----------------------------------------------------------------------
    // 4. Known-answer suite through the stack-facing entry point
    // -----------------------------------------------------------------------
    let mut passed = 0;
    for v in FIPS197_VECTORS {
        let ct = crypto
            .encrypt(&Key::new(v.key), &Block::new(v.plaintext))
            .with_context(|| format!("encrypt_block failed on vector {}", v.name))?;
        if ct.into_bytes() == v.ciphertext {
            passed += 1;
        } else {
            error!(vector = v.name, "known-answer mismatch");
        }
    }

    let report = SelfTestReport {
        status: if passed == FIPS197_VECTORS.len() { "ok" } else { "failed" }.into(),
        backend: crypto.backend(),
        entropy: crypto.entropy_mode(),
        vectors_passed: passed,
        vectors_total: FIPS197_VECTORS.len(),
    };
    println!("{}", serde_json::to_string(&report)?);

    if passed != FIPS197_VECTORS.len() {
        anyhow::bail!(
            "{} of {} known-answer vectors failed",
            FIPS197_VECTORS.len() - passed,
            FIPS197_VECTORS.len()
        );
    }
    Ok(())
}
