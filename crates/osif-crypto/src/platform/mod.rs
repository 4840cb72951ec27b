//! In-process models of the platform devices each backend talks to.
//!
//! They let every backend variant run on a host without the matching
//! silicon, and they expose just enough bookkeeping (open sessions, resident
//! keys) for tests to check that nothing outlives a call.

pub mod bt_controller;
pub mod ecb_peripheral;
pub mod psa_service;

pub use bt_controller::EmulatedController;
pub use ecb_peripheral::EcbPeripheral;
pub use psa_service::VolatileKeyStore;
