//! cdss-core
//!
//! Pure domain types for the CDSS recommendation service: request
//! validation, schedule vocabulary, prescription/metrics row shapes, and
//! the patient-protocol-fit table. No I/O — this is the shared vocabulary
//! of the system.

pub mod error;
pub mod models;
pub mod transform;
