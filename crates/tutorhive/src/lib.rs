//! Core library for the tutorhive marketplace backend.
//!
//! Owns the tuition, application, payment, and account domains together with
//! the configuration, telemetry, and error plumbing shared by the binaries.
//! Storage engines and the payment processor stay behind ports so the managers
//! can be exercised against in-memory adapters.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
