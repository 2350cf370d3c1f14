//! Crate-level tests that drive the whole match pipeline.
//!
//! # Test Structure
//!
//! - `determinism.rs`: same seed and clock readings give identical matches
//! - `integration.rs`: end-to-end scenarios through the controller and the
//!   simulation
//! - `helpers.rs`: factories for actors, frames and clock-driven controllers

mod determinism;
mod helpers;

pub use helpers::*;
