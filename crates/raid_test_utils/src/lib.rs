//! # Raid Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture worlds, configs and seeded RNGs
//! - Determinism harness for scripted raid runs
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
