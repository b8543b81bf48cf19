//! # Raid Development Tools
//!
//! Command-line tools for development:
//! - Config validator
//! - Headless raid simulator

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod simulate;
pub mod validate;
