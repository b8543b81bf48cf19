//! Error types for the raid engine.
//!
//! The launch pipeline itself never fails: every expected outcome (no target,
//! gate rejection, partial spawn failure) is a value on
//! [`LaunchOutcome`](crate::director::LaunchOutcome). These errors only cover
//! the settings store around it.

use thiserror::Error;

/// Result type alias using [`RaidError`].
pub type Result<T> = std::result::Result<T, RaidError>;

/// Top-level error type for the raid engine.
#[derive(Debug, Error)]
pub enum RaidError {
    /// Config file could not be read or written.
    #[error("Config IO error for '{path}': {source}")]
    ConfigIo {
        /// Path of the config file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid RON for [`RaidConfig`](crate::config::RaidConfig).
    #[error("Failed to parse config '{path}': {message}")]
    ConfigParse {
        /// Path of the config file (or `<string>` for inline sources).
        path: String,
        /// Parser message.
        message: String,
    },

    /// Config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(String),

    /// Config parsed but failed validation.
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Validation failures for a loaded configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Squad size range is inverted.
    #[error("{tier} squad size min {min} exceeds max {max}")]
    InvertedSquadSize {
        /// Tier name.
        tier: String,
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },

    /// A probability lies outside `[0, 1]`.
    #[error("{field} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange {
        /// Field name.
        field: &'static str,
        /// Configured value.
        value: f32,
    },

    /// A distance or duration that must be positive is not.
    #[error("{field} must be positive, got {value}")]
    NotPositive {
        /// Field name.
        field: &'static str,
        /// Configured value.
        value: f64,
    },

    /// A required identifier is empty.
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),

    /// A loot table has entries but none of them can be drawn.
    #[error("{tier} loot table has no entry with positive weight")]
    UnweightedLootTable {
        /// Tier name.
        tier: String,
    },

    /// A loot entry amount range is inverted.
    #[error("{tier} loot entry '{item}' min amount {min} exceeds max {max}")]
    InvertedLootAmount {
        /// Tier name.
        tier: String,
        /// Item identifier.
        item: String,
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },
}
