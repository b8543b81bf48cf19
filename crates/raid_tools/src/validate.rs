//! Config validation utilities.

use std::fs;
use std::path::{Path, PathBuf};

use raid_core::composition::Tier;
use raid_core::config::RaidConfig;
use raid_core::error::{RaidError, Result};

/// Summary of one validated config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    /// File that was checked.
    pub path: PathBuf,
    /// Parsed config.
    pub config: RaidConfig,
}

impl ValidatedConfig {
    /// One human-readable line per tier.
    #[must_use]
    pub fn tier_lines(&self) -> Vec<String> {
        Tier::ALL
            .into_iter()
            .map(|tier| {
                let settings = self.config.tiers.get(tier);
                format!(
                    "{tier}: {}-{} raiders, {}{}{}, {:?}/{:?}",
                    settings.squad_size.min,
                    settings.squad_size.max,
                    settings.weapon.weapon,
                    if settings.heavy_weapons { " + heavy" } else { "" },
                    if tier.allows_elite() && settings.elite {
                        " + elite"
                    } else {
                        ""
                    },
                    self.config.placement_for(tier),
                    self.config.behavior_for(tier),
                )
            })
            .collect()
    }
}

/// Validate a RON config file, or every `.ron` file in a directory.
///
/// # Errors
///
/// Returns the first file that fails to read, parse, or validate.
pub fn validate_path(path: &Path) -> Result<Vec<ValidatedConfig>> {
    if !path.is_dir() {
        return Ok(vec![validate_file(path)?]);
    }

    let entries = fs::read_dir(path).map_err(|source| RaidError::ConfigIo {
        path: path.display().to_string(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    files.iter().map(|file| validate_file(file)).collect()
}

/// Load and validate a single config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub fn validate_file(path: &Path) -> Result<ValidatedConfig> {
    let config = RaidConfig::load(path)?;
    tracing::debug!(path = %path.display(), "Config valid");
    Ok(ValidatedConfig {
        path: path.to_path_buf(),
        config,
    })
}
