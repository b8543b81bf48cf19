//! Determinism testing utilities.
//!
//! A raid run is reproducible when the director's RNG is seeded and the host
//! ticks it at the same times. Sources of non-determinism to watch for:
//!
//! - **HashMap iteration order**: the registry is hashed through sorted
//!   handles only.
//! - **Unseeded randomness**: every draw goes through the director's RNG.
//! - **Float formatting**: times are hashed by bit pattern, not by value.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use raid_core::director::RaidDirector;
use raid_core::registry::RaidRegistry;

/// Result of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical fingerprints.
    pub is_deterministic: bool,
    /// Fingerprint of each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Distinct fingerprints (1 for a deterministic scenario).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert every run matched.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different fingerprints.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Raid scenario is non-deterministic!\n\
                 Runs: {}\n\
                 Unique fingerprints: {} (expected 1)\n\
                 All fingerprints: {:?}",
                self.hashes.len(),
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario `runs` times and compare fingerprints.
///
/// `scenario` builds its own state from scratch and returns a fingerprint of
/// whatever it wants compared.
pub fn verify_determinism<F>(runs: usize, scenario: F) -> DeterminismResult
where
    F: Fn() -> u64,
{
    let hashes: Vec<u64> = (0..runs).map(|_| scenario()).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Fingerprint of the registry contents in sorted handle order.
#[must_use]
pub fn registry_hash(registry: &RaidRegistry) -> u64 {
    let mut hasher = DefaultHasher::new();
    for handle in registry.sorted_agent_handles() {
        handle.hash(&mut hasher);
        if let Some(agent) = registry.agent(handle) {
            agent.raid.hash(&mut hasher);
            agent.role.hash(&mut hasher);
            agent.tier.hash(&mut hasher);
            agent.behavior.hash(&mut hasher);
            agent.despawn_at.to_bits().hash(&mut hasher);
            agent.target.x.to_bits().hash(&mut hasher);
            agent.target.z.to_bits().hash(&mut hasher);
        }
    }
    let mut cosmetics: Vec<_> = registry
        .cosmetics()
        .map(|c| (c.handle, c.raid, c.expires_at.to_bits()))
        .collect();
    cosmetics.sort_unstable();
    cosmetics.hash(&mut hasher);
    hasher.finish()
}

/// Fingerprint of a director's live state.
#[must_use]
pub fn director_hash(director: &RaidDirector) -> u64 {
    let mut hasher = DefaultHasher::new();
    registry_hash(director.registry()).hash(&mut hasher);
    director.pending_tasks().hash(&mut hasher);
    director
        .timer()
        .next_due()
        .map(f64::to_bits)
        .hash(&mut hasher);
    hasher.finish()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
