//! Raid session registry.
//!
//! The registry is the one piece of mutable shared state in the engine: the
//! set of raid agents still alive and the cosmetics still on screen. It is
//! owned by [`AgentLifecycle`](crate::lifecycle::AgentLifecycle), mutated only
//! there, and read by the damage filter and shutdown.
//!
//! Membership is the stable raid identity of an agent. Nothing in the engine
//! looks at display names to decide whether an entity belongs to a raid.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::composition::{Role, Tier};
use crate::math::Vec3;
use crate::placement::BehaviorMode;
use crate::schedule::Seconds;
use crate::world::{AgentHandle, CosmeticHandle};

/// Identifier of one raid launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RaidId(pub u64);

impl std::fmt::Display for RaidId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "raid#{}", self.0)
    }
}

/// Metadata for one active raid agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaidAgent {
    /// World handle.
    pub handle: AgentHandle,
    /// Raid this agent belongs to.
    pub raid: RaidId,
    /// Member role.
    pub role: Role,
    /// Tier of the raid.
    pub tier: Tier,
    /// Target position the agent is heading to.
    pub target: Vec3,
    /// Post-spawn behavior.
    pub behavior: BehaviorMode,
    /// Time the agent was spawned.
    pub spawned_at: Seconds,
    /// Time at which the agent is force-removed.
    pub despawn_at: Seconds,
}

/// Kind of cosmetic entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CosmeticKind {
    /// Map marker on the target.
    Marker,
    /// Flyover effect accompanying an aerial insertion.
    Flyover,
}

/// Metadata for one active cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveCosmetic {
    /// World handle.
    pub handle: CosmeticHandle,
    /// Raid this cosmetic belongs to.
    pub raid: RaidId,
    /// Marker or flyover.
    pub kind: CosmeticKind,
    /// Time at which the cosmetic is removed.
    pub expires_at: Seconds,
}

/// Active raid agents and cosmetics.
#[derive(Debug, Clone, Default)]
pub struct RaidRegistry {
    agents: HashMap<AgentHandle, RaidAgent>,
    cosmetics: HashMap<CosmeticHandle, ActiveCosmetic>,
}

impl RaidRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent. Replaces any stale entry with the same handle.
    pub fn insert_agent(&mut self, agent: RaidAgent) {
        self.agents.insert(agent.handle, agent);
    }

    /// Remove an agent, returning its metadata if it was registered.
    pub fn remove_agent(&mut self, handle: AgentHandle) -> Option<RaidAgent> {
        self.agents.remove(&handle)
    }

    /// Whether `handle` is an active raid agent.
    #[inline]
    #[must_use]
    pub fn contains_agent(&self, handle: AgentHandle) -> bool {
        self.agents.contains_key(&handle)
    }

    /// Metadata for an active agent.
    #[must_use]
    pub fn agent(&self, handle: AgentHandle) -> Option<&RaidAgent> {
        self.agents.get(&handle)
    }

    /// Number of active agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Active agents belonging to `raid`.
    pub fn agents_in_raid(&self, raid: RaidId) -> impl Iterator<Item = &RaidAgent> {
        self.agents.values().filter(move |a| a.raid == raid)
    }

    /// Active agent handles in ascending order, for deterministic iteration.
    #[must_use]
    pub fn sorted_agent_handles(&self) -> Vec<AgentHandle> {
        let mut handles: Vec<_> = self.agents.keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    /// Iterate over active agents (not in deterministic order).
    pub fn agents(&self) -> impl Iterator<Item = &RaidAgent> {
        self.agents.values()
    }

    /// Register a cosmetic.
    pub fn insert_cosmetic(&mut self, cosmetic: ActiveCosmetic) {
        self.cosmetics.insert(cosmetic.handle, cosmetic);
    }

    /// Remove a cosmetic, returning its metadata if it was registered.
    pub fn remove_cosmetic(&mut self, handle: CosmeticHandle) -> Option<ActiveCosmetic> {
        self.cosmetics.remove(&handle)
    }

    /// Whether `handle` is an active cosmetic.
    #[must_use]
    pub fn contains_cosmetic(&self, handle: CosmeticHandle) -> bool {
        self.cosmetics.contains_key(&handle)
    }

    /// Number of active cosmetics.
    #[must_use]
    pub fn cosmetic_count(&self) -> usize {
        self.cosmetics.len()
    }

    /// Iterate over active cosmetics (not in deterministic order).
    pub fn cosmetics(&self) -> impl Iterator<Item = &ActiveCosmetic> {
        self.cosmetics.values()
    }

    /// Remove every agent, sorted by handle.
    pub fn drain_agents(&mut self) -> Vec<RaidAgent> {
        let mut agents: Vec<_> = self.agents.drain().map(|(_, a)| a).collect();
        agents.sort_unstable_by_key(|a| a.handle);
        agents
    }

    /// Remove every cosmetic, sorted by handle.
    pub fn drain_cosmetics(&mut self) -> Vec<ActiveCosmetic> {
        let mut cosmetics: Vec<_> = self.cosmetics.drain().map(|(_, c)| c).collect();
        cosmetics.sort_unstable_by_key(|c| c.handle);
        cosmetics
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.cosmetics.is_empty()
    }
}
