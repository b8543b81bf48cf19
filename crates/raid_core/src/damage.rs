//! Damage attribution policy.
//!
//! Runs on every combat-damage evaluation in the host, raid-related or not,
//! so the common case (initiator is not an agent) is rejected before any
//! lookup happens. A raid agent is recognized by registry membership only.

use serde::{Deserialize, Serialize};

use crate::config::DamageSettings;
use crate::registry::RaidRegistry;
use crate::world::AgentHandle;

/// What was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VictimCategory {
    /// A player character.
    Player,
    /// A building block (wall, floor, foundation, door frame).
    Structure,
    /// Anything else: animals, deployables, other NPCs.
    Other,
}

/// Who dealt the damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Initiator {
    /// No initiator (fall damage, decay).
    None,
    /// A player.
    Player(u64),
    /// An NPC agent with a world handle.
    Agent(AgentHandle),
    /// Environmental or unknown source.
    Environment,
}

/// One combat-damage evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Category of the victim.
    pub victim: VictimCategory,
    /// Source of the damage.
    pub initiator: Initiator,
}

impl DamageEvent {
    /// Create a new event.
    #[must_use]
    pub const fn new(victim: VictimCategory, initiator: Initiator) -> Self {
        Self { victim, initiator }
    }
}

/// Filter decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageVerdict {
    /// Pass the event through unmodified.
    Allow,
    /// Short-circuit the evaluation; no damage is dealt.
    Block,
}

impl DamageVerdict {
    /// Whether the damage is suppressed.
    #[must_use]
    pub const fn is_blocked(self) -> bool {
        matches!(self, DamageVerdict::Block)
    }
}

/// Which victim categories raid agents may damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamagePolicy {
    /// Raid agents may damage players.
    pub players: bool,
    /// Raid agents may damage structures.
    pub structures: bool,
}

impl DamagePolicy {
    /// Build a policy from configuration.
    #[must_use]
    pub const fn from_settings(settings: &DamageSettings) -> Self {
        Self {
            players: settings.players,
            structures: settings.structures,
        }
    }

    /// Whether raid agents may damage `victim`.
    #[inline]
    #[must_use]
    pub const fn allows(&self, victim: VictimCategory) -> bool {
        match victim {
            VictimCategory::Player => self.players,
            VictimCategory::Structure => self.structures,
            VictimCategory::Other => true,
        }
    }

    /// Decide whether `event` is blocked.
    ///
    /// Blocks iff the initiator is a registered raid agent and the victim
    /// category is disabled.
    #[inline]
    #[must_use]
    pub fn evaluate(&self, event: &DamageEvent, registry: &RaidRegistry) -> DamageVerdict {
        let Initiator::Agent(handle) = event.initiator else {
            return DamageVerdict::Allow;
        };
        if self.allows(event.victim) || !registry.contains_agent(handle) {
            return DamageVerdict::Allow;
        }
        DamageVerdict::Block
    }
}

impl Default for DamagePolicy {
    fn default() -> Self {
        Self::from_settings(&DamageSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{Role, Tier};
    use crate::math::Vec3;
    use crate::placement::BehaviorMode;
    use crate::registry::{RaidAgent, RaidId};

    const RAIDER: AgentHandle = AgentHandle(10);
    const STRANGER: AgentHandle = AgentHandle(99);

    fn registry_with_raider() -> RaidRegistry {
        let mut registry = RaidRegistry::new();
        registry.insert_agent(RaidAgent {
            handle: RAIDER,
            raid: RaidId(1),
            role: Role::Regular,
            tier: Tier::Normal,
            target: Vec3::ZERO,
            behavior: BehaviorMode::PassiveApproach,
            spawned_at: 0.0,
            despawn_at: 420.0,
        });
        registry
    }

    fn all_initiators() -> [Initiator; 5] {
        [
            Initiator::None,
            Initiator::Player(1),
            Initiator::Agent(RAIDER),
            Initiator::Agent(STRANGER),
            Initiator::Environment,
        ]
    }

    #[test]
    fn test_blocks_only_raid_agents_on_disabled_categories() {
        let registry = registry_with_raider();
        let victims = [
            VictimCategory::Player,
            VictimCategory::Structure,
            VictimCategory::Other,
        ];

        for players in [false, true] {
            for structures in [false, true] {
                let policy = DamagePolicy {
                    players,
                    structures,
                };
                for initiator in all_initiators() {
                    for victim in victims {
                        let verdict = policy.evaluate(&DamageEvent::new(victim, initiator), &registry);
                        let expected = initiator == Initiator::Agent(RAIDER) && !policy.allows(victim);
                        assert_eq!(verdict.is_blocked(), expected, "{initiator:?} -> {victim:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_default_policy_allows_everything() {
        let registry = registry_with_raider();
        let policy = DamagePolicy::default();
        let event = DamageEvent::new(VictimCategory::Structure, Initiator::Agent(RAIDER));
        assert_eq!(policy.evaluate(&event, &registry), DamageVerdict::Allow);
    }

    #[test]
    fn test_despawned_agent_no_longer_filtered() {
        let mut registry = registry_with_raider();
        let policy = DamagePolicy {
            players: false,
            structures: false,
        };
        let event = DamageEvent::new(VictimCategory::Player, Initiator::Agent(RAIDER));
        assert_eq!(policy.evaluate(&event, &registry), DamageVerdict::Block);

        registry.remove_agent(RAIDER);
        assert_eq!(policy.evaluate(&event, &registry), DamageVerdict::Allow);
    }
}
