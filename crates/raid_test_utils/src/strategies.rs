//! Proptest strategies for raid inputs.

use proptest::prelude::*;

use raid_core::composition::Tier;
use raid_core::config::{RaidConfig, SquadSize};
use raid_core::damage::{DamageEvent, DamagePolicy, Initiator, VictimCategory};
use raid_core::world::AgentHandle;

/// Any tier.
pub fn arb_tier() -> impl Strategy<Value = Tier> {
    prop::sample::select(Tier::ALL.to_vec())
}

/// A valid inclusive squad size range with `max <= 12`.
pub fn arb_squad_size() -> impl Strategy<Value = SquadSize> {
    (0u32..=12)
        .prop_flat_map(|min| (Just(min), min..=12))
        .prop_map(|(min, max)| SquadSize::new(min, max))
}

/// Spawn radius in a playable range.
pub fn arb_spawn_radius() -> impl Strategy<Value = f32> {
    1.0f32..200.0
}

/// Probability in `[0, 1]`.
pub fn arb_chance() -> impl Strategy<Value = f32> {
    0.0f32..=1.0
}

/// Default configuration with every tier resized and a random spawn radius.
pub fn arb_raid_config() -> impl Strategy<Value = RaidConfig> {
    (
        prop::collection::vec(arb_squad_size(), 4),
        arb_spawn_radius(),
        arb_chance(),
        any::<bool>(),
    )
        .prop_map(|(sizes, radius, chance, allow_offline)| {
            let mut config = RaidConfig::default();
            for (tier, size) in Tier::ALL.into_iter().zip(sizes) {
                config.tiers.get_mut(tier).squad_size = size;
            }
            config.raid.spawn_radius = radius;
            config.raid.offline_raid_chance = chance;
            config.raid.allow_offline_raids = allow_offline;
            config.raid.interval_seconds = 0.0;
            config
        })
}

/// Any victim category.
pub fn arb_victim() -> impl Strategy<Value = VictimCategory> {
    prop_oneof![
        Just(VictimCategory::Player),
        Just(VictimCategory::Structure),
        Just(VictimCategory::Other),
    ]
}

/// Any initiator, with agent handles drawn from `0..handles`.
pub fn arb_initiator(handles: u64) -> impl Strategy<Value = Initiator> {
    prop_oneof![
        Just(Initiator::None),
        Just(Initiator::Environment),
        any::<u64>().prop_map(Initiator::Player),
        (0..handles.max(1)).prop_map(|h| Initiator::Agent(AgentHandle(h))),
    ]
}

/// Any damage event.
pub fn arb_damage_event(handles: u64) -> impl Strategy<Value = DamageEvent> {
    (arb_victim(), arb_initiator(handles)).prop_map(|(victim, initiator)| DamageEvent::new(victim, initiator))
}

/// Any damage policy.
pub fn arb_damage_policy() -> impl Strategy<Value = DamagePolicy> {
    (any::<bool>(), any::<bool>()).prop_map(|(players, structures)| DamagePolicy {
        players,
        structures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_configs_validate(config in arb_raid_config()) {
            prop_assert!(config.validate().is_ok());
        }

        #[test]
        fn generated_squad_sizes_are_ordered(size in arb_squad_size()) {
            prop_assert!(size.min <= size.max);
        }
    }
}
