//! Property-based tests for raid_core.

use proptest::prelude::*;
use raid_core::composition::resolve;
use raid_core::config::RaidSettings;
use raid_core::gate::{may_proceed, may_proceed_with_draw};
use raid_core::placement::{plan_positions, GROUND_CLEARANCE};
use raid_core::prelude::*;
use raid_core::registry::RaidId;
use raid_core::sandbox::TerrainProfile;
use raid_test_utils::fixtures::{manual_config, seeded_rng, single_base_world};
use raid_test_utils::strategies::{
    arb_chance, arb_damage_event, arb_damage_policy, arb_raid_config, arb_spawn_radius, arb_tier,
};

proptest! {
    /// Squad size always lands inside the tier's range; the elite is one extra.
    #[test]
    fn prop_squad_size_within_range(config in arb_raid_config(), tier in arb_tier(), seed in any::<u64>()) {
        let composition = resolve(tier, &config, &mut seeded_rng(seed));
        let range = config.tiers.get(tier).squad_size;
        prop_assert!(range.contains(composition.squad_size));
        prop_assert_eq!(
            composition.total_agents(),
            composition.squad_size as usize + usize::from(composition.elite)
        );
    }

    /// A present owner always passes the gate.
    #[test]
    fn prop_gate_passes_online_owner(chance in arb_chance(), allow in any::<bool>(), seed in any::<u64>()) {
        let settings = RaidSettings {
            allow_offline_raids: allow,
            offline_raid_chance: chance,
            ..RaidSettings::default()
        };
        prop_assert!(may_proceed(true, &settings, &mut seeded_rng(seed)));
    }

    /// Offline raids disabled means an absent owner is never raided.
    #[test]
    fn prop_gate_blocks_when_offline_disabled(chance in arb_chance(), draw in 0.0f32..1.0) {
        let settings = RaidSettings {
            allow_offline_raids: false,
            offline_raid_chance: chance,
            ..RaidSettings::default()
        };
        prop_assert!(!may_proceed_with_draw(false, &settings, draw));
    }

    /// Ground spawns stay inside the radius and sit just above the terrain.
    #[test]
    fn prop_ground_positions_within_radius(
        radius in arb_spawn_radius(),
        x in -2_000.0f32..2_000.0,
        z in -2_000.0f32..2_000.0,
        count in 0usize..16,
        seed in any::<u64>(),
    ) {
        let world = SandboxWorld::new(TerrainProfile::rolling(20.0, 6.0, 35.0));
        let mut config = manual_config();
        config.raid.spawn_radius = radius;
        let target = Vec3::new(x, 0.0, z);

        let positions = plan_positions(&world, target, count, PlacementMode::Ground, &config, &mut seeded_rng(seed));
        prop_assert_eq!(positions.len(), count);
        for p in positions {
            prop_assert!(p.horizontal_distance(target) <= radius * 1.0001 + 1e-3);
            let expected = world.ground_height(p.x, p.z) + GROUND_CLEARANCE;
            prop_assert!((p.y - expected).abs() < 1e-3);
        }
    }

    /// The filter blocks exactly when a registered agent hits a disabled category.
    #[test]
    fn prop_damage_filter_truth_table(policy in arb_damage_policy(), event in arb_damage_event(8)) {
        let mut registry = RaidRegistry::new();
        for handle in [1, 3, 5] {
            registry.insert_agent(RaidAgent {
                handle: AgentHandle(handle),
                raid: RaidId(1),
                role: Role::Regular,
                tier: Tier::Normal,
                target: Vec3::ZERO,
                behavior: BehaviorMode::PassiveApproach,
                spawned_at: 0.0,
                despawn_at: 420.0,
            });
        }
        let is_raider = matches!(event.initiator, Initiator::Agent(h) if registry.contains_agent(h));
        let expected = is_raider && !policy.allows(event.victim);
        prop_assert_eq!(policy.evaluate(&event, &registry).is_blocked(), expected);
    }

    /// Registry size equals spawned agents and drops to zero after the despawn duration.
    #[test]
    fn prop_registry_tracks_spawns(tier in arb_tier(), seed in any::<u64>(), failures in 0u32..4) {
        let mut world = single_base_world(1, true);
        world.fail_next_spawns(failures);
        let config = manual_config();
        let despawn = config.raid.despawn_seconds;
        let mut director = RaidDirector::new(config, seed).expect("valid config");

        let outcome = director.launch(&mut world, RaidRequest::random(tier, Trigger::Command), 0.0);
        let summary = outcome.summary().expect("owner is online");
        prop_assert_eq!(summary.spawned() + summary.failed, summary.planned);
        prop_assert_eq!(director.registry().agent_count(), summary.spawned());

        director.tick(&mut world, despawn);
        prop_assert!(director.registry().is_empty());
    }
}
