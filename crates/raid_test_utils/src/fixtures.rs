//! Test fixtures and helpers.
//!
//! Pre-built worlds and configurations for consistent testing.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use raid_core::composition::Tier;
use raid_core::config::{RaidConfig, SquadSize};
use raid_core::director::{RaidDirector, TickReport};
use raid_core::math::Vec3;
use raid_core::sandbox::{SandboxWorld, TerrainProfile};
use raid_core::schedule::Seconds;
use raid_core::world::{OwnerId, Target};

/// Seeded RNG for reproducible tests.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Default configuration with the periodic timer disabled.
///
/// Most tests launch raids explicitly and don't want a timer raid mixed in.
#[must_use]
pub fn manual_config() -> RaidConfig {
    let mut config = RaidConfig::default();
    config.raid.interval_seconds = 0.0;
    config
}

/// Manual config with `tier` forced to the given squad size range.
#[must_use]
pub fn config_with_squad(tier: Tier, min: u32, max: u32) -> RaidConfig {
    let mut config = manual_config();
    config.tiers.get_mut(tier).squad_size = SquadSize::new(min, max);
    config
}

/// A base owned by `owner` at ground level.
#[must_use]
pub fn base(owner: u64, x: f32, z: f32) -> Target {
    Target::owned(OwnerId(owner), Vec3::new(x, 0.0, z))
}

/// Flat world with a single base whose owner is online or offline.
#[must_use]
pub fn single_base_world(owner: u64, online: bool) -> SandboxWorld {
    let mut world = SandboxWorld::new(TerrainProfile::flat(0.0));
    world.add_base(base(owner, 100.0, 100.0));
    world.set_owner_online(OwnerId(owner), online);
    world
}

/// Rolling world with `count` bases spread on a line, owners `1..=count`.
#[must_use]
pub fn world_with_bases(count: u64, online: bool) -> SandboxWorld {
    let mut world = SandboxWorld::new(TerrainProfile::rolling(8.0, 3.0, 30.0));
    for owner in 1..=count {
        world.add_base(base(owner, owner as f32 * 250.0, -40.0));
        world.set_owner_online(OwnerId(owner), online);
    }
    world
}

/// Tick the director from `from` (exclusive) to `until` (inclusive) in fixed
/// steps, forwarding combat deaths and collecting each report.
pub fn run_until(
    director: &mut RaidDirector,
    world: &mut SandboxWorld,
    from: Seconds,
    until: Seconds,
    step: Seconds,
) -> Vec<TickReport> {
    let mut reports = Vec::new();
    if step <= 0.0 {
        return reports;
    }
    let mut now = from;
    while now < until {
        now = (now + step).min(until);
        for handle in world.take_deaths() {
            director.on_agent_died(handle);
        }
        reports.push(director.tick(world, now));
    }
    reports
}
