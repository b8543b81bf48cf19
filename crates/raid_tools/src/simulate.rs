//! Headless raid simulation.
//!
//! Launches one raid on a sandbox world and ticks it forward, sampling the
//! registry as agents walk in, engage, and despawn.

use serde::Serialize;

use raid_core::composition::Tier;
use raid_core::config::RaidConfig;
use raid_core::director::{LaunchOutcome, RaidDirector, RaidRequest, Trigger};
use raid_core::error::Result;
use raid_core::math::Vec3;
use raid_core::sandbox::{SandboxWorld, TerrainProfile};
use raid_core::schedule::Seconds;
use raid_core::world::{Obstacle, ObstacleId, ObstacleKind, OwnerId, Target};

/// Simulation parameters.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Raid tier.
    pub tier: Tier,
    /// Director RNG seed.
    pub seed: u64,
    /// Game seconds to simulate after launch.
    pub seconds: Seconds,
    /// Game seconds per tick.
    pub step: Seconds,
    /// Whether the base owner is online.
    pub owner_online: bool,
    /// Agent walking speed in units per second.
    pub agent_speed: f32,
    /// Raid configuration.
    pub config: RaidConfig,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        let mut config = RaidConfig::default();
        config.raid.interval_seconds = 0.0;
        Self {
            tier: Tier::Normal,
            seed: 0,
            seconds: 600.0,
            step: 1.0,
            owner_online: true,
            agent_speed: 4.0,
            config,
        }
    }
}

/// Registry size at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Game time.
    pub time: Seconds,
    /// Registered raid agents.
    pub active_agents: usize,
    /// Tracked cosmetics.
    pub cosmetics: usize,
}

/// Result of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Launch outcome.
    pub outcome: LaunchOutcome,
    /// Human-readable outcome.
    pub message: String,
    /// Registry samples whenever something changed, plus the first and last tick.
    pub samples: Vec<Sample>,
    /// Agents removed by their despawn timer.
    pub expired: usize,
    /// Obstacles marked as threats.
    pub engagements: usize,
}

const BASE_OWNER: OwnerId = OwnerId(1);

fn simulation_world(owner_online: bool) -> SandboxWorld {
    let mut world = SandboxWorld::new(TerrainProfile::rolling(10.0, 4.0, 45.0));
    let center = Vec3::new(0.0, world.terrain().height_at(0.0, 0.0), 0.0);
    world.add_base(Target::owned(BASE_OWNER, center));
    world.set_owner_online(BASE_OWNER, owner_online);
    for (id, (dx, dz, kind)) in [
        (0.0, 4.0, ObstacleKind::Door),
        (4.0, 0.0, ObstacleKind::BuildingBlock),
        (-4.0, 0.0, ObstacleKind::BuildingBlock),
        (0.0, -4.0, ObstacleKind::Other),
    ]
    .into_iter()
    .enumerate()
    {
        world.add_obstacle(Obstacle {
            id: ObstacleId(id as u64 + 1),
            kind,
            position: Vec3::new(center.x + dx, center.y, center.z + dz),
        });
    }
    world
}

/// Run one raid to completion or until `options.seconds` pass.
///
/// # Errors
///
/// Returns an error if `options.config` fails validation.
pub fn run_simulation(options: &SimulationOptions) -> Result<SimulationResult> {
    let mut world = simulation_world(options.owner_online);
    let mut director = RaidDirector::new(options.config.clone(), options.seed)?;
    let outcome = director.launch(
        &mut world,
        RaidRequest::random(options.tier, Trigger::Command),
        0.0,
    );

    let sample = |director: &RaidDirector, time| Sample {
        time,
        active_agents: director.registry().agent_count(),
        cosmetics: director.registry().cosmetic_count(),
    };
    let mut samples = vec![sample(&director, 0.0)];
    let mut expired = 0;
    let mut engagements = 0;

    let step = if options.step > 0.0 { options.step } else { 1.0 };
    let mut now = 0.0;
    while now < options.seconds {
        now = (now + step).min(options.seconds);
        #[allow(clippy::cast_possible_truncation)]
        world.advance_agents(options.agent_speed * step as f32);
        let report = director.tick(&mut world, now);
        expired += report.activity.expired.len();
        engagements += report.activity.engaged.len();

        let current = sample(&director, now);
        let changed = samples
            .last()
            .map_or(true, |last| {
                last.active_agents != current.active_agents || last.cosmetics != current.cosmetics
            });
        if changed || now >= options.seconds {
            samples.push(current);
        }
    }

    Ok(SimulationResult {
        message: outcome.to_string(),
        outcome,
        samples,
        expired,
        engagements,
    })
}
