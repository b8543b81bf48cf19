//! Spawn position planning.
//!
//! Each member is placed at a random point on a sphere of `spawn_radius`
//! around the target, projected onto the ground plane, then lifted to the
//! terrain height plus a mode-dependent offset. Only the count of positions is
//! deterministic; the values come from the RNG.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::composition::{Composition, MemberPlan, Role};
use crate::config::RaidConfig;
use crate::math::Vec3;
use crate::world::WorldAdapter;

/// Height above terrain for ground spawns, so agents are not embedded in it.
pub const GROUND_CLEARANCE: f32 = 0.5;

/// How squad members enter the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlacementMode {
    /// Spawn on the ground around the target.
    #[default]
    Ground,
    /// Spawn high above the ground around the target and drop in.
    Aerial,
}

/// How squad members behave once spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BehaviorMode {
    /// Walk toward the target and fight whatever the AI perceives.
    #[default]
    PassiveApproach,
    /// Like `PassiveApproach`, but periodically pick a door or wall to attack
    /// when idle near the target.
    StructureAggro,
}

/// Spawn plan for one squad member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPlan {
    /// World spawn position.
    pub position: Vec3,
    /// Host template the agent is created from.
    pub template: String,
    /// Member plan (role, equipment, loot).
    pub member: MemberPlan,
}

impl SpawnPlan {
    /// Role of the planned member.
    #[must_use]
    pub fn role(&self) -> Role {
        self.member.role
    }
}

/// A cosmetic flyover path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlyoverPath {
    /// Start of the flyover.
    pub from: Vec3,
    /// End of the flyover.
    pub to: Vec3,
}

/// Full placement for one raid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementPlan {
    /// Target position the squad heads to.
    pub target: Vec3,
    /// Placement mode used.
    pub mode: PlacementMode,
    /// One entry per squad member, in composition order.
    pub spawns: Vec<SpawnPlan>,
    /// Flyover to start alongside an aerial insertion.
    pub flyover: Option<FlyoverPath>,
    /// Position of the target marker, if one is placed.
    pub marker: Option<Vec3>,
}

/// Vertical offset above terrain for `mode`.
#[must_use]
pub fn vertical_offset(mode: PlacementMode, config: &RaidConfig) -> f32 {
    match mode {
        PlacementMode::Ground => GROUND_CLEARANCE,
        PlacementMode::Aerial => config.aerial.insertion_height,
    }
}

/// Random horizontal offset within `radius`.
///
/// Samples a uniform point on a sphere of `radius` and drops its vertical
/// component, so the horizontal distance never exceeds `radius`.
pub fn sample_offset<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> (f32, f32) {
    let height: f32 = rng.gen_range(-1.0..=1.0);
    let angle: f32 = rng.gen_range(0.0..TAU);
    let ring = radius * (1.0 - height * height).max(0.0).sqrt();
    (ring * angle.cos(), ring * angle.sin())
}

/// Compute `count` spawn positions around `target`.
pub fn plan_positions<W, R>(
    world: &W,
    target: Vec3,
    count: usize,
    mode: PlacementMode,
    config: &RaidConfig,
    rng: &mut R,
) -> Vec<Vec3>
where
    W: WorldAdapter + ?Sized,
    R: Rng + ?Sized,
{
    let offset = vertical_offset(mode, config);
    (0..count)
        .map(|_| {
            let (dx, dz) = sample_offset(config.raid.spawn_radius, rng);
            let x = target.x + dx;
            let z = target.z + dz;
            Vec3::new(x, world.ground_height(x, z) + offset, z)
        })
        .collect()
}

/// Place every member of `composition` around `target`.
pub fn plan_squad<W, R>(
    world: &W,
    target: Vec3,
    composition: &Composition,
    config: &RaidConfig,
    rng: &mut R,
) -> PlacementPlan
where
    W: WorldAdapter + ?Sized,
    R: Rng + ?Sized,
{
    let mode = composition.placement;
    let positions = plan_positions(
        world,
        target,
        composition.total_agents(),
        mode,
        config,
        rng,
    );

    let spawns = positions
        .into_iter()
        .zip(&composition.members)
        .map(|(position, member)| SpawnPlan {
            position,
            template: config.raid.agent_template.clone(),
            member: member.clone(),
        })
        .collect();

    let flyover = (mode == PlacementMode::Aerial && config.aerial.flyover)
        .then(|| flyover_path(world, target, config, rng));
    let marker = config.raid.target_marker.then_some(target);

    PlacementPlan {
        target,
        mode,
        spawns,
        flyover,
        marker,
    }
}

/// A straight pass over the target at insertion height, entering and leaving
/// twice the spawn radius out.
fn flyover_path<W, R>(world: &W, target: Vec3, config: &RaidConfig, rng: &mut R) -> FlyoverPath
where
    W: WorldAdapter + ?Sized,
    R: Rng + ?Sized,
{
    let heading: f32 = rng.gen_range(0.0..TAU);
    let reach = config.raid.spawn_radius * 2.0;
    let (dx, dz) = (reach * heading.cos(), reach * heading.sin());
    let altitude = world.ground_height(target.x, target.z) + config.aerial.insertion_height;
    FlyoverPath {
        from: Vec3::new(target.x - dx, altitude, target.z - dz),
        to: Vec3::new(target.x + dx, altitude, target.z + dz),
    }
}
