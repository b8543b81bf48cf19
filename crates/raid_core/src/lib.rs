//! # Raid Core
//!
//! Orchestration engine for recurring NPC raid events against owned bases.
//!
//! Given a requested difficulty tier, the engine:
//! - picks an eligible target base (or accepts an explicit one)
//! - gates raids against unattended bases by configured probability
//! - resolves the squad composition (size, equipment, loot, elite member)
//! - plans spawn positions around the target (ground ring or aerial insertion)
//! - spawns, equips, and arms each agent through a [`world::WorldAdapter`]
//! - schedules despawns and structure-attack rechecks on its own scheduler
//! - filters combat damage dealt by raid agents per configuration
//!
//! The host game is never linked directly. Everything the engine needs from
//! the world goes through the [`world::WorldAdapter`] trait, and all timed
//! work is driven by the host calling [`director::RaidDirector::tick`] from
//! its own single-threaded loop.
//!
//! ## Crate Structure
//!
//! - [`director`] - Launch pipeline, periodic timer, tick driver
//! - [`command`] - Admin chat command glue
//! - [`target`] - Target selection
//! - [`gate`] - Offline-raid gate
//! - [`composition`] - Difficulty tier to squad composition
//! - [`placement`] - Spawn position planning
//! - [`lifecycle`] - Agent spawn, despawn, structure-attack rechecks
//! - [`registry`] - Active raid agents and cosmetics
//! - [`schedule`] - One-shot task scheduler
//! - [`damage`] - Damage attribution policy
//! - [`config`] - RON configuration
//! - [`sandbox`] - In-memory world for headless runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod command;
pub mod composition;
pub mod config;
pub mod damage;
pub mod director;
pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod math;
pub mod placement;
pub mod registry;
pub mod sandbox;
pub mod schedule;
pub mod target;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::composition::{Composition, MemberPlan, Role, Tier};
    pub use crate::config::RaidConfig;
    pub use crate::damage::{DamageEvent, DamagePolicy, DamageVerdict, Initiator, VictimCategory};
    pub use crate::director::{
        LaunchOutcome, LaunchSummary, RaidDirector, RaidRequest, RejectReason, TargetChoice,
        Trigger,
    };
    pub use crate::error::{RaidError, Result};
    pub use crate::lifecycle::{AgentExit, AgentState};
    pub use crate::math::Vec3;
    pub use crate::placement::{BehaviorMode, PlacementMode};
    pub use crate::registry::{RaidAgent, RaidRegistry};
    pub use crate::sandbox::SandboxWorld;
    pub use crate::schedule::Seconds;
    pub use crate::world::{AgentHandle, CosmeticHandle, OwnerId, Target, WorldAdapter};
}
