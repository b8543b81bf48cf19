//! # Raid Host
//!
//! Headless host for the raid engine.
//!
//! Owns a [`SandboxWorld`] populated with demo bases and a [`RaidDirector`],
//! advances game time from a fixed-rate tokio interval, forwards agent deaths
//! to the engine, and force-kills every raid agent on shutdown.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use raid_core::composition::Tier;
use raid_core::config::RaidConfig;
use raid_core::director::{LaunchOutcome, RaidDirector, RaidRequest, TickReport, Trigger};
use raid_core::error::RaidError;
use raid_core::lifecycle::ShutdownReport;
use raid_core::math::Vec3;
use raid_core::sandbox::{SandboxWorld, TerrainProfile};
use raid_core::schedule::Seconds;
use raid_core::world::{Obstacle, ObstacleId, ObstacleKind, OwnerId, Target};
use thiserror::Error;

/// Host errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Raid config could not be loaded or created.
    #[error("Failed to prepare raid config: {0}")]
    Config(#[from] RaidError),

    /// Invalid host settings.
    #[error("Invalid server setting: {0}")]
    InvalidSetting(String),
}

/// Host configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path of the raid config file; defaults are written there if missing.
    pub config_path: PathBuf,
    /// Host ticks per real second.
    pub tick_rate: u32,
    /// Game seconds that pass per real second.
    pub time_scale: f64,
    /// RNG seed for the director.
    pub seed: u64,
    /// Number of demo bases in the sandbox world.
    pub demo_bases: u64,
    /// Raid launched on the first tick, if any.
    pub initial_raid: Option<Tier>,
    /// Agent walking speed in world units per game second.
    pub agent_speed: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("config/raid.ron"),
            tick_rate: 10,
            time_scale: 1.0,
            seed: 0,
            demo_bases: 6,
            initial_raid: None,
            agent_speed: 4.0,
        }
    }
}

impl ServerConfig {
    /// Check host settings.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.tick_rate == 0 {
            return Err(ServerError::InvalidSetting("tick_rate must be positive".into()));
        }
        if self.time_scale <= 0.0 {
            return Err(ServerError::InvalidSetting("time_scale must be positive".into()));
        }
        Ok(())
    }

    /// Real time between ticks.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }

    /// Game time that passes per tick.
    #[must_use]
    pub fn game_seconds_per_tick(&self) -> Seconds {
        self.time_scale / f64::from(self.tick_rate.max(1))
    }
}

/// Build the demo world: rolling terrain, bases on a ring, a door and two
/// walls per base, every other owner online.
#[must_use]
pub fn demo_world(bases: u64) -> SandboxWorld {
    let mut world = SandboxWorld::new(TerrainProfile::rolling(12.0, 5.0, 60.0));
    let mut next_obstacle = 1;
    for owner in 1..=bases {
        let angle = owner as f32 / bases.max(1) as f32 * std::f32::consts::TAU;
        let (x, z) = (600.0 * angle.cos(), 600.0 * angle.sin());
        let position = Vec3::new(x, world.terrain().height_at(x, z), z);
        world.add_base(Target::owned(OwnerId(owner), position));
        world.set_owner_online(OwnerId(owner), owner % 2 == 1);

        for (kind, dx) in [
            (ObstacleKind::Door, 0.0),
            (ObstacleKind::BuildingBlock, 3.0),
            (ObstacleKind::BuildingBlock, -3.0),
        ] {
            world.add_obstacle(Obstacle {
                id: ObstacleId(next_obstacle),
                kind,
                position: Vec3::new(position.x + dx, position.y, position.z + 2.0),
            });
            next_obstacle += 1;
        }
    }
    world
}

/// The host state: world, director, and game clock.
#[derive(Debug)]
pub struct RaidHost {
    world: SandboxWorld,
    director: RaidDirector,
    now: Seconds,
    agent_speed: f32,
}

impl RaidHost {
    /// Load the raid config and build the demo world.
    pub fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let raid_config = RaidConfig::load_or_create(&config.config_path)?;
        Self::with_parts(
            raid_config,
            demo_world(config.demo_bases),
            config.seed,
            config.agent_speed,
        )
    }

    /// Build a host from explicit parts.
    pub fn with_parts(
        raid_config: RaidConfig,
        world: SandboxWorld,
        seed: u64,
        agent_speed: f32,
    ) -> Result<Self, ServerError> {
        Ok(Self {
            world,
            director: RaidDirector::new(raid_config, seed)?,
            now: 0.0,
            agent_speed,
        })
    }

    /// Current game time.
    #[must_use]
    pub const fn now(&self) -> Seconds {
        self.now
    }

    /// The raid engine.
    #[must_use]
    pub const fn director(&self) -> &RaidDirector {
        &self.director
    }

    /// The sandbox world.
    #[must_use]
    pub const fn world(&self) -> &SandboxWorld {
        &self.world
    }

    /// Mutable access to the sandbox world.
    pub fn world_mut(&mut self) -> &mut SandboxWorld {
        &mut self.world
    }

    /// Launch a raid on a random base right now.
    pub fn launch(&mut self, tier: Tier, trigger: Trigger) -> LaunchOutcome {
        let outcome = self
            .director
            .launch(&mut self.world, RaidRequest::random(tier, trigger), self.now);
        tracing::info!(now = self.now, "{outcome}");
        outcome
    }

    /// Advance game time by `dt`: move agents, forward deaths, run the engine,
    /// and evict dead agents from the world.
    pub fn step(&mut self, dt: Seconds) -> TickReport {
        self.now += dt;
        #[allow(clippy::cast_possible_truncation)]
        self.world.advance_agents(self.agent_speed * dt as f32);
        for handle in self.world.take_deaths() {
            self.director.on_agent_died(handle);
        }
        let report = self.director.tick(&mut self.world, self.now);
        self.world.prune_dead();
        if let Some(outcome) = &report.timer_launch {
            tracing::info!(now = self.now, "{outcome}");
        }
        report
    }

    /// Kill every raid agent and drop pending work.
    pub fn shutdown(&mut self) -> ShutdownReport {
        self.director.force_kill_all(&mut self.world)
    }
}

/// Run the host loop until `shutdown` resolves, then clean up.
pub async fn run<F>(config: ServerConfig, shutdown: F) -> Result<ShutdownReport, ServerError>
where
    F: Future<Output = ()>,
{
    let mut host = RaidHost::new(&config)?;
    let dt = config.game_seconds_per_tick();
    tracing::info!(
        tick_rate = config.tick_rate,
        time_scale = config.time_scale,
        bases = config.demo_bases,
        "Raid host started"
    );

    if let Some(tier) = config.initial_raid {
        host.launch(tier, Trigger::Command);
    }

    let mut interval = tokio::time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                tracing::info!(now = host.now(), "Shutdown requested");
                break;
            }
            _ = interval.tick() => {
                host.step(dt);
            }
        }
    }

    Ok(host.shutdown())
}
