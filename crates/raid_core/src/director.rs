//! Raid director: the launch pipeline and the tick driver.
//!
//! A launch runs synchronously:
//! target selection → offline gate → composition → placement → spawn.
//! Every outcome is a value; nothing in the pipeline returns `Err`.
//! Timed work (despawns, rechecks, cosmetic cleanup, the periodic raid timer)
//! advances only when the host calls [`RaidDirector::tick`].

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::composition::{resolve, Tier};
use crate::config::RaidConfig;
use crate::damage::{DamageEvent, DamagePolicy, DamageVerdict};
use crate::error;
use crate::gate;
use crate::lifecycle::{AgentExit, AgentLifecycle, ShutdownReport, SquadOrder, TickActivity};
use crate::placement::{plan_squad, BehaviorMode, PlacementMode};
use crate::registry::{RaidId, RaidRegistry};
use crate::schedule::Seconds;
use crate::target;
use crate::world::{AgentHandle, OwnerId, Target, WorldAdapter};

/// What started a raid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// An administrator command.
    Command,
    /// The periodic raid timer.
    Timer,
}

/// How the target base is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetChoice {
    /// Any eligible base, uniformly at random.
    Random,
    /// A base belonging to this owner.
    Owner(OwnerId),
    /// A specific base record supplied by the caller.
    Explicit(Target),
}

/// A request to launch one raid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaidRequest {
    /// Difficulty tier.
    pub tier: Tier,
    /// Target choice.
    pub target: TargetChoice,
    /// Issuing context.
    pub trigger: Trigger,
}

impl RaidRequest {
    /// Raid a random eligible base.
    #[must_use]
    pub const fn random(tier: Tier, trigger: Trigger) -> Self {
        Self {
            tier,
            target: TargetChoice::Random,
            trigger,
        }
    }

    /// Raid a base belonging to `owner`.
    #[must_use]
    pub const fn against_owner(tier: Tier, owner: OwnerId, trigger: Trigger) -> Self {
        Self {
            tier,
            target: TargetChoice::Owner(owner),
            trigger,
        }
    }
}

/// Why a raid did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// No eligible base exists.
    NoTarget,
    /// The requested owner has no eligible base.
    TargetNotFound(OwnerId),
    /// An explicit target with no assigned owner.
    IneligibleTarget,
    /// The owner is offline and the offline gate said no.
    OfflineGate {
        /// Owner of the gated base.
        owner: OwnerId,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoTarget => write!(f, "No eligible base to raid"),
            RejectReason::TargetNotFound(owner) => {
                write!(f, "No eligible base owned by {owner}")
            }
            RejectReason::IneligibleTarget => write!(f, "Target base has no owner"),
            RejectReason::OfflineGate { owner } => {
                write!(f, "Owner {owner} is offline and the raid was called off")
            }
        }
    }
}

/// Details of a launched raid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchSummary {
    /// Raid identifier.
    pub raid: RaidId,
    /// Difficulty tier.
    pub tier: Tier,
    /// What started it.
    pub trigger: Trigger,
    /// Raided base.
    pub target: Target,
    /// Whether the owner was connected at launch.
    pub owner_online: bool,
    /// How the squad entered the map.
    pub placement: PlacementMode,
    /// How the squad behaves near the target.
    pub behavior: BehaviorMode,
    /// Members planned, elite included.
    pub planned: usize,
    /// Whether the plan included an elite member.
    pub elite: bool,
    /// Handles of the agents that became active.
    pub agents: Vec<AgentHandle>,
    /// Members the world failed to create.
    pub failed: usize,
    /// Launch time.
    pub launched_at: Seconds,
    /// Scheduled despawn time.
    pub despawn_at: Seconds,
}

impl LaunchSummary {
    /// Number of agents that became active.
    #[must_use]
    pub fn spawned(&self) -> usize {
        self.agents.len()
    }
}

/// Result of a launch attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LaunchOutcome {
    /// The raid started.
    Launched(LaunchSummary),
    /// The raid did not start.
    Rejected(RejectReason),
}

impl LaunchOutcome {
    /// Whether the raid started.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, LaunchOutcome::Launched(_))
    }

    /// Launch details, if the raid started.
    #[must_use]
    pub const fn summary(&self) -> Option<&LaunchSummary> {
        match self {
            LaunchOutcome::Launched(summary) => Some(summary),
            LaunchOutcome::Rejected(_) => None,
        }
    }

    /// Rejection reason, if the raid did not start.
    #[must_use]
    pub const fn reason(&self) -> Option<RejectReason> {
        match self {
            LaunchOutcome::Launched(_) => None,
            LaunchOutcome::Rejected(reason) => Some(*reason),
        }
    }
}

impl fmt::Display for LaunchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchOutcome::Launched(s) => {
                let owner = s.target.owner.unwrap_or(OwnerId(0));
                write!(
                    f,
                    "{} started: {}/{} {} raiders sent to the base of {}",
                    s.raid,
                    s.spawned(),
                    s.planned,
                    s.tier,
                    owner
                )?;
                if s.elite {
                    write!(f, " with an elite leader")?;
                }
                write!(
                    f,
                    ", leaving in {:.0}s",
                    (s.despawn_at - s.launched_at).max(0.0)
                )
            }
            LaunchOutcome::Rejected(reason) => write!(f, "Raid not started: {reason}"),
        }
    }
}

/// Periodic raid timer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaidTimer {
    interval: Seconds,
    next_due: Option<Seconds>,
}

impl RaidTimer {
    /// Arm a timer that first fires one interval after `now`.
    ///
    /// A zero or negative interval produces a disabled timer.
    #[must_use]
    pub fn new(interval: Seconds, now: Seconds) -> Self {
        let next_due = (interval > 0.0).then_some(now + interval);
        Self { interval, next_due }
    }

    /// Whether the timer ever fires.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.next_due.is_some()
    }

    /// Next firing time.
    #[must_use]
    pub const fn next_due(&self) -> Option<Seconds> {
        self.next_due
    }

    /// Returns `true` at most once per call when the timer is due, then
    /// re-arms it. Missed intervals collapse into a single firing.
    pub fn poll(&mut self, now: Seconds) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if due > now {
            return false;
        }
        let missed = ((now - due) / self.interval).floor();
        self.next_due = Some(due + (missed + 1.0) * self.interval);
        true
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Scheduler activity.
    pub activity: TickActivity,
    /// Outcome of the timer-triggered raid, if the timer fired.
    pub timer_launch: Option<LaunchOutcome>,
}

/// Owns the raid state and runs the launch pipeline.
#[derive(Debug, Clone)]
pub struct RaidDirector<R = ChaCha8Rng> {
    config: RaidConfig,
    policy: DamagePolicy,
    lifecycle: AgentLifecycle,
    timer: RaidTimer,
    rng: R,
    next_raid: u64,
}

impl RaidDirector<ChaCha8Rng> {
    /// Create a director with a seeded RNG. The timer is armed from time zero.
    ///
    /// # Errors
    ///
    /// Returns [`RaidError::InvalidConfig`](crate::error::RaidError::InvalidConfig) if `config` fails validation.
    pub fn new(config: RaidConfig, seed: u64) -> error::Result<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> RaidDirector<R> {
    /// Create a director with the given RNG.
    ///
    /// # Errors
    ///
    /// Returns [`RaidError::InvalidConfig`](crate::error::RaidError::InvalidConfig) if `config` fails validation.
    pub fn with_rng(config: RaidConfig, rng: R) -> error::Result<Self> {
        config.validate()?;
        let timer = RaidTimer::new(config.raid.interval_seconds, 0.0);
        Ok(Self {
            policy: DamagePolicy::from_settings(&config.damage),
            config,
            lifecycle: AgentLifecycle::new(),
            timer,
            rng,
            next_raid: 1,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &RaidConfig {
        &self.config
    }

    /// Replace the configuration and re-arm the timer from `now`.
    ///
    /// Raids already running keep their scheduled despawns. An invalid config
    /// is rejected and the current one stays active.
    ///
    /// # Errors
    ///
    /// Returns [`RaidError::InvalidConfig`](crate::error::RaidError::InvalidConfig) if `config` fails validation.
    pub fn set_config(&mut self, config: RaidConfig, now: Seconds) -> error::Result<()> {
        config.validate()?;
        self.policy = DamagePolicy::from_settings(&config.damage);
        self.timer = RaidTimer::new(config.raid.interval_seconds, now);
        self.config = config;
        Ok(())
    }

    /// Active raid agents and cosmetics.
    #[must_use]
    pub fn registry(&self) -> &RaidRegistry {
        self.lifecycle.registry()
    }

    /// Periodic raid timer.
    #[must_use]
    pub const fn timer(&self) -> &RaidTimer {
        &self.timer
    }

    /// Number of pending scheduled tasks.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.lifecycle.pending_tasks()
    }

    /// Run the launch pipeline for one request.
    pub fn launch<W: WorldAdapter + ?Sized>(
        &mut self,
        world: &mut W,
        request: RaidRequest,
        now: Seconds,
    ) -> LaunchOutcome {
        match self.try_launch(world, request, now) {
            Ok(summary) => LaunchOutcome::Launched(summary),
            Err(reason) => {
                tracing::info!(
                    tier = %request.tier,
                    trigger = ?request.trigger,
                    %reason,
                    "Raid rejected"
                );
                LaunchOutcome::Rejected(reason)
            }
        }
    }

    fn try_launch<W: WorldAdapter + ?Sized>(
        &mut self,
        world: &mut W,
        request: RaidRequest,
        now: Seconds,
    ) -> Result<LaunchSummary, RejectReason> {
        let target = match request.target {
            TargetChoice::Random => {
                target::select_target(&*world, &mut self.rng).ok_or(RejectReason::NoTarget)?
            }
            TargetChoice::Owner(owner) => target::find_by_owner(&*world, owner, &mut self.rng)
                .ok_or(RejectReason::TargetNotFound(owner))?,
            TargetChoice::Explicit(target) => target,
        };
        let owner = target
            .assigned_owner()
            .ok_or(RejectReason::IneligibleTarget)?;

        let owner_online = world.is_owner_present(owner);
        if !gate::may_proceed(owner_online, &self.config.raid, &mut self.rng) {
            return Err(RejectReason::OfflineGate { owner });
        }

        let composition = resolve(request.tier, &self.config, &mut self.rng);
        let plan = plan_squad(
            &*world,
            target.position,
            &composition,
            &self.config,
            &mut self.rng,
        );

        let raid = RaidId(self.next_raid);
        self.next_raid += 1;
        let order = SquadOrder {
            raid,
            tier: composition.tier,
            behavior: composition.behavior,
            now,
        };
        let report = self
            .lifecycle
            .launch_squad(world, &plan, &order, &self.config);

        if report.failed() > 0 {
            tracing::warn!(
                %raid,
                failed = report.failed(),
                planned = plan.spawns.len(),
                "Some raid agents could not be created"
            );
        }
        tracing::info!(
            %raid,
            tier = %composition.tier,
            trigger = ?request.trigger,
            %owner,
            owner_online,
            spawned = report.spawned(),
            elite = composition.elite,
            placement = ?composition.placement,
            behavior = ?composition.behavior,
            "Raid launched"
        );

        Ok(LaunchSummary {
            raid,
            tier: composition.tier,
            trigger: request.trigger,
            target,
            owner_online,
            placement: composition.placement,
            behavior: composition.behavior,
            planned: plan.spawns.len(),
            elite: composition.elite,
            agents: report.handles().collect(),
            failed: report.failed(),
            launched_at: now,
            despawn_at: now + self.config.raid.despawn_seconds,
        })
    }

    /// Advance timed work to `now`: fire the periodic raid if due, then run
    /// every scheduled task that has come due.
    pub fn tick<W: WorldAdapter + ?Sized>(&mut self, world: &mut W, now: Seconds) -> TickReport {
        let timer_launch = if self.timer.poll(now) {
            tracing::debug!(now, "Raid timer fired");
            let request = RaidRequest::random(self.config.raid.timer_tier, Trigger::Timer);
            Some(self.launch(world, request, now))
        } else {
            None
        };

        let activity = self.lifecycle.run_due(world, now, &self.config);
        if !activity.is_empty() {
            tracing::debug!(
                now,
                expired = activity.expired.len(),
                engaged = activity.engaged.len(),
                cosmetics = activity.cosmetics_removed,
                "Raid tasks ran"
            );
        }

        TickReport {
            activity,
            timer_launch,
        }
    }

    /// Damage hook: decide whether a combat-damage event is suppressed.
    #[inline]
    #[must_use]
    pub fn filter_damage(&self, event: &DamageEvent) -> DamageVerdict {
        self.policy.evaluate(event, self.lifecycle.registry())
    }

    /// Death hook: forget an agent that died. Returns `None` if it was not a raid agent.
    pub fn on_agent_died(&mut self, handle: AgentHandle) -> Option<AgentExit> {
        self.lifecycle.on_agent_died(handle)
    }

    /// Shutdown hook: kill every raid agent and drop all pending work.
    pub fn force_kill_all<W: WorldAdapter + ?Sized>(&mut self, world: &mut W) -> ShutdownReport {
        self.lifecycle.force_kill_all(world)
    }
}
