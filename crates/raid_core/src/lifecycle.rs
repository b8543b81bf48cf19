//! Agent lifecycle management.
//!
//! Every squad member moves through
//! `Planned → Spawning → Active → (Expired | Killed)`:
//!
//! - **Planned**: a [`SpawnPlan`] produced by placement.
//! - **Spawning**: one `create_agent` call inside [`AgentLifecycle::launch_squad`].
//!   It ends in [`AgentState::Active`], or in [`AgentState::Abandoned`] when
//!   the world fails to create the agent. The rest of the squad proceeds.
//! - **Active**: default inventory is stripped, the equipment and loot plans
//!   are applied, the agent is sent toward the target and registered. A
//!   despawn is scheduled and, for structure-aggro squads, a periodic recheck.
//! - **Expired**: the despawn task fired while the agent was still alive.
//! - **Killed**: the agent died in combat or was force-killed on shutdown.
//!
//! Leaving the registry is reported as an [`AgentExit`] carrying the terminal
//! state. Scheduled tasks never hold references to agents. They carry the
//! handle and raid id and re-check the registry and the world when they run,
//! so a task whose agent already died is a no-op even if the host handed the
//! same handle to a newer agent.

use serde::{Deserialize, Serialize};

use crate::composition::{Role, Tier};
use crate::config::RaidConfig;
use crate::math::Vec3;
use crate::placement::{BehaviorMode, PlacementPlan, SpawnPlan};
use crate::registry::{ActiveCosmetic, CosmeticKind, RaidAgent, RaidId, RaidRegistry};
use crate::schedule::{Scheduler, Seconds, Task};
use crate::world::{AgentHandle, CosmeticHandle, ObstacleId, WorldAdapter};

/// Observable state of one squad member once spawning returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// Spawned, equipped, and registered.
    Active,
    /// Removed by its despawn timer.
    Expired,
    /// Died in combat or was force-killed.
    Killed,
    /// The world failed to create it; nothing was registered.
    Abandoned,
}

/// Outcome for one planned member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberOutcome {
    /// Member role.
    pub role: Role,
    /// Planned spawn position.
    pub position: Vec3,
    /// World handle, if creation succeeded.
    pub handle: Option<AgentHandle>,
    /// State after the launch call returned.
    pub state: AgentState,
}

/// Everything that happened while launching one squad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadReport {
    /// Raid the squad belongs to.
    pub raid: RaidId,
    /// One outcome per planned member, in plan order.
    pub members: Vec<MemberOutcome>,
    /// Target marker, if one was created.
    pub marker: Option<CosmeticHandle>,
    /// Flyover effect, if one was started.
    pub flyover: Option<CosmeticHandle>,
}

impl SquadReport {
    /// Number of members that became active.
    #[must_use]
    pub fn spawned(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.state == AgentState::Active)
            .count()
    }

    /// Number of members the world failed to create.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.state == AgentState::Abandoned)
            .count()
    }

    /// Handles of every member that became active.
    pub fn handles(&self) -> impl Iterator<Item = AgentHandle> + '_ {
        self.members.iter().filter_map(|m| m.handle)
    }

    /// Whether the elite member became active.
    #[must_use]
    pub fn elite_spawned(&self) -> bool {
        self.members
            .iter()
            .any(|m| m.role == Role::Elite && m.state == AgentState::Active)
    }
}

/// Per-launch parameters that are not part of the placement plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquadOrder {
    /// Raid identifier.
    pub raid: RaidId,
    /// Tier of the raid.
    pub tier: Tier,
    /// Post-spawn behavior.
    pub behavior: BehaviorMode,
    /// Launch time.
    pub now: Seconds,
}

/// A registered agent leaving the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentExit {
    /// World handle.
    pub handle: AgentHandle,
    /// Raid the agent belonged to.
    pub raid: RaidId,
    /// Member role.
    pub role: Role,
    /// Terminal state: [`AgentState::Expired`] or [`AgentState::Killed`].
    pub state: AgentState,
}

impl AgentExit {
    fn new(agent: &RaidAgent, state: AgentState) -> Self {
        Self {
            handle: agent.handle,
            raid: agent.raid,
            role: agent.role,
            state,
        }
    }
}

/// Result of one structure-attack recheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecheckOutcome {
    /// The agent is gone; no further rechecks.
    Stopped,
    /// Nothing to do this time.
    Idle,
    /// An obstacle was marked as a threat.
    Engaged(ObstacleId),
}

/// What the scheduler did during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickActivity {
    /// Agents killed by their despawn timer.
    pub expired: Vec<AgentExit>,
    /// Obstacles marked as threats.
    pub engaged: Vec<(AgentHandle, ObstacleId)>,
    /// Cosmetics removed on expiry.
    pub cosmetics_removed: usize,
}

impl TickActivity {
    /// Whether nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.engaged.is_empty() && self.cosmetics_removed == 0
    }
}

/// Result of a forced shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownReport {
    /// Agents removed from the registry and killed.
    pub agents_killed: usize,
    /// Cosmetics removed.
    pub cosmetics_removed: usize,
    /// Pending tasks dropped.
    pub tasks_cancelled: usize,
}

/// Owns the raid registry and the task scheduler.
#[derive(Debug, Clone, Default)]
pub struct AgentLifecycle {
    registry: RaidRegistry,
    scheduler: Scheduler,
}

impl AgentLifecycle {
    /// Create an empty lifecycle manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active agents and cosmetics.
    #[must_use]
    pub fn registry(&self) -> &RaidRegistry {
        &self.registry
    }

    /// Number of pending scheduled tasks.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Due time of the next scheduled task.
    #[must_use]
    pub fn next_due(&self) -> Option<Seconds> {
        self.scheduler.next_due()
    }

    /// Spawn every member of `plan`, start cosmetics, and schedule removals.
    pub fn launch_squad<W: WorldAdapter + ?Sized>(
        &mut self,
        world: &mut W,
        plan: &PlacementPlan,
        order: &SquadOrder,
        config: &RaidConfig,
    ) -> SquadReport {
        let despawn_at = order.now + config.raid.despawn_seconds;

        let flyover = plan.flyover.and_then(|path| {
            let handle = world.spawn_flyover(path.from, path.to);
            if handle.is_none() {
                tracing::debug!(raid = %order.raid, "Flyover effect unavailable");
            }
            handle
        });
        if let Some(handle) = flyover {
            self.track_cosmetic(
                handle,
                order.raid,
                CosmeticKind::Flyover,
                order.now + config.aerial.flyover_seconds,
            );
        }

        let marker = plan
            .marker
            .and_then(|position| world.create_marker(position, &config.raid.marker_label));
        if let Some(handle) = marker {
            self.track_cosmetic(handle, order.raid, CosmeticKind::Marker, despawn_at);
        }

        let mut members = Vec::with_capacity(plan.spawns.len());
        for spawn in &plan.spawns {
            members.push(self.spawn_member(&mut *world, spawn, plan.target, order, config));
        }

        SquadReport {
            raid: order.raid,
            members,
            marker,
            flyover,
        }
    }

    fn spawn_member<W: WorldAdapter + ?Sized>(
        &mut self,
        world: &mut W,
        spawn: &SpawnPlan,
        target: Vec3,
        order: &SquadOrder,
        config: &RaidConfig,
    ) -> MemberOutcome {
        let mut outcome = MemberOutcome {
            role: spawn.role(),
            position: spawn.position,
            handle: None,
            state: AgentState::Abandoned,
        };

        let Some(handle) = world.create_agent(&spawn.template, spawn.position) else {
            tracing::warn!(
                raid = %order.raid,
                template = %spawn.template,
                role = ?spawn.role(),
                "Failed to create raid agent; continuing with the rest of the squad"
            );
            return outcome;
        };

        let equipment = &spawn.member.equipment;
        world.strip_inventory(handle);
        for grant in &equipment.items {
            world.give_item(handle, &grant.item, grant.amount, grant.slot);
        }
        world.set_active_weapon(handle);
        for grant in &spawn.member.loot {
            world.give_item(handle, &grant.item, grant.amount, grant.slot);
        }
        world.set_health_scale(handle, equipment.health_scale);
        world.set_display_name(handle, &equipment.display_name);
        world.set_destination(handle, target);

        let despawn_at = order.now + config.raid.despawn_seconds;
        self.registry.insert_agent(RaidAgent {
            handle,
            raid: order.raid,
            role: spawn.role(),
            tier: order.tier,
            target,
            behavior: order.behavior,
            spawned_at: order.now,
            despawn_at,
        });
        self.scheduler
            .schedule(despawn_at, Task::Despawn(handle, order.raid));
        if order.behavior == BehaviorMode::StructureAggro {
            self.scheduler.schedule(
                order.now + config.structure_attack.recheck_seconds,
                Task::Recheck(handle, order.raid),
            );
        }

        tracing::debug!(
            raid = %order.raid,
            agent = %handle,
            role = ?spawn.role(),
            despawn_at,
            "Raid agent active"
        );
        outcome.handle = Some(handle);
        outcome.state = AgentState::Active;
        outcome
    }

    fn track_cosmetic(
        &mut self,
        handle: CosmeticHandle,
        raid: RaidId,
        kind: CosmeticKind,
        expires_at: Seconds,
    ) {
        self.registry.insert_cosmetic(ActiveCosmetic {
            handle,
            raid,
            kind,
            expires_at,
        });
        self.scheduler
            .schedule(expires_at, Task::RemoveCosmetic(handle, raid));
    }

    fn owns_agent(&self, handle: AgentHandle, raid: RaidId) -> bool {
        self.registry.agent(handle).is_some_and(|a| a.raid == raid)
    }

    fn owns_cosmetic(&self, handle: CosmeticHandle, raid: RaidId) -> bool {
        self.registry
            .cosmetics()
            .any(|c| c.handle == handle && c.raid == raid)
    }

    /// Run every task due at or before `now`.
    pub fn run_due<W: WorldAdapter + ?Sized>(
        &mut self,
        world: &mut W,
        now: Seconds,
        config: &RaidConfig,
    ) -> TickActivity {
        let mut activity = TickActivity::default();

        while let Some((_, task)) = self.scheduler.pop_due(now) {
            match task {
                Task::Despawn(handle, raid) => {
                    if !self.owns_agent(handle, raid) {
                        continue;
                    }
                    if let Some(exit) = self.despawn(world, handle) {
                        if exit.state == AgentState::Expired {
                            activity.expired.push(exit);
                        }
                    }
                }
                Task::Recheck(handle, raid) => {
                    if !self.owns_agent(handle, raid) {
                        continue;
                    }
                    match self.recheck(world, handle, config) {
                        RecheckOutcome::Stopped => {}
                        outcome => {
                            if let RecheckOutcome::Engaged(obstacle) = outcome {
                                activity.engaged.push((handle, obstacle));
                            }
                            self.scheduler.schedule(
                                now + config.structure_attack.recheck_seconds,
                                Task::Recheck(handle, raid),
                            );
                        }
                    }
                }
                Task::RemoveCosmetic(handle, raid) => {
                    if self.owns_cosmetic(handle, raid) {
                        self.registry.remove_cosmetic(handle);
                        world.remove_cosmetic(handle);
                        activity.cosmetics_removed += 1;
                    }
                }
            }
        }

        activity
    }

    /// Remove a raid agent, killing it if it is still alive.
    ///
    /// Returns `None` for an agent that is not registered. An agent that died
    /// without the death being reported exits as [`AgentState::Killed`].
    pub fn despawn<W: WorldAdapter + ?Sized>(
        &mut self,
        world: &mut W,
        handle: AgentHandle,
    ) -> Option<AgentExit> {
        let agent = self.registry.remove_agent(handle)?;
        if !world.is_agent_alive(handle) {
            tracing::debug!(agent = %handle, "Raid agent already dead at despawn");
            return Some(AgentExit::new(&agent, AgentState::Killed));
        }
        world.kill_agent(handle);
        tracing::debug!(agent = %handle, raid = %agent.raid, "Raid agent despawned");
        Some(AgentExit::new(&agent, AgentState::Expired))
    }

    /// Record that a raid agent died. Returns `None` if it was not registered.
    pub fn on_agent_died(&mut self, handle: AgentHandle) -> Option<AgentExit> {
        let agent = self.registry.remove_agent(handle)?;
        tracing::debug!(agent = %handle, raid = %agent.raid, "Raid agent killed");
        Some(AgentExit::new(&agent, AgentState::Killed))
    }

    /// Re-evaluate structure-attack behavior for one agent.
    pub fn recheck<W: WorldAdapter + ?Sized>(
        &mut self,
        world: &mut W,
        handle: AgentHandle,
        config: &RaidConfig,
    ) -> RecheckOutcome {
        let Some(agent) = self.registry.agent(handle) else {
            return RecheckOutcome::Stopped;
        };
        let target = agent.target;

        let position = if world.is_agent_alive(handle) {
            world.agent_position(handle)
        } else {
            None
        };
        let Some(position) = position else {
            self.registry.remove_agent(handle);
            return RecheckOutcome::Stopped;
        };

        let settings = &config.structure_attack;
        if position.horizontal_distance(target) > settings.proximity
            || world.has_perceived_threat(handle)
        {
            return RecheckOutcome::Idle;
        }

        let nearest = world
            .find_obstacles(position, settings.scan_radius)
            .into_iter()
            .filter(|o| o.kind.is_attackable())
            .min_by(|a, b| {
                a.position
                    .distance_squared(position)
                    .total_cmp(&b.position.distance_squared(position))
            });

        match nearest {
            Some(obstacle) => {
                world.mark_threat(handle, obstacle.id);
                tracing::debug!(
                    agent = %handle,
                    obstacle = obstacle.id.0,
                    kind = ?obstacle.kind,
                    "Raid agent engaging obstacle"
                );
                RecheckOutcome::Engaged(obstacle.id)
            }
            None => RecheckOutcome::Idle,
        }
    }

    /// Kill every registered agent, remove every cosmetic, and drop all tasks.
    ///
    /// Every drained agent ends [`AgentState::Killed`].
    pub fn force_kill_all<W: WorldAdapter + ?Sized>(&mut self, world: &mut W) -> ShutdownReport {
        let tasks_cancelled = self.scheduler.len();
        self.scheduler.clear();

        let agents = self.registry.drain_agents();
        for agent in &agents {
            world.kill_agent(agent.handle);
        }
        let cosmetics = self.registry.drain_cosmetics();
        for cosmetic in &cosmetics {
            world.remove_cosmetic(cosmetic.handle);
        }

        let report = ShutdownReport {
            agents_killed: agents.len(),
            cosmetics_removed: cosmetics.len(),
            tasks_cancelled,
        };
        tracing::info!(
            agents = report.agents_killed,
            cosmetics = report.cosmetics_removed,
            tasks = report.tasks_cancelled,
            "Raid subsystem cleaned up"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::resolve;
    use crate::config::SquadSize;
    use crate::placement::plan_squad;
    use crate::sandbox::{SandboxWorld, TerrainProfile};
    use crate::world::{Obstacle, ObstacleKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup(tier: Tier, config: &RaidConfig) -> (SandboxWorld, PlacementPlan, SquadOrder) {
        let world = SandboxWorld::new(TerrainProfile::flat(10.0));
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let composition = resolve(tier, config, &mut rng);
        let plan = plan_squad(&world, Vec3::ZERO, &composition, config, &mut rng);
        let order = SquadOrder {
            raid: RaidId(1),
            tier,
            behavior: composition.behavior,
            now: 0.0,
        };
        (world, plan, order)
    }

    #[test]
    fn test_launch_registers_every_member() {
        let config = RaidConfig::default();
        let (mut world, plan, order) = setup(Tier::Hard, &config);
        let mut lifecycle = AgentLifecycle::new();

        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        assert_eq!(report.spawned(), plan.spawns.len());
        assert_eq!(report.failed(), 0);
        assert!(report.elite_spawned());
        assert_eq!(lifecycle.registry().agent_count(), plan.spawns.len());
        let marker = report.marker.expect("marker");
        assert!(lifecycle.registry().contains_cosmetic(marker));

        lifecycle.run_due(&mut world, config.raid.despawn_seconds, &config);
        assert!(!lifecycle.registry().contains_cosmetic(marker));
        assert!(!world.has_cosmetic(marker));
    }

    #[test]
    fn test_agents_are_equipped_and_sent_to_target() {
        let config = RaidConfig::default();
        let (mut world, plan, order) = setup(Tier::Normal, &config);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);

        for (spawn, handle) in plan.spawns.iter().zip(report.handles()) {
            let agent = world.agent(handle).expect("agent exists");
            assert!(agent.stripped);
            assert!(agent.active_weapon.is_some());
            assert_eq!(agent.display_name, spawn.member.equipment.display_name);
            assert_eq!(agent.destination, Some(Vec3::ZERO));
            let expected = spawn.member.equipment.items.len() + spawn.member.loot.len();
            assert_eq!(agent.inventory.len(), expected);
        }
    }

    #[test]
    fn test_failed_creation_abandons_only_that_member() {
        let config = RaidConfig::default();
        let (mut world, plan, order) = setup(Tier::Hard, &config);
        world.fail_next_spawns(2);
        let mut lifecycle = AgentLifecycle::new();

        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.spawned(), plan.spawns.len() - 2);
        assert_eq!(lifecycle.registry().agent_count(), plan.spawns.len() - 2);
        assert_eq!(report.members[0].state, AgentState::Abandoned);
        assert!(report.members[0].handle.is_none());
    }

    #[test]
    fn test_despawn_fires_at_duration() {
        let mut config = RaidConfig::default();
        config.raid.despawn_seconds = 600.0;
        let (mut world, plan, order) = setup(Tier::Easy, &config);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);

        let activity = lifecycle.run_due(&mut world, 599.0, &config);
        assert!(activity.expired.is_empty());
        assert_eq!(lifecycle.registry().agent_count(), report.spawned());

        let activity = lifecycle.run_due(&mut world, 600.0, &config);
        assert_eq!(activity.expired.len(), report.spawned());
        assert!(activity
            .expired
            .iter()
            .all(|e| e.state == AgentState::Expired && e.raid == RaidId(1)));
        assert!(lifecycle.registry().is_empty());
        assert!(report.handles().all(|h| !world.is_agent_alive(h)));
    }

    #[test]
    fn test_despawn_after_combat_death_is_noop() {
        let mut config = RaidConfig::default();
        config.raid.despawn_seconds = 600.0;
        let (mut world, plan, order) = setup(Tier::Easy, &config);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        let victim = report.handles().next().expect("at least one agent");

        world.kill_in_combat(victim);
        let exit = lifecycle.on_agent_died(victim).expect("registered");
        assert_eq!(exit.state, AgentState::Killed);
        assert_eq!(exit.raid, RaidId(1));
        assert!(lifecycle.on_agent_died(victim).is_none());

        let kills_before = world.kill_calls(victim);
        let activity = lifecycle.run_due(&mut world, 600.0, &config);
        assert!(activity.expired.iter().all(|e| e.handle != victim));
        assert_eq!(world.kill_calls(victim), kills_before);
    }

    #[test]
    fn test_despawn_unregistered_is_noop() {
        let mut world = SandboxWorld::new(TerrainProfile::flat(0.0));
        let mut lifecycle = AgentLifecycle::new();
        assert_eq!(lifecycle.despawn(&mut world, AgentHandle(77)), None);
    }

    #[test]
    fn test_despawn_of_unreported_death_exits_killed() {
        let config = RaidConfig::default();
        let (mut world, plan, order) = setup(Tier::Easy, &config);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        let handle = report.handles().next().expect("agent");

        world.kill_in_combat(handle);
        let exit = lifecycle.despawn(&mut world, handle).expect("registered");
        assert_eq!(exit.state, AgentState::Killed);
        assert_eq!(world.kill_calls(handle), 0);
    }

    #[test]
    fn test_stale_tasks_ignore_reused_handle() {
        let mut config = RaidConfig::default();
        config.tiers.hard.squad_size = SquadSize::new(1, 1);
        config.tiers.hard.elite = false;
        let (mut world, plan, order) = setup(Tier::Hard, &config);
        world.set_recycle_handles(true);
        let mut lifecycle = AgentLifecycle::new();
        let first = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        let old = first.handles().next().expect("agent");

        world.kill_in_combat(old);
        world.take_deaths();
        lifecycle.on_agent_died(old);
        world.prune_dead();

        let later = SquadOrder {
            raid: RaidId(2),
            now: 300.0,
            ..order
        };
        let second = lifecycle.launch_squad(&mut world, &plan, &later, &config);
        let reused = second.handles().next().expect("agent");
        assert_eq!(reused, old);

        // The first raid's despawn at 420 must not touch the second agent.
        let activity = lifecycle.run_due(&mut world, 420.0, &config);
        assert!(activity.expired.is_empty());
        assert!(world.is_agent_alive(reused));
        assert_eq!(world.kill_calls(reused), 0);

        let activity = lifecycle.run_due(&mut world, 720.0, &config);
        assert_eq!(activity.expired.len(), 1);
        assert_eq!(activity.expired[0].raid, RaidId(2));
        assert_eq!(activity.expired[0].state, AgentState::Expired);
        assert!(!world.is_agent_alive(reused));
    }

    #[test]
    fn test_recheck_engages_nearest_attackable_obstacle() {
        let mut config = RaidConfig::default();
        config.raid.spawn_radius = 5.0;
        let (mut world, plan, order) = setup(Tier::Hard, &config);
        world.add_obstacle(Obstacle {
            id: ObstacleId(1),
            kind: ObstacleKind::Other,
            position: Vec3::new(0.5, 10.0, 0.0),
        });
        world.add_obstacle(Obstacle {
            id: ObstacleId(2),
            kind: ObstacleKind::Door,
            position: Vec3::new(2.0, 10.0, 0.0),
        });
        world.add_obstacle(Obstacle {
            id: ObstacleId(3),
            kind: ObstacleKind::BuildingBlock,
            position: Vec3::new(40.0, 10.0, 0.0),
        });
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        let handle = report.handles().next().expect("agent");
        world.teleport(handle, Vec3::new(1.0, 10.0, 0.0));

        assert_eq!(
            lifecycle.recheck(&mut world, handle, &config),
            RecheckOutcome::Engaged(ObstacleId(2))
        );
        assert_eq!(world.agent(handle).and_then(|a| a.threat), Some(ObstacleId(2)));

        // Now it has a threat in memory and stays idle.
        assert_eq!(
            lifecycle.recheck(&mut world, handle, &config),
            RecheckOutcome::Idle
        );
    }

    #[test]
    fn test_recheck_idle_when_far_from_target() {
        let config = RaidConfig::default();
        let (mut world, plan, order) = setup(Tier::Hard, &config);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        let handle = report.handles().next().expect("agent");
        world.teleport(handle, Vec3::new(500.0, 10.0, 500.0));
        world.add_obstacle(Obstacle {
            id: ObstacleId(5),
            kind: ObstacleKind::Door,
            position: Vec3::new(501.0, 10.0, 500.0),
        });

        assert_eq!(
            lifecycle.recheck(&mut world, handle, &config),
            RecheckOutcome::Idle
        );
    }

    #[test]
    fn test_recheck_stops_after_death() {
        let config = RaidConfig::default();
        let (mut world, plan, order) = setup(Tier::Hard, &config);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        let handle = report.handles().next().expect("agent");

        world.kill_in_combat(handle);
        assert_eq!(
            lifecycle.recheck(&mut world, handle, &config),
            RecheckOutcome::Stopped
        );
        assert!(!lifecycle.registry().contains_agent(handle));
    }

    #[test]
    fn test_rechecks_only_for_structure_aggro() {
        let config = RaidConfig::default();
        let (mut world, plan, order) = setup(Tier::Easy, &config);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        // One despawn per agent plus one marker cleanup.
        assert_eq!(lifecycle.pending_tasks(), report.spawned() + 1);

        let (mut world, plan, order) = setup(Tier::Hard, &config);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        assert_eq!(lifecycle.pending_tasks(), report.spawned() * 2 + 1);
    }

    #[test]
    fn test_marker_removed_with_squad() {
        let config = RaidConfig::default();
        let (mut world, plan, order) = setup(Tier::Easy, &config);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        let marker = report.marker.expect("marker");
        assert!(world.has_cosmetic(marker));

        let activity = lifecycle.run_due(&mut world, config.raid.despawn_seconds, &config);
        assert_eq!(activity.cosmetics_removed, 1);
        assert!(!world.has_cosmetic(marker));
    }

    #[test]
    fn test_aerial_flyover_cleaned_up_early() {
        let config = RaidConfig::default();
        let (mut world, plan, order) = setup(Tier::Boss, &config);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        let flyover = report.flyover.expect("boss raids fly in");

        lifecycle.run_due(&mut world, config.aerial.flyover_seconds, &config);
        assert!(!world.has_cosmetic(flyover));
        assert_eq!(lifecycle.registry().agent_count(), report.spawned());
    }

    #[test]
    fn test_flyover_failure_does_not_block_spawns() {
        let config = RaidConfig::default();
        let (mut world, plan, order) = setup(Tier::Boss, &config);
        world.set_cosmetics_available(false);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);
        assert!(report.flyover.is_none());
        assert!(report.marker.is_none());
        assert_eq!(report.spawned(), plan.spawns.len());
    }

    #[test]
    fn test_force_kill_all_empties_everything() {
        let config = RaidConfig::default();
        let (mut world, plan, order) = setup(Tier::Boss, &config);
        let mut lifecycle = AgentLifecycle::new();
        let report = lifecycle.launch_squad(&mut world, &plan, &order, &config);

        let shutdown = lifecycle.force_kill_all(&mut world);
        assert_eq!(shutdown.agents_killed, report.spawned());
        assert_eq!(shutdown.cosmetics_removed, 2);
        assert!(lifecycle.registry().is_empty());
        assert_eq!(lifecycle.pending_tasks(), 0);
        assert!(report.handles().all(|h| !world.is_agent_alive(h)));
        assert_eq!(world.cosmetic_count(), 0);

        // Late callbacks find nothing to do.
        let activity = lifecycle.run_due(&mut world, f64::MAX, &config);
        assert!(activity.is_empty());
    }
}
