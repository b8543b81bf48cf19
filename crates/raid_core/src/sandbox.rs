//! In-memory world for headless runs and tests.
//!
//! Implements [`WorldAdapter`] over plain maps: agents record every command
//! they receive, terrain height comes from a closed-form profile, and spawn or
//! cosmetic failures can be injected. Agents only move when the host calls
//! [`SandboxWorld::advance_agents`].
//!
//! Dead agents stay inspectable until [`SandboxWorld::prune_dead`] evicts them.
//! Long-running hosts call it every tick. With handle recycling enabled, evicted
//! handles are handed out again, the way hosts with pooled entity ids behave.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::composition::ItemGrant;
use crate::math::Vec3;
use crate::world::{
    AgentHandle, CosmeticHandle, ItemSlot, Obstacle, ObstacleId, OwnerId, Target, WorldAdapter,
};

/// Terrain height function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TerrainProfile {
    /// Constant height everywhere.
    Flat {
        /// Ground height.
        height: f32,
    },
    /// Gentle hills: `base + amplitude * sin(x / wavelength) * cos(z / wavelength)`.
    Rolling {
        /// Mean ground height.
        base: f32,
        /// Peak deviation from `base`.
        amplitude: f32,
        /// Horizontal scale of the hills.
        wavelength: f32,
    },
}

impl TerrainProfile {
    /// Flat terrain at `height`.
    #[must_use]
    pub const fn flat(height: f32) -> Self {
        Self::Flat { height }
    }

    /// Rolling terrain.
    #[must_use]
    pub const fn rolling(base: f32, amplitude: f32, wavelength: f32) -> Self {
        Self::Rolling {
            base,
            amplitude,
            wavelength,
        }
    }

    /// Ground height at a horizontal position.
    #[must_use]
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        match *self {
            Self::Flat { height } => height,
            Self::Rolling {
                base,
                amplitude,
                wavelength,
            } => {
                if wavelength <= 0.0 {
                    return base;
                }
                base + amplitude * (x / wavelength).sin() * (z / wavelength).cos()
            }
        }
    }
}

impl Default for TerrainProfile {
    fn default() -> Self {
        Self::flat(0.0)
    }
}

/// State of one sandbox agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxAgent {
    /// World handle.
    pub handle: AgentHandle,
    /// Template it was created from.
    pub template: String,
    /// Current position.
    pub position: Vec3,
    /// Whether it is alive.
    pub alive: bool,
    /// Whether its default inventory was stripped.
    pub stripped: bool,
    /// Items received, in order.
    pub inventory: Vec<ItemGrant>,
    /// Item selected as the active weapon.
    pub active_weapon: Option<String>,
    /// Health multiplier.
    pub health_scale: f32,
    /// Display name.
    pub display_name: String,
    /// Movement destination.
    pub destination: Option<Vec3>,
    /// Obstacle held as a threat in memory.
    pub threat: Option<ObstacleId>,
    /// Number of kill requests received.
    pub kill_calls: u32,
}

/// What a sandbox cosmetic is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SandboxCosmetic {
    /// Map marker at a position.
    Marker {
        /// Marker position.
        position: Vec3,
        /// Marker label.
        label: String,
    },
    /// Flyover pass.
    Flyover {
        /// Start of the pass.
        from: Vec3,
        /// End of the pass.
        to: Vec3,
    },
}

/// In-memory [`WorldAdapter`].
#[derive(Debug, Clone, Default)]
pub struct SandboxWorld {
    terrain: TerrainProfile,
    bases: Vec<Target>,
    online: HashSet<OwnerId>,
    obstacles: Vec<Obstacle>,
    agents: HashMap<AgentHandle, SandboxAgent>,
    cosmetics: HashMap<CosmeticHandle, SandboxCosmetic>,
    deaths: Vec<AgentHandle>,
    free_agents: Vec<AgentHandle>,
    recycle_handles: bool,
    next_agent: u64,
    next_cosmetic: u64,
    failing_spawns: u32,
    cosmetics_unavailable: bool,
}

impl SandboxWorld {
    /// Create an empty world with the given terrain.
    #[must_use]
    pub fn new(terrain: TerrainProfile) -> Self {
        Self {
            terrain,
            next_agent: 1,
            next_cosmetic: 1,
            ..Self::default()
        }
    }

    /// Terrain profile.
    #[must_use]
    pub const fn terrain(&self) -> TerrainProfile {
        self.terrain
    }

    /// Register a base.
    pub fn add_base(&mut self, target: Target) {
        self.bases.push(target);
    }

    /// Every registered base, eligible or not.
    #[must_use]
    pub fn bases(&self) -> &[Target] {
        &self.bases
    }

    /// Mark an owner as connected or disconnected.
    pub fn set_owner_online(&mut self, owner: OwnerId, online: bool) {
        if online {
            self.online.insert(owner);
        } else {
            self.online.remove(&owner);
        }
    }

    /// Register a static obstacle.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Make the next `count` agent creations fail.
    pub fn fail_next_spawns(&mut self, count: u32) {
        self.failing_spawns = count;
    }

    /// Enable or disable marker and flyover creation.
    pub fn set_cosmetics_available(&mut self, available: bool) {
        self.cosmetics_unavailable = !available;
    }

    /// Reuse the handles of pruned agents for new agents.
    pub fn set_recycle_handles(&mut self, recycle: bool) {
        self.recycle_handles = recycle;
        if !recycle {
            self.free_agents.clear();
        }
    }

    /// Evict dead agents whose deaths were already taken. Returns how many.
    pub fn prune_dead(&mut self) -> usize {
        let pending = &self.deaths;
        let mut dead: Vec<AgentHandle> = self
            .agents
            .values()
            .filter(|a| !a.alive && !pending.contains(&a.handle))
            .map(|a| a.handle)
            .collect();
        dead.sort_unstable_by(|a, b| b.cmp(a));
        for handle in &dead {
            self.agents.remove(handle);
        }
        if self.recycle_handles {
            self.free_agents.extend(dead.iter().copied());
        }
        dead.len()
    }

    /// Number of agents held, alive or dead.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Look up an agent, alive or dead.
    #[must_use]
    pub fn agent(&self, handle: AgentHandle) -> Option<&SandboxAgent> {
        self.agents.get(&handle)
    }

    /// Handles of every living agent, sorted.
    #[must_use]
    pub fn living_agents(&self) -> Vec<AgentHandle> {
        let mut handles: Vec<_> = self
            .agents
            .values()
            .filter(|a| a.alive)
            .map(|a| a.handle)
            .collect();
        handles.sort_unstable();
        handles
    }

    /// Number of kill requests an agent received.
    #[must_use]
    pub fn kill_calls(&self, handle: AgentHandle) -> u32 {
        self.agents.get(&handle).map_or(0, |a| a.kill_calls)
    }

    /// Kill an agent as if by combat. Returns whether it was alive.
    ///
    /// The death is queued for [`SandboxWorld::take_deaths`] so the host can
    /// forward it to the raid engine.
    pub fn kill_in_combat(&mut self, handle: AgentHandle) -> bool {
        match self.agents.get_mut(&handle) {
            Some(agent) if agent.alive => {
                agent.alive = false;
                self.deaths.push(handle);
                true
            }
            _ => false,
        }
    }

    /// Drain combat deaths since the last call.
    pub fn take_deaths(&mut self) -> Vec<AgentHandle> {
        std::mem::take(&mut self.deaths)
    }

    /// Move an agent instantly.
    pub fn teleport(&mut self, handle: AgentHandle, position: Vec3) {
        if let Some(agent) = self.agents.get_mut(&handle) {
            agent.position = position;
        }
    }

    /// Move every living agent up to `distance` toward its destination,
    /// snapping it onto the terrain.
    pub fn advance_agents(&mut self, distance: f32) {
        let terrain = self.terrain;
        for agent in self.agents.values_mut().filter(|a| a.alive) {
            let Some(destination) = agent.destination else {
                continue;
            };
            let remaining = agent.position.horizontal_distance(destination);
            let (x, z) = if remaining <= distance || remaining <= f32::EPSILON {
                (destination.x, destination.z)
            } else {
                let t = distance / remaining;
                (
                    agent.position.x + (destination.x - agent.position.x) * t,
                    agent.position.z + (destination.z - agent.position.z) * t,
                )
            };
            agent.position = Vec3::new(x, terrain.height_at(x, z), z);
        }
    }

    /// Whether a cosmetic is still present.
    #[must_use]
    pub fn has_cosmetic(&self, handle: CosmeticHandle) -> bool {
        self.cosmetics.contains_key(&handle)
    }

    /// Look up a cosmetic.
    #[must_use]
    pub fn cosmetic(&self, handle: CosmeticHandle) -> Option<&SandboxCosmetic> {
        self.cosmetics.get(&handle)
    }

    /// Number of cosmetics present.
    #[must_use]
    pub fn cosmetic_count(&self) -> usize {
        self.cosmetics.len()
    }

    fn next_cosmetic_handle(&mut self) -> Option<CosmeticHandle> {
        if self.cosmetics_unavailable {
            return None;
        }
        let handle = CosmeticHandle(self.next_cosmetic);
        self.next_cosmetic += 1;
        Some(handle)
    }
}

impl WorldAdapter for SandboxWorld {
    fn create_agent(&mut self, template: &str, position: Vec3) -> Option<AgentHandle> {
        if self.failing_spawns > 0 {
            self.failing_spawns -= 1;
            return None;
        }
        if template.is_empty() {
            return None;
        }
        let handle = match self.free_agents.pop() {
            Some(handle) => handle,
            None => {
                let handle = AgentHandle(self.next_agent);
                self.next_agent += 1;
                handle
            }
        };
        self.agents.insert(
            handle,
            SandboxAgent {
                handle,
                template: template.to_string(),
                position,
                alive: true,
                stripped: false,
                inventory: Vec::new(),
                active_weapon: None,
                health_scale: 1.0,
                display_name: String::new(),
                destination: None,
                threat: None,
                kill_calls: 0,
            },
        );
        Some(handle)
    }

    fn ground_height(&self, x: f32, z: f32) -> f32 {
        self.terrain.height_at(x, z)
    }

    fn find_ownable_bases(&self) -> Vec<Target> {
        self.bases.clone()
    }

    fn is_owner_present(&self, owner: OwnerId) -> bool {
        self.online.contains(&owner)
    }

    fn strip_inventory(&mut self, agent: AgentHandle) {
        if let Some(agent) = self.agents.get_mut(&agent) {
            agent.inventory.clear();
            agent.active_weapon = None;
            agent.stripped = true;
        }
    }

    fn give_item(&mut self, agent: AgentHandle, item: &str, amount: u32, slot: ItemSlot) {
        if let Some(agent) = self.agents.get_mut(&agent) {
            agent.inventory.push(ItemGrant::new(item, amount, slot));
        }
    }

    fn set_active_weapon(&mut self, agent: AgentHandle) {
        if let Some(agent) = self.agents.get_mut(&agent) {
            agent.active_weapon = agent
                .inventory
                .iter()
                .find(|g| g.slot == ItemSlot::Belt)
                .map(|g| g.item.clone());
        }
    }

    fn set_health_scale(&mut self, agent: AgentHandle, scale: f32) {
        if let Some(agent) = self.agents.get_mut(&agent) {
            agent.health_scale = scale;
        }
    }

    fn set_display_name(&mut self, agent: AgentHandle, name: &str) {
        if let Some(agent) = self.agents.get_mut(&agent) {
            agent.display_name = name.to_string();
        }
    }

    fn set_destination(&mut self, agent: AgentHandle, destination: Vec3) {
        if let Some(agent) = self.agents.get_mut(&agent) {
            agent.destination = Some(destination);
        }
    }

    fn kill_agent(&mut self, agent: AgentHandle) {
        if let Some(agent) = self.agents.get_mut(&agent) {
            agent.kill_calls += 1;
            agent.alive = false;
        }
    }

    fn is_agent_alive(&self, agent: AgentHandle) -> bool {
        self.agents.get(&agent).is_some_and(|a| a.alive)
    }

    fn agent_position(&self, agent: AgentHandle) -> Option<Vec3> {
        self.agents
            .get(&agent)
            .filter(|a| a.alive)
            .map(|a| a.position)
    }

    fn has_perceived_threat(&self, agent: AgentHandle) -> bool {
        self.agents.get(&agent).is_some_and(|a| a.threat.is_some())
    }

    fn find_obstacles(&self, center: Vec3, radius: f32) -> Vec<Obstacle> {
        let radius_sq = radius * radius;
        self.obstacles
            .iter()
            .filter(|o| o.position.distance_squared(center) <= radius_sq)
            .copied()
            .collect()
    }

    fn mark_threat(&mut self, agent: AgentHandle, obstacle: ObstacleId) {
        if let Some(agent) = self.agents.get_mut(&agent) {
            agent.threat = Some(obstacle);
        }
    }

    fn create_marker(&mut self, position: Vec3, label: &str) -> Option<CosmeticHandle> {
        let handle = self.next_cosmetic_handle()?;
        self.cosmetics.insert(
            handle,
            SandboxCosmetic::Marker {
                position,
                label: label.to_string(),
            },
        );
        Some(handle)
    }

    fn spawn_flyover(&mut self, from: Vec3, to: Vec3) -> Option<CosmeticHandle> {
        let handle = self.next_cosmetic_handle()?;
        self.cosmetics
            .insert(handle, SandboxCosmetic::Flyover { from, to });
        Some(handle)
    }

    fn remove_cosmetic(&mut self, cosmetic: CosmeticHandle) {
        self.cosmetics.remove(&cosmetic);
    }
}
