//! World adapter boundary.
//!
//! The engine never instantiates game entities itself. Everything it needs
//! from the host (agent creation, inventory, terrain, base discovery, AI
//! nudges, cosmetics) goes through [`WorldAdapter`]. Handles returned by the
//! adapter are opaque to the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Opaque handle to an agent created by the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentHandle(pub u64);

impl fmt::Display for AgentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Opaque handle to a cosmetic entity (map marker, flyover effect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CosmeticHandle(pub u64);

/// Identifier of a base owner. Zero means "unowned".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

impl OwnerId {
    /// Whether this identifier refers to an actual owner.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a static obstacle (door, wall segment) in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(pub u64);

/// An ownable base as reported by the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Owner of the base, if any.
    pub owner: Option<OwnerId>,
    /// Position of the base's ownership anchor.
    pub position: Vec3,
}

impl Target {
    /// Create a target owned by `owner`.
    #[must_use]
    pub const fn owned(owner: OwnerId, position: Vec3) -> Self {
        Self {
            owner: Some(owner),
            position,
        }
    }

    /// Create an unowned target.
    #[must_use]
    pub const fn unowned(position: Vec3) -> Self {
        Self {
            owner: None,
            position,
        }
    }

    /// Owner identifier if the base has a real owner.
    #[must_use]
    pub fn assigned_owner(&self) -> Option<OwnerId> {
        self.owner.filter(|o| o.is_assigned())
    }
}

/// Inventory container an item is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemSlot {
    /// Hotbar; weapons and usable items.
    Belt,
    /// Main inventory; ammunition and loot.
    Main,
    /// Worn clothing and armor.
    Wear,
}

/// Kind of static obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Door or hatch.
    Door,
    /// Wall, floor, or foundation segment.
    BuildingBlock,
    /// Deployables and anything else; never targeted by raid agents.
    Other,
}

impl ObstacleKind {
    /// Whether raid agents will deliberately attack this kind of obstacle.
    #[must_use]
    pub const fn is_attackable(self) -> bool {
        matches!(self, ObstacleKind::Door | ObstacleKind::BuildingBlock)
    }
}

/// A static obstacle found near a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Obstacle identifier.
    pub id: ObstacleId,
    /// Kind of obstacle.
    pub kind: ObstacleKind,
    /// World position.
    pub position: Vec3,
}

/// Everything the raid engine needs from the host world.
///
/// Calls are made from the host's single-threaded tick loop; implementations
/// need no internal synchronization.
pub trait WorldAdapter {
    /// Create an agent from `template` at `position`.
    ///
    /// Returns `None` when the host fails to instantiate it.
    fn create_agent(&mut self, template: &str, position: Vec3) -> Option<AgentHandle>;

    /// Ground elevation at horizontal position `(x, z)`.
    fn ground_height(&self, x: f32, z: f32) -> f32;

    /// All ownable bases currently known to the world.
    fn find_ownable_bases(&self) -> Vec<Target>;

    /// Whether the given owner is currently connected.
    fn is_owner_present(&self, owner: OwnerId) -> bool;

    /// Remove every item the agent template ships with.
    fn strip_inventory(&mut self, agent: AgentHandle);

    /// Give `amount` of `item` to the agent in `slot`.
    fn give_item(&mut self, agent: AgentHandle, item: &str, amount: u32, slot: ItemSlot);

    /// Equip the first weapon on the agent's belt.
    fn set_active_weapon(&mut self, agent: AgentHandle);

    /// Scale the agent's maximum health.
    fn set_health_scale(&mut self, agent: AgentHandle, scale: f32);

    /// Set the cosmetic display name shown to players.
    fn set_display_name(&mut self, agent: AgentHandle, name: &str);

    /// Make the agent aggressive and send it toward `destination`.
    fn set_destination(&mut self, agent: AgentHandle, destination: Vec3);

    /// Destroy the agent. Killing a dead agent must be a no-op.
    fn kill_agent(&mut self, agent: AgentHandle);

    /// Whether the agent still exists and is alive.
    fn is_agent_alive(&self, agent: AgentHandle) -> bool;

    /// Current position of the agent, if it still exists.
    fn agent_position(&self, agent: AgentHandle) -> Option<Vec3>;

    /// Whether the agent's AI currently remembers any threat.
    fn has_perceived_threat(&self, agent: AgentHandle) -> bool;

    /// Static obstacles within `radius` of `center`.
    fn find_obstacles(&self, center: Vec3, radius: f32) -> Vec<Obstacle>;

    /// Register `obstacle` as a known threat so the agent's combat AI engages it.
    fn mark_threat(&mut self, agent: AgentHandle, obstacle: ObstacleId);

    /// Create a map marker at `position`.
    fn create_marker(&mut self, position: Vec3, label: &str) -> Option<CosmeticHandle>;

    /// Start a purely cosmetic flyover from `from` to `to`.
    fn spawn_flyover(&mut self, from: Vec3, to: Vec3) -> Option<CosmeticHandle>;

    /// Remove a marker or effect. Removing a missing cosmetic must be a no-op.
    fn remove_cosmetic(&mut self, cosmetic: CosmeticHandle);
}
