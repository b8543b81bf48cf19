//! Raid configuration.
//!
//! All tunables live in a single [`RaidConfig`] loaded from a RON file. The
//! defaults reproduce a small daily raid: three to six raiders spawning fifty
//! units out, despawning after seven minutes, with offline raids allowed half
//! of the time.
//!
//! # Example RON
//!
//! ```ron
//! RaidConfig(
//!     raid: (
//!         spawn_radius: 50.0,
//!         despawn_seconds: 420.0,
//!         allow_offline_raids: true,
//!         offline_raid_chance: 0.5,
//!         interval_seconds: 86400.0,
//!     ),
//!     damage: (players: true, structures: false),
//! )
//! ```
//!
//! Omitted sections and fields fall back to their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::composition::Tier;
use crate::error::{ConfigError, RaidError, Result};
use crate::placement::{BehaviorMode, PlacementMode};

/// Complete raid configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RaidConfig {
    /// Global raid settings.
    pub raid: RaidSettings,
    /// Per-tier composition rules.
    pub tiers: TierTable,
    /// Elite member equipment and identity.
    pub elite: EliteSettings,
    /// Items every squad member receives.
    pub loadout: LoadoutSettings,
    /// Aerial insertion settings.
    pub aerial: AerialSettings,
    /// Structure-attack behavior settings.
    pub structure_attack: StructureAttackSettings,
    /// Damage suppression per victim category.
    pub damage: DamageSettings,
}

/// Global raid settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaidSettings {
    /// Radius around the target in which squad members appear.
    pub spawn_radius: f32,
    /// Seconds after spawn at which a raid agent is removed.
    pub despawn_seconds: f64,
    /// Whether raids against bases with no connected owner are allowed at all.
    pub allow_offline_raids: bool,
    /// Probability of proceeding when the owner is offline.
    pub offline_raid_chance: f32,
    /// Seconds between automatic raids. Zero or negative disables the timer.
    pub interval_seconds: f64,
    /// Tier used by automatic raids.
    pub timer_tier: Tier,
    /// Host template every raid agent is created from.
    pub agent_template: String,
    /// Display name shown for regular squad members.
    pub display_name: String,
    /// Whether a map marker is placed on the target for the raid's duration.
    pub target_marker: bool,
    /// Label of the target marker.
    pub marker_label: String,
}

impl Default for RaidSettings {
    fn default() -> Self {
        Self {
            spawn_radius: 50.0,
            despawn_seconds: 420.0,
            allow_offline_raids: true,
            offline_raid_chance: 0.5,
            interval_seconds: 86_400.0,
            timer_tier: Tier::Normal,
            agent_template: "assets/rust.ai/agents/npcplayerapex/npcplayerapex.prefab".to_string(),
            display_name: "Raider".to_string(),
            target_marker: true,
            marker_label: "Raid in progress".to_string(),
        }
    }
}

/// Inclusive squad size range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadSize {
    /// Minimum squad size.
    pub min: u32,
    /// Maximum squad size.
    pub max: u32,
}

impl SquadSize {
    /// Create a new range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether `n` lies within the range, inclusive on both ends.
    #[must_use]
    pub const fn contains(self, n: u32) -> bool {
        n >= self.min && n <= self.max
    }
}

/// A weapon and the ammunition that goes with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponKit {
    /// Weapon item identifier.
    pub weapon: String,
    /// Ammunition item identifier.
    pub ammo: String,
    /// Ammunition amount.
    pub ammo_amount: u32,
}

impl WeaponKit {
    /// Create a new kit.
    #[must_use]
    pub fn new(weapon: &str, ammo: &str, ammo_amount: u32) -> Self {
        Self {
            weapon: weapon.to_string(),
            ammo: ammo.to_string(),
            ammo_amount,
        }
    }
}

/// One weighted loot table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootEntry {
    /// Item identifier.
    pub item: String,
    /// Minimum amount dropped.
    pub min_amount: u32,
    /// Maximum amount dropped.
    pub max_amount: u32,
    /// Relative draw weight.
    pub weight: u32,
}

impl LootEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(item: &str, min_amount: u32, max_amount: u32, weight: u32) -> Self {
        Self {
            item: item.to_string(),
            min_amount,
            max_amount,
            weight,
        }
    }
}

/// Composition rules for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSettings {
    /// Regular squad size range.
    pub squad_size: SquadSize,
    /// Weapon given to regular members.
    pub weapon: WeaponKit,
    /// Whether members also carry a rocket launcher.
    pub heavy_weapons: bool,
    /// Whether one elite member joins the squad. Only honored for Hard and Boss.
    #[serde(default)]
    pub elite: bool,
    /// How members enter the map.
    #[serde(default)]
    pub placement: PlacementMode,
    /// How members behave once near the target.
    #[serde(default)]
    pub behavior: BehaviorMode,
    /// Health multiplier for regular members.
    #[serde(default = "default_health_scale")]
    pub health_scale: f32,
    /// Number of loot draws per member.
    #[serde(default = "default_loot_rolls")]
    pub loot_rolls: u32,
    /// Weighted loot table.
    #[serde(default)]
    pub loot: Vec<LootEntry>,
}

const fn default_health_scale() -> f32 {
    1.0
}

const fn default_loot_rolls() -> u32 {
    1
}

/// Composition rules for every tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    /// Easy tier.
    pub easy: TierSettings,
    /// Normal tier.
    pub normal: TierSettings,
    /// Hard tier.
    pub hard: TierSettings,
    /// Boss tier.
    pub boss: TierSettings,
}

impl TierTable {
    /// Settings for `tier`.
    #[must_use]
    pub const fn get(&self, tier: Tier) -> &TierSettings {
        match tier {
            Tier::Easy => &self.easy,
            Tier::Normal => &self.normal,
            Tier::Hard => &self.hard,
            Tier::Boss => &self.boss,
        }
    }

    /// Mutable settings for `tier`.
    pub fn get_mut(&mut self, tier: Tier) -> &mut TierSettings {
        match tier {
            Tier::Easy => &mut self.easy,
            Tier::Normal => &mut self.normal,
            Tier::Hard => &mut self.hard,
            Tier::Boss => &mut self.boss,
        }
    }
}

impl Default for TierTable {
    fn default() -> Self {
        let common_loot = vec![
            LootEntry::new("scrap", 10, 25, 5),
            LootEntry::new("metal.fragments", 50, 150, 3),
            LootEntry::new("bandage", 1, 3, 2),
        ];
        let rich_loot = vec![
            LootEntry::new("scrap", 25, 60, 4),
            LootEntry::new("metal.refined", 5, 20, 3),
            LootEntry::new("explosive.satchel", 1, 2, 2),
            LootEntry::new("techparts", 1, 3, 1),
        ];

        Self {
            easy: TierSettings {
                squad_size: SquadSize::new(2, 3),
                weapon: WeaponKit::new("pistol.semiauto", "ammo.pistol", 120),
                heavy_weapons: false,
                elite: false,
                placement: PlacementMode::Ground,
                behavior: BehaviorMode::PassiveApproach,
                health_scale: 1.0,
                loot_rolls: 1,
                loot: common_loot.clone(),
            },
            normal: TierSettings {
                squad_size: SquadSize::new(3, 6),
                weapon: WeaponKit::new("smg.thompson", "ammo.pistol", 160),
                heavy_weapons: false,
                elite: false,
                placement: PlacementMode::Ground,
                behavior: BehaviorMode::PassiveApproach,
                health_scale: 1.0,
                loot_rolls: 1,
                loot: common_loot,
            },
            hard: TierSettings {
                squad_size: SquadSize::new(5, 8),
                weapon: WeaponKit::new("rifle.ak", "ammo.rifle", 200),
                heavy_weapons: true,
                elite: true,
                placement: PlacementMode::Ground,
                behavior: BehaviorMode::StructureAggro,
                health_scale: 1.25,
                loot_rolls: 2,
                loot: rich_loot.clone(),
            },
            boss: TierSettings {
                squad_size: SquadSize::new(6, 10),
                weapon: WeaponKit::new("rifle.ak", "ammo.rifle", 240),
                heavy_weapons: true,
                elite: true,
                placement: PlacementMode::Aerial,
                behavior: BehaviorMode::StructureAggro,
                health_scale: 1.5,
                loot_rolls: 3,
                loot: rich_loot,
            },
        }
    }
}

/// Elite member equipment and identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EliteSettings {
    /// Display name of the elite member.
    pub display_name: String,
    /// Elite weapon.
    pub weapon: WeaponKit,
    /// Armor pieces worn by the elite member. Empty for none.
    pub armor: Vec<String>,
    /// Health multiplier for the elite member.
    pub health_scale: f32,
}

impl Default for EliteSettings {
    fn default() -> Self {
        Self {
            display_name: "Raid Leader".to_string(),
            weapon: WeaponKit::new("lmg.m249", "ammo.rifle", 300),
            armor: vec![
                "metal.facemask".to_string(),
                "metal.plate.torso".to_string(),
                "roadsign.kilt".to_string(),
            ],
            health_scale: 2.5,
        }
    }
}

/// Items given to every squad member regardless of tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadoutSettings {
    /// Healing consumable item identifier.
    pub medical_item: String,
    /// Healing consumable amount.
    pub medical_amount: u32,
    /// Heavy weapon carried when the tier enables heavy weaponry.
    pub heavy_weapon: WeaponKit,
}

impl Default for LoadoutSettings {
    fn default() -> Self {
        Self {
            medical_item: "syringe.medical".to_string(),
            medical_amount: 3,
            heavy_weapon: WeaponKit::new("rocket.launcher", "ammo.rocket.basic", 3),
        }
    }
}

/// Aerial insertion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AerialSettings {
    /// Master switch; when off, aerial tiers fall back to ground placement.
    pub enabled: bool,
    /// Height above ground at which aerial members appear.
    pub insertion_height: f32,
    /// Whether a cosmetic flyover accompanies the insertion.
    pub flyover: bool,
    /// Seconds before the flyover effect is cleaned up.
    pub flyover_seconds: f64,
}

impl Default for AerialSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            insertion_height: 80.0,
            flyover: true,
            flyover_seconds: 30.0,
        }
    }
}

/// Structure-attack behavior settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureAttackSettings {
    /// Master switch; when off, every tier approaches passively.
    pub enabled: bool,
    /// Distance from the target within which agents look for obstacles.
    pub proximity: f32,
    /// Radius around the agent scanned for attackable obstacles.
    pub scan_radius: f32,
    /// Seconds between rechecks.
    pub recheck_seconds: f64,
}

impl Default for StructureAttackSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            proximity: 30.0,
            scan_radius: 10.0,
            recheck_seconds: 5.0,
        }
    }
}

/// Damage raid agents may deal, per victim category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageSettings {
    /// Raid agents may damage players.
    pub players: bool,
    /// Raid agents may damage building structures.
    pub structures: bool,
}

impl Default for DamageSettings {
    fn default() -> Self {
        Self {
            players: true,
            structures: true,
        }
    }
}

impl RaidConfig {
    /// Load a config from a RON file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| RaidError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config: RaidConfig =
            ron::from_str(&contents).map_err(|e| RaidError::ConfigParse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a config from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: RaidConfig = ron::from_str(ron).map_err(|e| RaidError::ConfigParse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| RaidError::ConfigSerialize(e.to_string()))
    }

    /// Write the config to a RON file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| RaidError::ConfigIo {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.to_ron_string()?).map_err(io_err)
    }

    /// Load the config at `path`, writing and returning defaults if it does not exist.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let config = Self::default();
        config.save(path)?;
        tracing::info!(path = %path.display(), "Wrote default raid config");
        Ok(config)
    }

    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let raid = &self.raid;
        check_positive("raid.spawn_radius", f64::from(raid.spawn_radius))?;
        check_positive("raid.despawn_seconds", raid.despawn_seconds)?;
        check_probability("raid.offline_raid_chance", raid.offline_raid_chance)?;
        if raid.agent_template.is_empty() {
            return Err(ConfigError::EmptyIdentifier("raid.agent_template"));
        }

        for tier in Tier::ALL {
            let settings = self.tiers.get(tier);
            if settings.squad_size.min > settings.squad_size.max {
                return Err(ConfigError::InvertedSquadSize {
                    tier: tier.to_string(),
                    min: settings.squad_size.min,
                    max: settings.squad_size.max,
                });
            }
            if settings.weapon.weapon.is_empty() {
                return Err(ConfigError::EmptyIdentifier("tier weapon"));
            }
            if !settings.loot.is_empty() && settings.loot.iter().all(|e| e.weight == 0) {
                return Err(ConfigError::UnweightedLootTable {
                    tier: tier.to_string(),
                });
            }
            if let Some(entry) = settings.loot.iter().find(|e| e.min_amount > e.max_amount) {
                return Err(ConfigError::InvertedLootAmount {
                    tier: tier.to_string(),
                    item: entry.item.clone(),
                    min: entry.min_amount,
                    max: entry.max_amount,
                });
            }
        }

        if self.elite.weapon.weapon.is_empty() {
            return Err(ConfigError::EmptyIdentifier("elite.weapon"));
        }

        if self.aerial.enabled {
            check_positive(
                "aerial.insertion_height",
                f64::from(self.aerial.insertion_height),
            )?;
            if self.aerial.flyover {
                check_positive("aerial.flyover_seconds", self.aerial.flyover_seconds)?;
            }
        }
        if self.structure_attack.enabled {
            check_positive(
                "structure_attack.recheck_seconds",
                self.structure_attack.recheck_seconds,
            )?;
        }
        Ok(())
    }

    /// Placement mode actually used for `tier`, honoring the aerial master switch.
    #[must_use]
    pub fn placement_for(&self, tier: Tier) -> PlacementMode {
        match self.tiers.get(tier).placement {
            PlacementMode::Aerial if self.aerial.enabled => PlacementMode::Aerial,
            _ => PlacementMode::Ground,
        }
    }

    /// Behavior mode actually used for `tier`, honoring the structure-attack master switch.
    #[must_use]
    pub fn behavior_for(&self, tier: Tier) -> BehaviorMode {
        match self.tiers.get(tier).behavior {
            BehaviorMode::StructureAggro if self.structure_attack.enabled => {
                BehaviorMode::StructureAggro
            }
            _ => BehaviorMode::PassiveApproach,
        }
    }
}

/// Finite and strictly positive. NaN fails.
fn check_positive(field: &'static str, value: f64) -> std::result::Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn check_probability(field: &'static str, value: f32) -> std::result::Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}
