//! Difficulty tier to squad composition.
//!
//! A [`Composition`] is everything decided about a squad before anything is
//! placed in the world: how many members, which of them is the elite, and the
//! exact items each one receives. Resolution is infallible; an unknown tier
//! name degrades to [`Tier::Normal`].

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{LootEntry, RaidConfig, WeaponKit};
use crate::placement::{BehaviorMode, PlacementMode};
use crate::world::ItemSlot;

/// Raid difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Tier {
    /// Small squad, weak weapons.
    Easy,
    /// Default tier.
    #[default]
    Normal,
    /// Large squad, strong weapons, optional elite.
    Hard,
    /// Largest squad, optional elite, usually aerial.
    Boss,
}

impl Tier {
    /// Every tier, weakest first.
    pub const ALL: [Tier; 4] = [Tier::Easy, Tier::Normal, Tier::Hard, Tier::Boss];

    /// Lowercase name used in commands and config.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Tier::Easy => "easy",
            Tier::Normal => "normal",
            Tier::Hard => "hard",
            Tier::Boss => "boss",
        }
    }

    /// Parse a tier name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Parse a tier name, falling back to [`Tier::Normal`] for anything unknown.
    #[must_use]
    pub fn parse_or_default(name: &str) -> Tier {
        Self::from_name(name).unwrap_or_default()
    }

    /// Whether this tier may include an elite member.
    #[must_use]
    pub const fn allows_elite(self) -> bool {
        matches!(self, Tier::Hard | Tier::Boss)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = std::convert::Infallible;

    /// Never fails; unknown names resolve to [`Tier::Normal`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Tier::parse_or_default(s))
    }
}

/// Role of a squad member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Regular squad member.
    Regular,
    /// The single elite member.
    Elite,
}

/// A quantity of one item placed in a specific inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGrant {
    /// Item identifier.
    pub item: String,
    /// Amount.
    pub amount: u32,
    /// Destination container.
    pub slot: ItemSlot,
}

impl ItemGrant {
    /// Create a new grant.
    #[must_use]
    pub fn new(item: &str, amount: u32, slot: ItemSlot) -> Self {
        Self {
            item: item.to_string(),
            amount,
            slot,
        }
    }
}

/// Equipment given to one member after its default inventory is stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentPlan {
    /// Items in grant order; the first belt weapon becomes the active weapon.
    pub items: Vec<ItemGrant>,
    /// Health multiplier.
    pub health_scale: f32,
    /// Cosmetic display name.
    pub display_name: String,
}

/// Everything decided for one squad member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberPlan {
    /// Member role.
    pub role: Role,
    /// Equipment plan.
    pub equipment: EquipmentPlan,
    /// Tier whose loot table the loot was drawn from.
    pub loot_table: Tier,
    /// Loot drawn for this member.
    pub loot: Vec<ItemGrant>,
}

/// Resolved squad composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// Tier this composition was resolved for.
    pub tier: Tier,
    /// Regular squad size, drawn from the tier's range.
    pub squad_size: u32,
    /// Whether an elite member is included.
    pub elite: bool,
    /// Member plans; regulars first, elite last.
    pub members: Vec<MemberPlan>,
    /// How members enter the map.
    pub placement: PlacementMode,
    /// How members behave near the target.
    pub behavior: BehaviorMode,
}

impl Composition {
    /// Total number of agents, elite included.
    #[must_use]
    pub fn total_agents(&self) -> usize {
        self.members.len()
    }
}

/// Resolve the squad composition for `tier`.
pub fn resolve<R: Rng + ?Sized>(tier: Tier, config: &RaidConfig, rng: &mut R) -> Composition {
    let settings = config.tiers.get(tier);
    let squad_size = rng.gen_range(settings.squad_size.min..=settings.squad_size.max);
    let elite = tier.allows_elite() && settings.elite;

    let mut members = Vec::with_capacity(squad_size as usize + usize::from(elite));
    for _ in 0..squad_size {
        let equipment = EquipmentPlan {
            items: weapon_items(&settings.weapon, settings.heavy_weapons, config),
            health_scale: settings.health_scale,
            display_name: config.raid.display_name.clone(),
        };
        members.push(MemberPlan {
            role: Role::Regular,
            equipment,
            loot_table: tier,
            loot: draw_loot(&settings.loot, settings.loot_rolls, rng),
        });
    }

    if elite {
        let mut items = weapon_items(&config.elite.weapon, settings.heavy_weapons, config);
        items.extend(
            config
                .elite
                .armor
                .iter()
                .map(|piece| ItemGrant::new(piece, 1, ItemSlot::Wear)),
        );
        members.push(MemberPlan {
            role: Role::Elite,
            equipment: EquipmentPlan {
                items,
                health_scale: config.elite.health_scale,
                display_name: config.elite.display_name.clone(),
            },
            loot_table: tier,
            loot: draw_loot(&settings.loot, settings.loot_rolls, rng),
        });
    }

    Composition {
        tier,
        squad_size,
        elite,
        members,
        placement: config.placement_for(tier),
        behavior: config.behavior_for(tier),
    }
}

/// Weapon, ammunition, optional heavy weapon, and healing items.
fn weapon_items(kit: &WeaponKit, heavy: bool, config: &RaidConfig) -> Vec<ItemGrant> {
    let mut items = vec![
        ItemGrant::new(&kit.weapon, 1, ItemSlot::Belt),
        ItemGrant::new(&kit.ammo, kit.ammo_amount, ItemSlot::Main),
    ];
    if heavy {
        let heavy_kit = &config.loadout.heavy_weapon;
        items.push(ItemGrant::new(&heavy_kit.weapon, 1, ItemSlot::Belt));
        items.push(ItemGrant::new(
            &heavy_kit.ammo,
            heavy_kit.ammo_amount,
            ItemSlot::Main,
        ));
    }
    items.push(ItemGrant::new(
        &config.loadout.medical_item,
        config.loadout.medical_amount,
        ItemSlot::Belt,
    ));
    items
}

/// Draw `rolls` weighted entries from `table`. An empty table yields no loot.
fn draw_loot<R: Rng + ?Sized>(table: &[LootEntry], rolls: u32, rng: &mut R) -> Vec<ItemGrant> {
    let mut loot = Vec::new();
    for _ in 0..rolls {
        let Ok(entry) = table.choose_weighted(rng, |e| e.weight) else {
            break;
        };
        let amount = rng.gen_range(entry.min_amount..=entry.max_amount);
        loot.push(ItemGrant::new(&entry.item, amount, ItemSlot::Main));
    }
    loot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SquadSize;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_tier_names_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_name(tier.name()), Some(tier));
        }
        assert_eq!(Tier::from_name("HARD"), Some(Tier::Hard));
        assert_eq!(Tier::from_name(" boss "), Some(Tier::Boss));
    }

    #[test]
    fn test_unknown_tier_falls_back_to_normal() {
        assert_eq!(Tier::from_name("extreme"), None);
        assert_eq!(Tier::parse_or_default("extreme"), Tier::Normal);
        assert_eq!("".parse::<Tier>(), Ok(Tier::Normal));
    }

    #[test]
    fn test_squad_size_within_range() {
        let config = RaidConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for tier in Tier::ALL {
            let range = config.tiers.get(tier).squad_size;
            for _ in 0..200 {
                let composition = resolve(tier, &config, &mut rng);
                assert!(range.contains(composition.squad_size));
            }
        }
    }

    #[test]
    fn test_squad_size_hits_both_bounds() {
        let mut config = RaidConfig::default();
        config.tiers.easy.squad_size = SquadSize::new(2, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let sizes: Vec<u32> = (0..200)
            .map(|_| resolve(Tier::Easy, &config, &mut rng).squad_size)
            .collect();
        assert!(sizes.contains(&2));
        assert!(sizes.contains(&3));
    }

    #[test]
    fn test_elite_is_one_extra_member() {
        let config = RaidConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let composition = resolve(Tier::Hard, &config, &mut rng);

        assert!(composition.elite);
        assert_eq!(
            composition.total_agents(),
            composition.squad_size as usize + 1
        );
        let elites: Vec<_> = composition
            .members
            .iter()
            .filter(|m| m.role == Role::Elite)
            .collect();
        assert_eq!(elites.len(), 1);
        assert_eq!(elites[0].equipment.display_name, config.elite.display_name);
        assert!(elites[0]
            .equipment
            .items
            .iter()
            .any(|i| i.slot == ItemSlot::Wear));
    }

    #[test]
    fn test_elite_flag_ignored_for_low_tiers() {
        let mut config = RaidConfig::default();
        config.tiers.easy.elite = true;
        config.tiers.normal.elite = true;
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for tier in [Tier::Easy, Tier::Normal] {
            let composition = resolve(tier, &config, &mut rng);
            assert!(!composition.elite);
            assert!(composition.members.iter().all(|m| m.role == Role::Regular));
        }
    }

    #[test]
    fn test_every_member_gets_ammo_and_meds() {
        let config = RaidConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for tier in Tier::ALL {
            let composition = resolve(tier, &config, &mut rng);
            for member in &composition.members {
                let items = &member.equipment.items;
                assert!(items.iter().any(|i| i.item == config.loadout.medical_item
                    && i.amount == config.loadout.medical_amount));
                assert!(items.iter().any(|i| i.slot == ItemSlot::Main));
            }
        }
    }

    #[test]
    fn test_heavy_weapons_follow_tier_flag() {
        let config = RaidConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let rocket = &config.loadout.heavy_weapon.weapon;

        let easy = resolve(Tier::Easy, &config, &mut rng);
        assert!(easy.members[0]
            .equipment
            .items
            .iter()
            .all(|i| &i.item != rocket));

        let hard = resolve(Tier::Hard, &config, &mut rng);
        assert!(hard.members[0]
            .equipment
            .items
            .iter()
            .any(|i| &i.item == rocket));
    }

    #[test]
    fn test_weapon_class_scales_with_tier() {
        let config = RaidConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let easy = resolve(Tier::Easy, &config, &mut rng);
        let hard = resolve(Tier::Hard, &config, &mut rng);
        assert_eq!(easy.members[0].equipment.items[0].item, "pistol.semiauto");
        assert_eq!(hard.members[0].equipment.items[0].item, "rifle.ak");
    }

    #[test]
    fn test_loot_rolls_and_amounts() {
        let config = RaidConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        let settings = &config.tiers.hard;
        let composition = resolve(Tier::Hard, &config, &mut rng);
        for member in &composition.members {
            assert_eq!(member.loot.len(), settings.loot_rolls as usize);
            for grant in &member.loot {
                let entry = settings
                    .loot
                    .iter()
                    .find(|e| e.item == grant.item)
                    .expect("loot comes from the tier table");
                assert!(grant.amount >= entry.min_amount && grant.amount <= entry.max_amount);
            }
        }
    }

    #[test]
    fn test_empty_loot_table_yields_no_loot() {
        let mut config = RaidConfig::default();
        config.tiers.easy.loot.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let composition = resolve(Tier::Easy, &config, &mut rng);
        assert!(composition.members.iter().all(|m| m.loot.is_empty()));
    }

    #[test]
    fn test_zero_sized_squad() {
        let mut config = RaidConfig::default();
        config.tiers.normal.squad_size = SquadSize::new(0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(29);
        let composition = resolve(Tier::Normal, &config, &mut rng);
        assert_eq!(composition.total_agents(), 0);
    }

    #[test]
    fn test_unknown_tier_composition_equals_normal() {
        let config = RaidConfig::default();
        let mut a = ChaCha8Rng::seed_from_u64(31);
        let mut b = ChaCha8Rng::seed_from_u64(31);
        let normal = resolve(Tier::Normal, &config, &mut a);
        let extreme = resolve(Tier::parse_or_default("extreme"), &config, &mut b);
        assert_eq!(normal, extreme);
    }
}
