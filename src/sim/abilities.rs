//! Ability and stat modifier system
//!
//! Two upgrade paths feed combat:
//! - `PlayerStats`: shop stats bought with upgrade points. A purchase also bakes
//!   a one-time multiplier into the player's base fields (see `Session::upgrade_stat`).
//! - `AbilityLevels`: abilities picked on level-up. Levels are re-read through the
//!   modifier functions below on every shot, hit, and frame.
//!
//! All modifiers are pure reductions over a stats/levels snapshot. Nothing here
//! changes one ability's level as a side effect of another.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{ABILITY_OFFER_SIZE, MAX_STAT_LEVEL};

/// The sixteen stackable level-up abilities, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    ExtraBullets,
    BulletPenetration,
    ShieldStrength,
    RapidFire,
    HomingBullets,
    ExplosiveBullets,
    HealthBoost,
    SpeedBoost,
    BulletDamage,
    LifeSteal,
    CriticalChance,
    BulletSize,
    Magnetism,
    Berserker,
    TimeWarp,
    MultiShot,
}

impl Ability {
    pub const COUNT: usize = 16;

    pub const ALL: [Ability; Self::COUNT] = [
        Ability::ExtraBullets,
        Ability::BulletPenetration,
        Ability::ShieldStrength,
        Ability::RapidFire,
        Ability::HomingBullets,
        Ability::ExplosiveBullets,
        Ability::HealthBoost,
        Ability::SpeedBoost,
        Ability::BulletDamage,
        Ability::LifeSteal,
        Ability::CriticalChance,
        Ability::BulletSize,
        Ability::Magnetism,
        Ability::Berserker,
        Ability::TimeWarp,
        Ability::MultiShot,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Static definition (name, max level, rarity)
    pub fn def(self) -> &'static AbilityDef {
        &ABILITY_TABLE[self.index()]
    }

    /// Stable camelCase identifier used by UIs and saves
    pub fn id(self) -> &'static str {
        self.def().id
    }

    pub fn max_level(self) -> u32 {
        self.def().max_level
    }

    pub fn rarity(self) -> Rarity {
        self.def().rarity
    }

    /// Parse an identifier. Unknown ids yield `None`; callers pick the fallback.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }
}

/// Offer rarity, controls sampling weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    pub fn weight(self) -> u32 {
        match self {
            Rarity::Common => 50,
            Rarity::Uncommon => 25,
            Rarity::Rare => 15,
            Rarity::Legendary => 5,
        }
    }
}

/// Display metadata and selection limits for one ability
#[derive(Debug)]
pub struct AbilityDef {
    pub ability: Ability,
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub max_level: u32,
    pub rarity: Rarity,
}

/// Indexed by `Ability::index`
pub static ABILITY_TABLE: [AbilityDef; Ability::COUNT] = [
    AbilityDef {
        ability: Ability::ExtraBullets,
        id: "extraBullets",
        name: "Multi-Shot",
        description: "Fire additional bullets with each shot",
        max_level: 5,
        rarity: Rarity::Common,
    },
    AbilityDef {
        ability: Ability::BulletPenetration,
        id: "bulletPenetration",
        name: "Piercing Rounds",
        description: "Bullets pierce through multiple enemies",
        max_level: 3,
        rarity: Rarity::Uncommon,
    },
    AbilityDef {
        ability: Ability::ShieldStrength,
        id: "shieldStrength",
        name: "Energy Shield",
        description: "Reduce incoming damage by 15% per level",
        max_level: 4,
        rarity: Rarity::Common,
    },
    AbilityDef {
        ability: Ability::RapidFire,
        id: "rapidFire",
        name: "Rapid Fire",
        description: "Increase fire rate significantly",
        max_level: 6,
        rarity: Rarity::Common,
    },
    AbilityDef {
        ability: Ability::HomingBullets,
        id: "homingBullets",
        name: "Homing Missiles",
        description: "Bullets track nearest enemies",
        max_level: 3,
        rarity: Rarity::Rare,
    },
    AbilityDef {
        ability: Ability::ExplosiveBullets,
        id: "explosiveBullets",
        name: "Explosive Rounds",
        description: "Kills explode, dealing area damage",
        max_level: 4,
        rarity: Rarity::Rare,
    },
    AbilityDef {
        ability: Ability::HealthBoost,
        id: "healthBoost",
        name: "Vitality Boost",
        description: "Increase maximum health by 50 per level",
        max_level: 5,
        rarity: Rarity::Common,
    },
    AbilityDef {
        ability: Ability::SpeedBoost,
        id: "speedBoost",
        name: "Afterburners",
        description: "Increase movement speed by 25% per level",
        max_level: 4,
        rarity: Rarity::Common,
    },
    AbilityDef {
        ability: Ability::BulletDamage,
        id: "bulletDamage",
        name: "Power Core",
        description: "Increase bullet damage by 40% per level",
        max_level: 5,
        rarity: Rarity::Uncommon,
    },
    AbilityDef {
        ability: Ability::LifeSteal,
        id: "lifeSteal",
        name: "Nano Repair",
        description: "Heal 10 HP for each enemy destroyed",
        max_level: 3,
        rarity: Rarity::Uncommon,
    },
    AbilityDef {
        ability: Ability::CriticalChance,
        id: "criticalChance",
        name: "Critical Strike",
        description: "Chance for bullets to deal double damage",
        max_level: 4,
        rarity: Rarity::Rare,
    },
    AbilityDef {
        ability: Ability::BulletSize,
        id: "bulletSize",
        name: "Heavy Rounds",
        description: "Increase bullet size and damage",
        max_level: 3,
        rarity: Rarity::Uncommon,
    },
    AbilityDef {
        ability: Ability::Magnetism,
        id: "magnetism",
        name: "Magnetic Field",
        description: "Pull XP and health pickups from greater distance",
        max_level: 4,
        rarity: Rarity::Uncommon,
    },
    AbilityDef {
        ability: Ability::Berserker,
        id: "berserker",
        name: "Berserker Mode",
        description: "Deal more damage when health is low",
        max_level: 3,
        rarity: Rarity::Rare,
    },
    AbilityDef {
        ability: Ability::TimeWarp,
        id: "timeWarp",
        name: "Time Dilation",
        description: "Occasionally slow down time for enemies",
        max_level: 2,
        rarity: Rarity::Legendary,
    },
    AbilityDef {
        ability: Ability::MultiShot,
        id: "multiShot",
        name: "Spread Shot",
        description: "Fire bullets in multiple directions",
        max_level: 4,
        rarity: Rarity::Rare,
    },
];

/// Current level of every ability
///
/// Max levels are only enforced when offers are rolled, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityLevels {
    levels: [u32; Ability::COUNT],
}

impl AbilityLevels {
    #[inline]
    pub fn level(&self, ability: Ability) -> u32 {
        self.levels[ability.index()]
    }

    pub fn is_maxed(&self, ability: Ability) -> bool {
        self.level(ability) >= ability.max_level()
    }

    /// Raise one ability by exactly one level, returning the new level
    pub fn increment(&mut self, ability: Ability) -> u32 {
        let slot = &mut self.levels[ability.index()];
        *slot += 1;
        *slot
    }

    /// Builder used when restoring or staging a loadout
    pub fn with_level(mut self, ability: Ability, level: u32) -> Self {
        self.levels[ability.index()] = level;
        self
    }

    /// Abilities that can still be offered
    pub fn eligible(&self) -> impl Iterator<Item = Ability> + '_ {
        Ability::ALL.into_iter().filter(|a| !self.is_maxed(*a))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ability, u32)> + '_ {
        Ability::ALL.into_iter().map(|a| (a, self.level(a)))
    }
}

/// Shop stats bought with upgrade points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Attack,
    Defense,
    Speed,
    FireRate,
    Special,
}

impl StatKind {
    pub fn name(self) -> &'static str {
        match self {
            StatKind::Attack => "Attack",
            StatKind::Defense => "Defense",
            StatKind::Speed => "Speed",
            StatKind::FireRate => "Fire rate",
            StatKind::Special => "Special",
        }
    }

    /// `special` has no cap
    pub fn is_capped(self) -> bool {
        self != StatKind::Special
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a stat purchase was refused
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeError {
    #[error("no upgrade points available")]
    NoUpgradePoints,
    #[error("{0} is already at maximum level")]
    AtMaximum(StatKind),
}

/// Persistent shop multipliers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub fire_rate: u32,
    pub special: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            attack: 1,
            defense: 1,
            speed: 1,
            fire_rate: 1,
            special: 0,
        }
    }
}

impl PlayerStats {
    pub fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
            StatKind::FireRate => self.fire_rate,
            StatKind::Special => self.special,
        }
    }

    fn get_mut(&mut self, kind: StatKind) -> &mut u32 {
        match kind {
            StatKind::Attack => &mut self.attack,
            StatKind::Defense => &mut self.defense,
            StatKind::Speed => &mut self.speed,
            StatKind::FireRate => &mut self.fire_rate,
            StatKind::Special => &mut self.special,
        }
    }

    /// Raise a stat by one if it is below its cap
    pub fn increment(&mut self, kind: StatKind) -> Result<u32, UpgradeError> {
        if kind.is_capped() && self.get(kind) >= MAX_STAT_LEVEL {
            return Err(UpgradeError::AtMaximum(kind));
        }
        let slot = self.get_mut(kind);
        *slot += 1;
        Ok(*slot)
    }
}

// --- Fire rate ---

/// Multiplicative cooldown decay: 0.8^level
#[inline]
pub fn rapid_fire_factor(level: u32) -> f32 {
    0.8f32.powi(level as i32)
}

pub fn effective_cooldown(base_ms: f32, levels: &AbilityLevels) -> f32 {
    base_ms * rapid_fire_factor(levels.level(Ability::RapidFire))
}

// --- Outgoing damage ---

/// Bullet size multiplier from Heavy Rounds
pub fn bullet_scale(levels: &AbilityLevels) -> f32 {
    1.0 + levels.level(Ability::BulletSize) as f32 * 0.5
}

/// Damage stamped on a bullet when it is fired
pub fn shot_damage(base: f32, levels: &AbilityLevels) -> f32 {
    base * (1.0 + levels.level(Ability::BulletSize) as f32 * 0.3)
}

pub fn attack_multiplier(stats: &PlayerStats) -> f32 {
    1.0 + (stats.attack as f32 - 1.0) * 0.2
}

pub fn power_core_multiplier(levels: &AbilityLevels) -> f32 {
    1.0 + levels.level(Ability::BulletDamage) as f32 * 0.4
}

/// Probability of a critical hit (not clamped; >1 always crits)
pub fn crit_chance(levels: &AbilityLevels) -> f32 {
    levels.level(Ability::CriticalChance) as f32 * 0.15
}

/// Bonus applied only below half health
pub fn berserker_multiplier(levels: &AbilityLevels, health_fraction: f32) -> f32 {
    let level = levels.level(Ability::Berserker);
    if level > 0 && health_fraction < 0.5 {
        1.0 + level as f32 * 0.3 * (1.0 - health_fraction)
    } else {
        1.0
    }
}

/// Full damage pipeline for one bullet hit
///
/// power core, then attack stat, then crit (x2), then berserker.
pub fn hit_damage(
    bullet_damage: f32,
    levels: &AbilityLevels,
    stats: &PlayerStats,
    health_fraction: f32,
    critical: bool,
) -> f32 {
    let mut damage = bullet_damage * power_core_multiplier(levels) * attack_multiplier(stats);
    if critical {
        damage *= 2.0;
    }
    damage * berserker_multiplier(levels, health_fraction)
}

// --- Incoming damage ---

/// Defense stat reduction with the 1-damage floor applied before any shield
pub fn defended_damage(raw: f32, stats: &PlayerStats) -> f32 {
    (raw / (1.0 + (stats.defense as f32 - 1.0) * 0.2)).max(1.0)
}

pub fn shield_factor(levels: &AbilityLevels) -> f32 {
    1.0 - levels.level(Ability::ShieldStrength) as f32 * 0.15
}

pub fn incoming_damage(raw: f32, stats: &PlayerStats, levels: &AbilityLevels) -> f32 {
    defended_damage(raw, stats) * shield_factor(levels)
}

// --- Movement ---

pub fn speed_multiplier(stats: &PlayerStats, levels: &AbilityLevels) -> f32 {
    (1.0 + (stats.speed as f32 - 1.0) * 0.1)
        * (1.0 + levels.level(Ability::SpeedBoost) as f32 * 0.25)
}

/// Pixels per reference frame
pub fn effective_speed(base: f32, stats: &PlayerStats, levels: &AbilityLevels) -> f32 {
    base * speed_multiplier(stats, levels)
}

// --- Shot patterns ---

/// Horizontal offset of the i-th extra bullet (1-based): -8, +8, -16, +16, ...
pub fn extra_bullet_offset(i: u32) -> f32 {
    let side = if i % 2 == 0 { 1.0 } else { -1.0 };
    side * i.div_ceil(2) as f32 * 8.0
}

/// Launch angle of the i-th spread bullet (1-based): -0.3, +0.3, -0.6, ...
pub fn multi_shot_angle(i: u32) -> f32 {
    let side = if i % 2 == 0 { 1.0 } else { -1.0 };
    side * i.div_ceil(2) as f32 * 0.3
}

pub const MULTI_SHOT_DAMAGE: f32 = 0.8;
pub const HOMING_DAMAGE: f32 = 0.9;

// --- Pickups ---

pub fn magnet_radius(levels: &AbilityLevels) -> f32 {
    100.0 + levels.level(Ability::Magnetism) as f32 * 50.0
}

pub fn magnet_strength(levels: &AbilityLevels) -> f32 {
    0.3 + levels.level(Ability::Magnetism) as f32 * 0.1
}

// --- Kill effects ---

pub fn splash_radius(levels: &AbilityLevels) -> f32 {
    60.0 + levels.level(Ability::ExplosiveBullets) as f32 * 20.0
}

pub fn splash_damage(levels: &AbilityLevels) -> f32 {
    30.0 + levels.level(Ability::ExplosiveBullets) as f32 * 15.0
}

pub fn life_steal_heal(levels: &AbilityLevels) -> f32 {
    levels.level(Ability::LifeSteal) as f32 * 10.0
}

pub fn boss_life_steal_heal(levels: &AbilityLevels) -> f32 {
    levels.level(Ability::LifeSteal) as f32 * 25.0
}

/// Roll the level-up offer
///
/// Up to three distinct abilities, weighted by rarity, drawn without replacement
/// from those below their max level. If nothing is eligible the first three
/// canonical abilities are shown so the offer is never empty.
pub fn roll_offer<R: Rng + ?Sized>(levels: &AbilityLevels, rng: &mut R) -> Vec<Ability> {
    let mut pool: Vec<Ability> = levels.eligible().collect();
    if pool.is_empty() {
        return Ability::ALL[..ABILITY_OFFER_SIZE].to_vec();
    }

    let mut choices = Vec::with_capacity(ABILITY_OFFER_SIZE);
    while choices.len() < ABILITY_OFFER_SIZE && !pool.is_empty() {
        let total: u32 = pool.iter().map(|a| a.rarity().weight()).sum();
        let mut roll = rng.random_range(0..total);
        let mut pick = pool.len() - 1;
        for (i, ability) in pool.iter().enumerate() {
            let weight = ability.rarity().weight();
            if roll < weight {
                pick = i;
                break;
            }
            roll -= weight;
        }
        choices.push(pool.remove(pick));
    }
    choices
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_table_matches_enum_order() {
        for ability in Ability::ALL {
            assert_eq!(ability.def().ability, ability);
            assert_eq!(Ability::from_id(ability.id()), Some(ability));
        }
        assert_eq!(Ability::from_id("notAnAbility"), None);
    }

    #[test]
    fn test_serde_ids_match_table() {
        let json = serde_json::to_string(&Ability::ExplosiveBullets).unwrap();
        assert_eq!(json, "\"explosiveBullets\"");
    }

    #[test]
    fn test_rapid_fire_factor() {
        assert_eq!(rapid_fire_factor(0), 1.0);
        assert!((rapid_fire_factor(1) - 0.8).abs() < 1e-6);
        assert!((rapid_fire_factor(2) - 0.64).abs() < 1e-6);
    }

    #[test]
    fn test_hit_damage_power_core() {
        let levels = AbilityLevels::default().with_level(Ability::BulletDamage, 2);
        let stats = PlayerStats::default();
        let damage = hit_damage(25.0, &levels, &stats, 1.0, false);
        assert!((damage - 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_hit_damage_attack_and_crit() {
        let levels = AbilityLevels::default();
        let stats = PlayerStats {
            attack: 3,
            ..Default::default()
        };
        // 25 * 1.4 * 2
        let damage = hit_damage(25.0, &levels, &stats, 1.0, true);
        assert!((damage - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_berserker_only_below_half_health() {
        let levels = AbilityLevels::default().with_level(Ability::Berserker, 2);
        assert_eq!(berserker_multiplier(&levels, 0.5), 1.0);
        assert_eq!(berserker_multiplier(&levels, 0.9), 1.0);
        // 1 + 2 * 0.3 * 0.75
        assert!((berserker_multiplier(&levels, 0.25) - 1.45).abs() < 1e-6);
        assert_eq!(berserker_multiplier(&AbilityLevels::default(), 0.1), 1.0);
    }

    #[test]
    fn test_incoming_damage_with_shield() {
        let stats = PlayerStats {
            defense: 2,
            ..Default::default()
        };
        let levels = AbilityLevels::default().with_level(Ability::ShieldStrength, 2);
        // 24 / 1.2 = 20, then * 0.7
        assert!((incoming_damage(24.0, &stats, &levels) - 14.0).abs() < 1e-4);
    }

    #[test]
    fn test_speed_multiplier() {
        let stats = PlayerStats {
            speed: 3,
            ..Default::default()
        };
        let levels = AbilityLevels::default().with_level(Ability::SpeedBoost, 2);
        assert!((effective_speed(5.0, &stats, &levels) - 5.0 * 1.2 * 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_shot_pattern_offsets() {
        let offsets: Vec<f32> = (1..=4).map(extra_bullet_offset).collect();
        assert_eq!(offsets, vec![-8.0, 8.0, -16.0, 16.0]);
        assert!((multi_shot_angle(1) + 0.3).abs() < 1e-6);
        assert!((multi_shot_angle(2) - 0.3).abs() < 1e-6);
        assert!((multi_shot_angle(3) + 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_splash_and_magnet_scaling() {
        let levels = AbilityLevels::default()
            .with_level(Ability::ExplosiveBullets, 1)
            .with_level(Ability::Magnetism, 2);
        assert_eq!(splash_damage(&levels), 45.0);
        assert_eq!(splash_radius(&levels), 80.0);
        assert_eq!(magnet_radius(&levels), 200.0);
        assert!((magnet_strength(&levels) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stat_cap_except_special() {
        let mut stats = PlayerStats {
            attack: MAX_STAT_LEVEL,
            special: 40,
            ..Default::default()
        };
        assert_eq!(
            stats.increment(StatKind::Attack),
            Err(UpgradeError::AtMaximum(StatKind::Attack))
        );
        assert_eq!(stats.attack, MAX_STAT_LEVEL);
        assert_eq!(stats.increment(StatKind::Special), Ok(41));
        assert_eq!(stats.increment(StatKind::Speed), Ok(2));
    }

    #[test]
    fn test_increment_touches_one_ability() {
        let mut levels = AbilityLevels::default().with_level(Ability::Magnetism, 2);
        let before = levels.clone();
        assert_eq!(levels.increment(Ability::RapidFire), 1);
        for (ability, level) in levels.iter() {
            if ability == Ability::RapidFire {
                assert_eq!(level, before.level(ability) + 1);
            } else {
                assert_eq!(level, before.level(ability));
            }
        }
    }

    #[test]
    fn test_offer_is_distinct_and_eligible() {
        let mut rng = Pcg32::seed_from_u64(7);
        let levels = AbilityLevels::default()
            .with_level(Ability::TimeWarp, 2)
            .with_level(Ability::HomingBullets, 3);
        for _ in 0..200 {
            let offer = roll_offer(&levels, &mut rng);
            assert_eq!(offer.len(), 3);
            assert!(!offer.contains(&Ability::TimeWarp));
            assert!(!offer.contains(&Ability::HomingBullets));
            assert_ne!(offer[0], offer[1]);
            assert_ne!(offer[1], offer[2]);
            assert_ne!(offer[0], offer[2]);
        }
    }

    #[test]
    fn test_offer_with_few_eligible() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut levels = AbilityLevels::default();
        for ability in Ability::ALL {
            levels = levels.with_level(ability, ability.max_level());
        }
        levels = levels.with_level(Ability::LifeSteal, 0);
        levels = levels.with_level(Ability::Berserker, 1);

        let mut offer = roll_offer(&levels, &mut rng);
        offer.sort();
        assert_eq!(offer, vec![Ability::LifeSteal, Ability::Berserker]);
    }

    #[test]
    fn test_offer_fallback_when_all_maxed() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut levels = AbilityLevels::default();
        for ability in Ability::ALL {
            levels = levels.with_level(ability, ability.max_level());
        }
        let offer = roll_offer(&levels, &mut rng);
        assert_eq!(
            offer,
            vec![
                Ability::ExtraBullets,
                Ability::BulletPenetration,
                Ability::ShieldStrength
            ]
        );
    }

    #[test]
    fn test_offer_prefers_common() {
        let mut rng = Pcg32::seed_from_u64(99);
        let levels = AbilityLevels::default();
        let mut common = 0;
        let mut legendary = 0;
        for _ in 0..500 {
            let offer = roll_offer(&levels, &mut rng);
            match offer[0].rarity() {
                Rarity::Common => common += 1,
                Rarity::Legendary => legendary += 1,
                _ => {}
            }
        }
        assert!(common > legendary * 5);
    }

    proptest! {
        #[test]
        fn prop_cooldown_strictly_decreasing(base in 1.0f32..1000.0, level in 0u32..20) {
            let levels = AbilityLevels::default().with_level(Ability::RapidFire, level);
            let next = AbilityLevels::default().with_level(Ability::RapidFire, level + 1);
            let now = effective_cooldown(base, &levels);
            prop_assert!(now > 0.0);
            prop_assert!(effective_cooldown(base, &next) < now);
            prop_assert!((now - base * 0.8f32.powi(level as i32)).abs() <= now * 1e-5);
        }

        #[test]
        fn prop_defended_damage_floor(raw in 0.0f32..10_000.0, defense in 1u32..50) {
            let stats = PlayerStats { defense, ..Default::default() };
            prop_assert!(defended_damage(raw, &stats) >= 1.0);
        }

        #[test]
        fn prop_shield_applies_after_floor(raw in 0.0f32..5.0, shield in 0u32..5) {
            let stats = PlayerStats { defense: 10, ..Default::default() };
            let levels = AbilityLevels::default().with_level(Ability::ShieldStrength, shield);
            let expected = 1.0f32.max(raw / 2.8) * (1.0 - shield as f32 * 0.15);
            prop_assert!((incoming_damage(raw, &stats, &levels) - expected).abs() < 1e-5);
        }
    }
}
