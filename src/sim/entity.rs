//! Entity model: every live object on the field
//!
//! Entities are plain data plus small per-type behaviors. Coordinates are screen
//! space (origin top-left, y grows downward) and every box is axis-aligned.
//! Removal is by end-of-tick filtering, so a swept entity is never touched again.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::abilities::{self, Ability, AbilityLevels, PlayerStats};
use crate::consts::*;

/// Axis-aligned bounding box (top-left + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

/// Anything with a box on the field
pub trait Positioned {
    fn bounds(&self) -> Rect;

    fn center(&self) -> Vec2 {
        self.bounds().center()
    }
}

/// Per-tick integration, `frame` is elapsed time in 16 ms reference frames
pub trait Updatable {
    fn update(&mut self, frame: f32);
}

/// Things with a health pool
pub trait Damageable {
    fn health(&self) -> f32;
    fn max_health(&self) -> f32;
    fn apply_damage(&mut self, amount: f32);

    fn is_destroyed(&self) -> bool {
        self.health() <= 0.0
    }

    fn health_fraction(&self) -> f32 {
        if self.max_health() > 0.0 {
            (self.health() / self.max_health()).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Selectable ship archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Character {
    #[default]
    Classic,
    Blade,
    Heavy,
    Stealth,
    Hexagon,
    Triangle,
    Star,
}

/// Base ship stats set on creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipStats {
    pub speed: f32,
    pub shot_cooldown_ms: f32,
    pub bullet_damage: f32,
    pub defense: f32,
    pub color: u32,
}

/// Fixed stat gain applied on every player level-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelUpBonus {
    pub lives: u32,
    pub damage: f32,
    pub defense: f32,
}

impl Character {
    pub const ALL: [Character; 7] = [
        Character::Classic,
        Character::Blade,
        Character::Heavy,
        Character::Stealth,
        Character::Hexagon,
        Character::Triangle,
        Character::Star,
    ];

    /// Out-of-range indices fall back to Classic
    pub fn from_index(index: u8) -> Self {
        match Self::ALL.get(index as usize) {
            Some(character) => *character,
            None => {
                log::warn!("Unknown character index {}, using Classic", index);
                Character::Classic
            }
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Character::Classic => "Classic",
            Character::Blade => "Blade",
            Character::Heavy => "Heavy",
            Character::Stealth => "Stealth",
            Character::Hexagon => "Hexagon",
            Character::Triangle => "Triangle",
            Character::Star => "Star",
        }
    }

    pub fn ship_stats(self) -> ShipStats {
        let (speed, shot_cooldown_ms, bullet_damage, defense, color) = match self {
            Character::Classic => (5.0, 200.0, 25.0, 10.0, 0x00ffff),
            Character::Blade => (7.0, 150.0, 20.0, 5.0, 0xff0080),
            Character::Heavy => (3.0, 300.0, 35.0, 20.0, 0xff4400),
            Character::Stealth => (6.0, 100.0, 22.0, 8.0, 0x8800ff),
            Character::Hexagon => (4.0, 250.0, 28.0, 12.0, 0x00ff80),
            Character::Triangle => (6.5, 180.0, 30.0, 7.0, 0xffff00),
            Character::Star => (4.5, 220.0, 27.0, 15.0, 0xff00ff),
        };
        ShipStats {
            speed,
            shot_cooldown_ms,
            bullet_damage,
            defense,
            color,
        }
    }

    pub fn level_up_bonus(self) -> LevelUpBonus {
        let (lives, damage, defense) = match self {
            Character::Classic => (2, 15.0, 10.0),
            Character::Blade => (1, 20.0, 5.0),
            Character::Heavy => (3, 12.0, 15.0),
            Character::Stealth => (2, 18.0, 8.0),
            Character::Hexagon => (2, 16.0, 12.0),
            Character::Triangle => (1, 22.0, 7.0),
            Character::Star => (2, 17.0, 13.0),
        };
        LevelUpBonus {
            lives,
            damage,
            defense,
        }
    }
}

/// The local player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub character: Character,
    pub health: f32,
    pub max_health: f32,
    pub bullet_damage: f32,
    /// Flat armor subtracted from every incoming hit
    pub defense: f32,
    /// Pixels per reference frame
    pub speed: f32,
    pub shot_cooldown_ms: f32,
    /// Session time of the last shot (None = never fired)
    pub last_shot_ms: Option<f64>,
    pub color: u32,
}

impl Player {
    pub fn new(character: Character) -> Self {
        let stats = character.ship_stats();
        Self {
            pos: Self::spawn_point(),
            size: Vec2::splat(PLAYER_SIZE),
            character,
            health: PLAYER_BASE_HEALTH,
            max_health: PLAYER_BASE_HEALTH,
            bullet_damage: stats.bullet_damage,
            defense: stats.defense,
            speed: stats.speed,
            shot_cooldown_ms: stats.shot_cooldown_ms,
            last_shot_ms: None,
            color: stats.color,
        }
    }

    /// Bottom-centre of the field
    pub fn spawn_point() -> Vec2 {
        Vec2::new(
            FIELD_WIDTH / 2.0 - PLAYER_SIZE / 2.0,
            FIELD_HEIGHT - PLAYER_SPAWN_OFFSET,
        )
    }

    pub fn move_to_spawn(&mut self) {
        self.pos = Self::spawn_point();
    }

    /// Park below the field while respawning
    pub fn park_off_field(&mut self) {
        self.pos = Vec2::new(
            FIELD_WIDTH / 2.0 - self.size.x / 2.0,
            FIELD_HEIGHT + PLAYER_PARK_OFFSET,
        );
    }

    /// Move along the intent axis (-1..1 per component), clamped to the field
    pub fn steer(
        &mut self,
        axis: Vec2,
        frame: f32,
        stats: &PlayerStats,
        levels: &AbilityLevels,
    ) {
        let step = abilities::effective_speed(self.speed, stats, levels) * frame;
        self.pos += axis * step;
        self.pos.x = self.pos.x.clamp(0.0, FIELD_WIDTH - self.size.x);
        self.pos.y = self.pos.y.clamp(0.0, FIELD_HEIGHT - self.size.y);
    }

    /// Apply a hit after flat armor. Returns the health actually removed.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = (amount - self.defense).max(1.0);
        self.health = (self.health - actual).max(0.0);
        actual
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn ready_to_fire(&self, now_ms: f64, levels: &AbilityLevels) -> bool {
        let cooldown = abilities::effective_cooldown(self.shot_cooldown_ms, levels) as f64;
        match self.last_shot_ms {
            Some(last) => now_ms - last > cooldown,
            None => true,
        }
    }

    /// Fire a volley if the cooldown allows, returning the new bullets
    pub fn fire(&mut self, now_ms: f64, levels: &AbilityLevels) -> Vec<Bullet> {
        if !self.ready_to_fire(now_ms, levels) {
            return Vec::new();
        }
        self.last_shot_ms = Some(now_ms);

        let damage = abilities::shot_damage(self.bullet_damage, levels);
        let scale = abilities::bullet_scale(levels);
        let penetration = levels.level(Ability::BulletPenetration);
        let piercing = penetration > 0;
        let muzzle_x = self.pos.x + self.size.x / 2.0 - 2.0;
        let muzzle_y = self.pos.y;

        let straight = |x: f32, speed: f32, damage: f32, angle: f32, scale: f32| {
            let bullet = Bullet::new(x, muzzle_y, speed, damage, angle, piercing).with_scale(scale);
            if piercing {
                bullet.with_penetrations(penetration)
            } else {
                bullet
            }
        };

        let mut volley = vec![straight(muzzle_x, PLAYER_BULLET_SPEED, damage, 0.0, scale)];

        for i in 1..=levels.level(Ability::ExtraBullets) {
            let x = muzzle_x + abilities::extra_bullet_offset(i);
            volley.push(straight(x, PLAYER_BULLET_SPEED, damage, 0.0, scale));
        }

        for i in 1..=levels.level(Ability::MultiShot) {
            volley.push(straight(
                muzzle_x,
                PLAYER_BULLET_SPEED,
                damage * abilities::MULTI_SHOT_DAMAGE,
                abilities::multi_shot_angle(i),
                scale * 0.8,
            ));
        }

        for _ in 0..levels.level(Ability::HomingBullets) {
            volley.push(
                Bullet::homing(
                    muzzle_x,
                    muzzle_y,
                    PLAYER_BULLET_SPEED,
                    damage * abilities::HOMING_DAMAGE,
                )
                .with_scale(scale),
            );
        }

        // Archetype patterns use the unmodified base damage
        let base = self.bullet_damage;
        match self.character {
            Character::Hexagon => {
                let y = self.pos.y + 10.0;
                volley.push(Bullet::new(self.pos.x - 5.0, y, -7.5, base * 0.7, -0.3, piercing));
                volley.push(Bullet::new(
                    self.pos.x + self.size.x + 5.0,
                    y,
                    -7.5,
                    base * 0.7,
                    0.3,
                    piercing,
                ));
            }
            Character::Triangle => {
                volley.push(
                    Bullet::new(muzzle_x, muzzle_y, -10.0, base * 1.2, 0.0, true).with_penetrations(3),
                );
            }
            Character::Star => {
                for i in [-2, -1, 1, 2] {
                    volley.push(Bullet::new(
                        muzzle_x,
                        self.pos.y + 5.0,
                        -7.0,
                        base * 0.6,
                        i as f32 * 0.2,
                        piercing,
                    ));
                }
            }
            _ => {}
        }

        volley
    }
}

impl Positioned for Player {
    fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

impl Damageable for Player {
    fn health(&self) -> f32 {
        self.health
    }

    fn max_health(&self) -> f32 {
        self.max_health
    }

    fn apply_damage(&mut self, amount: f32) {
        self.take_damage(amount);
    }
}

/// Player bullet vertical speed (negative = upward)
pub const PLAYER_BULLET_SPEED: f32 = -8.0;
pub const BULLET_WIDTH: f32 = 4.0;
pub const BULLET_HEIGHT: f32 = 8.0;
pub const HOMING_STRENGTH: f32 = 0.1;

/// How a player bullet moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Guidance {
    Straight,
    /// Steers toward an enemy by id; re-acquired when the target is gone
    Homing { target: Option<u32>, strength: f32 },
}

/// A player bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// Signed launch speed, magnitude is held by homing bullets
    pub speed: f32,
    pub damage: f32,
    /// Size multiplier from Heavy Rounds
    pub scale: f32,
    pub piercing: bool,
    pub penetrations_left: u32,
    pub guidance: Guidance,
    /// Ids of enemies already struck; a piercing bullet hits each one once
    pub struck: Vec<u32>,
    /// Consumed this tick, swept at end of tick
    pub spent: bool,
}

impl Bullet {
    /// `speed` is the vertical velocity; `angle` tilts the shot sideways
    pub fn new(x: f32, y: f32, speed: f32, damage: f32, angle: f32, piercing: bool) -> Self {
        debug_assert!(damage > 0.0, "bullets must carry positive damage");
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
            vel: Vec2::new(angle.sin() * speed.abs(), speed),
            speed,
            damage,
            scale: 1.0,
            piercing,
            penetrations_left: if piercing { 1 } else { 0 },
            guidance: Guidance::Straight,
            struck: Vec::new(),
            spent: false,
        }
    }

    pub fn homing(x: f32, y: f32, speed: f32, damage: f32) -> Self {
        Self {
            guidance: Guidance::Homing {
                target: None,
                strength: HOMING_STRENGTH,
            },
            ..Self::new(x, y, speed, damage, 0.0, false)
        }
    }

    /// Bullets only grow; a scale below 1 keeps the base box
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        if scale > 1.0 {
            self.size = Vec2::new(BULLET_WIDTH * scale, BULLET_HEIGHT * scale);
        }
        self
    }

    pub fn with_penetrations(mut self, count: u32) -> Self {
        self.penetrations_left = count;
        self
    }

    pub fn is_homing(&self) -> bool {
        matches!(self.guidance, Guidance::Homing { .. })
    }

    /// Advance one step, steering homing bullets toward a live enemy
    pub fn update(&mut self, frame: f32, enemies: &[Enemy]) {
        if let Guidance::Homing { target, strength } = self.guidance {
            let center = self.center();
            let tracked = target
                .and_then(|id| enemies.iter().find(|e| e.id == id && e.is_alive()))
                .or_else(|| nearest_enemy(center, enemies));

            self.guidance = Guidance::Homing {
                target: tracked.map(|e| e.id),
                strength,
            };

            if let Some(enemy) = tracked {
                let delta = enemy.center() - center;
                let distance = delta.length();
                if distance > 0.0 {
                    self.vel += delta / distance * strength;
                    self.vel = self.vel.normalize_or_zero() * self.speed.abs();
                }
            }
        }

        self.pos += self.vel * frame;
    }

    pub fn has_struck(&self, enemy_id: u32) -> bool {
        self.struck.contains(&enemy_id)
    }

    /// Register a hit on an enemy. Returns true once the bullet is used up.
    pub fn register_enemy_hit(&mut self, enemy_id: u32) -> bool {
        self.struck.push(enemy_id);
        self.register_hit()
    }

    /// Register a hit. Returns true once the bullet is used up.
    pub fn register_hit(&mut self) -> bool {
        if !self.piercing {
            self.spent = true;
        } else {
            self.penetrations_left = self.penetrations_left.saturating_sub(1);
            if self.penetrations_left == 0 {
                self.spent = true;
            }
        }
        self.spent
    }

    pub fn on_field(&self) -> bool {
        self.pos.y > -10.0 && self.pos.x > -50.0 && self.pos.x < FIELD_WIDTH + 50.0
    }
}

impl Positioned for Bullet {
    fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

fn nearest_enemy(from: Vec2, enemies: &[Enemy]) -> Option<&Enemy> {
    enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            a.center()
                .distance_squared(from)
                .partial_cmp(&b.center().distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// A bullet fired by an enemy or the boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub spent: bool,
}

impl EnemyBullet {
    /// `spread` is a lane index; each lane tilts the shot by 0.3 rad
    pub fn new(x: f32, y: f32, speed: f32, damage: f32, spread: f32) -> Self {
        debug_assert!(damage > 0.0, "bullets must carry positive damage");
        Self {
            pos: Vec2::new(x - BULLET_WIDTH / 2.0, y),
            size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
            vel: Vec2::new((spread * 0.3).sin() * speed, speed),
            damage,
            spent: false,
        }
    }

    pub fn on_field(&self) -> bool {
        self.pos.y < FIELD_HEIGHT + 10.0
    }
}

impl Positioned for EnemyBullet {
    fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

impl Updatable for EnemyBullet {
    fn update(&mut self, frame: f32) {
        self.pos += self.vel * frame;
    }
}

pub const ENEMY_SIZE: f32 = 25.0;
pub const ENEMY_BULLET_SPEED: f32 = 5.0;

/// A regular wave enemy drifting down the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    /// Difficulty tier 1..=10
    pub level: u32,
    pub health: f32,
    pub max_health: f32,
    /// Contact damage
    pub damage: f32,
    pub xp_reward: u32,
    /// Downward pixels per reference frame
    pub speed: f32,
    /// Render hue in degrees
    pub hue: f32,
    /// Killed this tick (kill already credited), swept at end of tick
    pub killed: bool,
}

impl Enemy {
    pub fn new<R: Rng + ?Sized>(id: u32, pos: Vec2, level: u32, rng: &mut R) -> Self {
        let level = level.clamp(1, MAX_ENEMY_LEVEL);
        let (max_health, damage, xp_reward) = Self::level_stats(level);
        Self {
            id,
            pos,
            size: Vec2::splat(ENEMY_SIZE),
            level,
            health: max_health,
            max_health,
            damage,
            xp_reward,
            speed: 2.0 + rng.random::<f32>() * 2.0 + level as f32 * 0.3,
            hue: 300.0 + rng.random::<f32>() * 60.0,
            killed: false,
        }
    }

    /// (max health, contact damage, xp reward) for a level
    pub fn level_stats(level: u32) -> (f32, f32, u32) {
        let l = level as f32;
        (25.0 + 15.0 * l, 10.0 + 5.0 * l, 20 + 10 * level)
    }

    pub fn is_alive(&self) -> bool {
        !self.killed && self.health > 0.0
    }

    /// Level 3+ enemies occasionally shoot straight down
    pub fn maybe_fire<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<EnemyBullet> {
        if self.level < 3 {
            return None;
        }
        let chance = 0.005 * (self.level as f32 / 3.0);
        if rng.random::<f32>() < chance {
            let muzzle = Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y + self.size.y);
            Some(EnemyBullet::new(
                muzzle.x,
                muzzle.y,
                ENEMY_BULLET_SPEED,
                10.0 + self.level as f32 * 2.0,
                0.0,
            ))
        } else {
            None
        }
    }
}

impl Positioned for Enemy {
    fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

impl Updatable for Enemy {
    fn update(&mut self, frame: f32) {
        self.pos.y += self.speed * frame;
    }
}

impl Damageable for Enemy {
    fn health(&self) -> f32 {
        self.health
    }

    fn max_health(&self) -> f32 {
        self.max_health
    }

    fn apply_damage(&mut self, amount: f32) {
        self.health -= amount;
    }
}

pub const BOSS_WIDTH: f32 = 100.0;
pub const BOSS_HEIGHT: f32 = 80.0;
/// Boss descends until its top edge reaches this line, then patrols
pub const BOSS_PATROL_Y: f32 = 50.0;

/// The boss-wave singleton
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub size: Vec2,
    pub wave: u32,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    /// Contact damage
    pub damage: f32,
    pub bullet_damage: f32,
    pub shot_cooldown_ms: f32,
    pub last_shot_ms: Option<f64>,
    /// Horizontal patrol direction (+1 right, -1 left)
    pub direction: f32,
    pub color: u32,
    /// Kill credited, waiting for the removal delay
    pub defeated: bool,
}

impl Boss {
    pub fn new(wave: u32) -> Self {
        let w = wave as f32;
        let max_health = 1000.0 * (1.0 + w / 10.0);
        let color = if wave >= 30 {
            0xff00ff
        } else if wave >= 20 {
            0xffaa00
        } else {
            0xff0000
        };
        Self {
            pos: Vec2::new(FIELD_WIDTH / 2.0 - BOSS_WIDTH / 2.0, -100.0),
            size: Vec2::new(BOSS_WIDTH, BOSS_HEIGHT),
            wave,
            speed: 1.0 + w / 50.0,
            health: max_health,
            max_health,
            damage: 50.0 + w * 5.0,
            bullet_damage: 20.0 + w * 2.0,
            shot_cooldown_ms: (1000.0 - w * 20.0).max(500.0),
            last_shot_ms: None,
            direction: 1.0,
            color,
            defeated: false,
        }
    }

    /// Fire the wave-dependent pattern if the cooldown has elapsed
    pub fn volley(&mut self, now_ms: f64) -> Vec<EnemyBullet> {
        if let Some(last) = self.last_shot_ms
            && now_ms - last <= self.shot_cooldown_ms as f64
        {
            return Vec::new();
        }
        self.last_shot_ms = Some(now_ms);

        let bottom = self.pos.y + self.size.y;
        let mid = self.pos.x + self.size.x / 2.0;
        let mut shots = vec![EnemyBullet::new(mid, bottom, 6.0, self.bullet_damage, 0.0)];
        if self.wave >= 20 {
            let side = self.bullet_damage * 0.8;
            shots.push(EnemyBullet::new(self.pos.x + 20.0, bottom, 5.0, side, 0.0));
            shots.push(EnemyBullet::new(self.pos.x + self.size.x - 20.0, bottom, 5.0, side, 0.0));
        }
        if self.wave >= 30 {
            let spread = self.bullet_damage * 0.7;
            shots.push(EnemyBullet::new(mid - 30.0, bottom, 5.0, spread, -1.0));
            shots.push(EnemyBullet::new(mid + 30.0, bottom, 5.0, spread, 1.0));
        }
        shots
    }

    pub fn has_left_field(&self) -> bool {
        self.pos.y > FIELD_HEIGHT + 100.0
    }
}

impl Positioned for Boss {
    fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

impl Updatable for Boss {
    fn update(&mut self, frame: f32) {
        let step = self.speed * frame;
        if self.pos.y < BOSS_PATROL_Y {
            self.pos.y += step;
        } else {
            self.pos.x += self.direction * step * 2.0;
            if self.pos.x <= 0.0 || self.pos.x >= FIELD_WIDTH - self.size.x {
                self.direction = -self.direction;
            }
        }
    }
}

impl Damageable for Boss {
    fn health(&self) -> f32 {
        self.health
    }

    fn max_health(&self) -> f32 {
        self.max_health
    }

    fn apply_damage(&mut self, amount: f32) {
        self.health -= amount;
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PickupKind {
    XpOrb { value: u32 },
    HealthPack { heal: f32 },
}

/// Per-tick velocity drag for pickups
pub const PICKUP_DRAG: f32 = 0.98;

/// A collectible drifting away from where it dropped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// 1.0 at drop, removed at 0
    pub life: f32,
    /// Life lost per reference frame
    pub decay: f32,
}

impl Pickup {
    pub fn xp_orb<R: Rng + ?Sized>(pos: Vec2, value: u32, rng: &mut R) -> Self {
        Self::scattered(PickupKind::XpOrb { value }, pos, 8.0, 0.005, rng)
    }

    pub fn health_pack<R: Rng + ?Sized>(pos: Vec2, heal: f32, rng: &mut R) -> Self {
        Self::scattered(PickupKind::HealthPack { heal }, pos, 12.0, 0.003, rng)
    }

    fn scattered<R: Rng + ?Sized>(
        kind: PickupKind,
        pos: Vec2,
        side: f32,
        decay: f32,
        rng: &mut R,
    ) -> Self {
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * 2.0,
            rng.random::<f32>() * 2.0 + 1.0,
        );
        Self {
            kind,
            pos,
            size: Vec2::splat(side),
            vel,
            life: 1.0,
            decay,
        }
    }

    /// Pull toward `target` when within `radius`, scaled by inverse distance
    pub fn attract(&mut self, target: Vec2, radius: f32, strength: f32) {
        let delta = target - self.pos;
        let distance = delta.length();
        if distance > 0.0 && distance < radius {
            self.vel += delta * strength / distance;
        }
    }

    pub fn expired(&self) -> bool {
        self.life <= 0.0
    }
}

impl Positioned for Pickup {
    fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

impl Updatable for Pickup {
    fn update(&mut self, frame: f32) {
        self.pos += self.vel * frame;
        self.vel *= PICKUP_DRAG;
        self.life -= self.decay * frame;
    }
}

/// Explosion flavors (affects lifetime and size only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionKind {
    Hit,
    Enemy,
    Player,
    Boss,
    Explosive,
}

/// A short-lived cosmetic explosion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub kind: ExplosionKind,
    pub center: Vec2,
    pub frame: f32,
    pub max_frames: f32,
    pub radius: f32,
}

impl Explosion {
    pub fn new(kind: ExplosionKind, center: Vec2) -> Self {
        let (max_frames, radius) = match kind {
            ExplosionKind::Boss => (30.0, 80.0),
            ExplosionKind::Player => (25.0, 60.0),
            ExplosionKind::Explosive => (35.0, 100.0),
            ExplosionKind::Hit | ExplosionKind::Enemy => (15.0, 40.0),
        };
        Self {
            kind,
            center,
            frame: 0.0,
            max_frames,
            radius,
        }
    }

    pub fn finished(&self) -> bool {
        self.frame >= self.max_frames
    }
}

impl Updatable for Explosion {
    fn update(&mut self, frame: f32) {
        // Animation frames advance every 50 ms
        self.frame += frame * REFERENCE_FRAME_MS / 50.0;
    }
}

/// Particle burst flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Critical,
    Heal,
    LevelUp,
}

/// Maximum live particles
pub const MAX_PARTICLES: usize = 256;

/// A cosmetic particle (color is looked up from `kind` by the renderer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases over time
    pub life: f32,
    pub decay: f32,
    pub size: f32,
}

impl Particle {
    pub fn new<R: Rng + ?Sized>(kind: ParticleKind, pos: Vec2, rng: &mut R) -> Self {
        let vx = (rng.random::<f32>() - 0.5) * 8.0;
        let (vel, decay, size) = match kind {
            ParticleKind::Critical => (
                Vec2::new(vx, -rng.random::<f32>() * 4.0 - 2.0),
                0.025,
                rng.random::<f32>() * 3.0 + 4.0,
            ),
            ParticleKind::Heal => (
                Vec2::new(vx, -rng.random::<f32>() * 3.0 - 1.0),
                0.02,
                rng.random::<f32>() * 2.0 + 3.0,
            ),
            ParticleKind::LevelUp => (
                Vec2::new(
                    (rng.random::<f32>() - 0.5) * 4.0,
                    -rng.random::<f32>() * 3.0 - 2.0,
                ),
                0.015,
                rng.random::<f32>() * 4.0 + 2.0,
            ),
        };
        Self {
            kind,
            pos,
            vel,
            life: 1.0,
            decay,
            size,
        }
    }
}

impl Updatable for Particle {
    fn update(&mut self, frame: f32) {
        self.pos += self.vel * frame;
        self.life -= self.decay * frame;
        if self.kind == ParticleKind::LevelUp {
            // Level-up sparks arc back down
            self.vel.y += 0.1 * frame;
        } else {
            self.vel *= 0.98;
        }
    }
}
