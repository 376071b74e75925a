//! Session state and the player-facing operations on it
//!
//! Everything a tick mutates lives in one `Session`. Delayed work goes through
//! the schedule and is stamped with the session generation, so a reset simply
//! bumps the generation and anything queued before it is ignored.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::abilities::{self, Ability, AbilityLevels, PlayerStats, StatKind, UpgradeError};
use super::entity::{
    Boss, Bullet, Character, Enemy, EnemyBullet, Explosion, MAX_PARTICLES, Particle, ParticleKind,
    Pickup, Player, Positioned,
};
use super::events::{RemoteEvent, RemotePlayers, SimEvent};
use super::lifecycle::{Lifecycle, Progression};
use super::schedule::{Schedule, ScheduledAction};
use super::wave::WaveState;
use crate::consts::*;
use crate::persistence::ProfileSnapshot;
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Not in a run (character select, lobby)
    Menu,
    /// Active gameplay
    Playing,
    /// Explicit pause
    Paused,
    /// Waiting for the player to pick an ability
    AbilitySelect,
    /// Run ended
    GameOver,
}

/// Rotation period for advisor tips
pub const ADVISOR_INTERVAL_MS: f32 = 5000.0;

const ADVISOR_TIPS: [&str; 10] = [
    "Welcome aboard, pilot. Spend upgrade points to tune your ship.",
    "Destroyed enemies sometimes leave upgrade points behind.",
    "Attack upgrades make every bullet hit harder.",
    "Defense upgrades soften incoming hits.",
    "Speed upgrades help you dodge and collect orbs.",
    "Fire rate upgrades shorten the time between shots.",
    "Special upgrades have no cap.",
    "Every tenth wave brings a boss. Be ready.",
    "Nice flying. Keep the pressure on.",
    "Shore up your weakest stat next.",
];

/// Status line shown beside the play field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisor {
    pub message: String,
    tip: usize,
    elapsed_ms: f32,
}

impl Default for Advisor {
    fn default() -> Self {
        Self {
            message: ADVISOR_TIPS[0].to_string(),
            tip: 0,
            elapsed_ms: 0.0,
        }
    }
}

impl Advisor {
    pub fn say(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Rotate tips, or report boss health during a boss fight
    pub fn tick(&mut self, elapsed_ms: f32, boss: Option<&Boss>) {
        self.elapsed_ms += elapsed_ms;
        if self.elapsed_ms < ADVISOR_INTERVAL_MS {
            return;
        }
        self.elapsed_ms = 0.0;
        match boss {
            Some(boss) if !boss.defeated => {
                self.message = format!(
                    "Boss health: {:.0}/{:.0}. Keep firing!",
                    boss.health.max(0.0),
                    boss.max_health
                );
            }
            _ => {
                self.tip = (self.tip + 1) % ADVISOR_TIPS.len();
                self.message = ADVISOR_TIPS[self.tip].to_string();
            }
        }
    }
}

/// The single owned record of a local game session
#[derive(Debug, Clone)]
pub struct Session {
    /// Seed used for the RNG at construction
    pub seed: u64,
    /// Bumped on every start/reset; stale scheduled actions are dropped
    pub generation: u64,
    pub phase: GamePhase,
    pub settings: Settings,
    /// Simulation clock (ms, scaled by game speed, frozen while not playing)
    pub time_ms: f64,
    pub player: Player,
    pub stats: PlayerStats,
    pub abilities: AbilityLevels,
    pub lifecycle: Lifecycle,
    pub progression: Progression,
    pub score: u64,
    pub wave: WaveState,
    pub enemies: Vec<Enemy>,
    /// At most one boss at a time
    pub boss: Option<Boss>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub pickups: Vec<Pickup>,
    pub explosions: Vec<Explosion>,
    pub particles: Vec<Particle>,
    pub schedule: Schedule,
    /// Abilities currently on offer (while in AbilitySelect)
    pub offer: Option<Vec<Ability>>,
    /// Level-ups waiting for their own offer
    pub pending_offers: u32,
    pub advisor: Advisor,
    /// Emit multiplayer events
    pub multiplayer: bool,
    pub remote: RemotePlayers,
    /// Persistent profile (high score, unlocks, user)
    pub profile: ProfileSnapshot,
    pub(crate) last_broadcast_ms: f64,
    pub(crate) rng: Pcg32,
    events: Vec<SimEvent>,
    next_id: u32,
}

impl Session {
    /// Create a session sitting at the menu
    pub fn new(seed: u64, settings: Settings) -> Self {
        let settings = settings.sanitized();
        Self {
            seed,
            generation: 0,
            phase: GamePhase::Menu,
            lifecycle: Lifecycle::new(settings.starting_lives),
            settings,
            time_ms: 0.0,
            player: Player::new(Character::Classic),
            stats: PlayerStats::default(),
            abilities: AbilityLevels::default(),
            progression: Progression::default(),
            score: 0,
            wave: WaveState::default(),
            enemies: Vec::new(),
            boss: None,
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            pickups: Vec::new(),
            explosions: Vec::new(),
            particles: Vec::new(),
            schedule: Schedule::new(),
            offer: None,
            pending_offers: 0,
            advisor: Advisor::default(),
            multiplayer: false,
            remote: RemotePlayers::default(),
            profile: ProfileSnapshot::default(),
            last_broadcast_ms: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Uniform float in [lo, hi) from the session RNG
    pub(crate) fn rng_range(&mut self, lo: f32, hi: f32) -> f32 {
        self.rng.random_range(lo..hi)
    }

    /// Discard the current run and begin a fresh one at wave 1
    pub fn start_game(&mut self, character: Character) {
        self.clear_run();
        self.generation += 1;
        self.player = Player::new(character);
        self.profile.selected_character = character.index();
        self.phase = GamePhase::Playing;
        self.wave = WaveState::new(1, self.time_ms);
        log::info!(
            "Session {} started: {} (lives {})",
            self.generation,
            character.name(),
            self.lifecycle.lives
        );
    }

    /// Tear the run down and return to the menu
    pub fn reset_to_menu(&mut self) {
        self.clear_run();
        self.generation += 1;
        self.phase = GamePhase::Menu;
        log::info!("Session reset to menu (generation {})", self.generation);
    }

    fn clear_run(&mut self) {
        self.schedule.clear();
        self.stats = PlayerStats::default();
        self.abilities = AbilityLevels::default();
        self.lifecycle = Lifecycle::new(self.settings.starting_lives);
        self.progression = Progression::default();
        self.score = 0;
        self.enemies.clear();
        self.boss = None;
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.pickups.clear();
        self.explosions.clear();
        self.particles.clear();
        self.offer = None;
        self.pending_offers = 0;
        self.advisor = Advisor::default();
        self.remote.clear();
        self.events.clear();
        self.last_broadcast_ms = self.time_ms;
    }

    /// Queue an action `delay_ms` of simulation time from now
    pub fn schedule_in(&mut self, delay_ms: f64, action: ScheduledAction) {
        self.schedule
            .push(self.generation, self.time_ms + delay_ms, action);
    }

    pub(crate) fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Take the outbound events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Feed an inbound multiplayer event
    pub fn apply_remote(&mut self, event: RemoteEvent) {
        self.remote.apply(event);
    }

    pub fn spawn_particles(&mut self, kind: ParticleKind, pos: Vec2, count: usize) {
        for _ in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let particle = Particle::new(kind, pos, &mut self.rng);
            self.particles.push(particle);
        }
    }

    /// Grant XP and run the level-up side effects if the threshold is reached
    pub fn gain_xp(&mut self, amount: u32) {
        if let Some(level) = self.progression.gain_xp(amount) {
            self.level_up(level);
        }
    }

    fn level_up(&mut self, level: u32) {
        let bonus = self.player.character.level_up_bonus();
        self.lifecycle.lives += bonus.lives;
        self.player.bullet_damage += bonus.damage;
        self.player.defense += bonus.defense;
        if self.player.speed < 8.0 {
            self.player.speed += 0.1;
        }
        if self.player.shot_cooldown_ms > 100.0 {
            self.player.shot_cooldown_ms -= 5.0;
        }

        let center = self.player.center();
        self.spawn_particles(ParticleKind::LevelUp, center, 30);
        self.schedule_in(ABILITY_OFFER_DELAY_MS as f64, ScheduledAction::OfferAbilities);
        log::info!("Level up: {} (lives {})", level, self.lifecycle.lives);
    }

    /// Present a rolled offer, or queue it behind one that is already open
    pub(crate) fn open_offer(&mut self) {
        if self.offer.is_some() {
            self.pending_offers += 1;
            return;
        }
        let choices = abilities::roll_offer(&self.abilities, &mut self.rng);
        log::debug!("Ability offer: {:?}", choices);
        self.offer = Some(choices);
        self.phase = GamePhase::AbilitySelect;
    }

    /// Pick an offered ability by position. Invalid picks fall back to the first choice.
    pub fn select_ability(&mut self, index: usize) -> Option<Ability> {
        let Some(choices) = self.offer.take() else {
            log::warn!("Ability selected with no offer open");
            return None;
        };
        let ability = match choices.get(index) {
            Some(ability) => *ability,
            None => {
                log::warn!("Ability choice {} out of range, taking the first", index);
                *choices.first()?
            }
        };

        let level = self.abilities.increment(ability);
        self.apply_instant_effect(ability);
        self.advisor
            .say(format!("{} upgraded! Level {}", ability.def().name, level));
        log::info!("Ability {} -> level {}", ability.id(), level);

        if self.pending_offers > 0 {
            self.pending_offers -= 1;
            self.open_offer();
        } else {
            self.phase = GamePhase::Playing;
        }
        Some(ability)
    }

    /// Pick an offered ability by id. Unknown or unoffered ids fall back to the first choice.
    pub fn select_ability_by_id(&mut self, id: &str) -> Option<Ability> {
        let index = self.offer.as_ref().and_then(|choices| {
            Ability::from_id(id).and_then(|a| choices.iter().position(|c| *c == a))
        });
        match index {
            Some(index) => self.select_ability(index),
            None => {
                log::warn!("Ability id {:?} not on offer, taking the first", id);
                self.select_ability(0)
            }
        }
    }

    fn apply_instant_effect(&mut self, ability: Ability) {
        let player = &mut self.player;
        match ability {
            Ability::HealthBoost => {
                player.max_health += 50.0;
                player.health = player.max_health;
            }
            Ability::SpeedBoost => player.speed *= 1.25,
            Ability::BulletDamage => player.bullet_damage *= 1.4,
            Ability::RapidFire => player.shot_cooldown_ms *= 0.8,
            Ability::ShieldStrength => player.defense += 5.0,
            _ => {}
        }
    }

    /// Spend an upgrade point on a shop stat, baking its effect into the player
    pub fn upgrade_stat(&mut self, kind: StatKind) -> Result<u32, UpgradeError> {
        if self.progression.upgrade_points == 0 {
            self.advisor.say("You need more upgrade points!");
            return Err(UpgradeError::NoUpgradePoints);
        }
        let level = match self.stats.increment(kind) {
            Ok(level) => level,
            Err(e) => {
                self.advisor.say(format!("{} is already at maximum level!", kind));
                return Err(e);
            }
        };
        self.progression.upgrade_points -= 1;

        let player = &mut self.player;
        let message = match kind {
            StatKind::Attack => {
                player.bullet_damage *= 1.2;
                "Attack increased. Bullets hit harder."
            }
            StatKind::Defense => {
                player.defense *= 1.2;
                "Defense increased. Hits hurt less."
            }
            StatKind::Speed => {
                player.speed *= 1.1;
                "Speed increased. Your ship moves faster."
            }
            StatKind::FireRate => {
                player.shot_cooldown_ms = (player.shot_cooldown_ms * 0.9).max(50.0);
                "Fire rate increased. You can shoot more often."
            }
            StatKind::Special => "Special upgraded.",
        };
        self.advisor.say(message);
        log::info!("Stat {} -> {}", kind, level);
        Ok(level)
    }

    /// End the run: record the high score and notify the transport
    pub(crate) fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        if self.profile.record_score(self.score) {
            log::info!("New high score: {}", self.score);
        }
        self.emit(SimEvent::GameOver { score: self.score });
        log::info!(
            "Game over: score {}, wave {}, level {}",
            self.score,
            self.wave.number,
            self.progression.level
        );
    }

    /// Profile for an external save collaborator
    pub fn snapshot(&self) -> ProfileSnapshot {
        let mut snapshot = self.profile.clone();
        snapshot.high_score = snapshot.high_score.max(self.score);
        snapshot.player_level = self.progression.level;
        snapshot
    }

    /// Accept a restored profile at session start
    pub fn restore(&mut self, snapshot: ProfileSnapshot) {
        let character = Character::from_index(snapshot.selected_character);
        self.profile = snapshot;
        self.profile.selected_character = character.index();
        if self.phase == GamePhase::Menu {
            self.player = Player::new(character);
        }
    }

    pub fn selected_character(&self) -> Character {
        Character::from_index(self.profile.selected_character)
    }

    pub fn high_score(&self) -> u64 {
        self.profile.high_score
    }

    pub fn player_health_fraction(&self) -> f32 {
        use super::entity::Damageable;
        self.player.health_fraction()
    }

    pub fn banner_text(&self) -> Option<&str> {
        self.wave.banner_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> Session {
        let mut session = Session::new(7, Settings::default());
        session.start_game(Character::Classic);
        session
    }

    #[test]
    fn test_rng_range_is_seeded_and_bounded() {
        let mut a = Session::new(9, Settings::default());
        let mut b = Session::new(9, Settings::default());
        for _ in 0..100 {
            let x = a.rng_range(0.0, FIELD_WIDTH - 40.0);
            assert!((0.0..FIELD_WIDTH - 40.0).contains(&x));
            assert_eq!(x, b.rng_range(0.0, FIELD_WIDTH - 40.0));
        }
    }

    #[test]
    fn test_new_session_defaults() {
        let session = playing();
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.lifecycle.lives, 4);
        assert_eq!(session.progression.level, 1);
        assert_eq!(session.wave.number, 1);
        assert_eq!(session.banner_text(), Some("WAVE 1"));
    }

    #[test]
    fn test_start_bumps_generation_and_clears_schedule() {
        let mut session = playing();
        let generation = session.generation;
        session.schedule_in(100.0, ScheduledAction::StartWave { number: 9 });
        session.reset_to_menu();
        assert_eq!(session.generation, generation + 1);
        assert!(session.schedule.is_empty());
        assert_eq!(session.phase, GamePhase::Menu);
    }

    #[test]
    fn test_level_up_applies_bonus_and_schedules_offer() {
        let mut session = playing();
        let damage = session.player.bullet_damage;
        session.gain_xp(100);
        assert_eq!(session.progression.level, 2);
        assert_eq!(session.lifecycle.lives, 6);
        assert_eq!(session.player.bullet_damage, damage + 15.0);
        assert_eq!(session.player.defense, 20.0);
        assert_eq!(session.player.shot_cooldown_ms, 195.0);
        assert!((session.player.speed - 5.1).abs() < 1e-5);
        assert!(session.schedule.contains(ScheduledAction::OfferAbilities));
        assert_eq!(session.particles.len(), 30);
    }

    #[test]
    fn test_select_ability_increments_exactly_one() {
        let mut session = playing();
        session.open_offer();
        assert_eq!(session.phase, GamePhase::AbilitySelect);
        let before = session.abilities.clone();
        let choice = session.select_ability(1).unwrap();
        for (ability, level) in session.abilities.iter() {
            let expected = before.level(ability) + u32::from(ability == choice);
            assert_eq!(level, expected);
        }
        assert_eq!(session.phase, GamePhase::Playing);
        assert!(session.offer.is_none());
    }

    #[test]
    fn test_invalid_selection_falls_back_to_first() {
        let mut session = playing();
        session.offer = Some(vec![Ability::RapidFire, Ability::Magnetism, Ability::Berserker]);
        session.phase = GamePhase::AbilitySelect;
        assert_eq!(session.select_ability(7), Some(Ability::RapidFire));
        assert_eq!(session.player.shot_cooldown_ms, 160.0);

        session.offer = Some(vec![Ability::HealthBoost]);
        session.player.health = 10.0;
        assert_eq!(session.select_ability_by_id("warpDrive"), Some(Ability::HealthBoost));
        assert_eq!(session.player.max_health, 150.0);
        assert_eq!(session.player.health, 150.0);
    }

    #[test]
    fn test_queued_offers_presented_in_turn() {
        let mut session = playing();
        session.open_offer();
        session.open_offer();
        assert_eq!(session.pending_offers, 1);
        session.select_ability(0);
        assert_eq!(session.phase, GamePhase::AbilitySelect);
        assert!(session.offer.is_some());
        session.select_ability(0);
        assert_eq!(session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_upgrade_stat_shop() {
        let mut session = playing();
        assert_eq!(
            session.upgrade_stat(StatKind::Attack),
            Err(UpgradeError::NoUpgradePoints)
        );

        session.progression.upgrade_points = 20;
        assert_eq!(session.upgrade_stat(StatKind::Attack), Ok(2));
        assert!((session.player.bullet_damage - 30.0).abs() < 1e-4);
        assert_eq!(session.progression.upgrade_points, 19);

        for _ in 0..8 {
            session.upgrade_stat(StatKind::FireRate).unwrap();
        }
        assert_eq!(session.stats.fire_rate, 9);
        session.upgrade_stat(StatKind::FireRate).unwrap();
        assert_eq!(
            session.upgrade_stat(StatKind::FireRate),
            Err(UpgradeError::AtMaximum(StatKind::FireRate))
        );
        assert_eq!(session.progression.upgrade_points, 10);
        assert!(session.player.shot_cooldown_ms >= 50.0);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut session = Session::new(1, Settings::default());
        session.restore(ProfileSnapshot {
            selected_character: 99,
            high_score: 800,
            ..Default::default()
        });
        assert_eq!(session.selected_character(), Character::Classic);

        session.start_game(Character::Heavy);
        session.score = 1200;
        session.game_over();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.high_score, 1200);
        assert_eq!(snapshot.selected_character, 2);
        assert_eq!(
            session.drain_events(),
            vec![SimEvent::GameOver { score: 1200 }]
        );
    }

    #[test]
    fn test_advisor_rotation() {
        let mut advisor = Advisor::default();
        advisor.tick(4999.0, None);
        assert_eq!(advisor.message, ADVISOR_TIPS[0]);
        advisor.tick(1.0, None);
        assert_eq!(advisor.message, ADVISOR_TIPS[1]);

        let boss = Boss::new(10);
        advisor.tick(ADVISOR_INTERVAL_MS, Some(&boss));
        assert!(advisor.message.starts_with("Boss health: 2000/2000"));
    }
}
