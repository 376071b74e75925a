//! Frame orchestrator
//!
//! One call advances every system in a fixed order. Elapsed time is clamped,
//! scaled by game speed and normalized to 16 ms reference frames. A tick that
//! is not in `Playing` mutates nothing.

use glam::Vec2;

use super::abilities::{self, Ability};
use super::collision::overlaps;
use super::combat;
use super::entity::{
    Boss, Enemy, Explosion, ExplosionKind, ParticleKind, PickupKind, Positioned, Updatable,
};
use super::events::SimEvent;
use super::schedule::ScheduledAction;
use super::state::{GamePhase, Session};
use super::wave::{SpawnOrder, WaveState};
use crate::consts::*;
use crate::{clamp_elapsed, frame_scale};

/// Input intent for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Fire (held)
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - the ship flies itself
    pub autopilot: bool,
}

impl TickInput {
    /// Movement intent as a -1..1 axis pair
    pub fn axis(&self) -> Vec2 {
        let x = (self.right as i32 - self.left as i32) as f32;
        let y = (self.down as i32 - self.up as i32) as f32;
        Vec2::new(x, y)
    }
}

/// Advance the session by `elapsed_ms` of wall-clock time
pub fn tick(session: &mut Session, input: &TickInput, elapsed_ms: f32) {
    // Handle pause toggle
    if input.pause {
        match session.phase {
            GamePhase::Playing => {
                session.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => session.phase = GamePhase::Playing,
            _ => {}
        }
    }

    if session.phase != GamePhase::Playing {
        return;
    }

    // Clamp after scaling so game speed cannot stretch one step past the cap
    let elapsed = clamp_elapsed(elapsed_ms * session.settings.game_speed);
    let frame = frame_scale(elapsed);
    session.time_ms += elapsed as f64;

    run_scheduled(session);
    // An ability offer pauses the rest of this tick
    if session.phase != GamePhase::Playing {
        return;
    }

    session.wave.tick_banner(elapsed);
    session.advisor.tick(elapsed, session.boss.as_ref());

    let input = if input.autopilot {
        autopilot_input(session)
    } else {
        input.clone()
    };

    if session.lifecycle.is_respawning() {
        session.lifecycle.tick_respawn(elapsed, &mut session.player);
    } else if session.lifecycle.can_act() {
        update_player(session, &input, frame);
    }
    session.lifecycle.tick_invulnerability(elapsed);

    update_bullets(session, frame);
    update_pickups(session, frame);
    update_wave(session);
    update_enemies(session, frame);
    update_boss(session, frame);
    update_effects(session, frame);
    update_remote(session, frame);

    combat::resolve(session);
}

fn run_scheduled(session: &mut Session) {
    for action in session.schedule.drain_due(session.generation, session.time_ms) {
        log::debug!("Firing {:?} at {:.0} ms", action, session.time_ms);
        match action {
            ScheduledAction::StartWave { number } => {
                if number == session.wave.number + 1 {
                    session.wave.advance(session.time_ms);
                    let message = if session.wave.boss_wave {
                        "Boss wave incoming! Get ready for a tough fight!".to_string()
                    } else {
                        format!("Wave {} starting! Destroy all enemies!", number)
                    };
                    session.advisor.say(message);
                } else {
                    log::warn!(
                        "Ignoring start of wave {} (current wave {})",
                        number,
                        session.wave.number
                    );
                }
            }
            ScheduledAction::RemoveBoss => {
                session.boss = None;
            }
            ScheduledAction::OfferAbilities => session.open_offer(),
        }
    }
}

fn update_player(session: &mut Session, input: &TickInput, frame: f32) {
    session
        .player
        .steer(input.axis(), frame, &session.stats, &session.abilities);

    if !input.fire {
        return;
    }
    let volley = session.player.fire(session.time_ms, &session.abilities);
    if volley.is_empty() {
        return;
    }
    session.bullets.extend(volley);
    if session.multiplayer {
        let pos = session.player.pos;
        session.emit(SimEvent::ShotFired { x: pos.x, y: pos.y });
    }
}

fn update_bullets(session: &mut Session, frame: f32) {
    for bullet in &mut session.bullets {
        bullet.update(frame, &session.enemies);
    }
    session.bullets.retain(|b| b.on_field());

    for bullet in &mut session.enemy_bullets {
        bullet.update(frame);
    }
    session.enemy_bullets.retain(|b| b.on_field());
}

fn update_pickups(session: &mut Session, frame: f32) {
    let magnet = session.abilities.level(Ability::Magnetism) > 0;
    let radius = abilities::magnet_radius(&session.abilities);
    let strength = abilities::magnet_strength(&session.abilities);
    let target = session.player.center();
    let player_bounds = session.player.bounds();
    let can_collect = !session.lifecycle.is_respawning();

    let mut collected = Vec::new();
    session.pickups.retain_mut(|pickup| {
        pickup.update(frame);
        if magnet {
            pickup.attract(target, radius, strength);
        }
        if can_collect && overlaps(&pickup.bounds(), &player_bounds) {
            collected.push(pickup.kind);
            return false;
        }
        !pickup.expired()
    });

    for kind in collected {
        match kind {
            PickupKind::XpOrb { value } => session.gain_xp(value),
            PickupKind::HealthPack { heal } => {
                session.player.heal(heal);
                let at = session.player.pos;
                session.spawn_particles(ParticleKind::Heal, at, 10);
            }
        }
    }
}

fn update_wave(session: &mut Session) {
    match session
        .wave
        .poll_spawn(session.time_ms, session.settings.spawn_rate)
    {
        Some(SpawnOrder::Enemy { level }) => spawn_enemy(session, level),
        Some(SpawnOrder::Boss { wave }) => {
            if session.boss.is_none() {
                session.boss = Some(Boss::new(wave));
                session.advisor.say("Boss incoming! Prepare for battle!");
            } else {
                log::warn!("Boss already on the field, skipping spawn");
            }
        }
        None => {}
    }

    let reward = session
        .wave
        .try_complete(session.enemies.len(), session.boss.is_some());
    if let Some(reward) = reward {
        session.gain_xp(reward.xp);
        session.progression.upgrade_points += reward.upgrade_points;
        session.advisor.say(if session.wave.boss_wave {
            format!("Boss defeated! You earned {} upgrade points!", reward.upgrade_points)
        } else {
            format!("Wave completed! You earned {} upgrade point!", reward.upgrade_points)
        });
        session.schedule_in(
            WaveState::transition_delay_ms(),
            ScheduledAction::StartWave {
                number: session.wave.number + 1,
            },
        );
    }
}

fn spawn_enemy(session: &mut Session, level: u32) {
    let id = session.next_entity_id();
    let x = session.rng_range(0.0, FIELD_WIDTH - 40.0);
    let enemy = Enemy::new(id, Vec2::new(x, -40.0), level, &mut session.rng);
    log::debug!("Spawned enemy {} (level {}) at x={:.0}", id, level, x);
    session.enemies.push(enemy);
}

fn update_enemies(session: &mut Session, frame: f32) {
    for enemy in &mut session.enemies {
        enemy.update(frame);
        if let Some(bullet) = enemy.maybe_fire(&mut session.rng) {
            session.enemy_bullets.push(bullet);
        }
    }

    // Enemies past the barrier count as kills without hurting the player
    let mut breached = 0;
    let explosions = &mut session.explosions;
    session.enemies.retain(|enemy| {
        if enemy.is_alive() && enemy.bounds().bottom() >= BARRIER_Y {
            explosions.push(Explosion::new(ExplosionKind::Enemy, enemy.center()));
            breached += 1;
            return false;
        }
        enemy.pos.y <= FIELD_HEIGHT + 50.0
    });
    for _ in 0..breached {
        session.wave.record_kill();
    }
}

fn update_boss(session: &mut Session, frame: f32) {
    let Some(boss) = session.boss.as_mut() else {
        return;
    };
    if boss.defeated {
        return;
    }
    boss.update(frame);
    let volley = boss.volley(session.time_ms);
    session.enemy_bullets.extend(volley);
}

fn update_effects(session: &mut Session, frame: f32) {
    for explosion in &mut session.explosions {
        explosion.update(frame);
    }
    session.explosions.retain(|e| !e.finished());

    for particle in &mut session.particles {
        particle.update(frame);
    }
    session.particles.retain(|p| p.life > 0.0);
}

fn update_remote(session: &mut Session, frame: f32) {
    session.remote.update(frame);

    if !session.multiplayer {
        return;
    }
    let interval = session.settings.broadcast_interval_ms as f64;
    if session.time_ms - session.last_broadcast_ms >= interval {
        session.last_broadcast_ms = session.time_ms;
        let pos = session.player.pos;
        session.emit(SimEvent::PositionUpdate {
            x: pos.x,
            y: pos.y,
            score: session.score,
            lives: session.lifecycle.lives,
        });
    }
}

/// Demo pilot: track the nearest threat, sidestep incoming fire, always shoot
pub fn autopilot_input(session: &Session) -> TickInput {
    let center = session.player.center();

    let threat = session
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .map(|e| e.center())
        .chain(session.boss.iter().filter(|b| !b.defeated).map(|b| b.center()))
        .min_by(|a, b| {
            a.distance_squared(center)
                .partial_cmp(&b.distance_squared(center))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let incoming = session.enemy_bullets.iter().find(|b| {
        let dy = center.y - b.pos.y;
        (b.pos.x - center.x).abs() < 30.0 && dy > 0.0 && dy < 150.0
    });

    let target_x = match (incoming, threat) {
        (Some(bullet), _) => {
            if bullet.pos.x < center.x {
                center.x + 60.0
            } else {
                center.x - 60.0
            }
        }
        (None, Some(threat)) => threat.x,
        (None, None) => FIELD_WIDTH / 2.0,
    };

    let dx = target_x - center.x;
    TickInput {
        left: dx < -4.0,
        right: dx > 4.0,
        fire: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::abilities::AbilityLevels;
    use crate::sim::entity::{Character, Pickup};
    use crate::sim::lifecycle::LifeState;
    use crate::sim::wave::WavePhase;

    const DT: f32 = 16.0;

    fn playing(seed: u64) -> Session {
        let mut session = Session::new(seed, Settings::default());
        session.start_game(Character::Classic);
        session
    }

    fn run(session: &mut Session, input: &TickInput, ms: f32) {
        let steps = (ms / DT).ceil() as u32;
        for _ in 0..steps {
            tick(session, input, DT);
        }
    }

    #[test]
    fn test_tick_pause() {
        let mut session = playing(1);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut session, &pause, DT);
        assert_eq!(session.phase, GamePhase::Paused);
        let time = session.time_ms;

        // Paused ticks do nothing
        tick(&mut session, &TickInput::default(), DT);
        assert_eq!(session.time_ms, time);

        // Unpause
        tick(&mut session, &pause, DT);
        assert_eq!(session.phase, GamePhase::Playing);
        assert!(session.time_ms > time);
    }

    #[test]
    fn test_elapsed_is_clamped() {
        let mut session = playing(1);
        tick(&mut session, &TickInput::default(), 1000.0);
        assert_eq!(session.time_ms, MAX_FRAME_MS as f64);
    }

    #[test]
    fn test_game_speed_scales_time() {
        let mut session = Session::new(
            1,
            Settings {
                game_speed: 2.0,
                ..Default::default()
            },
        );
        session.start_game(Character::Classic);
        tick(&mut session, &TickInput::default(), DT);
        assert_eq!(session.time_ms, 32.0);
    }

    #[test]
    fn test_game_speed_respects_clamp() {
        let mut session = Session::new(
            1,
            Settings {
                game_speed: 4.0,
                ..Default::default()
            },
        );
        session.start_game(Character::Classic);
        tick(&mut session, &TickInput::default(), 1000.0);
        assert_eq!(session.time_ms, MAX_FRAME_MS as f64);
    }

    #[test]
    fn test_magnetism_pulls_pickups_toward_player() {
        let mut session = playing(2);
        session.abilities = AbilityLevels::default().with_level(Ability::Magnetism, 1);
        let target = session.player.center();
        // Inside the 150 px radius, up and to the right of the ship
        let mut orb = Pickup::xp_orb(target + Vec2::new(60.0, -60.0), 10, &mut session.rng);
        orb.vel = Vec2::ZERO;
        session.pickups.push(orb);

        tick(&mut session, &TickInput::default(), DT);

        let vel = session.pickups[0].vel;
        assert!(vel.x < 0.0);
        assert!(vel.y > 0.0);
        // Strength 0.4 split along the diagonal
        assert!((vel.length() - 0.4).abs() < 1e-3);

        // Without the ability nothing pulls
        let mut plain = playing(2);
        let mut orb = Pickup::xp_orb(target + Vec2::new(60.0, -60.0), 10, &mut plain.rng);
        orb.vel = Vec2::ZERO;
        plain.pickups.push(orb);
        tick(&mut plain, &TickInput::default(), DT);
        assert_eq!(plain.pickups[0].vel, Vec2::ZERO);
    }

    #[test]
    fn test_movement_and_fire() {
        let mut session = playing(1);
        let start = session.player.pos;
        let input = TickInput {
            left: true,
            fire: true,
            ..Default::default()
        };
        tick(&mut session, &input, DT);
        assert_eq!(session.player.pos.x, start.x - 5.0);
        assert_eq!(session.bullets.len(), 1);
    }

    #[test]
    fn test_boss_wave_spawns_only_boss() {
        let mut session = playing(3);
        session.wave = WaveState::new(10, session.time_ms);
        run(&mut session, &TickInput::default(), WAVE_BANNER_MS + 100.0);
        assert!(session.boss.is_some());
        assert!(session.enemies.is_empty());
        assert_eq!(session.wave.phase, WavePhase::Clearing);

        // Next wave reverts to regular spawning
        session.boss = None;
        session.wave = WaveState::new(11, session.time_ms);
        assert_eq!(session.wave.target, 6);
        run(&mut session, &TickInput::default(), WAVE_BANNER_MS + 100.0);
        assert_eq!(session.enemies.len(), 1);
        assert!(session.boss.is_none());
    }

    #[test]
    fn test_respawn_through_ticks() {
        let mut session = playing(5);
        session.lifecycle.lives = 3;
        session.player.health = 1.0;
        let id = session.next_entity_id();
        let pos = session.player.pos;
        let enemy = Enemy::new(id, pos, 1, &mut session.rng);
        session.enemies.push(enemy);
        // Keep the barrier from claiming it first
        session.enemies[0].pos.y = BARRIER_Y - 30.0;
        session.player.pos.y = BARRIER_Y - 30.0;

        tick(&mut session, &TickInput::default(), DT);
        assert_eq!(session.lifecycle.lives, 2);
        assert!(session.lifecycle.is_respawning());
        assert!(session.player.pos.y > FIELD_HEIGHT);

        let mut waited = 0.0;
        while session.lifecycle.is_respawning() {
            tick(&mut session, &TickInput::default(), DT);
            waited += DT;
        }
        assert!(waited >= RESPAWN_DURATION_MS - DT && waited <= RESPAWN_DURATION_MS + DT);
        assert_eq!(session.lifecycle.state, LifeState::Active);
        assert_eq!(session.player.pos, crate::sim::entity::Player::spawn_point());
        assert_eq!(session.player.health, session.player.max_health);
        assert!(session.lifecycle.is_invulnerable());
    }

    #[test]
    fn test_wave_completion_grants_once() {
        let mut session = playing(9);
        session.wave.banner = None;
        session.wave.spawned = session.wave.target;
        session.wave.killed = session.wave.target;
        session.wave.phase = WavePhase::Clearing;

        tick(&mut session, &TickInput::default(), DT);
        assert!(session.wave.complete);
        assert_eq!(session.progression.upgrade_points, 1);
        assert_eq!(session.progression.xp, 60);

        run(&mut session, &TickInput::default(), 1000.0);
        assert_eq!(session.progression.upgrade_points, 1);
        assert_eq!(session.wave.number, 1);

        run(&mut session, &TickInput::default(), 1600.0);
        assert_eq!(session.wave.number, 2);
        assert!(!session.wave.complete);
        assert_eq!(session.progression.upgrade_points, 1);
    }

    #[test]
    fn test_stale_scheduled_wave_ignored() {
        let mut session = playing(9);
        session
            .schedule
            .push(session.generation - 1, 0.0, ScheduledAction::StartWave { number: 2 });
        tick(&mut session, &TickInput::default(), DT);
        assert_eq!(session.wave.number, 1);
        assert!(session.schedule.is_empty());
    }

    #[test]
    fn test_level_up_offer_pauses() {
        let mut session = playing(4);
        session.gain_xp(100);
        run(&mut session, &TickInput::default(), ABILITY_OFFER_DELAY_MS + 20.0);
        assert_eq!(session.phase, GamePhase::AbilitySelect);
        assert_eq!(session.offer.as_ref().map(Vec::len), Some(3));

        let time = session.time_ms;
        run(&mut session, &TickInput::default(), 500.0);
        assert_eq!(session.time_ms, time);

        session.select_ability(0);
        assert_eq!(session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_barrier_breach_counts_kill() {
        let mut session = playing(6);
        let id = session.next_entity_id();
        let enemy = Enemy::new(id, Vec2::new(100.0, BARRIER_Y - 24.0), 1, &mut session.rng);
        session.enemies.push(enemy);

        tick(&mut session, &TickInput::default(), DT);

        assert!(session.enemies.is_empty());
        assert_eq!(session.wave.killed, 1);
        assert_eq!(session.score, 0);
        assert!(session
            .explosions
            .iter()
            .any(|e| e.kind == ExplosionKind::Enemy));
    }

    #[test]
    fn test_pickup_collection() {
        let mut session = playing(2);
        session.player.health = 50.0;
        let at = session.player.pos;
        let mut pack = Pickup::health_pack(at, HEALTH_PACK_HEAL, &mut session.rng);
        pack.vel = Vec2::ZERO;
        let mut orb = Pickup::xp_orb(at, 40, &mut session.rng);
        orb.vel = Vec2::ZERO;
        session.pickups.push(pack);
        session.pickups.push(orb);

        tick(&mut session, &TickInput::default(), DT);

        assert!(session.pickups.is_empty());
        assert_eq!(session.player.health, 75.0);
        assert_eq!(session.progression.xp, 40);
    }

    #[test]
    fn test_multiplayer_events() {
        let mut session = playing(2);
        session.multiplayer = true;
        let input = TickInput {
            fire: true,
            ..Default::default()
        };
        run(&mut session, &input, 100.0);
        let events = session.drain_events();
        assert!(events.iter().any(|e| matches!(e, SimEvent::ShotFired { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::PositionUpdate { lives: 4, .. })));
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed should produce identical results
        let mut a = playing(99_999);
        let mut b = playing(99_999);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..2000 {
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
            if a.phase == GamePhase::AbilitySelect {
                a.select_ability(0);
                b.select_ability(0);
            }
        }
        assert_eq!(a.time_ms, b.time_ms);
        assert_eq!(a.score, b.score);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.wave.number, b.wave.number);
        assert_eq!(a.player.pos, b.player.pos);
    }

    #[test]
    fn test_autopilot_tracks_threat() {
        let mut session = playing(2);
        let id = session.next_entity_id();
        let enemy = Enemy::new(id, Vec2::new(50.0, 100.0), 1, &mut session.rng);
        session.enemies.push(enemy);
        let input = autopilot_input(&session);
        assert!(input.left && !input.right && input.fire);
    }
}
