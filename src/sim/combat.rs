//! Collision & combat resolution
//!
//! Five passes run in a fixed order once per tick:
//! 1. player bullets x enemies
//! 2. player bullets x boss
//! 3. enemy bullets x player
//! 4. enemies x player (contact)
//! 5. boss x player (contact)
//!
//! Kills are marked, not removed. A marked enemy is skipped by every later
//! check in the same tick and swept once all passes are done, so no enemy is
//! ever credited twice.

use glam::Vec2;
use rand::Rng;

use super::abilities::{self, Ability};
use super::collision::{collides, within_radius};
use super::entity::{Damageable, Explosion, ExplosionKind, ParticleKind, Pickup, Positioned};
use super::events::SimEvent;
use super::lifecycle::{HitKind, HitOutcome};
use super::schedule::ScheduledAction;
use super::state::Session;
use crate::consts::*;

/// How an enemy died (splash kills never chain into another splash)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KillSource {
    Bullet,
    Splash,
}

/// Run every resolution pass, then sweep consumed bullets and dead enemies
pub fn resolve(session: &mut Session) {
    bullets_vs_enemies(session);
    bullets_vs_boss(session);
    enemy_bullets_vs_player(session);
    enemies_vs_player(session);
    boss_vs_player(session);
    sweep(session);
}

fn sweep(session: &mut Session) {
    session.bullets.retain(|b| !b.spent);
    session.enemy_bullets.retain(|b| !b.spent);
    session.enemies.retain(|e| !e.killed);
}

fn bullets_vs_enemies(session: &mut Session) {
    for bi in 0..session.bullets.len() {
        for ei in 0..session.enemies.len() {
            if session.bullets[bi].spent {
                break;
            }
            let enemy = &session.enemies[ei];
            let bullet = &session.bullets[bi];
            if !enemy.is_alive() || bullet.has_struck(enemy.id) || !collides(bullet, enemy) {
                continue;
            }

            let critical = roll_critical(session);
            let damage = abilities::hit_damage(
                session.bullets[bi].damage,
                &session.abilities,
                &session.stats,
                session.player.health_fraction(),
                critical,
            );
            let hit_at = session.enemies[ei].center();
            session.enemies[ei].apply_damage(damage);
            session.explosions.push(Explosion::new(ExplosionKind::Hit, hit_at));
            if critical {
                session.spawn_particles(ParticleKind::Critical, hit_at, 8);
            }

            let enemy_id = session.enemies[ei].id;
            session.bullets[bi].register_enemy_hit(enemy_id);

            if session.enemies[ei].is_destroyed() {
                kill_enemy(session, ei, KillSource::Bullet);
            }
        }
    }
}

fn roll_critical(session: &mut Session) -> bool {
    let chance = abilities::crit_chance(&session.abilities);
    chance > 0.0 && session.rng.random::<f32>() < chance
}

/// Credit a kill exactly once and drop its rewards
fn kill_enemy(session: &mut Session, index: usize, source: KillSource) {
    let enemy = &mut session.enemies[index];
    if enemy.killed {
        return;
    }
    enemy.killed = true;
    let center = enemy.center();
    let level = enemy.level;
    let xp_reward = enemy.xp_reward;

    session
        .explosions
        .push(Explosion::new(ExplosionKind::Enemy, center));

    let orb = Pickup::xp_orb(center, xp_reward, &mut session.rng);
    session.pickups.push(orb);
    let pack_chance = HEALTH_PACK_DROP_CHANCE * session.settings.powerup_freq;
    if session.rng.random::<f32>() < pack_chance {
        let pack = Pickup::health_pack(center, HEALTH_PACK_HEAL, &mut session.rng);
        session.pickups.push(pack);
    }

    session.score += 100 * level as u64;
    session.gain_xp(xp_reward);
    session.wave.record_kill();

    let heal = abilities::life_steal_heal(&session.abilities);
    if heal > 0.0 {
        session.player.heal(heal);
        let at = session.player.pos;
        session.spawn_particles(ParticleKind::Heal, at, 10);
    }

    if session.rng.random::<f32>() < 0.05 * level as f32 / 3.0 {
        session.progression.upgrade_points += 1;
        session.advisor.say("You found an upgrade point!");
    }

    if session.multiplayer {
        session.emit(SimEvent::EnemyDestroyed {
            score: session.score,
            xp: session.progression.xp,
            level: session.progression.level,
        });
    }

    if source == KillSource::Bullet && session.abilities.level(Ability::ExplosiveBullets) > 0 {
        splash(session, center);
    }
}

/// Explosive-round splash around a bullet kill
fn splash(session: &mut Session, center: Vec2) {
    session
        .explosions
        .push(Explosion::new(ExplosionKind::Explosive, center));

    let radius = abilities::splash_radius(&session.abilities);
    let damage = abilities::splash_damage(&session.abilities);
    for index in within_radius(&session.enemies, center, radius) {
        let enemy = &mut session.enemies[index];
        if !enemy.is_alive() {
            continue;
        }
        enemy.apply_damage(damage);
        if enemy.is_destroyed() {
            kill_enemy(session, index, KillSource::Splash);
        }
    }
}

fn bullets_vs_boss(session: &mut Session) {
    for bi in 0..session.bullets.len() {
        let Some(boss) = session.boss.as_ref() else {
            return;
        };
        // Hits after the kill are ignored
        if boss.defeated {
            return;
        }
        if session.bullets[bi].spent || !collides(&session.bullets[bi], boss) {
            continue;
        }

        let critical = roll_critical(session);
        let damage = abilities::hit_damage(
            session.bullets[bi].damage,
            &session.abilities,
            &session.stats,
            session.player.health_fraction(),
            critical,
        );
        let hit_at = session.bullets[bi].pos;
        let Some(boss) = session.boss.as_mut() else {
            return;
        };
        boss.apply_damage(damage);
        let boss_center = boss.center();
        let destroyed = boss.is_destroyed();

        session.explosions.push(Explosion::new(ExplosionKind::Hit, hit_at));
        if critical {
            session.spawn_particles(ParticleKind::Critical, boss_center, 8);
        }
        session.bullets[bi].register_hit();

        if destroyed {
            defeat_boss(session);
        }
    }
}

fn defeat_boss(session: &mut Session) {
    let Some(boss) = session.boss.as_mut() else {
        return;
    };
    boss.defeated = true;
    let bounds = boss.bounds();
    let wave = session.wave.number;

    session
        .explosions
        .push(Explosion::new(ExplosionKind::Boss, bounds.center()));

    for _ in 0..BOSS_ORB_COUNT {
        let at = bounds.pos
            + Vec2::new(
                session.rng.random::<f32>() * bounds.size.x,
                session.rng.random::<f32>() * bounds.size.y,
            );
        let orb = Pickup::xp_orb(at, BOSS_ORB_VALUE, &mut session.rng);
        session.pickups.push(orb);
    }
    let pack = Pickup::health_pack(bounds.center(), BOSS_HEALTH_PACK_HEAL, &mut session.rng);
    session.pickups.push(pack);

    session.score += 5000 * wave.div_ceil(BOSS_WAVE_INTERVAL) as u64;
    session.gain_xp(500 + wave * 20);
    session.wave.record_boss_defeat();

    let heal = abilities::boss_life_steal_heal(&session.abilities);
    if heal > 0.0 {
        session.player.heal(heal);
        let at = session.player.pos;
        session.spawn_particles(ParticleKind::Heal, at, 10);
    }

    session.advisor.say("Boss defeated!");
    session.schedule_in(BOSS_REMOVAL_DELAY_MS as f64, ScheduledAction::RemoveBoss);
    log::info!("Wave {}: boss defeated", wave);
}

/// Apply one incoming hit and resolve what it means for the player
fn hit_player(session: &mut Session, raw_damage: f32, kind: HitKind) {
    let damage = abilities::incoming_damage(raw_damage, &session.stats, &session.abilities);
    session.player.take_damage(damage);

    match session.lifecycle.resolve_hit(&mut session.player, kind) {
        HitOutcome::GameOver => session.game_over(),
        HitOutcome::Respawning | HitOutcome::Flash => {}
    }
}

fn enemy_bullets_vs_player(session: &mut Session) {
    for i in 0..session.enemy_bullets.len() {
        if !session.lifecycle.is_vulnerable() {
            return;
        }
        let bullet = &session.enemy_bullets[i];
        if bullet.spent || !collides(bullet, &session.player) {
            continue;
        }
        let (at, damage) = (bullet.pos, bullet.damage);
        session.enemy_bullets[i].spent = true;
        session.explosions.push(Explosion::new(ExplosionKind::Enemy, at));
        hit_player(session, damage, HitKind::Bullet);
    }
}

fn enemies_vs_player(session: &mut Session) {
    for i in 0..session.enemies.len() {
        if !session.lifecycle.is_vulnerable() {
            return;
        }
        let enemy = &session.enemies[i];
        if !enemy.is_alive() || !collides(enemy, &session.player) {
            continue;
        }
        let (center, damage) = (enemy.center(), enemy.damage);

        // Rammed enemies count toward the wave but award nothing
        session.enemies[i].killed = true;
        session.wave.record_kill();

        let player_center = session.player.center();
        session.explosions.push(Explosion::new(ExplosionKind::Enemy, center));
        session
            .explosions
            .push(Explosion::new(ExplosionKind::Player, player_center));
        hit_player(session, damage, HitKind::Contact);
    }
}

fn boss_vs_player(session: &mut Session) {
    if !session.lifecycle.is_vulnerable() {
        return;
    }
    let Some(boss) = session.boss.as_ref() else {
        return;
    };
    if !collides(boss, &session.player) {
        return;
    }
    let damage = boss.damage;
    let player_center = session.player.center();
    session
        .explosions
        .push(Explosion::new(ExplosionKind::Player, player_center));
    hit_player(session, damage, HitKind::Contact);
}
