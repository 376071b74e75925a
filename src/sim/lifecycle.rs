//! Player life-cycle and progression
//!
//! `Active -> Respawning -> Active` on a lost life (or any contact hit), and
//! `Active -> GameOver` once lives run out. Invulnerability is an orthogonal
//! timer that suppresses incoming damage without taking away control.

use serde::{Deserialize, Serialize};

use super::entity::Player;
use crate::consts::*;

/// Where the player is in the damage/respawn cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LifeState {
    Active,
    /// Parked off-field until the countdown expires
    Respawning { remaining_ms: f32 },
    GameOver,
}

/// How an incoming hit landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Bullet,
    Contact,
}

/// Result of resolving one incoming hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Survived a bullet, short invulnerability flash
    Flash,
    /// Sent off-field (contact hit, or lethal hit with lives left)
    Respawning,
    /// Last life lost
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lifecycle {
    pub lives: u32,
    pub state: LifeState,
    /// Remaining invulnerability (0 = vulnerable)
    pub invulnerable_ms: f32,
}

impl Lifecycle {
    pub fn new(lives: u32) -> Self {
        Self {
            lives,
            state: LifeState::Active,
            invulnerable_ms: 0.0,
        }
    }

    pub fn is_respawning(&self) -> bool {
        matches!(self.state, LifeState::Respawning { .. })
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms > 0.0
    }

    /// Movement and firing are allowed
    pub fn can_act(&self) -> bool {
        self.state == LifeState::Active
    }

    /// Incoming hits are resolved
    pub fn is_vulnerable(&self) -> bool {
        self.state == LifeState::Active && !self.is_invulnerable()
    }

    /// Seconds left on the respawn countdown, rounded up for display
    pub fn respawn_countdown(&self) -> Option<u32> {
        match self.state {
            LifeState::Respawning { remaining_ms } => {
                Some((remaining_ms.max(0.0) / 1000.0).ceil() as u32)
            }
            _ => None,
        }
    }

    pub fn begin_respawn(&mut self, player: &mut Player) {
        player.park_off_field();
        self.state = LifeState::Respawning {
            remaining_ms: RESPAWN_DURATION_MS,
        };
    }

    /// Decide what a hit that has already been applied to `player` means
    pub fn resolve_hit(&mut self, player: &mut Player, kind: HitKind) -> HitOutcome {
        if player.health <= 0.0 {
            self.lives = self.lives.saturating_sub(1);
            if self.lives == 0 {
                self.state = LifeState::GameOver;
                return HitOutcome::GameOver;
            }
            self.begin_respawn(player);
            return HitOutcome::Respawning;
        }

        match kind {
            HitKind::Contact => {
                self.begin_respawn(player);
                HitOutcome::Respawning
            }
            HitKind::Bullet => {
                self.invulnerable_ms = HIT_FLASH_MS;
                HitOutcome::Flash
            }
        }
    }

    /// Advance the respawn countdown. Returns true on the tick the player returns.
    pub fn tick_respawn(&mut self, elapsed_ms: f32, player: &mut Player) -> bool {
        let LifeState::Respawning { remaining_ms } = &mut self.state else {
            return false;
        };
        *remaining_ms -= elapsed_ms;
        if *remaining_ms > 0.0 {
            return false;
        }

        self.state = LifeState::Active;
        self.invulnerable_ms = RESPAWN_INVULNERABILITY_MS;
        player.move_to_spawn();
        player.health = player.max_health;
        true
    }

    pub fn tick_invulnerability(&mut self, elapsed_ms: f32) {
        if self.invulnerable_ms > 0.0 {
            self.invulnerable_ms = (self.invulnerable_ms - elapsed_ms).max(0.0);
        }
    }
}

/// XP, level and upgrade points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    pub level: u32,
    pub xp: u32,
    pub max_xp: u32,
    pub upgrade_points: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            max_xp: STARTING_MAX_XP,
            upgrade_points: 0,
        }
    }
}

impl Progression {
    /// Add XP, levelling up at most once. Returns the new level on a level-up.
    ///
    /// Excess XP past the threshold is discarded.
    pub fn gain_xp(&mut self, amount: u32) -> Option<u32> {
        self.xp = self.xp.saturating_add(amount);
        if self.xp < self.max_xp || self.level >= MAX_PLAYER_LEVEL {
            return None;
        }

        self.level += 1;
        self.xp = 0;
        self.max_xp = (self.max_xp as f32 * 1.2).floor() as u32;
        self.upgrade_points += 1;
        Some(self.level)
    }

    pub fn xp_fraction(&self) -> f32 {
        if self.max_xp == 0 {
            return 0.0;
        }
        (self.xp as f32 / self.max_xp as f32).min(1.0)
    }
}
