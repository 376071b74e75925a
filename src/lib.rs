//! Nova Strike - A wave-based arcade shoot-em-up
//!
//! Core modules:
//! - `sim`: Combat simulation (entities, abilities, waves, collisions, player life-cycle)
//! - `settings`: Session tunables
//! - `persistence`: Profile snapshot for an external save/load collaborator

pub mod persistence;
pub mod settings;
pub mod sim;

pub use persistence::{PersistenceError, ProfileSnapshot, UserProfile};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Play field dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Enemies crossing this line count as kills without hurting the player
    pub const BARRIER_Y: f32 = FIELD_HEIGHT - 100.0;

    /// Longest elapsed time a single tick will integrate (ms)
    pub const MAX_FRAME_MS: f32 = 50.0;
    /// Reference frame all per-frame speeds are tuned against (ms)
    pub const REFERENCE_FRAME_MS: f32 = 16.0;

    /// Player ship box
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const PLAYER_BASE_HEALTH: f32 = 100.0;
    /// Distance of the spawn point above the bottom edge
    pub const PLAYER_SPAWN_OFFSET: f32 = 50.0;
    /// Off-field parking spot below the bottom edge while respawning
    pub const PLAYER_PARK_OFFSET: f32 = 100.0;

    /// Player life-cycle timers (ms)
    pub const RESPAWN_DURATION_MS: f32 = 2000.0;
    pub const RESPAWN_INVULNERABILITY_MS: f32 = 3000.0;
    pub const HIT_FLASH_MS: f32 = 1000.0;

    /// Wave timers (ms)
    pub const WAVE_BANNER_MS: f32 = 2000.0;
    pub const WAVE_SETTLE_MS: f32 = 500.0;
    pub const BASE_SPAWN_INTERVAL_MS: f32 = 1500.0;
    pub const MIN_SPAWN_INTERVAL_MS: f32 = 800.0;
    pub const BOSS_REMOVAL_DELAY_MS: f32 = 1000.0;

    /// Every Nth wave is a boss wave
    pub const BOSS_WAVE_INTERVAL: u32 = 10;
    pub const MAX_ENEMY_LEVEL: u32 = 10;
    pub const MAX_ENEMIES_PER_WAVE: u32 = 10;

    /// Progression
    pub const STARTING_MAX_XP: u32 = 100;
    pub const MAX_PLAYER_LEVEL: u32 = 50;
    pub const ABILITY_OFFER_DELAY_MS: f32 = 500.0;
    pub const ABILITY_OFFER_SIZE: usize = 3;

    /// Stat shop cap (the `special` stat is uncapped)
    pub const MAX_STAT_LEVEL: u32 = 10;

    /// Pickup drop tuning
    pub const HEALTH_PACK_DROP_CHANCE: f32 = 0.1;
    pub const HEALTH_PACK_HEAL: f32 = 25.0;
    pub const BOSS_HEALTH_PACK_HEAL: f32 = 50.0;
    pub const BOSS_ORB_COUNT: u32 = 5;
    pub const BOSS_ORB_VALUE: u32 = 100;
}

/// Clamp a host-supplied frame delta so a long stall can't produce one huge step
#[inline]
pub fn clamp_elapsed(elapsed_ms: f32) -> f32 {
    if elapsed_ms.is_finite() {
        elapsed_ms.clamp(0.0, consts::MAX_FRAME_MS)
    } else {
        0.0
    }
}

/// Convert elapsed milliseconds into reference frames (1.0 == one 16 ms frame)
#[inline]
pub fn frame_scale(elapsed_ms: f32) -> f32 {
    elapsed_ms / consts::REFERENCE_FRAME_MS
}
