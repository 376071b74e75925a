//! Wave/spawn scheduler
//!
//! A wave walks `Spawning -> Clearing -> Complete`. Every tenth wave is a boss
//! wave with a single boss instead of regular enemies. The banner shown at the
//! start and end of a wave blocks spawning and completion checks while it is up.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Per-wave progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Still owes enemies (or the boss) to the field
    Spawning,
    /// Everything spawned, waiting for the field to clear
    Clearing,
    /// Rewards granted, next wave scheduled
    Complete,
}

/// What the scheduler wants spawned this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOrder {
    Enemy { level: u32 },
    Boss { wave: u32 },
}

/// Bonus granted once when a wave completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveReward {
    pub xp: u32,
    pub upgrade_points: u32,
}

/// Transition banner text with its remaining display time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveBanner {
    pub text: String,
    pub remaining_ms: f32,
}

pub fn is_boss_wave(wave: u32) -> bool {
    wave > 0 && wave % BOSS_WAVE_INTERVAL == 0
}

/// Regular enemies owed by a wave (1 stands for the boss on boss waves)
pub fn enemy_count(wave: u32) -> u32 {
    if is_boss_wave(wave) {
        return 1;
    }
    match wave {
        0..=3 => 3,
        4..=6 => 5,
        7..=9 => 7,
        _ => (3 + wave / 3).min(MAX_ENEMIES_PER_WAVE),
    }
}

/// Regular spawn cadence in ms, divided by the session spawn-rate multiplier
pub fn spawn_interval_ms(wave: u32, spawn_rate: f32) -> f32 {
    let base = (BASE_SPAWN_INTERVAL_MS - 50.0 * wave as f32).max(MIN_SPAWN_INTERVAL_MS);
    base / spawn_rate
}

pub fn enemy_level(wave: u32) -> u32 {
    (wave / 3 + 1).min(MAX_ENEMY_LEVEL)
}

pub fn completion_reward(wave: u32) -> WaveReward {
    if is_boss_wave(wave) {
        WaveReward {
            xp: 200 + 20 * wave,
            upgrade_points: 3,
        }
    } else {
        WaveReward {
            xp: 50 + 10 * wave,
            upgrade_points: 1,
        }
    }
}

/// Scheduler state for the current wave
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveState {
    /// 1-based, only ever grows by one
    pub number: u32,
    pub phase: WavePhase,
    pub boss_wave: bool,
    pub target: u32,
    pub spawned: u32,
    /// Kills credited this wave (shots, splash, contact, barrier)
    pub killed: u32,
    pub boss_spawned: bool,
    pub boss_defeated: bool,
    /// Completion latch; rewards are granted only on its rising edge
    pub complete: bool,
    pub last_spawn_ms: f64,
    pub banner: Option<WaveBanner>,
}

impl Default for WaveState {
    fn default() -> Self {
        Self::new(1, 0.0)
    }
}

impl WaveState {
    pub fn new(number: u32, now_ms: f64) -> Self {
        let boss_wave = is_boss_wave(number);
        let text = if boss_wave {
            format!("BOSS WAVE {}!", number)
        } else {
            format!("WAVE {}", number)
        };
        Self {
            number,
            phase: WavePhase::Spawning,
            boss_wave,
            target: enemy_count(number),
            spawned: 0,
            killed: 0,
            boss_spawned: false,
            boss_defeated: false,
            complete: false,
            last_spawn_ms: now_ms,
            banner: Some(WaveBanner {
                text,
                remaining_ms: WAVE_BANNER_MS,
            }),
        }
    }

    /// Replace this wave with the next one
    pub fn advance(&mut self, now_ms: f64) {
        *self = Self::new(self.number + 1, now_ms);
        log::info!(
            "Wave {}: {} (target {})",
            self.number,
            if self.boss_wave { "boss" } else { "regular" },
            self.target
        );
    }

    pub fn banner_text(&self) -> Option<&str> {
        self.banner.as_ref().map(|b| b.text.as_str())
    }

    pub fn banner_active(&self) -> bool {
        self.banner.is_some()
    }

    /// Count down the banner, clearing it once expired
    pub fn tick_banner(&mut self, elapsed_ms: f32) {
        if let Some(banner) = &mut self.banner {
            banner.remaining_ms -= elapsed_ms;
            if banner.remaining_ms <= 0.0 {
                self.banner = None;
            }
        }
    }

    /// Decide whether something spawns this tick
    pub fn poll_spawn(&mut self, now_ms: f64, spawn_rate: f32) -> Option<SpawnOrder> {
        if self.complete || self.banner_active() || self.phase != WavePhase::Spawning {
            return None;
        }

        if self.boss_wave {
            self.boss_spawned = true;
            self.spawned = 1;
            self.phase = WavePhase::Clearing;
            log::debug!("Wave {}: boss spawned", self.number);
            return Some(SpawnOrder::Boss { wave: self.number });
        }

        let interval = spawn_interval_ms(self.number, spawn_rate) as f64;
        if now_ms - self.last_spawn_ms <= interval {
            return None;
        }
        self.last_spawn_ms = now_ms;
        self.spawned += 1;
        if self.spawned >= self.target {
            self.phase = WavePhase::Clearing;
        }
        Some(SpawnOrder::Enemy {
            level: enemy_level(self.number),
        })
    }

    pub fn record_kill(&mut self) {
        self.killed += 1;
    }

    pub fn record_boss_defeat(&mut self) {
        self.boss_defeated = true;
        self.killed = 1;
    }

    /// Check the completion condition. Returns the reward exactly once per wave.
    pub fn try_complete(&mut self, enemies_on_field: usize, boss_present: bool) -> Option<WaveReward> {
        if self.complete || self.banner_active() {
            return None;
        }

        let done = if self.boss_wave {
            self.boss_defeated && !boss_present
        } else {
            self.spawned >= self.target && self.killed >= self.target && enemies_on_field == 0
        };
        if !done {
            return None;
        }

        self.complete = true;
        self.phase = WavePhase::Complete;
        self.banner = Some(WaveBanner {
            text: format!("WAVE {} COMPLETED!", self.number),
            remaining_ms: WAVE_BANNER_MS,
        });
        let reward = completion_reward(self.number);
        log::info!(
            "Wave {} complete: +{} XP, +{} upgrade points",
            self.number,
            reward.xp,
            reward.upgrade_points
        );
        Some(reward)
    }

    /// Delay from completion until the next wave starts
    pub fn transition_delay_ms() -> f64 {
        (WAVE_BANNER_MS + WAVE_SETTLE_MS) as f64
    }
}
