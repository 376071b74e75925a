//! Combat simulation module
//!
//! All gameplay logic lives here. This module must stay free of I/O:
//! - Elapsed-time ticks only, driven by the host
//! - Seeded RNG only
//! - No rendering, input devices or transport
//! - Delayed work goes through the generation-keyed schedule

pub mod abilities;
pub mod collision;
pub mod combat;
pub mod entity;
pub mod events;
pub mod lifecycle;
pub mod schedule;
pub mod state;
pub mod tick;
pub mod wave;

pub use abilities::{Ability, AbilityLevels, PlayerStats, Rarity, StatKind, UpgradeError, roll_offer};
pub use collision::{collides, overlaps};
pub use entity::{
    Boss, Bullet, Character, Damageable, Enemy, EnemyBullet, Explosion, ExplosionKind, Guidance,
    Particle, ParticleKind, Pickup, PickupKind, Player, Positioned, Rect, Updatable,
};
pub use events::{Ghost, RemoteBullet, RemoteEvent, RemotePlayers, SimEvent};
pub use lifecycle::{HitKind, HitOutcome, LifeState, Lifecycle, Progression};
pub use schedule::{Schedule, ScheduledAction};
pub use state::{Advisor, GamePhase, Session};
pub use tick::{TickInput, autopilot_input, tick};
pub use wave::{SpawnOrder, WaveBanner, WavePhase, WaveReward, WaveState};
