//! Event boundary for the multiplayer transport
//!
//! The session pushes `SimEvent`s for an external transport to broadcast and
//! accepts `RemoteEvent`s that only ever create visual state. Remote players are
//! never collision targets.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{BULLET_HEIGHT, BULLET_WIDTH, PLAYER_BULLET_SPEED, Updatable};
use crate::consts::*;

/// Outbound notifications, drained by the host after each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SimEvent {
    ShotFired { x: f32, y: f32 },
    EnemyDestroyed { score: u64, xp: u32, level: u32 },
    PositionUpdate { x: f32, y: f32, score: u64, lives: u32 },
    GameOver { score: u64 },
}

/// Inbound notifications from other players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RemoteEvent {
    RemoteShot {
        player_id: String,
        x: f32,
        y: f32,
    },
    RemoteUpdate {
        id: String,
        username: String,
        position: Vec2,
        score: u64,
        lives: u32,
    },
    RemoteLeft {
        id: String,
    },
}

/// Last known state of another player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ghost {
    pub username: String,
    pub pos: Vec2,
    pub score: u64,
    pub lives: u32,
}

/// A remote player's shot, drawn but never collided
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteBullet {
    pub owner: String,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
}

impl Updatable for RemoteBullet {
    fn update(&mut self, frame: f32) {
        self.pos += self.vel * frame;
    }
}

/// Ghost records and remote bullets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemotePlayers {
    pub ghosts: BTreeMap<String, Ghost>,
    pub bullets: Vec<RemoteBullet>,
}

impl RemotePlayers {
    pub fn apply(&mut self, event: RemoteEvent) {
        match event {
            RemoteEvent::RemoteShot { player_id, x, y } => {
                self.bullets.push(RemoteBullet {
                    owner: player_id,
                    pos: Vec2::new(x + PLAYER_SIZE / 2.0 - BULLET_WIDTH / 2.0, y),
                    size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
                    vel: Vec2::new(0.0, PLAYER_BULLET_SPEED),
                });
            }
            RemoteEvent::RemoteUpdate {
                id,
                username,
                position,
                score,
                lives,
            } => {
                self.ghosts.insert(
                    id,
                    Ghost {
                        username,
                        pos: position,
                        score,
                        lives,
                    },
                );
            }
            RemoteEvent::RemoteLeft { id } => {
                if self.ghosts.remove(&id).is_none() {
                    log::debug!("Remote player {} left before any update", id);
                }
                self.bullets.retain(|b| b.owner != id);
            }
        }
    }

    /// Move remote bullets and drop those that left the field
    pub fn update(&mut self, frame: f32) {
        for bullet in &mut self.bullets {
            bullet.update(frame);
        }
        self.bullets.retain(|b| b.pos.y > -10.0);
    }

    pub fn clear(&mut self) {
        self.ghosts.clear();
        self.bullets.clear();
    }
}
