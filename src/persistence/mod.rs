//! Profile snapshot handed to an external save/load collaborator
//!
//! Features:
//! - Versioned JSON envelope
//! - Forward-compatible fields (`#[serde(default)]`)
//! - Unknown versions rejected rather than guessed at

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current envelope version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// Sign-in details shown on the profile screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub username: String,
    pub logged_in: bool,
    pub provider: Option<String>,
    pub avatar: Option<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            username: "Guest".to_string(),
            logged_in: false,
            provider: None,
            avatar: None,
        }
    }
}

/// Everything that survives between sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSnapshot {
    /// Character index 0..=6
    pub selected_character: u8,
    pub high_score: u64,
    pub player_level: u32,
    pub unlocked_characters: Vec<u8>,
    pub user_profile: UserProfile,
}

impl Default for ProfileSnapshot {
    fn default() -> Self {
        Self {
            selected_character: 0,
            high_score: 0,
            player_level: 1,
            unlocked_characters: vec![0],
            user_profile: UserProfile::default(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    profile: ProfileSnapshot,
}

impl ProfileSnapshot {
    /// Encode as a versioned JSON envelope
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        let envelope = Envelope {
            version: SNAPSHOT_VERSION,
            profile: self.clone(),
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    /// Decode a versioned JSON envelope
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let envelope: Envelope = serde_json::from_str(json)?;
        if envelope.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(envelope.version));
        }
        Ok(envelope.profile)
    }

    /// Record a finished run's score
    pub fn record_score(&mut self, score: u64) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_roundtrip() {
        let snapshot = ProfileSnapshot {
            selected_character: 3,
            high_score: 12_500,
            player_level: 7,
            unlocked_characters: vec![0, 1, 3],
            user_profile: UserProfile {
                username: "Ace".into(),
                logged_in: true,
                provider: Some("github".into()),
                avatar: None,
            },
        };
        let json = snapshot.to_json().unwrap();
        assert!(json.contains(r#""version":1"#));
        assert_eq!(ProfileSnapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let err = ProfileSnapshot::from_json(r#"{"version":9,"profile":{}}"#).unwrap_err();
        assert!(matches!(err, PersistenceError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot = ProfileSnapshot::from_json(r#"{"version":1,"profile":{"high_score":50}}"#).unwrap();
        assert_eq!(snapshot.high_score, 50);
        assert_eq!(snapshot.user_profile.username, "Guest");
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ProfileSnapshot::from_json("not json"),
            Err(PersistenceError::Serialize(_))
        ));
    }

    #[test]
    fn test_record_score_keeps_max() {
        let mut snapshot = ProfileSnapshot::default();
        assert!(snapshot.record_score(100));
        assert!(!snapshot.record_score(50));
        assert_eq!(snapshot.high_score, 100);
    }
}
