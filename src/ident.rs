//! Roster ref codec and live-store path derivation.
//!
//! A roster member is identified by a composite ref, the two halves joined by
//! `|`: `playerId|email`. The encoded form is what both stores persist, so the
//! codec lives in one place and everything else goes through [`PlayerRef`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Separator between the id and email halves of an encoded ref.
const SEPARATOR: char = '|';

/// Errors produced when building or decoding a roster ref.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayerRefError {
    /// One of the two halves is empty.
    #[error("player ref half `{half}` must not be empty")]
    EmptyHalf {
        /// Name of the offending half.
        half: &'static str,
    },
    /// One of the two halves contains the separator.
    #[error("player ref half `{half}` must not contain `{SEPARATOR}`")]
    ReservedCharacter {
        /// Name of the offending half.
        half: &'static str,
    },
    /// An encoded ref does not split into exactly two halves.
    #[error("malformed player ref `{encoded}`")]
    Malformed {
        /// The offending encoded string.
        encoded: String,
    },
}

/// Composite identity of a roster member.
///
/// Serializes as its encoded `playerId|email` string, so rosters look the
/// same in JSON payloads and store documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerRef {
    player_id: String,
    email: String,
}

impl PlayerRef {
    /// Build a ref, rejecting empty halves and the reserved separator.
    pub fn new(
        player_id: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, PlayerRefError> {
        let player_id = player_id.into();
        let email = email.into();

        if player_id.is_empty() {
            return Err(PlayerRefError::EmptyHalf { half: "player_id" });
        }
        if email.is_empty() {
            return Err(PlayerRefError::EmptyHalf { half: "email" });
        }
        if player_id.contains(SEPARATOR) {
            return Err(PlayerRefError::ReservedCharacter { half: "player_id" });
        }
        if email.contains(SEPARATOR) {
            return Err(PlayerRefError::ReservedCharacter { half: "email" });
        }

        Ok(Self { player_id, email })
    }

    /// Id half, also the key of the player's live points entry.
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Email half.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Encoded `playerId|email` form.
    pub fn encode(&self) -> String {
        format!("{}{SEPARATOR}{}", self.player_id, self.email)
    }
}

impl fmt::Display for PlayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.player_id, self.email)
    }
}

impl FromStr for PlayerRef {
    type Err = PlayerRefError;

    fn from_str(encoded: &str) -> Result<Self, Self::Err> {
        let Some((player_id, email)) = encoded.split_once(SEPARATOR) else {
            return Err(PlayerRefError::Malformed {
                encoded: encoded.to_owned(),
            });
        };
        // A second separator would make the split ambiguous.
        if email.contains(SEPARATOR) {
            return Err(PlayerRefError::Malformed {
                encoded: encoded.to_owned(),
            });
        }
        Self::new(player_id, email)
    }
}

impl TryFrom<String> for PlayerRef {
    type Error = PlayerRefError;

    fn try_from(encoded: String) -> Result<Self, Self::Error> {
        encoded.parse()
    }
}

impl From<PlayerRef> for String {
    fn from(player: PlayerRef) -> Self {
        player.encode()
    }
}

/// Root of a session's live subtree.
pub fn live_session_path(id: Uuid) -> String {
    format!("session_{id}")
}

/// Path of a session's visibility flag.
pub fn live_active_path(id: Uuid) -> String {
    format!("session_{id}/active")
}

/// Path of one player's points leaf.
pub fn player_points_path(id: Uuid, player_id: &str) -> String {
    format!("session_{id}/points/{player_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_round_trips() {
        let player = PlayerRef::new("p1", "p1@example.com").unwrap();
        assert_eq!(player.encode(), "p1|p1@example.com");
        let decoded: PlayerRef = "p1|p1@example.com".parse().unwrap();
        assert_eq!(decoded, player);
        assert_eq!(decoded.player_id(), "p1");
        assert_eq!(decoded.email(), "p1@example.com");
    }

    #[test]
    fn empty_halves_are_rejected() {
        assert_eq!(
            PlayerRef::new("", "p1@example.com"),
            Err(PlayerRefError::EmptyHalf { half: "player_id" })
        );
        assert_eq!(
            PlayerRef::new("p1", ""),
            Err(PlayerRefError::EmptyHalf { half: "email" })
        );
    }

    #[test]
    fn separator_in_halves_is_rejected() {
        assert!(matches!(
            PlayerRef::new("p|1", "p1@example.com"),
            Err(PlayerRefError::ReservedCharacter { half: "player_id" })
        ));
        assert!(matches!(
            PlayerRef::new("p1", "p|1@example.com"),
            Err(PlayerRefError::ReservedCharacter { half: "email" })
        ));
    }

    #[test]
    fn malformed_encodings_are_rejected() {
        assert!(matches!(
            "no-separator".parse::<PlayerRef>(),
            Err(PlayerRefError::Malformed { .. })
        ));
        assert!(matches!(
            "a|b|c".parse::<PlayerRef>(),
            Err(PlayerRefError::Malformed { .. })
        ));
        assert!("|email".parse::<PlayerRef>().is_err());
        assert!("id|".parse::<PlayerRef>().is_err());
    }

    #[test]
    fn serde_uses_encoded_form() {
        let player = PlayerRef::new("p1", "p1@example.com").unwrap();
        let json = serde_json::to_string(&player).unwrap();
        assert_eq!(json, "\"p1|p1@example.com\"");
        let back: PlayerRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, player);
        assert!(serde_json::from_str::<PlayerRef>("\"broken\"").is_err());
    }

    #[test]
    fn roster_vec_serializes_as_string_array() {
        let roster = vec![
            PlayerRef::new("p1", "p1@example.com").unwrap(),
            PlayerRef::new("p2", "p2@example.com").unwrap(),
        ];
        let json = serde_json::to_value(&roster).unwrap();
        assert_eq!(
            json,
            serde_json::json!(["p1|p1@example.com", "p2|p2@example.com"])
        );
    }

    #[test]
    fn live_paths_are_stable() {
        let id = Uuid::nil();
        assert_eq!(
            live_session_path(id),
            "session_00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            live_active_path(id),
            "session_00000000-0000-0000-0000-000000000000/active"
        );
        assert_eq!(
            player_points_path(id, "p1"),
            "session_00000000-0000-0000-0000-000000000000/points/p1"
        );
    }
}
