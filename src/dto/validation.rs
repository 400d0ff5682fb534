//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a player id is non-empty and usable both as the first half
/// of a roster ref and as a live-store path segment.
pub fn validate_player_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("player_id_empty");
        err.message = Some("Player id must not be empty".into());
        return Err(err);
    }

    if id.contains(['|', '/']) {
        let mut err = ValidationError::new("player_id_format");
        err.message = Some("Player id must not contain '|' or '/'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates the email half of a roster ref: non-empty and free of the
/// ref separator.
pub fn validate_player_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        let mut err = ValidationError::new("player_email_empty");
        err.message = Some("Player email must not be empty".into());
        return Err(err);
    }

    if email.contains('|') {
        let mut err = ValidationError::new("player_email_format");
        err.message = Some("Player email must not contain '|'".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_player_ids_pass() {
        assert!(validate_player_id("player-1").is_ok());
        assert!(validate_player_id("uid_42").is_ok());
    }

    #[test]
    fn reserved_characters_are_rejected() {
        assert!(validate_player_id("p|1").is_err());
        assert!(validate_player_id("p/1").is_err());
        assert!(validate_player_id("").is_err());
        assert!(validate_player_id("   ").is_err());
    }

    #[test]
    fn email_half_rejects_separator() {
        assert!(validate_player_email("p1@example.com").is_ok());
        assert!(validate_player_email("p|1@example.com").is_err());
        assert!(validate_player_email("").is_err());
    }
}
