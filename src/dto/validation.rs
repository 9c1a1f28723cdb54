//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest label accepted for a player name.
pub const MAX_LABEL_LENGTH: usize = 64;

/// Validates a player label before it is embedded into `"<n>_@<label>"`.
///
/// The label later names artifact files, so path separators and control
/// characters are refused.
///
/// # Examples
///
/// ```ignore
/// validate_player_label("zlj")        // Ok
/// validate_player_label("")           // Err - empty
/// validate_player_label("../etc")     // Err - separator
/// ```
pub fn validate_player_label(label: &str) -> Result<(), ValidationError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("player_label_empty");
        err.message = Some("Player name must not be empty".into());
        return Err(err);
    }

    if trimmed.chars().count() > MAX_LABEL_LENGTH {
        let mut err = ValidationError::new("player_label_length");
        err.message = Some(
            format!(
                "Player name must be at most {MAX_LABEL_LENGTH} characters (got {})",
                trimmed.chars().count()
            )
            .into(),
        );
        return Err(err);
    }

    if trimmed
        .chars()
        .any(|c| matches!(c, '/' | '\\') || c.is_control())
    {
        let mut err = ValidationError::new("player_label_format");
        err.message =
            Some("Player name must not contain path separators or control characters".into());
        return Err(err);
    }

    Ok(())
}
