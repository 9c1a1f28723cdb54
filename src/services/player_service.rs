//! Record creation and reporting on the role's record store.

use tracing::info;
use validator::Validate;

use crate::{
    dto::{
        player::{AppendResponse, PlayerInput, SnapshotResponse},
        validation::validate_player_label,
    },
    error::ServiceError,
    state::{SharedState, record_store::PlayerDraft},
};

/// Label used when the client does not send one.
pub const DEFAULT_LABEL: &str = "anonymous";

/// Validate `input` and turn it into a draft. Nothing is mutated on failure.
pub fn into_draft(input: PlayerInput) -> Result<PlayerDraft, ServiceError> {
    input.validate()?;

    let label = input
        .label
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| DEFAULT_LABEL.to_string());
    validate_player_label(&label)
        .map_err(|err| ServiceError::InvalidInput(format!("invalid player name: {err}")))?;

    let money = input.money.ok_or_else(|| missing("Player Money"))?;
    let body_state = input.body_state.ok_or_else(|| missing("Player Body State"))?;
    let r = channel(input.r, "R")?;
    let g = channel(input.g, "G")?;
    let b = channel(input.b, "B")?;

    Ok(PlayerDraft {
        label,
        money,
        body_state,
        r,
        g,
        b,
    })
}

fn missing(field: &str) -> ServiceError {
    ServiceError::InvalidInput(format!("missing required field: {field}"))
}

fn channel(value: Option<i64>, field: &str) -> Result<u8, ServiceError> {
    let value = value.ok_or_else(|| missing(field))?;
    u8::try_from(value)
        .map_err(|_| ServiceError::InvalidInput(format!("{field} must be within 0..=255")))
}

/// Validate and append one record, returning its allocated number.
pub async fn append_record(
    state: &SharedState,
    input: PlayerInput,
) -> Result<AppendResponse, ServiceError> {
    let draft = into_draft(input)?;
    let record = state.store().append_one(draft).await?;

    info!(number = record.number, name = %record.name, "player record appended");
    Ok(AppendResponse {
        status: "success".into(),
        message: format!("player {} saved", record.name),
        player_number: record.number,
    })
}

/// Consistent copy of resident records, metadata and provenance.
pub async fn snapshot_records(state: &SharedState) -> Result<SnapshotResponse, ServiceError> {
    let document = state.store().snapshot().await?;
    Ok(document.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PlayerInput {
        PlayerInput {
            label: Some("zlj".into()),
            money: Some(12_000_000),
            body_state: Some(80),
            r: Some(255),
            g: Some(0),
            b: Some(12),
        }
    }

    #[test]
    fn complete_input_becomes_draft() {
        let draft = into_draft(complete()).unwrap();
        assert_eq!(draft.label, "zlj");
        assert_eq!(draft.r, 255);
        assert_eq!(draft.b, 12);
    }

    #[test]
    fn missing_field_is_named() {
        let input = PlayerInput {
            body_state: None,
            ..complete()
        };
        match into_draft(input) {
            Err(ServiceError::InvalidInput(message)) => {
                assert!(message.contains("Player Body State"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn absent_label_defaults_to_anonymous() {
        let input = PlayerInput {
            label: Some("   ".into()),
            ..complete()
        };
        assert_eq!(into_draft(input).unwrap().label, DEFAULT_LABEL);
    }

    #[test]
    fn colour_out_of_range_is_rejected() {
        let input = PlayerInput {
            g: Some(256),
            ..complete()
        };
        assert!(matches!(into_draft(input), Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn path_like_label_is_rejected() {
        let input = PlayerInput {
            label: Some("../x".into()),
            ..complete()
        };
        assert!(matches!(into_draft(input), Err(ServiceError::InvalidInput(_))));
    }
}
