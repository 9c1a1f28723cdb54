use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for both relay roles.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::players::list_players,
        crate::routes::players::append_player,
        crate::routes::queue::queue_status,
        crate::routes::transfer::trigger_transfer,
        crate::routes::transfer::receive_transfer,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::player::PlayerInput,
            crate::dto::player::AppendResponse,
            crate::dto::player::SnapshotResponse,
            crate::dto::queue::QueueStatusResponse,
            crate::dto::transfer::TransferType,
            crate::dto::transfer::ArtifactPayload,
            crate::dto::transfer::TransferEnvelope,
            crate::dto::transfer::TransferRequest,
            crate::dto::transfer::TransferResponse,
            crate::dto::transfer::ReceiveResponse,
            crate::dao::models::PlayerEntity,
            crate::dao::models::StoreMetadataEntity,
            crate::dao::models::RecordSetEntity,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "players", description = "Record creation and reporting"),
        (name = "queue", description = "Queue position and wait estimate"),
        (name = "transfers", description = "Batch transfer between the local and remote roles"),
    )
)]
pub struct ApiDoc;
