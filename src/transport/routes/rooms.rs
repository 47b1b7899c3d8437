use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    response::Json,
};

use crate::{
    common::{ApiError, RoomId, now_ms},
    protocol::{RoomSnapshot, RoomSummary},
    server::AppState,
};

/// GET /v1/rooms
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummary>> {
    tracing::debug!("GET /v1/rooms");
    Json(state.registry.summaries())
}

/// GET /v1/rooms/{room_id}
pub async fn get_room(
    Path(room_id): Path<String>,
    OriginalUri(uri): OriginalUri,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoomSnapshot>, ApiError> {
    tracing::debug!("GET /v1/rooms/{}", room_id);
    state
        .registry
        .snapshot(&RoomId::from(room_id), now_ms())
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Room not found", uri.path()))
}
