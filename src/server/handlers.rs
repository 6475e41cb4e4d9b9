use super::types::{ChatRequest, ErrorResponse, HealthResponse};
use crate::{Error, history::Message, relay::Relay};
use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// POST /api/chat
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Vec<Message>>, HandlerError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected chat request body: {}", rejection);
        error_response(Error::validation(rejection.body_text()))
    })?;

    match state.relay.handle_incoming(request.text.as_deref()).await {
        Ok(messages) => {
            info!("Returning {} messages", messages.len());
            Ok(Json(messages))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/chat
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<Message>>, HandlerError> {
    state.relay.history().await.map(Json).map_err(error_response)
}

/// GET /api/chat/:id
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, HandlerError> {
    state.relay.message(id).await.map(Json).map_err(error_response)
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn error_response(err: Error) -> HandlerError {
    let status = match &err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Request failed: {}", err);
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
