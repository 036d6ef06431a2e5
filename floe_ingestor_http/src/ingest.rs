//! Handler for the /v1/ingest endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use floe_ingestor_core::IngestorError;

use crate::HttpIngestorState;
use crate::types::{ErrorResponse, IngestResponse};

pub async fn ingest_handler(
    State(state): State<HttpIngestorState>,
    body: String,
) -> impl IntoResponse {
    if body.trim().is_empty() {
        return client_error("request body must contain JSON");
    }

    match process_ingest(&state, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => map_error_to_response(err),
    }
}

/// Run the shared pipeline for one request payload.
pub(crate) async fn process_ingest(
    state: &HttpIngestorState,
    body: &str,
) -> Result<IngestResponse, IngestorError> {
    let outcome = state.pipeline().ingest_message(body).await?;
    Ok(outcome.into())
}

/// Payload problems are the client's fault; everything else is ours.
fn map_error_to_response(error: IngestorError) -> Response {
    let status_code = match error {
        IngestorError::Payload { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::warn!(%error, status = %status_code, "ingest request failed");

    let response = Json(ErrorResponse {
        message: error.to_string(),
    });

    (status_code, response).into_response()
}

fn client_error(message: &str) -> Response {
    let response = Json(ErrorResponse {
        message: message.to_string(),
    });

    (StatusCode::BAD_REQUEST, response).into_response()
}
