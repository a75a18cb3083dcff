// Service error taxonomy and HTTP status mapping
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("unknown client: {0}")]
    UnknownClient(String),

    #[error("share link not found")]
    LinkNotFound,

    #[error("share link disabled")]
    LinkDisabled,

    #[error("share link expired")]
    LinkExpired,

    #[error("invalid date range: {0}")]
    InvalidRange(String),

    #[error("every analytics source failed and no snapshot is held")]
    SourcesUnavailable,

    #[error("failed to save dashboard configuration: {0}")]
    SaveFailed(#[source] anyhow::Error),

    #[error("overview generation failed: {0}")]
    OverviewFailed(#[source] anyhow::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = match &self {
            ReportError::UnknownClient(_) | ReportError::LinkNotFound => StatusCode::NOT_FOUND,
            ReportError::LinkDisabled => StatusCode::FORBIDDEN,
            ReportError::LinkExpired => StatusCode::GONE,
            ReportError::InvalidRange(_) => StatusCode::BAD_REQUEST,
            ReportError::SourcesUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ReportError::SaveFailed(_) | ReportError::OverviewFailed(_) => StatusCode::BAD_GATEWAY,
            ReportError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
