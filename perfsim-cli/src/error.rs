//! Errors returned by the HTTP service and their JSON responses.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use perfsim_core::PerformanceError;

#[derive(Debug)]
pub enum ServerError {
    /// The request body is not a usable vehicle description.
    BadRequest(String),
    /// The metrics driver failed for this vehicle.
    Performance(PerformanceError),
    /// The simulation outlived the request timeout.
    Timeout(Duration),
    /// Failure on the server side unrelated to the request contents.
    Internal(String),
}

/// JSON body returned on error.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: u16,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Performance(PerformanceError::AccelNotConverged { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Performance(PerformanceError::Simulation(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "invalid vehicle: {msg}"),
            Self::Performance(err) => write!(f, "{err}"),
            Self::Timeout(limit) => {
                write!(f, "simulation exceeded {:.1}s time limit", limit.as_secs_f64())
            }
            Self::Internal(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<PerformanceError> for ServerError {
    fn from(err: PerformanceError) -> Self {
        Self::Performance(err)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::info!("request rejected ({}): {self}", status.as_u16());
        }
        let body = ErrorBody {
            error: self.to_string(),
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}
