//! HTTP endpoints using axum.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::services::ServeDir;

use perfsim_core::{
    simulate_performance, CycleCatalog, PerfParams, PhysicsModel, SerdeAPI, SimParams, Vehicle,
};

use crate::error::ServerError;

/// Read-only state shared by all requests
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CycleCatalog>,
    pub perf_params: Arc<PerfParams>,
    pub sim_params: Arc<SimParams>,
    /// wall-clock limit for one simulation
    pub timeout: Duration,
}

/// Build the router. Files under `static_dir` are served at `/files`.
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let app = Router::new()
        .route("/simulate", post(simulate))
        .route("/health", get(health));
    let app = match static_dir {
        Some(dir) => app.nest_service("/files", ServeDir::new(dir)),
        None => app,
    };
    app.with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Body format named by the `Content-Type` header; json unless it mentions yaml
fn body_format(headers: &HeaderMap) -> &'static str {
    let is_yaml = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.contains("yaml"));
    if is_yaml {
        "yaml"
    } else {
        "json"
    }
}

fn parse_vehicle(headers: &HeaderMap, body: &[u8]) -> Result<Vehicle, ServerError> {
    let body = std::str::from_utf8(body)
        .map_err(|err| ServerError::BadRequest(format!("body is not valid UTF-8: {err}")))?;
    Vehicle::from_str(body, body_format(headers))
        .map_err(|err| ServerError::BadRequest(format!("{err:#}")))
}

async fn simulate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    let veh = parse_vehicle(&headers, &body)?;
    let scenario_name = veh.scenario_name.clone();

    let catalog = state.catalog.clone();
    let perf_params = state.perf_params.clone();
    let model = PhysicsModel::new(veh, (*state.sim_params).clone());
    // an expired request leaves its task running until the step limit stops it
    let task = tokio::task::spawn_blocking(move || {
        simulate_performance(&model, &catalog, &perf_params)
    });
    let report = match tokio::time::timeout(state.timeout, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(err)) => {
            return Err(ServerError::Internal(format!(
                "simulation task failed: {err}"
            )))
        }
        Err(_) => return Err(ServerError::Timeout(state.timeout)),
    };

    let body = report
        .to_json()
        .map_err(|err| ServerError::Internal(format!("failed to serialize report: {err:#}")))?;
    log::info!(
        "simulated `{scenario_name}`: top speed {}, 0-100 {}",
        report.top_speed,
        report.time_to_100kph
    );
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
