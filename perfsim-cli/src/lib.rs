//! HTTP service and command line front end for `perfsim-core`.
//!
//! Endpoints:
//! - POST /simulate  - performance report for a vehicle (JSON, or YAML by content type)
//! - GET  /health    - liveness check
//! - GET  /files/*   - static files, when a directory is configured

pub mod error;
pub mod http;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};

use perfsim_core::{CycleCatalog, PerfParams, SerdeAPI, SimParams};

use crate::http::AppState;

/// Metrics driver and vehicle model settings, loadable from one yaml or json file
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ModelParams {
    pub perf_params: PerfParams,
    pub sim_params: SimParams,
}

impl SerdeAPI for ModelParams {
    fn init(&mut self) -> anyhow::Result<()> {
        self.perf_params.init().context("invalid perf_params")?;
        self.sim_params.init().context("invalid sim_params")?;
        Ok(())
    }
}

impl ModelParams {
    /// Defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path)
                .with_context(|| format!("failed to load parameters from {path:?}")),
            None => Ok(Self::default()),
        }
    }
}

/// Bundled reference cycles unless both replacements are given
pub fn load_catalog(city: Option<&Path>, highway: Option<&Path>) -> anyhow::Result<CycleCatalog> {
    match (city, highway) {
        (Some(city), Some(highway)) => CycleCatalog::from_files(city, highway),
        (None, None) => CycleCatalog::from_resources(),
        _ => bail!("--city-cycle and --highway-cycle must be given together"),
    }
}

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub city_cycle: Option<PathBuf>,
    pub highway_cycle: Option<PathBuf>,
    /// served under `/files` when set
    pub static_dir: Option<PathBuf>,
    pub params_file: Option<PathBuf>,
    /// wall-clock limit for one simulation, $s$
    pub request_timeout_s: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            city_cycle: None,
            highway_cycle: None,
            static_dir: None,
            params_file: None,
            request_timeout_s: 30.0,
        }
    }
}

impl ServerConfig {
    /// Load the catalog and parameters named by the configuration
    pub fn app_state(&self) -> anyhow::Result<AppState> {
        ensure!(
            self.request_timeout_s > 0.0 && self.request_timeout_s.is_finite(),
            "request timeout must be a positive number of seconds, got {}",
            self.request_timeout_s
        );
        let catalog = load_catalog(self.city_cycle.as_deref(), self.highway_cycle.as_deref())?;
        let params = ModelParams::load(self.params_file.as_deref())?;
        Ok(AppState {
            catalog: Arc::new(catalog),
            perf_params: Arc::new(params.perf_params),
            sim_params: Arc::new(params.sim_params),
            timeout: Duration::from_secs_f64(self.request_timeout_s),
        })
    }
}

/// Start the HTTP server. Blocks until shutdown.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = config.app_state()?;
    for (kind, cyc) in state.catalog.entries() {
        log::info!("{kind} cycle loaded: {} ({} samples)", cyc.name, cyc.len());
    }
    if let Some(dir) = &config.static_dir {
        ensure!(dir.is_dir(), "static directory not found: {dir:?}");
        log::info!("serving static files from {dir:?} under /files");
    }
    let app = http::router(state, config.static_dir.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
