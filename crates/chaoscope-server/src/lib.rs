//! HTTP query surface over a running observatory.
//!
//! Pull-based and read-only: the latest chaos seed, analysis reports for
//! named series, and stochastic sample paths on demand. Harvesting happens
//! in the background collector (or explicitly via `?refresh=true` on
//! `/seed`); a degraded harvest still answers with its diagnostics.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Deserialize;

use chaoscope_core::processes::PathRequest;
use chaoscope_core::{EntropySource, Harvester, Observatory, mixer, sample_path};

/// Shared server state.
pub struct AppState {
    pub observatory: Arc<Observatory>,
    pub harvester: Harvester,
    /// Source metadata snapshot, built once at router construction.
    source_catalog: serde_json::Value,
}

#[derive(Deserialize)]
struct SeedParams {
    /// Force a fresh harvest+mix instead of returning the latest seed.
    refresh: Option<bool>,
}

async fn handle_seed(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SeedParams>,
) -> (StatusCode, Json<serde_json::Value>) {
    if params.refresh.unwrap_or(false) {
        // Adapters block on real network I/O; keep them off the async workers.
        let st = Arc::clone(&state);
        let mixed = tokio::task::spawn_blocking(move || {
            let results = st.harvester.harvest_all_cached(st.observatory.cache(), 64);
            mixer::mix(&results)
        })
        .await;

        return match mixed {
            Ok(seed) => {
                state.observatory.set_seed(seed.clone());
                (StatusCode::OK, Json(serde_json::to_value(seed).unwrap()))
            }
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": format!("harvest task failed: {e}") })),
            ),
        };
    }

    match state.observatory.latest_seed() {
        Some(seed) => (StatusCode::OK, Json(serde_json::to_value(seed).unwrap())),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "no seed produced yet; start the collector or pass ?refresh=true",
            })),
        ),
    }
}

#[derive(Deserialize)]
struct AnalysisParams {
    /// Optional second series for cross-correlation.
    pair: Option<String>,
}

async fn handle_analysis(
    State(state): State<Arc<AppState>>,
    Path(series): Path<String>,
    Query(params): Query<AnalysisParams>,
) -> (StatusCode, Json<serde_json::Value>) {
    let report = match &params.pair {
        Some(other) => state.observatory.report_pair(&series, other),
        None => state.observatory.report(&series),
    };

    match report {
        Some(report) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "series": series,
                "report": report,
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("unknown series: {series}. Use /series to list observed series."),
            })),
        ),
    }
}

async fn handle_process(
    State(state): State<Arc<AppState>>,
    Query(req): Query<PathRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    // Entropy-derived default seed; zero when nothing has been mixed yet.
    let default_seed = state
        .observatory
        .latest_seed()
        .map(|s| s.seed)
        .unwrap_or(0);
    let entropy = state
        .observatory
        .snapshot(chaoscope_core::metric::ENTROPY_STREAM)
        .unwrap_or_default();

    match sample_path(&req, default_seed, &entropy) {
        Ok(path) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "kind": req.kind.to_string(),
                "length": path.len(),
                "path": path,
            })),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

async fn handle_series(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let names = state.observatory.series_names();
    let series: Vec<serde_json::Value> = names
        .iter()
        .map(|n| {
            serde_json::json!({
                "name": n,
                "length": state.observatory.series_len(n),
            })
        })
        .collect();
    Json(serde_json::json!({ "series": series, "total": names.len() }))
}

async fn handle_sources(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.source_catalog.clone())
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "seed_available": state.observatory.latest_seed().is_some(),
        "series_observed": state.observatory.series_names().len(),
        "cached_sources": state.observatory.cache().len(),
        "chain_length": state.harvester.chain_len(),
    }))
}

async fn handle_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "Chaoscope Server",
        "version": chaoscope_core::VERSION,
        "endpoints": {
            "/": "This API index",
            "/seed": "Latest chaos seed (?refresh=true forces a harvest+mix)",
            "/analysis/{series}": "Analysis report for a named series (?pair=<other> adds cross-correlation)",
            "/process": {
                "method": "GET",
                "description": "Generate a stochastic sample path",
                "params": {
                    "kind": "levy | fbm | jump_diffusion | entropy_diffusion",
                    "length": "Path length (default: 256)",
                    "seed": "Explicit seed (defaults to the latest chaos seed)",
                    "alpha/beta/scale/location": "Lévy-stable parameters",
                    "hurst": "fBm Hurst exponent",
                    "dt/mu/sigma/lambda/jump_mean/jump_std": "Jump-diffusion parameters",
                    "step_size": "Entropy-diffusion step size",
                }
            },
            "/series": "List observed series and their lengths",
            "/sources": "List registered entropy sources",
            "/health": "Health check",
        },
        "examples": {
            "levy_path": "/process?kind=levy&length=512&alpha=1.7",
            "entropy_report": "/analysis/entropy_stream",
            "co_movement": "/analysis/mixed_value?pair=entropy_stream",
        }
    }))
}

/// Build the axum router.
pub fn build_router(observatory: Arc<Observatory>, harvester: Harvester) -> Router {
    let chain_names = harvester.source_names();
    let sources: Vec<serde_json::Value> = chaoscope_core::all_sources()
        .iter()
        .map(|s| {
            let info = s.info();
            serde_json::json!({
                "name": info.name,
                "description": info.description,
                "quality": info.quality.to_string(),
                "timeout_secs": info.timeout.as_secs_f64(),
                "in_chain": chain_names.contains(&info.name),
            })
        })
        .collect();

    let state = Arc::new(AppState {
        observatory,
        harvester,
        source_catalog: serde_json::json!({ "sources": sources }),
    });

    Router::new()
        .route("/", get(handle_index))
        .route("/seed", get(handle_seed))
        .route("/analysis/{series}", get(handle_analysis))
        .route("/process", get(handle_process))
        .route("/series", get(handle_series))
        .route("/sources", get(handle_sources))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Run the HTTP server until the task is dropped.
pub async fn run_server(
    observatory: Arc<Observatory>,
    harvester: Harvester,
    host: &str,
    port: u16,
) -> std::io::Result<()> {
    let app = build_router(observatory, harvester);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}
