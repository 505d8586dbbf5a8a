//! JSON API over the property hub.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use phub_consolidate::{HubError, PropertyHub};
use phub_storage::{DatasetDirectory, HubConfig};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

pub const CRATE_NAME: &str = "phub-web";

#[derive(Clone)]
pub struct AppState {
    pub data_root: PathBuf,
    pub hub: Arc<PropertyHub>,
}

impl AppState {
    pub fn new(data_root: impl Into<PathBuf>, hub: PropertyHub) -> Self {
        Self {
            data_root: data_root.into(),
            hub: Arc::new(hub),
        }
    }

    pub async fn from_config(config: &HubConfig) -> anyhow::Result<Self> {
        let store = DatasetDirectory::from_config(config).await?;
        Ok(Self::new(config.data_root.clone(), PropertyHub::new(Arc::new(store))))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    ok: bool,
    data_root: String,
    properties: usize,
}

#[derive(Debug, Serialize)]
struct PropertyRow {
    id: String,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/properties", get(properties_handler))
        .route("/api/properties/{id}", get(property_handler))
        .route("/api/properties/{id}/raw", get(raw_handler))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

pub async fn serve(config: HubConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).await?;
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        port = config.port,
        data_root = %config.data_root.display(),
        "property hub API listening"
    );
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> Response {
    match state.hub.property_ids().await {
        Ok(ids) => Json(Health {
            ok: true,
            data_root: state.data_root.display().to_string(),
            properties: ids.len(),
        })
        .into_response(),
        Err(err) => hub_error(err),
    }
}

async fn properties_handler(State(state): State<AppState>) -> Response {
    match state.hub.property_ids().await {
        Ok(ids) => Json(ids.into_iter().map(|id| PropertyRow { id }).collect::<Vec<_>>()).into_response(),
        Err(err) => hub_error(err),
    }
}

async fn property_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.hub.consolidated(&id).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => hub_error(err),
    }
}

async fn raw_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.hub.raw(&id).await {
        Ok(raw) => Json(raw).into_response(),
        Err(err) => hub_error(err),
    }
}

fn hub_error(err: HubError) -> Response {
    let (status, message) = match &err {
        HubError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found".to_string()),
        HubError::MissingPrimarySource(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Missing primary source".to_string())
        }
        HubError::MalformedInput { .. } | HubError::Storage(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    };
    if status.is_server_error() {
        error!(property_id = ?err.property_id(), error = %err, "request failed");
    } else {
        warn!(property_id = ?err.property_id(), "property not found");
    }
    (status, Json(json!({ "error": message }))).into_response()
}
