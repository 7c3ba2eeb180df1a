//! `/nodes` — CRUD on Storage Nodes (§3, §6).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

// Layer 3: Internal module imports
use sdsc_core::model::StorageNode;
use sdsc_core::store::Counter;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<StorageNode>>, ApiError> {
    let nodes = state
        .store
        .list_storage_nodes()
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(Json(nodes))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<StorageNode>, ApiError> {
    let node = state
        .store
        .get_storage_node(id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?
        .ok_or_else(|| ApiError::not_found(format!("storage node {id} not found")))?;
    Ok(Json(node))
}

#[derive(Debug, Deserialize)]
pub struct StorageNodeRequest {
    pub name: String,
    pub address: String,
    pub role: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<StorageNodeRequest>,
) -> Result<(StatusCode, Json<StorageNode>), ApiError> {
    let id = state
        .store
        .next_id(Counter::StorageNodeId)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    let node = StorageNode {
        id,
        name: req.name,
        address: req.address,
        role: req.role,
    };
    state
        .store
        .put_storage_node(node.clone())
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok((StatusCode::CREATED, Json(node)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<StorageNodeRequest>,
) -> Result<Json<StorageNode>, ApiError> {
    let node = StorageNode {
        id,
        name: req.name,
        address: req.address,
        role: req.role,
    };
    state
        .store
        .put_storage_node(node.clone())
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(Json(node))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_storage_node(id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(StatusCode::NO_CONTENT)
}
