//! `/tenants_groups` — atomic-replace CRUD plus single-member removal
//! (§4.1, §6, §8.3).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

// Layer 3: Internal module imports
use sdsc_core::model::TenantGroup;
use sdsc_core::store::Counter;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<TenantGroup>>, ApiError> {
    let groups = state
        .store
        .list_tenant_groups()
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(Json(groups))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(gid): Path<u64>,
) -> Result<Json<TenantGroup>, ApiError> {
    let group = state
        .store
        .get_tenant_group(gid)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?
        .ok_or_else(|| ApiError::not_found(format!("tenant group {gid} not found")))?;
    Ok(Json(group))
}

#[derive(Debug, Deserialize)]
pub struct TenantGroupRequest {
    pub tenants: Vec<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<TenantGroupRequest>,
) -> Result<(StatusCode, Json<TenantGroup>), ApiError> {
    let id = state
        .store
        .next_id(Counter::TenantGroupId)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    let group = TenantGroup {
        id,
        tenants: req.tenants,
    };
    state
        .store
        .replace_tenant_group(group.clone())
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// Atomic replace: readers never observe a partial update (§8.3).
pub async fn replace(
    State(state): State<AppState>,
    Path(gid): Path<u64>,
    Json(req): Json<TenantGroupRequest>,
) -> Result<Json<TenantGroup>, ApiError> {
    let group = TenantGroup {
        id: gid,
        tenants: req.tenants,
    };
    state
        .store
        .replace_tenant_group(group.clone())
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(Json(group))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(gid): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_tenant_group(gid)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_member(
    State(state): State<AppState>,
    Path((gid, tid)): Path<(u64, String)>,
) -> Result<Json<TenantGroup>, ApiError> {
    let mut group = state
        .store
        .get_tenant_group(gid)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?
        .ok_or_else(|| ApiError::not_found(format!("tenant group {gid} not found")))?;

    group.tenants.retain(|t| t != &tid);
    state
        .store
        .replace_tenant_group(group.clone())
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(Json(group))
}
