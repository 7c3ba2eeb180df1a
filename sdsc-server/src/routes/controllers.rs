//! `/controllers` — global controller descriptor CRUD, enable toggle, and
//! the polling-tick upload endpoint (§4.5, §6).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

// Layer 3: Internal module imports
use sdsc_core::model::{ControllerDescriptor, MethodType};
use sdsc_core::store::Counter;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<ControllerDescriptor>>, ApiError> {
    let controllers = state
        .store
        .list_controllers()
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(Json(controllers))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ControllerDescriptor>, ApiError> {
    let controller = state
        .store
        .get_controller(id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?
        .ok_or_else(|| ApiError::not_found(format!("controller {id} not found")))?;
    Ok(Json(controller))
}

fn parse_method(raw: &str) -> Result<MethodType, ApiError> {
    match raw.to_ascii_lowercase().as_str() {
        "get" => Ok(MethodType::Get),
        "put" => Ok(MethodType::Put),
        "ssync" => Ok(MethodType::Ssync),
        other => Err(ApiError::bad_request(format!("unknown method type {other}"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct ControllerRequest {
    pub controller_name: String,
    pub class_name: String,
    pub method_type: String,
    pub dsl_filter: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<ControllerRequest>,
) -> Result<(StatusCode, Json<ControllerDescriptor>), ApiError> {
    let method_type = parse_method(&req.method_type)?;
    let id = state
        .store
        .next_id(Counter::ControllerId)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    let descriptor = ControllerDescriptor {
        id,
        controller_name: req.controller_name,
        class_name: req.class_name,
        method_type,
        dsl_filter: req.dsl_filter,
        enabled: false,
    };
    state
        .store
        .put_controller(descriptor.clone())
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok((StatusCode::CREATED, Json(descriptor)))
}

#[derive(Debug, Deserialize)]
pub struct ControllerUpdateRequest {
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Toggling `enabled` drives C6's `enable`/`disable` lifecycle so the
/// store flag and the actor's existence never drift apart (§8 property 5).
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ControllerUpdateRequest>,
) -> Result<Json<ControllerDescriptor>, ApiError> {
    if let Some(enabled) = req.enabled {
        if enabled {
            state
                .controllers
                .enable(id)
                .await
                .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
        } else {
            state
                .controllers
                .disable(id)
                .await
                .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
        }
    }

    let controller = state
        .store
        .get_controller(id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?
        .ok_or_else(|| ApiError::not_found(format!("controller {id} not found")))?;
    Ok(Json(controller))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .controllers
        .delete(id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `/controllers/{id}/data`: drives one polling tick, feeding everything
/// accumulated since the last tick into the bandwidth allocation core
/// (C7, §4.6).
pub async fn tick(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .controllers
        .tick(id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(StatusCode::ACCEPTED)
}
