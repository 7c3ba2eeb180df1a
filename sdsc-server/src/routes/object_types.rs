//! `/object_types` — atomic-replace CRUD plus single-extension removal
//! (§4.1, §6, §8.3).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

// Layer 3: Internal module imports
use sdsc_core::model::ObjectType;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ObjectType>>, ApiError> {
    let types = state
        .store
        .list_object_types()
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(Json(types))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ObjectType>, ApiError> {
    let object_type = state
        .store
        .get_object_type(&name)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?
        .ok_or_else(|| ApiError::not_found(format!("object type {name} not found")))?;
    Ok(Json(object_type))
}

#[derive(Debug, Deserialize)]
pub struct ObjectTypeRequest {
    pub name: String,
    pub extensions: Vec<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<ObjectTypeRequest>,
) -> Result<(StatusCode, Json<ObjectType>), ApiError> {
    let object_type = ObjectType {
        name: req.name,
        extensions: req.extensions,
    };
    state
        .store
        .replace_object_type(object_type.clone())
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok((StatusCode::CREATED, Json(object_type)))
}

pub async fn replace(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<ObjectTypeRequest>,
) -> Result<Json<ObjectType>, ApiError> {
    let object_type = ObjectType {
        name,
        extensions: req.extensions,
    };
    state
        .store
        .replace_object_type(object_type.clone())
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(Json(object_type))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_object_type(&name)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_extension(
    State(state): State<AppState>,
    Path((name, ext)): Path<(String, String)>,
) -> Result<Json<ObjectType>, ApiError> {
    let mut object_type = state
        .store
        .get_object_type(&name)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?
        .ok_or_else(|| ApiError::not_found(format!("object type {name} not found")))?;

    object_type.extensions.retain(|e| e != &ext);
    state
        .store
        .replace_object_type(object_type.clone())
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(Json(object_type))
}
