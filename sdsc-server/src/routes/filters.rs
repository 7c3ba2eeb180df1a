//! `/filters/dsl` — CRUD on dynamic filter aliases (§4.1, §6).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

// Layer 3: Internal module imports
use sdsc_core::model::DynamicFilterAlias;
use sdsc_core::{Error as CoreError, PolicyError, StoreError};

use crate::error::ApiError;
use crate::state::AppState;

fn to_api_error(state: &AppState, err: StoreError) -> ApiError {
    ApiError::from_core(CoreError::Store(err), state.config.legacy_401_on_parse_error)
}

pub async fn list_aliases(
    State(state): State<AppState>,
) -> Result<Json<Vec<DynamicFilterAlias>>, ApiError> {
    let aliases = state
        .store
        .list_dynamic_filters()
        .await
        .map_err(|e| to_api_error(&state, e))?;
    Ok(Json(aliases))
}

pub async fn get_alias(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DynamicFilterAlias>, ApiError> {
    let alias = state
        .store
        .get_dynamic_filter(&name)
        .await
        .map_err(|e| to_api_error(&state, e))?
        .ok_or_else(|| ApiError::not_found(format!("dynamic filter {name} not found")))?;
    Ok(Json(alias))
}

#[derive(Debug, Deserialize)]
pub struct AliasRequest {
    pub name: String,
    pub filter_id: u64,
}

pub async fn create_alias(
    State(state): State<AppState>,
    Json(req): Json<AliasRequest>,
) -> Result<(StatusCode, Json<DynamicFilterAlias>), ApiError> {
    let alias = DynamicFilterAlias {
        name: req.name,
        filter_id: req.filter_id,
    };
    state
        .store
        .put_dynamic_filter(alias.clone())
        .await
        .map_err(|e| to_api_error(&state, e))?;
    Ok((StatusCode::CREATED, Json(alias)))
}

pub async fn update_alias(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<AliasRequest>,
) -> Result<Json<DynamicFilterAlias>, ApiError> {
    let alias = DynamicFilterAlias {
        name,
        filter_id: req.filter_id,
    };
    state
        .store
        .put_dynamic_filter(alias.clone())
        .await
        .map_err(|e| to_api_error(&state, e))?;
    Ok(Json(alias))
}

/// Fails 403 if any pipeline entry still references this filter's id
/// (§8.4 referential integrity).
pub async fn delete_alias(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let alias = state
        .store
        .get_dynamic_filter(&name)
        .await
        .map_err(|e| to_api_error(&state, e))?
        .ok_or_else(|| ApiError::not_found(format!("dynamic filter {name} not found")))?;

    let referenced = state
        .store
        .filter_is_referenced(alias.filter_id)
        .await
        .map_err(|e| to_api_error(&state, e))?;
    if referenced {
        return Err(ApiError::from_core(
            CoreError::Policy(PolicyError::Conflict(name)),
            state.config.legacy_401_on_parse_error,
        ));
    }

    state
        .store
        .delete_dynamic_filter(&name)
        .await
        .map_err(|e| to_api_error(&state, e))?;
    Ok(StatusCode::NO_CONTENT)
}
