//! `/policies` — static pipeline entries and dynamic rule records (§4.3,
//! §6, §8 property 2: listing is always sorted by `execution_order`).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use sdsc_core::dsl::{Action, TargetAction};
use sdsc_core::model::{DynamicPolicy, PipelineKey, PolicyEntry};
use sdsc_core::policy::apply::{apply_target_action, revert_target_action};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PolicyListing {
    Static(Vec<PolicyEntry>),
    Dynamic(Vec<DynamicPolicy>),
}

/// `?static` lists every pipeline entry across all tenants sorted by
/// `execution_order`; `?dynamic` (the default) lists dynamic rule records.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PolicyListing>, ApiError> {
    match query.kind.as_deref() {
        Some("static") => {
            let pipelines = state
                .store
                .list_pipelines()
                .await
                .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
            let mut entries: Vec<PolicyEntry> =
                pipelines.into_values().flat_map(|p| p.entries).collect();
            entries.sort_by_key(|e| e.execution_order);
            Ok(Json(PolicyListing::Static(entries)))
        }
        _ => {
            let policies = state
                .store
                .list_policies()
                .await
                .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
            Ok(Json(PolicyListing::Dynamic(policies)))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub policy_ids: Vec<u64>,
    pub errors: Vec<SubmitError>,
}

#[derive(Debug, Serialize)]
pub struct SubmitError {
    pub rule: String,
    pub message: String,
}

/// `SubmitRules(text)`: each line of the request body is attempted
/// independently (§4.3).
pub async fn submit(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let outcome = state.policy.submit_rules(&body).await;
    let response = SubmitResponse {
        policy_ids: outcome.policy_ids,
        errors: outcome
            .errors
            .into_iter()
            .map(|(rule, err)| SubmitError {
                rule,
                message: err.to_string(),
            })
            .collect(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

fn split_tenant(raw: &str) -> (String, Option<String>) {
    match raw.split_once(':') {
        Some((tenant, container)) => (tenant.to_string(), Some(container.to_string())),
        None => (raw.to_string(), None),
    }
}

pub async fn get_static(
    State(state): State<AppState>,
    Path((tenant, policy_id)): Path<(String, u64)>,
) -> Result<Json<PolicyEntry>, ApiError> {
    let (tenant_id, container) = split_tenant(&tenant);
    let key = PipelineKey::new(tenant_id, container);
    let pipeline = state
        .store
        .get_pipeline(&key)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    let entry = pipeline
        .entries
        .into_iter()
        .find(|e| e.policy_id == policy_id)
        .ok_or_else(|| ApiError::not_found(format!("policy {policy_id} not found for {tenant}")))?;
    Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
pub struct StaticPolicyRequest {
    pub filter_name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub object_size: Option<(String, i64)>,
}

pub async fn put_static(
    State(state): State<AppState>,
    Path((tenant, policy_id)): Path<(String, u64)>,
    Json(req): Json<StaticPolicyRequest>,
) -> Result<Json<PolicyEntry>, ApiError> {
    let (tenant_id, container) = split_tenant(&tenant);
    let target = TargetAction {
        tenant_id: tenant_id.clone(),
        container: container.clone(),
        action: Action::Set {
            filter_name: req.filter_name,
            params: req.params,
        },
        object_type: req.object_type,
        object_size: req.object_size,
        execution_server: None,
    };

    apply_target_action(state.store.as_ref(), &target, policy_id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;

    let key = PipelineKey::new(tenant_id, container);
    let pipeline = state
        .store
        .get_pipeline(&key)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    let entry = pipeline
        .entries
        .into_iter()
        .find(|e| e.policy_id == policy_id)
        .ok_or_else(|| ApiError::not_found(format!("policy {policy_id} not found for {tenant}")))?;
    Ok(Json(entry))
}

pub async fn delete_static(
    State(state): State<AppState>,
    Path((tenant, policy_id)): Path<(String, u64)>,
) -> Result<StatusCode, ApiError> {
    let (tenant_id, container) = split_tenant(&tenant);
    let target = TargetAction {
        tenant_id,
        container,
        action: Action::Delete {
            filter_name: String::new(),
        },
        object_type: None,
        object_size: None,
        execution_server: None,
    };
    revert_target_action(state.store.as_ref(), &target, policy_id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_dynamic(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .policy
        .delete_dynamic_policy(id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(StatusCode::NO_CONTENT)
}
