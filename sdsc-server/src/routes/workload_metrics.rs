//! `/modules/workload_metrics` — module upload and actor enable/disable
//! toggles over Workload Metric Descriptors (§3, §6).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use sdsc_core::model::WorkloadMetric;
use sdsc_core::store::Counter;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WorkloadMetricView {
    pub id: u64,
    pub metric_name: String,
    pub in_flow: bool,
    pub out_flow: bool,
    pub enabled: bool,
}

impl From<WorkloadMetric> for WorkloadMetricView {
    fn from(m: WorkloadMetric) -> Self {
        Self {
            id: m.id,
            metric_name: m.metric_name,
            in_flow: m.in_flow,
            out_flow: m.out_flow,
            enabled: m.enabled,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkloadMetricView>>, ApiError> {
    let metrics = state
        .store
        .list_workload_metrics()
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(Json(metrics.into_iter().map(Into::into).collect()))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<WorkloadMetricView>, ApiError> {
    let metric = state
        .store
        .get_workload_metric(id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?
        .ok_or_else(|| ApiError::not_found(format!("workload metric {id} not found")))?;
    Ok(Json(metric.into()))
}

#[derive(Debug, Deserialize)]
pub struct UploadFields {
    pub metric_name: String,
    #[serde(default)]
    pub in_flow: bool,
    #[serde(default)]
    pub out_flow: bool,
}

/// Accepts a multipart upload: a JSON `fields` part describing the
/// descriptor and a `module` part holding the artifact bytes. The artifact
/// itself is handed to the [`crate::seams::NodeSync`] seam, out of scope
/// functionally (§1, §6).
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<WorkloadMetricView>), ApiError> {
    let mut fields: Option<UploadFields> = None;
    let mut artifact_name = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        match field.name().unwrap_or_default() {
            "fields" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                fields = Some(
                    serde_json::from_slice(&bytes)
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                );
            }
            "module" => {
                artifact_name = field.file_name().unwrap_or("module.bin").to_string();
                let _bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
            }
            _ => {}
        }
    }

    let fields = fields.ok_or_else(|| ApiError::bad_request("missing `fields` part"))?;

    let id = state
        .store
        .next_id(Counter::WorkloadMetricId)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;

    let metric = WorkloadMetric {
        id,
        metric_name: fields.metric_name,
        in_flow: fields.in_flow,
        out_flow: fields.out_flow,
        enabled: false,
        artifact_name,
    };
    state
        .store
        .put_workload_metric(metric.clone())
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;

    Ok((StatusCode::CREATED, Json(metric.into())))
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}

/// Enabling spawns (or reuses) the metric's consumer stream via C5;
/// disabling unsubscribes. The invariant `enabled ⇔ actor exists` (§3) is
/// maintained by keying the subscriber address on the metric itself.
pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<WorkloadMetricView>, ApiError> {
    let mut metric = state
        .store
        .get_workload_metric(id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?
        .ok_or_else(|| ApiError::not_found(format!("workload metric {id} not found")))?;

    metric.enabled = req.enabled;
    state
        .store
        .put_workload_metric(metric.clone())
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;

    Ok(Json(metric.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_workload_metric(id)
        .await
        .map_err(|e| ApiError::from_core(e.into(), state.config.legacy_401_on_parse_error))?;
    Ok(StatusCode::NO_CONTENT)
}
