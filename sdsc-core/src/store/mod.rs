//! State Store Adapter (C1, §4.1): a typed view over a key-value store.

pub mod in_memory;

pub use in_memory::InMemoryStateStore;

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::error::StoreError;
use crate::model::{
    ControllerDescriptor, DynamicFilterAlias, DynamicPolicy, Filter, ObjectType, PipelineEntry,
    PipelineKey, SloEntry, StorageNode, TenantGroup, WorkloadMetric,
};

/// Atomic counters named in §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    PolicyId,
    WorkloadMetricId,
    ControllerId,
    StorageNodeId,
    TenantGroupId,
    FilterId,
}

impl Counter {
    pub fn key(&self) -> &'static str {
        match self {
            Counter::PolicyId => "policies:id",
            Counter::WorkloadMetricId => "workload_metrics:id",
            Counter::ControllerId => "controllers:id",
            Counter::StorageNodeId => "storage_nodes:id",
            Counter::TenantGroupId => "gtenant:id",
            Counter::FilterId => "filters:id",
        }
    }
}

/// Typed, async State Store Adapter (C1).
///
/// Contract: all mutations that replace a multi-element value MUST be
/// atomic relative to concurrent readers (§4.1, §8.3). Implementations
/// surface only `StoreError::StoreUnavailable` and `StoreError::ConflictError`
/// (plus `NotFound` for get/delete misses, used internally by callers that
/// need to distinguish "absent" from "unavailable").
#[async_trait]
pub trait StateStore: Send + Sync {
    // --- Filters & dynamic filter aliases ---
    async fn put_filter(&self, filter: Filter) -> Result<(), StoreError>;
    async fn get_filter(&self, id: u64) -> Result<Option<Filter>, StoreError>;
    async fn delete_filter(&self, id: u64) -> Result<(), StoreError>;
    async fn list_filters(&self) -> Result<Vec<Filter>, StoreError>;

    async fn put_dynamic_filter(&self, alias: DynamicFilterAlias) -> Result<(), StoreError>;
    async fn get_dynamic_filter(&self, name: &str) -> Result<Option<DynamicFilterAlias>, StoreError>;
    async fn delete_dynamic_filter(&self, name: &str) -> Result<(), StoreError>;
    async fn list_dynamic_filters(&self) -> Result<Vec<DynamicFilterAlias>, StoreError>;

    // --- Pipeline entries ---
    async fn get_pipeline(&self, key: &PipelineKey) -> Result<PipelineEntry, StoreError>;
    async fn put_pipeline(&self, key: &PipelineKey, entry: PipelineEntry) -> Result<(), StoreError>;
    async fn list_pipelines(&self) -> Result<HashMap<PipelineKey, PipelineEntry>, StoreError>;
    /// True if any pipeline entry references `filter_id` (referential
    /// integrity check behind dynamic-filter deletion, §8.4).
    async fn filter_is_referenced(&self, filter_id: u64) -> Result<bool, StoreError>;

    // --- Workload metrics ---
    async fn put_workload_metric(&self, metric: WorkloadMetric) -> Result<(), StoreError>;
    async fn get_workload_metric(&self, id: u64) -> Result<Option<WorkloadMetric>, StoreError>;
    async fn delete_workload_metric(&self, id: u64) -> Result<(), StoreError>;
    async fn list_workload_metrics(&self) -> Result<Vec<WorkloadMetric>, StoreError>;

    // --- Policies (dynamic rule records) ---
    async fn put_policy(&self, policy: DynamicPolicy) -> Result<(), StoreError>;
    async fn get_policy(&self, id: u64) -> Result<Option<DynamicPolicy>, StoreError>;
    async fn delete_policy(&self, id: u64) -> Result<(), StoreError>;
    async fn list_policies(&self) -> Result<Vec<DynamicPolicy>, StoreError>;

    // --- Controllers ---
    async fn put_controller(&self, controller: ControllerDescriptor) -> Result<(), StoreError>;
    async fn get_controller(&self, id: u64) -> Result<Option<ControllerDescriptor>, StoreError>;
    async fn delete_controller(&self, id: u64) -> Result<(), StoreError>;
    async fn list_controllers(&self) -> Result<Vec<ControllerDescriptor>, StoreError>;

    // --- Storage nodes ---
    async fn put_storage_node(&self, node: StorageNode) -> Result<(), StoreError>;
    async fn get_storage_node(&self, id: u64) -> Result<Option<StorageNode>, StoreError>;
    async fn delete_storage_node(&self, id: u64) -> Result<(), StoreError>;
    async fn list_storage_nodes(&self) -> Result<Vec<StorageNode>, StoreError>;

    // --- Tenant groups (atomic replace) ---
    async fn get_tenant_group(&self, id: u64) -> Result<Option<TenantGroup>, StoreError>;
    /// Atomic replace: delete-then-append under a single transaction (§4.1).
    async fn replace_tenant_group(&self, group: TenantGroup) -> Result<(), StoreError>;
    async fn delete_tenant_group(&self, id: u64) -> Result<(), StoreError>;
    async fn list_tenant_groups(&self) -> Result<Vec<TenantGroup>, StoreError>;

    // --- Object types (atomic replace) ---
    async fn get_object_type(&self, name: &str) -> Result<Option<ObjectType>, StoreError>;
    async fn replace_object_type(&self, object_type: ObjectType) -> Result<(), StoreError>;
    async fn delete_object_type(&self, name: &str) -> Result<(), StoreError>;
    async fn list_object_types(&self) -> Result<Vec<ObjectType>, StoreError>;

    // --- SLO map ---
    async fn put_slo(&self, entry: SloEntry) -> Result<(), StoreError>;
    async fn get_slo(&self, slo_name: &str, tenant: &str) -> Result<Option<SloEntry>, StoreError>;
    async fn list_slos(&self, slo_name: &str) -> Result<Vec<SloEntry>, StoreError>;

    // --- Atomic counters ---
    /// Advance and return the new value of `counter`.
    async fn next_id(&self, counter: Counter) -> Result<u64, StoreError>;
    /// Reset a counter to zero (used when the last record of a kind is
    /// deleted, §4.3, §4.5).
    async fn reset_counter(&self, counter: Counter) -> Result<(), StoreError>;
}
