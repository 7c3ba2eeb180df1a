//! In-process `StateStore` implementation.
//!
//! Backed by `dashmap` for concurrent map mutation (mirroring `sdsc-rt`'s
//! actor registry) and `parking_lot::RwLock` for the sequence types that
//! require atomic delete-then-append replacement.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

// Layer 3: Internal module imports
use super::{Counter, StateStore};
use crate::error::StoreError;
use crate::model::{
    ControllerDescriptor, DynamicFilterAlias, DynamicPolicy, Filter, ObjectType, PipelineEntry,
    PipelineKey, SloEntry, StorageNode, TenantGroup, WorkloadMetric,
};

/// Default, in-memory `StateStore`. Never unavailable by construction; kept
/// as a realistic substrate for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryStateStore {
    filters: DashMap<u64, Filter>,
    dynamic_filters: DashMap<String, DynamicFilterAlias>,
    pipelines: DashMap<PipelineKey, RwLock<PipelineEntry>>,
    workload_metrics: DashMap<u64, WorkloadMetric>,
    policies: DashMap<u64, DynamicPolicy>,
    controllers: DashMap<u64, ControllerDescriptor>,
    storage_nodes: DashMap<u64, StorageNode>,
    tenant_groups: DashMap<u64, TenantGroup>,
    object_types: DashMap<String, ObjectType>,
    slos: DashMap<(String, String), SloEntry>,
    counters: DashMap<&'static str, AtomicU64>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn put_filter(&self, filter: Filter) -> Result<(), StoreError> {
        self.filters.insert(filter.id, filter);
        Ok(())
    }

    async fn get_filter(&self, id: u64) -> Result<Option<Filter>, StoreError> {
        Ok(self.filters.get(&id).map(|r| r.clone()))
    }

    async fn delete_filter(&self, id: u64) -> Result<(), StoreError> {
        self.filters.remove(&id);
        Ok(())
    }

    async fn list_filters(&self) -> Result<Vec<Filter>, StoreError> {
        Ok(self.filters.iter().map(|r| r.value().clone()).collect())
    }

    async fn put_dynamic_filter(&self, alias: DynamicFilterAlias) -> Result<(), StoreError> {
        self.dynamic_filters.insert(alias.name.clone(), alias);
        Ok(())
    }

    async fn get_dynamic_filter(
        &self,
        name: &str,
    ) -> Result<Option<DynamicFilterAlias>, StoreError> {
        Ok(self.dynamic_filters.get(name).map(|r| r.clone()))
    }

    async fn delete_dynamic_filter(&self, name: &str) -> Result<(), StoreError> {
        self.dynamic_filters.remove(name);
        Ok(())
    }

    async fn list_dynamic_filters(&self) -> Result<Vec<DynamicFilterAlias>, StoreError> {
        Ok(self
            .dynamic_filters
            .iter()
            .map(|r| r.value().clone())
            .collect())
    }

    async fn get_pipeline(&self, key: &PipelineKey) -> Result<PipelineEntry, StoreError> {
        Ok(self
            .pipelines
            .get(key)
            .map(|r| r.read().clone())
            .unwrap_or_default())
    }

    async fn put_pipeline(
        &self,
        key: &PipelineKey,
        entry: PipelineEntry,
    ) -> Result<(), StoreError> {
        // Atomic replace: the whole entry is swapped under one write lock so
        // no reader observes a half-replaced sequence (§5, §8.3).
        self.pipelines
            .entry(key.clone())
            .or_insert_with(|| RwLock::new(PipelineEntry::default()));
        if let Some(slot) = self.pipelines.get(key) {
            *slot.write() = entry;
        }
        Ok(())
    }

    async fn list_pipelines(&self) -> Result<HashMap<PipelineKey, PipelineEntry>, StoreError> {
        Ok(self
            .pipelines
            .iter()
            .map(|r| (r.key().clone(), r.value().read().clone()))
            .collect())
    }

    async fn filter_is_referenced(&self, filter_id: u64) -> Result<bool, StoreError> {
        for entry in self.pipelines.iter() {
            if entry
                .value()
                .read()
                .entries
                .iter()
                .any(|e| e.filter_id == filter_id)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn put_workload_metric(&self, metric: WorkloadMetric) -> Result<(), StoreError> {
        self.workload_metrics.insert(metric.id, metric);
        Ok(())
    }

    async fn get_workload_metric(&self, id: u64) -> Result<Option<WorkloadMetric>, StoreError> {
        Ok(self.workload_metrics.get(&id).map(|r| r.clone()))
    }

    async fn delete_workload_metric(&self, id: u64) -> Result<(), StoreError> {
        self.workload_metrics.remove(&id);
        Ok(())
    }

    async fn list_workload_metrics(&self) -> Result<Vec<WorkloadMetric>, StoreError> {
        Ok(self
            .workload_metrics
            .iter()
            .map(|r| r.value().clone())
            .collect())
    }

    async fn put_policy(&self, policy: DynamicPolicy) -> Result<(), StoreError> {
        self.policies.insert(policy.id, policy);
        Ok(())
    }

    async fn get_policy(&self, id: u64) -> Result<Option<DynamicPolicy>, StoreError> {
        Ok(self.policies.get(&id).map(|r| r.clone()))
    }

    async fn delete_policy(&self, id: u64) -> Result<(), StoreError> {
        self.policies.remove(&id);
        Ok(())
    }

    async fn list_policies(&self) -> Result<Vec<DynamicPolicy>, StoreError> {
        Ok(self.policies.iter().map(|r| r.value().clone()).collect())
    }

    async fn put_controller(&self, controller: ControllerDescriptor) -> Result<(), StoreError> {
        self.controllers.insert(controller.id, controller);
        Ok(())
    }

    async fn get_controller(&self, id: u64) -> Result<Option<ControllerDescriptor>, StoreError> {
        Ok(self.controllers.get(&id).map(|r| r.clone()))
    }

    async fn delete_controller(&self, id: u64) -> Result<(), StoreError> {
        self.controllers.remove(&id);
        Ok(())
    }

    async fn list_controllers(&self) -> Result<Vec<ControllerDescriptor>, StoreError> {
        Ok(self.controllers.iter().map(|r| r.value().clone()).collect())
    }

    async fn put_storage_node(&self, node: StorageNode) -> Result<(), StoreError> {
        self.storage_nodes.insert(node.id, node);
        Ok(())
    }

    async fn get_storage_node(&self, id: u64) -> Result<Option<StorageNode>, StoreError> {
        Ok(self.storage_nodes.get(&id).map(|r| r.clone()))
    }

    async fn delete_storage_node(&self, id: u64) -> Result<(), StoreError> {
        self.storage_nodes.remove(&id);
        Ok(())
    }

    async fn list_storage_nodes(&self) -> Result<Vec<StorageNode>, StoreError> {
        Ok(self
            .storage_nodes
            .iter()
            .map(|r| r.value().clone())
            .collect())
    }

    async fn get_tenant_group(&self, id: u64) -> Result<Option<TenantGroup>, StoreError> {
        Ok(self.tenant_groups.get(&id).map(|r| r.clone()))
    }

    async fn replace_tenant_group(&self, group: TenantGroup) -> Result<(), StoreError> {
        self.tenant_groups.insert(group.id, group);
        Ok(())
    }

    async fn delete_tenant_group(&self, id: u64) -> Result<(), StoreError> {
        self.tenant_groups.remove(&id);
        Ok(())
    }

    async fn list_tenant_groups(&self) -> Result<Vec<TenantGroup>, StoreError> {
        Ok(self
            .tenant_groups
            .iter()
            .map(|r| r.value().clone())
            .collect())
    }

    async fn get_object_type(&self, name: &str) -> Result<Option<ObjectType>, StoreError> {
        Ok(self.object_types.get(name).map(|r| r.clone()))
    }

    async fn replace_object_type(&self, object_type: ObjectType) -> Result<(), StoreError> {
        self.object_types
            .insert(object_type.name.clone(), object_type);
        Ok(())
    }

    async fn delete_object_type(&self, name: &str) -> Result<(), StoreError> {
        self.object_types.remove(name);
        Ok(())
    }

    async fn list_object_types(&self) -> Result<Vec<ObjectType>, StoreError> {
        Ok(self
            .object_types
            .iter()
            .map(|r| r.value().clone())
            .collect())
    }

    async fn put_slo(&self, entry: SloEntry) -> Result<(), StoreError> {
        self.slos
            .insert((entry.slo_name.clone(), entry.tenant.clone()), entry);
        Ok(())
    }

    async fn get_slo(&self, slo_name: &str, tenant: &str) -> Result<Option<SloEntry>, StoreError> {
        Ok(self
            .slos
            .get(&(slo_name.to_string(), tenant.to_string()))
            .map(|r| r.clone()))
    }

    async fn list_slos(&self, slo_name: &str) -> Result<Vec<SloEntry>, StoreError> {
        Ok(self
            .slos
            .iter()
            .filter(|r| r.key().0 == slo_name)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn next_id(&self, counter: Counter) -> Result<u64, StoreError> {
        let entry = self
            .counters
            .entry(counter.key())
            .or_insert_with(|| AtomicU64::new(0));
        Ok(entry.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn reset_counter(&self, counter: Counter) -> Result<(), StoreError> {
        self.counters
            .entry(counter.key())
            .or_insert_with(|| AtomicU64::new(0))
            .store(0, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExecutionSite;

    #[tokio::test]
    async fn next_id_is_monotonic_and_unique() {
        let store = InMemoryStateStore::new();
        let a = store.next_id(Counter::PolicyId).await.unwrap();
        let b = store.next_id(Counter::PolicyId).await.unwrap();
        let c = store.next_id(Counter::PolicyId).await.unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
    }

    #[tokio::test]
    async fn reset_counter_returns_to_zero() {
        let store = InMemoryStateStore::new();
        store.next_id(Counter::ControllerId).await.unwrap();
        store.next_id(Counter::ControllerId).await.unwrap();
        store.reset_counter(Counter::ControllerId).await.unwrap();
        let next = store.next_id(Counter::ControllerId).await.unwrap();
        assert_eq!(next, 1);
    }

    #[tokio::test]
    async fn pipeline_put_then_get_round_trips() {
        let store = InMemoryStateStore::new();
        let key = PipelineKey::new("abc", None);
        let entry = PipelineEntry {
            entries: vec![crate::model::PolicyEntry {
                policy_id: 1,
                filter_id: 1,
                filter_name: "compression".to_string(),
                object_type: None,
                object_size: None,
                execution_server: ExecutionSite::Proxy,
                execution_server_reverse: None,
                execution_order: 1,
                params: HashMap::new(),
                callable: false,
            }],
        };
        store.put_pipeline(&key, entry).await.unwrap();

        let fetched = store.get_pipeline(&key).await.unwrap();
        assert_eq!(fetched.entries.len(), 1);
        assert_eq!(fetched.entries[0].filter_name, "compression");
    }

    #[tokio::test]
    async fn filter_is_referenced_detects_pipeline_usage() {
        let store = InMemoryStateStore::new();
        let key = PipelineKey::new("abc", None);
        assert!(!store.filter_is_referenced(1).await.unwrap());

        let entry = PipelineEntry {
            entries: vec![crate::model::PolicyEntry {
                policy_id: 1,
                filter_id: 1,
                filter_name: "compression".to_string(),
                object_type: None,
                object_size: None,
                execution_server: ExecutionSite::Proxy,
                execution_server_reverse: None,
                execution_order: 1,
                params: HashMap::new(),
                callable: false,
            }],
        };
        store.put_pipeline(&key, entry).await.unwrap();
        assert!(store.filter_is_referenced(1).await.unwrap());
        assert!(!store.filter_is_referenced(2).await.unwrap());
    }

    #[tokio::test]
    async fn tenant_group_replace_is_atomic_swap() {
        let store = InMemoryStateStore::new();
        store
            .replace_tenant_group(TenantGroup {
                id: 1,
                tenants: vec!["a".to_string(), "b".to_string()],
            })
            .await
            .unwrap();
        store
            .replace_tenant_group(TenantGroup {
                id: 1,
                tenants: vec!["c".to_string()],
            })
            .await
            .unwrap();

        let group = store.get_tenant_group(1).await.unwrap().unwrap();
        assert_eq!(group.tenants, vec!["c".to_string()]);
    }
}
