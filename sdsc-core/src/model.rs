//! Data model (§3): the entities owned by the State Store.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc}; // §3.2 MANDATORY
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use sdsc_rt::util::ActorAddress;

/// Where a filter executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionSite {
    Proxy,
    Storage,
}

/// Filter descriptor: a registered, executable unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub id: u64,
    pub filter_name: String,
    pub execution_site: ExecutionSite,
    pub reverse_execution_site: Option<ExecutionSite>,
    pub is_pre_put: bool,
    pub is_post_get: bool,
    pub is_post_put: bool,
    pub is_pre_get: bool,
    pub has_reverse: bool,
    pub artifact_digest: String,
}

/// Dynamic filter alias: human-readable name → filter id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicFilterAlias {
    pub name: String,
    pub filter_id: u64,
}

/// An object-size comparison predicate, e.g. `(">=", 1024)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizePredicate {
    pub operator: String,
    pub value: i64,
}

/// A single policy entry within a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub policy_id: u64,
    pub filter_id: u64,
    pub filter_name: String,
    pub object_type: Option<String>,
    pub object_size: Option<SizePredicate>,
    pub execution_server: ExecutionSite,
    pub execution_server_reverse: Option<ExecutionSite>,
    pub execution_order: u64,
    pub params: HashMap<String, String>,
    pub callable: bool,
}

/// Scope a pipeline entry is keyed by: tenant, optional container, optional
/// object. Object-level scoping is carried on the key as an (unenforced at
/// this layer) convention; the adapter only ever indexes by tenant+container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineKey {
    pub tenant_id: String,
    pub container: Option<String>,
}

impl PipelineKey {
    pub fn new(tenant_id: impl Into<String>, container: Option<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            container,
        }
    }

    /// Render the store key, e.g. `pipeline:AUTH_abc` or `pipeline:AUTH_abc:container`.
    pub fn store_key(&self) -> String {
        match &self.container {
            Some(c) => format!("pipeline:AUTH_{}:{}", self.tenant_id, c),
            None => format!("pipeline:AUTH_{}", self.tenant_id),
        }
    }
}

/// Ordered list of policy entries attached to a (tenant, container?) scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineEntry {
    pub entries: Vec<PolicyEntry>,
}

impl PipelineEntry {
    /// Entries sorted by `execution_order` ascending, ties broken on
    /// insertion order (stable sort preserves the vector's original order).
    pub fn sorted(&self) -> Vec<PolicyEntry> {
        let mut v = self.entries.clone();
        v.sort_by_key(|e| e.execution_order);
        v
    }
}

/// HTTP method a workload metric / controller is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodType {
    Get,
    Put,
    Ssync,
}

impl MethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodType::Get => "get",
            MethodType::Put => "put",
            MethodType::Ssync => "ssync",
        }
    }

    /// `<method>_bw` SLO name derivation (§3).
    pub fn slo_name(&self) -> String {
        format!("{}_bw", self.as_str())
    }
}

/// Workload Metric Descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadMetric {
    pub id: u64,
    pub metric_name: String,
    pub in_flow: bool,
    pub out_flow: bool,
    pub enabled: bool,
    pub artifact_name: String,
}

/// Policy (Dynamic Rule Record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicPolicy {
    pub id: u64,
    pub original_rule: String,
    pub condition_text: String,
    /// Rule text with `WHEN …` and the `TRANSIENT` token stripped (§4.3, §8.8).
    pub static_rule_text: String,
    pub transient: bool,
    pub alive: bool,
    pub actor_address: Option<ActorAddress>,
}

/// Global Controller Descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerDescriptor {
    pub id: u64,
    pub controller_name: String,
    pub class_name: String,
    pub method_type: MethodType,
    pub dsl_filter: String,
    pub enabled: bool,
}

/// Storage Node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageNode {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub role: String,
}

/// Tenant Group: id → ordered sequence of tenant ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantGroup {
    pub id: u64,
    pub tenants: Vec<String>,
}

/// Object Type: name → set of file extensions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    pub extensions: Vec<String>,
}

/// SLO Map entry: per-(slo_name, tenant) reservation, broken down by the
/// policy that requested it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SloEntry {
    pub slo_name: String,
    pub tenant: String,
    /// policy_id → bandwidth (MBps)
    pub reservations: HashMap<u64, f64>,
}

impl SloEntry {
    /// Total bandwidth reserved across all policies for this tenant/slo.
    pub fn total(&self) -> f64 {
        self.reservations.values().sum()
    }
}

/// A single measured transfer: `(disk_id, measured_speed_mbps)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transfer {
    pub measured_mbps: f64,
}

/// Monitoring Snapshot: tenant → disk_id → measured transfer speed.
///
/// The source nests this as tenant → ip → policy → device; the Bandwidth
/// Allocation Core (C7) only ever consumes the flattened `disk_id = ip +
/// "-" + policy + "-" + device` form, so that is the representation kept
/// here (§3, §4.6).
#[derive(Debug, Clone, Default)]
pub struct MonitoringSnapshot {
    pub transfers: HashMap<String, Vec<(String, f64)>>,
}

impl MonitoringSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tenant: impl Into<String>, disk_id: impl Into<String>, mbps: f64) {
        self.transfers
            .entry(tenant.into())
            .or_default()
            .push((disk_id.into(), mbps));
    }
}

/// Compose a `disk_id` from its constituent parts (§4.6).
pub fn disk_id(ip: &str, policy: &str, device: &str) -> String {
    format!("{ip}-{policy}-{device}")
}

/// Timestamped wrapper used when persisting entities that track history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timestamped<T> {
    pub value: T,
    pub updated_at: DateTime<Utc>,
}

impl<T> Timestamped<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_key_store_key_without_container() {
        let key = PipelineKey::new("abc", None);
        assert_eq!(key.store_key(), "pipeline:AUTH_abc");
    }

    #[test]
    fn pipeline_key_store_key_with_container() {
        let key = PipelineKey::new("abc", Some("videos".to_string()));
        assert_eq!(key.store_key(), "pipeline:AUTH_abc:videos");
    }

    #[test]
    fn pipeline_entry_sorted_by_execution_order() {
        let mut entry = PipelineEntry::default();
        entry.entries.push(mk_policy_entry(3, 30));
        entry.entries.push(mk_policy_entry(1, 10));
        entry.entries.push(mk_policy_entry(2, 20));

        let sorted = entry.sorted();
        let orders: Vec<u64> = sorted.iter().map(|e| e.execution_order).collect();
        assert_eq!(orders, vec![10, 20, 30]);
    }

    #[test]
    fn slo_entry_total_sums_reservations() {
        let mut slo = SloEntry {
            slo_name: "get_bw".to_string(),
            tenant: "abc".to_string(),
            reservations: HashMap::new(),
        };
        slo.reservations.insert(1, 10.0);
        slo.reservations.insert(2, 15.5);
        assert_eq!(slo.total(), 25.5);
    }

    #[test]
    fn method_type_slo_name() {
        assert_eq!(MethodType::Get.slo_name(), "get_bw");
        assert_eq!(MethodType::Ssync.slo_name(), "ssync_bw");
    }

    #[test]
    fn disk_id_composes_parts() {
        assert_eq!(disk_id("10.0.0.1", "policy1", "sda"), "10.0.0.1-policy1-sda");
    }

    fn mk_policy_entry(policy_id: u64, execution_order: u64) -> PolicyEntry {
        PolicyEntry {
            policy_id,
            filter_id: 1,
            filter_name: "compression".to_string(),
            object_type: None,
            object_size: None,
            execution_server: ExecutionSite::Proxy,
            execution_server_reverse: None,
            execution_order,
            params: HashMap::new(),
            callable: false,
        }
    }
}
