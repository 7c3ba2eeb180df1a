//! Bandwidth Allocation Core (C7, §4.6).
//!
//! A pure, three-stage allocation algorithm: first-fit-decreasing initial
//! assignment, offload-then-proportional-shave of overloaded disks, and
//! spare-capacity distribution. Grounded verbatim in the original
//! `min_bandwidth_per_tenant.py` sample bandwidth controller. Never panics
//! on a feasible input; negative intermediate values are a contract
//! violation and are checked by assertion (§7, §9).

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::model::MonitoringSnapshot;

/// Capacity constants the allocation core is invoked with (§4.6).
#[derive(Debug, Clone, Copy)]
pub struct Capacity {
    pub disk_cap_mbps: f64,
    pub proxy_cap_mbps: f64,
    pub num_proxies: u32,
}

/// Floating-point tolerance used throughout the invariants (§4.6, §8.6).
pub const EPSILON: f64 = 1e-6;

/// `computed[tenant][disk_id] = assigned_bandwidth`.
pub type Allocation = HashMap<String, HashMap<String, f64>>;

/// Per-disk, per-tenant list of individual transfer shares. Kept as a `Vec`
/// (not a sum) because stage 2/3 redistribute per-transfer, not per-tenant.
type DiskUsage = HashMap<String, HashMap<String, Vec<f64>>>;

/// Run the full three-stage allocation (§4.6).
///
/// `slo` maps tenant → total reserved bandwidth (MBps); a tenant absent from
/// `slo` is treated as best-effort (no reservation, only spare capacity).
pub fn allocate(
    snapshot: &MonitoringSnapshot,
    slo: &HashMap<String, f64>,
    capacity: Capacity,
) -> Allocation {
    let mut computed: Allocation = HashMap::new();
    let mut disk_usage: DiskUsage = HashMap::new();

    stage1_initial_allocation(snapshot, slo, &mut computed, &mut disk_usage);
    stage2_offload_and_shave(capacity, &mut computed, &mut disk_usage);
    stage3_distribute_spare(capacity, &mut computed, &mut disk_usage);

    debug_assert!(
        computed
            .values()
            .flat_map(|m| m.values())
            .all(|&v| v >= -EPSILON),
        "allocation core produced a negative assignment"
    );

    computed
}

fn stage1_initial_allocation(
    snapshot: &MonitoringSnapshot,
    slo: &HashMap<String, f64>,
    computed: &mut Allocation,
    disk_usage: &mut DiskUsage,
) {
    // Ascending number of active transfers (fewer transfers first, §4.6),
    // tenant id as tiebreaker so the pass order is stable across calls on
    // an unchanged snapshot regardless of `HashMap`'s random iteration
    // order (§8 property 7).
    let mut tenants: Vec<&String> = snapshot.transfers.keys().collect();
    tenants.sort_by(|a, b| {
        snapshot.transfers[*a]
            .len()
            .cmp(&snapshot.transfers[*b].len())
            .then_with(|| a.cmp(b))
    });

    for tenant in tenants {
        let transfers = &snapshot.transfers[tenant];
        let tenant_slo = slo.get(tenant).copied();

        for (disk_id, _measured) in transfers {
            computed
                .entry(tenant.clone())
                .or_default()
                .entry(disk_id.clone())
                .or_insert(0.0);
            disk_usage
                .entry(disk_id.clone())
                .or_default()
                .entry(tenant.clone())
                .or_default();

            match tenant_slo {
                None => {
                    disk_usage
                        .get_mut(disk_id)
                        .expect("disk entry just inserted")
                        .get_mut(tenant.as_str())
                        .expect("tenant entry just inserted")
                        .push(0.0);
                }
                Some(total_slo) => {
                    let slot = total_slo / transfers.len() as f64;
                    *computed
                        .get_mut(tenant.as_str())
                        .expect("tenant entry just inserted")
                        .get_mut(disk_id.as_str())
                        .expect("disk entry just inserted") = slot;
                    disk_usage
                        .get_mut(disk_id)
                        .expect("disk entry just inserted")
                        .get_mut(tenant.as_str())
                        .expect("tenant entry just inserted")
                        .push(slot);
                }
            }
        }
    }
}

fn disk_load(disk_usage: &DiskUsage, disk_id: &str) -> f64 {
    disk_usage
        .get(disk_id)
        .map(|per_tenant| per_tenant.values().flatten().sum())
        .unwrap_or(0.0)
}

fn stage2_offload_and_shave(
    capacity: Capacity,
    computed: &mut Allocation,
    disk_usage: &mut DiskUsage,
) {
    let mut overloaded: Vec<String> = disk_usage
        .keys()
        .filter(|d| disk_load(disk_usage, d) > capacity.disk_cap_mbps)
        .cloned()
        .collect();
    overloaded.sort();

    for disk_id in overloaded {
        let mut excess = disk_load(disk_usage, &disk_id) - capacity.disk_cap_mbps;
        if excess <= EPSILON {
            continue;
        }

        // Candidates: SLO tenants on this disk with at least one other disk.
        let mut candidates: Vec<String> = disk_usage[&disk_id]
            .keys()
            .filter(|t| computed.get(t.as_str()).map(|m| m.len()).unwrap_or(0) >= 2)
            .cloned()
            .collect();
        candidates.sort();

        for tenant in &candidates {
            if excess <= EPSILON {
                break;
            }
            let mut alt_disks: Vec<String> = computed[tenant]
                .keys()
                .filter(|d| *d != &disk_id)
                .cloned()
                .collect();
            alt_disks.sort();

            for alt_disk in alt_disks {
                if excess <= EPSILON {
                    break;
                }
                let alt_load = disk_load(disk_usage, &alt_disk);
                if alt_load >= capacity.disk_cap_mbps {
                    continue;
                }

                let tenant_share_on_overloaded: f64 =
                    disk_usage[&disk_id][tenant].iter().sum();
                let transferable = (capacity.disk_cap_mbps - alt_load)
                    .min(tenant_share_on_overloaded)
                    .min(excess);
                if transferable <= EPSILON {
                    continue;
                }

                let alt_conns = disk_usage
                    .entry(alt_disk.clone())
                    .or_default()
                    .entry(tenant.clone())
                    .or_default()
                    .len()
                    .max(1);
                let inc_slot = transferable / alt_conns as f64;
                for v in disk_usage
                    .get_mut(&alt_disk)
                    .expect("alt disk entry just inserted")
                    .get_mut(tenant)
                    .expect("alt tenant entry just inserted")
                {
                    *v += inc_slot;
                }
                *computed
                    .get_mut(tenant)
                    .expect("tenant present in computed")
                    .entry(alt_disk.clone())
                    .or_insert(0.0) += transferable;

                let dec_conns = disk_usage[&disk_id][tenant].len().max(1);
                let dec_slot = transferable / dec_conns as f64;
                for v in disk_usage
                    .get_mut(&disk_id)
                    .expect("overloaded disk present")
                    .get_mut(tenant)
                    .expect("tenant present on overloaded disk")
                {
                    *v -= dec_slot;
                }
                *computed
                    .get_mut(tenant)
                    .expect("tenant present in computed")
                    .get_mut(&disk_id)
                    .expect("tenant assigned on overloaded disk") -= transferable;

                excess -= transferable;
            }
        }

        if excess > EPSILON {
            proportional_shave(&disk_id, excess, &candidates, computed, disk_usage);
        }
    }
}

/// Fixed-point proportional shaving (§4.6): iteratively exclude tenants
/// whose current share is already below the candidate `reduce_slot` until
/// the excluded set stabilizes, bounded by `|candidates|` iterations (§9).
fn proportional_shave(
    disk_id: &str,
    mut excess: f64,
    candidates: &[String],
    computed: &mut Allocation,
    disk_usage: &mut DiskUsage,
) {
    let mut active: Vec<String> = candidates.to_vec();

    for _ in 0..=candidates.len() {
        if excess <= EPSILON || active.is_empty() {
            break;
        }

        let total_conns: usize = active
            .iter()
            .map(|t| disk_usage[disk_id].get(t).map(|v| v.len()).unwrap_or(0))
            .sum();
        if total_conns == 0 {
            break;
        }
        let reduce_slot = excess / total_conns as f64;

        let next_active: Vec<String> = active
            .iter()
            .filter(|t| {
                computed
                    .get(t.as_str())
                    .and_then(|m| m.get(disk_id))
                    .copied()
                    .unwrap_or(0.0)
                    >= reduce_slot
            })
            .cloned()
            .collect();

        if next_active.len() == active.len() {
            for tenant in &active {
                if let Some(values) = disk_usage.get_mut(disk_id).and_then(|m| m.get_mut(tenant)) {
                    for v in values.iter_mut() {
                        *v -= reduce_slot;
                    }
                }
                if let Some(v) = computed.get_mut(tenant).and_then(|m| m.get_mut(disk_id)) {
                    *v -= reduce_slot;
                }
            }
            excess = 0.0;
            break;
        }

        active = next_active;
    }
}

fn stage3_distribute_spare(
    capacity: Capacity,
    computed: &mut Allocation,
    disk_usage: &mut DiskUsage,
) {
    let total_assigned: f64 = disk_usage
        .values()
        .flat_map(|per_tenant| per_tenant.values().flatten())
        .sum();
    let total_conns: usize = disk_usage
        .values()
        .flat_map(|per_tenant| per_tenant.values())
        .map(|v| v.len())
        .sum();

    let free_proxy =
        capacity.num_proxies as f64 * capacity.proxy_cap_mbps - total_assigned;
    let free_proxy_slot = if free_proxy > 0.0 && total_conns > 0 {
        free_proxy / total_conns as f64
    } else {
        0.0
    };

    let mut disk_ids: Vec<String> = disk_usage.keys().cloned().collect();
    disk_ids.sort();
    for disk_id in disk_ids {
        let disk_total: f64 = disk_usage[&disk_id].values().flatten().sum();
        let disk_conns: usize = disk_usage[&disk_id].values().map(|v| v.len()).sum();
        if disk_conns == 0 {
            continue;
        }
        let spare_disk = capacity.disk_cap_mbps - disk_total;
        let spare_slot = (spare_disk / disk_conns as f64).min(free_proxy_slot).max(0.0);
        if spare_slot <= EPSILON {
            continue;
        }

        let mut tenants: Vec<String> = disk_usage[&disk_id].keys().cloned().collect();
        tenants.sort();
        for tenant in tenants {
            if let Some(values) = disk_usage.get_mut(&disk_id).and_then(|m| m.get_mut(&tenant)) {
                values.push(spare_slot);
            }
            *computed
                .entry(tenant)
                .or_default()
                .entry(disk_id.clone())
                .or_insert(0.0) += spare_slot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(disk: f64, proxy: f64, n: u32) -> Capacity {
        Capacity {
            disk_cap_mbps: disk,
            proxy_cap_mbps: proxy,
            num_proxies: n,
        }
    }

    /// S3: feasible allocation splits SLO evenly and fills with spare.
    #[test]
    fn feasible_allocation_meets_slo_and_fills_spare() {
        let mut snapshot = MonitoringSnapshot::new();
        snapshot.record("t1", "d1", 30.0);
        snapshot.record("t1", "d2", 30.0);
        let mut slo = HashMap::new();
        slo.insert("t1".to_string(), 60.0);

        let result = allocate(&snapshot, &slo, cap(115.0, 115.0, 1));

        let t1 = &result["t1"];
        assert!((t1["d1"] - 57.5).abs() < 1.0);
        assert!((t1["d2"] - 57.5).abs() < 1.0);
        assert_eq!(t1.len(), 2);
    }

    /// S4: overloaded disk gets shaved back under capacity via offload/shave.
    #[test]
    fn overloaded_disk_is_brought_under_capacity() {
        let mut snapshot = MonitoringSnapshot::new();
        snapshot.record("t1", "d1", 100.0);
        snapshot.record("t2", "d1", 50.0);
        snapshot.record("t2", "d2", 50.0);
        let mut slo = HashMap::new();
        slo.insert("t1".to_string(), 100.0);
        slo.insert("t2".to_string(), 100.0);

        let result = allocate(&snapshot, &slo, cap(115.0, 230.0, 2));

        let d1_total: f64 = result.values().filter_map(|m| m.get("d1")).sum();
        let d2_total: f64 = result.values().filter_map(|m| m.get("d2")).sum();
        assert!(d1_total <= 115.0 + EPSILON, "d1 total was {d1_total}");
        assert!(d2_total <= 115.0 + EPSILON, "d2 total was {d2_total}");
    }

    #[test]
    fn all_assignments_are_non_negative() {
        let mut snapshot = MonitoringSnapshot::new();
        snapshot.record("t1", "d1", 100.0);
        snapshot.record("t2", "d1", 50.0);
        snapshot.record("t2", "d2", 50.0);
        snapshot.record("t3", "d1", 10.0);
        let mut slo = HashMap::new();
        slo.insert("t1".to_string(), 100.0);
        slo.insert("t2".to_string(), 100.0);

        let result = allocate(&snapshot, &slo, cap(115.0, 115.0, 1));
        for per_disk in result.values() {
            for &v in per_disk.values() {
                assert!(v >= -EPSILON, "negative assignment: {v}");
            }
        }
    }

    #[test]
    fn best_effort_tenant_without_slo_gets_zero_then_spare() {
        let mut snapshot = MonitoringSnapshot::new();
        snapshot.record("best_effort", "d1", 1.0);
        let slo = HashMap::new();

        let result = allocate(&snapshot, &slo, cap(115.0, 115.0, 1));
        assert!(result["best_effort"]["d1"] > 0.0);
    }

    #[test]
    fn idempotent_on_unchanged_snapshot() {
        let mut snapshot = MonitoringSnapshot::new();
        snapshot.record("t1", "d1", 30.0);
        snapshot.record("t1", "d2", 30.0);
        let mut slo = HashMap::new();
        slo.insert("t1".to_string(), 60.0);

        let first = allocate(&snapshot, &slo, cap(115.0, 115.0, 1));
        let second = allocate(&snapshot, &slo, cap(115.0, 115.0, 1));

        for (tenant, disks) in &first {
            for (disk, value) in disks {
                assert!((value - second[tenant][disk]).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn per_disk_and_aggregate_capacity_invariants_hold() {
        let mut snapshot = MonitoringSnapshot::new();
        snapshot.record("t1", "d1", 90.0);
        snapshot.record("t2", "d1", 90.0);
        snapshot.record("t2", "d2", 10.0);
        snapshot.record("t3", "d2", 10.0);
        let mut slo = HashMap::new();
        slo.insert("t1".to_string(), 80.0);
        slo.insert("t2".to_string(), 80.0);

        let capacity = cap(115.0, 230.0, 2);
        let result = allocate(&snapshot, &slo, capacity);

        let mut per_disk_totals: HashMap<String, f64> = HashMap::new();
        let mut grand_total = 0.0;
        for per_disk in result.values() {
            for (disk, &v) in per_disk {
                *per_disk_totals.entry(disk.clone()).or_insert(0.0) += v;
                grand_total += v;
            }
        }
        for (_disk, total) in per_disk_totals {
            assert!(total <= capacity.disk_cap_mbps + EPSILON);
        }
        assert!(
            grand_total
                <= capacity.num_proxies as f64 * capacity.proxy_cap_mbps + EPSILON
        );
    }
}
