//! Global controller actor (C6 §4.5, driving C7 §4.6).
//!
//! A controller actor is spawned per enabled [`ControllerDescriptor`] and
//! wired to a metric consumer's stream by the supervisor. On every metric
//! update it folds the sample into a running [`MonitoringSnapshot`], and on
//! every [`ControllerMessage::ControllerTick`] runs the bandwidth
//! allocation core against that snapshot and writes the result back
//! through the SLO map, ready for a proxy-facing component to pick up.
//!
//! [`ControllerDescriptor`]: crate::model::ControllerDescriptor

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use sdsc_rt::actor::{Actor, ActorContext};
use sdsc_rt::broker::MessageBroker;

use crate::allocation::{allocate, Allocation, Capacity};
use crate::error::ControllerError;
use crate::messages::ControllerMessage;
use crate::model::{MethodType, MonitoringSnapshot, SloEntry};
use crate::store::StateStore;

pub struct ControllerActor {
    pub controller_id: u64,
    pub method_type: MethodType,
    capacity: Capacity,
    snapshot: MonitoringSnapshot,
    last_allocation: Allocation,
    store: Arc<dyn StateStore>,
}

impl ControllerActor {
    pub fn new(
        controller_id: u64,
        method_type: MethodType,
        capacity: Capacity,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            controller_id,
            method_type,
            capacity,
            snapshot: MonitoringSnapshot::new(),
            last_allocation: Allocation::new(),
            store,
        }
    }

    pub fn last_allocation(&self) -> &Allocation {
        &self.last_allocation
    }

    async fn load_slo_totals(&self) -> Result<HashMap<String, f64>, ControllerError> {
        let slo_name = self.method_type.slo_name();
        let entries: Vec<SloEntry> = self.store.list_slos(&slo_name).await?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.tenant, entry.total()))
            .collect())
    }
}

#[async_trait]
impl Actor for ControllerActor {
    type Message = ControllerMessage;
    type Error = ControllerError;

    async fn handle_message<B: MessageBroker<Self::Message>>(
        &mut self,
        message: Self::Message,
        _context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error> {
        match message {
            ControllerMessage::MetricUpdate(sample) => {
                self.snapshot
                    .record(sample.tenant, sample.disk_id, sample.measured_mbps);
            }
            ControllerMessage::ControllerTick => {
                let slo = self.load_slo_totals().await?;
                self.last_allocation = allocate(&self.snapshot, &slo, self.capacity);
                self.snapshot = MonitoringSnapshot::new();
            }
            _ => {}
        }
        Ok(())
    }
}
