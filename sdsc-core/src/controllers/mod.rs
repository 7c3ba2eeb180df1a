//! Global Controller Supervisor (C6 §4.5).
//!
//! Lifecycle for periodic controllers: enable spawns a [`ControllerActor`]
//! and wires it to its metric stream via C5; disable tears both down;
//! delete additionally removes the store record and resets the id counter
//! once no descriptors remain (§4.5).

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use sdsc_rt::broker::MessageBroker;
use sdsc_rt::message::MessageEnvelope;
use sdsc_rt::system::ActorSystem;
use sdsc_rt::util::ActorAddress;

use crate::actors::controller::ControllerActor;
use crate::allocation::Capacity;
use crate::error::ControllerError;
use crate::messages::ControllerMessage;
use crate::metrics::MetricSubscriptionManager;
use crate::store::{Counter, StateStore};

/// A `dsl_filter` other than `bandwidth` has no real metric stream in this
/// system; it is wired to the placeholder `dummy` stream, consistent with
/// the original controller-to-metric mapping (§4.5, §9).
const DUMMY_METRIC_NAME: &str = "dummy";

fn metric_name_for(dsl_filter: &str, method: &str) -> String {
    if dsl_filter == "bandwidth" {
        format!("{method}_bw_info")
    } else {
        DUMMY_METRIC_NAME.to_string()
    }
}

pub struct GlobalControllerSupervisor<B>
where
    B: MessageBroker<ControllerMessage> + Clone + Send + Sync + 'static,
{
    system: ActorSystem<ControllerMessage, B>,
    broker: B,
    store: Arc<dyn StateStore>,
    metrics: Arc<MetricSubscriptionManager<B>>,
    capacity: Capacity,
    actors: DashMap<u64, ActorAddress>,
}

impl<B> GlobalControllerSupervisor<B>
where
    B: MessageBroker<ControllerMessage> + Clone + Send + Sync + 'static,
{
    pub fn new(
        system: ActorSystem<ControllerMessage, B>,
        broker: B,
        store: Arc<dyn StateStore>,
        metrics: Arc<MetricSubscriptionManager<B>>,
        capacity: Capacity,
    ) -> Self {
        Self {
            system,
            broker,
            store,
            metrics,
            capacity,
            actors: DashMap::new(),
        }
    }

    pub async fn enable(&self, controller_id: u64) -> Result<(), ControllerError> {
        if self.actors.contains_key(&controller_id) {
            return Ok(());
        }

        let mut descriptor = self
            .store
            .get_controller(controller_id)
            .await?
            .ok_or(ControllerError::NotFound(controller_id))?;

        let actor = ControllerActor::new(
            controller_id,
            descriptor.method_type,
            self.capacity,
            Arc::clone(&self.store),
        );
        let address = self
            .system
            .spawn()
            .with_name(format!("controller:{controller_id}"))
            .spawn(actor)
            .await?;

        let metric_name = metric_name_for(&descriptor.dsl_filter, descriptor.method_type.as_str());
        self.metrics
            .subscribe(&metric_name, descriptor.method_type, address.clone())
            .await?;

        self.actors.insert(controller_id, address);
        descriptor.enabled = true;
        self.store.put_controller(descriptor).await?;
        Ok(())
    }

    pub async fn disable(&self, controller_id: u64) -> Result<(), ControllerError> {
        let Some((_, address)) = self.actors.remove(&controller_id) else {
            return Ok(());
        };

        let mut descriptor = self
            .store
            .get_controller(controller_id)
            .await?
            .ok_or(ControllerError::NotFound(controller_id))?;

        let metric_name = metric_name_for(&descriptor.dsl_filter, descriptor.method_type.as_str());
        self.metrics.unsubscribe(&metric_name, address.clone()).await?;
        self.system.stop(&address).await?;

        descriptor.enabled = false;
        self.store.put_controller(descriptor).await?;
        Ok(())
    }

    pub async fn delete(&self, controller_id: u64) -> Result<(), ControllerError> {
        self.disable(controller_id).await?;
        self.store.delete_controller(controller_id).await?;
        if self.store.list_controllers().await?.is_empty() {
            self.store.reset_counter(Counter::ControllerId).await?;
        }
        Ok(())
    }

    /// Drive one polling tick for `controller_id`, invoking the bandwidth
    /// allocation core against everything accumulated since the last tick.
    pub async fn tick(&self, controller_id: u64) -> Result<(), ControllerError> {
        let Some(address) = self.actors.get(&controller_id).map(|a| a.clone()) else {
            return Err(ControllerError::NotFound(controller_id));
        };
        let envelope = MessageEnvelope::new(ControllerMessage::ControllerTick)
            .with_reply_to(address);
        self.broker
            .send(envelope)
            .await
            .map_err(|e| ControllerError::MetricUnavailable(e.to_string()))
    }

    pub fn is_enabled(&self, controller_id: u64) -> bool {
        self.actors.contains_key(&controller_id)
    }
}
