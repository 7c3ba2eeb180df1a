//! Metric Subscription Manager (C5 §4.4).
//!
//! Ensures exactly one metric consumer actor per (`metric_name`, method)
//! stream, shares it across every rule/controller that subscribes, and
//! tears it down once the last subscriber leaves. Never shares a stream
//! across method types, since each method implies a different consumer
//! parser (§4.4).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use sdsc_rt::broker::MessageBroker;
use sdsc_rt::message::MessageEnvelope;
use sdsc_rt::system::ActorSystem;
use sdsc_rt::util::ActorAddress;

use crate::actors::metric_consumer::MetricConsumerActor;
use crate::error::ControllerError;
use crate::messages::ControllerMessage;
use crate::model::MethodType;

struct StreamHandle {
    address: ActorAddress,
    method: MethodType,
    refcount: usize,
}

/// C5: one shared consumer actor per metric stream, ref-counted.
pub struct MetricSubscriptionManager<B>
where
    B: MessageBroker<ControllerMessage> + Clone + Send + Sync + 'static,
{
    system: ActorSystem<ControllerMessage, B>,
    broker: B,
    streams: DashMap<String, StreamHandle>,
}

impl<B> MetricSubscriptionManager<B>
where
    B: MessageBroker<ControllerMessage> + Clone + Send + Sync + 'static,
{
    pub fn new(system: ActorSystem<ControllerMessage, B>, broker: B) -> Self {
        Self {
            system,
            broker,
            streams: DashMap::new(),
        }
    }

    /// Register `subscriber` against the `metric_name`/`method` stream,
    /// spawning the consumer actor on first need.
    pub async fn subscribe(
        &self,
        metric_name: &str,
        method: MethodType,
        subscriber: ActorAddress,
    ) -> Result<ActorAddress, ControllerError> {
        if let Some(existing) = self.streams.get(metric_name) {
            if existing.method != method {
                return Err(ControllerError::MetricUnavailable(format!(
                    "{metric_name} already bound to method {:?}",
                    existing.method
                )));
            }
        }

        let address = if let Some(mut handle) = self.streams.get_mut(metric_name) {
            handle.refcount += 1;
            handle.address.clone()
        } else {
            let actor = MetricConsumerActor::new(metric_name.to_string(), method);
            let address = self
                .system
                .spawn()
                .with_name(format!("metric:{metric_name}"))
                .spawn(actor)
                .await?;
            self.streams.insert(
                metric_name.to_string(),
                StreamHandle {
                    address: address.clone(),
                    method,
                    refcount: 1,
                },
            );
            address
        };

        self.send_control(&address, ControllerMessage::Subscribe(subscriber))
            .await?;
        Ok(address)
    }

    /// Remove `subscriber` from the stream's subscriber set, stopping the
    /// consumer actor once no subscribers remain.
    pub async fn unsubscribe(
        &self,
        metric_name: &str,
        subscriber: ActorAddress,
    ) -> Result<(), ControllerError> {
        let (address, should_stop) = match self.streams.get_mut(metric_name) {
            Some(mut handle) => {
                handle.refcount = handle.refcount.saturating_sub(1);
                (handle.address.clone(), handle.refcount == 0)
            }
            None => return Ok(()),
        };

        self.send_control(&address, ControllerMessage::Unsubscribe(subscriber))
            .await?;

        if should_stop {
            self.streams.remove(metric_name);
            self.system.stop(&address).await?;
        }

        Ok(())
    }

    /// Current subscriber reference count for a stream, if it exists.
    pub fn refcount(&self, metric_name: &str) -> Option<usize> {
        self.streams.get(metric_name).map(|h| h.refcount)
    }

    async fn send_control(
        &self,
        address: &ActorAddress,
        message: ControllerMessage,
    ) -> Result<(), ControllerError> {
        let envelope = MessageEnvelope::new(message).with_reply_to(address.clone());
        self.broker
            .send(envelope)
            .await
            .map_err(|e| ControllerError::MetricUnavailable(e.to_string()))
    }
}
