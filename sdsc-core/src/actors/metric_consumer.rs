//! Metric consumer actor (C5 §4.4).
//!
//! One instance per distinct metric stream (`metric_name` + [`MethodType`]).
//! The Metric Subscription Manager spawns it the first time a rule or
//! controller subscribes to a stream, ref-counts subscribers via
//! [`ControllerMessage::Subscribe`]/[`ControllerMessage::Unsubscribe`], and
//! stops it once the last subscriber leaves. Every [`MetricUpdate`] it
//! receives (fed by whatever ingests raw transfer samples) is fanned out
//! unchanged to every subscriber.
//!
//! [`MetricUpdate`]: crate::messages::ControllerMessage::MetricUpdate

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use sdsc_rt::actor::{Actor, ActorContext};
use sdsc_rt::broker::MessageBroker;
use sdsc_rt::util::ActorAddress;

use crate::error::ControllerError;
use crate::messages::ControllerMessage;
use crate::model::MethodType;

/// `bandwidth+ssync → BwInfoSSYNC`, else `BwInfo` (§4.4 registry rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerKind {
    BwInfo,
    BwInfoSsync,
}

impl ConsumerKind {
    pub fn select(metric_name: &str, method: MethodType) -> Self {
        if metric_name == "bandwidth" && method == MethodType::Ssync {
            ConsumerKind::BwInfoSsync
        } else {
            ConsumerKind::BwInfo
        }
    }
}

pub struct MetricConsumerActor {
    pub metric_name: String,
    pub method: MethodType,
    pub kind: ConsumerKind,
    subscribers: Vec<ActorAddress>,
}

impl MetricConsumerActor {
    pub fn new(metric_name: impl Into<String>, method: MethodType) -> Self {
        let metric_name = metric_name.into();
        let kind = ConsumerKind::select(&metric_name, method);
        Self {
            metric_name,
            method,
            kind,
            subscribers: Vec::new(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[async_trait]
impl Actor for MetricConsumerActor {
    type Message = ControllerMessage;
    type Error = ControllerError;

    async fn handle_message<B: MessageBroker<Self::Message>>(
        &mut self,
        message: Self::Message,
        context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error> {
        match message {
            ControllerMessage::Subscribe(addr) => {
                if !self.subscribers.contains(&addr) {
                    self.subscribers.push(addr);
                }
            }
            ControllerMessage::Unsubscribe(addr) => {
                self.subscribers.retain(|a| a != &addr);
            }
            ControllerMessage::MetricUpdate(sample) => {
                for subscriber in &self.subscribers {
                    let _ = context
                        .send(
                            subscriber.clone(),
                            ControllerMessage::MetricUpdate(sample.clone()),
                        )
                        .await;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
