//! The single unifying message type every actor in this system exchanges.
//!
//! `sdsc-rt`'s `ActorSystem<M, B>` is generic over one message type per
//! system; rather than running several independently-typed actor systems
//! (one per kind), this crate follows the redesign flag in §9 ("closed
//! registry of actor kinds") and defines one enum covering every message a
//! rule evaluator, metric consumer, or global controller actor can receive.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use sdsc_rt::message::{Message, MessagePriority};
use sdsc_rt::util::ActorAddress;

/// A single measured transfer update delivered to subscribers of a metric
/// stream (C5 §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub metric_name: String,
    pub tenant: String,
    pub disk_id: String,
    pub measured_mbps: f64,
}

/// Every message any actor kind in this system can receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ControllerMessage {
    /// Delivered by a metric consumer actor to every subscribed rule/
    /// controller actor (C5).
    MetricUpdate(MetricSample),

    /// Sent to a rule actor to (re-)evaluate its condition against its most
    /// recently observed metric state (C4 §4.7).
    EvaluateRule,

    /// Periodic tick driving a global controller's polling loop (C6).
    ControllerTick,

    /// Acknowledges that an actor has finished its `pre_start` and is ready
    /// to receive traffic — replaces the source's fixed 0.1s readiness
    /// sleep with an explicit signal (§9).
    Ready,

    /// Registers `addr` as a subscriber of a metric consumer actor's stream
    /// (C5 §4.4).
    Subscribe(ActorAddress),

    /// Removes `addr` from a metric consumer actor's subscriber set; the
    /// manager stops the actor once the last subscriber is gone (C5 §4.4).
    Unsubscribe(ActorAddress),
}

impl Message for ControllerMessage {
    const MESSAGE_TYPE: &'static str = "controller_message";

    fn priority(&self) -> MessagePriority {
        match self {
            ControllerMessage::MetricUpdate(_) => MessagePriority::Normal,
            ControllerMessage::EvaluateRule => MessagePriority::Normal,
            ControllerMessage::ControllerTick => MessagePriority::Low,
            ControllerMessage::Ready => MessagePriority::High,
            ControllerMessage::Subscribe(_) | ControllerMessage::Unsubscribe(_) => {
                MessagePriority::High
            }
        }
    }
}
