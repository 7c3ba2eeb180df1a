//! Actor execution context: address, identity, and the injected broker handle.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc}; // §3.2 MANDATORY

// Layer 3: Internal module imports
use crate::broker::MessageBroker;
use crate::message::{Message, MessageEnvelope};
use crate::util::{ActorAddress, ActorId};

/// Per-actor execution context handed to every `handle_message`/`pre_start`/
/// `post_stop` call.
///
/// Generic over the message type `M` and the broker implementation `B`
/// (dependency injection): the actor never sees a concrete broker type, only
/// the `MessageBroker<M>` trait, so it can be driven by an in-memory broker
/// in tests and a distributed one in production without code changes.
pub struct ActorContext<M: Message, B: MessageBroker<M>> {
    address: ActorAddress,
    id: ActorId,
    created_at: DateTime<Utc>,
    broker: B,
    _marker: std::marker::PhantomData<M>,
}

impl<M: Message, B: MessageBroker<M>> ActorContext<M, B> {
    /// Create a new actor context bound to the system's broker instance.
    pub fn new(address: ActorAddress, broker: B) -> Self {
        Self {
            id: *address.id(),
            address,
            created_at: Utc::now(), // §3.2
            broker,
            _marker: std::marker::PhantomData,
        }
    }

    /// Get the actor's address.
    pub fn address(&self) -> &ActorAddress {
        &self.address
    }

    /// Get the actor's ID.
    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// Get the actor's creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Fire-and-forget a message to another actor's mailbox.
    pub async fn send(&self, recipient: ActorAddress, message: M) -> Result<(), B::Error> {
        let envelope = MessageEnvelope::new(message)
            .with_sender(self.address.clone())
            .with_reply_to(recipient);
        self.broker.send(envelope).await
    }
}
