//! Backpressure strategies for handling full mailboxes.
//!
//! This module provides backpressure handling strategies for bounded mailboxes,
//! allowing fine-grained control over message delivery behavior when mailboxes
//! reach capacity.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::traits::MailboxError;
use crate::message::{Message, MessageEnvelope, MessagePriority};

/// Backpressure strategies for handling full mailboxes.
///
/// When a bounded mailbox reaches capacity, the backpressure strategy
/// determines how the system handles additional incoming messages.
///
/// # Strategy Selection
///
/// Different strategies are appropriate for different scenarios:
/// - **Block**: Critical messages that must be delivered (may cause sender delays)
/// - **Drop**: Low priority messages where silent failure is acceptable
/// - **Error**: Request/response patterns where sender needs immediate feedback
///
/// # Example
///
/// ```ignore
/// use sdsc_rt::mailbox::{BackpressureStrategy, BoundedMailbox};
/// use sdsc_rt::message::MessagePriority;
///
/// // Select strategy based on message priority
/// let strategy = BackpressureStrategy::for_priority(MessagePriority::Critical);
/// assert_eq!(strategy, BackpressureStrategy::Block);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BackpressureStrategy {
    /// Block sender until space becomes available (async wait).
    ///
    /// Use for critical messages that must be delivered. May cause
    /// sender delays if receiver is slow.
    Block,

    /// Drop the incoming message when mailbox is full.
    ///
    /// Use for low-priority messages or scenarios where silent message
    /// dropping is acceptable (e.g., best-effort delivery, logging, metrics).
    Drop,

    /// Return an error to the sender immediately.
    ///
    /// Use for request/response patterns where the sender needs to know
    /// immediately if delivery failed (e.g., API calls, synchronous operations).
    #[default]
    Error,
}

impl fmt::Display for BackpressureStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => write!(f, "Block"),
            Self::Drop => write!(f, "Drop"),
            Self::Error => write!(f, "Error"),
        }
    }
}

impl BackpressureStrategy {
    /// Apply the backpressure strategy to send a message.
    ///
    /// This method handles the actual message delivery according to the
    /// configured strategy when the mailbox is full.
    ///
    /// # Errors
    ///
    /// Returns `MailboxError::Full` if strategy is Error and mailbox is full.
    /// Returns `MailboxError::Closed` if the receiver is closed.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use sdsc_rt::mailbox::BackpressureStrategy;
    /// use sdsc_rt::message::MessageEnvelope;
    ///
    /// let strategy = BackpressureStrategy::Block;
    /// strategy.apply(&sender, envelope).await?;
    /// ```
    pub async fn apply<M: Message>(
        &self,
        sender: &mpsc::Sender<MessageEnvelope<M>>,
        envelope: MessageEnvelope<M>,
    ) -> Result<(), MailboxError> {
        match self {
            Self::Block => {
                // Wait for space (async blocking)
                sender
                    .send(envelope)
                    .await
                    .map_err(|_| MailboxError::Closed)?;
                Ok(())
            }

            Self::Drop => {
                // Drop incoming message if mailbox is full
                match sender.try_send(envelope) {
                    Ok(()) => Ok(()),
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        // Silently drop the incoming message
                        Ok(())
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => Err(MailboxError::Closed),
                }
            }

            Self::Error => {
                // Return error immediately if full
                sender.try_send(envelope).map_err(|e| match e {
                    mpsc::error::TrySendError::Full(_) => MailboxError::Full {
                        capacity: sender.max_capacity(),
                    },
                    mpsc::error::TrySendError::Closed(_) => MailboxError::Closed,
                })
            }
        }
    }

    /// Select appropriate backpressure strategy based on message priority.
    ///
    /// # Strategy Mapping
    ///
    /// - Critical → Block (must be delivered)
    /// - High → Block (important messages)
    /// - Normal → Error (sender should handle failure)
    /// - Low → Drop (can be safely discarded)
    ///
    /// # Example
    ///
    /// ```
    /// use sdsc_rt::mailbox::BackpressureStrategy;
    /// use sdsc_rt::message::MessagePriority;
    ///
    /// let strategy = BackpressureStrategy::for_priority(MessagePriority::Critical);
    /// assert_eq!(strategy, BackpressureStrategy::Block);
    ///
    /// let strategy = BackpressureStrategy::for_priority(MessagePriority::Low);
    /// assert_eq!(strategy, BackpressureStrategy::Drop);
    /// ```
    pub fn for_priority(priority: MessagePriority) -> Self {
        match priority {
            MessagePriority::Critical => Self::Block,
            MessagePriority::High => Self::Block,
            MessagePriority::Normal => Self::Error,
            MessagePriority::Low => Self::Drop,
        }
    }
}
