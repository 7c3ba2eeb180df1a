//! System-level error types.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use thiserror::Error;

// Layer 3: Internal
use crate::broker::BrokerError;
use crate::util::ActorId;

/// System-level errors for actor runtime operations.
///
/// Follows ยง6.3 M-ERRORS-CANONICAL-STRUCTS pattern with
/// structured error types and helper methods.
#[derive(Error, Debug)]
pub enum SystemError {
    /// Actor with given ID not found in registry
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),

    /// Failed to spawn actor
    #[error("Failed to spawn actor: {0}")]
    SpawnFailed(String),

    /// System is shutting down, cannot accept new operations
    #[error("System shutdown in progress")]
    ShuttingDown,

    /// Actor mailbox is full (bounded mailbox with backpressure)
    #[error("Actor mailbox full: {0}")]
    MailboxFull(ActorId),

    /// Message broker error
    #[error("Broker error: {0}")]
    BrokerError(#[from] BrokerError),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Actor limit exceeded
    #[error("Actor limit exceeded: current {current}, max {max}")]
    ActorLimitExceeded { current: usize, max: usize },

    /// Shutdown timeout exceeded
    #[error("Shutdown timeout exceeded after {0:?}")]
    ShutdownTimeout(Duration),

    /// Spawn was requested at an address that is already occupied
    #[error("Address already in use: {0}")]
    AddressAlreadyExists(crate::util::ActorAddress),

    /// Address not present in the host's registry
    #[error("Address not registered: {0}")]
    AddressNotFound(crate::util::ActorAddress),

    /// Actor did not quiesce within the stop deadline; it was abandoned and
    /// its address was force-freed.
    #[error("Actor {0} did not stop within {1:?}, abandoned")]
    StopTimeout(crate::util::ActorAddress, Duration),
}

impl SystemError {
    /// Check if error is transient (can retry).
    ///
    /// Transient errors are temporary conditions that may resolve
    /// with retry logic (e.g., mailbox full).
    pub fn is_transient(&self) -> bool {
        matches!(self, SystemError::MailboxFull(_))
    }

    /// Check if error is fatal (system must stop).
    ///
    /// Fatal errors indicate the system cannot continue operating
    /// and must shut down.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SystemError::ShuttingDown | SystemError::ShutdownTimeout(_)
        )
    }

    /// Check if error is recoverable.
    ///
    /// Recoverable errors can be handled without stopping the system.
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}
