//! Error taxonomy (§7).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// State Store Adapter errors (C1, §4.1). The only two kinds the adapter
/// surfaces: the store is unreachable, or an atomic replace lost a race.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("state store unavailable")]
    StoreUnavailable,

    #[error("atomic replace conflict on key {0}")]
    ConflictError(String),

    #[error("entity not found: {0}")]
    NotFound(String),
}

/// DSL Parser Interface errors (C2, §4.2).
#[derive(Error, Debug)]
pub enum DslError {
    #[error("rule does not match the expected grammar: {0}")]
    ParseError(String),

    #[error("rule references unknown filter or metric: {0}")]
    UnknownReference(String),
}

/// Policy Engine errors (C4, §4.3).
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid rule: {0}")]
    InvalidRule(#[from] DslError),

    #[error("actor host error: {0}")]
    ActorLifecycle(#[from] sdsc_rt::SystemError),

    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("dynamic filter {0} still referenced by a pipeline entry")]
    Conflict(String),

    #[error("policy {0} not found")]
    NotFound(u64),
}

/// Metric Subscription Manager / Global Controller Supervisor errors
/// (C5/C6, §4.4-§4.5).
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("actor host error: {0}")]
    ActorLifecycle(#[from] sdsc_rt::SystemError),

    #[error("controller {0} not found")]
    NotFound(u64),

    #[error("metric stream {0} could not be established")]
    MetricUnavailable(String),
}

/// Top-level aggregate error for the core crate, consumed by `sdsc-server`
/// to map onto the HTTP status table (§7).
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Dsl(#[from] DslError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("file sync error: {0}")]
    FileSync(String),
}

pub type Result<T> = std::result::Result<T, Error>;
