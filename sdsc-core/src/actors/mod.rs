//! Actor implementations (C3 host, C4/C5/C6 business logic).
//!
//! Every actor here speaks [`crate::messages::ControllerMessage`] and runs
//! on `sdsc_rt::ActorSystem<ControllerMessage, B>` for whichever broker `B`
//! the host wires in (normally `InMemoryMessageBroker`).

pub mod controller;
pub mod metric_consumer;
pub mod rule;

pub use controller::ControllerActor;
pub use metric_consumer::MetricConsumerActor;
pub use rule::RuleActor;
