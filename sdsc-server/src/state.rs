//! Shared application state: the wiring point for C1-C7 behind the REST
//! surface (§6.1).

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use sdsc_core::config::ControllerConfig;
use sdsc_core::controllers::GlobalControllerSupervisor;
use sdsc_core::dsl::{DslParser, SimpleDslParser};
use sdsc_core::messages::ControllerMessage;
use sdsc_core::metrics::MetricSubscriptionManager;
use sdsc_core::policy::PolicyEngine;
use sdsc_core::store::{InMemoryStateStore, StateStore};
use sdsc_rt::broker::InMemoryMessageBroker;
use sdsc_rt::mailbox::{AtomicMetrics, UnboundedMailboxSender};
use sdsc_rt::system::{ActorSystem, SystemConfig};

/// Mailbox sender bound to the in-memory broker below (§2.1).
type Sender = UnboundedMailboxSender<ControllerMessage, AtomicMetrics>;

/// Concrete broker binding for this deployment (§2.1: `sdsc-rt`'s default
/// in-memory broker; a `lapin`-backed bus is the production seam named in
/// §6 but not instantiated here).
pub type Broker = InMemoryMessageBroker<ControllerMessage, Sender>;

/// Everything a REST handler needs, wired once at startup.
pub struct ControllerCore {
    pub store: Arc<dyn StateStore>,
    pub parser: Arc<dyn DslParser>,
    pub system: ActorSystem<ControllerMessage, Broker>,
    pub policy: PolicyEngine<Broker>,
    pub metrics: Arc<MetricSubscriptionManager<Broker>>,
    pub controllers: GlobalControllerSupervisor<Broker>,
    pub config: ControllerConfig,
}

pub type AppState = Arc<ControllerCore>;

impl ControllerCore {
    /// Wire the whole core together and run `ReloadOnStart()` (§4.4, §6.1).
    pub async fn bootstrap(config: ControllerConfig) -> Result<AppState, sdsc_core::Error> {
        let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());
        let parser: Arc<dyn DslParser> = Arc::new(SimpleDslParser::new());

        let broker = Broker::new();
        let system = ActorSystem::new(SystemConfig::default(), broker.clone());

        let metrics = Arc::new(MetricSubscriptionManager::new(system.clone(), broker.clone()));
        let policy = PolicyEngine::new(
            system.clone(),
            Arc::clone(&store),
            Arc::clone(&parser),
            Arc::clone(&metrics),
        );
        let controllers = GlobalControllerSupervisor::new(
            system.clone(),
            broker.clone(),
            Arc::clone(&store),
            Arc::clone(&metrics),
            config.capacity(),
        );

        policy.reload_on_start().await?;

        Ok(Arc::new(ControllerCore {
            store,
            parser,
            system,
            policy,
            metrics,
            controllers,
            config,
        }))
    }
}
