//! Dynamic-rule evaluator actor (C4 §4.7).
//!
//! One `RuleActor` per dynamic policy, spawned alongside its
//! [`crate::model::DynamicPolicy`] record. It sits downstream of a metric
//! consumer actor and re-applies or reverts its rule's targets as its
//! condition crosses threshold. Transient rules fire once and then go
//! dormant; persistent rules level-trigger, toggling SET/DELETE as the
//! condition holds or stops holding.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use sdsc_rt::actor::{Actor, ActorContext};
use sdsc_rt::broker::MessageBroker;

use crate::dsl::condition::Condition;
use crate::dsl::TargetAction;
use crate::error::PolicyError;
use crate::messages::ControllerMessage;
use crate::policy::apply::{apply_target_action, revert_target_action};
use crate::store::StateStore;

pub struct RuleActor {
    policy_id: u64,
    targets: Vec<TargetAction>,
    condition: Option<Condition>,
    transient: bool,
    currently_applied: bool,
    store: Arc<dyn StateStore>,
}

impl RuleActor {
    pub fn new(
        policy_id: u64,
        targets: Vec<TargetAction>,
        condition: Option<Condition>,
        transient: bool,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            policy_id,
            targets,
            condition,
            transient,
            currently_applied: false,
            store,
        }
    }

    async fn apply_all(&self) -> Result<(), PolicyError> {
        for target in &self.targets {
            apply_target_action(self.store.as_ref(), target, self.policy_id).await?;
        }
        Ok(())
    }

    async fn revert_all(&self) -> Result<(), PolicyError> {
        for target in &self.targets {
            revert_target_action(self.store.as_ref(), target, self.policy_id).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Actor for RuleActor {
    type Message = ControllerMessage;
    type Error = PolicyError;

    async fn handle_message<B: MessageBroker<Self::Message>>(
        &mut self,
        message: Self::Message,
        _context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error> {
        let ControllerMessage::MetricUpdate(sample) = message else {
            return Ok(());
        };

        // Transient rules disarm permanently after firing once (§4.3, §8.8).
        if self.transient && self.currently_applied {
            return Ok(());
        }

        let holds = self
            .condition
            .as_ref()
            .map(|c| c.evaluate(&sample))
            .unwrap_or(false);

        match (holds, self.currently_applied) {
            (true, false) => {
                self.apply_all().await?;
                self.currently_applied = true;
            }
            (false, true) if !self.transient => {
                self.revert_all().await?;
                self.currently_applied = false;
            }
            _ => {}
        }

        Ok(())
    }
}
