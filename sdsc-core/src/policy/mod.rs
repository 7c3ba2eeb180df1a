//! Policy Engine (C4 §4.3): classifies DSL rules, deploys static ones into
//! the pipeline store, instantiates dynamic rule actors, and tracks both.

pub mod apply;

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use sdsc_rt::broker::MessageBroker;
use sdsc_rt::system::ActorSystem;
use sdsc_rt::util::ActorAddress;

use crate::actors::rule::RuleActor;
use crate::dsl::condition::Condition;
use crate::dsl::{DslParser, ParsedRule};
use crate::error::PolicyError;
use crate::messages::ControllerMessage;
use crate::metrics::MetricSubscriptionManager;
use crate::model::{DynamicPolicy, MethodType};
use crate::store::{Counter, StateStore};

/// Rule conditions name a metric but never a method; every dynamic rule
/// subscribes as a `Get` consumer (§4.4's method-exclusivity check is the
/// only place this choice is observable, and `bandwidth` rules never pass
/// through `ConsumerKind::select`'s `Ssync` branch here).
const RULE_METHOD: MethodType = MethodType::Get;

/// Strip `condition_text` (if non-empty) and the literal `TRANSIENT` token
/// out of `original_text`, collapsing whitespace (§4.3, §8.8). Derived
/// directly from the parsed rule's own fields so it works for any
/// [`DslParser`] grammar, not just the reference one.
fn derive_static_text(original_text: &str, condition_text: &str) -> String {
    let without_condition = if condition_text.is_empty() {
        original_text.to_string()
    } else {
        original_text.replace(condition_text, "")
    };
    let without_transient = without_condition.replace("TRANSIENT", "");
    without_transient.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Outcome of a [`PolicyEngine::submit_rules`] call: each input line is
/// processed independently, so a parse failure on one line never blocks
/// the rest of the submission (§4.3).
#[derive(Debug, Default)]
pub struct SubmitOutcome {
    pub policy_ids: Vec<u64>,
    pub errors: Vec<(String, PolicyError)>,
}

pub struct PolicyEngine<B>
where
    B: MessageBroker<ControllerMessage> + Clone + Send + Sync + 'static,
{
    system: ActorSystem<ControllerMessage, B>,
    store: Arc<dyn StateStore>,
    parser: Arc<dyn DslParser>,
    metrics: Arc<MetricSubscriptionManager<B>>,
}

impl<B> PolicyEngine<B>
where
    B: MessageBroker<ControllerMessage> + Clone + Send + Sync + 'static,
{
    pub fn new(
        system: ActorSystem<ControllerMessage, B>,
        store: Arc<dyn StateStore>,
        parser: Arc<dyn DslParser>,
        metrics: Arc<MetricSubscriptionManager<B>>,
    ) -> Self {
        Self {
            system,
            store,
            parser,
            metrics,
        }
    }

    /// Subscribe a rule actor to the metric its condition references, if
    /// the condition text parses (§4.3/§4.7: "subscribe to the metrics
    /// referenced by the rule's condition").
    async fn subscribe_rule(
        &self,
        condition_text: &str,
        address: &ActorAddress,
    ) -> Result<(), PolicyError> {
        if let Some(condition) = Condition::parse(condition_text) {
            self.metrics
                .subscribe(&condition.metric_key, RULE_METHOD, address.clone())
                .await?;
        }
        Ok(())
    }

    /// Mirror of [`Self::subscribe_rule`] for teardown; best-effort since a
    /// condition that failed to parse was never subscribed in the first
    /// place.
    async fn unsubscribe_rule(&self, condition_text: &str, address: &ActorAddress) {
        if let Some(condition) = Condition::parse(condition_text) {
            let _ = self.metrics.unsubscribe(&condition.metric_key, address.clone()).await;
        }
    }

    /// `SubmitRules(text)`: one independent attempt per non-empty line.
    pub async fn submit_rules(&self, text: &str) -> SubmitOutcome {
        let mut outcome = SubmitOutcome::default();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match self.deploy_rule(line).await {
                Ok(ids) => outcome.policy_ids.extend(ids),
                Err(err) => outcome.errors.push((line.to_string(), err)),
            }
        }
        outcome
    }

    async fn deploy_rule(&self, rule_text: &str) -> Result<Vec<u64>, PolicyError> {
        let parsed = self.parser.parse(rule_text)?;
        let mut allocated = Vec::new();

        for target in &parsed.targets {
            let policy_id = self.store.next_id(Counter::PolicyId).await?;
            let result = if parsed.is_dynamic() {
                self.deploy_dynamic(policy_id, &parsed, target.clone()).await
            } else {
                apply::apply_target_action(self.store.as_ref(), target, policy_id).await
            };

            match result {
                Ok(()) => allocated.push(policy_id),
                Err(err) => {
                    self.rollback(&allocated).await;
                    return Err(err);
                }
            }
        }

        Ok(allocated)
    }

    async fn deploy_dynamic(
        &self,
        policy_id: u64,
        parsed: &ParsedRule,
        target: crate::dsl::TargetAction,
    ) -> Result<(), PolicyError> {
        let condition = Condition::parse(&parsed.condition_text);
        let actor = RuleActor::new(
            policy_id,
            vec![target],
            condition,
            parsed.transient,
            Arc::clone(&self.store),
        );
        let address = self
            .system
            .spawn()
            .with_name(format!("policy:{policy_id}"))
            .spawn(actor)
            .await?;
        self.subscribe_rule(&parsed.condition_text, &address).await?;

        let static_text = derive_static_text(&parsed.original_text, &parsed.condition_text);
        self.store
            .put_policy(DynamicPolicy {
                id: policy_id,
                original_rule: parsed.original_text.clone(),
                condition_text: parsed.condition_text.clone(),
                static_rule_text: static_text,
                transient: parsed.transient,
                alive: true,
                actor_address: Some(address),
            })
            .await?;

        Ok(())
    }

    /// Undo everything allocated so far for one rule that later failed
    /// partway through multi-target deployment (§4.3).
    async fn rollback(&self, policy_ids: &[u64]) {
        for &policy_id in policy_ids {
            if let Ok(Some(policy)) = self.store.get_policy(policy_id).await {
                if let Some(address) = &policy.actor_address {
                    self.unsubscribe_rule(&policy.condition_text, address).await;
                    let _ = self.system.stop(address).await;
                }
            }
            let _ = self.store.delete_policy(policy_id).await;
        }
    }

    /// `DeleteDynamicPolicy(id)`: stop the actor, delete the record, reset
    /// the id counter once no policies remain.
    pub async fn delete_dynamic_policy(&self, policy_id: u64) -> Result<(), PolicyError> {
        let policy = self
            .store
            .get_policy(policy_id)
            .await?
            .ok_or(PolicyError::NotFound(policy_id))?;

        if let Some(address) = &policy.actor_address {
            self.unsubscribe_rule(&policy.condition_text, address).await;
            let _ = self.system.stop(address).await;
        }
        self.store.delete_policy(policy_id).await?;

        if self.store.list_policies().await?.is_empty() {
            self.store.reset_counter(Counter::PolicyId).await?;
        }
        Ok(())
    }

    /// `ReloadOnStart()`: respawn actors for every persisted policy marked
    /// `alive` (§4.3).
    pub async fn reload_on_start(&self) -> Result<(), PolicyError> {
        for policy in self.store.list_policies().await? {
            if !policy.alive {
                continue;
            }
            let parsed = self.parser.parse(&policy.original_rule)?;
            for target in parsed.targets {
                let condition = Condition::parse(&policy.condition_text);
                let actor = RuleActor::new(
                    policy.id,
                    vec![target],
                    condition,
                    policy.transient,
                    Arc::clone(&self.store),
                );
                let address = self
                    .system
                    .spawn()
                    .with_name(format!("policy:{}", policy.id))
                    .spawn(actor)
                    .await?;
                self.subscribe_rule(&policy.condition_text, &address).await?;
                let mut updated = policy.clone();
                updated.actor_address = Some(address);
                self.store.put_policy(updated).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_static_text_strips_when_and_transient() {
        let original = "FOR TENANT:abc WHEN metric.cpu > 80 DO SET compression TRANSIENT";
        let condition = "WHEN metric.cpu > 80";
        let stripped = derive_static_text(original, condition);
        assert_eq!(stripped, "FOR TENANT:abc DO SET compression");
    }

    #[test]
    fn derive_static_text_is_identity_for_static_rules() {
        let original = "FOR TENANT:abc DO SET compression";
        let stripped = derive_static_text(original, "");
        assert_eq!(stripped, original);
    }
}
