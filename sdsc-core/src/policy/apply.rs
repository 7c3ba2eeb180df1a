//! Translates a parsed rule's [`TargetAction`] into State Store mutations.
//!
//! Shared by the static-deployment path in [`super::PolicyEngine`] and by
//! [`crate::actors::RuleActor`] re-evaluating a dynamic rule on every metric
//! update (§4.3, §4.7).

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::dsl::{Action, TargetAction};
use crate::error::PolicyError;
use crate::model::{Filter, PipelineKey, PolicyEntry};
use crate::store::StateStore;

/// Look a filter up by name, preferring a registered dynamic-filter alias
/// and falling back to a direct name match against registered filters
/// (§4.2, §4.3).
async fn resolve_filter(store: &dyn StateStore, filter_name: &str) -> Result<Filter, PolicyError> {
    if let Some(alias) = store.get_dynamic_filter(filter_name).await? {
        if let Some(filter) = store.get_filter(alias.filter_id).await? {
            return Ok(filter);
        }
    }
    store
        .list_filters()
        .await?
        .into_iter()
        .find(|f| f.filter_name == filter_name)
        .ok_or_else(|| PolicyError::NotFound(0))
}

fn parse_params(params: &[String]) -> HashMap<String, String> {
    params
        .iter()
        .filter_map(|p| p.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Apply one `(target, action)` pair for `policy_id`, mutating the
/// addressed pipeline entry.
pub async fn apply_target_action(
    store: &dyn StateStore,
    target: &TargetAction,
    policy_id: u64,
) -> Result<(), PolicyError> {
    let key = PipelineKey::new(target.tenant_id.clone(), target.container.clone());

    match &target.action {
        Action::Set { filter_name, params } => {
            let filter = resolve_filter(store, filter_name).await?;
            let mut pipeline = store.get_pipeline(&key).await?;

            pipeline.entries.retain(|e| e.policy_id != policy_id);

            // execution_order defaults to the allocated policy_id itself, so
            // later-added rules naturally run later (§4.3).
            pipeline.entries.push(PolicyEntry {
                policy_id,
                filter_id: filter.id,
                filter_name: filter.filter_name.clone(),
                object_type: target.object_type.clone(),
                object_size: target
                    .object_size
                    .clone()
                    .map(|(operator, value)| crate::model::SizePredicate { operator, value }),
                execution_server: filter.execution_site,
                execution_server_reverse: filter.reverse_execution_site,
                execution_order: policy_id,
                params: parse_params(params),
                callable: true,
            });

            store.put_pipeline(&key, pipeline).await?;
        }
        Action::Delete { filter_name: _ } => {
            let mut pipeline = store.get_pipeline(&key).await?;
            pipeline.entries.retain(|e| e.policy_id != policy_id);
            store.put_pipeline(&key, pipeline).await?;
        }
    }

    Ok(())
}

/// Undo whatever `apply_target_action` did for `policy_id` across every
/// target the rule named, regardless of the action it carried (used when a
/// dynamic rule's condition stops holding, or the policy is deleted).
pub async fn revert_target_action(
    store: &dyn StateStore,
    target: &TargetAction,
    policy_id: u64,
) -> Result<(), PolicyError> {
    let key = PipelineKey::new(target.tenant_id.clone(), target.container.clone());
    let mut pipeline = store.get_pipeline(&key).await?;
    pipeline.entries.retain(|e| e.policy_id != policy_id);
    store.put_pipeline(&key, pipeline).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DynamicFilterAlias, ExecutionSite};
    use crate::store::InMemoryStateStore;

    async fn seed_filter(store: &InMemoryStateStore) -> u64 {
        let id = store.next_id(crate::store::Counter::FilterId).await.unwrap();
        store
            .put_filter(Filter {
                id,
                filter_name: "compression".to_string(),
                execution_site: ExecutionSite::Proxy,
                reverse_execution_site: None,
                is_pre_put: true,
                is_post_get: false,
                is_post_put: false,
                is_pre_get: false,
                has_reverse: false,
                artifact_digest: "deadbeef".to_string(),
            })
            .await
            .unwrap();
        store
            .put_dynamic_filter(DynamicFilterAlias {
                name: "compression".to_string(),
                filter_id: id,
            })
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn set_then_delete_round_trips_pipeline_entry() {
        let store = InMemoryStateStore::new();
        seed_filter(&store).await;

        let target = TargetAction {
            tenant_id: "abc".to_string(),
            container: None,
            action: Action::Set {
                filter_name: "compression".to_string(),
                params: vec!["level=9".to_string()],
            },
            object_type: None,
            object_size: None,
            execution_server: None,
        };

        apply_target_action(&store, &target, 1).await.unwrap();
        let pipeline = store
            .get_pipeline(&PipelineKey::new("abc", None))
            .await
            .unwrap();
        assert_eq!(pipeline.entries.len(), 1);
        assert_eq!(pipeline.entries[0].params.get("level").unwrap(), "9");

        revert_target_action(&store, &target, 1).await.unwrap();
        let pipeline = store
            .get_pipeline(&PipelineKey::new("abc", None))
            .await
            .unwrap();
        assert!(pipeline.entries.is_empty());
    }

    #[tokio::test]
    async fn unknown_filter_is_rejected() {
        let store = InMemoryStateStore::new();
        let target = TargetAction {
            tenant_id: "abc".to_string(),
            container: None,
            action: Action::Set {
                filter_name: "nope".to_string(),
                params: vec![],
            },
            object_type: None,
            object_size: None,
            execution_server: None,
        };
        assert!(apply_target_action(&store, &target, 1).await.is_err());
    }
}
