//! Action publisher
//!
//! Publishes the actions bound directly to the source modules. JS actions
//! inside collections are published with their collection.

use std::sync::Arc;

use async_trait::async_trait;

use crate::action::{Action, ActionRepository, ActionSnapshot};
use crate::shared::error::Result;
use crate::usecase::{PendingWrite, UseCaseError};
use super::publishable::{PackagePublishable, PublishingMeta};

pub struct ActionPublisher {
    action_repo: Arc<ActionRepository>,
}

impl ActionPublisher {
    pub fn new(action_repo: Arc<ActionRepository>) -> Self {
        Self { action_repo }
    }
}

/// Published copy of a draft action, owned by `module_id` / `collection_id`
/// (already remapped by the caller).
pub fn published_action(
    source: &Action,
    module_id: Option<String>,
    collection_id: Option<String>,
    meta: &PublishingMeta,
) -> Action {
    Action {
        id: crate::TsidGenerator::generate(),
        module_id,
        collection_id,
        application_id: source.application_id.clone(),
        is_public: source.is_public,
        module_instance_id: None,
        root_module_instance_id: None,
        draft: ActionSnapshot::default(),
        published: source.draft.clone(),
        policies: source.policies.clone(),
        deleted_at: None,
        created_at: meta.published_at,
        updated_at: meta.published_at,
    }
}

#[async_trait]
impl PackagePublishable for ActionPublisher {
    type Entity = Action;

    async fn publishable_entities(&self, meta: &mut PublishingMeta) -> Result<Vec<Action>> {
        if meta.module_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sources = self.action_repo
            .find_module_actions(&meta.module_ids.source_ids())
            .await?;

        let published: Vec<Action> = sources
            .iter()
            .map(|source| {
                let module_id = meta.module_ids.remap(source.module_id.as_deref());
                published_action(source, module_id, None, meta)
            })
            .collect();

        for (source, copy) in sources.iter().zip(&published) {
            meta.action_ids.insert(&source.id, &copy.id);
        }

        Ok(published)
    }

    fn pending_writes(&self, entities: &[Action]) -> std::result::Result<Vec<PendingWrite>, UseCaseError> {
        entities.iter().map(PendingWrite::upsert).collect()
    }
}
