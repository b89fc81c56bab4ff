//! Collection publisher
//!
//! Publishes each collection together with its JS actions. The published
//! collection's `actionIds` are rebuilt from a per-collection id table so
//! they point at the newly published actions, never at the source ones.

use std::sync::Arc;

use async_trait::async_trait;

use crate::action::{Action, ActionRepository};
use crate::action_collection::{ActionCollection, ActionCollectionRepository, CollectionSnapshot};
use crate::shared::error::Result;
use crate::usecase::{PendingWrite, UseCaseError};
use super::action_publisher::published_action;
use super::publishable::{IdRemap, PackagePublishable, PublishingMeta};

/// A published collection and the JS actions published with it.
#[derive(Debug, Clone)]
pub struct PublishedCollection {
    pub collection: ActionCollection,
    pub actions: Vec<Action>,
}

pub struct CollectionPublisher {
    collection_repo: Arc<ActionCollectionRepository>,
    action_repo: Arc<ActionRepository>,
}

impl CollectionPublisher {
    pub fn new(collection_repo: Arc<ActionCollectionRepository>, action_repo: Arc<ActionRepository>) -> Self {
        Self { collection_repo, action_repo }
    }
}

#[async_trait]
impl PackagePublishable for CollectionPublisher {
    type Entity = PublishedCollection;

    async fn publishable_entities(&self, meta: &mut PublishingMeta) -> Result<Vec<PublishedCollection>> {
        if meta.module_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sources = self.collection_repo
            .find_by_modules(&meta.module_ids.source_ids())
            .await?;

        let mut published = Vec::with_capacity(sources.len());
        for source in sources {
            let collection_id = crate::TsidGenerator::generate();
            let module_id = meta.module_ids.remap(source.module_id.as_deref());

            let source_actions = self.action_repo.find_by_collection(&source.id).await?;
            let js_actions: Vec<Action> = source_actions
                .iter()
                .map(|action| {
                    let action_module_id = meta.module_ids.remap(action.module_id.as_deref());
                    published_action(action, action_module_id, Some(collection_id.clone()), meta)
                })
                .collect();

            let action_ids: IdRemap = source_actions
                .iter()
                .zip(&js_actions)
                .map(|(old, new)| (old.id.clone(), new.id.clone()))
                .collect();

            // Archived or foreign ids have no published counterpart and are dropped.
            let published_snapshot = CollectionSnapshot {
                action_ids: source.draft.action_ids
                    .iter()
                    .filter_map(|id| action_ids.get(id).map(String::from))
                    .collect(),
                ..source.draft.clone()
            };

            for (old, new) in source_actions.iter().zip(&js_actions) {
                meta.action_ids.insert(&old.id, &new.id);
            }
            meta.collection_ids.insert(&source.id, &collection_id);

            published.push(PublishedCollection {
                collection: ActionCollection {
                    id: collection_id,
                    module_id,
                    application_id: source.application_id.clone(),
                    draft: CollectionSnapshot::default(),
                    published: published_snapshot,
                    policies: source.policies.clone(),
                    deleted_at: None,
                    created_at: meta.published_at,
                    updated_at: meta.published_at,
                },
                actions: js_actions,
            });
        }

        Ok(published)
    }

    fn pending_writes(&self, entities: &[PublishedCollection]) -> std::result::Result<Vec<PendingWrite>, UseCaseError> {
        let mut writes = Vec::new();
        for entry in entities {
            for action in &entry.actions {
                writes.push(PendingWrite::upsert(action)?);
            }
            writes.push(PendingWrite::upsert(&entry.collection)?);
        }
        Ok(writes)
    }
}
