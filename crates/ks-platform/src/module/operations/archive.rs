//! Module Archive Plan
//!
//! Archival cascade shared by module and package deletion: a module takes
//! its actions, its collections and the JS actions inside those collections
//! with it. Everything is tombstoned, never removed.

use bson::{doc, Document};
use chrono::{DateTime, Utc};

use crate::action::{entity::ACTIONS_COLLECTION, ActionRepository};
use crate::action_collection::{entity::ACTION_COLLECTIONS_COLLECTION, ActionCollectionRepository};
use crate::module::{entity::MODULES_COLLECTION, Module, ModuleRepository};
use crate::module_instance::ModuleInstanceRepository;
use crate::shared::error::Result;
use crate::usecase::{codes, PendingWrite, UseCaseError};

/// `$set` fields that tombstone an entity.
pub fn archive_fields(archived_at: DateTime<Utc>) -> Document {
    let at = bson::DateTime::from_chrono(archived_at);
    doc! { "deletedAt": at, "updatedAt": at }
}

#[derive(Debug, Clone)]
pub struct ModuleArchivePlan {
    pub module_ids: Vec<String>,
    pub collection_ids: Vec<String>,
    pub action_ids: Vec<String>,
    archived_at: DateTime<Utc>,
}

impl ModuleArchivePlan {
    pub async fn build(
        modules: &[Module],
        action_repo: &ActionRepository,
        collection_repo: &ActionCollectionRepository,
    ) -> Result<Self> {
        let module_ids: Vec<String> = modules.iter().map(|m| m.id.clone()).collect();

        let collection_ids: Vec<String> = collection_repo
            .find_by_modules(&module_ids)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        let action_ids: Vec<String> = action_repo
            .find_owned_by(&module_ids, &collection_ids)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();

        Ok(Self {
            module_ids,
            collection_ids,
            action_ids,
            archived_at: Utc::now(),
        })
    }

    pub fn writes(&self) -> Vec<PendingWrite> {
        let fields = archive_fields(self.archived_at);
        let tombstone = |collection: &'static str, ids: &[String]| -> Vec<PendingWrite> {
            ids.iter()
                .map(|id| PendingWrite::set_fields(collection, id.as_str(), fields.clone()))
                .collect()
        };

        let mut writes = tombstone(ACTIONS_COLLECTION, &self.action_ids);
        writes.extend(tombstone(ACTION_COLLECTIONS_COLLECTION, &self.collection_ids));
        writes.extend(tombstone(MODULES_COLLECTION, &self.module_ids));
        writes
    }
}

/// Refuse while any live instance references one of the modules or one of
/// their published copies.
pub async fn ensure_no_instances(
    modules: &[Module],
    module_repo: &ModuleRepository,
    instance_repo: &ModuleInstanceRepository,
) -> std::result::Result<(), UseCaseError> {
    let mut referenced: Vec<String> = Vec::new();
    for module in modules {
        referenced.push(module.id.clone());
        for copy in module_repo.find_published_copies(&module.id).await? {
            referenced.push(copy.id);
        }
    }

    let instance_count = instance_repo.count_by_source_modules(&referenced).await?;
    if instance_count > 0 {
        let module_ids: Vec<&str> = modules.iter().map(|m| m.id.as_str()).collect();
        return Err(UseCaseError::business_rule_with_details(
            codes::MODULE_HAS_INSTANCES,
            format!("Module is used by {} module instance(s)", instance_count),
            crate::details! {
                "moduleIds" => module_ids,
                "instanceCount" => instance_count,
            },
        ));
    }

    Ok(())
}
