//! Module publisher

use std::sync::Arc;

use async_trait::async_trait;

use crate::module::{Module, ModuleRepository, ModuleSnapshot};
use crate::shared::error::Result;
use crate::usecase::{PendingWrite, UseCaseError};
use super::publishable::{PackagePublishable, PublishingMeta};

pub struct ModulePublisher {
    module_repo: Arc<ModuleRepository>,
}

impl ModulePublisher {
    pub fn new(module_repo: Arc<ModuleRepository>) -> Self {
        Self { module_repo }
    }
}

/// Published copy of a draft module inside the published package.
pub fn published_module(source: &Module, meta: &PublishingMeta) -> Module {
    Module {
        id: crate::TsidGenerator::generate(),
        module_uuid: source.module_uuid.clone(),
        package_id: meta.published_package.id.clone(),
        package_uuid: meta.published_package.package_uuid.clone(),
        module_type: source.module_type,
        origin_module_id: Some(source.id.clone()),
        draft: ModuleSnapshot::default(),
        published: source.draft.clone(),
        policies: source.policies.clone(),
        deleted_at: None,
        created_at: meta.published_at,
        updated_at: meta.published_at,
    }
}

#[async_trait]
impl PackagePublishable for ModulePublisher {
    type Entity = Module;

    async fn publishable_entities(&self, meta: &mut PublishingMeta) -> Result<Vec<Module>> {
        let sources = self.module_repo.find_by_package(&meta.source_package.id).await?;

        let published: Vec<Module> = sources
            .iter()
            .map(|source| published_module(source, meta))
            .collect();

        for (source, copy) in sources.iter().zip(&published) {
            meta.module_ids.insert(&source.id, &copy.id);
        }

        Ok(published)
    }

    fn pending_writes(&self, entities: &[Module]) -> std::result::Result<Vec<PendingWrite>, UseCaseError> {
        entities.iter().map(PendingWrite::upsert).collect()
    }
}
