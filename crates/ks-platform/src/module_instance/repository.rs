//! Module Instance Repository

use std::sync::Arc;

use bson::doc;

use super::entity::ModuleInstance;
use crate::shared::error::Result;
use crate::shared::store::{DocumentStore, EntityCollection};

pub struct ModuleInstanceRepository {
    collection: EntityCollection<ModuleInstance>,
}

impl ModuleInstanceRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection: EntityCollection::new(store),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ModuleInstance>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    /// Live instances created from any of the given modules.
    pub async fn count_by_source_modules(&self, module_ids: &[String]) -> Result<u64> {
        self.collection
            .count(doc! { "sourceModuleId": { "$in": module_ids.to_vec() }, "deletedAt": null })
            .await
    }
}
